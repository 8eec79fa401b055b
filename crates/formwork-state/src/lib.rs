//! # formwork-state
//!
//! The live state of one form instance: the main record, the ordered
//! repeatable subform list, and the presentation-only collapse state, plus
//! serialization of all of it to and from portable JSON documents.
//!
//! ## Modules
//!
//! - [`record`] - One record of field values
//! - [`store`] - The [`FormStore`](store::FormStore) owning a form's state
//! - [`document`] - Document export and import

pub mod document;
pub mod record;
pub mod store;

pub use document::{export_document, import_document, ImportReport, RELS_KEY};
pub use record::Record;
pub use store::FormStore;
