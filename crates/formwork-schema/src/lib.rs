//! # formwork-schema
//!
//! The declarative vocabulary of the formwork engine: field descriptors and
//! form schemas as loaded from configuration, the value type stored in live
//! records, the permissive option model decoded at the network boundary, and
//! the resolver that turns a descriptor plus the current main-record values
//! into one concrete rendering variant.
//!
//! ## Modules
//!
//! - [`value`] - The [`FieldValue`](value::FieldValue) stored in records
//! - [`descriptor`] - Field descriptors and [`FormSchema`](descriptor::FormSchema)
//! - [`options`] - Option items, server payload decoding, and the option cache
//! - [`resolver`] - Effective type / options / visibility resolution
//! - [`catalog`] - The set of all schemas known to a client

pub mod catalog;
pub mod descriptor;
pub mod options;
pub mod resolver;
pub mod value;

pub use catalog::SchemaCatalog;
pub use descriptor::{BaseType, FieldDescriptor, FormSchema, CONFIG_SELECTOR_FIELD};
pub use options::{OptionCache, OptionItem, OptionsPayload};
pub use resolver::ResolvedField;
pub use value::FieldValue;
