//! Store-agnostic pieces of the generic persistence engine.
//!
//! - [`value`]: the `SqlValue` model every bound parameter flows through.
//! - [`metadata`]: pre-declared per-entity table/column/key descriptions
//!   with write-once startup validation.
//! - [`filter`]: composable predicates producing SQL boolean fragments and
//!   named parameters. Filters never execute SQL; they are pure builders
//!   consumed by the provider in tasklane-infra.

pub mod filter;
pub mod metadata;
pub mod value;

pub use filter::{Filter, RenderedFilter, SqlParam};
pub use metadata::{
    ColumnDescriptor, EntityMetadata, KeyDescriptor, KeyGeneration, MetadataRegistry, StoreType,
};
pub use value::SqlValue;
