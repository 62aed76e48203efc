//! Store bindings for the domain entity types.
//!
//! Each submodule declares one entity's `'static` metadata and its
//! [`Entity`](super::entity::Entity) implementation (value and row
//! conversions). No per-entity SQL lives here; the generic provider builds
//! every statement from the metadata.

pub mod action_log;
pub mod area;
pub mod folder;
pub mod subtask;
pub mod task;
pub mod user;

use tasklane_core::store::MetadataRegistry;
use tasklane_types::error::MetadataError;

use super::entity::Entity;

/// Build the validated metadata registry for every persisted entity type.
///
/// Called once at process start; any error here must abort startup.
pub fn metadata_registry() -> Result<MetadataRegistry, MetadataError> {
    let mut registry = MetadataRegistry::new();
    registry.register(tasklane_types::user::User::metadata())?;
    registry.register(tasklane_types::area::Area::metadata())?;
    registry.register(tasklane_types::folder::Folder::metadata())?;
    registry.register(tasklane_types::task::Task::metadata())?;
    registry.register(tasklane_types::subtask::Subtask::metadata())?;
    registry.register(tasklane_types::action_log::ActionLogRecord::metadata())?;
    Ok(registry)
}
