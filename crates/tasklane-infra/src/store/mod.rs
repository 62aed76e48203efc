//! SQLite storage layer.
//!
//! One generic [`provider::EntityProvider`] serves every entity type; the
//! per-entity code in [`entities`] is limited to `'static` metadata plus
//! value/row conversions. All SQL text is assembled from that metadata and
//! caller-supplied filters, and every bound value flows through the single
//! binding path in [`sql`].

pub mod audit;
pub mod connect;
pub mod entities;
pub mod entity;
pub mod provider;
pub mod sql;
pub mod uow;

pub use audit::ActionLogWriter;
pub use connect::{expand_env, ConnectionFactory};
pub use entity::{Entity, EntityKey};
pub use provider::{EntityProvider, ListQuery};
pub use uow::{UnitOfWork, UnitOfWorkFactory};
