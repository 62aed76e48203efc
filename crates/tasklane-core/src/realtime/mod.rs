//! Real-time channel support.
//!
//! The only piece of the real-time layer owned by the core: the
//! connection-subscription registry tracking which resource ids each live
//! connection is subscribed to. Identity resolution, authorization and the
//! push transport's wire protocol are external collaborators.

pub mod registry;

pub use registry::{GroupSink, SubscriptionRegistry};
