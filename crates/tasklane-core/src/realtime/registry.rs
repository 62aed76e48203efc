//! Connection-subscription registry for the real-time channel.
//!
//! Tracks, per connection id, the set of resource ids the connection is
//! currently subscribed to. Subscription updates are diffed against the
//! tracked set, so the push transport only sees the membership changes,
//! never wholesale re-joins.
//!
//! Concurrency: the map is a `DashMap`, and each connection carries its own
//! `tokio::Mutex`, so two `set_subscriptions` calls for the same connection
//! never interleave while updates for different connections proceed in
//! parallel. The last completed call for a connection wins.
//!
//! The caller enforces any ceiling on the desired-set size (the membership
//! layer caps requests at 100 ids before calling in); the registry itself
//! has no opinion.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tasklane_types::error::RealtimeError;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Group-membership primitive of the push transport.
///
/// `join`/`leave` map to the transport's group add/remove calls. Injected so
/// the registry stays transport-agnostic and testable.
pub trait GroupSink: Send + Sync {
    fn join(
        &self,
        connection_id: &str,
        resource_id: Uuid,
    ) -> impl std::future::Future<Output = Result<(), RealtimeError>> + Send;

    fn leave(
        &self,
        connection_id: &str,
        resource_id: Uuid,
    ) -> impl std::future::Future<Output = Result<(), RealtimeError>> + Send;
}

/// Per-connection map of currently subscribed resource ids.
pub struct SubscriptionRegistry<S: GroupSink> {
    sink: S,
    connections: DashMap<String, Arc<Mutex<HashSet<Uuid>>>>,
}

impl<S: GroupSink> SubscriptionRegistry<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            connections: DashMap::new(),
        }
    }

    /// Replace the connection's subscriptions with `desired`.
    ///
    /// Ids present only in the old set get a `leave`; ids present only in
    /// `desired` get a `join`; the intersection is untouched. The tracked
    /// set is replaced before the side effects run, so the registry state
    /// reflects the latest call even if the transport rejects a membership
    /// update. Every change in the diff is attempted; rejected ones are
    /// logged and the first error is returned after the sweep.
    pub async fn set_subscriptions(
        &self,
        connection_id: &str,
        desired: HashSet<Uuid>,
    ) -> Result<(), RealtimeError> {
        let entry = self
            .connections
            .entry(connection_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(HashSet::new())))
            .clone();
        // The dashmap guard is dropped here; the per-connection mutex is
        // what serializes concurrent updates for this id.
        let mut tracked = entry.lock().await;

        let to_leave: Vec<Uuid> = tracked.difference(&desired).copied().collect();
        let to_join: Vec<Uuid> = desired.difference(&tracked).copied().collect();
        debug!(
            connection_id,
            leaving = to_leave.len(),
            joining = to_join.len(),
            "updating subscriptions"
        );
        *tracked = desired;

        let mut first_error = None;
        for id in to_leave {
            if let Err(err) = self.sink.leave(connection_id, id).await {
                warn!(connection_id, resource_id = %id, error = %err, "leave rejected");
                first_error.get_or_insert(err);
            }
        }
        for id in to_join {
            if let Err(err) = self.sink.join(connection_id, id).await {
                warn!(connection_id, resource_id = %id, error = %err, "join rejected");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Drop all tracking for a connection (disconnect notification).
    ///
    /// The transport tears down its own group membership on disconnect, so
    /// no `leave` side effects are issued here.
    pub fn remove_connection(&self, connection_id: &str) {
        if self.connections.remove(connection_id).is_some() {
            debug!(connection_id, "removed connection tracking");
        }
    }

    /// Snapshot of the tracked set for a connection, if any.
    pub async fn subscriptions(&self, connection_id: &str) -> Option<HashSet<Uuid>> {
        let entry = self.connections.get(connection_id)?.clone();
        Some(entry.lock().await.clone())
    }
}
