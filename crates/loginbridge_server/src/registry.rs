//! Callback subscriber registry.
//!
//! Remote callers register a callback receiver with `add_client`. A broadcast
//! snapshots the registry, delivers outside the lock and then prunes every
//! subscriber whose delivery failed.

use crate::error::{ServerError, ServerResult};
use loginbridge_protocol::ClientIdentity;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// A transport failure while delivering to a subscriber.
#[derive(Debug, Clone, Error)]
#[error("delivery failed: {reason}")]
pub struct DeliveryError {
    /// What went wrong.
    pub reason: String,
}

impl DeliveryError {
    /// Creates a delivery error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A remote callback receiver.
pub trait Subscriber: Send + Sync {
    /// The receiver's identity.
    fn identity(&self) -> &ClientIdentity;

    /// Delivers a sequence number. May block on the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiver is unreachable.
    fn deliver(&self, sequence: i64) -> Result<(), DeliveryError>;
}

/// Builds subscriber handles from identities, on behalf of the transport.
pub trait SubscriberFactory: Send + Sync {
    /// Connects to the receiver named by `identity`.
    fn connect(&self, identity: &ClientIdentity) -> Arc<dyn Subscriber>;
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Sequence number that was sent.
    pub sequence: i64,
    /// Subscribers that received it.
    pub delivered: usize,
    /// Subscribers removed because delivery failed.
    pub pruned: Vec<ClientIdentity>,
}

#[derive(Default)]
struct RegistryState {
    subscribers: Vec<Arc<dyn Subscriber>>,
    shut_down: bool,
}

/// The set of live subscribers.
///
/// One lock guards every membership change and snapshot. It is never held
/// while delivering.
pub struct SubscriberRegistry {
    factory: Arc<dyn SubscriberFactory>,
    state: Mutex<RegistryState>,
    closed: Condvar,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    pub fn new(factory: Arc<dyn SubscriberFactory>) -> Self {
        Self {
            factory,
            state: Mutex::new(RegistryState::default()),
            closed: Condvar::new(),
        }
    }

    /// Registers the receiver named by `identity`.
    ///
    /// A receiver already registered under the same identity is replaced.
    ///
    /// # Errors
    ///
    /// Returns `ShutDown` after [`shutdown`](Self::shutdown).
    pub fn add_client(&self, identity: &ClientIdentity) -> ServerResult<()> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(ServerError::ShutDown);
        }

        let handle = self.factory.connect(identity);
        let before = state.subscribers.len();
        state.subscribers.retain(|s| s.identity() != identity);
        if state.subscribers.len() != before {
            debug!(client = %identity, "replacing client");
        }
        state.subscribers.push(handle);
        info!(client = %identity, clients = state.subscribers.len(), "adding client");
        Ok(())
    }

    /// Sends `sequence` to every subscriber.
    ///
    /// One failed delivery does not stop the others. Failed subscribers are
    /// removed; a handle registered meanwhile under the same identity stays.
    pub fn broadcast(&self, sequence: i64) -> BroadcastReport {
        let snapshot: Vec<Arc<dyn Subscriber>> = {
            let state = self.state.lock();
            if state.shut_down {
                return BroadcastReport {
                    sequence,
                    ..BroadcastReport::default()
                };
            }
            state.subscribers.clone()
        };

        let mut report = BroadcastReport {
            sequence,
            ..BroadcastReport::default()
        };
        for subscriber in snapshot {
            match subscriber.deliver(sequence) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(client = %subscriber.identity(), error = %e, "removing client");
                    self.state
                        .lock()
                        .subscribers
                        .retain(|s| !Arc::ptr_eq(s, &subscriber));
                    report.pruned.push(subscriber.identity().clone());
                }
            }
        }
        report
    }

    /// Marks the registry closed and wakes every [`wait_for_shutdown`](Self::wait_for_shutdown) caller.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if !state.shut_down {
            info!("destroying callback sender");
        }
        state.shut_down = true;
        self.closed.notify_all();
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.state.lock().shut_down
    }

    /// Blocks until shutdown or until `timeout` elapses. Returns true if the
    /// registry is shut down.
    pub fn wait_for_shutdown(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut state = self.state.lock();
        while !state.shut_down {
            match deadline {
                Some(deadline) => {
                    if self.closed.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
                None => self.closed.wait(&mut state),
            }
        }
        state.shut_down
    }

    /// Identities of the live subscribers, in registration order.
    pub fn identities(&self) -> Vec<ClientIdentity> {
        self.state
            .lock()
            .subscribers
            .iter()
            .map(|s| s.identity().clone())
            .collect()
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Returns true if no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &state.subscribers.len())
            .field("shut_down", &state.shut_down)
            .finish()
    }
}
