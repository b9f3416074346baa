//! Single-Flight Coordinator
//!
//! Ensures at most one in-flight producer execution per key. Concurrent
//! callers join the existing execution and share its outcome, success or
//! failure, without re-invoking the producer.
//!
//! A marker is a `broadcast::Sender` in the flight table. The leader installs
//! it, runs the producer, removes it (via a drop guard, so cancellation also
//! cleans up) and broadcasts the outcome. Waiters subscribe and await the
//! broadcast; if the channel closes without an outcome the leader was
//! cancelled, and waiters retry from scratch.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::trace;

use crate::cache::{CacheKey, CachedValue};
use crate::error::{CacheError, Result};

/// Terminal outcome of a producer execution, shared with every joined waiter.
type FlightOutcome = Result<CachedValue>;

type FlightTable = Mutex<HashMap<CacheKey, broadcast::Sender<FlightOutcome>>>;

/// Role a caller takes for one pass of the run loop.
enum Role {
    Leader(broadcast::Sender<FlightOutcome>),
    Waiter(broadcast::Receiver<FlightOutcome>),
}

// == Single Flight ==
/// Per-key deduplication of producer executions.
#[derive(Debug, Default)]
pub struct SingleFlight {
    flights: FlightTable,
}

impl SingleFlight {
    /// Creates a coordinator with no in-flight executions.
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Runs `produce` for `key`, collapsing overlapping calls into one
    /// execution.
    ///
    /// Exactly one caller (the leader) invokes `produce`; everyone else
    /// awaits the shared outcome. A failure resolves the marker for all
    /// waiters but is never retained: the marker is destroyed first, so the
    /// next arrival starts a fresh execution.
    pub async fn run<F, Fut>(&self, key: &CacheKey, produce: F) -> FlightOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FlightOutcome>,
    {
        // Consumed exactly once, on the single pass where we become leader.
        let mut produce = Some(produce);

        loop {
            let role = {
                let mut flights = self.lock_flights();
                match flights.entry(key.clone()) {
                    Entry::Occupied(occupied) => Role::Waiter(occupied.get().subscribe()),
                    Entry::Vacant(vacant) => {
                        let (tx, _rx) = broadcast::channel(1);
                        vacant.insert(tx.clone());
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Leader(tx) => {
                    let produce = produce
                        .take()
                        .ok_or_else(|| CacheError::Internal("leader ran twice".to_string()))?;

                    trace!(%key, "leading producer execution");
                    let outcome = {
                        // Removes the marker even if this future is dropped
                        // mid-producer, so a cancelled leader never wedges
                        // the key.
                        let _guard = FlightGuard {
                            flights: &self.flights,
                            key,
                        };
                        produce().await
                    };

                    // Marker is gone; subscribers that joined before removal
                    // still receive the outcome.
                    let _ = tx.send(outcome.clone());
                    return outcome;
                }
                Role::Waiter(mut rx) => {
                    trace!(%key, "joining in-flight execution");
                    match rx.recv().await {
                        Ok(outcome) => return outcome,
                        // Channel closed without an outcome: the leader was
                        // cancelled. Retry, possibly becoming leader.
                        Err(_) => continue,
                    }
                }
            }
        }
    }

    /// Returns the number of keys with an execution currently in flight.
    pub fn in_flight(&self) -> usize {
        self.lock_flights().len()
    }

    fn lock_flights(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, broadcast::Sender<FlightOutcome>>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes the in-flight marker when the leader finishes or is cancelled.
struct FlightGuard<'a> {
    flights: &'a FlightTable,
    key: &'a CacheKey,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(self.key);
    }
}
