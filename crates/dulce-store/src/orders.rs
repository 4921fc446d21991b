//! # Order Store
//!
//! Shared document store for submitted orders plus the transactional daily
//! counter. One instance is shared by every register and the kitchen display.
//!
//! ## Submission Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Register A                    Store                      Register B    │
//! │  ──────────                    ─────                      ──────────    │
//! │  counter_snapshot() ──────►  value=100, version=7                       │
//! │                                          ◄────── counter_snapshot()     │
//! │  commit(version=7) ───────►  CAS ok: counter=101,                       │
//! │                              version=8, order #101 stored               │
//! │                                          ◄────── commit(version=7)      │
//! │                              CAS FAILS: Conflict{7, 8}                  │
//! │                                          ──────► re-read, retry         │
//! │                              CAS ok: order #102 stored                  │
//! │                                                                         │
//! │  Numbers are unique and GAPLESS: the counter moves only inside a        │
//! │  successful commit, never on a failed attempt.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Change Feed
//! Every write is fanned out on a broadcast channel as a whole-document
//! event. Consumers that lag and miss events resync from
//! [`OrderStore::active_orders`]; the feed is a hint, the store is truth.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

use dulce_core::order::{Order, OrderStatus};

use crate::error::{StoreError, StoreResult};

/// Broadcast capacity. Generous for a single shop's order volume; a lagged
/// consumer resyncs rather than blocking writers.
const EVENT_CAPACITY: usize = 1024;

// =============================================================================
// Events
// =============================================================================

/// One change-feed notification. Upserts carry the WHOLE document so every
/// consumer sees a per-order-consistent snapshot, never a partial patch.
#[derive(Debug, Clone)]
pub enum OrderEvent {
    Upserted(Order),
    Removed(String),
}

/// A live feed: the current active set plus a receiver for changes from
/// this point on. Snapshot and subscription are taken under one lock so no
/// event falls in the gap.
pub struct OrderFeed {
    pub initial: Vec<Order>,
    pub events: broadcast::Receiver<OrderEvent>,
}

// =============================================================================
// Counter
// =============================================================================

/// A consistent read of the daily counter, used as the CAS token for
/// [`OrderStore::commit_submission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Last order number handed out (0 before the first order of the day).
    pub value: u64,
    /// Version for optimistic concurrency. Bumped on every successful commit.
    pub version: u64,
}

impl CounterSnapshot {
    /// The number the next successful commit will claim.
    #[inline]
    pub fn next_number(&self) -> u64 {
        self.value + 1
    }
}

// =============================================================================
// Order Store
// =============================================================================

struct Inner {
    orders: HashMap<String, Order>,
    counter: CounterSnapshot,
    connected: bool,
}

/// The shared order store. Cheap to share behind an `Arc`.
pub struct OrderStore {
    inner: Mutex<Inner>,
    events: broadcast::Sender<OrderEvent>,
}

impl OrderStore {
    /// Creates an empty store with the counter at zero.
    pub fn new() -> Self {
        Self::with_counter(0)
    }

    /// Creates a store whose counter continues from `last_number`. Used when
    /// the day already has orders (process restart).
    pub fn with_counter(last_number: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        OrderStore {
            inner: Mutex::new(Inner {
                orders: HashMap::new(),
                counter: CounterSnapshot {
                    value: last_number,
                    version: 0,
                },
                connected: true,
            }),
            events,
        }
    }

    // A poisoned lock means a writer panicked mid-update; the data itself is
    // plain maps and counters, so continuing with the inner value is sound.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Counter transaction
    // -------------------------------------------------------------------------

    /// Reads the counter for an optimistic submission attempt.
    pub fn counter_snapshot(&self) -> StoreResult<CounterSnapshot> {
        let inner = self.lock();
        if !inner.connected {
            return Err(StoreError::Offline);
        }
        Ok(inner.counter)
    }

    /// Atomically claims the next order number and stores the order.
    ///
    /// Fails with [`StoreError::Conflict`] if the counter version moved since
    /// `expected.version` was read; nothing is written in that case. On
    /// success the order is stored carrying the claimed number, which is
    /// authoritative regardless of what the caller put in `order_number`.
    pub fn commit_submission(
        &self,
        expected: CounterSnapshot,
        mut order: Order,
    ) -> StoreResult<Order> {
        let committed = {
            let mut inner = self.lock();
            if !inner.connected {
                return Err(StoreError::Offline);
            }
            if inner.counter.version != expected.version {
                return Err(StoreError::Conflict {
                    expected: expected.version,
                    actual: inner.counter.version,
                });
            }

            inner.counter.value += 1;
            inner.counter.version += 1;
            order.order_number = inner.counter.value;
            inner.orders.insert(order.id.clone(), order.clone());
            order
        };

        info!(
            id = %committed.id,
            number = committed.order_number,
            total = %committed.total,
            "order committed"
        );
        let _ = self.events.send(OrderEvent::Upserted(committed.clone()));
        Ok(committed)
    }

    // -------------------------------------------------------------------------
    // Documents
    // -------------------------------------------------------------------------

    /// Fetches one order by document id.
    pub fn get(&self, id: &str) -> StoreResult<Order> {
        let inner = self.lock();
        if !inner.connected {
            return Err(StoreError::Offline);
        }
        inner
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    /// Patches one order's status.
    ///
    /// Entering READY stamps `ready_at` once; later writes never move it, so
    /// a duplicate "ready" from a second display cannot restart the
    /// auto-complete countdown. The store itself accepts any status value;
    /// lifecycle legality is the coordinator's job.
    pub fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<Order> {
        let updated = {
            let mut inner = self.lock();
            if !inner.connected {
                return Err(StoreError::Offline);
            }
            let order = inner
                .orders
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
            order.status = status;
            if status == OrderStatus::Ready && order.ready_at.is_none() {
                order.ready_at = Some(at);
            }
            order.clone()
        };

        debug!(id = %id, status = %status, "order status updated");
        let _ = self.events.send(OrderEvent::Upserted(updated.clone()));
        Ok(updated)
    }

    /// Every non-DELIVERED order, oldest submission first. This is the
    /// kitchen display's working set and its resync source.
    pub fn active_orders(&self) -> StoreResult<Vec<Order>> {
        let inner = self.lock();
        if !inner.connected {
            return Err(StoreError::Offline);
        }
        let mut active: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.status.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.order_number.cmp(&b.order_number))
        });
        Ok(active)
    }

    /// Opens a live feed: active snapshot plus events from this instant on.
    pub fn subscribe(&self) -> StoreResult<OrderFeed> {
        // Hold the lock across snapshot + subscribe so no event lands between
        // the two.
        let inner = self.lock();
        if !inner.connected {
            return Err(StoreError::Offline);
        }
        let mut initial: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.status.is_active())
            .cloned()
            .collect();
        initial.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.order_number.cmp(&b.order_number))
        });
        Ok(OrderFeed {
            initial,
            events: self.events.subscribe(),
        })
    }

    /// Deletes DELIVERED orders that finished at or before `cutoff`,
    /// returning the removed ids. Recent deliveries stay for the grace
    /// window so an accidental tap can still be seen.
    pub fn archive_delivered(&self, cutoff: DateTime<Utc>) -> StoreResult<Vec<String>> {
        let removed: Vec<String> = {
            let mut inner = self.lock();
            if !inner.connected {
                return Err(StoreError::Offline);
            }
            let ids: Vec<String> = inner
                .orders
                .values()
                .filter(|o| {
                    o.status == OrderStatus::Delivered
                        && o.ready_at.unwrap_or(o.created_at) <= cutoff
                })
                .map(|o| o.id.clone())
                .collect();
            for id in &ids {
                inner.orders.remove(id);
            }
            ids
        };

        if !removed.is_empty() {
            info!(count = removed.len(), "archived delivered orders");
        }
        for id in &removed {
            let _ = self.events.send(OrderEvent::Removed(id.clone()));
        }
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Connectivity (fault injection)
    // -------------------------------------------------------------------------

    /// Flips the simulated connection. While disconnected every operation
    /// fails with [`StoreError::Offline`]; on reconnect, consumers resync
    /// from [`OrderStore::active_orders`].
    pub fn set_connected(&self, connected: bool) {
        let mut inner = self.lock();
        if inner.connected != connected {
            info!(connected, "store connectivity changed");
        }
        inner.connected = connected;
    }

    /// Current simulated connectivity.
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// Number of stored documents (any status).
    pub fn len(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
