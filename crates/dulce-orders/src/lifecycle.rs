//! # Kitchen Lifecycle Coordinator
//!
//! The kitchen display's engine: maintains the live view of active orders,
//! applies manual transitions, auto-completes READY orders, and keeps the
//! board honest when the feed hiccups.
//!
//! ## Run Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KitchenCoordinator::run                          │
//! │                                                                         │
//! │   tokio::select! over:                                                  │
//! │                                                                         │
//! │   commands ─────────► start_preparing / mark_ready / mark_delivered    │
//! │   (KitchenHandle)     snapshot / take_alerts / auto-deliver / shutdown │
//! │                                                                         │
//! │   store feed ───────► whole-document upserts update the view;           │
//! │                       DELIVERED upserts leave the board;                │
//! │                       Lagged ──► full resync from the store             │
//! │                                                                         │
//! │   poll tick ────────► elapsed badges recomputed, late cards flagged    │
//! │                                                                         │
//! │   reconcile tick ───► overdue READY orders delivered (idempotent        │
//! │                       backup for the per-order timers), delivered       │
//! │                       orders past the grace window archived,            │
//! │                       offline store re-probed                           │
//! │                                                                         │
//! │   Entering READY also arms a per-order timer task; it is aborted if    │
//! │   the order leaves the board first.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Alert Discipline
//! Exactly one audible alert per order id, queued when the order first
//! appears on the board and drained by the display via `take_alerts`. Field
//! updates to an order the display has already seen never re-alert. Orders
//! already on the board when the coordinator starts are seeded silently.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use dulce_core::order::{Order, OrderStatus};
use dulce_store::{OrderEvent, OrderStore, StoreError};

use crate::config::OrdersConfig;
use crate::error::TransitionError;

/// Command channel depth. Taps and snapshot requests, never bulk data.
const COMMAND_CAPACITY: usize = 64;

// =============================================================================
// Display Types
// =============================================================================

/// One card on the kitchen display.
#[derive(Debug, Clone)]
pub struct KitchenCard {
    pub order: Order,
    /// Whole minutes since submission, refreshed every poll tick.
    pub elapsed_minutes: i64,
    /// True once the card crosses the alert threshold.
    pub late: bool,
}

/// The display's complete render state.
#[derive(Debug, Clone)]
pub struct KitchenSnapshot {
    /// Active cards, oldest submission first.
    pub cards: Vec<KitchenCard>,
    /// False while the store is unreachable; the cards are then the
    /// last-known list, not live data.
    pub connected: bool,
}

// =============================================================================
// Kitchen View (pure state, directly testable)
// =============================================================================

/// The coordinator's in-memory mirror of the active order set.
struct KitchenView {
    orders: HashMap<String, Order>,
    /// Order ids that have already produced their one audible alert.
    alerted: HashSet<String>,
    /// Order numbers waiting for the display to beep, FIFO.
    alerts: VecDeque<u64>,
    connected: bool,
}

impl KitchenView {
    fn new() -> Self {
        KitchenView {
            orders: HashMap::new(),
            alerted: HashSet::new(),
            alerts: VecDeque::new(),
            connected: true,
        }
    }

    /// Replaces the whole view from a store snapshot. `quiet` suppresses
    /// alerts for orders in the snapshot (startup backlog); a resync after
    /// lag is NOT quiet, so orders that arrived while lagging still beep.
    fn sync(&mut self, orders: Vec<Order>, quiet: bool) {
        self.orders.clear();
        for order in orders {
            if quiet {
                self.alerted.insert(order.id.clone());
            }
            self.upsert(order);
        }
    }

    /// Applies one whole-document upsert. A document that is no longer
    /// active has left the filtered view: treat it as a removal.
    fn upsert(&mut self, order: Order) {
        if !order.status.is_active() {
            self.orders.remove(&order.id);
            return;
        }
        if self.alerted.insert(order.id.clone()) {
            self.alerts.push_back(order.order_number);
        }
        self.orders.insert(order.id.clone(), order);
    }

    fn remove(&mut self, id: &str) {
        self.orders.remove(id);
    }

    fn get(&self, id: &str) -> Option<&Order> {
        self.orders.get(id)
    }

    /// Drains the pending audible alerts.
    fn take_alerts(&mut self) -> Vec<u64> {
        self.alerts.drain(..).collect()
    }

    /// READY orders whose auto-complete delay has fully elapsed.
    fn ready_overdue(&self, now: DateTime<Utc>, delay: ChronoDuration) -> Vec<String> {
        self.orders
            .values()
            .filter(|o| {
                o.status == OrderStatus::Ready
                    && o.ready_at.map(|at| at + delay <= now).unwrap_or(false)
            })
            .map(|o| o.id.clone())
            .collect()
    }

    /// Renders the current board.
    fn snapshot(&self, now: DateTime<Utc>, threshold: ChronoDuration) -> KitchenSnapshot {
        let threshold_minutes = threshold.num_minutes();
        let mut cards: Vec<KitchenCard> = self
            .orders
            .values()
            .map(|order| {
                let elapsed_minutes = order.elapsed_minutes(now);
                KitchenCard {
                    elapsed_minutes,
                    late: elapsed_minutes >= threshold_minutes,
                    order: order.clone(),
                }
            })
            .collect();
        cards.sort_by(|a, b| {
            a.order
                .created_at
                .cmp(&b.order.created_at)
                .then(a.order.order_number.cmp(&b.order.order_number))
        });
        KitchenSnapshot {
            cards,
            connected: self.connected,
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

enum Command {
    StartPreparing(String, oneshot::Sender<Result<Order, TransitionError>>),
    MarkReady(String, oneshot::Sender<Result<Order, TransitionError>>),
    MarkDelivered(String, oneshot::Sender<Result<Order, TransitionError>>),
    /// Fired by a per-order timer; silently ignored if the order already
    /// moved on.
    AutoDeliver(String),
    Snapshot(oneshot::Sender<KitchenSnapshot>),
    TakeAlerts(oneshot::Sender<Vec<u64>>),
    Shutdown,
}

// =============================================================================
// Handle
// =============================================================================

/// Handle for the kitchen display front end to drive the coordinator.
#[derive(Clone)]
pub struct KitchenHandle {
    tx: mpsc::Sender<Command>,
}

impl KitchenHandle {
    /// PENDING -> PREPARING (manual tap).
    pub async fn start_preparing(&self, order_id: &str) -> Result<Order, TransitionError> {
        self.request(|reply| Command::StartPreparing(order_id.to_string(), reply))
            .await?
    }

    /// PENDING/PREPARING -> READY (manual tap; arms the auto-complete timer).
    pub async fn mark_ready(&self, order_id: &str) -> Result<Order, TransitionError> {
        self.request(|reply| Command::MarkReady(order_id.to_string(), reply))
            .await?
    }

    /// READY -> DELIVERED (manual hand-over before the timer fires).
    pub async fn mark_delivered(&self, order_id: &str) -> Result<Order, TransitionError> {
        self.request(|reply| Command::MarkDelivered(order_id.to_string(), reply))
            .await?
    }

    /// The board as it stands right now.
    pub async fn snapshot(&self) -> Result<KitchenSnapshot, TransitionError> {
        self.request(Command::Snapshot).await
    }

    /// Drains pending audible alerts (order numbers, oldest first).
    pub async fn take_alerts(&self) -> Result<Vec<u64>, TransitionError> {
        self.request(Command::TakeAlerts).await
    }

    /// Asks the run loop to stop. Pending timers are aborted.
    pub async fn shutdown(&self) -> Result<(), TransitionError> {
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| TransitionError::Unavailable)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, TransitionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| TransitionError::Unavailable)?;
        reply_rx.await.map_err(|_| TransitionError::Unavailable)
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// The kitchen display's background engine. Construct with [`spawn`], drive
/// through the returned [`KitchenHandle`].
pub struct KitchenCoordinator {
    store: Arc<OrderStore>,
    config: OrdersConfig,
    view: KitchenView,
    /// Per-order auto-complete timers, keyed by order id.
    timers: HashMap<String, JoinHandle<()>>,
    /// Loopback sender the timer tasks fire [`Command::AutoDeliver`] on.
    /// `None` outside a running loop, in which case the reconcile sweep is
    /// the only auto-complete path.
    timer_tx: Option<mpsc::Sender<Command>>,
}

/// Spawns the coordinator over the store's live feed.
///
/// Fails only if the initial subscription cannot be taken (store offline at
/// startup).
pub fn spawn(
    store: Arc<OrderStore>,
    config: OrdersConfig,
) -> Result<(KitchenHandle, JoinHandle<()>), TransitionError> {
    let feed = store.subscribe()?;
    let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);

    let mut coordinator = KitchenCoordinator {
        store,
        config,
        view: KitchenView::new(),
        timers: HashMap::new(),
        timer_tx: Some(tx.clone()),
    };
    coordinator.view.sync(feed.initial, true);

    let join = tokio::spawn(async move { coordinator.run(rx, feed.events).await });
    Ok((KitchenHandle { tx }, join))
}

impl KitchenCoordinator {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: tokio::sync::broadcast::Receiver<OrderEvent>,
    ) {
        info!(
            orders = self.view.orders.len(),
            "kitchen coordinator started"
        );

        let mut poll = interval(self.config.elapsed_poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reconcile = interval(self.config.reconcile_interval);
        reconcile.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(Command::StartPreparing(id, reply)) => {
                            let _ = reply.send(self.transition(
                                &id,
                                OrderStatus::Preparing,
                                &[OrderStatus::Pending],
                            ));
                        }
                        Some(Command::MarkReady(id, reply)) => {
                            let _ = reply.send(self.transition(
                                &id,
                                OrderStatus::Ready,
                                &[OrderStatus::Pending, OrderStatus::Preparing],
                            ));
                        }
                        Some(Command::MarkDelivered(id, reply)) => {
                            let _ = reply.send(self.transition(
                                &id,
                                OrderStatus::Delivered,
                                &[OrderStatus::Ready],
                            ));
                        }
                        Some(Command::AutoDeliver(id)) => self.auto_deliver(&id),
                        Some(Command::Snapshot(reply)) => {
                            let _ = reply.send(self.view.snapshot(
                                Utc::now(),
                                chrono(self.config.alert_threshold),
                            ));
                        }
                        Some(Command::TakeAlerts(reply)) => {
                            let _ = reply.send(self.view.take_alerts());
                        }
                        Some(Command::Shutdown) | None => break,
                    }
                }

                event = events.recv() => {
                    use tokio::sync::broadcast::error::RecvError;
                    match event {
                        Ok(event) => self.apply_event(event),
                        Err(RecvError::Lagged(missed)) => {
                            warn!(missed, "feed lagged, resyncing from store");
                            self.resync(false);
                        }
                        Err(RecvError::Closed) => {
                            // Only possible if the store itself was dropped;
                            // keep the last-known board but stop.
                            error!("store feed closed, stopping coordinator");
                            self.view.connected = false;
                            break;
                        }
                    }
                }

                _ = poll.tick() => {
                    // Elapsed badges are derived in snapshot(); the tick just
                    // surfaces newly-late cards in the log.
                    let now = Utc::now();
                    let threshold = chrono(self.config.alert_threshold).num_minutes();
                    for order in self.view.orders.values() {
                        if order.elapsed_minutes(now) == threshold {
                            debug!(number = order.order_number, "order crossed late threshold");
                        }
                    }
                }

                _ = reconcile.tick() => self.reconcile(Utc::now()),
            }
        }

        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
        info!("kitchen coordinator stopped");
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Applies a manual transition after checking the order's current status
    /// against `allowed_from`. The losing side of a two-display race gets a
    /// [`TransitionError::Illegal`] and the board simply moves on.
    fn transition(
        &mut self,
        id: &str,
        to: OrderStatus,
        allowed_from: &[OrderStatus],
    ) -> Result<Order, TransitionError> {
        let current = self
            .view
            .get(id)
            .ok_or_else(|| TransitionError::NotOnBoard { id: id.to_string() })?;

        if !allowed_from.contains(&current.status) {
            let err = TransitionError::Illegal {
                id: id.to_string(),
                from: current.status,
                to,
            };
            warn!(%err, "rejected kitchen transition");
            return Err(err);
        }

        let updated = self.store.update_status(id, to, Utc::now())?;
        self.on_store_success();
        // The feed will echo this, but applying directly keeps the very next
        // snapshot consistent with what the tapping display just did.
        self.apply_event(OrderEvent::Upserted(updated.clone()));
        Ok(updated)
    }

    /// Timer-driven completion. Quietly skips orders that already moved.
    fn auto_deliver(&mut self, id: &str) {
        let still_ready = self
            .view
            .get(id)
            .map(|o| o.status == OrderStatus::Ready)
            .unwrap_or(false);
        if !still_ready {
            return;
        }
        match self.store.update_status(id, OrderStatus::Delivered, Utc::now()) {
            Ok(updated) => {
                info!(number = updated.order_number, "order auto-delivered");
                self.on_store_success();
                self.apply_event(OrderEvent::Upserted(updated));
            }
            Err(err) => self.on_store_error(&err, "auto-deliver failed"),
        }
    }

    // -------------------------------------------------------------------------
    // Feed handling
    // -------------------------------------------------------------------------

    fn apply_event(&mut self, event: OrderEvent) {
        match event {
            OrderEvent::Upserted(order) => {
                let id = order.id.clone();
                let arms_timer = order.status == OrderStatus::Ready;
                let leaves_board = !order.status.is_active();
                self.view.upsert(order);

                if leaves_board {
                    self.disarm_timer(&id);
                } else if arms_timer {
                    self.arm_timer(&id);
                }
            }
            OrderEvent::Removed(id) => {
                self.view.remove(&id);
                self.disarm_timer(&id);
            }
        }
    }

    /// Pulls the full active set from the store. Used after feed lag and
    /// when probing an offline store.
    fn resync(&mut self, quiet: bool) {
        match self.store.active_orders() {
            Ok(orders) => {
                self.view.sync(orders, quiet);
                self.on_store_success();
            }
            Err(err) => self.on_store_error(&err, "resync failed"),
        }
    }

    // -------------------------------------------------------------------------
    // Timers & reconciliation
    // -------------------------------------------------------------------------

    /// Arms the one-shot auto-complete timer for an order that just became
    /// READY. Duplicate READY events keep the original timer.
    fn arm_timer(&mut self, id: &str) {
        let Some(tx) = self.timer_tx.clone() else {
            return;
        };
        if self.timers.contains_key(id) {
            return;
        }
        let delay = self.config.ready_autocomplete_delay;
        let order_id = id.to_string();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Command::AutoDeliver(order_id)).await;
        });
        self.timers.insert(id.to_string(), timer);
    }

    fn disarm_timer(&mut self, id: &str) {
        if let Some(timer) = self.timers.remove(id) {
            timer.abort();
        }
    }

    /// The idempotent sweep: delivers overdue READY orders (covering lost
    /// timers and restarts), archives delivered orders past the grace
    /// window, and re-probes an offline store.
    fn reconcile(&mut self, now: DateTime<Utc>) {
        if !self.view.connected {
            // Probe quietly; a successful resync flips the indicator back.
            self.resync(true);
            if !self.view.connected {
                return;
            }
        }

        let delay = chrono(self.config.ready_autocomplete_delay);
        for id in self.view.ready_overdue(now, delay) {
            self.auto_deliver(&id);
        }

        let cutoff = now - chrono(self.config.archive_grace);
        match self.store.archive_delivered(cutoff) {
            Ok(removed) => {
                for id in &removed {
                    self.view.remove(id);
                    self.disarm_timer(id);
                }
            }
            Err(err) => self.on_store_error(&err, "archive sweep failed"),
        }
    }

    // -------------------------------------------------------------------------
    // Connectivity indicator
    // -------------------------------------------------------------------------

    fn on_store_success(&mut self) {
        if !self.view.connected {
            info!("store connection restored");
        }
        self.view.connected = true;
    }

    fn on_store_error(&mut self, err: &StoreError, context: &str) {
        warn!(%err, "{context}");
        if matches!(err, StoreError::Offline) {
            if self.view.connected {
                warn!("store offline, retaining last-known board");
            }
            self.view.connected = false;
        }
    }
}

/// std `Duration` to chrono, saturating instead of panicking on overflow.
fn chrono(duration: std::time::Duration) -> ChronoDuration {
    ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================
