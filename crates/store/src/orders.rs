//! The order ledger.
//!
//! Orders are appended by [`OrderStore::place_order`] and afterwards only
//! change status. Both mutations take effect when they are called; the future
//! they return only models the round trip to a kitchen backend, resolving
//! after a configured latency.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bistro_core::{CustomerId, Order, OrderId, OrderRequest, OrderStatus};
use chrono::Utc;
use thiserror::Error;

use crate::observable::{Observable, Subject};
use crate::persistence::{KeyValueStore, ORDERS_KEY, load_document, save_document};

/// Counter value once every `u32` ID has been handed out.
const IDS_EXHAUSTED: u64 = 1 << 32;

/// Errors returned by order placement and status updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// No order has this ID.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The status graph does not allow this step (strict policy only).
    #[error("order {id} cannot move from {from} to {to}")]
    IllegalTransition {
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Every order ID has been used.
    #[error("no order IDs left")]
    IdsExhausted,
}

/// How status updates are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may be set from any other.
    #[default]
    Permissive,
    /// Only steps allowed by [`OrderStatus::can_transition_to`].
    Strict,
}

/// Order store settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderConfig {
    /// Delay before a placed order is reported back.
    pub submit_latency: Duration,
    /// Delay before a status update is reported back.
    pub status_latency: Duration,
    pub policy: TransitionPolicy,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            submit_latency: Duration::from_millis(1000),
            status_latency: Duration::from_millis(500),
            policy: TransitionPolicy::Permissive,
        }
    }
}

/// Holds every order placed, oldest first.
#[derive(Debug)]
pub struct OrderStore {
    orders: Subject<Vec<Order>>,
    next_order_id: AtomicU64,
    next_customer_id: AtomicU64,
    config: OrderConfig,
    storage: Arc<dyn KeyValueStore>,
}

impl OrderStore {
    /// Open the ledger, restoring any orders persisted under [`ORDERS_KEY`].
    ///
    /// ID counters resume at one past the highest restored ID.
    #[must_use]
    pub fn open(storage: Arc<dyn KeyValueStore>, config: OrderConfig) -> Self {
        let orders = load_document::<Vec<Order>>(storage.as_ref(), ORDERS_KEY).unwrap_or_default();

        let next_order_id = orders
            .iter()
            .map(|order| order.id)
            .max()
            .map_or(Some(OrderId::new(1)), |id| id.checked_next());
        let next_customer_id = orders
            .iter()
            .map(|order| order.customer.id)
            .max()
            .map_or(Some(CustomerId::new(1)), |id| id.checked_next());

        tracing::info!(
            orders = orders.len(),
            next_order_id = ?next_order_id,
            "restored order ledger"
        );

        Self {
            orders: Subject::new(orders),
            next_order_id: AtomicU64::new(
                next_order_id.map_or(IDS_EXHAUSTED, |id| id.as_u32().into()),
            ),
            next_customer_id: AtomicU64::new(
                next_customer_id.map_or(IDS_EXHAUSTED, |id| id.as_u32().into()),
            ),
            config,
            storage,
        }
    }

    /// Place an order for `request`.
    ///
    /// The order is built, appended, and persisted before this returns. The
    /// returned future resolves to it after the submit latency. Nothing in the
    /// request is validated here.
    ///
    /// IDs are never reused: once the ID range is used up, the future resolves
    /// at once with [`OrderError::IdsExhausted`] and the ledger is untouched.
    pub fn place_order(
        &self,
        request: OrderRequest,
    ) -> impl Future<Output = Result<Order, OrderError>> + Send + use<> {
        let outcome = self.append(request);
        let latency = self.config.submit_latency;
        async move {
            let order = outcome?;
            tokio::time::sleep(latency).await;
            Ok(order)
        }
    }

    fn append(&self, request: OrderRequest) -> Result<Order, OrderError> {
        let ids = claim_id(&self.next_order_id).and_then(|id| {
            claim_id(&self.next_customer_id)
                .map(|customer_id| (OrderId::new(id), CustomerId::new(customer_id)))
        });
        let Some((id, customer_id)) = ids else {
            tracing::error!("order rejected: no order IDs left");
            return Err(OrderError::IdsExhausted);
        };
        let order = Order::from_request(id, customer_id, request, Utc::now());

        self.orders.modify(|orders| {
            orders.push(order.clone());
            true
        });
        tracing::info!(
            order_id = %id,
            total = %order.total_amount,
            items = order.item_count(),
            "order placed"
        );
        self.persist();
        Ok(order)
    }

    /// Set the status of an order.
    ///
    /// The ledger changes before this returns. An unknown ID, or an illegal
    /// step under [`TransitionPolicy::Strict`], resolves at once with an error
    /// and leaves the ledger untouched; success resolves after the status
    /// latency.
    pub fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<Order, OrderError>> + Send + use<> {
        let outcome = self.apply_status(id, status);
        let latency = self.config.status_latency;
        async move {
            let order = outcome?;
            tokio::time::sleep(latency).await;
            Ok(order)
        }
    }

    /// Shorthand for `update_status(id, OrderStatus::Cancelled)`.
    pub fn cancel_order(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Order, OrderError>> + Send + use<> {
        self.update_status(id, OrderStatus::Cancelled)
    }

    fn apply_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        let policy = self.config.policy;
        let mut outcome = Err(OrderError::NotFound(id));

        let changed = self.orders.modify(|orders| {
            let Some(order) = orders.iter_mut().find(|order| order.id == id) else {
                return false;
            };
            let from = order.status;
            if policy == TransitionPolicy::Strict && !from.can_transition_to(status) {
                outcome = Err(OrderError::IllegalTransition {
                    id,
                    from,
                    to: status,
                });
                return false;
            }

            order.status = status;
            outcome = Ok(order.clone());
            from != status
        });

        match &outcome {
            Ok(_) if changed => {
                tracing::info!(order_id = %id, status = %status, "order status updated");
                self.persist();
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "order status update rejected"),
        }
        outcome
    }

    fn persist(&self) {
        let result = self
            .orders
            .with(|orders| save_document(self.storage.as_ref(), ORDERS_KEY, orders));
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to persist order ledger");
        }
    }

    /// Every order, oldest first.
    #[must_use]
    pub fn orders(&self) -> Observable<Vec<Order>> {
        self.orders.observe()
    }

    /// The order with `id`, following its status changes.
    #[must_use]
    pub fn order_by_id(&self, id: OrderId) -> Observable<Option<Order>> {
        self.orders
            .observe()
            .map(move |orders: &Vec<Order>| orders.iter().find(|order| order.id == id).cloned())
    }

    /// Look up an order in the current ledger.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.orders
            .with(|orders| orders.iter().find(|order| order.id == id).cloned())
    }

    /// The ID the next placed order will get, if any are left.
    #[must_use]
    pub fn next_order_id(&self) -> Option<OrderId> {
        u32::try_from(self.next_order_id.load(Ordering::SeqCst))
            .ok()
            .map(OrderId::new)
    }
}

/// Take the next value of an ID counter, leaving it exhausted after `u32::MAX`.
fn claim_id(counter: &AtomicU64) -> Option<u32> {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| {
            (next < IDS_EXHAUSTED).then_some(next + 1)
        })
        .ok()
        .and_then(|id| u32::try_from(id).ok())
}
