//! Integration tests for placing and following orders.
//!
//! Latencies are real `tokio::time::sleep` calls, so every async test runs
//! with a paused clock.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use bistro_core::{OrderId, OrderStatus, Price};
use bistro_integration_tests::{item, open_state, open_state_with, order_request};
use bistro_store::config::StoreConfig;
use bistro_store::orders::{OrderConfig, OrderError, TransitionPolicy};
use bistro_store::persistence::{FileStore, KeyValueStore, MemoryStore, ORDERS_KEY};

// =============================================================================
// Placement
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_order_ids_continue_after_reload() {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let state = open_state(Arc::clone(&storage)).await;

    let first = state
        .orders()
        .place_order(order_request("Ada", Vec::new()))
        .await
        .unwrap();
    let second = state
        .orders()
        .place_order(order_request("Grace", Vec::new()))
        .await
        .unwrap();
    assert_eq!(first.id, OrderId::new(1));
    assert_eq!(second.id, OrderId::new(2));
    drop(state);

    let reopened = open_state(storage).await;
    let third = reopened
        .orders()
        .place_order(order_request("Barbara", Vec::new()))
        .await
        .unwrap();
    assert_eq!(third.id, OrderId::new(3));
    assert_eq!(
        reopened
            .orders()
            .orders()
            .get()
            .iter()
            .map(|order| order.id.as_u32())
            .collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test(start_paused = true)]
async fn test_order_is_visible_while_submitting() {
    let state = open_state(Arc::new(MemoryStore::new())).await;
    let mut ledger = state.orders().orders().subscribe();
    assert!(ledger.next().await.unwrap().is_empty());

    let submitting = state
        .orders()
        .place_order(order_request("Ada", Vec::new()));
    let seen = ledger.next().await.unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].status, OrderStatus::Pending);

    let placed = submitting.await.unwrap();
    assert_eq!(placed, seen[0]);
}

#[tokio::test(start_paused = true)]
async fn test_other_operations_run_during_submission() {
    let state = open_state(Arc::new(MemoryStore::new())).await;
    let submitting = tokio::spawn(
        state
            .orders()
            .place_order(order_request("Ada", Vec::new())),
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    state.cart().add_line(item(&state, 1), 1, None);
    assert_eq!(state.cart().count().get(), 1);
    assert!(!submitting.is_finished());

    let order = submitting.await.unwrap().unwrap();
    assert_eq!(order.id, OrderId::new(1));
}

#[tokio::test(start_paused = true)]
async fn test_order_snapshot_ignores_later_cart_changes() {
    let state = open_state(Arc::new(MemoryStore::new())).await;
    let cart = state.cart();
    let line = cart.add_line(item(&state, 1), 2, None).unwrap();
    cart.add_line(item(&state, 4), 1, None);

    let order = state
        .orders()
        .place_order(order_request("Ada", cart.snapshot()))
        .await
        .unwrap();
    assert_eq!(order.total_amount, Price::from_cents(3400));

    cart.set_quantity(line, 9);
    cart.clear();

    let stored = state.orders().get(order.id).unwrap();
    assert_eq!(stored.items.len(), 2);
    assert_eq!(stored.items[0].quantity, 2);
    assert_eq!(stored.total_amount, Price::from_cents(3400));
    assert_eq!(stored.item_count(), 3);
}

// =============================================================================
// Status updates
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_unknown_order_leaves_ledger_unchanged() {
    let storage = Arc::new(MemoryStore::new());
    let state = open_state(storage.clone()).await;
    state
        .orders()
        .place_order(order_request("Ada", Vec::new()))
        .await
        .unwrap();
    let before = state.orders().orders().get();
    let stored_before = storage.read(ORDERS_KEY);

    let result = state
        .orders()
        .update_status(OrderId::new(99), OrderStatus::Delivered)
        .await;

    assert_eq!(result, Err(OrderError::NotFound(OrderId::new(99))));
    assert_eq!(state.orders().orders().get(), before);
    assert_eq!(storage.read(ORDERS_KEY), stored_before);
}

#[tokio::test(start_paused = true)]
async fn test_status_walk_persists() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
    let state = open_state(Arc::clone(&storage)).await;
    let order = state
        .orders()
        .place_order(order_request("Ada", Vec::new()))
        .await
        .unwrap();
    let watched = state.orders().order_by_id(order.id);

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ] {
        let updated = state.orders().update_status(order.id, status).await.unwrap();
        assert_eq!(updated.status, status);
        assert_eq!(watched.get().unwrap().status, status);
    }
    drop(state);

    let reopened = open_state(storage).await;
    let restored = reopened.orders().get(order.id).unwrap();
    assert_eq!(restored.status, OrderStatus::Delivered);
    assert_eq!(restored.order_date, order.order_date);
}

#[tokio::test(start_paused = true)]
async fn test_strict_policy_from_config() {
    let config = StoreConfig {
        orders: OrderConfig {
            policy: TransitionPolicy::Strict,
            ..OrderConfig::default()
        },
        ..StoreConfig::default()
    };
    let state = open_state_with(config, Arc::new(MemoryStore::new())).await;
    let order = state
        .orders()
        .place_order(order_request("Ada", Vec::new()))
        .await
        .unwrap();

    state.orders().cancel_order(order.id).await.unwrap();
    let reopen = state
        .orders()
        .update_status(order.id, OrderStatus::Confirmed)
        .await;
    assert!(matches!(
        reopen,
        Err(OrderError::IllegalTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Confirmed,
            ..
        })
    ));
    assert_eq!(
        state.orders().get(order.id).unwrap().status,
        OrderStatus::Cancelled
    );
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_ledger_starts_over_at_one() {
    let storage = Arc::new(MemoryStore::new());
    storage.write(ORDERS_KEY, b"{\"orders\": 3}").unwrap();

    let state = open_state(storage).await;
    assert!(state.orders().orders().get().is_empty());
    let order = state
        .orders()
        .place_order(order_request("Ada", Vec::new()))
        .await
        .unwrap();
    assert_eq!(order.id, OrderId::new(1));
}
