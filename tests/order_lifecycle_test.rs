//! Line item mutations and the order totals they drive.

mod common;

use assert_matches::assert_matches;
use common::{TestEngine, ACTOR};
use rust_decimal_macros::dec;

use itsfood_admin::{
    errors::ServiceError,
    models::{OrderDetailStatus, OrderStatus},
    repositories::{OrderStore, OrderWrite},
    services::order_details::{
        ChangeMenuRequest, ChangeNoteRequest, ChangeQtyRequest, ChangeStatusRequest,
    },
};

fn cancel(reason: &str) -> ChangeStatusRequest {
    ChangeStatusRequest {
        status: OrderDetailStatus::Cancelled,
        reason: Some(reason.to_string()),
    }
}

fn set_status(status: OrderDetailStatus) -> ChangeStatusRequest {
    ChangeStatusRequest {
        status,
        reason: None,
    }
}

#[tokio::test]
async fn changing_qty_rewrites_order_totals() {
    let t = TestEngine::new().await;
    let [d1, _, _] = t.fixture.details;

    let update = t
        .engine
        .change_qty(d1, ChangeQtyRequest { qty: 4 }, ACTOR)
        .await
        .expect("qty change succeeds");

    assert_eq!(update.qty, 4);
    assert_eq!(update.updated_by.as_deref(), Some(ACTOR));
    let aggregate = update.order.expect("aggregate returned");
    assert_eq!(aggregate.totals.amount, dec!(205000));
    assert_eq!(aggregate.totals.qty_of_menus, 8);
    assert_eq!(aggregate.totals.num_of_menus, 3);

    let order = t.order().await;
    assert_eq!(order.amount, dec!(205000));
    assert_eq!(order.qty_of_menus, 8);
    assert_eq!(order.updated_by.as_deref(), Some(ACTOR));

    let messages = t.notifier.wait_for(1).await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Nasi Kotak Ayam"));
}

#[tokio::test]
async fn changing_menu_snapshots_the_new_price() {
    let t = TestEngine::new().await;
    let [_, d2, _] = t.fixture.details;

    let update = t
        .engine
        .change_menu(
            d2,
            ChangeMenuRequest {
                menu_id: t.fixture.menu_b1,
            },
            ACTOR,
        )
        .await
        .expect("menu change succeeds");

    assert_eq!(update.menu_id, t.fixture.menu_b1);
    assert_eq!(update.price, dec!(30000));
    assert_eq!(update.cogs, dec!(24000));
    assert_eq!(t.order().await.amount, dec!(170000));
}

#[tokio::test]
async fn changing_to_an_unknown_menu_is_not_found() {
    let t = TestEngine::new().await;
    let [d1, _, _] = t.fixture.details;

    let err = t
        .engine
        .change_menu(d1, ChangeMenuRequest { menu_id: 9_999 }, ACTOR)
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotFound(_));
    assert_eq!(t.detail(d1).await.menu_id, t.fixture.menu_a1);
}

#[tokio::test]
async fn zero_qty_is_rejected_before_touching_the_store() {
    let t = TestEngine::new().await;
    let [d1, _, _] = t.fixture.details;

    let err = t
        .engine
        .change_qty(d1, ChangeQtyRequest { qty: 0 }, ACTOR)
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(_));
    assert_eq!(t.detail(d1).await.qty, 2);
}

#[tokio::test]
async fn note_change_leaves_totals_alone() {
    let t = TestEngine::new().await;
    let [d1, _, _] = t.fixture.details;
    let before = t.order().await;

    let update = t
        .engine
        .change_note(
            d1,
            ChangeNoteRequest {
                note: "tanpa sambal".to_string(),
            },
            ACTOR,
        )
        .await
        .expect("note change succeeds");

    assert_eq!(update.note, "tanpa sambal");
    assert!(update.order.is_none());
    let after = t.order().await;
    assert_eq!(after.amount, before.amount);
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn unknown_line_item_is_not_found() {
    let t = TestEngine::new().await;
    let err = t
        .engine
        .change_qty(4_242, ChangeQtyRequest { qty: 1 }, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn cancelling_requires_a_reason() {
    let t = TestEngine::new().await;
    let [d1, _, _] = t.fixture.details;

    for reason in [None, Some("   ".to_string())] {
        let err = t
            .engine
            .change_status(
                d1,
                ChangeStatusRequest {
                    status: OrderDetailStatus::Cancelled,
                    reason,
                },
                ACTOR,
            )
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    assert_eq!(t.detail(d1).await.status, OrderDetailStatus::Pending);
}

#[tokio::test]
async fn cancelling_one_item_drops_it_from_the_totals() {
    let t = TestEngine::new().await;
    let [_, _, d3] = t.fixture.details;

    let update = t
        .engine
        .change_status(d3, cancel("Vendor tutup"), ACTOR)
        .await
        .expect("cancel succeeds");

    assert_eq!(update.status, OrderDetailStatus::Cancelled);
    assert_eq!(update.reason_for_cancellation.as_deref(), Some("Vendor tutup"));
    let aggregate = update.order.expect("aggregate returned");
    assert_eq!(aggregate.totals.amount, dec!(65000));
    assert_eq!(aggregate.totals.num_of_menus, 2);
    assert_eq!(aggregate.totals.qty_of_menus, 3);
    assert!(!aggregate.cascade_cancelled);
    assert_eq!(t.order().await.status, OrderStatus::Pending);

    let messages = t.notifier.wait_for(1).await;
    assert!(messages[0].contains("Alasan pembatalan: Vendor tutup"));
}

#[tokio::test]
async fn cancelling_every_item_cancels_the_order() {
    let t = TestEngine::new().await;

    let mut last = None;
    for id in t.fixture.details {
        last = Some(
            t.engine
                .change_status(id, cancel("Acara dibatalkan"), ACTOR)
                .await
                .expect("cancel succeeds"),
        );
    }

    let aggregate = last.and_then(|u| u.order).expect("aggregate returned");
    assert!(aggregate.cascade_cancelled);
    assert_eq!(aggregate.status, OrderStatus::Cancelled);

    let order = t.order().await;
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.amount, dec!(0));
    assert_eq!(order.num_of_menus, 0);
    assert_eq!(order.qty_of_menus, 0);

    // Three status messages plus the cascade notice
    let messages = t.notifier.wait_for(4).await;
    assert_eq!(messages.len(), 4);
    let cascades = messages
        .iter()
        .filter(|m| m.contains("dibatalkan secara otomatis"))
        .count();
    assert_eq!(cascades, 1);
}

#[tokio::test]
async fn cancelled_items_stay_cancelled() {
    let t = TestEngine::new().await;
    let [d1, _, _] = t.fixture.details;
    t.engine
        .change_status(d1, cancel("Salah pesan"), ACTOR)
        .await
        .expect("cancel succeeds");

    for next in [OrderDetailStatus::Pending, OrderDetailStatus::Sent] {
        let err = t
            .engine
            .change_status(d1, set_status(next), ACTOR)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(_));
    }

    let detail = t.detail(d1).await;
    assert_eq!(detail.status, OrderDetailStatus::Cancelled);
    assert_eq!(detail.reason_for_cancellation.as_deref(), Some("Salah pesan"));
}

#[tokio::test]
async fn reapplying_the_current_status_is_accepted() {
    let t = TestEngine::new().await;
    let [d1, _, _] = t.fixture.details;

    let update = t
        .engine
        .change_status(d1, set_status(OrderDetailStatus::Pending), ACTOR)
        .await
        .expect("same status is accepted");

    assert_eq!(update.status, OrderDetailStatus::Pending);
    assert_eq!(t.order().await.amount, dec!(155000));
}

#[tokio::test]
async fn resetting_a_sent_item_rederives_forwarding() {
    let t = TestEngine::new().await;
    let [d1, d2, d3] = t.fixture.details;

    t.engine
        .notify_vendor(t.fixture.order_id, t.fixture.vendor_a, ACTOR)
        .await
        .expect("vendor A forwarded");
    t.engine
        .notify_vendor(t.fixture.order_id, t.fixture.vendor_b, ACTOR)
        .await
        .expect("vendor B forwarded");
    assert_eq!(t.order().await.status, OrderStatus::ForwardedEntirely);

    t.engine
        .change_status(d3, set_status(OrderDetailStatus::Pending), ACTOR)
        .await
        .expect("reset succeeds");
    assert_eq!(t.order().await.status, OrderStatus::ForwardedPartially);

    for id in [d1, d2] {
        t.engine
            .change_status(id, set_status(OrderDetailStatus::Pending), ACTOR)
            .await
            .expect("reset succeeds");
    }
    assert_eq!(t.order().await.status, OrderStatus::Pending);
}

#[tokio::test]
async fn recompute_is_idempotent() {
    let t = TestEngine::new().await;

    let first = t
        .engine
        .recompute(t.fixture.order_id, ACTOR)
        .await
        .expect("recompute succeeds");
    let second = t
        .engine
        .recompute(t.fixture.order_id, ACTOR)
        .await
        .expect("recompute succeeds");

    assert_eq!(first, second);
    assert_eq!(first.totals.amount, dec!(155000));
    assert_eq!(first.totals.qty_of_menus, 6);
}

#[tokio::test]
async fn concurrent_qty_changes_keep_totals_consistent() {
    let t = TestEngine::new().await;
    let [d1, d2, d3] = t.fixture.details;

    let (a, b, c) = tokio::join!(
        t.engine.change_qty(d1, ChangeQtyRequest { qty: 5 }, ACTOR),
        t.engine.change_qty(d2, ChangeQtyRequest { qty: 2 }, ACTOR),
        t.engine.change_qty(d3, ChangeQtyRequest { qty: 1 }, ACTOR),
    );
    a.expect("d1 updated");
    b.expect("d2 updated");
    c.expect("d3 updated");

    // 5 * 25000 + 2 * 15000 + 1 * 30000
    let order = t.order().await;
    assert_eq!(order.amount, dec!(185000));
    assert_eq!(order.qty_of_menus, 8);
}

#[tokio::test]
async fn marking_items_sent_by_hand_forwards_the_order() {
    let t = TestEngine::new().await;
    let [d1, d2, d3] = t.fixture.details;

    let update = t
        .engine
        .change_status(d1, set_status(OrderDetailStatus::Sent), ACTOR)
        .await
        .expect("d1 marked sent");
    assert_eq!(
        update.order.expect("aggregate returned").status,
        OrderStatus::ForwardedPartially
    );
    assert_eq!(t.order().await.status, OrderStatus::ForwardedPartially);

    for id in [d2, d3] {
        t.engine
            .change_status(id, set_status(OrderDetailStatus::Sent), ACTOR)
            .await
            .expect("item marked sent");
    }
    let order = t.order().await;
    assert_eq!(order.status, OrderStatus::ForwardedEntirely);
    // Status changes to Sent never move the totals
    assert_eq!(order.amount, dec!(155000));
}

#[tokio::test]
async fn created_order_starts_forwarding_when_an_item_is_sent() {
    let t = TestEngine::new().await;
    let [d1, _, _] = t.fixture.details;
    let mut created = t.order().await;
    created.status = OrderStatus::Created;
    t.store
        .commit_order_write(OrderWrite {
            order: Some(created),
            ..OrderWrite::default()
        })
        .await
        .expect("order reset to Created");

    t.engine
        .change_status(d1, set_status(OrderDetailStatus::Sent), ACTOR)
        .await
        .expect("d1 marked sent");
    assert_eq!(t.order().await.status, OrderStatus::ForwardedPartially);

    t.engine
        .change_status(d1, set_status(OrderDetailStatus::Pending), ACTOR)
        .await
        .expect("d1 reset");
    assert_eq!(t.order().await.status, OrderStatus::Pending);
}

#[tokio::test]
async fn failed_write_leaves_the_item_and_order_untouched() {
    let t = TestEngine::with_refused_writes(1).await;
    let [d1, _, _] = t.fixture.details;

    let err = t
        .engine
        .change_qty(d1, ChangeQtyRequest { qty: 9 }, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::DatabaseError(_));
    assert_eq!(t.detail(d1).await.qty, 2);
    assert_eq!(t.order().await.amount, dec!(155000));

    t.engine
        .change_qty(d1, ChangeQtyRequest { qty: 9 }, ACTOR)
        .await
        .expect("retry succeeds");
    assert_eq!(t.order().await.amount, dec!(330000));
}
