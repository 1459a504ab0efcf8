//! Property-based tests for the order aggregate.
//!
//! Whatever sequence of line item mutations runs, the stored order totals
//! must equal a fresh scan of its live line items and the order status must
//! match its forwarding progress.

mod common;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use common::{TestEngine, ACTOR};
use itsfood_admin::{
    entities::order_detail,
    models::{OrderDetailStatus, OrderStatus},
    repositories::OrderStore,
    services::{
        aggregator::compute_totals,
        order_details::{ChangeQtyRequest, ChangeStatusRequest},
        order_status::forwarding_status,
        vendor_notification::sanitize_phone_number,
    },
};

fn status_strategy() -> impl Strategy<Value = OrderDetailStatus> {
    prop_oneof![
        Just(OrderDetailStatus::Pending),
        Just(OrderDetailStatus::Sent),
        Just(OrderDetailStatus::Cancelled),
    ]
}

fn line_strategy() -> impl Strategy<Value = (i32, i64, OrderDetailStatus)> {
    (1i32..50, 0i64..200_000, status_strategy())
}

fn line(id: i64, qty: i32, price: i64, status: OrderDetailStatus) -> order_detail::Model {
    let now = Utc::now();
    order_detail::Model {
        id,
        order_id: 1,
        menu_id: 1,
        qty,
        price: Decimal::from(price),
        cogs: Decimal::ZERO,
        note: String::new(),
        status,
        reason_for_cancellation: None,
        paid_to_vendor_at: None,
        created_at: now,
        updated_at: now,
        created_by: "seed".into(),
        updated_by: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn totals_only_count_live_items(lines in prop::collection::vec(line_strategy(), 0..20)) {
        let details: Vec<_> = lines
            .iter()
            .enumerate()
            .map(|(i, (qty, price, status))| line(i as i64 + 1, *qty, *price, *status))
            .collect();

        let totals = compute_totals(&details).expect("no overflow at these sizes");

        let live: Vec<_> = details.iter().filter(|d| !d.status.is_cancelled()).collect();
        let amount: Decimal = live.iter().map(|d| d.line_total()).sum();
        let qty: i32 = live.iter().map(|d| d.qty).sum();

        prop_assert_eq!(totals.amount, amount);
        prop_assert_eq!(totals.qty_of_menus, qty);
        prop_assert_eq!(totals.num_of_menus as usize, live.len());
    }

    #[test]
    fn cancelling_an_item_never_raises_the_total(
        lines in prop::collection::vec(line_strategy(), 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut details: Vec<_> = lines
            .iter()
            .enumerate()
            .map(|(i, (qty, price, status))| line(i as i64 + 1, *qty, *price, *status))
            .collect();
        let before = compute_totals(&details).unwrap();

        let idx = pick.index(details.len());
        details[idx].status = OrderDetailStatus::Cancelled;
        let after = compute_totals(&details).unwrap();

        prop_assert!(after.amount <= before.amount);
        prop_assert!(after.num_of_menus <= before.num_of_menus);
    }
}

#[derive(Clone, Debug)]
enum Mutation {
    Qty(usize, i32),
    Cancel(usize),
    Send(usize),
    Reset(usize),
    Forward(bool),
}

fn mutation_strategy() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        (0usize..3, 1i32..10).prop_map(|(i, q)| Mutation::Qty(i, q)),
        (0usize..3).prop_map(Mutation::Cancel),
        (0usize..3).prop_map(Mutation::Send),
        (0usize..3).prop_map(Mutation::Reset),
        any::<bool>().prop_map(Mutation::Forward),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn order_follows_its_line_items_after_every_mutation(ops in prop::collection::vec(mutation_strategy(), 1..12)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime builds");

        runtime.block_on(async {
            let t = TestEngine::new().await;
            let details = t.fixture.details;

            for op in ops {
                // Rejected mutations are part of the sequence
                let _ = match op {
                    Mutation::Qty(i, qty) => t
                        .engine
                        .change_qty(details[i], ChangeQtyRequest { qty }, ACTOR)
                        .await
                        .map(|_| ()),
                    Mutation::Cancel(i) => t
                        .engine
                        .change_status(
                            details[i],
                            ChangeStatusRequest {
                                status: OrderDetailStatus::Cancelled,
                                reason: Some("uji".to_string()),
                            },
                            ACTOR,
                        )
                        .await
                        .map(|_| ()),
                    Mutation::Send(i) => t
                        .engine
                        .change_status(
                            details[i],
                            ChangeStatusRequest {
                                status: OrderDetailStatus::Sent,
                                reason: None,
                            },
                            ACTOR,
                        )
                        .await
                        .map(|_| ()),
                    Mutation::Reset(i) => t
                        .engine
                        .change_status(
                            details[i],
                            ChangeStatusRequest {
                                status: OrderDetailStatus::Pending,
                                reason: None,
                            },
                            ACTOR,
                        )
                        .await
                        .map(|_| ()),
                    Mutation::Forward(first) => {
                        let vendor = if first { t.fixture.vendor_a } else { t.fixture.vendor_b };
                        t.engine
                            .notify_vendor(t.fixture.order_id, vendor, ACTOR)
                            .await
                            .map(|_| ())
                    }
                };

                let order = t.order().await;
                let stored = t.store.find_order_details(t.fixture.order_id).await.unwrap();
                if stored.iter().all(|d| d.status.is_cancelled()) {
                    assert_eq!(order.status, OrderStatus::Cancelled);
                } else {
                    match forwarding_status(&stored) {
                        Some(expected) => assert_eq!(order.status, expected),
                        None => assert_eq!(order.status, OrderStatus::Pending),
                    }
                }
            }

            let order = t.order().await;
            let stored = t.store.find_order_details(t.fixture.order_id).await.unwrap();
            let fresh = compute_totals(&stored).unwrap();

            assert_eq!(order.amount, fresh.amount);
            assert_eq!(order.num_of_menus, fresh.num_of_menus);
            assert_eq!(order.qty_of_menus, fresh.qty_of_menus);
        });
    }
}

fn phone_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "08[0-9]{7,11}",
        "\\+62 ?8[0-9]{7,11}",
        "62[0-9]{7,12}",
        "[0-9 +()-]{0,20}",
    ]
}

proptest! {
    #[test]
    fn normalised_phone_numbers_are_fixed_points(raw in phone_strategy()) {
        if let Ok(once) = sanitize_phone_number(&raw) {
            prop_assert_eq!(sanitize_phone_number(&once).ok(), Some(once));
        }
    }
}
