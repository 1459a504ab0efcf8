use crate::entities::order_detail;
use crate::models::{OrderDetailStatus, OrderStatus};

/// Forwarding status of an order given all of its line items.
///
/// `ForwardedEntirely` needs every item, cancelled ones included, to be
/// `Sent`. Any `Sent` item short of that means `ForwardedPartially`.
/// Returns `None` when nothing has been forwarded yet.
pub fn forwarding_status(details: &[order_detail::Model]) -> Option<OrderStatus> {
    let sent = details
        .iter()
        .filter(|d| d.status == OrderDetailStatus::Sent)
        .count();

    match sent {
        0 => None,
        n if n == details.len() => Some(OrderStatus::ForwardedEntirely),
        _ => Some(OrderStatus::ForwardedPartially),
    }
}

/// Order status implied by the line items, given the status the order has.
///
/// An order with no live item is `Cancelled`. `Cancelled` and `Completed`
/// orders keep their status otherwise. Every other order follows
/// [`forwarding_status`], falling back to `Pending` once forwarding progress
/// is undone and keeping `Created`/`Pending` while nothing was sent.
pub fn derive_order_status(current: OrderStatus, details: &[order_detail::Model]) -> OrderStatus {
    if details.iter().all(|d| d.status.is_cancelled()) {
        return OrderStatus::Cancelled;
    }
    match current {
        OrderStatus::Cancelled | OrderStatus::Completed => current,
        OrderStatus::ForwardedPartially | OrderStatus::ForwardedEntirely => {
            forwarding_status(details).unwrap_or(OrderStatus::Pending)
        }
        OrderStatus::Created | OrderStatus::Pending => {
            forwarding_status(details).unwrap_or(current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn item(status: OrderDetailStatus) -> order_detail::Model {
        let now = Utc::now();
        order_detail::Model {
            id: 1,
            order_id: 1,
            menu_id: 1,
            qty: 1,
            price: dec!(10000),
            cogs: dec!(8000),
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

    use OrderDetailStatus::{Cancelled, Pending, Sent};

    #[rstest]
    #[case(vec![Sent, Sent], Some(OrderStatus::ForwardedEntirely))]
    #[case(vec![Sent, Pending], Some(OrderStatus::ForwardedPartially))]
    #[case(vec![Sent, Cancelled], Some(OrderStatus::ForwardedPartially))]
    #[case(vec![Pending, Cancelled], None)]
    #[case(vec![], None)]
    fn derives_forwarding_status(
        #[case] statuses: Vec<OrderDetailStatus>,
        #[case] expected: Option<OrderStatus>,
    ) {
        let details: Vec<_> = statuses.into_iter().map(item).collect();
        assert_eq!(forwarding_status(&details), expected);
    }

    #[rstest]
    #[case(OrderStatus::Pending, vec![Sent, Sent, Sent], OrderStatus::ForwardedEntirely)]
    #[case(OrderStatus::Created, vec![Sent, Pending], OrderStatus::ForwardedPartially)]
    #[case(OrderStatus::Pending, vec![Pending, Cancelled], OrderStatus::Pending)]
    #[case(OrderStatus::Created, vec![Pending], OrderStatus::Created)]
    #[case(OrderStatus::ForwardedEntirely, vec![Sent, Pending], OrderStatus::ForwardedPartially)]
    #[case(OrderStatus::ForwardedPartially, vec![Pending, Pending], OrderStatus::Pending)]
    #[case(OrderStatus::ForwardedPartially, vec![Cancelled, Cancelled], OrderStatus::Cancelled)]
    #[case(OrderStatus::Completed, vec![Sent, Pending], OrderStatus::Completed)]
    #[case(OrderStatus::Pending, vec![], OrderStatus::Cancelled)]
    fn derives_order_status(
        #[case] current: OrderStatus,
        #[case] statuses: Vec<OrderDetailStatus>,
        #[case] expected: OrderStatus,
    ) {
        let details: Vec<_> = statuses.into_iter().map(item).collect();
        assert_eq!(derive_order_status(current, &details), expected);
    }
}
