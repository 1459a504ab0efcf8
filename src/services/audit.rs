use chrono::Utc;
use tracing::debug;

use crate::entities::{order, order_detail, order_detail_dump, order_dump};
use crate::repositories::OrderWrite;

/// Adds point-in-time copies of orders and line items to a pending write,
/// so they land in the same commit as the rows that overwrite them.
#[derive(Clone, Copy, Debug)]
pub struct AuditWriter {
    enabled: bool,
}

impl AuditWriter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn snapshot_order(&self, write: &mut OrderWrite, source: &order::Model, actor: &str) {
        if !self.enabled {
            return;
        }
        debug!(order_id = source.id, "staging order snapshot");
        write
            .order_dumps
            .push(order_dump::Model::snapshot_of(source, 0, actor, Utc::now()));
    }

    pub fn snapshot_order_detail(
        &self,
        write: &mut OrderWrite,
        source: &order_detail::Model,
        actor: &str,
    ) {
        if !self.enabled {
            return;
        }
        debug!(order_detail_id = source.id, "staging order detail snapshot");
        write
            .order_detail_dumps
            .push(order_detail_dump::Model::snapshot_of(source, 0, actor, Utc::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use crate::repositories::{InMemoryStore, OrderStore};
    use rust_decimal_macros::dec;

    async fn seeded() -> (InMemoryStore, order::Model) {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let order = store
            .insert_order(order::Model {
                id: 0,
                ordered_by: 1,
                ordered_for: now,
                ordered_to: "Gedung A".into(),
                num_of_menus: 0,
                qty_of_menus: 0,
                amount: dec!(0),
                purpose: "Rapat".into(),
                activity: String::new(),
                source_of_fund: String::new(),
                payment_option: String::new(),
                info: String::new(),
                status: OrderStatus::Pending,
                paid_by_customer_at: None,
                created_at: now,
                updated_at: now,
                created_by: "seed".into(),
                updated_by: None,
            })
            .await;
        (store, order)
    }

    #[tokio::test]
    async fn disabled_writer_stages_nothing() {
        let (_, order) = seeded().await;
        let mut write = OrderWrite::default();
        AuditWriter::new(false).snapshot_order(&mut write, &order, "Budi");
        assert!(write.is_empty());
    }

    #[tokio::test]
    async fn snapshot_keeps_source_id_and_actor() {
        let (store, order) = seeded().await;
        let mut write = OrderWrite::default();
        AuditWriter::new(true).snapshot_order(&mut write, &order, "Budi");
        store.commit_order_write(write).await.unwrap();

        let dumps = store.order_dumps().await;
        assert_eq!(dumps.len(), 1);
        assert_eq!(dumps[0].source_id, order.id);
        assert_eq!(dumps[0].dumped_by, "Budi");
        assert_eq!(dumps[0].status, OrderStatus::Pending);
    }
}
