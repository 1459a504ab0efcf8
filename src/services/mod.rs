// Mutations on orders and line items
pub mod aggregator;
pub mod ledger;
pub mod order_details;
pub mod vendor_notification;

// Helpers shared by the mutations
pub mod audit;
pub mod locks;
pub mod order_status;

// Read models
pub mod directory;
pub mod orders;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::entities::{order, order_detail};
use crate::errors::ServiceError;
use crate::notifications::NotificationDispatcher;
use crate::repositories::OrderStore;

use self::audit::AuditWriter;
use self::locks::OrderLocks;

/// Entries kept in the lock table before idle ones are dropped.
const LOCK_TABLE_PRUNE_THRESHOLD: usize = 1024;

/// Settings the engine reads at construction time.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub audit_snapshots_enabled: bool,
    pub messaging_link_base: String,
}

impl From<&AppConfig> for EngineSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            audit_snapshots_enabled: cfg.audit_snapshots_enabled,
            messaging_link_base: cfg.messaging_link_base.clone(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            audit_snapshots_enabled: true,
            messaging_link_base: "https://wa.me".to_string(),
        }
    }
}

/// Order lifecycle and reconciliation engine.
///
/// The operations live in the submodules as `impl OrderEngine` blocks; this
/// type only holds the collaborators they share.
#[derive(Clone)]
pub struct OrderEngine {
    store: Arc<dyn OrderStore>,
    notifications: NotificationDispatcher,
    locks: OrderLocks,
    audit: AuditWriter,
    settings: EngineSettings,
}

impl OrderEngine {
    pub fn new(
        store: Arc<dyn OrderStore>,
        notifications: NotificationDispatcher,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            notifications,
            locks: OrderLocks::new(),
            audit: AuditWriter::new(settings.audit_snapshots_enabled),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    async fn load_order(&self, order_id: i64) -> Result<order::Model, ServiceError> {
        self.store
            .find_order(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", order_id)))
    }

    async fn load_order_detail(&self, detail_id: i64) -> Result<order_detail::Model, ServiceError> {
        self.store
            .find_order_detail(detail_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("order detail {} not found", detail_id))
            })
    }

    async fn menu_name(&self, menu_id: i64) -> Result<String, ServiceError> {
        Ok(self
            .store
            .find_menu(menu_id)
            .await?
            .map(|m| m.name)
            .unwrap_or_else(|| format!("menu #{}", menu_id)))
    }

    fn release_idle_locks(&self) {
        if self.locks.len() > LOCK_TABLE_PRUNE_THRESHOLD {
            self.locks.prune();
        }
    }
}
