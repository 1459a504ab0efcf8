use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{
    AdminAccount, CustomerProfile, DirectoryQuery, NewLedgerEntry, OrderListFilter, OrderStore,
    OrderSummary, OrderWrite, Page, PageRequest, VendorContact, VendorPaymentTally,
};
use crate::entities::{
    admin, cost, customer, discount, menu, order, order_detail, order_detail_dump, order_dump,
    unit, user, vendor,
};
use crate::errors::ServiceError;
use crate::models::{LedgerStatus, OrderStatus};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, user::Model>,
    admins: BTreeMap<i64, admin::Model>,
    units: BTreeMap<i64, unit::Model>,
    customers: BTreeMap<i64, customer::Model>,
    vendors: BTreeMap<i64, vendor::Model>,
    menus: BTreeMap<i64, menu::Model>,
    orders: BTreeMap<i64, order::Model>,
    order_details: BTreeMap<i64, order_detail::Model>,
    costs: BTreeMap<i64, cost::Model>,
    discounts: BTreeMap<i64, discount::Model>,
    order_dumps: Vec<order_dump::Model>,
    order_detail_dumps: Vec<order_detail_dump::Model>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn customer_profile(&self, customer_id: i64) -> Option<CustomerProfile> {
        let customer = self.customers.get(&customer_id)?;
        let user = self.users.get(&customer.user_id);
        let unit = self.units.get(&customer.unit_id);
        Some(CustomerProfile {
            id: customer.id,
            user_id: customer.user_id,
            name: user.map(|u| u.name.clone()).unwrap_or_default(),
            phone: user.map(|u| u.phone.clone()).unwrap_or_default(),
            email: user.map(|u| u.email.clone()).unwrap_or_default(),
            customer_type: customer.customer_type.clone(),
            unit_id: customer.unit_id,
            unit_name: unit.map(|u| u.name.clone()).unwrap_or_default(),
            status: customer.status.clone(),
            created_by: customer.created_by.clone(),
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        })
    }

    fn vendor_contact(&self, vendor_id: i64) -> Option<VendorContact> {
        let vendor = self.vendors.get(&vendor_id)?;
        let user = self.users.get(&vendor.user_id);
        Some(VendorContact {
            id: vendor.id,
            user_id: vendor.user_id,
            name: user.map(|u| u.name.clone()).unwrap_or_default(),
            phone: user.map(|u| u.phone.clone()).unwrap_or_default(),
            address: vendor.address.clone(),
        })
    }

    fn vendor_payment_tally(&self, order_id: i64) -> VendorPaymentTally {
        self.order_details
            .values()
            .filter(|d| d.order_id == order_id && !d.status.is_cancelled())
            .fold(VendorPaymentTally::default(), |mut tally, d| {
                tally.total += 1;
                if d.paid_to_vendor_at.is_some() {
                    tally.paid += 1;
                }
                tally
            })
    }
}

/// Process-local [`OrderStore`] used by the test suites and the demo mode.
///
/// IDs come from a single sequence shared by every table.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, mut model: user::Model) -> user::Model {
        let mut t = self.tables.write().await;
        model.id = t.next_id();
        t.users.insert(model.id, model.clone());
        model
    }

    pub async fn insert_admin(&self, mut model: admin::Model) -> admin::Model {
        let mut t = self.tables.write().await;
        model.id = t.next_id();
        t.admins.insert(model.id, model.clone());
        model
    }

    pub async fn insert_unit(&self, mut model: unit::Model) -> unit::Model {
        let mut t = self.tables.write().await;
        model.id = t.next_id();
        t.units.insert(model.id, model.clone());
        model
    }

    pub async fn insert_customer(&self, mut model: customer::Model) -> customer::Model {
        let mut t = self.tables.write().await;
        model.id = t.next_id();
        t.customers.insert(model.id, model.clone());
        model
    }

    pub async fn insert_vendor(&self, mut model: vendor::Model) -> vendor::Model {
        let mut t = self.tables.write().await;
        model.id = t.next_id();
        t.vendors.insert(model.id, model.clone());
        model
    }

    pub async fn insert_menu(&self, mut model: menu::Model) -> menu::Model {
        let mut t = self.tables.write().await;
        model.id = t.next_id();
        t.menus.insert(model.id, model.clone());
        model
    }

    pub async fn insert_order(&self, mut model: order::Model) -> order::Model {
        let mut t = self.tables.write().await;
        model.id = t.next_id();
        t.orders.insert(model.id, model.clone());
        model
    }

    pub async fn insert_order_detail(&self, mut model: order_detail::Model) -> order_detail::Model {
        let mut t = self.tables.write().await;
        model.id = t.next_id();
        t.order_details.insert(model.id, model.clone());
        model
    }

    pub async fn order_dumps(&self) -> Vec<order_dump::Model> {
        self.tables.read().await.order_dumps.clone()
    }

    pub async fn order_detail_dumps(&self) -> Vec<order_detail_dump::Model> {
        self.tables.read().await.order_detail_dumps.clone()
    }
}

fn missing(what: &str, id: i64) -> ServiceError {
    ServiceError::database_error_message(format!("{} {} does not exist", what, id))
}

fn matches_search(haystack: &str, search: Option<&str>) -> bool {
    match search {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn find_order(&self, id: i64) -> Result<Option<order::Model>, ServiceError> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn find_order_detail(
        &self,
        id: i64,
    ) -> Result<Option<order_detail::Model>, ServiceError> {
        Ok(self.tables.read().await.order_details.get(&id).cloned())
    }

    async fn find_order_details(
        &self,
        order_id: i64,
    ) -> Result<Vec<order_detail::Model>, ServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .order_details
            .values()
            .filter(|d| d.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn find_menu(&self, id: i64) -> Result<Option<menu::Model>, ServiceError> {
        Ok(self.tables.read().await.menus.get(&id).cloned())
    }

    async fn find_menus(&self, ids: &[i64]) -> Result<Vec<menu::Model>, ServiceError> {
        let t = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| t.menus.get(id).cloned()).collect())
    }

    async fn find_vendor(&self, id: i64) -> Result<Option<VendorContact>, ServiceError> {
        Ok(self.tables.read().await.vendor_contact(id))
    }

    async fn find_vendors(&self, ids: &[i64]) -> Result<Vec<VendorContact>, ServiceError> {
        let t = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| t.vendor_contact(*id)).collect())
    }

    async fn find_customer_profile(
        &self,
        customer_id: i64,
    ) -> Result<Option<CustomerProfile>, ServiceError> {
        Ok(self.tables.read().await.customer_profile(customer_id))
    }

    async fn find_costs(&self, detail_ids: &[i64]) -> Result<Vec<cost::Model>, ServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .costs
            .values()
            .filter(|c| detail_ids.contains(&c.order_detail_id))
            .cloned()
            .collect())
    }

    async fn find_discounts(
        &self,
        detail_ids: &[i64],
    ) -> Result<Vec<discount::Model>, ServiceError> {
        Ok(self
            .tables
            .read()
            .await
            .discounts
            .values()
            .filter(|d| detail_ids.contains(&d.order_detail_id))
            .cloned()
            .collect())
    }

    async fn commit_order_write(&self, write: OrderWrite) -> Result<(), ServiceError> {
        let mut t = self.tables.write().await;

        // Every overwritten row must exist before anything is applied
        if let Some(order) = &write.order {
            if !t.orders.contains_key(&order.id) {
                return Err(missing("order", order.id));
            }
        }
        if let Some(detail) = write
            .details
            .iter()
            .find(|d| !t.order_details.contains_key(&d.id))
        {
            return Err(missing("order detail", detail.id));
        }

        for mut dump in write.order_detail_dumps {
            dump.id = t.next_id();
            t.order_detail_dumps.push(dump);
        }
        for mut dump in write.order_dumps {
            dump.id = t.next_id();
            t.order_dumps.push(dump);
        }
        for detail in write.details {
            t.order_details.insert(detail.id, detail);
        }
        if let Some(order) = write.order {
            t.orders.insert(order.id, order);
        }
        Ok(())
    }

    async fn create_cost(&self, entry: NewLedgerEntry) -> Result<cost::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if !t.order_details.contains_key(&entry.order_detail_id) {
            return Err(missing("order detail", entry.order_detail_id));
        }
        let model = cost::Model {
            id: t.next_id(),
            order_detail_id: entry.order_detail_id,
            amount: entry.amount,
            reason: entry.reason,
            issuer: entry.issuer,
            status: LedgerStatus::Unpaid,
            created_at: entry.created_at,
            updated_at: entry.created_at,
            created_by: entry.created_by,
        };
        t.costs.insert(model.id, model.clone());
        Ok(model)
    }

    async fn create_discount(
        &self,
        entry: NewLedgerEntry,
    ) -> Result<discount::Model, ServiceError> {
        let mut t = self.tables.write().await;
        if !t.order_details.contains_key(&entry.order_detail_id) {
            return Err(missing("order detail", entry.order_detail_id));
        }
        let model = discount::Model {
            id: t.next_id(),
            order_detail_id: entry.order_detail_id,
            amount: entry.amount,
            reason: entry.reason,
            issuer: entry.issuer,
            status: LedgerStatus::Unpaid,
            created_at: entry.created_at,
            updated_at: entry.created_at,
            created_by: entry.created_by,
        };
        t.discounts.insert(model.id, model.clone());
        Ok(model)
    }

    async fn find_admin_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Option<AdminAccount>, ServiceError> {
        let t = self.tables.read().await;
        let admin = t.admins.values().find(|a| a.user_id == user_id).cloned();
        Ok(admin.and_then(|admin| {
            t.users
                .get(&admin.user_id)
                .cloned()
                .map(|user| AdminAccount { admin, user })
        }))
    }

    async fn list_orders(
        &self,
        filter: &OrderListFilter,
    ) -> Result<Page<OrderSummary>, ServiceError> {
        let t = self.tables.read().await;
        let purpose = filter.purpose.as_deref();

        let mut matched: Vec<OrderSummary> = t
            .orders
            .values()
            .filter(|o| filter.ids.is_empty() || filter.ids.contains(&o.id))
            .filter(|o| filter.statuses.is_empty() || filter.statuses.contains(&o.status))
            .filter(|o| filter.order_date.contains(o.created_at))
            .filter(|o| filter.delivery_date.contains(o.ordered_for))
            .filter(|o| purpose.map_or(true, |p| o.purpose.contains(p)))
            .filter(|o| filter.customer_id.map_or(true, |c| o.ordered_by == c))
            .filter(|o| {
                filter
                    .payment_from_customer
                    .map_or(true, |p| p.matches(o.paid_by_customer_at.is_some()))
            })
            .filter_map(|o| {
                let profile = t.customer_profile(o.ordered_by);
                if let Some(unit_id) = filter.unit_id {
                    if profile.as_ref().map(|p| p.unit_id) != Some(unit_id) {
                        return None;
                    }
                }
                let tally = t.vendor_payment_tally(o.id);
                if let Some(payment) = filter.payment_to_vendor {
                    if o.status == OrderStatus::Cancelled || !payment.matches(tally) {
                        return None;
                    }
                }
                Some(OrderSummary::new(o, profile.as_ref(), tally))
            })
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total_rows = matched.len() as u64;

        Ok(Page {
            rows: PageRequest::slice(filter.page, matched),
            total_rows,
        })
    }

    async fn list_customers(
        &self,
        query: &DirectoryQuery,
    ) -> Result<Page<CustomerProfile>, ServiceError> {
        let t = self.tables.read().await;
        let matched: Vec<CustomerProfile> = t
            .customers
            .keys()
            .filter_map(|id| t.customer_profile(*id))
            .filter(|c| matches_search(&c.name, query.search.as_deref()))
            .collect();
        let total_rows = matched.len() as u64;

        Ok(Page {
            rows: PageRequest::slice(query.page, matched),
            total_rows,
        })
    }

    async fn list_units(&self, query: &DirectoryQuery) -> Result<Page<unit::Model>, ServiceError> {
        let t = self.tables.read().await;
        let matched: Vec<unit::Model> = t
            .units
            .values()
            .filter(|u| matches_search(&u.name, query.search.as_deref()))
            .cloned()
            .collect();
        let total_rows = matched.len() as u64;

        Ok(Page {
            rows: PageRequest::slice(query.page, matched),
            total_rows,
        })
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}
