use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    AdminAccount, CustomerProfile, DirectoryQuery, NewLedgerEntry, OrderListFilter, OrderStore,
    OrderSummary, OrderWrite, Page, PageRequest, VendorContact, VendorPaymentTally,
};
use crate::entities::{
    admin, cost, customer, discount, menu, order, order_detail, order_detail_dump, order_dump,
    unit, user, vendor,
};
use crate::errors::ServiceError;
use crate::models::{LedgerStatus, OrderDetailStatus, OrderStatus};

#[derive(Debug, FromQueryResult)]
struct TallyRow {
    order_id: i64,
    total: i64,
    paid: i64,
}

/// [`OrderStore`] backed by the relational database through sea-orm.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Paid/total counts over non-cancelled line items, keyed by order ID.
    async fn vendor_payment_tallies(
        &self,
        order_ids: Option<&[i64]>,
    ) -> Result<HashMap<i64, VendorPaymentTally>, ServiceError> {
        let mut query = order_detail::Entity::find()
            .select_only()
            .column(order_detail::Column::OrderId)
            .column_as(Expr::col(order_detail::Column::Id).count(), "total")
            .column_as(Expr::col(order_detail::Column::PaidToVendorAt).count(), "paid")
            .filter(order_detail::Column::Status.ne(OrderDetailStatus::Cancelled))
            .group_by(order_detail::Column::OrderId);

        if let Some(ids) = order_ids {
            query = query.filter(order_detail::Column::OrderId.is_in(ids.to_vec()));
        }

        let rows = query.into_model::<TallyRow>().all(self.db()).await?;
        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.order_id,
                    VendorPaymentTally {
                        paid: r.paid.max(0) as u64,
                        total: r.total.max(0) as u64,
                    },
                )
            })
            .collect())
    }

    async fn customer_profiles(
        &self,
        customers: Vec<customer::Model>,
    ) -> Result<Vec<CustomerProfile>, ServiceError> {
        let user_ids: Vec<i64> = customers.iter().map(|c| c.user_id).collect();
        let unit_ids: Vec<i64> = customers.iter().map(|c| c.unit_id).collect();

        let users: HashMap<i64, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(self.db())
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let units: HashMap<i64, unit::Model> = unit::Entity::find()
            .filter(unit::Column::Id.is_in(unit_ids))
            .all(self.db())
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(customers
            .into_iter()
            .map(|c| {
                let user = users.get(&c.user_id);
                CustomerProfile {
                    id: c.id,
                    user_id: c.user_id,
                    name: user.map(|u| u.name.clone()).unwrap_or_default(),
                    phone: user.map(|u| u.phone.clone()).unwrap_or_default(),
                    email: user.map(|u| u.email.clone()).unwrap_or_default(),
                    customer_type: c.customer_type,
                    unit_id: c.unit_id,
                    unit_name: units
                        .get(&c.unit_id)
                        .map(|u| u.name.clone())
                        .unwrap_or_default(),
                    status: c.status,
                    created_by: c.created_by,
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                }
            })
            .collect())
    }

    async fn vendor_contacts(&self, ids: &[i64]) -> Result<Vec<VendorContact>, ServiceError> {
        let rows = vendor::Entity::find()
            .filter(vendor::Column::Id.is_in(ids.to_vec()))
            .find_also_related(user::Entity)
            .all(self.db())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(v, u)| VendorContact {
                id: v.id,
                user_id: v.user_id,
                name: u.as_ref().map(|u| u.name.clone()).unwrap_or_default(),
                phone: u.as_ref().map(|u| u.phone.clone()).unwrap_or_default(),
                address: v.address,
            })
            .collect())
    }

    async fn paged<E>(
        &self,
        select: Select<E>,
        page: Option<PageRequest>,
    ) -> Result<(Vec<E::Model>, u64), ServiceError>
    where
        E: EntityTrait,
        E::Model: Sync,
    {
        let total_rows = select.clone().count(self.db()).await?;
        let select = match page {
            Some(p) => select.limit(p.limit).offset(p.offset),
            None => select,
        };
        Ok((select.all(self.db()).await?, total_rows))
    }
}

#[async_trait]
impl OrderStore for SeaOrmStore {
    async fn find_order(&self, id: i64) -> Result<Option<order::Model>, ServiceError> {
        Ok(order::Entity::find_by_id(id).one(self.db()).await?)
    }

    async fn find_order_detail(
        &self,
        id: i64,
    ) -> Result<Option<order_detail::Model>, ServiceError> {
        Ok(order_detail::Entity::find_by_id(id).one(self.db()).await?)
    }

    async fn find_order_details(
        &self,
        order_id: i64,
    ) -> Result<Vec<order_detail::Model>, ServiceError> {
        Ok(order_detail::Entity::find()
            .filter(order_detail::Column::OrderId.eq(order_id))
            .order_by_asc(order_detail::Column::Id)
            .all(self.db())
            .await?)
    }

    async fn find_menu(&self, id: i64) -> Result<Option<menu::Model>, ServiceError> {
        Ok(menu::Entity::find_by_id(id).one(self.db()).await?)
    }

    async fn find_menus(&self, ids: &[i64]) -> Result<Vec<menu::Model>, ServiceError> {
        Ok(menu::Entity::find()
            .filter(menu::Column::Id.is_in(ids.to_vec()))
            .all(self.db())
            .await?)
    }

    async fn find_vendor(&self, id: i64) -> Result<Option<VendorContact>, ServiceError> {
        Ok(self.vendor_contacts(&[id]).await?.into_iter().next())
    }

    async fn find_vendors(&self, ids: &[i64]) -> Result<Vec<VendorContact>, ServiceError> {
        self.vendor_contacts(ids).await
    }

    async fn find_customer_profile(
        &self,
        customer_id: i64,
    ) -> Result<Option<CustomerProfile>, ServiceError> {
        let Some(found) = customer::Entity::find_by_id(customer_id)
            .one(self.db())
            .await?
        else {
            return Ok(None);
        };
        Ok(self.customer_profiles(vec![found]).await?.into_iter().next())
    }

    async fn find_costs(&self, detail_ids: &[i64]) -> Result<Vec<cost::Model>, ServiceError> {
        Ok(cost::Entity::find()
            .filter(cost::Column::OrderDetailId.is_in(detail_ids.to_vec()))
            .order_by_asc(cost::Column::Id)
            .all(self.db())
            .await?)
    }

    async fn find_discounts(
        &self,
        detail_ids: &[i64],
    ) -> Result<Vec<discount::Model>, ServiceError> {
        Ok(discount::Entity::find()
            .filter(discount::Column::OrderDetailId.is_in(detail_ids.to_vec()))
            .order_by_asc(discount::Column::Id)
            .all(self.db())
            .await?)
    }

    #[instrument(skip(self, write), fields(details = write.details.len()))]
    async fn commit_order_write(&self, write: OrderWrite) -> Result<(), ServiceError> {
        if write.is_empty() {
            return Ok(());
        }

        crate::db::in_transaction(self.db(), |txn| {
            Box::pin(async move {
                for dump in write.order_detail_dumps {
                    let mut active: order_detail_dump::ActiveModel = dump.into();
                    active = active.reset_all();
                    active.id = NotSet;
                    active.insert(txn).await?;
                }
                for dump in write.order_dumps {
                    let mut active: order_dump::ActiveModel = dump.into();
                    active = active.reset_all();
                    active.id = NotSet;
                    active.insert(txn).await?;
                }
                for detail in write.details {
                    let active: order_detail::ActiveModel = detail.into();
                    active.reset_all().update(txn).await?;
                }
                if let Some(order) = write.order {
                    let active: order::ActiveModel = order.into();
                    active.reset_all().update(txn).await?;
                }
                Ok(())
            })
        })
        .await?;

        debug!("order write committed");
        Ok(())
    }

    async fn create_cost(&self, entry: NewLedgerEntry) -> Result<cost::Model, ServiceError> {
        let active = cost::ActiveModel {
            id: NotSet,
            order_detail_id: Set(entry.order_detail_id),
            amount: Set(entry.amount),
            reason: Set(entry.reason),
            issuer: Set(entry.issuer),
            status: Set(LedgerStatus::Unpaid),
            created_at: Set(entry.created_at),
            updated_at: Set(entry.created_at),
            created_by: Set(entry.created_by),
        };
        Ok(active.insert(self.db()).await?)
    }

    async fn create_discount(
        &self,
        entry: NewLedgerEntry,
    ) -> Result<discount::Model, ServiceError> {
        let active = discount::ActiveModel {
            id: NotSet,
            order_detail_id: Set(entry.order_detail_id),
            amount: Set(entry.amount),
            reason: Set(entry.reason),
            issuer: Set(entry.issuer),
            status: Set(LedgerStatus::Unpaid),
            created_at: Set(entry.created_at),
            updated_at: Set(entry.created_at),
            created_by: Set(entry.created_by),
        };
        Ok(active.insert(self.db()).await?)
    }

    async fn find_admin_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Option<AdminAccount>, ServiceError> {
        let row = admin::Entity::find()
            .filter(admin::Column::UserId.eq(user_id))
            .find_also_related(user::Entity)
            .one(self.db())
            .await?;

        Ok(row.and_then(|(admin, user)| user.map(|user| AdminAccount { admin, user })))
    }

    #[instrument(skip(self, filter))]
    async fn list_orders(
        &self,
        filter: &OrderListFilter,
    ) -> Result<Page<OrderSummary>, ServiceError> {
        let mut select = order::Entity::find();

        if !filter.ids.is_empty() {
            select = select.filter(order::Column::Id.is_in(filter.ids.clone()));
        }
        if !filter.statuses.is_empty() {
            select = select.filter(order::Column::Status.is_in(filter.statuses.clone()));
        }
        if let Some(lower) = filter.order_date.lower_bound() {
            select = select.filter(order::Column::CreatedAt.gte(lower));
        }
        if let Some(upper) = filter.order_date.upper_bound() {
            select = select.filter(order::Column::CreatedAt.lt(upper));
        }
        if let Some(lower) = filter.delivery_date.lower_bound() {
            select = select.filter(order::Column::OrderedFor.gte(lower));
        }
        if let Some(upper) = filter.delivery_date.upper_bound() {
            select = select.filter(order::Column::OrderedFor.lt(upper));
        }
        if let Some(purpose) = &filter.purpose {
            select = select.filter(order::Column::Purpose.contains(purpose.as_str()));
        }
        if let Some(customer_id) = filter.customer_id {
            select = select.filter(order::Column::OrderedBy.eq(customer_id));
        }
        if let Some(unit_id) = filter.unit_id {
            select = select.filter(
                order::Column::OrderedBy.in_subquery(
                    Query::select()
                        .column(customer::Column::Id)
                        .from(customer::Entity)
                        .and_where(customer::Column::UnitId.eq(unit_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(payment) = filter.payment_from_customer {
            select = select.filter(match payment {
                super::CustomerPayment::Paid => order::Column::PaidByCustomerAt.is_not_null(),
                super::CustomerPayment::Unpaid => order::Column::PaidByCustomerAt.is_null(),
            });
        }
        if let Some(payment) = filter.payment_to_vendor {
            let matching: Vec<i64> = self
                .vendor_payment_tallies(None)
                .await?
                .into_iter()
                .filter(|(_, tally)| payment.matches(*tally))
                .map(|(order_id, _)| order_id)
                .collect();
            select = select
                .filter(order::Column::Status.ne(OrderStatus::Cancelled))
                .filter(order::Column::Id.is_in(matching));
        }

        let select = select
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id);
        let (orders, total_rows) = self.paged(select, filter.page).await?;

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let tallies = self.vendor_payment_tallies(Some(&order_ids)).await?;

        let customer_ids: Vec<i64> = orders.iter().map(|o| o.ordered_by).collect();
        let customers = customer::Entity::find()
            .filter(customer::Column::Id.is_in(customer_ids))
            .all(self.db())
            .await?;
        let profiles: HashMap<i64, CustomerProfile> = self
            .customer_profiles(customers)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let rows = orders
            .iter()
            .map(|o| {
                OrderSummary::new(
                    o,
                    profiles.get(&o.ordered_by),
                    tallies.get(&o.id).copied().unwrap_or_default(),
                )
            })
            .collect();

        Ok(Page { rows, total_rows })
    }

    async fn list_customers(
        &self,
        query: &DirectoryQuery,
    ) -> Result<Page<CustomerProfile>, ServiceError> {
        let mut select = customer::Entity::find().order_by_asc(customer::Column::Id);
        if let Some(search) = &query.search {
            select = select.filter(
                customer::Column::UserId.in_subquery(
                    Query::select()
                        .column(user::Column::Id)
                        .from(user::Entity)
                        .and_where(user::Column::Name.contains(search.as_str()))
                        .to_owned(),
                ),
            );
        }

        let (customers, total_rows) = self.paged(select, query.page).await?;
        Ok(Page {
            rows: self.customer_profiles(customers).await?,
            total_rows,
        })
    }

    async fn list_units(&self, query: &DirectoryQuery) -> Result<Page<unit::Model>, ServiceError> {
        let mut select = unit::Entity::find().order_by_asc(unit::Column::Id);
        if let Some(search) = &query.search {
            select = select.filter(unit::Column::Name.contains(search.as_str()));
        }

        let (rows, total_rows) = self.paged(select, query.page).await?;
        Ok(Page { rows, total_rows })
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.db().ping().await?;
        Ok(())
    }
}
