#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use itsfood_admin::{
    auth::Claims,
    config::AppConfig,
    entities::{admin, cost, customer, discount, menu, order, order_detail, unit, user, vendor},
    errors::ServiceError,
    models::{AdminStatus, OrderDetailStatus, OrderStatus, UserStatus},
    notifications::{NotificationDispatcher, NotificationError, Notifier},
    repositories::{
        AdminAccount, CustomerProfile, DirectoryQuery, InMemoryStore, NewLedgerEntry,
        OrderListFilter, OrderStore, OrderSummary, OrderWrite, Page, VendorContact,
    },
    services::{EngineSettings, OrderEngine},
    AppState,
};

pub const TEST_SECRET: &str = "a_test_secret_that_is_certainly_long_enough_0123";
pub const TEST_ISSUER: &str = "itsfood-auth";
pub const ACTOR: &str = "Admin Satu";

/// Keeps every delivered message for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("notifier lock").clone()
    }

    /// Polls until at least `count` messages arrived or two seconds passed.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        for _ in 0..200 {
            let seen = self.messages();
            if seen.len() >= count {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.messages()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), NotificationError> {
        self.messages
            .lock()
            .expect("notifier lock")
            .push(message.to_string());
        Ok(())
    }
}

/// IDs of the seeded rows.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub unit_id: i64,
    pub customer_id: i64,
    pub admin_user_id: i64,
    pub vendor_a: i64,
    pub vendor_b: i64,
    pub menu_a1: i64,
    pub menu_a2: i64,
    pub menu_b1: i64,
    pub order_id: i64,
    /// A1 x2, A2 x1, B1 x3, all pending.
    pub details: [i64; 3],
}

pub fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid timestamp")
}

pub fn user_model(name: &str, phone: &str, status: UserStatus) -> user::Model {
    user::Model {
        id: 0,
        name: name.to_string(),
        email: format!("{}@itsfood.test", name.to_lowercase().replace(' ', ".")),
        phone: phone.to_string(),
        status,
        created_at: ts(2024, 1, 1, 0),
        updated_at: ts(2024, 1, 1, 0),
    }
}

pub fn admin_model(user_id: i64, status: AdminStatus) -> admin::Model {
    admin::Model {
        id: 0,
        user_id,
        role: "Admin".to_string(),
        status,
        created_at: ts(2024, 1, 1, 0),
        updated_at: ts(2024, 1, 1, 0),
    }
}

pub fn menu_model(vendor_id: i64, name: &str, price: Decimal, cogs: Decimal) -> menu::Model {
    menu::Model {
        id: 0,
        vendor_id,
        name: name.to_string(),
        retail_price: price,
        cogs,
        created_at: ts(2024, 1, 1, 0),
        updated_at: ts(2024, 1, 1, 0),
    }
}

pub fn order_model(customer_id: i64, created_at: DateTime<Utc>) -> order::Model {
    order::Model {
        id: 0,
        ordered_by: customer_id,
        ordered_for: created_at + chrono::Duration::days(1),
        ordered_to: "Gedung Rektorat lt. 2".to_string(),
        num_of_menus: 0,
        qty_of_menus: 0,
        amount: Decimal::ZERO,
        purpose: "Rapat koordinasi".to_string(),
        activity: "Rapat".to_string(),
        source_of_fund: "Dana unit".to_string(),
        payment_option: "Transfer".to_string(),
        info: String::new(),
        status: OrderStatus::Pending,
        paid_by_customer_at: None,
        created_at,
        updated_at: created_at,
        created_by: "Budi".to_string(),
        updated_by: None,
    }
}

pub fn detail_model(order_id: i64, menu: &menu::Model, qty: i32) -> order_detail::Model {
    order_detail::Model {
        id: 0,
        order_id,
        menu_id: menu.id,
        qty,
        price: menu.retail_price,
        cogs: menu.cogs,
        note: String::new(),
        status: OrderDetailStatus::Pending,
        reason_for_cancellation: None,
        paid_to_vendor_at: None,
        created_at: ts(2024, 3, 1, 8),
        updated_at: ts(2024, 3, 1, 8),
        created_by: "Budi".to_string(),
        updated_by: None,
    }
}

/// Seeds one customer, two vendors and one order with three pending items.
pub async fn seed(store: &InMemoryStore) -> Fixture {
    let unit = store
        .insert_unit(unit::Model {
            id: 0,
            name: "Fakultas Teknik".to_string(),
            created_at: ts(2024, 1, 1, 0),
            updated_at: ts(2024, 1, 1, 0),
        })
        .await;

    let customer_user = store
        .insert_user(user_model("Budi", "081234567890", UserStatus::Activated))
        .await;
    let customer = store
        .insert_customer(customer::Model {
            id: 0,
            user_id: customer_user.id,
            unit_id: unit.id,
            customer_type: "Staff".to_string(),
            status: "Active".to_string(),
            created_by: "seed".to_string(),
            created_at: ts(2024, 1, 1, 0),
            updated_at: ts(2024, 1, 1, 0),
        })
        .await;

    let admin_user = store
        .insert_user(user_model(ACTOR, "081200000001", UserStatus::Activated))
        .await;
    store
        .insert_admin(admin_model(admin_user.id, AdminStatus::Active))
        .await;

    let vendor_a = insert_vendor(store, "Warung Bu Sri", "0812 3456 789").await;
    let vendor_b = insert_vendor(store, "Dapur Pak Joko", "628111222333").await;

    let a1 = store
        .insert_menu(menu_model(vendor_a, "Nasi Kotak Ayam", dec!(25000), dec!(20000)))
        .await;
    let a2 = store
        .insert_menu(menu_model(vendor_a, "Es Teh", dec!(15000), dec!(12000)))
        .await;
    let b1 = store
        .insert_menu(menu_model(vendor_b, "Soto Lamongan", dec!(30000), dec!(24000)))
        .await;

    let mut seeded = order_model(customer.id, ts(2024, 3, 1, 8));
    seeded.num_of_menus = 3;
    seeded.qty_of_menus = 6;
    seeded.amount = dec!(155000);
    let order = store.insert_order(seeded).await;

    let d1 = store.insert_order_detail(detail_model(order.id, &a1, 2)).await;
    let d2 = store.insert_order_detail(detail_model(order.id, &a2, 1)).await;
    let d3 = store.insert_order_detail(detail_model(order.id, &b1, 3)).await;

    Fixture {
        unit_id: unit.id,
        customer_id: customer.id,
        admin_user_id: admin_user.id,
        vendor_a,
        vendor_b,
        menu_a1: a1.id,
        menu_a2: a2.id,
        menu_b1: b1.id,
        order_id: order.id,
        details: [d1.id, d2.id, d3.id],
    }
}

pub async fn insert_vendor(store: &InMemoryStore, name: &str, phone: &str) -> i64 {
    let user = store
        .insert_user(user_model(name, phone, UserStatus::Activated))
        .await;
    store
        .insert_vendor(vendor::Model {
            id: 0,
            user_id: user.id,
            address: "Jl. Keputih 10".to_string(),
            status: "Active".to_string(),
            created_at: ts(2024, 1, 1, 0),
            updated_at: ts(2024, 1, 1, 0),
        })
        .await
        .id
}

pub fn test_config() -> AppConfig {
    AppConfig::new(
        "sqlite::memory:".to_string(),
        TEST_SECRET.to_string(),
        "127.0.0.1".to_string(),
        0,
        "test".to_string(),
    )
}

/// Signs an access token for `user_id` that expires `ttl_secs` from now.
pub fn mint_token(sub: &str, ttl_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: sub.to_string(),
        iss: TEST_ISSUER.to_string(),
        iat: now,
        exp: now + ttl_secs,
        access_uuid: Some(uuid::Uuid::new_v4().to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

/// Engine over a seeded in-memory store with a recording notifier.
pub struct TestEngine {
    pub engine: OrderEngine,
    pub store: Arc<InMemoryStore>,
    pub notifier: RecordingNotifier,
    pub fixture: Fixture,
}

impl TestEngine {
    pub async fn new() -> Self {
        Self::with_settings(EngineSettings::default()).await
    }

    pub async fn with_settings(settings: EngineSettings) -> Self {
        Self::build(settings, 0).await
    }

    /// An engine whose first `count` order writes fail at the store.
    pub async fn with_refused_writes(count: usize) -> Self {
        Self::build(EngineSettings::default(), count).await
    }

    async fn build(settings: EngineSettings, refused_writes: usize) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let fixture = seed(&store).await;
        let notifier = RecordingNotifier::default();
        let (dispatcher, _worker) = NotificationDispatcher::spawn(Arc::new(notifier.clone()));
        let dyn_store: Arc<dyn OrderStore> = if refused_writes > 0 {
            Arc::new(RefusingStore::new(store.clone(), refused_writes))
        } else {
            store.clone()
        };
        let engine = OrderEngine::new(dyn_store, dispatcher, settings);
        Self {
            engine,
            store,
            notifier,
            fixture,
        }
    }

    pub async fn order(&self) -> order::Model {
        self.store
            .find_order(self.fixture.order_id)
            .await
            .expect("store read")
            .expect("order exists")
    }

    pub async fn detail(&self, id: i64) -> order_detail::Model {
        self.store
            .find_order_detail(id)
            .await
            .expect("store read")
            .expect("detail exists")
    }
}

/// In-memory store that turns down a number of order writes before
/// behaving normally, the way a dropped database connection would.
pub struct RefusingStore {
    inner: Arc<InMemoryStore>,
    refusals_left: AtomicUsize,
}

impl RefusingStore {
    pub fn new(inner: Arc<InMemoryStore>, refusals: usize) -> Self {
        Self {
            inner,
            refusals_left: AtomicUsize::new(refusals),
        }
    }
}

#[async_trait]
impl OrderStore for RefusingStore {
    async fn find_order(&self, id: i64) -> Result<Option<order::Model>, ServiceError> {
        self.inner.find_order(id).await
    }

    async fn find_order_detail(
        &self,
        id: i64,
    ) -> Result<Option<order_detail::Model>, ServiceError> {
        self.inner.find_order_detail(id).await
    }

    async fn find_order_details(
        &self,
        order_id: i64,
    ) -> Result<Vec<order_detail::Model>, ServiceError> {
        self.inner.find_order_details(order_id).await
    }

    async fn find_menu(&self, id: i64) -> Result<Option<menu::Model>, ServiceError> {
        self.inner.find_menu(id).await
    }

    async fn find_menus(&self, ids: &[i64]) -> Result<Vec<menu::Model>, ServiceError> {
        self.inner.find_menus(ids).await
    }

    async fn find_vendor(&self, id: i64) -> Result<Option<VendorContact>, ServiceError> {
        self.inner.find_vendor(id).await
    }

    async fn find_vendors(&self, ids: &[i64]) -> Result<Vec<VendorContact>, ServiceError> {
        self.inner.find_vendors(ids).await
    }

    async fn find_customer_profile(
        &self,
        customer_id: i64,
    ) -> Result<Option<CustomerProfile>, ServiceError> {
        self.inner.find_customer_profile(customer_id).await
    }

    async fn find_costs(&self, detail_ids: &[i64]) -> Result<Vec<cost::Model>, ServiceError> {
        self.inner.find_costs(detail_ids).await
    }

    async fn find_discounts(
        &self,
        detail_ids: &[i64],
    ) -> Result<Vec<discount::Model>, ServiceError> {
        self.inner.find_discounts(detail_ids).await
    }

    async fn commit_order_write(&self, write: OrderWrite) -> Result<(), ServiceError> {
        let refused = self
            .refusals_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(ServiceError::database_error_message("connection reset by peer"));
        }
        self.inner.commit_order_write(write).await
    }

    async fn create_cost(&self, entry: NewLedgerEntry) -> Result<cost::Model, ServiceError> {
        self.inner.create_cost(entry).await
    }

    async fn create_discount(
        &self,
        entry: NewLedgerEntry,
    ) -> Result<discount::Model, ServiceError> {
        self.inner.create_discount(entry).await
    }

    async fn find_admin_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Option<AdminAccount>, ServiceError> {
        self.inner.find_admin_by_user_id(user_id).await
    }

    async fn list_orders(
        &self,
        filter: &OrderListFilter,
    ) -> Result<Page<OrderSummary>, ServiceError> {
        self.inner.list_orders(filter).await
    }

    async fn list_customers(
        &self,
        query: &DirectoryQuery,
    ) -> Result<Page<CustomerProfile>, ServiceError> {
        self.inner.list_customers(query).await
    }

    async fn list_units(&self, query: &DirectoryQuery) -> Result<Page<unit::Model>, ServiceError> {
        self.inner.list_units(query).await
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.inner.ping().await
    }
}

/// The full router over a seeded in-memory store.
pub struct TestApp {
    router: Router,
    pub store: Arc<InMemoryStore>,
    pub notifier: RecordingNotifier,
    pub fixture: Fixture,
    token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = test_config();
        let store = Arc::new(InMemoryStore::new());
        let fixture = seed(&store).await;
        let notifier = RecordingNotifier::default();
        let (dispatcher, _worker) = NotificationDispatcher::spawn(Arc::new(notifier.clone()));
        let dyn_store: Arc<dyn OrderStore> = store.clone();
        let state = AppState::new(&cfg, dyn_store, dispatcher);
        let token = mint_token(&fixture.admin_user_id.to_string(), 3600);

        Self {
            router: itsfood_admin::build_router(state, &cfg),
            store,
            notifier,
            fixture,
            token,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("request builds");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(&self.token)).await
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
