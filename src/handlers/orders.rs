use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::{
    auth::AuthenticatedAdmin,
    common::parse_id,
    errors::ServiceError,
    repositories::OrderSummary,
    services::{
        orders::{Listing, OrderInformation, OrderListParams},
        vendor_notification::VendorDispatch,
    },
    ApiResponse, AppState,
};

const ORDERS_FETCHED: &str = "Berhasil mengambil data order";

/// List orders with filters and optional paging
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    description = "Newest orders first. A non-numeric `length`, or a `page` without `length`, \
                   is reported in `errors` instead of failing the request.",
    params(OrderListParams),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<Listing<OrderSummary>>,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid filter value", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing token", body = crate::errors::ErrorResponse),
        (status = 403, description = "Invalid token", body = crate::errors::ErrorResponse),
        (status = 422, description = "Inactive admin", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
    Query(params): Query<OrderListParams>,
) -> Result<Json<ApiResponse<Listing<OrderSummary>>>, ServiceError> {
    let (listing, advisories) = state.engine.list_orders(params).await?;
    Ok(Json(ApiResponse::with_advisories(
        listing,
        advisories,
        ORDERS_FETCHED,
    )))
}

/// Get one order with its line items, ledger entries and settlement amounts
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved", body = ApiResponse<OrderInformation>),
        (status = 400, description = "Invalid ID", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<OrderInformation>>, ServiceError> {
    let order_id = parse_id(&id, "order id")?;
    let order = state.engine.get_order(order_id).await?;
    Ok(Json(ApiResponse::success(order, ORDERS_FETCHED)))
}

/// Forward a vendor's share of an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_id}/vendors/{vendor_id}/notify",
    summary = "Notify vendor",
    description = "Marks the vendor's live line items as Sent and returns the message together \
                   with a messaging link for the vendor's phone number.",
    params(
        ("order_id" = i64, Path, description = "Order ID"),
        ("vendor_id" = i64, Path, description = "Vendor ID"),
    ),
    responses(
        (status = 200, description = "Vendor notified", body = ApiResponse<VendorDispatch>),
        (status = 400, description = "Vendor phone number cannot be normalised", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order, vendor or vendor items not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Items already sent to this vendor", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Orders"
)]
pub async fn notify_vendor(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path((order_id, vendor_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<VendorDispatch>>, ServiceError> {
    let order_id = parse_id(&order_id, "order id")?;
    let vendor_id = parse_id(&vendor_id, "vendor id")?;

    let dispatch = state
        .engine
        .notify_vendor(order_id, vendor_id, &admin.name)
        .await?;
    info!(order_id, vendor_id, admin_id = admin.admin_id, "vendor notified");

    Ok(Json(ApiResponse::success(
        dispatch,
        "Berhasil meneruskan order ke vendor.",
    )))
}
