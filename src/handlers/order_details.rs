use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::AuthenticatedAdmin,
    common::parse_id,
    errors::ServiceError,
    services::{
        ledger::{LedgerEntry, LedgerEntryRequest},
        order_details::{
            ChangeMenuRequest, ChangeNoteRequest, ChangeQtyRequest, ChangeStatusRequest,
            LineItemUpdate,
        },
    },
    ApiResponse, AppState,
};

type LineItemResult = Result<Json<ApiResponse<LineItemUpdate>>, ServiceError>;

/// Assign another menu to a line item
#[utoipa::path(
    put,
    path = "/api/v1/order-details/{id}/menu",
    summary = "Change menu",
    description = "Copies the new menu's retail price and COGS onto the line item and recomputes the order.",
    params(("id" = i64, Path, description = "Order detail ID")),
    request_body = ChangeMenuRequest,
    responses(
        (status = 200, description = "Menu changed", body = ApiResponse<LineItemUpdate>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Line item or menu not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Order details"
)]
pub async fn change_menu(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
    Json(request): Json<ChangeMenuRequest>,
) -> LineItemResult {
    let detail_id = parse_id(&id, "order detail id")?;
    let update = state.engine.change_menu(detail_id, request, &admin.name).await?;
    Ok(Json(ApiResponse::success(
        update,
        "Berhasil mengubah menu pada order detail.",
    )))
}

/// Change the quantity of a line item
#[utoipa::path(
    put,
    path = "/api/v1/order-details/{id}/qty",
    summary = "Change quantity",
    params(("id" = i64, Path, description = "Order detail ID")),
    request_body = ChangeQtyRequest,
    responses(
        (status = 200, description = "Quantity changed", body = ApiResponse<LineItemUpdate>),
        (status = 400, description = "Quantity below 1", body = crate::errors::ErrorResponse),
        (status = 404, description = "Line item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Order details"
)]
pub async fn change_qty(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
    Json(request): Json<ChangeQtyRequest>,
) -> LineItemResult {
    let detail_id = parse_id(&id, "order detail id")?;
    let update = state.engine.change_qty(detail_id, request, &admin.name).await?;
    Ok(Json(ApiResponse::success(
        update,
        "Berhasil mengubah jumlah menu pada order detail.",
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/order-details/{id}/note",
    summary = "Change note",
    params(("id" = i64, Path, description = "Order detail ID")),
    request_body = ChangeNoteRequest,
    responses(
        (status = 200, description = "Note changed", body = ApiResponse<LineItemUpdate>),
        (status = 404, description = "Line item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Order details"
)]
pub async fn change_note(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
    Json(request): Json<ChangeNoteRequest>,
) -> LineItemResult {
    let detail_id = parse_id(&id, "order detail id")?;
    let update = state.engine.change_note(detail_id, request, &admin.name).await?;
    Ok(Json(ApiResponse::success(
        update,
        "Berhasil mengubah catatan pada order detail.",
    )))
}

/// Move a line item to another status
#[utoipa::path(
    put,
    path = "/api/v1/order-details/{id}/status",
    summary = "Change status",
    description = "Cancelling requires a reason. Cancelling the last live line item cancels the order.",
    params(("id" = i64, Path, description = "Order detail ID")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<LineItemUpdate>),
        (status = 400, description = "Missing cancellation reason", body = crate::errors::ErrorResponse),
        (status = 404, description = "Line item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Order details"
)]
pub async fn change_status(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
    Json(request): Json<ChangeStatusRequest>,
) -> LineItemResult {
    let detail_id = parse_id(&id, "order detail id")?;
    let update = state
        .engine
        .change_status(detail_id, request, &admin.name)
        .await?;
    Ok(Json(ApiResponse::success(
        update,
        "Berhasil mengubah status order detail.",
    )))
}

/// Add an extra cost to a line item
#[utoipa::path(
    post,
    path = "/api/v1/order-details/{id}/costs",
    summary = "Add cost",
    params(("id" = i64, Path, description = "Order detail ID")),
    request_body = LedgerEntryRequest,
    responses(
        (status = 201, description = "Cost recorded", body = ApiResponse<LedgerEntry>),
        (status = 400, description = "Invalid amount or reason", body = crate::errors::ErrorResponse),
        (status = 404, description = "Line item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Order details"
)]
pub async fn add_cost(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
    Json(request): Json<LedgerEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LedgerEntry>>), ServiceError> {
    let detail_id = parse_id(&id, "order detail id")?;
    let entry = state.engine.add_cost(detail_id, request, &admin.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(entry, "Berhasil menambahkan biaya tambahan.")),
    ))
}

/// Add a discount to a line item
#[utoipa::path(
    post,
    path = "/api/v1/order-details/{id}/discounts",
    summary = "Add discount",
    params(("id" = i64, Path, description = "Order detail ID")),
    request_body = LedgerEntryRequest,
    responses(
        (status = 201, description = "Discount recorded", body = ApiResponse<LedgerEntry>),
        (status = 400, description = "Invalid amount or reason", body = crate::errors::ErrorResponse),
        (status = 404, description = "Line item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Order details"
)]
pub async fn add_discount(
    State(state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<String>,
    Json(request): Json<LedgerEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LedgerEntry>>), ServiceError> {
    let detail_id = parse_id(&id, "order detail id")?;
    let entry = state
        .engine
        .add_discount(detail_id, request, &admin.name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(entry, "Berhasil menambahkan diskon.")),
    ))
}
