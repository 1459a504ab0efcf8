use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    auth::AuthenticatedAdmin,
    entities::unit,
    errors::ServiceError,
    repositories::CustomerProfile,
    services::{directory::DirectoryParams, orders::Listing},
    ApiResponse, AppState,
};

/// List customers, optionally filtered by name
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    summary = "List customers",
    params(DirectoryParams),
    responses(
        (status = 200, description = "Customers retrieved", body = ApiResponse<Listing<CustomerProfile>>),
        (status = 401, description = "Missing token", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Directory"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
    Query(params): Query<DirectoryParams>,
) -> Result<Json<ApiResponse<Listing<CustomerProfile>>>, ServiceError> {
    let (listing, advisories) = state.engine.list_customers(params).await?;
    Ok(Json(ApiResponse::with_advisories(
        listing,
        advisories,
        "Berhasil mengambil data customer.",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/units",
    summary = "List units",
    params(DirectoryParams),
    responses(
        (status = 200, description = "Units retrieved", body = ApiResponse<Listing<unit::Model>>),
        (status = 401, description = "Missing token", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Directory"
)]
pub async fn list_units(
    State(state): State<AppState>,
    AuthenticatedAdmin(_admin): AuthenticatedAdmin,
    Query(params): Query<DirectoryParams>,
) -> Result<Json<ApiResponse<Listing<unit::Model>>>, ServiceError> {
    let (listing, advisories) = state.engine.list_units(params).await?;
    Ok(Json(ApiResponse::with_advisories(
        listing,
        advisories,
        "Berhasil mengambil data unit.",
    )))
}
