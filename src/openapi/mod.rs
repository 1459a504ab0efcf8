use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "itsfood admin API",
        version = "0.3.0",
        description = r#"
# itsfood administration API

Back office for corporate meal orders: review orders, adjust line items,
record extra costs and discounts, and forward each vendor's share.

## Authentication

Every `/api/v1` endpoint needs a bearer token issued by the auth service,
and the token's user must be an active admin:

```
Authorization: Bearer <jwt>
```

## Envelope

Responses carry `status` (`success` or `failed`), `errors`, `result` and an
Indonesian `description`. On listings, `errors` holds paging advisories
even when the call succeeds.

## Pagination

`length` sets the page size and `page` (1-based) the page. `page` without
`length` is ignored and reported in `errors`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Order listing, detail and vendor forwarding"),
        (name = "Order details", description = "Line item mutations and ledger entries"),
        (name = "Directory", description = "Customers and units"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::notify_vendor,

        // Order details
        crate::handlers::order_details::change_menu,
        crate::handlers::order_details::change_qty,
        crate::handlers::order_details::change_note,
        crate::handlers::order_details::change_status,
        crate::handlers::order_details::add_cost,
        crate::handlers::order_details::add_discount,

        // Directory
        crate::handlers::directory::list_customers,
        crate::handlers::directory::list_units,

        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::models::OrderStatus,
            crate::models::OrderDetailStatus,
            crate::models::LedgerIssuer,
            crate::models::LedgerStatus,
            crate::services::aggregator::OrderAggregate,
            crate::services::order_details::LineItemUpdate,
            crate::services::ledger::LedgerEntry,
            crate::services::vendor_notification::VendorDispatch,
            crate::services::orders::OrderInformation,
            crate::repositories::OrderSummary,
            crate::repositories::CustomerProfile,

            // Error types
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDocV1;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_the_admin_routes() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("itsfood admin API"));
        assert!(json.contains("/api/v1/orders/{order_id}/vendors/{vendor_id}/notify"));
        assert!(json.contains("/api/v1/order-details/{id}/status"));
        assert!(json.contains("\"Bearer\""));
    }
}
