pub mod directory;
pub mod health;
pub mod order_details;
pub mod orders;

use axum::{
    routing::{get, post, put},
    Router,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Every route under `/api/v1`. All of them require an active admin.
pub fn api_v1_routes() -> Router<AppState> {
    let orders = Router::new()
        .route("/orders", get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order))
        .route(
            "/orders/:order_id/vendors/:vendor_id/notify",
            post(orders::notify_vendor),
        );

    let order_details = Router::new()
        .route("/order-details/:id/menu", put(order_details::change_menu))
        .route("/order-details/:id/qty", put(order_details::change_qty))
        .route("/order-details/:id/note", put(order_details::change_note))
        .route("/order-details/:id/status", put(order_details::change_status))
        .route("/order-details/:id/costs", post(order_details::add_cost))
        .route(
            "/order-details/:id/discounts",
            post(order_details::add_discount),
        );

    let directory = Router::new()
        .route("/customers", get(directory::list_customers))
        .route("/units", get(directory::list_units));

    Router::new()
        .merge(orders)
        .merge(order_details)
        .merge(directory)
}
