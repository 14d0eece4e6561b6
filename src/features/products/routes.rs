use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::products::handlers;
use crate::features::products::services::ProductService;

/// JSON API over the products table
///
/// Listing is public; writes need a session (bearer header or cookie).
pub fn routes(service: Arc<ProductService>) -> Router {
    Router::new()
        .route(
            "/api/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/products/{id}",
            patch(handlers::update_product).delete(handlers::delete_product),
        )
        .route("/api/products/{id}/stock", post(handlers::adjust_stock))
        .with_state(service)
}
