use axum::{
    routing::{get, post},
    Router,
};

use crate::features::admin::handlers::{self, AdminPageState};

/// Admin panel pages. Every handler takes the session guard first, so an
/// anonymous request is redirected before any product data is read.
pub fn routes(state: AdminPageState) -> Router {
    Router::new()
        .route("/admin", get(handlers::list))
        .route("/admin/products", post(handlers::create))
        .route("/admin/products/new", get(handlers::new_form))
        .route("/admin/products/cancel", post(handlers::cancel))
        .route("/admin/products/stream", get(handlers::table_stream))
        .route("/admin/products/{id}", post(handlers::update))
        .route("/admin/products/{id}/edit", get(handlers::edit_form))
        .route(
            "/admin/products/{id}/delete",
            get(handlers::delete_confirm).post(handlers::delete),
        )
        .with_state(state)
}
