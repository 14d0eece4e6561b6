use axum::{routing::get, routing::post, Router};

use crate::features::auth::handlers::{self, AuthState};

/// Login and logout pages for the admin panel
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route(
            "/admin/login",
            get(handlers::login_page).post(handlers::login),
        )
        .route("/admin/logout", post(handlers::logout))
        .with_state(state)
}
