use axum::{routing::get, Router};

use crate::features::catalog::handlers::{self, CatalogState};

/// Public storefront pages
pub fn routes(state: CatalogState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/catalog/products", get(handlers::products_fragment))
        .route("/catalog/stream", get(handlers::products_stream))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StorefrontConfig;
    use crate::features::catalog::services::CatalogRenderer;
    use crate::features::products::{ProductFeed, ProductService};
    use crate::shared::test_helpers::{product, InMemoryProductRepository};
    use axum::http::{header, HeaderValue};
    use axum_test::TestServer;
    use std::sync::Arc;

    fn state(repo: Arc<InMemoryProductRepository>) -> CatalogState {
        let service = Arc::new(ProductService::new(repo));
        CatalogState {
            renderer: Arc::new(CatalogRenderer::new(StorefrontConfig::default())),
            feed: Arc::new(ProductFeed::new(service)),
        }
    }

    #[tokio::test]
    async fn test_index_renders_in_stock_products() {
        let repo = Arc::new(InMemoryProductRepository::new());
        repo.seed(vec![product("Dolo 650", 7), product("Cetirizine", 0)]);

        let server = TestServer::new(routes(state(repo))).unwrap();
        let response = server.get("/").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("Dolo 650"));
        assert!(!html.contains("Cetirizine"));
        assert!(html.contains("products-container"));
        assert!(html.contains("T09:00"));
    }

    #[tokio::test]
    async fn test_index_shows_flash_toast_once() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let server = TestServer::new(routes(state(repo))).unwrap();

        let response = server
            .get("/")
            .add_header(
                header::COOKIE,
                HeaderValue::from_static("flash=success:Appointment%20booked"),
            )
            .await;
        let html = response.text();
        assert!(html.contains("Appointment booked"));
        assert!(html.contains("bg-green-500"));

        let cleared = response.header(header::SET_COOKIE);
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_fragment_uses_live_snapshot() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let state = state(repo.clone());
        let mut rx = state.feed.watch();
        state.feed.start().await.unwrap();
        rx.wait_for(|snapshot| snapshot.loaded).await.unwrap();

        let reads_before = repo.select_calls();
        let server = TestServer::new(routes(state.clone())).unwrap();
        let response = server.get("/catalog/products").await;

        response.assert_status_ok();
        assert!(response.text().contains("No products available at the moment."));
        assert_eq!(repo.select_calls(), reads_before);

        state.feed.stop().await;
    }

    #[tokio::test]
    async fn test_stream_closes_after_feed_stops() {
        let repo = Arc::new(InMemoryProductRepository::new());
        let state = state(repo);
        state.feed.start().await.unwrap();
        state.feed.stop().await;

        let server = TestServer::new(routes(state)).unwrap();
        let response = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            server.get("/catalog/stream"),
        )
        .await
        .unwrap();

        response.assert_status_ok();
        assert!(response
            .header(header::CONTENT_TYPE)
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));
    }
}
