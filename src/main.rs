mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::admin::{handlers::AdminPageState, routes as admin_routes};
use crate::features::appointments::routes as appointments_routes;
use crate::features::auth::{handlers::AuthState, routes as auth_routes, AuthService};
use crate::features::catalog::{handlers::CatalogState, routes as catalog_routes, CatalogRenderer};
use crate::features::products::services::{ProductRepository, SupabaseProductRepository};
use crate::features::products::{routes as products_routes, ProductFeed, ProductService};
use crate::modules::supabase::{GoTrueClient, PostgrestClient};
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // The storefront still serves pages without a backend; every data call
    // fails and the catalog shows its empty state.
    if !config.supabase.is_configured() {
        tracing::error!(
            "SUPABASE_URL and SUPABASE_ANON_KEY are not set; product data is unavailable"
        );
    }

    // Products
    let postgrest = PostgrestClient::new(&config.supabase);
    let repository: Arc<dyn ProductRepository> =
        Arc::new(SupabaseProductRepository::new(postgrest, &config.supabase));
    let product_service = Arc::new(ProductService::new(repository));
    let product_feed = Arc::new(ProductFeed::new(Arc::clone(&product_service)));
    match product_feed.start().await {
        Ok(()) => tracing::info!("Product feed subscribed to {}", config.supabase.products_table),
        Err(e) => tracing::error!("Product feed not started: {}", e),
    }

    // Admin sign-in
    let gotrue = Arc::new(GoTrueClient::new(&config.supabase));
    let auth_service = Arc::new(AuthService::new(gotrue));
    let session_config = Arc::new(config.session.clone());
    tracing::info!("Auth service initialized");

    let catalog_renderer = Arc::new(CatalogRenderer::new(config.storefront.clone()));
    tracing::info!("Catalog ready for {}", catalog_renderer.store_name());

    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Pages and API; handlers that need a session pull it from the request
    // extensions filled in by the session middleware
    let site_routes = Router::new()
        .merge(catalog_routes::routes(CatalogState {
            renderer: Arc::clone(&catalog_renderer),
            feed: Arc::clone(&product_feed),
        }))
        .merge(appointments_routes::routes())
        .merge(auth_routes::routes(AuthState {
            service: auth_service,
            session: Arc::clone(&session_config),
        }))
        .merge(admin_routes::routes(AdminPageState {
            service: Arc::clone(&product_service),
            feed: Arc::clone(&product_feed),
        }))
        .merge(products_routes::routes(Arc::clone(&product_service)))
        .layer(axum::middleware::from_fn_with_state(
            session_config,
            middleware::session_middleware,
        ));

    let app = Router::new()
        .merge(swagger)
        .merge(site_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                // Propagate X-Request-Id to response headers
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::cors_layer(
                    config.app.cors_allowed_origins.clone(),
                )),
        );

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(product_feed))
        .await?;

    tracing::info!("Server stopped; bye");

    Ok(())
}

/// Waits for ctrl-c, then stops the feed so open SSE streams end and the
/// graceful shutdown can drain
async fn shutdown_signal(feed: Arc<ProductFeed>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    feed.stop().await;
}
