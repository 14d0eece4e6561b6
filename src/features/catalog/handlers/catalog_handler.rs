use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, Response,
    },
};
use chrono::Utc;
use futures::Stream;
use minijinja::context;
use tokio_stream::StreamExt;

use crate::core::error::Result;
use crate::features::appointments::services::appointment_window;
use crate::features::catalog::services::CatalogRenderer;
use crate::features::products::ProductFeed;
use crate::shared::flash::Flash;
use crate::shared::templates::render_template;
use crate::shared::toast::ToastView;

#[derive(Clone)]
pub struct CatalogState {
    pub renderer: Arc<CatalogRenderer>,
    pub feed: Arc<ProductFeed>,
}

/// Landing page with the catalog and the appointment form
pub async fn index(State(state): State<CatalogState>, flash: Flash) -> Result<Response> {
    let products = state.feed.current_products().await;
    let catalog = state.renderer.render_fragment(&products)?;
    let window = appointment_window(Utc::now().date_naive());

    let consumed = flash.0.is_some();
    let html = render_template(
        "index.html",
        context! {
            store_name => state.renderer.store_name(),
            catalog => catalog,
            appointment_min => window.min_input_value(),
            appointment_max => window.max_input_value(),
            toast => flash.0.as_ref().map(ToastView::from),
        },
    )?;
    Ok(Flash::page(consumed, html))
}

/// Current catalog markup, for clients that poll instead of streaming
pub async fn products_fragment(State(state): State<CatalogState>) -> Result<Html<String>> {
    let products = state.feed.current_products().await;
    Ok(Html(state.renderer.render_fragment(&products)?))
}

/// Re-rendered catalog markup on every feed update
pub async fn products_stream(
    State(state): State<CatalogState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let renderer = Arc::clone(&state.renderer);
    let stream = state
        .feed
        .updates()
        .await
        .filter(|snapshot| snapshot.loaded)
        .filter_map(move |snapshot| match renderer.render_fragment(&snapshot.products) {
            Ok(html) => Some(Ok(Event::default()
                .event("products")
                .id(snapshot.version.to_string())
                .data(html))),
            Err(e) => {
                tracing::error!("Failed to render catalog update: {}", e);
                None
            }
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
