use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Redirect, Response,
    },
    Form,
};
use futures::Stream;
use minijinja::context;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::admin::dtos::{DeleteConfirmDto, ProductFormInput, ProductRow};
use crate::features::admin::state::{AdminPanel, AdminView, ProductForm};
use crate::features::auth::guards::AdminSession;
use crate::features::products::models::Product;
use crate::features::products::{ProductFeed, ProductService};
use crate::shared::constants::{ADMIN_HOME_PATH, MSG_PRODUCT_LOAD_FAILED};
use crate::shared::flash::{redirect_with_toast, Flash};
use crate::shared::templates::render_template;
use crate::shared::toast::{Toast, ToastView};

#[derive(Clone)]
pub struct AdminPageState {
    pub service: Arc<ProductService>,
    pub feed: Arc<ProductFeed>,
}

fn rows(products: &[Product]) -> Vec<ProductRow> {
    products.iter().map(ProductRow::from).collect()
}

fn render_table(products: &[Product]) -> Result<String> {
    render_template("admin/table.html", context! { rows => rows(products) })
}

fn render_form(form: &ProductForm, toast: Option<&Toast>) -> Result<Response> {
    let action = match form.edit_id {
        Some(id) => format!("/admin/products/{}", id),
        None => "/admin/products".to_string(),
    };
    let html = render_template(
        "admin/form.html",
        context! {
            title => form.title(),
            action => action,
            editing => form.edit_id.is_some(),
            fields => &form.fields,
            toast => toast.map(ToastView::from),
        },
    )?;
    Ok(Flash::page(false, html))
}

/// Turn the panel's resulting state into a response: the table by redirect,
/// or the form rendered in place
fn finish(mut panel: AdminPanel) -> Result<Response> {
    let toast = panel.take_toast();
    match panel.view() {
        AdminView::List => Ok(match toast {
            Some(toast) => redirect_with_toast(ADMIN_HOME_PATH, &toast),
            None => Redirect::to(ADMIN_HOME_PATH).into_response(),
        }),
        AdminView::Form(form) => render_form(form, toast.as_ref()),
    }
}

/// Products table
pub async fn list(
    AdminSession(_session): AdminSession,
    State(state): State<AdminPageState>,
    flash: Flash,
) -> Result<Response> {
    let products = state.feed.current_products().await;
    let table = render_table(&products)?;

    let consumed = flash.0.is_some();
    let html = render_template(
        "admin/list.html",
        context! {
            table => table,
            toast => flash.0.as_ref().map(ToastView::from),
        },
    )?;
    Ok(Flash::page(consumed, html))
}

/// Re-rendered table rows on every feed update
pub async fn table_stream(
    AdminSession(_session): AdminSession,
    State(state): State<AdminPageState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let stream = state
        .feed
        .updates()
        .await
        .filter(|snapshot| snapshot.loaded)
        .filter_map(|snapshot| match render_table(&snapshot.products) {
            Ok(html) => Some(Ok(Event::default()
                .event("products")
                .id(snapshot.version.to_string())
                .data(html))),
            Err(e) => {
                tracing::error!("Failed to render admin table update: {}", e);
                None
            }
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Empty form for a new product
pub async fn new_form(AdminSession(_session): AdminSession) -> Result<Response> {
    finish(AdminPanel::creating())
}

/// Form prefilled from a freshly loaded product list
pub async fn edit_form(
    AdminSession(_session): AdminSession,
    State(state): State<AdminPageState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let products = state.service.get_all_products().await;

    let mut panel = AdminPanel::new();
    panel.open_edit(id, &products);
    finish(panel)
}

pub async fn create(
    AdminSession(session): AdminSession,
    State(state): State<AdminPageState>,
    Form(fields): Form<ProductFormInput>,
) -> Result<Response> {
    let mut panel = AdminPanel::creating();
    panel.submit(&state.service, &session, fields).await;
    finish(panel)
}

pub async fn update(
    AdminSession(session): AdminSession,
    State(state): State<AdminPageState>,
    Path(id): Path<Uuid>,
    Form(fields): Form<ProductFormInput>,
) -> Result<Response> {
    let mut panel = AdminPanel::editing(id);
    panel.submit(&state.service, &session, fields).await;
    finish(panel)
}

pub async fn cancel(AdminSession(_session): AdminSession) -> Result<Response> {
    let mut panel = AdminPanel::creating();
    panel.cancel();
    finish(panel)
}

/// Confirmation step before a delete
pub async fn delete_confirm(
    AdminSession(_session): AdminSession,
    State(state): State<AdminPageState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let products = state.service.get_all_products().await;
    let Some(product) = products.iter().find(|product| product.id == id) else {
        return Ok(redirect_with_toast(
            ADMIN_HOME_PATH,
            &Toast::error(MSG_PRODUCT_LOAD_FAILED),
        ));
    };

    let html = render_template(
        "admin/delete.html",
        context! {
            product => context! { id => product.id.to_string(), name => &product.name },
            toast => (),
        },
    )?;
    Ok(Flash::page(false, html))
}

pub async fn delete(
    AdminSession(session): AdminSession,
    State(state): State<AdminPageState>,
    Path(id): Path<Uuid>,
    Form(dto): Form<DeleteConfirmDto>,
) -> Result<Response> {
    if !dto.is_confirmed() {
        return Ok(Redirect::to(ADMIN_HOME_PATH).into_response());
    }

    let mut panel = AdminPanel::new();
    panel.delete(&state.service, &session, id).await;
    finish(panel)
}
