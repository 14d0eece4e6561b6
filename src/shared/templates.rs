//! HTML page templates (Jinja2 syntax via minijinja).
//!
//! Templates are compiled into the binary and registered on first use.
//! Names ending in `.html` are auto-escaped.

use std::sync::OnceLock;

use minijinja::Environment;
use serde::Serialize;

use crate::core::error::Result;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("index.html", include_str!("../../templates/index.html")),
    (
        "catalog/products.html",
        include_str!("../../templates/catalog/products.html"),
    ),
    ("admin/list.html", include_str!("../../templates/admin/list.html")),
    ("admin/table.html", include_str!("../../templates/admin/table.html")),
    ("admin/form.html", include_str!("../../templates/admin/form.html")),
    ("admin/delete.html", include_str!("../../templates/admin/delete.html")),
    ("admin/login.html", include_str!("../../templates/admin/login.html")),
];

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a registered template with a serializable context
pub fn render_template<S: Serialize>(template_name: &str, ctx: S) -> Result<String> {
    let template = get_environment().get_template(template_name)?;
    Ok(template.render(ctx)?)
}

#[cfg(test)]
pub fn template_exists(template_name: &str) -> bool {
    get_environment().get_template(template_name).is_ok()
}
