//! Public catalog: in-stock product cards with a WhatsApp order link.
//!
//! The landing page renders the current feed snapshot; open pages keep
//! `#products-container` current through the `/catalog/stream` SSE feed.

pub mod handlers;
pub mod routes;
pub mod services;

pub use services::CatalogRenderer;
