//! Products: the storefront's only persisted entity.
//!
//! [`ProductService`] is the single gateway to the products table. It backs
//! the catalog, the admin panel and the JSON API below, and feeds
//! [`ProductFeed`], the live list that other features render from.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/products` | No | List products, newest first |
//! | POST | `/api/products` | Session | Create a product |
//! | PATCH | `/api/products/{id}` | Session | Partial update |
//! | DELETE | `/api/products/{id}` | Session | Delete a product |
//! | POST | `/api/products/{id}/stock` | Session | Adjust stock by a delta |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{ProductFeed, ProductService};
