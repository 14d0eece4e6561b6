//! Admin panel: products table plus create/edit form, behind the session
//! guard.
//!
//! ## Pages
//!
//! | Method | Path | Transition |
//! |--------|------|------------|
//! | GET | `/admin` | table |
//! | GET | `/admin/products/new` | open create form |
//! | GET | `/admin/products/{id}/edit` | open edit form |
//! | POST | `/admin/products` | submit create |
//! | POST | `/admin/products/{id}` | submit edit |
//! | POST | `/admin/products/cancel` | close form |
//! | GET | `/admin/products/{id}/delete` | confirm delete |
//! | POST | `/admin/products/{id}/delete` | delete (`confirm=yes`) |
//! | GET | `/admin/products/stream` | live table rows (SSE) |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod state;
