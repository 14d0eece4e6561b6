//! Admin session handling.
//!
//! The login form is a pass-through to the hosted auth service; the returned
//! access token is kept in an HttpOnly cookie and forwarded on every write.

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use services::AuthService;
