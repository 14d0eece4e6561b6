//! Appointment and prescription requests from the landing page.
//!
//! Requests are validated and logged for follow-up on WhatsApp. Nothing is
//! persisted and attachments are discarded after reading.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
