//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients for the hosted backend the storefront runs on.

pub mod supabase;
