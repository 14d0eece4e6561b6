//! Supabase clients
//!
//! - [`postgrest`]: table reads and writes over `/rest/v1`
//! - [`gotrue`]: password sign-in and sign-out over `/auth/v1`
//! - [`realtime`]: `postgres_changes` notifications over the Realtime socket

pub mod gotrue;
pub mod postgrest;
pub mod realtime;

pub use gotrue::GoTrueClient;
pub use postgrest::PostgrestClient;
pub use realtime::RealtimeEvent;
