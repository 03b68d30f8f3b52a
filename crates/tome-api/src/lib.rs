//! REST surface for Tome.
//!
//! Exposes the chat modes, document management, and diagnostics over axum.
//! Every response is a JSON envelope: `{"success": true, ...}` on success,
//! `{"success": false, "error": ..., "timestamp": ...}` with HTTP 500 on any
//! failure.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
