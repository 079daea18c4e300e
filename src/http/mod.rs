//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! request
//!     → server.rs (Axum router, trace + timeout layers)
//!     → handlers.rs (symbol check, body/query shape, MISSING_* statuses)
//!     → Gateway
//!     → response.rs (boundary status → HTTP status)
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
