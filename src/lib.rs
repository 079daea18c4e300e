//! Multi-asset payment gateway library.
//!
//! Builds unsigned transfers for a native coin rail and ERC-20 style token
//! rails, reattaches external signatures and broadcasts, and answers
//! finality-aware "did this payment arrive" queries.

pub mod blockchain;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rails;

pub use config::schema::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
