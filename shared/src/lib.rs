//! Shared types for the shop workspace
//!
//! Error system, order model and the list request/response wire types used by the server and
//! its clients.

pub mod error;
pub mod models;
pub mod request;
pub mod response;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use models::{Order, OrderStatus};
