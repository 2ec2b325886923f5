//! Order API Module
//!
//! Read-only order lists backed by the snapshot paginators.

mod handler;
mod links;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        // Page-number list (no count unless show_count=true)
        .route("/api/orders", get(handler::list))
        // Limit/offset list (always counted)
        .route("/api/orders/offset", get(handler::list_window))
}
