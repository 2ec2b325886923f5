//! Unified error system for the shop workspace
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors (validation, invalid page)
//! - 9xxx: System errors (store / cache unavailable)
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::invalid_page("7", "That page contains no results");
//! assert_eq!(err.code, ErrorCode::InvalidPage);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(9));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
