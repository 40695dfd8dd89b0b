//! Unified error system for the bingo hall
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain (code range)
//! - [`ErrorKind`]: Taxonomy clients branch on (validation, conflict, retry...)
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Cashier errors
//! - 4xxx: Game errors
//! - 5xxx: Bet errors
//! - 6xxx: Verification errors
//! - 7xxx: Catalog errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode, ErrorKind};
//!
//! let err = AppError::new(ErrorCode::DuplicateDraw).with_detail("number", 42);
//! assert_eq!(err.kind(), ErrorKind::StateConflict);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(4004));
//! ```

mod category;
mod codes;
mod http;
mod kind;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use kind::ErrorKind;
pub use types::{ApiResponse, AppError, AppResult};
