//! Error types for the Cardsmith library.
//!
//! This crate provides the foundation error types used throughout the Cardsmith workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use cardsmith_error::{CardsmithResult, HttpError};
//!
//! fn fetch_data() -> CardsmithResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! assert!(fetch_data().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod http;
mod json;

pub use config::ConfigError;
pub use error::{CardsmithError, CardsmithErrorKind, CardsmithResult};
pub use generation::{GenerationError, GenerationErrorKind, GenerationResult, RetriesExhausted};
pub use http::HttpError;
pub use json::JsonError;
