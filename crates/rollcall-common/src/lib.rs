//! # Rollcall Common
//!
//! Shared attendance types, error handling, and logging for Rollcall.
//!
//! This crate provides the foundational types and utilities used across
//! all other crates in the Rollcall workspace.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, RollcallError};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use types::*;
pub use utils::*;
