//! # Rollcall Config
//!
//! Type-safe configuration for the Rollcall analytics service.
//!
//! Loads YAML, applies `ROLLCALL_*` environment overrides, validates every
//! section.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
