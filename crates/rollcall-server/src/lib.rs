//! # Rollcall Server
//!
//! HTTP front end for the attendance analytics engine.
//!
//! Exposes `GET /api/attendance/analytics`, cache administration under
//! `/api/attendance/analytics/cache`, and `GET /health`.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod error;
pub mod server;

pub use api::*;
pub use error::*;
pub use server::*;
