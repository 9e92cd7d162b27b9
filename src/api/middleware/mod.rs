//! Request processing middleware.
//!
//! - [`tracing`] - Structured request/response logging
//! - [`cors`] - Cross-origin resource sharing for the shorten API

pub mod cors;
pub mod tracing;
