//! Application layer with the services behind the HTTP handlers.
//!
//! # Modules
//!
//! - [`rate_limiter`] - Per-IP sliding window rate limiting over store counters
//! - [`code_generator`] - Short code generation and collision handling
//! - [`shortener`] - Shorten/resolve orchestration

pub mod code_generator;
pub mod rate_limiter;
pub mod shortener;
