//! Domain layer containing the store contract the whole service is built on.
//!
//! # Design Principles
//!
//! - The domain layer has no dependencies on infrastructure or presentation layers
//! - [`store::KeyValueStore`] defines the contract implemented by the
//!   infrastructure layer
//! - Every piece of shared state (link mappings, rate buckets, the visit
//!   counter) is owned by the external store; services treat each read as a
//!   snapshot that may already be stale

pub mod store;
