//! rankwatch library
//!
//! Exposes the validator, resolver, caches, provider client, and HTTP server
//! so the binary and the integration tests share one implementation.

pub mod cache;
pub mod cli;
pub mod data;
pub mod resolver;
pub mod server;
pub mod validate;
