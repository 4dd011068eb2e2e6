//! # digitalocean-core
//!
//! Core types and utilities for working with the DigitalOcean v2 API.
//!
//! This crate provides the shared error type, client configuration, the HTTP
//! transport every service binding goes through, and the domain types that
//! several services return.
//!
//! ## Modules
//!
//! - [`error`] - Error types and API error body mapping
//! - [`config`] - Serializable, validated client configuration
//! - [`client`] - HTTP transport, request construction and execution
//! - [`response`] - Per-call response metadata (status, rate limits, pagination)
//! - [`types`] - Shared domain types (actions, regions)

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod response;
pub mod types;

// Re-export commonly used types
pub use client::{Client, ClientBuilder, Transport, TransportExt};
pub use error::{Error, Result};
pub use response::Response;
