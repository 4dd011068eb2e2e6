//! Image actions client for the DigitalOcean API.
//!
//! Provides the [`ImageActionsService`] capability and its HTTP-backed
//! implementation for reading image action status, transferring images
//! between regions and converting images to snapshots.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::{ImageActionsClient, ImageActionsService};
pub use digitalocean_core::types::Action;
pub use models::{ActionEnvelope, ActionRequest};

/// Convenient result alias using the shared DigitalOcean error type.
pub type Result<T> = digitalocean_core::Result<T>;
