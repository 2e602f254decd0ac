//! Birthday wishes backend
//!
//! Collects a wish (author, optional recipient, message, optional photo),
//! renders its preview card, and stores it: the photo goes to object storage
//! first, then a record referencing the photo's URL is inserted.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// S3 photo storage
pub mod media_storage;

/// HTTP routes
pub mod routes;

/// HTTP server
pub mod server;

/// Validation, preview and the submission pipeline
pub mod submission;

/// Configuration and error types
pub mod types;

/// Storage collaborator used by the pipeline
pub mod wish_backend;
