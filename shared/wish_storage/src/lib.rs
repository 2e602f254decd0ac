//! Backend storage for birthday wishes
//!
//! This crate owns the `DynamoDB` table client used by the submission backend
//! to persist wishes once their photo (if any) has been stored.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Wishes table client
pub mod wish;
