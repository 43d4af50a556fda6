//! # ListSync Domain
//!
//! Data types shared by every listsync crate.
//!
//! This crate contains:
//! - Credential and header types
//! - Pending operation metadata and the typed operation payloads
//! - Push-channel signals and connection state
//! - The sync error taxonomy and Result alias
//! - Client configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other listsync crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
