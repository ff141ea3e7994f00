//! # Wikimatch Library
//!
//! This library exposes the wikimatch modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod config;

// Re-export wikimatch_core for convenience
pub use wikimatch_core;
