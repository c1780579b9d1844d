//! sqlprune CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `sqlprune` binary.

pub mod cli;
pub mod config;
pub mod input;
pub mod output;
pub mod prompt;

// Re-export commonly used types
pub use cli::Args;
