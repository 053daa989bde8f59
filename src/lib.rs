// ABOUTME: Library root for vaultship - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod crypto;
pub mod deploy;
pub mod envfile;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod runtime;
pub mod types;
