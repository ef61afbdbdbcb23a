//! Infrastructure - configuration and key material
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults)
//! - `secret` - Pre-shared QR secret, loaded from the environment

pub mod config;
pub mod secret;

// Re-export commonly used types
pub use config::Config;
pub use secret::{SecretError, SharedSecret};
