//! Configuration Module
//!
//! Controller configuration loaded from TOML, with environment and CLI
//! overrides applied on top.
//!
//! ## Loading Order
//!
//! 1. `CROSSWALK_CONFIG` environment variable (path to TOML file)
//! 2. `crosswalk.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded value is passed explicitly to whatever needs it; there is no
//! process-wide config singleton.

mod crosswalk_config;
pub mod defaults;
pub mod validation;

pub use crosswalk_config::*;
