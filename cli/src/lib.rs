//! CLI utilities for rolecut.
//!
//! This crate provides configuration, path and output helpers shared by the
//! command line tools.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{load_config, Config, Profile};
pub use output::{Output, OutputFormat};
pub use paths::Paths;
