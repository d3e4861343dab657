//! Configuration for starpath.
//!
//! Compiler and pivot settings, loaded from TOML with environment variable expansion.

mod settings;

pub use settings::{expand_env_vars, CompilerSettings, PivotSettings, Settings, SettingsError};
