//! Configuration module for whisperup
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{EnvSettings, Settings, SystemSettings, WhisperSettings};
