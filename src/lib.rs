//! Kool: preset-driven project scaffolding.
//!
//! Presets and recipes are YAML step lists. Steps run shell scripts, copy
//! templates, deep-merge YAML fragments into project files, expand other
//! recipes and ask the user to pick between branches.

pub mod cli;
pub mod core;
pub mod error;
pub mod transport;
