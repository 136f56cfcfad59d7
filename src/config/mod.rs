// src/config/mod.rs

//! Pipeline definition: TOML model, loading and semantic validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, JobConfig, WorkflowSection};
pub use validate::validate_config;
