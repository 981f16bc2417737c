// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::Settings;

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings() -> Result<Settings> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());
    load_settings_from("config", &environment)
}

/// Same layering as [`load_settings`], rooted at `dir`.
pub fn load_settings_from(dir: &str, environment: &str) -> Result<Settings> {
    let settings = Config::builder()
        .add_source(File::with_name(&format!("{dir}/base")))
        .add_source(File::with_name(&format!("{dir}/{environment}")).required(false))
        // e.g. `APP_DATABASE__URL=...`
        .add_source(Environment::with_prefix("APP").prefix_separator("_").separator("__"))
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}
