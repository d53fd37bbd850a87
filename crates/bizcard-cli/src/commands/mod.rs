//! CLI command implementations.

pub mod config;
pub mod process;
pub mod stored;

use std::path::Path;

use bizcard_core::BizcardConfig;

/// Load configuration from the given path or the default location, then
/// apply environment overrides.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BizcardConfig> {
    let mut config = match config_path {
        Some(path) => BizcardConfig::from_file(Path::new(path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                BizcardConfig::from_file(&default_path)?
            } else {
                BizcardConfig::default()
            }
        }
    };

    config.apply_env();
    Ok(config)
}
