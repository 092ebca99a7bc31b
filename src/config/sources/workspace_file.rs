//! Workspace config files under `<workspace>/config/`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Selects the overlay file, e.g. `QUERYSTATE_ENV=ci` reads `config/ci.toml`.
pub const ENV_VAR: &str = "QUERYSTATE_ENV";

const DEFAULT_ENV: &str = "development";

/// Existing config files for `workspace_root`, lowest precedence first:
/// `config/config.toml`, then the overlay named by [`ENV_VAR`].
pub fn workspace_config_paths(workspace_root: &Path) -> Vec<PathBuf> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var(ENV_VAR)
        .ok()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string());

    [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ]
    .into_iter()
    .filter(|path| path.is_file())
    .collect()
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = workspace_config_paths(workspace_root)
        .into_iter()
        .fold(builder, |builder, path| {
            debug!(config_path = %path.display(), "Adding workspace configuration file");
            builder.add_source(File::from(path))
        });
    Ok(builder)
}
