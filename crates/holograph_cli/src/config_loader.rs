use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use holograph_core::config::{CONFIG_FILE_NAME, Config, load_config};
use holograph_core::log::Logger;

/// Config file used for `root`: the explicit `--conf` path if any, else
/// `holograph.yml` in the project root.
pub fn config_path(root: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => root.join(path),
        None => root.join(CONFIG_FILE_NAME),
    }
}

/// Loads the project config. A missing default file falls back to defaults;
/// a missing explicit file is an error. `--compat` forces compat mode on.
pub fn load_config_for_build(
    root: &Path,
    explicit: Option<&Path>,
    compat: bool,
    logger: &dyn Logger,
) -> Result<Config> {
    let path = config_path(root, explicit);
    let mut config = load_config(&path, explicit.is_some(), logger)
        .with_context(|| format!("failed to load {}", path.display()))?;
    if compat {
        config.compat_mode = true;
    }
    Ok(config)
}
