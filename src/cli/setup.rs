use crate::core::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yml");

/// Writes the example allocations file to `path`, or to the default config
/// location, and returns where it went. An existing file is kept unless
/// `force` is set.
pub fn setup(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => AppConfig::default_config_path()?,
    };
    write_example(&path, force)?;

    println!("Wrote example allocations to {}", path.display());
    println!("Set the account ids from your tracker, then run `contrib-import validate`.");
    Ok(path)
}

fn write_example(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to replace it", path.display());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!(path = %path.display(), force, "Wrote example configuration");
    Ok(())
}
