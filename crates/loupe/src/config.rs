//! `loupe.toml` loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use loupe_overlay::OverlayConfig;
use loupe_static::StyleConfig;

/// Configuration file structure (loupe.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub css: StyleConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub scenarios: ScenarioSettings,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_minify")]
    pub minify: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioSettings {
    #[serde(default = "default_scenario_dir")]
    pub dir: PathBuf,
}

fn default_minify() -> bool {
    true
}
fn default_scenario_dir() -> PathBuf {
    PathBuf::from("scenarios")
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            dir: default_scenario_dir(),
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    // Reject selectors early rather than on the first scenario
    loupe_overlay::ZoomOverlay::new(config.overlay.clone())
        .with_context(|| format!("Invalid [overlay] section in {}", path.display()))?;

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}
