//! Generate the overlay stylesheet.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use loupe_static::AssetPipeline;

use crate::config::ConfigFile;

/// Run the css command.
pub async fn run(config: &ConfigFile, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    let css = stylesheet(config, minify.unwrap_or(config.build.minify))?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, &css).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} ({} bytes)", path.display(), css.len());
        }
        None => print!("{}", css),
    }

    Ok(())
}

fn stylesheet(config: &ConfigFile, minify: bool) -> Result<String> {
    let css = AssetPipeline::overlay_css(&config.overlay, &config.css);
    if minify {
        return Ok(AssetPipeline::minify_css(&css)?);
    }
    Ok(css)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn minification_follows_flag() {
        let config = ConfigFile::default();

        let plain = stylesheet(&config, false).unwrap();
        let minified = stylesheet(&config, true).unwrap();

        assert!(plain.contains("/* loupe diagram zoom overlay */"));
        assert!(!minified.contains('\n'));
    }

    #[tokio::test]
    async fn writes_to_nested_output() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("assets").join("loupe.css");

        run(&ConfigFile::default(), Some(path.clone()), Some(false))
            .await
            .unwrap();

        let css = fs::read_to_string(&path).unwrap();
        assert!(css.contains("#diagram-zoom-overlay"));
    }
}
