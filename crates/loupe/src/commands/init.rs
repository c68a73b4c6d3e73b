//! Write a starter config and scenario.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing loupe...");

    let written = write_starter_files(config_path, Path::new("scenarios"), yes)?;
    if written == 0 {
        tracing::warn!("Starter files already exist. Use --yes to overwrite.");
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'loupe check' to run the scenarios.");

    Ok(())
}

/// Write the config file and the basic scenario, skipping files that exist
/// unless `overwrite` is set. Returns the number of files written.
fn write_starter_files(config_path: &Path, scenario_dir: &Path, overwrite: bool) -> Result<usize> {
    let mut written = 0;

    if !config_path.exists() || overwrite {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
        written += 1;
    }

    fs::create_dir_all(scenario_dir).context("Failed to create scenarios directory")?;

    let scenario_path = scenario_dir.join("basic.yaml");
    if !scenario_path.exists() || overwrite {
        fs::write(&scenario_path, DEFAULT_SCENARIO).context("Failed to write basic.yaml")?;
        tracing::info!("Created {}", scenario_path.display());
        written += 1;
    }

    Ok(written)
}

const DEFAULT_CONFIG: &str = r#"# Loupe Configuration

[overlay]
# Selector identifying diagram containers
diagram_selector = ".mermaid"

# Delay after page load / navigation before scanning for diagrams
scan_delay_ms = 500

# Look for the graphic next to the container, and in raw text
sibling_lookup = true
inline_fallback = true

[css]
backdrop = "rgba(0, 0, 0, 0.85)"
max_height = "90vh"

[build]
# Minify the generated stylesheet
minify = true

[scenarios]
dir = "scenarios"
"#;

const DEFAULT_SCENARIO: &str = r##"# Two diagrams; only the first has rendered when the scan runs.
name: basic
page:
  body: >-
    <main>
    <div class="mermaid" id="flow"><svg xmlns="http://www.w3.org/2000/svg" width="640" height="320" viewBox="0 0 640 320"><rect width="640" height="320"/></svg></div>
    <div class="mermaid" id="late">graph LR; A--&gt;B</div>
    </main>
steps:
  - load
  - wait: 600
  - click: "#flow"
  - expect: { overlay: open, showing: "#flow", scroll_locked: true, clone_sized: false }
  - click: ".diagram-zoom-backdrop"
  - expect: { overlay: closed, scroll_locked: false }

  # Renders late: stays inert until the next navigation
  - render:
      target: "#late"
      markup: '<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"/>'
  - click: "#late"
  - expect: { overlay: closed, opens: 1 }

  - navigate: {}
  - wait: 600
  - click: "#late"
  - expect: { overlay: open, showing: "#late", overlays: 1, bound: 2 }
  - key: Escape
  - expect: { overlay: closed, opens: 2 }
"##;
