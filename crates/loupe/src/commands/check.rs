//! Run every scenario under a directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use rayon::prelude::*;

use loupe_overlay::OverlayConfig;
use loupe_runtime::{discover_scenarios, Scenario, ScenarioRunner};

use crate::config::ConfigFile;

/// Outcome of one scenario file.
#[derive(Debug)]
struct Outcome {
    path: PathBuf,
    result: Result<Vec<String>, String>,
}

impl Outcome {
    fn passed(&self) -> bool {
        matches!(&self.result, Ok(failures) if failures.is_empty())
    }
}

/// Run the check command.
pub async fn run(config: &ConfigFile, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config.scenarios.dir.clone());
    if !dir.exists() {
        anyhow::bail!("Scenario directory {} does not exist", dir.display());
    }

    let start = Instant::now();
    let outcomes = check_dir(&dir, &config.overlay);

    for outcome in &outcomes {
        match &outcome.result {
            Ok(failures) if failures.is_empty() => {
                tracing::info!("ok      {}", outcome.path.display());
            }
            Ok(failures) => {
                tracing::error!("FAILED  {}", outcome.path.display());
                for failure in failures {
                    tracing::error!("  {}", failure);
                }
            }
            Err(e) => {
                tracing::error!("ERROR   {}: {}", outcome.path.display(), e);
            }
        }
    }

    let failed = outcomes.iter().filter(|o| !o.passed()).count();
    tracing::info!(
        "{} scenarios, {} passed, {} failed in {}ms",
        outcomes.len(),
        outcomes.len() - failed,
        failed,
        start.elapsed().as_millis()
    );

    if failed > 0 {
        anyhow::bail!("{} scenario(s) failed", failed);
    }
    Ok(())
}

/// Run all scenarios under `dir` in parallel, in path order.
fn check_dir(dir: &Path, overlay: &OverlayConfig) -> Vec<Outcome> {
    let runner = ScenarioRunner::new(overlay.clone());

    discover_scenarios(dir)
        .into_par_iter()
        .map(|path| {
            let result: Result<Vec<String>, String> = Scenario::load(&path)
                .and_then(|scenario| runner.run(&scenario))
                .map(|report| {
                    report
                        .failures
                        .iter()
                        .map(|f| format!("step {}: {}", f.step + 1, f.message))
                        .collect()
                })
                .map_err(|e| e.to_string());
            Outcome { path, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    const PASSING: &str = r##"
name: passing
page:
  body: '<div class="mermaid" id="a"><svg/></div>'
steps:
  - load
  - wait: 500
  - click: "#a"
  - expect: { overlay: open }
"##;

    #[test]
    fn reports_each_file_in_order() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.yaml"), PASSING).unwrap();
        fs::write(
            temp.path().join("b.yaml"),
            PASSING.replace("overlay: open", "overlay: closed"),
        )
        .unwrap();
        fs::write(temp.path().join("c.yml"), "name: [broken").unwrap();

        let outcomes = check_dir(temp.path(), &OverlayConfig::default());

        let passed: Vec<bool> = outcomes.iter().map(|o| o.passed()).collect();
        assert_eq!(passed, vec![true, false, false]);
        assert_eq!(outcomes[1].result.as_ref().map(|f| f.len()), Ok(1));
        assert!(outcomes[2].result.is_err());
    }

    #[tokio::test]
    async fn any_failure_fails_the_command() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("b.yaml"),
            PASSING.replace("overlay: open", "overlay: closed"),
        )
        .unwrap();

        let result = run(&ConfigFile::default(), Some(temp.path().to_path_buf())).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn passing_directory_succeeds() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.yaml"), PASSING).unwrap();

        let result = run(&ConfigFile::default(), Some(temp.path().to_path_buf())).await;

        assert!(result.is_ok());
    }
}
