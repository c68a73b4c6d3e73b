//! Run a single scenario.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use loupe_runtime::{Driver, RunReport, Scenario, ScenarioRunner, TraceEntry};
use loupe_static::{AssetPipeline, Snapshot, TemplateEngine};

use crate::config::ConfigFile;

/// Flags for the run command.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub realtime: bool,
    pub snapshot: Option<PathBuf>,
    pub json: bool,
}

/// Run the run command.
pub async fn run(config: &ConfigFile, path: &Path, options: RunOptions) -> Result<()> {
    let scenario = Scenario::load(path)?;

    let report = if options.realtime {
        let driver = Driver::new(config.overlay.clone());
        let mut live = driver.hub().subscribe();
        let printer = tokio::spawn(async move {
            while let Ok(entry) = live.recv().await {
                tracing::info!("{}", describe(&entry));
            }
        });

        let report = driver.run(&scenario).await;
        // Dropping the driver closes the hub and ends the printer
        drop(driver);
        printer.await.context("Trace printer panicked")?;
        report?
    } else {
        ScenarioRunner::new(config.overlay.clone()).run(&scenario)?
    };

    if let Some(snapshot_path) = &options.snapshot {
        write_snapshot(config, &report, snapshot_path)?;
        tracing::info!("Snapshot: {}", snapshot_path.display());
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, !options.realtime);
    }

    if !report.passed {
        anyhow::bail!(
            "Scenario '{}' failed {} expectation(s)",
            report.name,
            report.failures.len()
        );
    }

    Ok(())
}

/// One trace line, e.g. `500ms bound #a`.
pub fn describe(entry: &TraceEntry) -> String {
    let mut line = format!("{}ms {}", entry.at_ms, entry.event);
    if let Some(diagram) = &entry.diagram {
        line.push(' ');
        line.push_str(diagram);
    }
    if let Some(detail) = &entry.detail {
        line.push_str(&format!(" ({})", detail));
    }
    line
}

fn print_report(report: &RunReport, with_trace: bool) {
    if with_trace {
        for entry in &report.trace {
            tracing::info!("{}", describe(entry));
        }
    }
    for failure in &report.failures {
        tracing::error!("step {}: {}", failure.step + 1, failure.message);
    }

    let status = if report.passed { "passed" } else { "FAILED" };
    tracing::info!(
        "{}: {} after {} steps ({}ms virtual)",
        report.name,
        status,
        report.steps,
        report.elapsed_ms
    );
}

fn write_snapshot(config: &ConfigFile, report: &RunReport, path: &Path) -> Result<()> {
    let mut css = AssetPipeline::overlay_css(&config.overlay, &config.css);
    if config.build.minify {
        css = AssetPipeline::minify_css(&css)?;
    }

    let snapshot = Snapshot {
        title: report.name.clone(),
        passed: report.passed,
        css,
        body: report.final_body.clone(),
        trace: report.trace.iter().map(describe).collect(),
    };

    let html = TemplateEngine::new()?.render_snapshot(&snapshot)?;
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
