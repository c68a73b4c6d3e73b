//! Scenario files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use loupe_dom::{DomError, MarkupError, SelectorError};
use loupe_overlay::{OverlayConfig, OverlayState, ZoomError};

/// A scripted page session.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Human readable name
    pub name: String,

    /// Overlay config fields overriding the base configuration
    #[serde(default)]
    pub config: serde_yaml::Mapping,

    /// Initial page content
    pub page: PageSpec,

    /// Steps, executed in order
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Initial page content.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageSpec {
    /// Well-formed markup placed inside `<body>`
    pub body: String,
}

/// A single scenario step.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Fire the initial page load signal
    Load,

    /// Swap page content and fire the soft navigation signal
    Navigate {
        /// New content for `<main>` (or `<body>` when there is no `<main>`);
        /// absent means the content persists across the transition
        #[serde(default)]
        markup: Option<String>,
    },

    /// The rendering library replaces a container's content
    Render { target: String, markup: String },

    /// Click the first element matching a selector
    Click(String),

    /// Press a key
    Key(String),

    /// Let time pass, in milliseconds
    Wait(u64),

    /// Check the page state
    Expect(Expectation),
}

/// Assertions about the page state. Absent fields are not checked.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// Overlay lifecycle state
    pub overlay: Option<OverlayState>,

    /// Selector of the diagram the overlay shows
    pub showing: Option<String>,

    /// Number of overlay elements in the document
    pub overlays: Option<usize>,

    /// Whether page scrolling is suppressed
    pub scroll_locked: Option<bool>,

    /// Number of bound diagrams
    pub bound: Option<usize>,

    /// Total number of overlay opens so far
    pub opens: Option<usize>,

    /// Whether the displayed clone still has fixed sizing
    pub clone_sized: Option<bool>,
}

/// Errors that can occur while loading or running scenarios.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Failed to read scenario {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid scenario YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid overlay configuration: {0}")]
    Config(#[from] ZoomError),

    #[error("Invalid selector in step {step}: {source}")]
    Selector { step: usize, source: SelectorError },

    #[error("No element matches '{selector}' in step {step}")]
    NoMatch { step: usize, selector: String },

    #[error("Invalid markup: {0}")]
    Markup(#[from] MarkupError),

    #[error("Document update failed: {0}")]
    Dom(#[from] DomError),
}

impl Scenario {
    /// Parse a scenario from YAML.
    pub fn from_yaml(source: &str) -> Result<Self, RuntimeError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Load a scenario file.
    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let source = fs::read_to_string(path).map_err(|source| RuntimeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&source)
    }

    /// The overlay configuration for this scenario: `base` with the
    /// scenario's overrides applied.
    pub fn effective_config(&self, base: &OverlayConfig) -> Result<OverlayConfig, RuntimeError> {
        let mut value = serde_yaml::to_value(base)?;
        if let serde_yaml::Value::Mapping(fields) = &mut value {
            for (key, override_value) in &self.config {
                fields.insert(key.clone(), override_value.clone());
            }
        }
        Ok(serde_yaml::from_value(value)?)
    }
}

/// Find scenario files (`.yaml` / `.yml`) under a directory, sorted by path.
pub fn discover_scenarios(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext == "yaml" || ext == "yml"
        })
        .collect();

    found.sort();
    found
}
