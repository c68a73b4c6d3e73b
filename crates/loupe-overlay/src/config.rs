//! Overlay configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the diagram zoom overlay.
///
/// Every field has a default, so a partial `[overlay]` table is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Selector identifying diagram containers
    #[serde(default = "default_diagram_selector")]
    pub diagram_selector: String,

    /// Attribute stamped on bound diagrams
    #[serde(default = "default_marker_attribute")]
    pub marker_attribute: String,

    /// Stable id of the overlay element
    #[serde(default = "default_overlay_id")]
    pub overlay_id: String,

    /// State class present while the overlay is open
    #[serde(default = "default_active_class")]
    pub active_class: String,

    #[serde(default = "default_backdrop_class")]
    pub backdrop_class: String,

    #[serde(default = "default_close_class")]
    pub close_class: String,

    #[serde(default = "default_content_class")]
    pub content_class: String,

    /// Class added to the cloned vector graphic
    #[serde(default = "default_clone_class")]
    pub clone_class: String,

    /// Delay between a page trigger and the diagram scan
    #[serde(default = "default_scan_delay_ms")]
    pub scan_delay_ms: u64,

    /// Look for the graphic in adjacent siblings when the container has none
    #[serde(default = "default_true")]
    pub sibling_lookup: bool,

    /// Extract `<svg>` markup left as raw text by the renderer
    #[serde(default = "default_true")]
    pub inline_fallback: bool,

    /// Bind containers whose graphic has not rendered yet
    #[serde(default)]
    pub bind_pending: bool,
}

fn default_diagram_selector() -> String {
    ".mermaid".to_string()
}
fn default_marker_attribute() -> String {
    "data-zoom-enabled".to_string()
}
fn default_overlay_id() -> String {
    "diagram-zoom-overlay".to_string()
}
fn default_active_class() -> String {
    "active".to_string()
}
fn default_backdrop_class() -> String {
    "diagram-zoom-backdrop".to_string()
}
fn default_close_class() -> String {
    "diagram-zoom-close".to_string()
}
fn default_content_class() -> String {
    "diagram-zoom-content".to_string()
}
fn default_clone_class() -> String {
    "diagram-zoom-svg".to_string()
}
fn default_scan_delay_ms() -> u64 {
    500
}
fn default_true() -> bool {
    true
}

impl OverlayConfig {
    /// Scan delay as a [`Duration`].
    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.scan_delay_ms)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            diagram_selector: default_diagram_selector(),
            marker_attribute: default_marker_attribute(),
            overlay_id: default_overlay_id(),
            active_class: default_active_class(),
            backdrop_class: default_backdrop_class(),
            close_class: default_close_class(),
            content_class: default_content_class(),
            clone_class: default_clone_class(),
            scan_delay_ms: default_scan_delay_ms(),
            sibling_lookup: true,
            inline_fallback: true,
            bind_pending: false,
        }
    }
}
