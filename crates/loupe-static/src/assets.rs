//! Overlay stylesheet generation and minification.

use serde::{Deserialize, Serialize};

use loupe_overlay::OverlayConfig;

/// Visual settings for the overlay stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Backdrop colour
    #[serde(default = "default_backdrop")]
    pub backdrop: String,

    /// Stacking order of the overlay
    #[serde(default = "default_z_index")]
    pub z_index: u32,

    /// Largest width of the zoomed graphic
    #[serde(default = "default_max_width")]
    pub max_width: String,

    /// Largest height of the zoomed graphic
    #[serde(default = "default_max_height")]
    pub max_height: String,

    /// Show a zoom-in cursor on bound diagrams
    #[serde(default = "default_true")]
    pub zoom_cursor: bool,
}

fn default_backdrop() -> String {
    "rgba(0, 0, 0, 0.85)".to_string()
}
fn default_z_index() -> u32 {
    9999
}
fn default_max_width() -> String {
    "95vw".to_string()
}
fn default_max_height() -> String {
    "90vh".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            backdrop: default_backdrop(),
            z_index: default_z_index(),
            max_width: default_max_width(),
            max_height: default_max_height(),
            zoom_cursor: true,
        }
    }
}

/// Errors from the asset pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("CSS parse error: {0}")]
    Parse(String),

    #[error("CSS minify error: {0}")]
    Minify(String),
}

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the overlay stylesheet for the given class names and style.
    pub fn overlay_css(overlay: &OverlayConfig, style: &StyleConfig) -> String {
        let mut css = format!(
            r#"/* loupe diagram zoom overlay */

#{id} {{
  position: fixed;
  inset: 0;
  z-index: {z};
  display: none;
  align-items: center;
  justify-content: center;
}}

#{id}.{active} {{
  display: flex;
}}

#{id} .{backdrop} {{
  position: absolute;
  inset: 0;
  background: {backdrop_color};
  cursor: zoom-out;
}}

#{id} .{content} {{
  position: relative;
  max-width: {max_width};
  max-height: {max_height};
  overflow: auto;
  background: var(--background, #fff);
  border-radius: 0.5rem;
  padding: 1rem;
}}

#{id} .{close} {{
  position: absolute;
  top: 1rem;
  right: 1rem;
  z-index: 1;
  width: 2.5rem;
  height: 2.5rem;
  font-size: 1.5rem;
  line-height: 1;
  color: #fff;
  background: transparent;
  border: none;
  cursor: pointer;
}}

#{id} .{close}:focus-visible {{
  outline: 2px solid #fff;
  outline-offset: 2px;
}}

.{clone} {{
  display: block;
  width: 100%;
  height: auto;
  max-height: calc({max_height} - 2rem);
}}
"#,
            id = overlay.overlay_id,
            z = style.z_index,
            active = overlay.active_class,
            backdrop = overlay.backdrop_class,
            backdrop_color = style.backdrop,
            content = overlay.content_class,
            close = overlay.close_class,
            clone = overlay.clone_class,
            max_width = style.max_width,
            max_height = style.max_height,
        );

        if style.zoom_cursor {
            css.push_str(&format!(
                "\n[{}] {{\n  cursor: zoom-in;\n}}\n",
                overlay.marker_attribute
            ));
        }

        css
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, AssetError> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| AssetError::Parse(e.to_string()))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| AssetError::Minify(e.to_string()))?;

        Ok(minified.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stylesheet_uses_configured_names() {
        let overlay = OverlayConfig {
            overlay_id: "zoom".to_string(),
            active_class: "is-open".to_string(),
            ..Default::default()
        };

        let css = AssetPipeline::overlay_css(&overlay, &StyleConfig::default());

        assert!(css.contains("#zoom.is-open {"));
        assert!(css.contains("#zoom .diagram-zoom-backdrop {"));
        assert!(css.contains(".diagram-zoom-svg {"));
        assert!(css.contains("[data-zoom-enabled] {"));
        assert!(css.contains("max-height: 90vh;"));
    }

    #[test]
    fn zoom_cursor_is_optional() {
        let style = StyleConfig {
            zoom_cursor: false,
            ..Default::default()
        };

        let css = AssetPipeline::overlay_css(&OverlayConfig::default(), &style);

        assert!(!css.contains("zoom-in"));
    }

    #[test]
    fn partial_table_uses_defaults() {
        let style: StyleConfig = toml::from_str("z_index = 50\n").unwrap();

        assert_eq!(
            style,
            StyleConfig {
                z_index: 50,
                ..Default::default()
            }
        );
    }

    #[test]
    fn generated_stylesheet_minifies() {
        let css = AssetPipeline::overlay_css(&OverlayConfig::default(), &StyleConfig::default());

        let minified = AssetPipeline::minify_css(&css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".active{display:flex}"));
        assert!(minified.len() < css.len());
    }
}
