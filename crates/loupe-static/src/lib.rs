//! Stylesheet generation and HTML snapshots for the loupe diagram overlay.
//!
//! The overlay only toggles classes and attributes; everything visual comes
//! from the stylesheet built here.

pub mod assets;
pub mod templates;

pub use assets::{AssetError, AssetPipeline, StyleConfig};
pub use templates::{Snapshot, TemplateEngine};
