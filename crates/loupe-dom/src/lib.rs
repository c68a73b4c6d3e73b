//! In-memory document model for the loupe diagram overlay.
//!
//! This crate provides an arena-backed element tree with the small slice of DOM
//! behavior the overlay relies on: attributes, class lists, inline style
//! properties, CSS selector queries, deep cloning, and markup parsing.

pub mod document;
pub mod markup;
pub mod selector;
pub mod serialize;

pub use document::{Document, DomError, NodeId};
pub use markup::{find_inline_svg, parse_fragment, MarkupError};
pub use selector::{Selector, SelectorError};
pub use serialize::{inner_html, outer_html};
