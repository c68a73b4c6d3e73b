//! Markup parsing into the document tree.
//!
//! Fragments must be well-formed XML (XHTML or SVG). Rendering libraries emit
//! SVG that satisfies this, and page fixtures are written the same way.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Document, DomError, NodeId};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Errors that can occur when parsing markup.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("Malformed markup: {0}")]
    Malformed(#[from] roxmltree::Error),

    #[error("Failed to insert parsed node: {0}")]
    Insert(#[from] DomError),
}

/// Parse `markup` and append the resulting nodes as children of `parent`.
///
/// Returns the ids of the top-level nodes that were appended. Comments and
/// processing instructions are dropped; whitespace-only text is kept.
pub fn parse_fragment(
    doc: &mut Document,
    parent: NodeId,
    markup: &str,
) -> Result<Vec<NodeId>, MarkupError> {
    let wrapped = format!("<loupe-fragment>{}</loupe-fragment>", markup);
    let parsed = roxmltree::Document::parse(&wrapped)?;

    let mut appended = Vec::new();
    for child in parsed.root_element().children() {
        if let Some(id) = build_node(doc, child, None) {
            doc.append_child(parent, id)?;
            appended.push(id);
        }
    }

    Ok(appended)
}

fn build_node(
    doc: &mut Document,
    source: roxmltree::Node<'_, '_>,
    parent_ns: Option<&str>,
) -> Option<NodeId> {
    if source.is_text() {
        return source.text().map(|t| doc.create_text(t));
    }
    if !source.is_element() {
        return None;
    }

    let name = source.tag_name();
    let id = doc.create_element(name.name());

    // Re-declare the SVG namespace where an SVG subtree starts, so serialized
    // clones stay valid standalone documents.
    if name.namespace() == Some(SVG_NS) && parent_ns != Some(SVG_NS) {
        doc.set_attribute(id, "xmlns", SVG_NS);
    }

    for attr in source.attributes() {
        let key = match attr.namespace() {
            Some(XLINK_NS) => format!("xlink:{}", attr.name()),
            Some(XML_NS) => format!("xml:{}", attr.name()),
            _ => attr.name().to_string(),
        };
        doc.set_attribute(id, &key, attr.value());
    }

    for child in source.children() {
        if let Some(child_id) = build_node(doc, child, name.namespace()) {
            // Freshly created nodes cannot form a cycle.
            let _ = doc.append_child(id, child_id);
        }
    }

    Some(id)
}

/// Find the first `<svg ...>...</svg>` span in raw text.
pub fn find_inline_svg(text: &str) -> Option<&str> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<svg\b.*?</svg\s*>").expect("Invalid inline svg regex")
    });

    RE.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::outer_html;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_elements_and_text() {
        let mut doc = Document::new();
        let body = doc.body();

        let nodes = parse_fragment(
            &mut doc,
            body,
            r#"<div class="mermaid" id="a"><span>graph</span> TD</div>"#,
        )
        .unwrap();

        assert_eq!(nodes.len(), 1);
        let div = nodes[0];
        assert_eq!(doc.tag(div), Some("div"));
        assert!(doc.has_class(div, "mermaid"));
        assert_eq!(doc.text_content(div), "graph TD");
        assert!(doc.is_connected(div));
    }

    #[test]
    fn keeps_svg_namespace_and_xlink_attributes() {
        let mut doc = Document::new();
        let body = doc.body();

        let nodes = parse_fragment(
            &mut doc,
            body,
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 10 10"><use xlink:href="#dot"/></svg>"##,
        )
        .unwrap();

        let svg = nodes[0];
        assert_eq!(doc.attribute(svg, "xmlns"), Some(SVG_NS));
        let use_el = doc.children(svg)[0];
        assert_eq!(doc.attribute(use_el, "xlink:href"), Some("#dot"));
        assert_eq!(doc.attribute(use_el, "xmlns"), None);
    }

    #[test]
    fn preserves_camel_case_svg_tags() {
        let mut doc = Document::new();
        let body = doc.body();

        let nodes = parse_fragment(
            &mut doc,
            body,
            r#"<svg xmlns="http://www.w3.org/2000/svg"><foreignObject width="10"/></svg>"#,
        )
        .unwrap();

        assert_eq!(
            outer_html(&doc, nodes[0]),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><foreignObject width="10"></foreignObject></svg>"#
        );
    }

    #[test]
    fn rejects_malformed_markup() {
        let mut doc = Document::new();
        let body = doc.body();

        let result = parse_fragment(&mut doc, body, "<svg><g></svg>");

        assert!(matches!(result, Err(MarkupError::Malformed(_))));
        assert!(doc.children(body).is_empty());
    }

    #[test]
    fn finds_inline_svg_in_text() {
        let text = "prefix <SVG viewBox=\"0 0 1 1\">\n<g/></svg> suffix <svg></svg>";

        assert_eq!(
            find_inline_svg(text),
            Some("<SVG viewBox=\"0 0 1 1\">\n<g/></svg>")
        );
        assert_eq!(find_inline_svg("graph TD; A-->B"), None);
    }
}
