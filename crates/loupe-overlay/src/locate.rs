//! Locating the vector graphic that belongs to a diagram.

use loupe_dom::{find_inline_svg, Document, NodeId};

use crate::config::OverlayConfig;

/// Where a diagram's vector graphic was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorSource {
    /// Live `<svg>` node inside the diagram container
    Live(NodeId),
    /// Live `<svg>` node rendered right after the container
    Sibling(NodeId),
    /// Raw `<svg>...</svg>` markup left as text in the container
    Inline(String),
}

impl VectorSource {
    /// Short label for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Live(_) => "live",
            Self::Sibling(_) => "sibling",
            Self::Inline(_) => "inline",
        }
    }
}

/// Find the vector graphic for `diagram`.
///
/// Live nodes always win; the inline markup path is only consulted when no
/// live `<svg>` exists.
pub fn locate_vector(doc: &Document, diagram: NodeId, config: &OverlayConfig) -> Option<VectorSource> {
    if let Some(svg) = doc.descendants(diagram).into_iter().find(|n| is_svg(doc, *n)) {
        return Some(VectorSource::Live(svg));
    }

    if config.sibling_lookup {
        // A preceding svg belongs to the container before it
        if let Some(svg) = doc.next_element_sibling(diagram).filter(|n| is_svg(doc, *n)) {
            return Some(VectorSource::Sibling(svg));
        }
    }

    if config.inline_fallback {
        let text = doc.text_content(diagram);
        if let Some(markup) = find_inline_svg(&text) {
            return Some(VectorSource::Inline(markup.to_string()));
        }
    }

    None
}

fn is_svg(doc: &Document, id: NodeId) -> bool {
    doc.tag(id).is_some_and(|t| t.eq_ignore_ascii_case("svg"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loupe_dom::parse_fragment;
    use pretty_assertions::assert_eq;

    fn page(markup: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        parse_fragment(&mut doc, body, markup).unwrap();
        let diagram = doc.element_by_id("d").unwrap();
        (doc, diagram)
    }

    #[test]
    fn finds_nested_svg() {
        let (doc, diagram) = page(r#"<div id="d" class="mermaid"><div><svg id="g"/></div></div>"#);

        let found = locate_vector(&doc, diagram, &OverlayConfig::default());

        assert_eq!(found, Some(VectorSource::Live(doc.element_by_id("g").unwrap())));
    }

    #[test]
    fn falls_back_to_adjacent_sibling() {
        let (doc, diagram) =
            page(r#"<div id="d" class="mermaid">graph TD</div><p>caption</p><svg id="g"/>"#);
        // the <p> sits between, so the svg is not adjacent
        assert_eq!(locate_vector(&doc, diagram, &OverlayConfig::default()), None);

        let (doc, diagram) = page(r#"<div id="d" class="mermaid">graph TD</div><svg id="g"/>"#);
        let found = locate_vector(&doc, diagram, &OverlayConfig::default());
        assert_eq!(found, Some(VectorSource::Sibling(doc.element_by_id("g").unwrap())));

        let config = OverlayConfig {
            sibling_lookup: false,
            ..Default::default()
        };
        assert_eq!(locate_vector(&doc, diagram, &config), None);
    }

    #[test]
    fn preceding_svg_is_not_claimed() {
        let (doc, diagram) = page(concat!(
            r#"<div id="a" class="mermaid"/><svg id="sa"/>"#,
            r#"<div id="d" class="mermaid">graph TD</div>"#,
        ));

        assert_eq!(locate_vector(&doc, diagram, &OverlayConfig::default()), None);

        let a = doc.element_by_id("a").unwrap();
        let found = locate_vector(&doc, a, &OverlayConfig::default());
        assert_eq!(found, Some(VectorSource::Sibling(doc.element_by_id("sa").unwrap())));
    }

    #[test]
    fn extracts_inline_markup_last() {
        let (doc, diagram) = page(
            r#"<div id="d" class="mermaid">&lt;svg viewBox="0 0 4 4"&gt;&lt;rect/&gt;&lt;/svg&gt;</div>"#,
        );

        let found = locate_vector(&doc, diagram, &OverlayConfig::default());

        assert_eq!(
            found,
            Some(VectorSource::Inline(
                r#"<svg viewBox="0 0 4 4"><rect/></svg>"#.to_string()
            ))
        );
    }

    #[test]
    fn pending_diagram_has_no_vector() {
        let (doc, diagram) = page(r#"<div id="d" class="mermaid">graph TD; A--&gt;B</div>"#);

        assert_eq!(locate_vector(&doc, diagram, &OverlayConfig::default()), None);
    }
}
