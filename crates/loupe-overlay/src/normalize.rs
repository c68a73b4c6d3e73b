//! Sizing normalization for cloned vector graphics.

use loupe_dom::{Document, NodeId};

const SIZING_ATTRIBUTES: &[&str] = &["width", "height", "style"];

/// Strip fixed sizing from a cloned graphic so the overlay stylesheet decides
/// its displayed size.
///
/// A `viewBox` is derived from numeric `width`/`height` when the graphic has
/// none, otherwise removing the dimensions would lose its aspect ratio.
pub fn normalize_clone(doc: &mut Document, svg: NodeId, clone_class: &str) {
    if doc.attribute(svg, "viewBox").is_none() {
        let width = doc.attribute(svg, "width").and_then(parse_length);
        let height = doc.attribute(svg, "height").and_then(parse_length);
        if let (Some(w), Some(h)) = (width, height) {
            doc.set_attribute(svg, "viewBox", &format!("0 0 {} {}", w, h));
        }
    }

    for attr in SIZING_ATTRIBUTES {
        doc.remove_attribute(svg, attr);
    }

    doc.add_class(svg, clone_class);
}

/// Whether a graphic still carries fixed sizing.
pub fn has_fixed_sizing(doc: &Document, svg: NodeId) -> bool {
    SIZING_ATTRIBUTES
        .iter()
        .any(|attr| doc.attribute(svg, attr).is_some())
}

/// Parse an absolute SVG length such as `120`, `120.5` or `120px`.
fn parse_length(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number.parse::<f64>().ok().filter(|n| *n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loupe_dom::parse_fragment;
    use pretty_assertions::assert_eq;

    fn svg(markup: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let nodes = parse_fragment(&mut doc, body, markup).unwrap();
        (doc, nodes[0])
    }

    #[test]
    fn strips_sizing_and_keeps_view_box() {
        let (mut doc, svg) = svg(
            r#"<svg width="100%" height="420" style="max-width: 640px;" viewBox="0 0 640 420"/>"#,
        );

        normalize_clone(&mut doc, svg, "diagram-zoom-svg");

        assert!(!has_fixed_sizing(&doc, svg));
        assert_eq!(doc.attribute(svg, "viewBox"), Some("0 0 640 420"));
        assert!(doc.has_class(svg, "diagram-zoom-svg"));
    }

    #[test]
    fn derives_view_box_from_dimensions() {
        let (mut doc, svg) = svg(r#"<svg width="300px" height="150"/>"#);

        normalize_clone(&mut doc, svg, "zoomed");

        assert_eq!(doc.attribute(svg, "viewBox"), Some("0 0 300 150"));
        assert!(!has_fixed_sizing(&doc, svg));
    }

    #[test]
    fn relative_dimensions_do_not_produce_view_box() {
        let (mut doc, svg) = svg(r#"<svg width="100%" height="auto"/>"#);

        normalize_clone(&mut doc, svg, "zoomed");

        assert_eq!(doc.attribute(svg, "viewBox"), None);
    }
}
