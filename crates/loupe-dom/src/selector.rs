//! A small CSS selector subset.
//!
//! Supported: type selectors, `*`, `.class`, `#id`, `[attr]`, `[attr=value]`,
//! compounds of those, the descendant combinator and comma-separated lists.

use std::str::FromStr;

use crate::document::{Document, NodeId};

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

/// Compounds joined by descendant combinators, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

/// Errors that can occur when parsing a selector.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character '{ch}' at position {pos} in selector: {selector}")]
    Unexpected {
        selector: String,
        ch: char,
        pos: usize,
    },

    #[error("Unsupported combinator '{0}' (only descendant selectors are supported)")]
    UnsupportedCombinator(char),

    #[error("Unterminated attribute selector: {0}")]
    UnterminatedAttribute(String),
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let alternatives = input
            .split(',')
            .map(|part| parse_complex(part.trim(), input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { alternatives })
    }

    /// Whether the node matches any alternative of this selector.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        doc.is_element(node) && self.alternatives.iter().any(|c| c.matches(doc, node))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(doc, node) {
            return false;
        }

        // Greedy right-to-left walk is exact for descendant-only chains.
        let mut ancestors = doc.ancestors(node);
        'outer: for compound in rest.iter().rev() {
            for ancestor in ancestors.by_ref() {
                if compound.matches(doc, ancestor) {
                    continue 'outer;
                }
            }
            return false;
        }
        true
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };

        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if doc.attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.iter().all(|c| doc.has_class(node, c)) {
            return false;
        }

        self.attrs.iter().all(|a| match (&a.value, doc.attribute(node, &a.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        })
    }
}

fn parse_complex(part: &str, full: &str) -> Result<Complex, SelectorError> {
    if part.is_empty() {
        return Err(SelectorError::Empty);
    }

    let mut compounds = Vec::new();
    for word in split_compounds(part, full)? {
        compounds.push(parse_compound(&word, full)?);
    }

    Ok(Complex { compounds })
}

/// Split on whitespace outside attribute brackets.
fn split_compounds(part: &str, full: &str) -> Result<Vec<String>, SelectorError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;

    for ch in part.chars() {
        match ch {
            '>' | '+' | '~' if !in_brackets => {
                return Err(SelectorError::UnsupportedCombinator(ch));
            }
            '[' => {
                in_brackets = true;
                current.push(ch);
            }
            ']' => {
                in_brackets = false;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_brackets => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if in_brackets {
        return Err(SelectorError::UnterminatedAttribute(full.to_string()));
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(words)
}

fn parse_compound(word: &str, full: &str) -> Result<Compound, SelectorError> {
    let mut compound = Compound::default();
    let chars: Vec<char> = word.chars().collect();
    let mut pos = 0;

    let ident = |start: usize| -> (String, usize) {
        let mut end = start;
        while end < chars.len() && is_ident_char(chars[end]) {
            end += 1;
        }
        (chars[start..end].iter().collect(), end)
    };

    let unexpected = |pos: usize| SelectorError::Unexpected {
        selector: full.to_string(),
        ch: chars.get(pos).copied().unwrap_or(' '),
        pos,
    };

    if chars.first() == Some(&'*') {
        pos = 1;
    } else if chars.first().copied().is_some_and(is_ident_char) {
        let (tag, end) = ident(0);
        compound.tag = Some(tag);
        pos = end;
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                let (class, end) = ident(pos + 1);
                if class.is_empty() {
                    return Err(unexpected(pos));
                }
                compound.classes.push(class);
                pos = end;
            }
            '#' => {
                let (id, end) = ident(pos + 1);
                if id.is_empty() {
                    return Err(unexpected(pos));
                }
                compound.id = Some(id);
                pos = end;
            }
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| p + pos)
                    .ok_or_else(|| SelectorError::UnterminatedAttribute(full.to_string()))?;
                let inner: String = chars[pos + 1..close].iter().collect();
                compound.attrs.push(parse_attr(&inner));
                pos = close + 1;
            }
            _ => return Err(unexpected(pos)),
        }
    }

    Ok(compound)
}

fn parse_attr(inner: &str) -> AttrMatch {
    match inner.split_once('=') {
        Some((name, value)) => AttrMatch {
            name: name.trim().to_string(),
            value: Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_string()),
        },
        None => AttrMatch {
            name: inner.trim().to_string(),
            value: None,
        },
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let main = doc.create_element("main");
        let diagram = doc.create_element("div");
        doc.set_attribute(diagram, "class", "mermaid diagram");
        doc.set_attribute(diagram, "id", "flow");
        doc.set_attribute(diagram, "data-zoom-enabled", "true");
        let svg = doc.create_element("svg");
        doc.append_child(doc.body(), main).unwrap();
        doc.append_child(main, diagram).unwrap();
        doc.append_child(diagram, svg).unwrap();
        (doc, main, diagram, svg)
    }

    #[test]
    fn matches_class_and_type() {
        let (doc, _, diagram, svg) = sample();

        let by_class = Selector::parse(".mermaid").unwrap();
        assert!(by_class.matches(&doc, diagram));
        assert!(!by_class.matches(&doc, svg));

        let compound = Selector::parse("div.mermaid.diagram#flow").unwrap();
        assert!(compound.matches(&doc, diagram));

        let by_tag = Selector::parse("SVG").unwrap();
        assert!(by_tag.matches(&doc, svg));
    }

    #[test]
    fn matches_attributes() {
        let (doc, _, diagram, _) = sample();

        assert!(Selector::parse("[data-zoom-enabled]")
            .unwrap()
            .matches(&doc, diagram));
        assert!(Selector::parse("[data-zoom-enabled=\"true\"]")
            .unwrap()
            .matches(&doc, diagram));
        assert!(!Selector::parse("[data-zoom-enabled=false]")
            .unwrap()
            .matches(&doc, diagram));
    }

    #[test]
    fn matches_descendant_chains() {
        let (doc, _, _, svg) = sample();

        assert!(Selector::parse("main .mermaid svg").unwrap().matches(&doc, svg));
        assert!(Selector::parse("body svg").unwrap().matches(&doc, svg));
        assert!(!Selector::parse("aside svg").unwrap().matches(&doc, svg));
    }

    #[test]
    fn selector_lists_match_any() {
        let (doc, main, diagram, _) = sample();
        let list = Selector::parse(".mermaid, main").unwrap();

        assert_eq!(doc.query_selector_all(&list), vec![main, diagram]);
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert_eq!(
            Selector::parse("main > svg"),
            Err(SelectorError::UnsupportedCombinator('>'))
        );
        assert_eq!(Selector::parse("a, "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("div:hover"),
            Err(SelectorError::Unexpected { ch: ':', .. })
        ));
        assert!(matches!(
            Selector::parse("[data-x"),
            Err(SelectorError::UnterminatedAttribute(_))
        ));
    }
}
