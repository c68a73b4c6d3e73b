//! Arena-backed document tree.

use std::collections::HashMap;

use crate::selector::Selector;

/// Identity of a node within a [`Document`].
///
/// Ids are never reused, so a node removed from the tree keeps its identity
/// and can never be confused with a node created later, even after its slot
/// was freed with [`Document::discard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index, mostly useful for diagnostics.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// Errors raised by tree mutations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    #[error("Cannot insert {child} into {parent}: would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),
}

/// An in-memory document.
///
/// The document always has an `<html>` root with a `<body>` child.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<usize, Node>,
    next_id: usize,
    root: NodeId,
    body: NodeId,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: HashMap::new(),
            next_id: 0,
            root: NodeId(0),
            body: NodeId(0),
        };

        let root = doc.create_element("html");
        let body = doc.create_element("body");
        doc.node_mut(body).parent = Some(root);
        doc.node_mut(root).children.push(body);
        doc.root = root;
        doc.body = body;
        doc
    }

    /// The `<html>` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id.0,
            Node {
                data,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[&id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(&id.0) {
            Some(node) => node,
            None => panic!("node {} was discarded", id),
        }
    }

    /// Number of live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `id` still refers to a live node.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id.0)
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.is_element(parent) {
            return Err(DomError::NotAContainer(parent));
        }
        if child == parent || self.contains(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }

        self.remove(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        Ok(())
    }

    /// Detach a node from its parent. Detached subtrees stay addressable.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
    }

    /// Detach a subtree and free it. The ids stay retired.
    ///
    /// The root and `<body>` are never discarded; discarding an unknown id is
    /// a no-op.
    pub fn discard(&mut self, id: NodeId) {
        if id == self.root || id == self.body || !self.is_live(id) {
            return;
        }
        self.remove(id);

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next.0) {
                stack.extend(node.children);
            }
        }
    }

    /// Replace every child of `parent` with `child`.
    pub fn replace_children(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.clear_children(parent);
        self.append_child(parent, child)
    }

    /// Detach every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.node_mut(parent).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
    }

    /// Children of a node, in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Element children of a node.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.is_element(*c))
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    /// Next element sibling.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .copied()
            .skip_while(|c| *c != id)
            .skip(1)
            .find(|c| self.is_element(*c))
    }

    /// Previous element sibling.
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .copied()
            .take_while(|c| *c != id)
            .filter(|c| self.is_element(*c))
            .last()
    }

    /// All descendants of a node in pre-order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }

        out
    }

    /// Whether `node` is a strict descendant of `ancestor`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether a node is attached to the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == self.root || self.contains(self.root, id)
    }

    /// Whether a node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).data, NodeData::Element { .. })
    }

    /// Tag name of an element, as created.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    /// All attributes of an element in insertion order.
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match &self.node(id).data {
            NodeData::Element { attrs, .. } => attrs,
            NodeData::Text(_) => &[],
        }
    }

    /// Read an attribute.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, keeping its position when it already exists.
    /// Text nodes are left untouched.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            match attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(id).data {
            let pos = attrs.iter().position(|(k, _)| k == name)?;
            return Some(attrs.remove(pos).1);
        }
        None
    }

    /// Whether the element's class list contains `class`.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Add a class to the element's class list.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let value = match self.attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attribute(id, "class", &value);
    }

    /// Remove a class from the element's class list.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(existing) = self.attribute(id, "class") else {
            return;
        };
        let value = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        if value.is_empty() {
            self.remove_attribute(id, "class");
        } else {
            self.set_attribute(id, "class", &value);
        }
    }

    /// Read an inline style property (e.g. `overflow`).
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(id, "style")?;
        parse_style(style)
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    /// Set an inline style property.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) {
        let mut decls = self.attribute(id, "style").map(parse_style).unwrap_or_default();
        match decls.iter_mut().find(|(k, _)| k == property) {
            Some((_, v)) => *v = value.to_string(),
            None => decls.push((property.to_string(), value.to_string())),
        }
        self.write_style(id, &decls);
    }

    /// Remove an inline style property.
    pub fn remove_style_property(&mut self, id: NodeId, property: &str) {
        let Some(style) = self.attribute(id, "style") else {
            return;
        };
        let mut decls = parse_style(style);
        decls.retain(|(k, _)| k != property);
        self.write_style(id, &decls);
    }

    fn write_style(&mut self, id: NodeId, decls: &[(String, String)]) {
        if decls.is_empty() {
            self.remove_attribute(id, "style");
            return;
        }
        let value = decls
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        self.set_attribute(id, "style", &value);
    }

    /// Concatenated text of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeData::Text(t) = &self.node(id).data {
            out.push_str(t);
        }
        for n in self.descendants(id) {
            if let NodeData::Text(t) = &self.node(n).data {
                out.push_str(t);
            }
        }
        out
    }

    /// Deep-copy a subtree. The copy is detached and has fresh ids.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let data = self.node(id).data.clone();
        let copy = self.push(data);
        let children = self.children(id).to_vec();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.node_mut(child_copy).parent = Some(copy);
            self.node_mut(copy).children.push(child_copy);
        }
        copy
    }

    /// First connected element with the given `id` attribute.
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.attribute(*n, "id") == Some(value))
    }

    /// Every connected element with the given `id` attribute.
    pub fn elements_by_id(&self, value: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|n| self.attribute(*n, "id") == Some(value))
            .collect()
    }

    /// All connected elements matching a selector, in document order.
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.query_selector_all_in(self.root, selector)
    }

    /// All descendants of `scope` matching a selector, in document order.
    pub fn query_selector_all_in(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| selector.matches(self, *n))
            .collect()
    }

    /// First connected element matching a selector.
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| selector.matches(self, *n))
    }

    pub(crate) fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).data {
            NodeData::Text(t) => Some(t),
            NodeData::Element { .. } => None,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim().to_ascii_lowercase();
            let v = v.trim();
            if k.is_empty() {
                None
            } else {
                Some((k, v.to_string()))
            }
        })
        .collect()
}
