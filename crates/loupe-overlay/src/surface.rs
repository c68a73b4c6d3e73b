//! The singleton overlay surface.

use loupe_dom::{Document, DomError, NodeId};

use crate::config::OverlayConfig;

/// Handles to the overlay element and its regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySurface {
    /// Element carrying the stable overlay id
    pub root: NodeId,
    /// Full-screen backdrop region
    pub backdrop: NodeId,
    /// Explicit close control
    pub close: NodeId,
    /// Content well holding the vector clone
    pub content: NodeId,
}

impl OverlaySurface {
    /// Build a new overlay and append it to the document body.
    pub fn create(doc: &mut Document, config: &OverlayConfig) -> Result<Self, DomError> {
        let root = doc.create_element("div");
        doc.set_attribute(root, "id", &config.overlay_id);
        doc.set_attribute(root, "role", "dialog");
        doc.set_attribute(root, "aria-modal", "true");
        doc.set_attribute(root, "aria-hidden", "true");

        let surface = Self::complete(doc, root, config)?;
        doc.append_child(doc.body(), root)?;
        Ok(surface)
    }

    /// Take over an overlay element that is already in the document,
    /// creating any region it lacks inside it. The adopted surface starts
    /// inactive.
    pub fn adopt(
        doc: &mut Document,
        root: NodeId,
        config: &OverlayConfig,
    ) -> Result<Self, DomError> {
        let surface = Self::complete(doc, root, config)?;
        surface.hide(doc, config);
        Ok(surface)
    }

    fn complete(doc: &mut Document, root: NodeId, config: &OverlayConfig) -> Result<Self, DomError> {
        let backdrop = match find_class(doc, root, &config.backdrop_class) {
            Some(id) => id,
            None => {
                let id = doc.create_element("div");
                doc.set_attribute(id, "class", &config.backdrop_class);
                doc.append_child(root, id)?;
                id
            }
        };

        let close = match find_class(doc, root, &config.close_class) {
            Some(id) => id,
            None => {
                let id = doc.create_element("button");
                doc.set_attribute(id, "type", "button");
                doc.set_attribute(id, "class", &config.close_class);
                doc.set_attribute(id, "aria-label", "Close diagram");
                let label = doc.create_text("\u{00d7}");
                doc.append_child(id, label)?;
                doc.append_child(root, id)?;
                id
            }
        };

        let content = match find_class(doc, root, &config.content_class) {
            Some(id) => id,
            None => {
                let id = doc.create_element("div");
                doc.set_attribute(id, "class", &config.content_class);
                doc.append_child(root, id)?;
                id
            }
        };

        Ok(Self {
            root,
            backdrop,
            close,
            content,
        })
    }

    /// Put `clone` in the content slot, freeing what was there, and mark
    /// the surface active.
    pub fn show(
        &self,
        doc: &mut Document,
        clone: NodeId,
        config: &OverlayConfig,
    ) -> Result<(), DomError> {
        let previous = doc.children(self.content).to_vec();
        doc.replace_children(self.content, clone)?;
        for node in previous {
            doc.discard(node);
        }
        doc.add_class(self.root, &config.active_class);
        doc.set_attribute(self.root, "aria-hidden", "false");
        Ok(())
    }

    /// Mark the surface inactive. The last clone stays in the slot until the
    /// next open replaces it.
    pub fn hide(&self, doc: &mut Document, config: &OverlayConfig) {
        doc.remove_class(self.root, &config.active_class);
        doc.set_attribute(self.root, "aria-hidden", "true");
    }

    /// Whether the surface currently carries the active state class.
    pub fn is_active(&self, doc: &Document, config: &OverlayConfig) -> bool {
        doc.has_class(self.root, &config.active_class)
    }

    /// The clone currently in the content slot.
    pub fn clone_node(&self, doc: &Document) -> Option<NodeId> {
        doc.element_children(self.content).next()
    }

    /// Whether a click on `target` should dismiss the overlay.
    ///
    /// Only the surface itself, the backdrop and the close control (including
    /// anything nested in the button) qualify; the content well does not.
    pub fn is_dismiss_target(&self, doc: &Document, target: NodeId) -> bool {
        target == self.root || target == self.backdrop || self.is_close_control(doc, target)
    }

    /// Whether `target` is the close button or nested inside it.
    pub fn is_close_control(&self, doc: &Document, target: NodeId) -> bool {
        target == self.close || doc.contains(self.close, target)
    }

    /// Whether `target` lies inside the surface.
    pub fn contains(&self, doc: &Document, target: NodeId) -> bool {
        target == self.root || doc.contains(self.root, target)
    }
}

fn find_class(doc: &Document, root: NodeId, class: &str) -> Option<NodeId> {
    doc.descendants(root)
        .into_iter()
        .find(|n| doc.has_class(*n, class))
}
