//! The diagram zoom overlay state machine.

use loupe_dom::{parse_fragment, Document, DomError, MarkupError, NodeId, Selector, SelectorError};

use crate::config::OverlayConfig;
use crate::locate::{locate_vector, VectorSource};
use crate::normalize::normalize_clone;
use crate::registry::BindingRegistry;
use crate::scroll::ScrollLock;
use crate::surface::OverlaySurface;

/// Overlay lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayState {
    #[default]
    Closed,
    Open,
}

/// Why the overlay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Backdrop,
    CloseButton,
    Escape,
    Reset,
}

/// Something observable the overlay did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A click handler was attached to a diagram
    Bound { diagram: NodeId },
    /// The overlay opened with a clone of the diagram's graphic
    Opened {
        diagram: NodeId,
        clone: NodeId,
        source: &'static str,
    },
    /// The overlay closed
    Closed { reason: CloseReason },
    /// A diagram click did nothing
    Ignored { diagram: NodeId, reason: String },
}

/// Result of a single scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Diagram elements present in the document
    pub found: usize,
    /// Diagram elements bound by this scan
    pub newly_bound: usize,
    /// Containers skipped because their graphic has not rendered yet
    pub pending: usize,
}

/// Errors the overlay absorbs. None of them reach the page.
#[derive(Debug, thiserror::Error)]
pub enum ZoomError {
    #[error("Invalid diagram selector: {0}")]
    InvalidSelector(#[from] SelectorError),

    #[error("Diagram {0} has no click handler")]
    NotBound(NodeId),

    #[error("No vector graphic found for diagram {0}")]
    VectorNotFound(NodeId),

    #[error("Inline diagram markup could not be parsed: {0}")]
    InlineMarkup(#[from] MarkupError),

    #[error("Overlay surface update failed: {0}")]
    Dom(#[from] DomError),
}

/// The diagram zoom overlay.
///
/// Owns the binding registry and the overlay surface. The surface is created
/// on first open and referenced from here afterwards, so there is never any
/// question about which overlay element is in use.
#[derive(Debug)]
pub struct ZoomOverlay {
    config: OverlayConfig,
    selector: Selector,
    registry: BindingRegistry,
    surface: Option<OverlaySurface>,
    scroll: ScrollLock,
    state: OverlayState,
    showing: Option<NodeId>,
    notices: Vec<Notice>,
}

impl ZoomOverlay {
    /// Create an overlay. Fails only if the diagram selector is invalid.
    pub fn new(config: OverlayConfig) -> Result<Self, ZoomError> {
        let selector = Selector::parse(&config.diagram_selector)?;
        Ok(Self {
            config,
            selector,
            registry: BindingRegistry::new(),
            surface: None,
            scroll: ScrollLock::default(),
            state: OverlayState::Closed,
            showing: None,
            notices: Vec::new(),
        })
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Diagram whose clone is currently displayed.
    pub fn showing(&self) -> Option<NodeId> {
        match self.state {
            OverlayState::Open => self.showing,
            OverlayState::Closed => None,
        }
    }

    pub fn surface(&self) -> Option<&OverlaySurface> {
        self.surface.as_ref()
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    pub fn is_bound(&self, diagram: NodeId) -> bool {
        self.registry.is_bound(diagram)
    }

    /// Take the notices recorded since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Bind every rendered diagram in the document that is not bound yet.
    ///
    /// Containers whose graphic has not rendered are left unbound (unless
    /// `bind_pending` is set) and are picked up by the scan after the next
    /// trigger.
    pub fn scan(&mut self, doc: &mut Document) -> ScanReport {
        let pruned = self.registry.prune(doc);
        if pruned > 0 {
            tracing::trace!("Dropped {} bindings for detached diagrams", pruned);
        }

        let diagrams = doc.query_selector_all(&self.selector);
        let mut report = ScanReport {
            found: diagrams.len(),
            ..Default::default()
        };

        for diagram in diagrams {
            if self.registry.is_bound(diagram) {
                continue;
            }
            if !self.config.bind_pending && locate_vector(doc, diagram, &self.config).is_none() {
                report.pending += 1;
                continue;
            }

            self.registry.bind(diagram);
            doc.set_attribute(diagram, &self.config.marker_attribute, "true");
            self.notices.push(Notice::Bound { diagram });
            report.newly_bound += 1;
        }

        tracing::debug!(
            "Scanned {} diagrams, bound {} new, {} pending",
            report.found,
            report.newly_bound,
            report.pending
        );
        report
    }

    /// React to a click whose innermost target is `target`.
    ///
    /// Mirrors event bubbling: the nearest bound diagram at or above the
    /// target gets the click first, then the overlay's own handler.
    pub fn handle_click(&mut self, doc: &mut Document, target: NodeId) {
        let diagram = std::iter::once(target)
            .chain(doc.ancestors(target))
            .find(|n| self.registry.is_bound(*n));

        if let Some(diagram) = diagram {
            if let Err(e) = self.open(doc, diagram) {
                tracing::debug!("Zoom ignored: {}", e);
                self.notices.push(Notice::Ignored {
                    diagram,
                    reason: e.to_string(),
                });
            }
        }

        let Some(surface) = self.surface else {
            return;
        };
        if self.state != OverlayState::Open || !surface.contains(doc, target) {
            return;
        }
        if surface.is_dismiss_target(doc, target) {
            let reason = if surface.is_close_control(doc, target) {
                CloseReason::CloseButton
            } else {
                CloseReason::Backdrop
            };
            self.close(doc, reason);
        }
    }

    /// React to a key press. Only Escape while open does anything.
    pub fn handle_key(&mut self, doc: &mut Document, key: &str) -> bool {
        if key != "Escape" || self.state != OverlayState::Open {
            return false;
        }
        self.close(doc, CloseReason::Escape)
    }

    /// Open the overlay with a clone of `diagram`'s vector graphic.
    pub fn open(&mut self, doc: &mut Document, diagram: NodeId) -> Result<(), ZoomError> {
        if !self.registry.is_bound(diagram) {
            return Err(ZoomError::NotBound(diagram));
        }

        let source = locate_vector(doc, diagram, &self.config)
            .ok_or(ZoomError::VectorNotFound(diagram))?;

        let clone = match &source {
            VectorSource::Live(svg) | VectorSource::Sibling(svg) => doc.deep_clone(*svg),
            VectorSource::Inline(markup) => {
                clone_inline(doc, markup)?.ok_or(ZoomError::VectorNotFound(diagram))?
            }
        };

        normalize_clone(doc, clone, &self.config.clone_class);
        let shown = self
            .ensure_surface(doc)
            .and_then(|surface| surface.show(doc, clone, &self.config).map_err(ZoomError::from));
        if let Err(e) = shown {
            doc.discard(clone);
            return Err(e);
        }

        self.scroll.lock(doc);
        self.state = OverlayState::Open;
        self.showing = Some(diagram);
        self.notices.push(Notice::Opened {
            diagram,
            clone,
            source: source.kind(),
        });

        tracing::debug!("Opened zoom overlay for diagram {} ({})", diagram, source.kind());
        Ok(())
    }

    /// Close the overlay. Returns `false` if it was not open.
    pub fn close(&mut self, doc: &mut Document, reason: CloseReason) -> bool {
        if self.state != OverlayState::Open {
            return false;
        }

        if let Some(surface) = self.surface {
            surface.hide(doc, &self.config);
        }
        self.scroll.release(doc);
        self.state = OverlayState::Closed;
        self.notices.push(Notice::Closed { reason });

        tracing::debug!("Closed zoom overlay ({:?})", reason);
        true
    }

    /// Close, detach the surface and forget every binding.
    pub fn reset(&mut self, doc: &mut Document) {
        self.close(doc, CloseReason::Reset);
        if let Some(surface) = self.surface.take() {
            doc.discard(surface.root);
        }
        self.registry.clear();
        self.showing = None;
    }

    /// The overlay surface, created on first use.
    ///
    /// A surface that is still connected is reused. An element already
    /// carrying the overlay id is adopted instead of creating a second one.
    fn ensure_surface(&mut self, doc: &mut Document) -> Result<OverlaySurface, ZoomError> {
        if let Some(surface) = self.surface {
            if doc.is_live(surface.root) && doc.is_connected(surface.root) {
                return Ok(surface);
            }
            tracing::debug!("Overlay surface was detached, looking for a replacement");
        }

        let surface = match doc.element_by_id(&self.config.overlay_id) {
            Some(existing) => {
                tracing::debug!("Adopting existing overlay element {}", existing);
                OverlaySurface::adopt(doc, existing, &self.config)?
            }
            None => OverlaySurface::create(doc, &self.config)?,
        };

        self.surface = Some(surface);
        Ok(surface)
    }
}

/// Parse inline markup into a detached `<svg>` node.
///
/// Yields `None` when the markup parses but holds no `<svg>` element. The
/// temporary holder and anything else parsed from the markup are freed.
fn clone_inline(doc: &mut Document, markup: &str) -> Result<Option<NodeId>, MarkupError> {
    let holder = doc.create_element("div");
    let nodes = match parse_fragment(doc, holder, markup) {
        Ok(nodes) => nodes,
        Err(e) => {
            doc.discard(holder);
            return Err(e);
        }
    };

    let svg = nodes
        .into_iter()
        .find(|n| doc.tag(*n).is_some_and(|t| t.eq_ignore_ascii_case("svg")));
    if let Some(svg) = svg {
        doc.remove(svg);
    }
    doc.discard(holder);
    Ok(svg)
}
