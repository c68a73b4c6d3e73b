//! Page scroll suppression while the overlay is open.

use loupe_dom::Document;

/// Suppresses body scrolling and restores whatever was set before.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrollLock {
    /// `Some` while locked; holds the body's previous inline `overflow`.
    saved: Option<Option<String>>,
}

impl ScrollLock {
    /// Suppress scrolling. Locking twice keeps the first saved value.
    pub fn lock(&mut self, doc: &mut Document) {
        if self.saved.is_some() {
            return;
        }
        let body = doc.body();
        self.saved = Some(doc.style_property(body, "overflow"));
        doc.set_style_property(body, "overflow", "hidden");
    }

    /// Restore the overflow value saved by [`ScrollLock::lock`].
    pub fn release(&mut self, doc: &mut Document) {
        let Some(previous) = self.saved.take() else {
            return;
        };
        let body = doc.body();
        match previous {
            Some(value) => doc.set_style_property(body, "overflow", &value),
            None => doc.remove_style_property(body, "overflow"),
        }
    }

    /// Whether scrolling is currently suppressed.
    pub fn is_locked(&self) -> bool {
        self.saved.is_some()
    }
}

/// Whether the document body currently has scrolling suppressed.
pub fn scroll_suppressed(doc: &Document) -> bool {
    doc.style_property(doc.body(), "overflow").as_deref() == Some("hidden")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_absent_overflow() {
        let mut doc = Document::new();
        let mut lock = ScrollLock::default();

        lock.lock(&mut doc);
        assert!(scroll_suppressed(&doc));

        lock.release(&mut doc);
        assert!(!scroll_suppressed(&doc));
        assert_eq!(doc.attribute(doc.body(), "style"), None);
    }

    #[test]
    fn restores_previous_overflow_after_double_lock() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_style_property(body, "overflow", "auto");
        let mut lock = ScrollLock::default();

        lock.lock(&mut doc);
        lock.lock(&mut doc);
        lock.release(&mut doc);
        lock.release(&mut doc);

        assert_eq!(doc.style_property(body, "overflow").as_deref(), Some("auto"));
        assert!(!lock.is_locked());
    }
}
