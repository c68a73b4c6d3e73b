//! A single-threaded page host for the overlay.
//!
//! The page owns the document, the overlay and a virtual clock. Every event is
//! handled to completion before the next one; the only deferred work is the
//! one-shot scan timer armed by the load and soft-navigation signals.

use std::time::Duration;

use loupe_dom::{Document, NodeId};

use crate::config::OverlayConfig;
use crate::overlay::{Notice, ZoomError, ZoomOverlay};
use crate::timer::{TimerQueue, TimerTask, Trigger};

/// Events delivered to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// Initial page load signal from the hosting framework
    Load,
    /// Content was swapped without a full reload
    SoftNavigation,
    /// A click whose innermost target is the given node
    Click(NodeId),
    /// A key press, named as in `KeyboardEvent.key`
    Key(String),
}

/// A notice stamped with the virtual time it happened at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedNotice {
    pub at: Duration,
    pub notice: Notice,
}

/// Page host owning the document and the zoom overlay.
#[derive(Debug)]
pub struct Page {
    document: Document,
    overlay: ZoomOverlay,
    timers: TimerQueue,
    now: Duration,
    notices: Vec<TimedNotice>,
}

impl Page {
    /// Create a page around an existing document.
    pub fn new(document: Document, config: OverlayConfig) -> Result<Self, ZoomError> {
        Ok(Self {
            document,
            overlay: ZoomOverlay::new(config)?,
            timers: TimerQueue::new(),
            now: Duration::ZERO,
            notices: Vec::new(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for the rendering library and the site framework.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn overlay(&self) -> &ZoomOverlay {
        &self.overlay
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Deadline of the next pending timer.
    pub fn next_timer(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Handle one event to completion.
    pub fn dispatch(&mut self, event: PageEvent) {
        tracing::trace!("Dispatching {:?} at {:?}", event, self.now);

        match event {
            PageEvent::Load => self.arm_scan(Trigger::Load),
            PageEvent::SoftNavigation => self.arm_scan(Trigger::SoftNavigation),
            PageEvent::Click(target) => self.overlay.handle_click(&mut self.document, target),
            PageEvent::Key(key) => {
                self.overlay.handle_key(&mut self.document, &key);
            }
        }

        self.collect_notices();
    }

    fn arm_scan(&mut self, trigger: Trigger) {
        let due = self.now + self.overlay.config().scan_delay();
        self.timers.schedule(due, TimerTask::Scan(trigger));
        tracing::debug!("Diagram scan for {:?} scheduled at {:?}", trigger, due);
    }

    /// Move the clock forward by `by`, firing due timers.
    pub fn advance(&mut self, by: Duration) -> usize {
        self.advance_to(self.now + by)
    }

    /// Move the clock to `target`, firing due timers in deadline order.
    ///
    /// The clock never moves backwards. Returns the number of timers fired.
    pub fn advance_to(&mut self, target: Duration) -> usize {
        let target = target.max(self.now);
        let mut fired = 0;

        while let Some((due, task)) = self.timers.pop_due(target) {
            self.now = due.max(self.now);
            self.run_task(task);
            fired += 1;
        }

        self.now = target;
        fired
    }

    fn run_task(&mut self, task: TimerTask) {
        match task {
            TimerTask::Scan(trigger) => {
                let report = self.overlay.scan(&mut self.document);
                tracing::debug!(
                    "Scan after {:?}: {} diagrams, {} newly bound",
                    trigger,
                    report.found,
                    report.newly_bound
                );
            }
        }
        self.collect_notices();
    }

    fn collect_notices(&mut self) {
        let at = self.now;
        self.notices.extend(
            self.overlay
                .drain_notices()
                .into_iter()
                .map(|notice| TimedNotice { at, notice }),
        );
    }

    /// Take the notices recorded since the last call.
    pub fn drain_notices(&mut self) -> Vec<TimedNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Close the overlay, remove its surface and forget all bindings.
    pub fn reset_overlay(&mut self) {
        self.overlay.reset(&mut self.document);
        self.collect_notices();
    }
}
