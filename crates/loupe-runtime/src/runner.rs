//! Deterministic scenario execution on a virtual clock.

use std::time::Duration;

use serde::Serialize;

use loupe_dom::{parse_fragment, Document, NodeId, Selector};
use loupe_overlay::{
    has_fixed_sizing, scroll_suppressed, Notice, OverlayConfig, Page, PageEvent, TimedNotice,
};

use crate::scenario::{Expectation, RuntimeError, Scenario, Step};

/// One observable overlay action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    /// Virtual time in milliseconds
    pub at_ms: u64,
    /// `bound`, `opened`, `closed` or `ignored`
    pub event: String,
    /// Label of the diagram involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<String>,
    /// Extra detail (vector source, close reason, ignore reason)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A failed expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Zero-based step index
    pub step: usize,
    pub message: String,
}

/// Outcome of running a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub name: String,
    pub passed: bool,
    pub steps: usize,
    /// Virtual time at the end of the run, in milliseconds
    pub elapsed_ms: u64,
    pub trace: Vec<TraceEntry>,
    pub failures: Vec<Failure>,
    /// Serialized `<body>` at the end of the run
    #[serde(skip)]
    pub final_body: String,
}

/// Runs scenarios on a virtual clock.
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    base: OverlayConfig,
}

impl ScenarioRunner {
    /// Create a runner whose scenarios start from `base`.
    pub fn new(base: OverlayConfig) -> Self {
        Self { base }
    }

    /// Run a scenario to completion.
    ///
    /// Failed expectations are collected in the report; malformed steps
    /// (bad selectors, unmatched targets, invalid markup) abort the run.
    pub fn run(&self, scenario: &Scenario) -> Result<RunReport, RuntimeError> {
        let mut session = Session::start(scenario, &self.base)?;

        for (index, step) in scenario.steps.iter().enumerate() {
            match step {
                Step::Wait(ms) => {
                    session.page.advance(Duration::from_millis(*ms));
                    session.record();
                }
                other => session.apply(index, other)?,
            }
        }

        Ok(session.finish(scenario))
    }
}

/// State shared by the virtual runner and the realtime driver.
pub(crate) struct Session {
    pub(crate) page: Page,
    pub(crate) trace: Vec<TraceEntry>,
    failures: Vec<Failure>,
    opens: usize,
}

impl Session {
    pub(crate) fn start(scenario: &Scenario, base: &OverlayConfig) -> Result<Self, RuntimeError> {
        let config = scenario.effective_config(base)?;
        let mut doc = Document::new();
        let body = doc.body();
        parse_fragment(&mut doc, body, &scenario.page.body)?;

        tracing::debug!("Starting scenario '{}'", scenario.name);

        Ok(Self {
            page: Page::new(doc, config)?,
            trace: Vec::new(),
            failures: Vec::new(),
            opens: 0,
        })
    }

    /// Apply any step other than `wait`.
    pub(crate) fn apply(&mut self, index: usize, step: &Step) -> Result<(), RuntimeError> {
        match step {
            Step::Load => self.page.dispatch(PageEvent::Load),
            Step::Navigate { markup } => {
                if let Some(markup) = markup {
                    self.swap_content(markup)?;
                }
                self.page.dispatch(PageEvent::SoftNavigation);
            }
            Step::Render { target, markup } => {
                let target = self.resolve(index, target)?;
                let doc = self.page.document_mut();
                doc.clear_children(target);
                parse_fragment(doc, target, markup)?;
            }
            Step::Click(selector) => {
                let target = self.resolve(index, selector)?;
                self.page.dispatch(PageEvent::Click(target));
            }
            Step::Key(key) => self.page.dispatch(PageEvent::Key(key.clone())),
            Step::Wait(_) => {}
            Step::Expect(expectation) => {
                self.record();
                let messages = self.check(index, expectation)?;
                self.failures
                    .extend(messages.into_iter().map(|message| Failure { step: index, message }));
            }
        }

        self.record();
        Ok(())
    }

    /// Replace the content of `<main>`, or of `<body>` apart from the
    /// overlay element when the page has no `<main>`.
    fn swap_content(&mut self, markup: &str) -> Result<(), RuntimeError> {
        let overlay_id = self.page.overlay().config().overlay_id.clone();
        let doc = self.page.document_mut();

        let container = doc
            .descendants(doc.body())
            .into_iter()
            .find(|n| doc.tag(*n) == Some("main"));

        let container = match container {
            Some(main) => {
                doc.clear_children(main);
                main
            }
            None => {
                let body = doc.body();
                let stale: Vec<NodeId> = doc
                    .children(body)
                    .iter()
                    .copied()
                    .filter(|n| doc.attribute(*n, "id") != Some(overlay_id.as_str()))
                    .collect();
                for node in stale {
                    doc.remove(node);
                }
                body
            }
        };

        parse_fragment(doc, container, markup)?;
        Ok(())
    }

    fn resolve(&self, index: usize, selector: &str) -> Result<NodeId, RuntimeError> {
        let parsed = Selector::parse(selector)
            .map_err(|source| RuntimeError::Selector { step: index, source })?;
        self.page
            .document()
            .query_selector(&parsed)
            .ok_or_else(|| RuntimeError::NoMatch {
                step: index,
                selector: selector.to_string(),
            })
    }

    fn check(&self, index: usize, expect: &Expectation) -> Result<Vec<String>, RuntimeError> {
        let doc = self.page.document();
        let overlay = self.page.overlay();
        let mut failures = Vec::new();

        if let Some(state) = expect.overlay {
            if overlay.state() != state {
                failures.push(format!(
                    "expected overlay {:?}, found {:?}",
                    state,
                    overlay.state()
                ));
            }
        }

        if let Some(selector) = &expect.showing {
            let wanted = self.resolve(index, selector)?;
            if overlay.showing() != Some(wanted) {
                let actual = overlay
                    .showing()
                    .map(|n| label(doc, n))
                    .unwrap_or_else(|| "nothing".to_string());
                failures.push(format!("expected overlay showing {}, found {}", selector, actual));
            }
        }

        if let Some(count) = expect.overlays {
            let actual = doc.elements_by_id(&overlay.config().overlay_id).len();
            if actual != count {
                failures.push(format!("expected {} overlay elements, found {}", count, actual));
            }
        }

        if let Some(locked) = expect.scroll_locked {
            if scroll_suppressed(doc) != locked {
                failures.push(format!("expected scroll_locked = {}", locked));
            }
        }

        if let Some(count) = expect.bound {
            if overlay.registry().len() != count {
                failures.push(format!(
                    "expected {} bound diagrams, found {}",
                    count,
                    overlay.registry().len()
                ));
            }
        }

        if let Some(count) = expect.opens {
            if self.opens != count {
                failures.push(format!("expected {} opens, found {}", count, self.opens));
            }
        }

        if let Some(sized) = expect.clone_sized {
            let clone = overlay.surface().and_then(|s| s.clone_node(doc));
            match clone {
                Some(clone) if has_fixed_sizing(doc, clone) != sized => {
                    failures.push(format!("expected clone_sized = {}", sized));
                }
                Some(_) => {}
                None => failures.push("expected a clone in the overlay".to_string()),
            }
        }

        Ok(failures)
    }

    /// Move page notices into the trace.
    pub(crate) fn record(&mut self) -> Vec<TraceEntry> {
        let notices = self.page.drain_notices();
        let entries: Vec<TraceEntry> = notices
            .iter()
            .map(|n| trace_entry(self.page.document(), n))
            .collect();

        self.opens += notices
            .iter()
            .filter(|n| matches!(n.notice, Notice::Opened { .. }))
            .count();
        self.trace.extend(entries.iter().cloned());
        entries
    }

    pub(crate) fn finish(mut self, scenario: &Scenario) -> RunReport {
        self.record();
        let doc = self.page.document();

        RunReport {
            name: scenario.name.clone(),
            passed: self.failures.is_empty(),
            steps: scenario.steps.len(),
            elapsed_ms: self.page.now().as_millis() as u64,
            trace: self.trace,
            failures: self.failures,
            final_body: loupe_dom::inner_html(doc, doc.body()),
        }
    }
}

fn trace_entry(doc: &Document, timed: &TimedNotice) -> TraceEntry {
    let (event, diagram, detail) = match &timed.notice {
        Notice::Bound { diagram } => ("bound", Some(*diagram), None),
        Notice::Opened {
            diagram, source, ..
        } => ("opened", Some(*diagram), Some(source.to_string())),
        Notice::Closed { reason } => ("closed", None, Some(format!("{:?}", reason).to_lowercase())),
        Notice::Ignored { diagram, reason } => ("ignored", Some(*diagram), Some(reason.clone())),
    };

    TraceEntry {
        at_ms: timed.at.as_millis() as u64,
        event: event.to_string(),
        diagram: diagram.map(|d| label(doc, d)),
        detail,
    }
}

/// `#id` when the element has one, otherwise `tag@index`.
fn label(doc: &Document, id: NodeId) -> String {
    match doc.attribute(id, "id") {
        Some(value) => format!("#{}", value),
        None => format!("{}@{}", doc.tag(id).unwrap_or("node"), id.index()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SVG_A: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="640" height="480" viewBox="0 0 640 480"><g/></svg>"#;

    fn scenario(steps: &str) -> Scenario {
        let yaml = format!(
            r##"
name: two diagrams
page:
  body: '<main><div class="mermaid" id="a">{}</div><div class="mermaid" id="b">graph TD</div></main>'
steps:
{}
"##,
            SVG_A, steps
        );
        Scenario::from_yaml(&yaml).unwrap()
    }

    fn events(report: &RunReport) -> Vec<(String, Option<String>)> {
        report
            .trace
            .iter()
            .map(|e| (e.event.clone(), e.diagram.clone()))
            .collect()
    }

    #[test]
    fn pending_diagram_scenario() {
        let s = scenario(
            r##"
  - load
  - wait: 600
  - click: "#a"
  - expect: { overlay: open, showing: "#a", scroll_locked: true, clone_sized: false }
  - key: Escape
  - click: "#b"
  - expect: { overlay: closed, opens: 1 }
  - render: { target: "#b", markup: '<svg width="10" height="10"/>' }
  - click: "#b"
  - expect: { overlay: closed, opens: 1 }
  - navigate: {}
  - wait: 600
  - click: "#b"
  - expect: { overlay: open, showing: "#b", overlays: 1, bound: 2, opens: 2 }
"##,
        );

        let report = ScenarioRunner::default().run(&s).unwrap();

        assert!(report.passed, "failures: {:?}", report.failures);
        assert_eq!(
            events(&report),
            vec![
                ("bound".to_string(), Some("#a".to_string())),
                ("opened".to_string(), Some("#a".to_string())),
                ("closed".to_string(), None),
                ("bound".to_string(), Some("#b".to_string())),
                ("opened".to_string(), Some("#b".to_string())),
            ]
        );
        assert_eq!(report.trace[0].at_ms, 500);
        assert_eq!(report.trace[2].detail.as_deref(), Some("escape"));
    }

    #[test]
    fn repeated_triggers_open_once_per_click() {
        let s = scenario(
            r##"
  - load
  - navigate: {}
  - navigate: {}
  - wait: 2000
  - click: "#a"
  - expect: { opens: 1, bound: 1 }
"##,
        );

        let report = ScenarioRunner::default().run(&s).unwrap();

        assert!(report.passed, "failures: {:?}", report.failures);
    }

    #[test]
    fn failed_expectations_are_reported() {
        let s = scenario(
            r##"
  - load
  - wait: 100
  - click: "#a"
  - expect: { overlay: open }
"##,
        );

        let report = ScenarioRunner::default().run(&s).unwrap();

        assert!(!report.passed);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].step, 3);
    }

    #[test]
    fn navigation_replaces_main_content() {
        let s = scenario(
            r##"
  - load
  - wait: 500
  - click: "#a"
  - key: Escape
  - navigate:
      markup: '<div class="mermaid" id="c"><svg viewBox="0 0 2 2"/></div>'
  - wait: 500
  - click: "#c"
  - expect: { showing: "#c", overlays: 1, bound: 1 }
"##,
        );

        let report = ScenarioRunner::default().run(&s).unwrap();

        assert!(report.passed, "failures: {:?}", report.failures);
        assert!(!report.final_body.contains("id=\"a\""));
    }

    #[test]
    fn unknown_click_target_aborts() {
        let s = scenario("  - click: \"#missing\"\n");

        let result = ScenarioRunner::default().run(&s);

        assert!(matches!(
            result,
            Err(RuntimeError::NoMatch { step: 0, .. })
        ));
    }

    #[test]
    fn scenario_overrides_scan_delay() {
        let mut s = scenario(
            r##"
  - load
  - wait: 150
  - expect: { bound: 1 }
"##,
        );
        s.config.insert(
            serde_yaml::Value::from("scan_delay_ms"),
            serde_yaml::Value::from(100),
        );

        let report = ScenarioRunner::default().run(&s).unwrap();

        assert!(report.passed, "failures: {:?}", report.failures);
    }
}
