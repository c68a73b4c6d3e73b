//! Realtime scenario execution.
//!
//! The page keeps its virtual clock, but the driver only moves it forward
//! once the same amount of wall-clock time has passed, sleeping on tokio
//! timers until each scan deadline. Trace entries are published to a
//! [`NoticeHub`] as they happen.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

use loupe_overlay::OverlayConfig;

use crate::hub::NoticeHub;
use crate::runner::{RunReport, Session};
use crate::scenario::{RuntimeError, Scenario, Step};

/// Runs scenarios in wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct Driver {
    base: OverlayConfig,
    hub: NoticeHub,
}

impl Driver {
    pub fn new(base: OverlayConfig) -> Self {
        Self {
            base,
            hub: NoticeHub::new(),
        }
    }

    /// Hub receiving trace entries while scenarios run.
    pub fn hub(&self) -> &NoticeHub {
        &self.hub
    }

    /// Run a scenario, sleeping through its waits.
    pub async fn run(&self, scenario: &Scenario) -> Result<RunReport, RuntimeError> {
        let mut session = Session::start(scenario, &self.base)?;
        let start = Instant::now();

        tracing::info!("Running '{}' in realtime", scenario.name);

        for (index, step) in scenario.steps.iter().enumerate() {
            match step {
                Step::Wait(ms) => {
                    let target = session.page.now() + Duration::from_millis(*ms);
                    self.wait_until(&mut session, start, target).await;
                }
                other => {
                    let published = session.trace.len();
                    session.apply(index, other)?;
                    for entry in &session.trace[published..] {
                        self.hub.send(entry.clone());
                    }
                }
            }
        }

        Ok(session.finish(scenario))
    }

    /// Fire each pending timer at its wall-clock deadline, then settle at
    /// `target`.
    async fn wait_until(&self, session: &mut Session, start: Instant, target: Duration) {
        while let Some(due) = session.page.next_timer().filter(|due| *due <= target) {
            sleep_until(start + due).await;
            session.page.advance_to(due);
            for entry in session.record() {
                self.hub.send(entry);
            }
        }

        sleep_until(start + target).await;
        session.page.advance_to(target);
    }
}
