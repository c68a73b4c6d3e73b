//! Scenario execution for the loupe diagram overlay.
//!
//! Scenarios describe a page, the rendering library's and the site
//! framework's actions, user input, and expectations. They run either on a
//! virtual clock ([`ScenarioRunner`]) or in wall-clock time with tokio timers
//! ([`Driver`]).

pub mod driver;
pub mod hub;
pub mod runner;
pub mod scenario;

pub use driver::Driver;
pub use hub::NoticeHub;
pub use runner::{Failure, RunReport, ScenarioRunner, TraceEntry};
pub use scenario::{discover_scenarios, Expectation, RuntimeError, Scenario, Step};
