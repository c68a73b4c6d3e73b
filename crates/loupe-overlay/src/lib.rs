//! Click-to-zoom overlay for rendered documentation diagrams.
//!
//! Diagrams are produced asynchronously by a rendering library. After each
//! page trigger (initial load or soft navigation) a deferred scan binds every
//! rendered diagram exactly once; clicking a bound diagram opens a single
//! shared overlay showing a resizable clone of its vector graphic.

pub mod config;
pub mod locate;
pub mod normalize;
pub mod overlay;
pub mod page;
pub mod registry;
pub mod scroll;
pub mod surface;
pub mod timer;

pub use config::OverlayConfig;
pub use locate::{locate_vector, VectorSource};
pub use normalize::{has_fixed_sizing, normalize_clone};
pub use overlay::{CloseReason, Notice, OverlayState, ScanReport, ZoomError, ZoomOverlay};
pub use page::{Page, PageEvent, TimedNotice};
pub use registry::BindingRegistry;
pub use scroll::{scroll_suppressed, ScrollLock};
pub use surface::OverlaySurface;
pub use timer::{TimerQueue, TimerTask, Trigger};
