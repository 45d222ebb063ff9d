//! # nudge-engine
//!
//! Scheduling and display engine for social-proof notifications ("Ana from
//! Lisbon just bought a lamp").
//!
//! The engine takes two independent inputs, a site's widget configuration and
//! a feed of recent visitor events, and decides which notification to show,
//! when, for how long, where on screen, and how it animates in and out.
//!
//! Components, leaf first:
//!
//! - [`config`]: resolves a raw widget payload into a fully defaulted [`WidgetConfig`].
//! - [`feed`]: turns fetched records into a deduplicated, oldest-first batch.
//! - [`trigger`]: decides whether the page currently permits showing anything.
//! - [`scheduler`]: the slot state machine (`Pending → Showing → HoldingFull → Hiding → Removed`).
//! - [`render`]: pure style resolution plus a [`Presenter`] driving a [`Surface`].
//!
//! [`Engine`] ties them together for one embed. Everything is driven by
//! [`Engine::tick`] against an injectable [`Clock`], so the whole lifecycle can
//! be exercised without real timers:
//!
//! ```
//! use std::time::Duration;
//! use nudge_engine::{Engine, ManualClock, WidgetConfig};
//! use nudge_engine::render::HeadlessSurface;
//!
//! let clock = ManualClock::new();
//! let config = WidgetConfig::defaults_for("site-1");
//! let mut engine = Engine::new(config, HeadlessSurface::new(), (), clock.clone());
//!
//! clock.advance(Duration::from_secs(10));
//! assert!(engine.tick().is_empty());
//! ```

pub mod clock;
pub mod config;
mod engine;
pub mod error;
pub mod event;
pub mod feed;
pub mod impression;
pub mod page;
pub mod render;
pub mod scheduler;
pub mod template;
pub mod timers;
pub mod trigger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ConfigWarning, RawWidgetConfig, Resolved, WidgetConfig, resolve};
pub use engine::{EmbedTag, Engine};
pub use error::{FeedFetchError, InitError, RenderTargetMissing};
pub use event::{EventKind, FeedPayload, NotificationEvent, RawEventRecord};
pub use feed::{EventFeed, EventSource};
pub use impression::{Impression, ImpressionSink};
pub use page::{PageEvent, PageState, Viewport};
pub use render::{Presenter, StyleSet, Surface, resolve_style};
pub use scheduler::{Gate, ScheduledSlot, Scheduler, SlotId, SlotState, Transition};
