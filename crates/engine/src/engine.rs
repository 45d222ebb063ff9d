//! One embed's engine instance.

use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::{RawWidgetConfig, WidgetConfig, resolve};
use crate::error::InitError;
use crate::event::RawEventRecord;
use crate::feed::EventFeed;
use crate::impression::ImpressionSink;
use crate::page::{PageChange, PageEvent, PageState, Viewport};
use crate::render::{Presenter, Surface};
use crate::scheduler::{Gate, Scheduler, SchedulerPolicy, Transition};
use crate::trigger;

/// Attributes an embedding page provides to bootstrap an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedTag {
	pub site_id: String,
	pub api_key: String,
}

impl EmbedTag {
	/// Validates raw embed attributes. Blank values count as missing.
	pub fn from_attributes(site_id: Option<&str>, api_key: Option<&str>) -> Result<Self, InitError> {
		let site_id = site_id.map(str::trim).filter(|s| !s.is_empty()).ok_or(InitError::MissingSiteId)?;
		let api_key = api_key.map(str::trim).filter(|s| !s.is_empty()).ok_or(InitError::MissingCredential)?;
		Ok(Self {
			site_id: site_id.to_string(),
			api_key: api_key.to_string(),
		})
	}
}

/// Scheduling and display state for one embed.
///
/// Single-owner and synchronous: the host feeds it batches and page events
/// and calls [`tick`](Self::tick) whenever [`next_wakeup`](Self::next_wakeup)
/// comes due. Several embeds on one page are several engines.
pub struct Engine<S, I = (), C = SystemClock> {
	config: WidgetConfig,
	feed: EventFeed,
	page: PageState,
	scheduler: Scheduler,
	presenter: Presenter<S>,
	sink: I,
	clock: C,
}

impl<S, I, C> Engine<S, I, C>
where
	S: Surface,
	I: ImpressionSink,
	C: Clock,
{
	pub fn new(config: WidgetConfig, surface: S, sink: I, clock: C) -> Self {
		let page = PageState::loaded(clock.now(), Viewport::default());
		tracing::info!(site_id = %config.site_id, widget_id = %config.widget_id, "engine started");
		Self {
			scheduler: Scheduler::new(SchedulerPolicy::from_config(&config)),
			config,
			feed: EventFeed::default(),
			page,
			presenter: Presenter::new(surface),
			sink,
			clock,
		}
	}

	/// Sets the initial viewport.
	pub fn with_viewport(mut self, viewport: Viewport) -> Self {
		self.page.viewport = viewport;
		self
	}

	pub fn config(&self) -> &WidgetConfig {
		&self.config
	}

	/// Swaps in a new widget config. Slots already on screen keep their
	/// deadlines; new admissions use the new timing.
	pub fn reconfigure(&mut self, config: WidgetConfig) {
		if config == self.config {
			return;
		}
		tracing::debug!(site_id = %config.site_id, widget_id = %config.widget_id, "widget config updated");
		self.scheduler.set_policy(SchedulerPolicy::from_config(&config));
		self.config = config;
	}

	/// Feeds one fetched batch (newest first, as served).
	///
	/// The first record carrying a `design` payload refreshes the config.
	/// Returns the number of events appended to the pending queue.
	pub fn ingest(&mut self, records: &[RawEventRecord]) -> usize {
		if let Some(record) = records.iter().find(|r| r.design.is_some()) {
			self.refresh_config(record);
		}

		let now = self.clock.now();
		let mut enqueued = 0;
		for event in self.feed.next_batch(records) {
			let event_id = event.id.clone();
			let rejected = self.scheduler.enqueue(event, now).is_some_and(|dropped| dropped.event.id == event_id);
			if !rejected {
				enqueued += 1;
			}
		}
		if enqueued > 0 {
			tracing::debug!(enqueued, fetched = records.len(), "batch ingested");
		}
		enqueued
	}

	/// Applies a page-state change, then ticks.
	///
	/// Navigation starts a new session: pending slots are discarded along
	/// with their timers and the load delay starts over.
	pub fn page_event(&mut self, event: PageEvent) -> Vec<Transition> {
		let now = self.clock.now();
		let mut out = if self.page.apply(event, now) == PageChange::NewSession {
			tracing::debug!(session = self.page.session, "page session restarted");
			self.scheduler.revoke_pending(now)
		} else {
			Vec::new()
		};
		out.extend(self.tick());
		out
	}

	/// Advances the scheduler to the clock's current time and renders every
	/// resulting transition, in order.
	pub fn tick(&mut self) -> Vec<Transition> {
		let now = self.clock.now();
		let mobile = self.page.viewport.is_mobile();

		let fired = trigger::evaluate(&self.page, &self.config.triggers, self.config.timing.delay, now);
		if let Some(trigger) = fired
			&& self.page.fired.is_none()
		{
			self.page.fired = Some(trigger);
			tracing::info!(trigger = trigger.as_str(), session = self.page.session, "display trigger fired");
		}
		let gate = Gate {
			eligible: fired.is_some() && self.config.display.visible_on(mobile),
			capacity: self.config.capacity_for(mobile),
		};

		// Abandoning a slot frees capacity, so admission is retried until a
		// pass renders cleanly.
		let mut out = Vec::new();
		loop {
			let transitions = self.scheduler.tick(now, gate);
			if transitions.is_empty() || !self.present_all(transitions, now, &mut out) {
				return out;
			}
		}
	}

	/// Renders transitions in order. Returns whether any slot was abandoned.
	fn present_all(&mut self, transitions: Vec<Transition>, now: Duration, out: &mut Vec<Transition>) -> bool {
		let wall = self.clock.wall();
		let mut abandoned = Vec::new();
		for transition in transitions {
			if abandoned.contains(&transition.slot) {
				continue;
			}
			tracing::trace!(slot = %transition.slot, from = %transition.from, to = %transition.to, "slot transition");
			match self.presenter.present(&transition, &self.config, &self.page.viewport, wall) {
				Ok(Some(impression)) => {
					tracing::debug!(event_id = %impression.event_id, "impression recorded");
					self.sink.report(impression);
				}
				Ok(None) => {}
				Err(err) => {
					tracing::debug!(%err, "abandoning slot");
					self.presenter.forget(transition.slot);
					abandoned.push(transition.slot);
					out.push(transition.clone());
					if let Some(discarded) = self.scheduler.abandon(transition.slot, now) {
						out.push(discarded);
					}
					continue;
				}
			}
			out.push(transition);
		}
		!abandoned.is_empty()
	}

	/// Earliest engine time at which [`tick`](Self::tick) has work to do.
	pub fn next_wakeup(&self) -> Option<Duration> {
		let now = self.clock.now();
		let opens = self
			.scheduler
			.pending()
			.next()
			.and_then(|_| trigger::opens_at(&self.page, &self.config.triggers, self.config.timing.delay))
			.filter(|at| *at > now);
		[self.scheduler.next_deadline(), opens].into_iter().flatten().min()
	}

	/// Current engine time.
	pub fn now(&self) -> Duration {
		self.clock.now()
	}

	pub fn page(&self) -> &PageState {
		&self.page
	}

	pub fn scheduler(&self) -> &Scheduler {
		&self.scheduler
	}

	pub fn surface(&self) -> &S {
		self.presenter.surface()
	}

	pub fn surface_mut(&mut self) -> &mut S {
		self.presenter.surface_mut()
	}

	pub fn sink(&self) -> &I {
		&self.sink
	}

	fn refresh_config(&mut self, record: &RawEventRecord) {
		let raw = RawWidgetConfig {
			site_id: Some(self.config.site_id.clone()),
			widget_id: Some(self.config.widget_id.clone()),
			design: record.design.clone(),
			display: record.display.clone(),
		};
		match resolve(&raw) {
			Ok(resolved) => {
				for warning in &resolved.warnings {
					tracing::debug!(%warning, "widget config field defaulted");
				}
				self.reconfigure(resolved.config);
			}
			Err(err) => tracing::warn!(%err, "ignoring widget config"),
		}
	}
}

impl<S, I, C> std::fmt::Debug for Engine<S, I, C> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Engine")
			.field("site_id", &self.config.site_id)
			.field("session", &self.page.session)
			.field("pending", &self.scheduler.pending().count())
			.field("active", &self.scheduler.active().len())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn embed_requires_site_and_credential() {
		assert_eq!(EmbedTag::from_attributes(None, Some("k")), Err(InitError::MissingSiteId));
		assert_eq!(EmbedTag::from_attributes(Some("  "), Some("k")), Err(InitError::MissingSiteId));
		assert_eq!(EmbedTag::from_attributes(Some("s"), Some("")), Err(InitError::MissingCredential));
		assert_eq!(
			EmbedTag::from_attributes(Some(" s "), Some("k")),
			Ok(EmbedTag {
				site_id: "s".to_string(),
				api_key: "k".to_string(),
			})
		);
	}
}
