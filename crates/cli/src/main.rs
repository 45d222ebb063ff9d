//! `nudge`: command line host for the notification engine.
//!
//! - `nudge watch` polls a live collaborator endpoint and logs what a page
//!   embedding the widget would display.
//! - `nudge replay` runs recorded feed payloads against a virtual clock and
//!   prints the resulting timeline.

mod logging;
mod replay;
mod settings;
mod surface;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use nudge_client::{ClientConfig, HttpEventSource, HttpImpressionSink, TokioClock, run_engine, spawn_poller};
use nudge_engine::{EmbedTag, Engine, FeedPayload, PageEvent, Viewport, WidgetConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::logging::{LogFormat, setup_tracing};
use crate::replay::{ReplayInput, ReplayPlan, replay};
use crate::settings::{DEFAULT_SETTINGS_FILE, Settings, load_settings};
use crate::surface::TraceSurface;

#[derive(Parser, Debug)]
#[command(name = "nudge", version)]
#[command(about = "Social-proof notification engine host")]
struct Cli {
	#[command(subcommand)]
	command: Command,

	/// Settings file
	#[arg(short, long, global = true, value_name = "PATH", env = "NUDGE_CONFIG")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	/// Log line format
	#[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
	log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Poll a live endpoint and trace every notification
	Watch(WatchArgs),
	/// Replay recorded feed payloads on a virtual clock
	Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct WatchArgs {
	/// Collaborator base URL
	#[arg(long, env = "NUDGE_ENDPOINT")]
	endpoint: Option<String>,

	#[arg(long, env = "NUDGE_SITE_ID")]
	site_id: Option<String>,

	#[arg(long, env = "NUDGE_API_KEY", hide_env_values = true)]
	api_key: Option<String>,

	/// Seconds between feed polls
	#[arg(long, value_name = "SECS")]
	poll_interval: Option<u64>,

	/// Simulated viewport width in CSS pixels
	#[arg(long, value_name = "PX")]
	viewport_width: Option<u32>,
}

#[derive(Args, Debug)]
struct ReplayArgs {
	/// Recorded payloads, applied one poll interval apart
	#[arg(required = true, value_name = "FILE")]
	files: Vec<PathBuf>,

	#[arg(long, default_value = "replay")]
	site_id: String,

	/// Seconds between successive payloads
	#[arg(long, value_name = "SECS", default_value_t = 30)]
	poll_interval: u64,

	/// Engine seconds to simulate
	#[arg(long, value_name = "SECS", default_value_t = 120)]
	until: u64,

	/// Simulate a navigation at this engine second (repeatable)
	#[arg(long, value_name = "SECS")]
	navigate_at: Vec<u64>,

	/// Simulated viewport width in CSS pixels
	#[arg(long, value_name = "PX")]
	viewport_width: Option<u32>,

	/// Print impressions as JSON lines after the timeline
	#[arg(long)]
	impressions: bool,
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose, cli.log_format);

	let settings_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
	let settings = load_settings(&settings_path).into_settings();

	match cli.command {
		Command::Watch(args) => {
			let runtime = tokio::runtime::Builder::new_multi_thread()
				.enable_all()
				.worker_threads(2)
				.thread_name("nudge-worker")
				.build()
				.context("failed to build tokio runtime")?;
			runtime.block_on(watch(args, settings))
		}
		Command::Replay(args) => run_replay(args, &settings),
	}
}

async fn watch(args: WatchArgs, settings: Settings) -> anyhow::Result<()> {
	let site_id = args.site_id.or(settings.site_id.clone());
	let api_key = args.api_key.or(settings.api_key.clone());
	let embed = match EmbedTag::from_attributes(site_id.as_deref(), api_key.as_deref()) {
		Ok(embed) => embed,
		Err(err) => {
			tracing::error!(%err, "embed rejected, engine not started");
			return Err(err.into());
		}
	};
	let endpoint = args
		.endpoint
		.or(settings.endpoint.clone())
		.context("no endpoint configured (--endpoint, NUDGE_ENDPOINT or nudge.toml)")?;

	let mut client_config = ClientConfig::new(&endpoint, &embed)?;
	if let Some(secs) = args.poll_interval.or(settings.poll_interval) {
		client_config.poll_interval = Duration::from_secs(secs.max(1));
	}
	let viewport = viewport(args.viewport_width.or(settings.viewport_width));
	let widget = initial_widget(&settings, &embed.site_id)?;

	info!(endpoint = %client_config.endpoint, site_id = %embed.site_id, "starting nudge watch");

	let http = client_config.http_client()?;
	let cancel = CancellationToken::new();
	let (sink, reporter) = HttpImpressionSink::spawn(http.clone(), client_config.impression_url(), cancel.clone());
	let (batch_tx, batch_rx) = mpsc::channel(4);
	let (_page_tx, page_rx) = mpsc::unbounded_channel::<PageEvent>();
	let poller = spawn_poller(
		HttpEventSource::new(http, &client_config),
		client_config.poll_interval,
		batch_tx,
		cancel.clone(),
	);

	let engine = Engine::new(widget, TraceSurface::default(), sink, TokioClock::new()).with_viewport(viewport);
	let driver = tokio::spawn(run_engine(engine, batch_rx, page_rx, cancel.clone()));

	tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
	info!("shutting down");
	cancel.cancel();

	let engine = driver.await.context("engine driver panicked")?;
	info!(mounted = engine.surface().inner().mounted_total(), "engine stopped");
	drop(engine);
	poller.await.context("feed poller panicked")?;
	reporter.await.context("impression reporter panicked")?;
	Ok(())
}

fn run_replay(args: ReplayArgs, settings: &Settings) -> anyhow::Result<()> {
	let poll_interval = Duration::from_secs(args.poll_interval);
	let mut inputs = Vec::with_capacity(args.files.len() + args.navigate_at.len());
	for (index, path) in args.files.iter().enumerate() {
		let body = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
		let records = FeedPayload::parse(&body).with_context(|| format!("failed to parse {}", path.display()))?;
		let at = poll_interval.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
		inputs.push((at, ReplayInput::Batch(records)));
	}
	inputs.extend(args.navigate_at.iter().map(|secs| (Duration::from_secs(*secs), ReplayInput::Navigate)));

	let outcome = replay(ReplayPlan {
		config: initial_widget(settings, &args.site_id)?,
		viewport: viewport(args.viewport_width.or(settings.viewport_width)),
		inputs,
		until: Duration::from_secs(args.until),
	});

	for entry in &outcome.timeline {
		println!("{entry}");
	}
	if args.impressions {
		for impression in &outcome.impressions {
			println!("{}", serde_json::to_string(impression)?);
		}
	}
	info!(
		transitions = outcome.timeline.len(),
		impressions = outcome.impressions.len(),
		"replay finished"
	);
	Ok(())
}

fn initial_widget(settings: &Settings, site_id: &str) -> anyhow::Result<WidgetConfig> {
	let resolved = settings.widget_config(site_id)?;
	for warning in &resolved.warnings {
		tracing::warn!(%warning, "settings widget field defaulted");
	}
	Ok(resolved.config)
}

fn viewport(width: Option<u32>) -> Viewport {
	width.map_or(Viewport::DESKTOP, |width| Viewport::new(width, Viewport::DESKTOP.height))
}
