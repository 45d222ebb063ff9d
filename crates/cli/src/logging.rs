//! Tracing setup for the binary.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
	#[default]
	Text,
	Json,
}

/// Installs the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn setup_tracing(verbose: bool, format: LogFormat) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("nudge=debug,warn")
		} else {
			EnvFilter::new("nudge=info,warn")
		}
	});

	let registry = tracing_subscriber::registry().with(filter);
	match format {
		LogFormat::Text => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(verbose))
			.init(),
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init(),
	}
}
