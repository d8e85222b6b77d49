//! Log line counters.
//!
//! [`LogMetricsLayer`] is a `tracing_subscriber` layer counting every event
//! that passes the subscriber's filters, one counter per level, exported as
//! `<namespace>_log_<level>_total`.

use prometheus::{IntCounter, Opts, Registry};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

const LEVELS: [(Level, &str); 5] = [
	(Level::TRACE, "trace"),
	(Level::DEBUG, "debug"),
	(Level::INFO, "info"),
	(Level::WARN, "warn"),
	(Level::ERROR, "error"),
];

/// Layer counting emitted log lines by level.
#[derive(Clone)]
pub struct LogMetricsLayer {
	lines: [IntCounter; 5],
}

impl LogMetricsLayer {
	/// Creates the per-level counters and registers them with `registry`.
	pub(crate) fn register(namespace: &str, registry: &Registry) -> Result<Self, prometheus::Error> {
		let register_level = |index: usize| -> Result<IntCounter, prometheus::Error> {
			let (_, name) = LEVELS[index];
			let counter = IntCounter::with_opts(
				Opts::new(
					format!("{}_total", name),
					format!("Number of log lines emitted at {} level", name),
				)
				.namespace(namespace.to_string())
				.subsystem("log"),
			)?;
			registry.register(Box::new(counter.clone()))?;
			Ok(counter)
		};

		Ok(Self {
			lines: [
				register_level(0)?,
				register_level(1)?,
				register_level(2)?,
				register_level(3)?,
				register_level(4)?,
			],
		})
	}

	fn counter(&self, level: &Level) -> &IntCounter {
		let index = LEVELS
			.iter()
			.position(|(known, _)| known == level)
			.unwrap_or(LEVELS.len() - 1);
		&self.lines[index]
	}
}

impl<S: Subscriber> Layer<S> for LogMetricsLayer {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		self.counter(event.metadata().level()).inc();
	}
}
