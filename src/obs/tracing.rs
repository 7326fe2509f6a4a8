// crates.io
use tracing::{Instrument, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::ActionKind};

/// A span builder used by helper actions and synthesis.
#[derive(Clone, Debug)]
pub struct ActionSpan {
	span: tracing::Span,
}
impl ActionSpan {
	/// Creates a new span tagged with the provided action kind + stage.
	pub fn new(kind: ActionKind, stage: &'static str) -> Self {
		Self { span: tracing::info_span!("cognito_stack.action", action = kind.as_str(), stage) }
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> tracing::span::EnteredSpan {
		self.span.entered()
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

#[cfg(feature = "cli")]
const QUIET_TARGETS: &[&str] = &[
	"aws_config",
	"aws_sdk_cognitoidentityprovider",
	"aws_smithy_runtime",
	"hyper",
	"hyper_util",
	"rustls",
];

/// Installs the global subscriber used by the CLI.
///
/// Logs at `info` (or `debug` when `verbose`), keeps the AWS SDK and HTTP stack at `warn`,
/// and lets `RUST_LOG` override everything.
#[cfg(feature = "cli")]
pub fn init_subscriber(verbose: bool) {
	// crates.io
	use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

	let level = if verbose { "debug" } else { "info" };
	let quiet = QUIET_TARGETS.iter().map(|target| format!(",{target}=warn")).collect::<String>();
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("{level}{quiet}")));
	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_target(true).with_thread_names(true))
		.try_init();
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn action_span_enters() {
		let _guard = ActionSpan::new(ActionKind::Synth, "test").entered();
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = ActionSpan::new(ActionKind::GenerateToken, "instrument_wraps_future");
		let value = ActionSpan::instrument(&span, async { 42 }).await;

		assert_eq!(value, 42);
	}
}
