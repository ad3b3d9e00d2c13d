// self
use crate::{_prelude::*, obs::RefreshTrigger};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRefresh<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRefresh<F> = F;

/// A span builder used around coordinated refresh sections.
#[derive(Clone, Debug)]
pub struct RefreshSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RefreshSpan {
	/// Creates a new span tagged with the provided trigger + stage.
	pub fn new(trigger: RefreshTrigger, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("cedarstack_http.client", phase = trigger.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (trigger, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRefresh<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warning-level event for refresh failures the request path tolerates.
pub fn warn_refresh_failed(source: &'static str, err: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(source, error = %err, "Credential refresh failed; proceeding without a rotated token.");

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (source, err);
	}
}
