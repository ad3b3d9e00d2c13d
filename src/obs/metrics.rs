// self
use crate::obs::{RefreshOutcome, RefreshTrigger};

/// Records a refresh outcome via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(trigger: RefreshTrigger, outcome: RefreshOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cedarstack_http_refresh_total",
			"trigger" => trigger.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (trigger, outcome);
	}
}

/// Records a session termination via the global metrics recorder (when enabled).
pub fn record_session_termination() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("cedarstack_http_session_terminated_total").increment(1);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_helpers_noop_without_metrics() {
		record_refresh_outcome(RefreshTrigger::Reactive, RefreshOutcome::Failure);
		record_session_termination();
	}
}
