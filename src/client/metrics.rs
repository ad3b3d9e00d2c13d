// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for the request pipeline.
#[derive(Debug, Default)]
pub struct ClientMetrics {
	refresh_attempts: AtomicU64,
	refresh_reuses: AtomicU64,
	refresh_successes: AtomicU64,
	refresh_failures: AtomicU64,
	retries: AtomicU64,
	terminations: AtomicU64,
}
impl ClientMetrics {
	/// Returns the total number of coordinated refresh entries.
	pub fn refresh_attempts(&self) -> u64 {
		self.refresh_attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh entries satisfied by a concurrent flight's rotation.
	pub fn refresh_reuses(&self) -> u64 {
		self.refresh_reuses.load(Ordering::Relaxed)
	}

	/// Returns the number of successful token-endpoint exchanges.
	pub fn refresh_successes(&self) -> u64 {
		self.refresh_successes.load(Ordering::Relaxed)
	}

	/// Returns the number of failed token-endpoint exchanges.
	pub fn refresh_failures(&self) -> u64 {
		self.refresh_failures.load(Ordering::Relaxed)
	}

	/// Returns the number of requests re-sent after a reactive refresh.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns the number of session terminations performed.
	pub fn terminations(&self) -> u64 {
		self.terminations.load(Ordering::Relaxed)
	}

	pub(crate) fn record_refresh_attempt(&self) {
		self.refresh_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_reuse(&self) {
		self.refresh_reuses.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_success(&self) {
		self.refresh_successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh_failure(&self) {
		self.refresh_failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_termination(&self) {
		self.terminations.fetch_add(1, Ordering::Relaxed);
	}
}
