//! Session termination notifications emitted when credentials become irrecoverable.

// self
use crate::_prelude::*;

/// Receives the session-termination signal so the application shell can prompt for
/// re-authentication.
///
/// Termination is a local side effect: the client clears the provider's credential state and
/// fans the signal out to every registered observer. No logout network call is made here.
pub trait SessionObserver
where
	Self: Send + Sync,
{
	/// Called exactly once per terminal authorization failure.
	fn session_terminated(&self);
}

/// Fan-out list of [`SessionObserver`] registrations.
#[derive(Default)]
pub(crate) struct SessionNotifier(RwLock<Vec<Arc<dyn SessionObserver>>>);
impl SessionNotifier {
	pub(crate) fn register(&self, observer: Arc<dyn SessionObserver>) {
		self.0.write().push(observer);
	}

	pub(crate) fn notify(&self) {
		let observers = self.0.read().clone();

		for observer in observers {
			observer.session_terminated();
		}
	}
}
impl Debug for SessionNotifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SessionNotifier")
			.field(&format!("{} observer(s)", self.0.read().len()))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	#[derive(Default)]
	struct Counter(AtomicUsize);
	impl SessionObserver for Counter {
		fn session_terminated(&self) {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[test]
	fn notify_reaches_every_observer() {
		let notifier = SessionNotifier::default();
		let first = Arc::new(Counter::default());
		let second = Arc::new(Counter::default());

		notifier.register(first.clone());
		notifier.register(second.clone());
		notifier.notify();
		notifier.notify();

		assert_eq!(first.0.load(Ordering::SeqCst), 2);
		assert_eq!(second.0.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn notify_without_observers_is_a_noop() {
		SessionNotifier::default().notify();
	}
}
