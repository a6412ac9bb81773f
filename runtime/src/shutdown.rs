use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The sole cancellation signal shared by a session's concurrent tasks.
///
/// Every loop in the sender's three tasks, and the receiver's single loop,
/// checks this flag at its next suspension point rather than being torn
/// down externally. Cloning is cheap (an `Arc` around one `AtomicBool`) so
/// each task can hold its own handle.
#[derive(Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
	pub fn new() -> Self {
		Self::default()
	}

	#[inline]
	pub fn is_running(&self) -> bool {
		!self.0.load(Ordering::Relaxed)
	}

	#[inline]
	pub fn stop(&self) {
		self.0.store(true, Ordering::Relaxed);
	}

	/// Stops this session when Ctrl+C is received. Installs a process-wide
	/// signal handler, so this should be called at most once per binary.
	pub fn stop_on_ctrlc(&self) {
		let this = self.clone();
		if let Err(err) = ctrlc::set_handler(move || this.stop()) {
			log::warn!("Failed to install Ctrl+C handler: {err}");
		}
	}
}
