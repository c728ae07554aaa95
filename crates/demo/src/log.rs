use std::sync::{Arc, Mutex, PoisonError};

/// Shared, append-only record of handler activity carried by payloads.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog(Arc<Mutex<Vec<String>>>);

impl ActivityLog {
	pub fn record(&self, entry: impl Into<String>) {
		self.0.lock().unwrap_or_else(PoisonError::into_inner).push(entry.into());
	}

	pub fn entries(&self) -> Vec<String> {
		self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}
}
