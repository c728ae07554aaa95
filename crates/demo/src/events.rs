//! Payload types.

use crate::log::ActivityLog;

#[derive(Debug, Clone)]
pub struct OrderCreated {
	pub id: u64,
	pub log: ActivityLog,
}

#[derive(Debug, Clone)]
pub struct UserCreated {
	pub name: String,
	pub log: ActivityLog,
}

#[derive(Debug, Clone)]
pub struct UserDeleted {
	pub name: String,
	pub log: ActivityLog,
}

/// No handler exists for this payload; the broker ignores it.
#[derive(Debug, Clone, Default)]
pub struct Heartbeat;
