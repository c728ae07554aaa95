//! Handler aggregation.
//!
//! Folds per-candidate resolutions into [`HandlerInfo`] records and the global
//! payload-type set. Records keep discovery order; payload types are ordered by
//! their canonical text so that the emitted artifacts do not depend on hash
//! iteration order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::TypeRef;
use crate::resolve::Binding;

/// One implementing type with the payload types it handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerInfo {
	pub implementation: String,
	/// Ordered-unique, first-seen order. Never empty.
	pub payloads: Vec<TypeRef>,
}

impl HandlerInfo {
	/// Builds a record, dropping repeated payloads. Returns `None` when
	/// `payloads` is empty.
	pub fn new(implementation: impl Into<String>, payloads: impl IntoIterator<Item = TypeRef>) -> Option<Self> {
		let mut unique: Vec<TypeRef> = Vec::new();
		for payload in payloads {
			if !unique.contains(&payload) {
				unique.push(payload);
			}
		}
		if unique.is_empty() {
			return None;
		}
		Some(Self {
			implementation: implementation.into(),
			payloads: unique,
		})
	}

	/// Builds a record from one candidate's bindings.
	pub fn from_bindings(implementation: impl Into<String>, bindings: &[Binding]) -> Option<Self> {
		Self::new(implementation, bindings.iter().map(|binding| binding.payload.clone()))
	}
}

/// Aggregated output of one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HandlerRegistry {
	pub handlers: Vec<HandlerInfo>,
	pub payload_types: Vec<TypeRef>,
}

impl HandlerRegistry {
	/// Collects records in the given order and derives the payload-type set.
	///
	/// Two records naming the same payload type stay separate; only the
	/// payload-type set is deduplicated.
	pub fn collect(handlers: impl IntoIterator<Item = HandlerInfo>) -> Self {
		let handlers: Vec<HandlerInfo> = handlers.into_iter().collect();
		let mut seen = BTreeMap::new();
		for payload in handlers.iter().flat_map(|handler| &handler.payloads) {
			seen.entry(payload.to_string()).or_insert_with(|| payload.clone());
		}
		Self {
			handlers,
			payload_types: seen.into_values().collect(),
		}
	}

	/// Every (implementation, payload) pair in registration order.
	pub fn bindings(&self) -> impl Iterator<Item = (&str, &TypeRef)> {
		self.handlers.iter().flat_map(|handler| {
			handler
				.payloads
				.iter()
				.map(move |payload| (handler.implementation.as_str(), payload))
		})
	}

	/// Implementations bound to `payload`, in registration order.
	pub fn handlers_of<'a>(&'a self, payload: &'a TypeRef) -> impl Iterator<Item = &'a str> + 'a {
		self.bindings()
			.filter(move |(_, bound)| *bound == payload)
			.map(|(implementation, _)| implementation)
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}

	/// Pretty JSON manifest of the registry.
	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn info(implementation: &str, payloads: &[&str]) -> HandlerInfo {
		HandlerInfo::new(implementation, payloads.iter().map(|p| TypeRef::named(*p))).unwrap()
	}

	fn names(types: &[TypeRef]) -> Vec<String> {
		types.iter().map(ToString::to_string).collect()
	}

	#[test]
	fn empty_records_are_dropped() {
		assert!(HandlerInfo::new("crate::H", []).is_none());
	}

	#[test]
	fn repeated_payloads_keep_first_seen_order() {
		let record = HandlerInfo::new(
			"crate::H",
			["crate::B", "crate::A", "crate::B"].into_iter().map(TypeRef::named),
		)
		.unwrap();
		assert_eq!(names(&record.payloads), ["crate::B", "crate::A"]);
	}

	#[test]
	fn shared_payload_keeps_both_implementations() {
		let registry = HandlerRegistry::collect([
			info("crate::OrderCreatedHandler", &["crate::OrderCreated"]),
			info("crate::OrderCreatedAuditHandler", &["crate::OrderCreated"]),
		]);
		assert_eq!(registry.handlers.len(), 2);
		assert_eq!(names(&registry.payload_types), ["crate::OrderCreated"]);
		let order_created = TypeRef::named("crate::OrderCreated");
		assert_eq!(
			registry.handlers_of(&order_created).collect::<Vec<_>>(),
			["crate::OrderCreatedHandler", "crate::OrderCreatedAuditHandler"]
		);
	}

	#[test]
	fn payload_set_is_sorted_by_canonical_name() {
		let registry = HandlerRegistry::collect([
			info("crate::Z", &["crate::b::Msg", "u8"]),
			info("crate::A", &["crate::a::Msg"]),
		]);
		assert_eq!(names(&registry.payload_types), ["crate::a::Msg", "crate::b::Msg", "u8"]);
	}

	#[test]
	fn bindings_follow_record_order() {
		let registry = HandlerRegistry::collect([
			info("crate::Users", &["crate::UserCreated", "crate::UserDeleted"]),
			info("crate::Audit", &["crate::UserCreated"]),
		]);
		let pairs: Vec<(String, String)> = registry
			.bindings()
			.map(|(implementation, payload)| (implementation.to_string(), payload.to_string()))
			.collect();
		assert_eq!(
			pairs,
			[
				("crate::Users".to_string(), "crate::UserCreated".to_string()),
				("crate::Users".to_string(), "crate::UserDeleted".to_string()),
				("crate::Audit".to_string(), "crate::UserCreated".to_string()),
			]
		);
	}

	#[test]
	fn manifest_serializes_type_names() {
		let registry = HandlerRegistry::collect([info("crate::H", &["crate::Msg"])]);
		let json: serde_json::Value = serde_json::from_str(&registry.to_json().unwrap()).unwrap();
		assert_eq!(json["handlers"][0]["implementation"], "crate::H");
		assert_eq!(json["handlers"][0]["payloads"][0], "crate::Msg");
		assert_eq!(json["payload_types"][0], "crate::Msg");
	}
}
