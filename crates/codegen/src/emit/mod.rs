//! Textual artifact synthesis.
//!
//! Each emitter renders one file from the configuration and the immutable
//! [`HandlerRegistry`]. Output depends only on its inputs; identical input is
//! rendered byte for byte identically.

mod contract;
mod dispatch;
mod registration;

pub use contract::emit_contract;
pub use dispatch::emit_broker;
pub use registration::emit_registration;

use crate::config::GeneratorConfig;
use crate::registry::HandlerRegistry;

/// First line of every generated file.
pub const HEADER: &str = "// @generated by tinybus-codegen. Do not edit.";

pub const CONTRACT_FILE: &str = "handler.rs";
pub const BROKER_FILE: &str = "broker.rs";
pub const REGISTRATION_FILE: &str = "registration.rs";

/// The three generated files of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
	pub contract: String,
	pub broker: String,
	pub registration: String,
}

impl Artifacts {
	pub fn emit(config: &GeneratorConfig, registry: &HandlerRegistry) -> Self {
		Self {
			contract: emit_contract(config),
			broker: emit_broker(config, &registry.payload_types),
			registration: emit_registration(config, &registry.handlers),
		}
	}

	/// `(file name, contents)` pairs in include order.
	pub fn files(&self) -> [(&'static str, &str); 3] {
		[
			(CONTRACT_FILE, &self.contract),
			(BROKER_FILE, &self.broker),
			(REGISTRATION_FILE, &self.registration),
		]
	}
}
