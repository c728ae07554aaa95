//! Handler contract artifact.

use super::HEADER;
use crate::config::GeneratorConfig;

/// Renders the handler contract trait. Independent of discovered handlers.
pub fn emit_contract(config: &GeneratorConfig) -> String {
	let shape = config.shape();
	let name = shape.name();
	let rt = config.runtime_path();
	format!(
		r#"{HEADER}

/// Handles payloads of type `T` delivered by the generated broker.
///
/// Implementors also implement `Default`: the generated registration builds a
/// fresh instance for every resolution.
#[{rt}::async_trait]
pub trait {name}<T>: Send + Sync
where
	T: Send + Sync + 'static,
{{
	async fn handle(&self, message: &T, cancel: &{rt}::CancellationToken) -> {rt}::HandlerResult;
}}
"#
	)
}
