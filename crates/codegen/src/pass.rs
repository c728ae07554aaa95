//! One generation pass: scan, resolve, aggregate, emit.

use crate::config::GeneratorConfig;
use crate::diagnostic::{Diagnostic, Severity};
use crate::emit::Artifacts;
use crate::error::GenerateError;
use crate::provider::DeclarationProvider;
use crate::registry::{HandlerInfo, HandlerRegistry};
use crate::resolve::ContractResolver;
use crate::scan::scan;

/// Result of a generation pass.
#[derive(Debug, Clone)]
pub struct Generation {
	pub registry: HandlerRegistry,
	pub artifacts: Artifacts,
	/// Non-fatal problems: provider diagnostics first, then resolver
	/// diagnostics in candidate order.
	pub diagnostics: Vec<Diagnostic>,
}

impl Generation {
	pub fn has_errors(&self) -> bool {
		self.diagnostics.iter().any(|diagnostic| diagnostic.severity == Severity::Error)
	}
}

/// Runs a full pass over the declarations supplied by `provider`.
///
/// Nothing is carried over between calls. Fails only when the configuration is
/// invalid or the provider cannot supply declarations at all; malformed
/// candidates and unparsable inputs become diagnostics.
pub fn generate<P>(provider: &P, config: &GeneratorConfig) -> Result<Generation, GenerateError>
where
	P: DeclarationProvider + ?Sized,
{
	config.validate()?;
	let set = provider.declarations()?;
	let shape = config.shape();
	let resolver = ContractResolver::new(&shape, &set.declarations);

	let mut diagnostics = set.diagnostics.clone();
	let candidates = scan(&set.declarations);
	let mut handlers = Vec::new();
	for candidate in &candidates {
		let resolution = resolver.resolve(candidate);
		diagnostics.extend(resolution.diagnostics);
		match HandlerInfo::from_bindings(&candidate.path, &resolution.bindings) {
			Some(handler) => {
				tracing::trace!(implementation = %handler.implementation, payloads = handler.payloads.len(), "found handler");
				handlers.push(handler);
			}
			None => tracing::trace!(candidate = %candidate.path, "no handler contract"),
		}
	}

	let registry = HandlerRegistry::collect(handlers);
	for diagnostic in &diagnostics {
		tracing::warn!(%diagnostic, "generation diagnostic");
	}
	tracing::debug!(
		declarations = set.declarations.len(),
		candidates = candidates.len(),
		handlers = registry.handlers.len(),
		payload_types = registry.payload_types.len(),
		diagnostics = diagnostics.len(),
		"generation pass complete"
	);

	let artifacts = Artifacts::emit(config, &registry);
	Ok(Generation {
		registry,
		artifacts,
		diagnostics,
	})
}
