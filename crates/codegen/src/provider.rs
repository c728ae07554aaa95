//! Declaration provider seam.

use crate::diagnostic::Diagnostic;
use crate::error::ProviderError;
use crate::model::Declaration;

/// Declarations of one compilation unit plus provider-level diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
	pub declarations: Vec<Declaration>,
	pub diagnostics: Vec<Diagnostic>,
}

impl From<Vec<Declaration>> for DeclarationSet {
	fn from(declarations: Vec<Declaration>) -> Self {
		Self {
			declarations,
			diagnostics: Vec::new(),
		}
	}
}

/// Supplies type declarations with their resolved contract lists.
///
/// Declaration order must be stable for identical input; it becomes the
/// registration order of the generated wiring.
pub trait DeclarationProvider {
	fn declarations(&self) -> Result<DeclarationSet, ProviderError>;
}

impl DeclarationProvider for [Declaration] {
	fn declarations(&self) -> Result<DeclarationSet, ProviderError> {
		Ok(DeclarationSet::from(self.to_vec()))
	}
}

impl DeclarationProvider for Vec<Declaration> {
	fn declarations(&self) -> Result<DeclarationSet, ProviderError> {
		self.as_slice().declarations()
	}
}

impl DeclarationProvider for DeclarationSet {
	fn declarations(&self) -> Result<DeclarationSet, ProviderError> {
		Ok(self.clone())
	}
}
