use std::fmt;

use serde::Serialize;

use crate::model::Origin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Warning,
	Error,
}

/// What went wrong with one input item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
	/// A candidate uses the handler contract with an open, unresolved or
	/// unsupported payload argument.
	MalformedCandidate,
	/// A source file failed to parse and was skipped.
	UnparsableSource,
	/// A trait contract names a generic parameter count its declaration does not have.
	ArityMismatch,
}

/// Non-fatal problem collected during a generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
	pub severity: Severity,
	pub kind: DiagnosticKind,
	pub message: String,
	pub origin: Option<Origin>,
}

impl Diagnostic {
	pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
		Self {
			severity: Severity::Warning,
			kind,
			message: message.into(),
			origin: None,
		}
	}

	pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
		Self {
			severity: Severity::Error,
			..Self::warning(kind, message)
		}
	}

	pub fn at(mut self, origin: Option<Origin>) -> Self {
		self.origin = origin;
		self
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let level = match self.severity {
			Severity::Warning => "warning",
			Severity::Error => "error",
		};
		match &self.origin {
			Some(origin) => write!(f, "{level}: {origin}: {}", self.message),
			None => write!(f, "{level}: {}", self.message),
		}
	}
}
