//! Contract resolution: candidate declaration → payload bindings.

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::model::{ContractUse, DeclKind, Declaration, TypeRef};

/// Canonical handler contract every candidate is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractShape {
	/// Canonical path of the contract, e.g. `crate::bus::Handler`.
	pub path: String,
	/// Number of type parameters; the payload type is the first.
	pub arity: usize,
}

impl ContractShape {
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into(), arity: 1 }
	}

	/// Last path segment, used as the emitted trait name.
	pub fn name(&self) -> &str {
		self.path.rsplit("::").next().unwrap_or(&self.path)
	}

	/// Path-and-arity equality, ignoring argument values.
	pub fn matches(&self, contract: &ContractUse) -> bool {
		contract.path == self.path && contract.args.len() == self.arity
	}
}

/// A discovered (payload type, implementing type) association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
	pub payload: TypeRef,
	pub implementation: String,
}

/// Bindings and diagnostics for one candidate.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
	pub bindings: Vec<Binding>,
	pub diagnostics: Vec<Diagnostic>,
}

/// Matches candidates' transitive contract sets against a [`ContractShape`].
///
/// Trait declarations are indexed so that contracts reached through
/// supertraits are found with the trait's parameters substituted.
pub struct ContractResolver<'a> {
	shape: &'a ContractShape,
	traits: HashMap<&'a str, &'a Declaration>,
	hidden: HashSet<&'a str>,
}

impl<'a> ContractResolver<'a> {
	pub fn new(shape: &'a ContractShape, declarations: &'a [Declaration]) -> Self {
		let traits = declarations
			.iter()
			.filter(|decl| decl.kind == DeclKind::Trait)
			.map(|decl| (decl.path.as_str(), decl))
			.collect();
		let hidden = declarations
			.iter()
			.filter(|decl| !decl.reachable)
			.map(|decl| decl.path.as_str())
			.collect();
		Self { shape, traits, hidden }
	}

	/// Resolves one candidate. Candidates without a matching contract yield an
	/// empty resolution.
	pub fn resolve(&self, candidate: &Declaration) -> Resolution {
		let mut resolution = Resolution::default();
		let mut visited = HashSet::default();
		self.walk(candidate, &candidate.contracts, &HashMap::default(), &mut visited, &mut resolution);
		resolution
	}

	/// Why a binding of `candidate` to `payload` could not be emitted, if it
	/// cannot.
	fn unusable(&self, candidate: &Declaration, payload: &TypeRef) -> Option<String> {
		if let Some(open) = payload.first_open() {
			let reason = match open {
				TypeRef::Param(_) => "an open generic",
				TypeRef::Unresolved(_) => "an unresolved",
				_ => "an unsupported",
			};
			return Some(format!("the payload has {reason} type `{open}`"));
		}
		if !candidate.reachable {
			return Some("the implementation is not reachable from the crate root".to_string());
		}
		payload
			.find_path(&|path| self.hidden.contains(path))
			.map(|path| format!("payload type `{path}` is not reachable from the crate root"))
	}

	fn walk(
		&self,
		candidate: &Declaration,
		uses: &[ContractUse],
		bindings: &HashMap<String, TypeRef>,
		visited: &mut HashSet<String>,
		out: &mut Resolution,
	) {
		for contract in uses {
			let args: Vec<TypeRef> = contract.args.iter().map(|arg| arg.substitute(bindings)).collect();

			if self.shape.matches(contract) {
				let payload = &args[0];
				match self.unusable(candidate, payload) {
					None => out.bindings.push(Binding {
						payload: payload.clone(),
						implementation: candidate.path.clone(),
					}),
					Some(problem) => {
						let message = format!(
							"`{}` implements `{}<{payload}>` but {problem}; binding skipped",
							candidate.path, self.shape.path
						);
						out.diagnostics.push(
							Diagnostic::warning(DiagnosticKind::MalformedCandidate, message)
								.at(contract.origin.clone().or_else(|| candidate.origin.clone())),
						);
					}
				}
				continue;
			}
			if contract.path == self.shape.path {
				tracing::trace!(candidate = %candidate.path, args = args.len(), "contract path matched with different arity");
				continue;
			}

			let Some(parent) = self.traits.get(contract.path.as_str()) else {
				continue;
			};
			if !visited.insert(TypeRef::generic(contract.path.clone(), args.clone()).to_string()) {
				continue;
			}
			let params: Vec<&str> = parent.type_params().collect();
			if params.len() != args.len() {
				let message = format!(
					"`{}` uses `{}` with {} type argument(s), but it declares {}",
					candidate.path,
					parent.path,
					args.len(),
					params.len()
				);
				out.diagnostics
					.push(Diagnostic::warning(DiagnosticKind::ArityMismatch, message).at(contract.origin.clone()));
				continue;
			}
			let inner: HashMap<String, TypeRef> = params.into_iter().map(String::from).zip(args).collect();
			self.walk(candidate, &parent.contracts, &inner, visited, out);
		}
	}
}
