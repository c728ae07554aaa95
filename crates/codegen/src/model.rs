//! Host-agnostic declaration model consumed by the generation pipeline.
//!
//! A provider reduces whatever symbol graph it has into [`Declaration`]s carrying
//! their implemented contracts as [`ContractUse`]s. Paths are canonical
//! `::`-joined strings (`crate::events::OrderCreated`, `::chrono::Utc`, `u32`) so
//! that equality and ordering are plain string operations.

use std::fmt;
use std::path::PathBuf;

use rustc_hash::FxHashMap as HashMap;
use serde::{Serialize, Serializer};

/// Structural type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
	/// A named type with its generic arguments.
	Path { path: String, args: Vec<TypeRef> },
	/// A tuple type; the empty tuple is the unit type.
	Tuple(Vec<TypeRef>),
	/// An open generic parameter of the enclosing impl or trait.
	Param(String),
	/// A name the provider could not resolve.
	Unresolved(String),
	/// A type form payloads cannot take (references, trait objects, `str`, ...).
	Unsupported(String),
}

impl TypeRef {
	/// A path type without generic arguments.
	pub fn named(path: impl Into<String>) -> Self {
		Self::Path {
			path: path.into(),
			args: Vec::new(),
		}
	}

	/// A path type with generic arguments.
	pub fn generic(path: impl Into<String>, args: Vec<TypeRef>) -> Self {
		Self::Path { path: path.into(), args }
	}

	/// True when the reference is fully resolved and closed.
	pub fn is_concrete(&self) -> bool {
		match self {
			Self::Path { args, .. } | Self::Tuple(args) => args.iter().all(Self::is_concrete),
			Self::Param(_) | Self::Unresolved(_) | Self::Unsupported(_) => false,
		}
	}

	/// Replaces generic parameters found in `bindings`.
	pub fn substitute(&self, bindings: &HashMap<String, TypeRef>) -> TypeRef {
		match self {
			Self::Param(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
			Self::Path { path, args } => Self::Path {
				path: path.clone(),
				args: args.iter().map(|arg| arg.substitute(bindings)).collect(),
			},
			Self::Tuple(elems) => Self::Tuple(elems.iter().map(|elem| elem.substitute(bindings)).collect()),
			Self::Unresolved(_) | Self::Unsupported(_) => self.clone(),
		}
	}

	/// First path inside the reference, itself included, accepted by `pred`.
	pub fn find_path(&self, pred: &impl Fn(&str) -> bool) -> Option<&str> {
		match self {
			Self::Path { path, .. } if pred(path.as_str()) => Some(path.as_str()),
			Self::Path { args, .. } | Self::Tuple(args) => args.iter().find_map(|arg| arg.find_path(pred)),
			Self::Param(_) | Self::Unresolved(_) | Self::Unsupported(_) => None,
		}
	}

	/// First component preventing [`TypeRef::is_concrete`], if any.
	pub fn first_open(&self) -> Option<&TypeRef> {
		match self {
			Self::Path { args, .. } | Self::Tuple(args) => args.iter().find_map(Self::first_open),
			Self::Param(_) | Self::Unresolved(_) | Self::Unsupported(_) => Some(self),
		}
	}
}

impl fmt::Display for TypeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Path { path, args } => {
				f.write_str(path)?;
				if !args.is_empty() {
					f.write_str("<")?;
					write_list(f, args)?;
					f.write_str(">")?;
				}
				Ok(())
			}
			Self::Tuple(elems) => {
				f.write_str("(")?;
				write_list(f, elems)?;
				if elems.len() == 1 {
					f.write_str(",")?;
				}
				f.write_str(")")
			}
			Self::Param(name) | Self::Unresolved(name) | Self::Unsupported(name) => f.write_str(name),
		}
	}
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeRef]) -> fmt::Result {
	for (i, item) in items.iter().enumerate() {
		if i > 0 {
			f.write_str(", ")?;
		}
		write!(f, "{item}")?;
	}
	Ok(())
}

impl Serialize for TypeRef {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Source location of a declaration or contract use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Origin {
	pub file: PathBuf,
	pub line: usize,
}

impl Origin {
	pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
		Self { file: file.into(), line }
	}
}

impl fmt::Display for Origin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.file.display(), self.line)
	}
}

/// One implemented contract (or supertrait) of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractUse {
	/// Canonical path of the contract, without arguments.
	pub path: String,
	pub args: Vec<TypeRef>,
	pub origin: Option<Origin>,
}

impl ContractUse {
	pub fn new(path: impl Into<String>, args: Vec<TypeRef>) -> Self {
		Self {
			path: path.into(),
			args,
			origin: None,
		}
	}

	pub fn at(mut self, origin: Origin) -> Self {
		self.origin = Some(origin);
		self
	}
}

impl fmt::Display for ContractUse {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&TypeRef::generic(self.path.clone(), self.args.clone()), f)
	}
}

/// Declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
	Struct,
	Enum,
	Union,
	/// Interface-like declaration; never instantiable, but its contracts are
	/// inherited by everything implementing it.
	Trait,
}

impl DeclKind {
	pub const fn is_instantiable(self) -> bool {
		!matches!(self, Self::Trait)
	}
}

/// A type declaration with its resolved contract list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
	/// Canonical path, e.g. `crate::handlers::OrderCreatedHandler`.
	pub path: String,
	pub kind: DeclKind,
	/// Generic parameter names in declaration order; lifetimes keep their `'`.
	pub params: Vec<String>,
	pub contracts: Vec<ContractUse>,
	pub origin: Option<Origin>,
	/// False when the declaration cannot be named from the crate root, e.g. an
	/// item of a private module that is never re-exported.
	pub reachable: bool,
}

impl Declaration {
	pub fn new(path: impl Into<String>, kind: DeclKind) -> Self {
		Self {
			path: path.into(),
			kind,
			params: Vec::new(),
			contracts: Vec::new(),
			origin: None,
			reachable: true,
		}
	}

	pub fn with_params<I, S>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.params = params.into_iter().map(Into::into).collect();
		self
	}

	pub fn implementing(mut self, contract: ContractUse) -> Self {
		self.contracts.push(contract);
		self
	}

	pub fn at(mut self, origin: Origin) -> Self {
		self.origin = Some(origin);
		self
	}

	pub fn hidden(mut self) -> Self {
		self.reachable = false;
		self
	}

	/// True for instantiable kinds without generic parameters.
	pub fn is_concrete(&self) -> bool {
		self.kind.is_instantiable() && self.params.is_empty()
	}

	/// Type parameter names, skipping lifetimes.
	pub fn type_params(&self) -> impl Iterator<Item = &str> {
		self.params.iter().map(String::as_str).filter(|param| !param.starts_with('\''))
	}
}
