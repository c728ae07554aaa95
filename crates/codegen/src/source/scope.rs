//! Module scopes and canonical path resolution.

use std::collections::{BTreeSet, VecDeque};

use quote::ToTokens;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use syn::{GenericArgument, PathArguments, Type, UseTree, Visibility};

use crate::model::TypeRef;

/// Bounds import chains and glob lookups that refer back to themselves.
const MAX_DEPTH: usize = 16;

const PRIMITIVES: &[&str] = &[
	"bool", "char", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize", "f32",
	"f64",
];

fn prelude(name: &str) -> Option<&'static str> {
	Some(match name {
		"String" => "::std::string::String",
		"Vec" => "::std::vec::Vec",
		"Box" => "::std::boxed::Box",
		"Option" => "::core::option::Option",
		"Result" => "::core::result::Result",
		_ => return None,
	})
}

/// A `use` path as written, before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct UsePath {
	pub absolute: bool,
	pub segments: Vec<String>,
}

impl UsePath {
	fn join(&self, segment: impl ToString) -> Self {
		let mut segments = self.segments.clone();
		segments.push(segment.to_string());
		Self {
			absolute: self.absolute,
			segments,
		}
	}
}

/// Names visible in one module.
#[derive(Debug, Default)]
pub(super) struct Scope {
	/// Types, traits, aliases and submodules declared in the module.
	pub items: HashSet<String>,
	/// `use` bindings by local name.
	pub imports: HashMap<String, UsePath>,
	pub globs: Vec<UsePath>,
	/// Items and imports that can be named from anywhere in the crate.
	pub exported: HashSet<String>,
	/// Glob imports re-exported to the whole crate.
	pub exported_globs: Vec<UsePath>,
}

impl Scope {
	pub fn add_item(&mut self, name: String, exported: bool) {
		if exported {
			self.exported.insert(name.clone());
		}
		self.items.insert(name);
	}

	/// Records a `use` tree; `exported` when the `use` item itself is visible
	/// to the whole crate.
	pub fn add_use(&mut self, tree: &UseTree, prefix: &UsePath, exported: bool) {
		match tree {
			UseTree::Path(path) => self.add_use(&path.tree, &prefix.join(&path.ident), exported),
			UseTree::Name(name) if name.ident == "self" => {
				if let Some(last) = prefix.segments.last() {
					self.import(last.clone(), prefix.clone(), exported);
				}
			}
			UseTree::Name(name) => self.import(name.ident.to_string(), prefix.join(&name.ident), exported),
			UseTree::Rename(rename) if rename.rename == "_" => {}
			UseTree::Rename(rename) => {
				let target = if rename.ident == "self" {
					prefix.clone()
				} else {
					prefix.join(&rename.ident)
				};
				self.import(rename.rename.to_string(), target, exported);
			}
			UseTree::Glob(_) => {
				if exported {
					self.exported_globs.push(prefix.clone());
				}
				self.globs.push(prefix.clone());
			}
			UseTree::Group(group) => {
				for item in &group.items {
					self.add_use(item, prefix, exported);
				}
			}
		}
	}

	fn import(&mut self, name: String, target: UsePath, exported: bool) {
		if exported {
			self.exported.insert(name.clone());
		}
		self.imports.insert(name, target);
	}

	fn declares(&self, name: &str) -> bool {
		self.items.contains(name) || self.imports.contains_key(name)
	}
}

/// True when an item declared in `module` with `vis` can be named from
/// anywhere in the crate.
pub(super) fn crate_visible(module: &str, vis: &Visibility) -> bool {
	match vis {
		Visibility::Public(_) => true,
		Visibility::Restricted(restricted) => {
			let path = &restricted.path;
			if path.is_ident("crate") {
				true
			} else if path.is_ident("super") {
				module.rsplit_once("::").is_some_and(|(parent, _)| parent == "crate")
			} else {
				path.is_ident("self") && module == "crate"
			}
		}
		Visibility::Inherited => module == "crate",
	}
}

/// Where a type expression appears: its module, the generic parameters in
/// scope, and what `Self` stands for.
pub(super) struct TypeContext<'a> {
	pub module: &'a str,
	pub params: &'a [String],
	pub self_ty: Option<&'a TypeRef>,
}

/// Resolves paths written in a module to canonical form.
pub(super) struct Scopes<'a> {
	modules: &'a HashMap<String, Scope>,
}

impl<'a> Scopes<'a> {
	pub fn new(modules: &'a HashMap<String, Scope>) -> Self {
		Self { modules }
	}

	/// Canonical form of `path` as written in `module`, or `None` for a single
	/// name that is neither declared, imported, prelude nor primitive.
	pub fn resolve_path(&self, module: &str, path: &syn::Path) -> Option<String> {
		let segments: Vec<String> = path.segments.iter().map(|segment| segment.ident.to_string()).collect();
		let resolved = if path.leading_colon.is_some() {
			Some(extern_path(&segments))
		} else {
			self.resolve_segments(module, &segments, 0)
		};
		resolved.map(|path| self.canonicalize(path))
	}

	pub fn resolve_type(&self, cx: &TypeContext<'_>, ty: &Type) -> TypeRef {
		match ty {
			Type::Paren(inner) => self.resolve_type(cx, &inner.elem),
			Type::Group(inner) => self.resolve_type(cx, &inner.elem),
			Type::Tuple(tuple) => TypeRef::Tuple(tuple.elems.iter().map(|elem| self.resolve_type(cx, elem)).collect()),
			Type::Path(ty) if ty.qself.is_none() => {
				let path = &ty.path;
				if let Some(ident) = path.get_ident() {
					if ident == "str" {
						return TypeRef::Unsupported("str".into());
					}
					if ident == "Self" {
						return cx.self_ty.cloned().unwrap_or_else(|| TypeRef::Unresolved("Self".into()));
					}
					let name = ident.to_string();
					if cx.params.contains(&name) {
						return TypeRef::Param(name);
					}
				}
				match self.resolve_path(cx.module, path) {
					Some(canonical) => TypeRef::generic(canonical, self.resolve_args(cx, path)),
					None => TypeRef::Unresolved(tokens(ty)),
				}
			}
			other => TypeRef::Unsupported(tokens(other)),
		}
	}

	/// Type arguments of the last segment of `path`; lifetimes are dropped.
	pub fn resolve_args(&self, cx: &TypeContext<'_>, path: &syn::Path) -> Vec<TypeRef> {
		let Some(PathArguments::AngleBracketed(args)) = path.segments.last().map(|segment| &segment.arguments) else {
			return Vec::new();
		};
		args.args
			.iter()
			.filter_map(|arg| match arg {
				GenericArgument::Lifetime(_) => None,
				GenericArgument::Type(ty) => Some(self.resolve_type(cx, ty)),
				other => Some(TypeRef::Unsupported(tokens(other))),
			})
			.collect()
	}

	fn resolve_segments(&self, module: &str, segments: &[String], depth: usize) -> Option<String> {
		if depth > MAX_DEPTH {
			return None;
		}
		let (first, rest) = segments.split_first()?;
		if matches!(first.as_str(), "crate" | "self" | "super") {
			return relative(module, segments);
		}

		if let Some(scope) = self.modules.get(module) {
			if scope.items.contains(first) {
				return Some(join(module, segments));
			}
			if let Some(target) = scope.imports.get(first) {
				let base = self.resolve_use(module, target, depth + 1)?;
				return Some(join(&base, rest));
			}
			for glob in &scope.globs {
				let Some(source) = self.resolve_use(module, glob, depth + 1).map(|path| self.canonicalize(path)) else {
					continue;
				};
				if source != module && self.modules.get(&source).is_some_and(|scope| scope.declares(first)) {
					return self.resolve_segments(&source, segments, depth + 1);
				}
			}
		}

		if rest.is_empty() {
			if let Some(path) = prelude(first) {
				return Some(path.to_string());
			}
			return PRIMITIVES.contains(&first.as_str()).then(|| first.clone());
		}
		Some(extern_path(segments))
	}

	/// Resolves a `use` path. Unknown leading names are extern crates.
	fn resolve_use(&self, module: &str, target: &UsePath, depth: usize) -> Option<String> {
		if depth > MAX_DEPTH {
			return None;
		}
		if target.absolute {
			return Some(extern_path(&target.segments));
		}
		let (first, rest) = target.segments.split_first()?;
		if matches!(first.as_str(), "crate" | "self" | "super") {
			return relative(module, &target.segments);
		}
		if let Some(scope) = self.modules.get(module) {
			if scope.items.contains(first) {
				return Some(join(module, &target.segments));
			}
			if let Some(inner) = scope.imports.get(first)
				&& inner != target
			{
				let base = self.resolve_use(module, inner, depth + 1)?;
				return Some(join(&base, rest));
			}
		}
		Some(extern_path(&target.segments))
	}

	/// Follows re-exports until `path` names a declared item or leaves the
	/// scanned tree.
	fn canonicalize(&self, mut path: String) -> String {
		for _ in 0..MAX_DEPTH {
			let Some((parent, name)) = path.rsplit_once("::") else {
				break;
			};
			let Some(scope) = self.modules.get(parent) else {
				break;
			};
			if scope.items.contains(name) {
				break;
			}
			let next = match scope.imports.get(name) {
				Some(target) => self.resolve_use(parent, target, 0),
				None => scope
					.globs
					.iter()
					.filter_map(|glob| self.resolve_use(parent, glob, 0))
					.find(|source| self.modules.get(source).is_some_and(|scope| scope.items.contains(name)))
					.map(|source| join(&source, &[name.to_string()])),
			};
			match next {
				Some(next) if next != path => path = next,
				_ => break,
			}
		}
		path
	}

	/// Maps canonical paths of crate items to a path that names them from
	/// anywhere in the crate.
	///
	/// An item keeps its canonical path when every module on it is visible.
	/// Otherwise the shortest chain of crate-visible re-exports from the root
	/// is used. Items with neither are absent.
	pub fn public_paths(&self) -> HashMap<String, String> {
		let mut paths: HashMap<String, String> = HashMap::default();
		let mut visited: HashSet<String> = HashSet::default();
		visited.insert("crate".to_string());
		let mut queue = VecDeque::from([("crate".to_string(), "crate".to_string())]);
		while let Some((module, public)) = queue.pop_front() {
			for name in self.exported_names(&module) {
				let canonical = self.canonicalize(join(&module, std::slice::from_ref(&name)));
				if !canonical.starts_with("crate::") {
					continue;
				}
				let via = join(&public, &[name]);
				if self.modules.contains_key(&canonical) && visited.insert(canonical.clone()) {
					queue.push_back((canonical.clone(), via.clone()));
				}
				paths.entry(canonical).or_insert(via);
			}
		}
		for (canonical, via) in paths.iter_mut() {
			if self.directly_visible(canonical) {
				via.clone_from(canonical);
			}
		}
		paths
	}

	/// Crate-visible names bound in `module`, including names brought in by
	/// re-exported globs, sorted.
	fn exported_names(&self, module: &str) -> BTreeSet<String> {
		let Some(scope) = self.modules.get(module) else {
			return BTreeSet::new();
		};
		let mut names: BTreeSet<String> = scope.exported.iter().cloned().collect();
		for glob in &scope.exported_globs {
			let Some(source) = self.resolve_use(module, glob, 0).map(|path| self.canonicalize(path)) else {
				continue;
			};
			if source != module
				&& let Some(globbed) = self.modules.get(&source)
			{
				names.extend(globbed.exported.iter().cloned());
			}
		}
		names
	}

	/// True when every segment of `path` is an item declared crate-visible in
	/// its parent module.
	fn directly_visible(&self, path: &str) -> bool {
		let mut segments = path.split("::");
		if segments.next() != Some("crate") {
			return false;
		}
		let mut module = String::from("crate");
		for segment in segments {
			let Some(scope) = self.modules.get(&module) else {
				return false;
			};
			if !scope.items.contains(segment) || !scope.exported.contains(segment) {
				return false;
			}
			module.push_str("::");
			module.push_str(segment);
		}
		true
	}
}

/// Resolves a path starting with `crate`, `self` or `super`.
fn relative(module: &str, segments: &[String]) -> Option<String> {
	let (first, rest) = segments.split_first()?;
	match first.as_str() {
		"crate" => Some(join("crate", rest)),
		"self" => Some(join(module, rest)),
		"super" => {
			let (parent, _) = module.rsplit_once("::")?;
			match rest.first().map(String::as_str) {
				Some("super") => relative(parent, rest),
				_ => Some(join(parent, rest)),
			}
		}
		_ => None,
	}
}

fn join(base: &str, segments: &[String]) -> String {
	let mut path = base.to_string();
	for segment in segments {
		path.push_str("::");
		path.push_str(segment);
	}
	path
}

fn extern_path(segments: &[String]) -> String {
	join("", segments)
}

fn tokens(node: &impl ToTokens) -> String {
	node.to_token_stream().to_string()
}
