//! Declaration provider over a tree of Rust source files.
//!
//! The module tree is followed from `lib.rs` (or `main.rs`) through `mod`
//! items, honouring `#[path]`; files no module declares are not part of the
//! crate and are skipped. Each file is parsed with `syn` and read in two
//! phases. The first records, per module, the names it declares and imports
//! with their visibility, together with the raw struct, enum, union, trait and
//! `impl Trait for Type` items. The second resolves every path against those
//! scopes, attaches each trait impl to the declaration it targets, and renames
//! items of private modules to the re-export that makes them nameable.
//!
//! Only what is visible in source is seen: items produced by macros, and impls
//! whose self type is declared outside the tree, are not reported.

mod scope;

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use syn::{Attribute, GenericParam, Generics, Item, TraitBoundModifier, TypeParamBound, Visibility};
use walkdir::WalkDir;

use self::scope::{Scope, Scopes, TypeContext, UsePath, crate_visible};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::ProviderError;
use crate::model::{ContractUse, DeclKind, Declaration, Origin, TypeRef};
use crate::provider::{DeclarationProvider, DeclarationSet};

/// Source directory of one crate, usually `<manifest>/src`.
#[derive(Debug, Clone)]
pub struct SourceTree {
	root: PathBuf,
}

impl SourceTree {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Files of the crate's module tree, sorted.
	pub fn files(&self) -> Result<Vec<PathBuf>, ProviderError> {
		Ok(self.load()?.into_iter().map(|file| file.path).collect())
	}

	/// `lib.rs`, or `main.rs` for a binary-only crate.
	fn crate_root(&self) -> Option<PathBuf> {
		["lib.rs", "main.rs"]
			.into_iter()
			.map(|name| self.root.join(name))
			.find(|path| path.is_file())
	}

	/// Reads and parses every file reachable from the crate root through `mod`
	/// items. Files under the source root that no module declares are skipped.
	fn load(&self) -> Result<Vec<SourceFile>, ProviderError> {
		if !self.root.is_dir() {
			return Err(ProviderError::MissingRoot(self.root.clone()));
		}
		let mut files = Vec::new();
		let Some(entry) = self.crate_root() else {
			tracing::debug!(root = %self.root.display(), "no lib.rs or main.rs");
			return Ok(files);
		};
		let mut pending = vec![ModuleFile {
			path: entry,
			module: "crate".to_string(),
			owns_dir: true,
		}];
		let mut seen = HashSet::default();
		while let Some(next) = pending.pop() {
			if !seen.insert(next.path.clone()) {
				continue;
			}
			let text = fs::read_to_string(&next.path).map_err(|source| ProviderError::Io {
				path: next.path.clone(),
				source,
			})?;
			let parsed = syn::parse_file(&text);
			if let Ok(parsed) = &parsed {
				let file_dir = next.path.parent().unwrap_or(&self.root).to_path_buf();
				let dir = match next.path.file_stem() {
					Some(stem) if !next.owns_dir => file_dir.join(stem),
					_ => file_dir.clone(),
				};
				declared_modules(&parsed.items, &next.module, &dir, Some(&file_dir), &mut pending);
			}
			files.push(SourceFile {
				path: next.path,
				module: next.module,
				parsed,
			});
		}
		files.sort_by(|a, b| a.path.cmp(&b.path));

		for entry in WalkDir::new(&self.root).sort_by_file_name() {
			let entry = entry?;
			let path = entry.path();
			if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "rs") && !seen.contains(path) {
				tracing::trace!(file = %path.display(), "skipping file no module declares");
			}
		}
		Ok(files)
	}
}

impl DeclarationProvider for SourceTree {
	fn declarations(&self) -> Result<DeclarationSet, ProviderError> {
		let mut collector = Collector::default();
		for file in self.load()? {
			match file.parsed {
				Ok(parsed) => collector.collect_items(&file.module, &parsed.items, &file.path),
				Err(err) => {
					tracing::debug!(file = %file.path.display(), %err, "skipping unparsable source");
					let origin = Origin::new(&file.path, line(err.span()));
					collector.diagnostics.push(
						Diagnostic::error(DiagnosticKind::UnparsableSource, format!("failed to parse source: {err}"))
							.at(Some(origin)),
					);
				}
			}
		}
		Ok(collector.finish())
	}
}

/// A file of the module tree waiting to be read.
struct ModuleFile {
	path: PathBuf,
	module: String,
	/// Whether child modules live next to the file (`lib.rs`, `mod.rs`,
	/// `#[path]` targets) rather than in a directory named after it.
	owns_dir: bool,
}

struct SourceFile {
	path: PathBuf,
	module: String,
	parsed: syn::Result<syn::File>,
}

/// Queues the files of the out-of-line modules declared in `items`.
///
/// `dir` is where child module files of `module` live. `file_dir` is the
/// directory of the file itself and is `None` inside inline modules, where
/// `#[path]` is relative to `dir` instead.
fn declared_modules(
	items: &[Item],
	module: &str,
	dir: &Path,
	file_dir: Option<&Path>,
	pending: &mut Vec<ModuleFile>,
) {
	for item in items {
		let Item::Mod(item) = item else {
			continue;
		};
		if is_cfg_test(&item.attrs) {
			continue;
		}
		let name = item.ident.to_string();
		let child = format!("{module}::{name}");
		let path_attr = path_attr(&item.attrs);
		if let Some((_, content)) = &item.content {
			let inner = dir.join(path_attr.unwrap_or_else(|| PathBuf::from(&name)));
			declared_modules(content, &child, &inner, None, pending);
			continue;
		}
		let flat = dir.join(format!("{name}.rs"));
		let (path, owns_dir) = match path_attr {
			Some(path) => (file_dir.unwrap_or(dir).join(path), true),
			None if flat.is_file() => (flat, false),
			None => (dir.join(&name).join("mod.rs"), true),
		};
		if path.is_file() {
			pending.push(ModuleFile {
				path,
				module: child,
				owns_dir,
			});
		} else {
			tracing::trace!(module = %child, path = %path.display(), "module file not found");
		}
	}
}

/// Value of a `#[path = "..."]` attribute.
fn path_attr(attrs: &[Attribute]) -> Option<PathBuf> {
	attrs.iter().find_map(|attr| match &attr.meta {
		syn::Meta::NameValue(meta) if meta.path.is_ident("path") => match &meta.value {
			syn::Expr::Lit(syn::ExprLit {
				lit: syn::Lit::Str(value),
				..
			}) => Some(PathBuf::from(value.value())),
			_ => None,
		},
		_ => None,
	})
}

struct RawDecl {
	module: String,
	name: String,
	kind: DeclKind,
	params: Vec<String>,
	supertraits: Vec<syn::Path>,
	origin: Origin,
}

struct RawImpl {
	module: String,
	params: Vec<String>,
	contract: syn::Path,
	self_ty: syn::Type,
	origin: Origin,
}

#[derive(Default)]
struct Collector {
	scopes: HashMap<String, Scope>,
	decls: Vec<RawDecl>,
	impls: Vec<RawImpl>,
	diagnostics: Vec<Diagnostic>,
}

impl Collector {
	fn collect_items(&mut self, module: &str, items: &[Item], file: &Path) {
		self.scopes.entry(module.to_string()).or_default();
		for item in items {
			if is_cfg_test(item_attrs(item)) {
				continue;
			}
			match item {
				Item::Struct(item) => {
					self.declare(module, &item.ident, &item.vis, DeclKind::Struct, &item.generics, file);
				}
				Item::Enum(item) => {
					self.declare(module, &item.ident, &item.vis, DeclKind::Enum, &item.generics, file);
				}
				Item::Union(item) => {
					self.declare(module, &item.ident, &item.vis, DeclKind::Union, &item.generics, file);
				}
				Item::Trait(item) => {
					let supertraits = item
						.supertraits
						.iter()
						.filter_map(|bound| match bound {
							TypeParamBound::Trait(bound) if matches!(bound.modifier, TraitBoundModifier::None) => {
								Some(bound.path.clone())
							}
							_ => None,
						})
						.collect();
					self.declare(module, &item.ident, &item.vis, DeclKind::Trait, &item.generics, file)
						.supertraits = supertraits;
				}
				Item::Type(item) => self.bind(module, &item.ident, &item.vis),
				Item::Mod(item) => {
					self.bind(module, &item.ident, &item.vis);
					if let Some((_, content)) = &item.content {
						self.collect_items(&format!("{module}::{}", item.ident), content, file);
					}
				}
				Item::Use(item) => {
					let prefix = UsePath {
						absolute: item.leading_colon.is_some(),
						segments: Vec::new(),
					};
					let exported = crate_visible(module, &item.vis);
					self.scope(module).add_use(&item.tree, &prefix, exported);
				}
				Item::ExternCrate(item) => {
					let alias = item.rename.as_ref().map_or(&item.ident, |(_, rename)| rename);
					let target = UsePath {
						absolute: true,
						segments: vec![item.ident.to_string()],
					};
					self.scope(module).imports.insert(alias.to_string(), target);
				}
				Item::Impl(item) => {
					let Some((None, contract, _)) = &item.trait_ else {
						continue;
					};
					self.impls.push(RawImpl {
						module: module.to_string(),
						params: param_names(&item.generics),
						contract: contract.clone(),
						self_ty: (*item.self_ty).clone(),
						origin: Origin::new(file, line(item.impl_token.span)),
					});
				}
				_ => {}
			}
		}
	}

	fn scope(&mut self, module: &str) -> &mut Scope {
		self.scopes.entry(module.to_string()).or_default()
	}

	fn bind(&mut self, module: &str, ident: &syn::Ident, vis: &Visibility) {
		let exported = crate_visible(module, vis);
		self.scope(module).add_item(ident.to_string(), exported);
	}

	fn declare(
		&mut self,
		module: &str,
		ident: &syn::Ident,
		vis: &Visibility,
		kind: DeclKind,
		generics: &Generics,
		file: &Path,
	) -> &mut RawDecl {
		self.bind(module, ident, vis);
		let index = self.decls.len();
		self.decls.push(RawDecl {
			module: module.to_string(),
			name: ident.to_string(),
			kind,
			params: param_names(generics),
			supertraits: Vec::new(),
			origin: Origin::new(file, line(ident.span())),
		});
		&mut self.decls[index]
	}

	fn finish(self) -> DeclarationSet {
		let scopes = Scopes::new(&self.scopes);
		let mut declarations: Vec<Declaration> = self
			.decls
			.iter()
			.map(|raw| {
				let cx = TypeContext {
					module: &raw.module,
					params: &raw.params,
					self_ty: None,
				};
				let contracts = raw
					.supertraits
					.iter()
					.filter_map(|path| contract_use(&scopes, &cx, path, &raw.origin))
					.collect();
				Declaration {
					path: format!("{}::{}", raw.module, raw.name),
					kind: raw.kind,
					params: raw.params.clone(),
					contracts,
					reachable: true,
					origin: Some(raw.origin.clone()),
				}
			})
			.collect();

		let index: HashMap<String, usize> = declarations
			.iter()
			.enumerate()
			.map(|(i, decl)| (decl.path.clone(), i))
			.collect();

		for raw in &self.impls {
			let cx = TypeContext {
				module: &raw.module,
				params: &raw.params,
				self_ty: None,
			};
			let self_ty = scopes.resolve_type(&cx, &raw.self_ty);
			let TypeRef::Path { path, .. } = &self_ty else {
				tracing::trace!(origin = %raw.origin, self_ty = %self_ty, "impl target is not a named type");
				continue;
			};
			let Some(&target) = index.get(path) else {
				tracing::trace!(origin = %raw.origin, %path, "impl target declared outside the source tree");
				continue;
			};
			let cx = TypeContext {
				self_ty: Some(&self_ty),
				..cx
			};
			if let Some(contract) = contract_use(&scopes, &cx, &raw.contract, &raw.origin) {
				declarations[target].contracts.push(contract);
			}
		}

		let public = scopes.public_paths();
		for decl in &mut declarations {
			match public.get(&decl.path) {
				Some(path) => decl.path.clone_from(path),
				None => {
					tracing::trace!(path = %decl.path, "declaration not reachable from the crate root");
					decl.reachable = false;
				}
			}
			for contract in &mut decl.contracts {
				if let Some(path) = public.get(&contract.path) {
					contract.path.clone_from(path);
				}
				for arg in &mut contract.args {
					rename_paths(arg, &public);
				}
			}
		}

		tracing::debug!(
			modules = self.scopes.len(),
			declarations = declarations.len(),
			impls = self.impls.len(),
			"collected source declarations"
		);
		DeclarationSet {
			declarations,
			diagnostics: self.diagnostics,
		}
	}
}

fn contract_use(scopes: &Scopes<'_>, cx: &TypeContext<'_>, path: &syn::Path, origin: &Origin) -> Option<ContractUse> {
	let Some(canonical) = scopes.resolve_path(cx.module, path) else {
		tracing::trace!(%origin, module = cx.module, "unresolved contract path");
		return None;
	};
	Some(ContractUse::new(canonical, scopes.resolve_args(cx, path)).at(origin.clone()))
}

/// Replaces canonical paths inside `ty` by their public form.
fn rename_paths(ty: &mut TypeRef, public: &HashMap<String, String>) {
	match ty {
		TypeRef::Path { path, args } => {
			if let Some(renamed) = public.get(path.as_str()) {
				path.clone_from(renamed);
			}
			for arg in args {
				rename_paths(arg, public);
			}
		}
		TypeRef::Tuple(elems) => {
			for elem in elems {
				rename_paths(elem, public);
			}
		}
		TypeRef::Param(_) | TypeRef::Unresolved(_) | TypeRef::Unsupported(_) => {}
	}
}

fn line(span: proc_macro2::Span) -> usize {
	span.start().line
}

fn param_names(generics: &Generics) -> Vec<String> {
	generics
		.params
		.iter()
		.map(|param| match param {
			GenericParam::Type(param) => param.ident.to_string(),
			GenericParam::Lifetime(param) => param.lifetime.to_string(),
			GenericParam::Const(param) => param.ident.to_string(),
		})
		.collect()
}

fn item_attrs(item: &Item) -> &[Attribute] {
	match item {
		Item::Struct(item) => &item.attrs,
		Item::Enum(item) => &item.attrs,
		Item::Union(item) => &item.attrs,
		Item::Trait(item) => &item.attrs,
		Item::Type(item) => &item.attrs,
		Item::Mod(item) => &item.attrs,
		Item::Use(item) => &item.attrs,
		Item::Impl(item) => &item.attrs,
		Item::ExternCrate(item) => &item.attrs,
		_ => &[],
	}
}

/// True for `#[cfg(test)]`.
fn is_cfg_test(attrs: &[Attribute]) -> bool {
	attrs.iter().any(|attr| {
		attr.path().is_ident("cfg") && attr.parse_args::<syn::Ident>().is_ok_and(|ident| ident == "test")
	})
}
