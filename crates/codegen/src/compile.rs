//! Build-script support.
//!
//! A consuming crate runs the generation pass from its `build.rs`:
//!
//! ```ignore
//! fn main() -> Result<(), tinybus_codegen::BuildError> {
//!     tinybus_codegen::compile::build()
//! }
//! ```
//!
//! and includes the artifacts with `tinybus::include_generated!()`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::error::BuildError;
use crate::pass::{Generation, generate};
use crate::source::SourceTree;

/// Cargo-provided directories of the crate being built.
#[derive(Debug, Clone)]
pub struct BuildCtx {
	pub manifest_dir: PathBuf,
	pub out_dir: PathBuf,
}

impl BuildCtx {
	/// Reads `CARGO_MANIFEST_DIR` and `OUT_DIR`.
	pub fn from_env() -> Result<Self, BuildError> {
		Ok(Self {
			manifest_dir: env_path("CARGO_MANIFEST_DIR")?,
			out_dir: env_path("OUT_DIR")?,
		})
	}

	pub fn asset(&self, rel: impl AsRef<Path>) -> PathBuf {
		self.manifest_dir.join(rel)
	}

	pub fn rerun_if_changed(&self, path: &Path) {
		println!("cargo:rerun-if-changed={}", path.display());
	}

	/// Writes `contents` unless the file already holds exactly that, so that
	/// unchanged artifacts keep their mtime and do not trigger recompilation.
	///
	/// Returns whether the file was written.
	pub fn write_if_changed(&self, path: &Path, contents: &str) -> Result<bool, BuildError> {
		if fs::read(path).is_ok_and(|existing| existing == contents.as_bytes()) {
			return Ok(false);
		}
		let write_err = |source| BuildError::Write {
			path: path.to_path_buf(),
			source,
		};
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).map_err(write_err)?;
		}
		fs::write(path, contents).map_err(write_err)?;
		Ok(true)
	}
}

fn env_path(key: &'static str) -> Result<PathBuf, BuildError> {
	std::env::var_os(key).map(PathBuf::from).ok_or(BuildError::MissingEnv(key))
}

/// Runs a pass for the crate described by `ctx` and writes its artifacts.
///
/// Emits `rerun-if-changed` for the config file, the source root and every
/// scanned file, and prints each diagnostic as a cargo warning.
pub fn run(ctx: &BuildCtx) -> Result<Generation, BuildError> {
	let config_path = ctx.asset(GeneratorConfig::FILE_NAME);
	if config_path.is_file() {
		ctx.rerun_if_changed(&config_path);
	}
	let config = GeneratorConfig::load_or_default(&ctx.manifest_dir)?;

	let source = SourceTree::new(ctx.asset(&config.source_root));
	ctx.rerun_if_changed(source.root());
	for file in source.files()? {
		ctx.rerun_if_changed(&file);
	}

	let generation = generate(&source, &config)?;
	for diagnostic in &generation.diagnostics {
		println!("cargo:warning={diagnostic}");
	}

	let out_dir = ctx.out_dir.join(&config.out_dir);
	for (name, contents) in generation.artifacts.files() {
		let path = out_dir.join(name);
		if ctx.write_if_changed(&path, contents)? {
			tracing::debug!(path = %path.display(), "wrote artifact");
		}
	}
	Ok(generation)
}

/// One-call entry point for `build.rs`.
pub fn build() -> Result<(), BuildError> {
	run(&BuildCtx::from_env()?).map(drop)
}
