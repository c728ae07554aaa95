//! `tinybus-gen`: runs a generation pass outside of a build script.
//!
//! Prints the generated artifacts (or the handler manifest with `--manifest`)
//! to stdout, or writes them to `--out`. Diagnostics go to the log; the exit
//! status is non-zero only when the pass itself cannot run.

mod cli;

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use tinybus_codegen::{GeneratorConfig, SourceTree, generate};
use tracing::info;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let config = match &cli.config {
		Some(path) => GeneratorConfig::load(path)?,
		None => GeneratorConfig::load_or_default(Path::new("."))?,
	};
	let src = cli.src.clone().unwrap_or_else(|| config.source_root.clone());
	let generation = generate(&SourceTree::new(&src), &config)
		.with_context(|| format!("generation over {} failed", src.display()))?;

	info!(
		handlers = generation.registry.handlers.len(),
		payload_types = generation.registry.payload_types.len(),
		diagnostics = generation.diagnostics.len(),
		"generation finished"
	);

	if cli.manifest {
		println!("{}", generation.registry.to_json()?);
		return Ok(());
	}

	match &cli.out {
		Some(dir) => {
			fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
			for (name, contents) in generation.artifacts.files() {
				let path = dir.join(name);
				fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
				info!(path = %path.display(), "wrote artifact");
			}
		}
		None => {
			for (name, contents) in generation.artifacts.files() {
				println!("// ---- {name}");
				print!("{contents}");
			}
		}
	}
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("tinybus_codegen=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
