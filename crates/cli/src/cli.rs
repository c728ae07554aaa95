use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tinybus-gen")]
#[command(about = "Discover message handlers and generate their pub/sub wiring")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Source directory to scan (defaults to the config's `source-root`)
	#[arg(long, value_name = "DIR")]
	pub src: Option<PathBuf>,

	/// Generator config (defaults to ./tinybus.toml when present)
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Write the artifacts into this directory instead of printing them
	#[arg(long, value_name = "DIR", conflicts_with = "manifest")]
	pub out: Option<PathBuf>,

	/// Print the discovered handlers as JSON instead of the artifacts
	#[arg(long)]
	pub manifest: bool,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}
