//! Generator configuration (`tinybus.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::resolve::ContractShape;

/// Settings of one generation pass.
///
/// Every key is optional; missing keys take the defaults below.
///
/// ```toml
/// contract = "crate::bus::Handler"
/// runtime = "::tinybus"
/// broker = "MessageBroker"
/// register-fn = "add_pub_sub"
/// source-root = "src"
/// out-dir = "tinybus"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct GeneratorConfig {
	/// Canonical path of the handler contract. The generated trait takes its
	/// last segment as name and must be included in the module the path names.
	pub contract: String,
	/// Path of the runtime crate as seen from the consuming crate.
	pub runtime: String,
	/// Name of the generated broker struct.
	pub broker: String,
	/// Name of the generated registration function.
	pub register_fn: String,
	/// Source directory scanned for handlers, relative to the manifest.
	pub source_root: PathBuf,
	/// Artifact directory, relative to `OUT_DIR`.
	pub out_dir: PathBuf,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self {
			contract: "crate::bus::Handler".into(),
			runtime: "::tinybus".into(),
			broker: "MessageBroker".into(),
			register_fn: "add_pub_sub".into(),
			source_root: PathBuf::from("src"),
			out_dir: PathBuf::from("tinybus"),
		}
	}
}

impl GeneratorConfig {
	pub const FILE_NAME: &'static str = "tinybus.toml";

	/// Parses and validates a TOML document.
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml(&text)
	}

	/// Loads `dir/tinybus.toml`, falling back to the defaults when it is absent.
	pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
		let path = dir.join(Self::FILE_NAME);
		if path.is_file() {
			Self::load(&path)
		} else {
			tracing::debug!(path = %path.display(), "no config file, using defaults");
			Ok(Self::default())
		}
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		let contract = parse_path("contract", &self.contract)?;
		if contract.segments.len() < 2 && contract.leading_colon.is_none() {
			return Err(invalid("contract", "a module-qualified path", &self.contract));
		}
		parse_path("runtime", &self.runtime)?;
		parse_ident("broker", &self.broker)?;
		parse_ident("register-fn", &self.register_fn)?;
		if self.source_root.as_os_str().is_empty() {
			return Err(invalid("source-root", "a non-empty path", ""));
		}
		if self.out_dir.as_os_str().is_empty() || self.out_dir.is_absolute() {
			return Err(invalid("out-dir", "a non-empty relative path", &self.out_dir.display().to_string()));
		}
		Ok(())
	}

	/// Handler contract shape with the configured path in canonical form.
	pub fn shape(&self) -> ContractShape {
		ContractShape::new(canonical(&self.contract))
	}

	/// Runtime crate path in canonical form.
	pub fn runtime_path(&self) -> String {
		canonical(&self.runtime)
	}
}

fn parse_path(key: &'static str, value: &str) -> Result<syn::Path, ConfigError> {
	let path: syn::Path = syn::parse_str(value).map_err(|_| invalid(key, "a Rust path", value))?;
	if path.segments.iter().any(|segment| !segment.arguments.is_none()) {
		return Err(invalid(key, "a path without generic arguments", value));
	}
	Ok(path)
}

fn parse_ident(key: &'static str, value: &str) -> Result<syn::Ident, ConfigError> {
	syn::parse_str(value).map_err(|_| invalid(key, "a Rust identifier", value))
}

/// Strips whitespace so that `crate :: bus :: Handler` compares equal to
/// `crate::bus::Handler`. Validated paths contain nothing else to normalize.
fn canonical(path: &str) -> String {
	path.chars().filter(|c| !c.is_whitespace()).collect()
}

fn invalid(key: &'static str, expected: &'static str, value: &str) -> ConfigError {
	ConfigError::Invalid {
		key,
		expected,
		value: value.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	#[test]
	fn empty_document_is_the_default() {
		assert_eq!(GeneratorConfig::from_toml("").unwrap(), GeneratorConfig::default());
	}

	#[test]
	fn keys_are_kebab_case() {
		let config = GeneratorConfig::from_toml(
			r#"
contract = "crate::messaging::Subscriber"
broker = "Bus"
register-fn = "register_handlers"
out-dir = "bus"
"#,
		)
		.unwrap();
		assert_eq!(config.shape().path, "crate::messaging::Subscriber");
		assert_eq!(config.shape().name(), "Subscriber");
		assert_eq!(config.broker, "Bus");
		assert_eq!(config.register_fn, "register_handlers");
		assert_eq!(config.out_dir, PathBuf::from("bus"));
		assert_eq!(config.runtime, "::tinybus");
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let err = GeneratorConfig::from_toml("handlers = 3").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}

	#[rstest]
	#[case("contract = \"Handler\"", "contract")]
	#[case("contract = \"crate::bus::Handler<T>\"", "contract")]
	#[case("contract = \"crate::\"", "contract")]
	#[case("runtime = \"not a path\"", "runtime")]
	#[case("broker = \"fn\"", "broker")]
	#[case("register-fn = \"add-pub-sub\"", "register-fn")]
	#[case("out-dir = \"\"", "out-dir")]
	fn invalid_values_name_their_key(#[case] document: &str, #[case] expected_key: &str) {
		match GeneratorConfig::from_toml(document).unwrap_err() {
			ConfigError::Invalid { key, .. } => assert_eq!(key, expected_key),
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn extern_contract_paths_are_accepted() {
		let config = GeneratorConfig::from_toml("contract = \"::bus::Handler\"").unwrap();
		assert_eq!(config.shape().path, "::bus::Handler");
	}

	#[test]
	fn missing_file_falls_back_to_defaults() {
		let dir = tempfile::tempdir().unwrap();
		assert_eq!(GeneratorConfig::load_or_default(dir.path()).unwrap(), GeneratorConfig::default());
	}

	#[test]
	fn config_file_is_read_from_directory() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join(GeneratorConfig::FILE_NAME), "broker = \"Bus\"\n").unwrap();
		assert_eq!(GeneratorConfig::load_or_default(dir.path()).unwrap().broker, "Bus");
	}
}
