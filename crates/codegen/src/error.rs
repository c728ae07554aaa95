use std::path::PathBuf;

/// Pass-fatal failure of a declaration provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("source root {} is not a directory", .0.display())]
	MissingRoot(PathBuf),

	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to walk source tree: {0}")]
	Walk(#[from] walkdir::Error),
}

/// Invalid generator configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("`{key}` must be {expected}, got {value:?}")]
	Invalid {
		key: &'static str,
		expected: &'static str,
		value: String,
	},
}

/// Pass-fatal generation failure.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
	#[error(transparent)]
	Provider(#[from] ProviderError),

	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Build-script failure.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
	#[error("environment variable {0} is not set")]
	MissingEnv(&'static str),

	#[error(transparent)]
	Generate(#[from] GenerateError),

	#[error("failed to write {}: {source}", path.display())]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl From<ConfigError> for BuildError {
	fn from(error: ConfigError) -> Self {
		Self::Generate(GenerateError::Config(error))
	}
}

impl From<ProviderError> for BuildError {
	fn from(error: ProviderError) -> Self {
		Self::Generate(GenerateError::Provider(error))
	}
}
