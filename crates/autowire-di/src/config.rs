//! Container configuration
//!
//! Configuration never maps types to implementations. It only tunes how
//! implementation search behaves.
//!
//! ```toml
//! entry_assembly = "my_app"
//! namespace_tie_break = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
	/// Assembly that stands in for the requester when a resolution has no
	/// context. Without it, such resolutions search every loaded assembly.
	pub entry_assembly: Option<String>,
	/// Whether namespace distance may settle a tie inside the winning tier.
	/// When disabled, every tie is ambiguous.
	pub namespace_tie_break: bool,
}

impl Default for ContainerConfig {
	fn default() -> Self {
		Self {
			entry_assembly: None,
			namespace_tie_break: true,
		}
	}
}

impl ContainerConfig {
	/// # Examples
	///
	/// ```
	/// use autowire_di::ContainerConfig;
	///
	/// let config = ContainerConfig::from_toml_str(r#"entry_assembly = "billing""#).unwrap();
	/// assert_eq!(config.entry_assembly.as_deref(), Some("billing"));
	/// assert!(config.namespace_tie_break);
	/// ```
	pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(contents)?)
	}

	/// Load configuration from a TOML file
	pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path)?;
		let config = Self::from_toml_str(&contents)?;
		tracing::debug!(path = %path.display(), ?config, "loaded container configuration");
		Ok(config)
	}
}
