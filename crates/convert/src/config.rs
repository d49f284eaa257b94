//! Registry configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Behavior switches for a [`ConverterRegistry`](crate::ConverterRegistry).
///
/// Every field has a default, so a partial TOML table is enough:
///
/// ```toml
/// diagnose_ambiguity = true
/// disabled_registrars = ["builtin.text"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Collect every fuzzy candidate and warn when more than one distinct
	/// converter could serve a pair. Does not change the returned converter.
	pub diagnose_ambiguity: bool,
	/// After the source walk misses, also walk the destination's ancestors
	/// for converters marked up-cast capable.
	pub walk_destination_hierarchy: bool,
	/// Warn when a registration finds an ancestor slot already filled by an
	/// earlier expansion. When off, only slots held by an explicit
	/// registration warn and the rest log at debug level.
	pub warn_expansion_overlap: bool,
	/// Include registrars submitted through `inventory` when bootstrapping.
	pub discover_registrars: bool,
	/// Registrar names skipped at bootstrap.
	pub disabled_registrars: Vec<String>,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			diagnose_ambiguity: cfg!(debug_assertions),
			walk_destination_hierarchy: true,
			warn_expansion_overlap: true,
			discover_registrars: true,
			disabled_registrars: Vec::new(),
		}
	}
}

impl RegistryConfig {
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}

	pub fn is_disabled(&self, registrar: &str) -> bool {
		self.disabled_registrars.iter().any(|name| name == registrar)
	}
}
