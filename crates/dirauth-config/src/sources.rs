// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;
use std::str::FromStr;

use dirauth_core::DriftReference;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::DirauthConfigLayer;
use crate::sections::{
	DirectoryConfigLayer, LogFormat, LoggingConfigLayer, LoginConfigLayer, RenewalConfigLayer,
};

/// Default location of the system configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/dirauth/dirauth.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<DirauthConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<DirauthConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(DirauthConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is skipped.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<DirauthConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(DirauthConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: DirauthConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: DIRAUTH_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<DirauthConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(DirauthConfigLayer {
			login: Some(load_login_from_env()?),
			renewal: Some(load_renewal_from_env()?),
			directory: Some(load_directory_from_env()),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
	T: FromStr<Err = String>,
{
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|message| ConfigError::InvalidValue {
			key: name.to_string(),
			message,
		}),
		None => Ok(None),
	}
}

fn load_login_from_env() -> Result<LoginConfigLayer, ConfigError> {
	Ok(LoginConfigLayer {
		initial_ttl_secs: env_u64("DIRAUTH_LOGIN_INITIAL_TTL_SECS")?,
	})
}

fn load_renewal_from_env() -> Result<RenewalConfigLayer, ConfigError> {
	Ok(RenewalConfigLayer {
		increment_secs: env_u64("DIRAUTH_RENEWAL_INCREMENT_SECS")?,
		max_session_ttl_secs: env_u64("DIRAUTH_RENEWAL_MAX_SESSION_TTL_SECS")?,
		drift_reference: env_parse::<DriftReference>("DIRAUTH_RENEWAL_DRIFT_REFERENCE")?,
	})
}

fn load_directory_from_env() -> DirectoryConfigLayer {
	DirectoryConfigLayer {
		users_file: env_var("DIRAUTH_DIRECTORY_USERS_FILE").map(PathBuf::from),
		deny_unmapped: env_bool("DIRAUTH_DIRECTORY_DENY_UNMAPPED"),
	}
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	Ok(LoggingConfigLayer {
		level: env_var("DIRAUTH_LOGGING_LEVEL"),
		format: env_parse::<LogFormat>("DIRAUTH_LOGGING_FORMAT")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.renewal.is_none());
		assert!(layer.directory.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let layer = TomlSource::new("/nonexistent/dirauth.toml").load().unwrap();
		assert!(layer.renewal.is_none());
	}

	#[test]
	fn test_toml_source_reads_sections() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[renewal]
increment_secs = 1800
drift_reference = "policies"

[directory]
users_file = "/etc/dirauth/users.toml"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		let renewal = layer.renewal.unwrap();
		assert_eq!(renewal.increment_secs, Some(1800));
		assert_eq!(renewal.drift_reference, Some(DriftReference::Policies));
		assert_eq!(
			layer.directory.unwrap().users_file,
			Some(PathBuf::from("/etc/dirauth/users.toml"))
		);
	}

	#[test]
	fn test_toml_source_parse_error_names_file() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "[renewal]\nincrement_secs = \"soon\"").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_source_reads_sections() {
		let _guard = crate::ENV_MUTEX
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner);

		std::env::set_var("DIRAUTH_RENEWAL_DRIFT_REFERENCE", "PASSWORD");
		std::env::set_var("DIRAUTH_RENEWAL_MAX_SESSION_TTL_SECS", "86400");
		std::env::set_var("DIRAUTH_DIRECTORY_USERS_FILE", "/srv/users.toml");
		let result = EnvSource.load();
		std::env::remove_var("DIRAUTH_RENEWAL_DRIFT_REFERENCE");
		std::env::remove_var("DIRAUTH_RENEWAL_MAX_SESSION_TTL_SECS");
		std::env::remove_var("DIRAUTH_DIRECTORY_USERS_FILE");

		let layer = result.unwrap();
		let renewal = layer.renewal.unwrap();
		assert_eq!(renewal.drift_reference, Some(DriftReference::Password));
		assert_eq!(renewal.max_session_ttl_secs, Some(86_400));
		assert!(renewal.increment_secs.is_none());
		assert_eq!(
			layer.directory.unwrap().users_file,
			Some(PathBuf::from("/srv/users.toml"))
		);
	}

	#[test]
	fn test_env_source_invalid_reference_names_variable() {
		let _guard = crate::ENV_MUTEX
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner);

		std::env::set_var("DIRAUTH_RENEWAL_DRIFT_REFERENCE", "groups");
		let result = EnvSource.load();
		std::env::remove_var("DIRAUTH_RENEWAL_DRIFT_REFERENCE");

		match result.unwrap_err() {
			ConfigError::InvalidValue { key, message } => {
				assert_eq!(key, "DIRAUTH_RENEWAL_DRIFT_REFERENCE");
				assert!(message.contains("groups"));
			}
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn test_env_u64_rejects_garbage() {
		std::env::set_var("DIRAUTH_TEST_SOURCES_U64", "ten");
		let err = env_u64("DIRAUTH_TEST_SOURCES_U64").unwrap_err();
		assert!(err.to_string().contains("DIRAUTH_TEST_SOURCES_U64"));
		std::env::remove_var("DIRAUTH_TEST_SOURCES_U64");
	}

	#[test]
	fn test_env_parse_drift_reference() {
		std::env::set_var("DIRAUTH_TEST_SOURCES_DRIFT", "password");
		assert_eq!(
			env_parse::<DriftReference>("DIRAUTH_TEST_SOURCES_DRIFT").unwrap(),
			Some(DriftReference::Password)
		);
		std::env::set_var("DIRAUTH_TEST_SOURCES_DRIFT", "groups");
		assert!(env_parse::<DriftReference>("DIRAUTH_TEST_SOURCES_DRIFT").is_err());
		std::env::remove_var("DIRAUTH_TEST_SOURCES_DRIFT");
	}

	#[test]
	fn test_env_bool_accepts_one_and_true() {
		std::env::set_var("DIRAUTH_TEST_SOURCES_BOOL", "TRUE");
		assert_eq!(env_bool("DIRAUTH_TEST_SOURCES_BOOL"), Some(true));
		std::env::set_var("DIRAUTH_TEST_SOURCES_BOOL", "no");
		assert_eq!(env_bool("DIRAUTH_TEST_SOURCES_BOOL"), Some(false));
		std::env::remove_var("DIRAUTH_TEST_SOURCES_BOOL");
	}
}
