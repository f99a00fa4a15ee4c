// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the dirauth login backend.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with cross-field validation
//! - Consistent environment variable naming (`DIRAUTH_*`)
//!
//! # Usage
//!
//! ```ignore
//! use dirauth_config::load_config;
//!
//! let config = load_config()?;
//! config.log_summary();
//! let backend = DirectoryLoginBackend::new(resolver, config.backend_config());
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use env::{load_password_env, require_password_env};
pub use error::ConfigError;
pub use layer::DirauthConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

use dirauth_core::{BackendConfig, LeasePolicy, LoginOptions, RenewalOptions};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DirauthConfig {
	pub login: LoginConfig,
	pub renewal: RenewalConfig,
	pub directory: DirectoryConfig,
	pub logging: LoggingConfig,
}

impl DirauthConfig {
	/// Options for the core login backend.
	pub fn backend_config(&self) -> BackendConfig {
		let max_session_ttl = (self.renewal.max_session_ttl_secs > 0)
			.then(|| Duration::from_secs(self.renewal.max_session_ttl_secs));

		BackendConfig {
			login: LoginOptions {
				initial_ttl: Duration::from_secs(self.login.initial_ttl_secs),
			},
			renewal: RenewalOptions {
				lease: LeasePolicy::new(
					Duration::from_secs(self.renewal.increment_secs),
					max_session_ttl,
				),
				drift_reference: self.renewal.drift_reference,
			},
		}
	}

	/// Log the effective settings. Call after the subscriber is installed.
	pub fn log_summary(&self) {
		info!(
			initial_ttl_secs = self.login.initial_ttl_secs,
			renewal_increment_secs = self.renewal.increment_secs,
			max_session_ttl_secs = self.renewal.max_session_ttl_secs,
			drift_reference = %self.renewal.drift_reference,
			users_file = ?self.directory.users_file,
			deny_unmapped = self.directory.deny_unmapped,
			log_format = %self.logging.format,
			"Configuration loaded"
		);
	}
}

#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`DIRAUTH_*`)
/// 2. Config file (`/etc/dirauth/dirauth.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<DirauthConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<DirauthConfig, ConfigError> {
	let mut merged = DirauthConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<DirauthConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<DirauthConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = DirauthConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: DirauthConfigLayer) -> Result<DirauthConfig, ConfigError> {
	let login = layer.login.unwrap_or_default().finalize();
	let renewal = layer.renewal.unwrap_or_default().finalize();
	let directory = layer.directory.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&renewal)?;
	debug!("configuration finalized");

	Ok(DirauthConfig {
		login,
		renewal,
		directory,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(renewal: &RenewalConfig) -> Result<(), ConfigError> {
	if renewal.increment_secs == 0 {
		return Err(ConfigError::Validation(
			"renewal.increment_secs must be greater than zero".to_string(),
		));
	}

	if renewal.max_session_ttl_secs != 0 && renewal.max_session_ttl_secs < renewal.increment_secs {
		return Err(ConfigError::Validation(format!(
			"renewal.max_session_ttl_secs ({}) is shorter than renewal.increment_secs ({}). \
			 Raise the maximum, lower the increment, or set the maximum to 0 for no cap.",
			renewal.max_session_ttl_secs, renewal.increment_secs
		)));
	}

	Ok(())
}
