// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loading passwords from the environment.
//!
//! Supports the `VAR` / `VAR_FILE` convention used by Docker and Kubernetes
//! secrets. `VAR_FILE` wins when both are set.

use dirauth_core::Password;
use std::path::PathBuf;
use std::{env, fs};

use crate::error::ConfigError;

/// Load a password from `var`, or from the file named by `{var}_FILE`.
///
/// A single trailing newline is stripped from file contents.
pub fn load_password_env(var: &str) -> Result<Option<Password>, ConfigError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(ConfigError::Secret(format!(
				"secret file path in {file_var} is empty"
			)));
		}

		let path = PathBuf::from(&path_str);
		let content =
			fs::read_to_string(&path).map_err(|source| ConfigError::FileRead { path, source })?;
		let secret = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(Some(Password::new(secret)));
	}

	Ok(env::var(var).ok().map(Password::new))
}

/// Like [`load_password_env`], but absence is an error.
pub fn require_password_env(var: &str) -> Result<Password, ConfigError> {
	load_password_env(var)?.ok_or_else(|| ConfigError::MissingEnvVar(format!("{var} or {var}_FILE")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	// Each test uses its own variable names; the process environment is shared.

	#[test]
	fn test_direct_value() {
		env::set_var("DIRAUTH_TEST_ENV_DIRECT", "hunter2");
		let password = load_password_env("DIRAUTH_TEST_ENV_DIRECT").unwrap().unwrap();
		assert_eq!(password.expose(), "hunter2");
		env::remove_var("DIRAUTH_TEST_ENV_DIRECT");
	}

	#[test]
	fn test_file_value_strips_one_newline() {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(b"from-file\n\n").unwrap();
		env::set_var("DIRAUTH_TEST_ENV_FILE_FILE", file.path());
		env::set_var("DIRAUTH_TEST_ENV_FILE", "ignored");

		let password = load_password_env("DIRAUTH_TEST_ENV_FILE").unwrap().unwrap();
		assert_eq!(password.expose(), "from-file\n");

		env::remove_var("DIRAUTH_TEST_ENV_FILE_FILE");
		env::remove_var("DIRAUTH_TEST_ENV_FILE");
	}

	#[test]
	fn test_empty_file_path_is_error() {
		env::set_var("DIRAUTH_TEST_ENV_EMPTY_FILE", "");
		let err = load_password_env("DIRAUTH_TEST_ENV_EMPTY").unwrap_err();
		assert!(matches!(err, ConfigError::Secret(_)));
		env::remove_var("DIRAUTH_TEST_ENV_EMPTY_FILE");
	}

	#[test]
	fn test_missing_is_none_or_error() {
		assert!(load_password_env("DIRAUTH_TEST_ENV_UNSET").unwrap().is_none());
		let err = require_password_env("DIRAUTH_TEST_ENV_UNSET").unwrap_err();
		assert_eq!(
			err.to_string(),
			"Missing required environment variable: DIRAUTH_TEST_ENV_UNSET or DIRAUTH_TEST_ENV_UNSET_FILE"
		);
	}
}
