// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! An in-memory directory loaded from TOML.
//!
//! ```toml
//! [users.alice]
//! password_hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
//! groups = ["engineers"]
//! policies = ["personal"]
//!
//! [groups.engineers]
//! policies = ["dev", "ci"]
//! ```
//!
//! Password hashes are argon2 PHC strings, as printed by
//! `dirauth hash-password`.

use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
#[cfg(test)]
use argon2::{Algorithm, Params, Version};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

use super::{DirectoryClient, DirectoryError, DirectoryUser};
use crate::credential::{Credential, Password};
use crate::error::ResolverError;

#[derive(Debug, Clone, Deserialize)]
struct StaticUser {
	password_hash: String,
	#[serde(default)]
	groups: Vec<String>,
	#[serde(default)]
	policies: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StaticGroup {
	#[serde(default)]
	policies: Vec<String>,
}

/// File layout of a static directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryFile {
	#[serde(default)]
	users: BTreeMap<String, StaticUser>,
	#[serde(default)]
	groups: BTreeMap<String, StaticGroup>,
}

/// A fixed set of users and groups held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
	users: BTreeMap<String, StaticUser>,
	groups: BTreeMap<String, StaticGroup>,
}

impl StaticDirectory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a user, hashing `password`.
	pub fn with_user<G, P>(
		mut self,
		name: impl Into<String>,
		password: &Password,
		groups: G,
		policies: P,
	) -> Result<Self, DirectoryError>
	where
		G: IntoIterator,
		G::Item: Into<String>,
		P: IntoIterator,
		P::Item: Into<String>,
	{
		let user = StaticUser {
			password_hash: hash_password(password)?,
			groups: groups.into_iter().map(Into::into).collect(),
			policies: policies.into_iter().map(Into::into).collect(),
		};
		self.users.insert(name.into(), user);
		Ok(self)
	}

	pub fn with_group<P>(mut self, name: impl Into<String>, policies: P) -> Self
	where
		P: IntoIterator,
		P::Item: Into<String>,
	{
		self.groups.insert(
			name.into(),
			StaticGroup {
				policies: policies.into_iter().map(Into::into).collect(),
			},
		);
		self
	}

	/// Parse a directory from TOML. `origin` names the source in errors.
	pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, DirectoryError> {
		let file: DirectoryFile =
			toml::from_str(content).map_err(|source| DirectoryError::TomlParse {
				path: origin.to_path_buf(),
				source,
			})?;

		for (name, user) in &file.users {
			if PasswordHash::new(&user.password_hash).is_err() {
				return Err(DirectoryError::InvalidPasswordHash { user: name.clone() });
			}
		}

		Ok(Self {
			users: file.users,
			groups: file.groups,
		})
	}

	/// Load a directory file from disk.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|source| DirectoryError::FileRead {
			path: path.to_path_buf(),
			source,
		})?;
		let directory = Self::from_toml_str(&content, path)?;
		info!(
			path = %path.display(),
			users = directory.user_count(),
			groups = directory.groups.len(),
			"loaded static directory"
		);
		Ok(directory)
	}

	pub fn user_count(&self) -> usize {
		self.users.len()
	}
}

#[async_trait]
impl DirectoryClient for StaticDirectory {
	#[instrument(name = "static_directory.authenticate", skip_all, fields(username = %credential.username))]
	async fn authenticate(
		&self,
		credential: &Credential,
	) -> Result<Option<DirectoryUser>, ResolverError> {
		let Some(user) = self.users.get(&credential.username) else {
			debug!("unknown user");
			return Ok(None);
		};

		let parsed = PasswordHash::new(&user.password_hash)
			.map_err(|e| ResolverError::Protocol(format!("stored password hash: {e}")))?;
		if argon2_instance()
			.verify_password(credential.password.expose().as_bytes(), &parsed)
			.is_err()
		{
			debug!("password mismatch");
			return Ok(None);
		}

		Ok(Some(DirectoryUser {
			name: credential.username.clone(),
			groups: user.groups.clone(),
			policies: user.policies.clone(),
		}))
	}

	async fn group_policies(&self, group: &str) -> Result<Vec<String>, ResolverError> {
		Ok(self
			.groups
			.get(group)
			.map(|g| g.policies.clone())
			.unwrap_or_default())
	}
}

/// Hash a password into an argon2 PHC string for a directory file.
pub fn hash_password(password: &Password) -> Result<String, DirectoryError> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(password.expose().as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| DirectoryError::Hash(e.to_string()))
}

/// Production parameters outside tests; minimal cost under `cfg(test)`.
/// Verification reads parameters from the stored hash, so hashes made with
/// either setting verify under both.
fn argon2_instance() -> Argon2<'static> {
	#[cfg(test)]
	{
		let params = Params::new(1024, 1, 1, None).expect("valid Argon2 params for tests");
		Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
	}

	#[cfg(not(test))]
	{
		Argon2::default()
	}
}
