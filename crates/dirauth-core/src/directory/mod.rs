// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group-based policy resolution on top of a directory client.
//!
//! A [`DirectoryClient`] only answers two questions: does this credential
//! bind, and which policies does a group map to. [`GroupPolicyResolver`]
//! turns those answers into a [`Resolution`]: the union of the user's direct
//! policies and the policies of every group the user belongs to.

mod static_dir;

pub use static_dir::{hash_password, StaticDirectory};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::credential::Credential;
use crate::error::ResolverError;
use crate::resolver::{CredentialResolver, Resolution};

pub const EMPTY_PASSWORD_MESSAGE: &str = "password cannot be empty";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid username or password";
pub const NO_POLICIES_MESSAGE: &str = "user is not a member of any authorized group";

/// Errors raised while loading or building a directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
	#[error("failed to read directory file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse directory file {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("user '{user}' has an invalid password hash")]
	InvalidPasswordHash { user: String },

	#[error("password hashing failed: {0}")]
	Hash(String),
}

/// A user as seen after a successful bind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryUser {
	pub name: String,
	pub groups: Vec<String>,
	/// Policies assigned to the user directly.
	pub policies: Vec<String>,
}

/// Minimal directory operations needed to resolve policies.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
	/// Bind as the credential. `Ok(None)` means the directory rejected it.
	async fn authenticate(&self, credential: &Credential)
		-> Result<Option<DirectoryUser>, ResolverError>;

	/// Policies mapped to `group`. Unknown groups map to nothing.
	async fn group_policies(&self, group: &str) -> Result<Vec<String>, ResolverError>;
}

/// Resolves credentials to policies via group membership.
#[derive(Debug, Clone)]
pub struct GroupPolicyResolver<D> {
	client: D,
	deny_unmapped: bool,
}

impl<D: DirectoryClient> GroupPolicyResolver<D> {
	pub fn new(client: D) -> Self {
		Self {
			client,
			deny_unmapped: true,
		}
	}

	/// When set, a bound user with no policies is denied with an explanatory
	/// message rather than a bare denial.
	pub fn with_deny_unmapped(mut self, deny_unmapped: bool) -> Self {
		self.deny_unmapped = deny_unmapped;
		self
	}
}

#[async_trait]
impl<D: DirectoryClient> CredentialResolver for GroupPolicyResolver<D> {
	#[instrument(
		name = "group_policy_resolver.resolve",
		skip_all,
		fields(username = %credential.username)
	)]
	async fn resolve(&self, credential: &Credential) -> Result<Resolution, ResolverError> {
		// An empty password is an anonymous bind on most servers and would
		// succeed for any username.
		if credential.password.is_empty() {
			debug!("rejecting empty password");
			return Ok(Resolution::denied_with_error(EMPTY_PASSWORD_MESSAGE));
		}

		let Some(user) = self.client.authenticate(credential).await? else {
			debug!("directory bind rejected");
			return Ok(Resolution::denied_with_error(INVALID_CREDENTIALS_MESSAGE));
		};

		let mut policies = user.policies;
		for group in &user.groups {
			let mapped = self.client.group_policies(group).await?;
			debug!(group = %group, mapped = mapped.len(), "group policies");
			policies.extend(mapped);
		}

		if policies.is_empty() {
			debug!(groups = user.groups.len(), "user maps to no policies");
			return Ok(if self.deny_unmapped {
				Resolution::denied_with_error(NO_POLICIES_MESSAGE)
			} else {
				Resolution::denied(None)
			});
		}

		Ok(Resolution::granted(policies))
	}
}
