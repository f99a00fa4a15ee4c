// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session descriptors and the metadata attached to them.
//!
//! Login builds an [`Auth`] whose [`SessionMetadata`] the host's lease store
//! persists. Renewal later receives that same metadata back and replays the
//! credential it contains.
//!
//! # Metadata keys
//!
//! | Key        | Value                                         |
//! |------------|-----------------------------------------------|
//! | `username` | the username presented at login               |
//! | `password` | the plaintext password, kept for replay       |
//! | `policies` | canonical comma-joined policy string          |

use serde::Serialize;
use std::collections::BTreeMap;

use crate::credential::{Credential, Password};
use crate::error::{AuthError, Result};
use crate::policy::PolicySet;
use crate::renew::RenewOutcome;

pub const METADATA_USERNAME: &str = "username";
pub const METADATA_PASSWORD: &str = "password";
pub const METADATA_POLICIES: &str = "policies";

/// Typed view of the metadata recorded on a session at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionMetadata {
	pub username: String,
	/// Serialized as `[REDACTED]`; use [`SessionMetadata::to_map`] for storage.
	pub password: Password,
	/// Canonical policy string for the policy set valid at login.
	pub policies: String,
}

impl SessionMetadata {
	pub fn new(credential: Credential, policies: &PolicySet) -> Self {
		Self {
			username: credential.username,
			password: credential.password,
			policies: policies.to_canonical_string(),
		}
	}

	/// Rebuild typed metadata from the raw map held by the lease store.
	///
	/// Every key written at login must be present.
	pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
		let get = |key: &'static str| {
			map.get(key)
				.cloned()
				.ok_or(AuthError::MissingMetadata { key })
		};

		Ok(Self {
			username: get(METADATA_USERNAME)?,
			password: Password::new(get(METADATA_PASSWORD)?),
			policies: get(METADATA_POLICIES)?,
		})
	}

	/// Raw string map for the lease store.
	///
	/// This exposes the plaintext password. The store must protect it at rest.
	pub fn to_map(&self) -> BTreeMap<String, String> {
		BTreeMap::from([
			(METADATA_USERNAME.to_string(), self.username.clone()),
			(
				METADATA_PASSWORD.to_string(),
				self.password.expose().to_string(),
			),
			(METADATA_POLICIES.to_string(), self.policies.clone()),
		])
	}

	/// The credential captured at login, ready to replay.
	pub fn credential(&self) -> Credential {
		Credential {
			username: self.username.clone(),
			password: self.password.clone(),
		}
	}
}

/// Lease parameters attached to a newly issued session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeaseOptions {
	/// Initial lifetime in seconds; zero defers to the store's default.
	pub ttl_secs: u64,
	pub renewable: bool,
}

/// A newly issued session descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Auth {
	/// Canonical (sorted) policies bound to the session.
	pub policies: PolicySet,
	pub metadata: SessionMetadata,
	pub display_name: String,
	pub lease: LeaseOptions,
}

/// Lifecycle of a session as seen by renewal.
///
/// `Active` survives a renewal only when the directory still grants the same
/// policies. Everything else moves it to `Revoked`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
	Active,
	Revoked,
}

impl SessionState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Revoked)
	}

	/// Apply a renewal outcome to the current state.
	pub fn apply(self, outcome: &RenewOutcome) -> Self {
		match self {
			Self::Revoked => Self::Revoked,
			Self::Active => outcome.next_state(),
		}
	}
}
