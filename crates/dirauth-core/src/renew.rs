// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Renewal: replay the login credential and detect policy drift.
//!
//! Every renewal re-authenticates the credential captured at login. If the
//! directory now grants a different policy set than the one recorded on the
//! session, the session is revoked instead of extended.
//!
//! # State Transitions
//!
//! ```text
//!            policies match
//!          ┌────────────────┐
//!          ▼                │
//!      ┌────────┐           │       drift, denial or max lifetime
//!      │ Active │───────────┴──────────────────────────────┐
//!      └────────┘                                          ▼
//!                                                    ┌─────────┐
//!                                                    │ Revoked │ (terminal)
//!                                                    └─────────┘
//! ```
//!
//! # Drift reference
//!
//! Drift is detected by comparing the freshly canonicalized policy string
//! against a value recorded in session metadata. [`DriftReference::Policies`]
//! compares against the `policies` key. [`DriftReference::Password`]
//! reproduces a legacy behavior that compared against the `password` key;
//! it revokes practically every renewal and is only kept so operators can opt
//! back into it explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::lease::{LeaseExtension, LeasePolicy, LeaseState};
use crate::policy::PolicySet;
use crate::resolver::CredentialResolver;
use crate::response::Response;
use crate::session::{SessionMetadata, SessionState, METADATA_PASSWORD, METADATA_POLICIES};

/// User-visible message when the directory's view of the caller changed.
pub const POLICY_DRIFT_MESSAGE: &str = "policies have changed, revoking login";

/// User-visible message when the session cannot be extended any further.
pub const MAX_TTL_MESSAGE: &str = "lease has reached its maximum lifetime";

/// Which metadata value the fresh policy string is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftReference {
	/// Compare against the canonical policy string recorded at login.
	#[default]
	Policies,
	/// Legacy: compare against the stored password.
	Password,
}

impl DriftReference {
	pub fn metadata_key(&self) -> &'static str {
		match self {
			Self::Policies => METADATA_POLICIES,
			Self::Password => METADATA_PASSWORD,
		}
	}

	fn recorded<'a>(&self, metadata: &'a SessionMetadata) -> &'a str {
		match self {
			Self::Policies => &metadata.policies,
			Self::Password => metadata.password.expose(),
		}
	}
}

impl fmt::Display for DriftReference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.metadata_key())
	}
}

impl FromStr for DriftReference {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"policies" => Ok(Self::Policies),
			"password" => Ok(Self::Password),
			other => Err(format!(
				"unknown drift reference '{other}', expected 'policies' or 'password'"
			)),
		}
	}
}

// Config files and environment variables accept the same spellings.
impl<'de> Deserialize<'de> for DriftReference {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// Renewal behavior fixed at backend construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenewalOptions {
	pub lease: LeasePolicy,
	pub drift_reference: DriftReference,
}

/// A typed renewal request, validated once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewRequest {
	pub metadata: SessionMetadata,
	pub lease: LeaseState,
}

impl RenewRequest {
	pub fn new(metadata: SessionMetadata, lease: LeaseState) -> Self {
		Self { metadata, lease }
	}

	/// Build a request from the raw metadata map held by the lease store.
	pub fn from_metadata(map: &BTreeMap<String, String>, lease: LeaseState) -> Result<Self> {
		Ok(Self {
			metadata: SessionMetadata::from_map(map)?,
			lease,
		})
	}
}

/// Why a renewal ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
	/// The directory now grants a different policy set.
	PolicyDrift,
	/// The session reached its configured maximum lifetime.
	MaxTtlReached,
}

impl RevocationReason {
	pub fn message(&self) -> &'static str {
		match self {
			Self::PolicyDrift => POLICY_DRIFT_MESSAGE,
			Self::MaxTtlReached => MAX_TTL_MESSAGE,
		}
	}
}

/// Result of a renewal attempt. The caller enacts it against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewOutcome {
	/// Policies unchanged; extend the lease.
	Extended(LeaseExtension),
	/// Revoke the session. `response` is the explicit error to surface.
	Revoked {
		reason: RevocationReason,
		response: Response,
	},
	/// The directory no longer authenticates the credential. Carries the
	/// resolver's own response, unchanged.
	Denied(Option<Response>),
}

impl RenewOutcome {
	fn revoked(reason: RevocationReason) -> Self {
		Self::Revoked {
			reason,
			response: Response::error(reason.message()),
		}
	}

	pub fn is_extended(&self) -> bool {
		matches!(self, Self::Extended(_))
	}

	pub fn extension(&self) -> Option<&LeaseExtension> {
		match self {
			Self::Extended(extension) => Some(extension),
			_ => None,
		}
	}

	/// Session state after this outcome is applied to an active session.
	pub fn next_state(&self) -> SessionState {
		match self {
			Self::Extended(_) => SessionState::Active,
			Self::Revoked { .. } | Self::Denied(_) => SessionState::Revoked,
		}
	}

	/// Collapse into the host framework's response shape.
	pub fn into_response(self) -> Option<Response> {
		match self {
			Self::Extended(extension) => Some(Response::LeaseExtended(extension)),
			Self::Revoked { response, .. } => Some(response),
			Self::Denied(response) => response,
		}
	}
}

/// Renew a session as of now.
pub async fn renew<R>(
	resolver: &R,
	request: RenewRequest,
	options: &RenewalOptions,
) -> Result<RenewOutcome>
where
	R: CredentialResolver + ?Sized,
{
	renew_at(resolver, request, options, Utc::now()).await
}

/// Renew a session as of `now`.
///
/// Resolver faults propagate verbatim. Nothing is written back; the returned
/// outcome tells the caller whether to extend or revoke.
#[instrument(
	name = "renew",
	skip_all,
	fields(
		username = %request.metadata.username,
		drift_reference = %options.drift_reference
	)
)]
pub async fn renew_at<R>(
	resolver: &R,
	request: RenewRequest,
	options: &RenewalOptions,
	now: DateTime<Utc>,
) -> Result<RenewOutcome>
where
	R: CredentialResolver + ?Sized,
{
	let RenewRequest { metadata, lease } = request;

	if options.drift_reference == DriftReference::Password {
		warn!("comparing renewal policies against the stored password; renewals will revoke");
	}

	let resolution = resolver.resolve(&metadata.credential()).await?;
	if resolution.is_denied() {
		info!(
			has_response = resolution.response.is_some(),
			"directory no longer authenticates session credential"
		);
		return Ok(RenewOutcome::Denied(resolution.response));
	}

	let current = PolicySet::canonicalize(resolution.policies).to_canonical_string();
	if current != options.drift_reference.recorded(&metadata) {
		warn!(
			current_policies = %current,
			"policies drifted since login, revoking session"
		);
		return Ok(RenewOutcome::revoked(RevocationReason::PolicyDrift));
	}

	match options.lease.extend(&lease, now) {
		Some(extension) => {
			debug!(
				ttl_secs = extension.ttl_secs,
				expires_at = %extension.expires_at,
				"lease extended"
			);
			Ok(RenewOutcome::Extended(extension))
		}
		None => {
			info!("session reached its maximum lifetime, revoking");
			Ok(RenewOutcome::revoked(RevocationReason::MaxTtlReached))
		}
	}
}
