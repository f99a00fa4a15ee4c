// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login: exchange a credential for a session descriptor.

use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::credential::Credential;
use crate::error::Result;
use crate::policy::PolicySet;
use crate::resolver::CredentialResolver;
use crate::response::Response;
use crate::session::{Auth, LeaseOptions, SessionMetadata};

/// Knobs applied to every issued session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoginOptions {
	/// Initial session lifetime; zero defers to the lease store's default.
	pub initial_ttl: Duration,
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
	/// The directory granted at least one policy.
	Authenticated(Auth),
	/// The directory granted nothing. Carries the resolver's own response,
	/// unchanged, which may be absent.
	Denied(Option<Response>),
}

impl LoginOutcome {
	pub fn is_authenticated(&self) -> bool {
		matches!(self, Self::Authenticated(_))
	}

	pub fn auth(&self) -> Option<&Auth> {
		match self {
			Self::Authenticated(auth) => Some(auth),
			Self::Denied(_) => None,
		}
	}

	/// Collapse into the host framework's response shape.
	pub fn into_response(self) -> Option<Response> {
		match self {
			Self::Authenticated(auth) => Some(Response::Auth(auth)),
			Self::Denied(response) => response,
		}
	}
}

/// Authenticate `credential` and build the session descriptor.
///
/// Resolver faults propagate verbatim. An empty policy set returns the
/// resolver's response as-is without fabricating a session. Nothing is
/// persisted here; storing the returned [`Auth`] is the caller's job.
#[instrument(
	name = "login",
	skip_all,
	fields(username = %credential.username)
)]
pub async fn login<R>(
	resolver: &R,
	credential: Credential,
	options: &LoginOptions,
) -> Result<LoginOutcome>
where
	R: CredentialResolver + ?Sized,
{
	let resolution = resolver.resolve(&credential).await?;
	if resolution.is_denied() {
		info!(
			has_response = resolution.response.is_some(),
			"directory granted no policies, login denied"
		);
		return Ok(LoginOutcome::Denied(resolution.response));
	}

	let policies = PolicySet::canonicalize(resolution.policies);
	let display_name = credential.username.clone();
	let metadata = SessionMetadata::new(credential, &policies);

	debug!(
		policies = %policies,
		policy_count = policies.len(),
		"login succeeded"
	);

	Ok(LoginOutcome::Authenticated(Auth {
		policies,
		metadata,
		display_name,
		lease: LeaseOptions {
			ttl_secs: options.initial_ttl.as_secs(),
			renewable: true,
		},
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::{AuthError, ResolverError};
	use crate::resolver::Resolution;
	use crate::session::{METADATA_PASSWORD, METADATA_POLICIES, METADATA_USERNAME};
	use async_trait::async_trait;
	use proptest::prelude::*;

	enum Scripted {
		Grant(Vec<String>),
		Deny(Option<Response>),
		Fail,
	}

	#[async_trait]
	impl CredentialResolver for Scripted {
		async fn resolve(&self, _credential: &Credential) -> std::result::Result<Resolution, ResolverError> {
			match self {
				Scripted::Grant(policies) => Ok(Resolution::granted(policies.clone())),
				Scripted::Deny(response) => Ok(Resolution::denied(response.clone())),
				Scripted::Fail => Err(ResolverError::Unreachable("ldap://dc1".to_string())),
			}
		}
	}

	fn grant(policies: &[&str]) -> Scripted {
		Scripted::Grant(policies.iter().map(|p| p.to_string()).collect())
	}

	#[tokio::test]
	async fn success_builds_session_with_canonical_policies() {
		let outcome = login(
			&grant(&["web", "admin"]),
			Credential::new("alice", "hunter2"),
			&LoginOptions::default(),
		)
		.await
		.unwrap();

		let auth = outcome.auth().expect("authenticated");
		assert_eq!(auth.policies.as_slice(), ["admin", "web"]);
		assert_eq!(auth.display_name, "alice");
		assert_eq!(auth.metadata.policies, "admin,web");
		assert!(auth.lease.renewable);
		assert_eq!(auth.lease.ttl_secs, 0);
	}

	#[tokio::test]
	async fn success_metadata_retains_credential_for_replay() {
		let outcome = login(
			&grant(&["dev"]),
			Credential::new("uid=bob,ou=people", "p@ss"),
			&LoginOptions::default(),
		)
		.await
		.unwrap();

		let map = outcome.auth().unwrap().metadata.to_map();
		assert_eq!(map[METADATA_USERNAME], "uid=bob,ou=people");
		assert_eq!(map[METADATA_PASSWORD], "p@ss");
		assert_eq!(map[METADATA_POLICIES], "dev");
	}

	#[tokio::test]
	async fn initial_ttl_is_applied() {
		let options = LoginOptions {
			initial_ttl: Duration::from_secs(900),
		};
		let outcome = login(&grant(&["dev"]), Credential::new("alice", "pw"), &options)
			.await
			.unwrap();
		assert_eq!(outcome.auth().unwrap().lease.ttl_secs, 900);
	}

	#[tokio::test]
	async fn denial_passes_resolver_response_through() {
		let response = Response::error("invalid username or password");
		let outcome = login(
			&Scripted::Deny(Some(response.clone())),
			Credential::new("alice", "wrong"),
			&LoginOptions::default(),
		)
		.await
		.unwrap();

		assert!(!outcome.is_authenticated());
		assert_eq!(outcome.into_response(), Some(response));
	}

	#[tokio::test]
	async fn denial_without_response_yields_nothing() {
		let outcome = login(
			&Scripted::Deny(None),
			Credential::new("alice", "wrong"),
			&LoginOptions::default(),
		)
		.await
		.unwrap();

		assert_eq!(outcome, LoginOutcome::Denied(None));
		assert_eq!(outcome.into_response(), None);
	}

	#[tokio::test]
	async fn resolver_fault_propagates_verbatim() {
		let err = login(
			&Scripted::Fail,
			Credential::new("alice", "pw"),
			&LoginOptions::default(),
		)
		.await
		.unwrap_err();

		assert!(matches!(
			err,
			AuthError::Resolver(ResolverError::Unreachable(_))
		));
		assert_eq!(err.to_string(), "directory unreachable: ldap://dc1");
	}

	#[tokio::test]
	async fn authenticated_outcome_converts_to_auth_response() {
		let outcome = login(
			&grant(&["dev"]),
			Credential::new("alice", "pw"),
			&LoginOptions::default(),
		)
		.await
		.unwrap();

		assert!(matches!(outcome.into_response(), Some(Response::Auth(_))));
	}

	proptest! {
			#[test]
			fn metadata_policies_match_canonical_form(
					policies in prop::collection::vec("[a-z]{1,8}", 1..10),
					username in "[a-z]{1,16}",
					password in "[ -~]{0,24}"
			) {
					let expected = crate::policy::canonical_policy_string(policies.clone());
					let outcome = tokio_test::block_on(login(
							&Scripted::Grant(policies),
							Credential::new(username.clone(), password.clone()),
							&LoginOptions::default(),
					)).unwrap();

					let auth = outcome.auth().unwrap();
					prop_assert_eq!(&auth.metadata.policies, &expected);
					prop_assert_eq!(&auth.metadata.username, &username);
					prop_assert_eq!(auth.metadata.password.expose(), password.as_str());
					prop_assert_eq!(auth.policies.to_canonical_string(), expected);
			}
	}
}
