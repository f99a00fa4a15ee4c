// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The login backend facade.
//!
//! [`DirectoryLoginBackend`] bundles a resolver with its configuration so a
//! host can register one value and route both login and renewal through it.

use std::sync::Arc;
use tracing::{info, warn};

use crate::credential::Credential;
use crate::error::Result;
use crate::login::{login, LoginOptions, LoginOutcome};
use crate::renew::{renew, DriftReference, RenewOutcome, RenewRequest, RenewalOptions};
use crate::resolver::CredentialResolver;

/// Behavior fixed when the backend is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendConfig {
	pub login: LoginOptions,
	pub renewal: RenewalOptions,
}

pub struct DirectoryLoginBackend<R: ?Sized> {
	config: BackendConfig,
	resolver: Arc<R>,
}

impl<R> DirectoryLoginBackend<R>
where
	R: CredentialResolver + ?Sized,
{
	pub fn new(resolver: Arc<R>, config: BackendConfig) -> Self {
		info!(
			drift_reference = %config.renewal.drift_reference,
			renewal_increment_secs = config.renewal.lease.increment.as_secs(),
			max_session_ttl_secs = config.renewal.lease.max_session_ttl.map(|d| d.as_secs()),
			"directory login backend configured"
		);
		if config.renewal.drift_reference == DriftReference::Password {
			warn!(
				"renewal drift reference is 'password'; sessions will be revoked on renewal \
				 unless a policy string equals the stored password"
			);
		}
		Self { config, resolver }
	}

	pub fn config(&self) -> &BackendConfig {
		&self.config
	}

	pub async fn login(&self, credential: Credential) -> Result<LoginOutcome> {
		login(self.resolver.as_ref(), credential, &self.config.login).await
	}

	pub async fn renew(&self, request: RenewRequest) -> Result<RenewOutcome> {
		renew(self.resolver.as_ref(), request, &self.config.renewal).await
	}
}

impl<R: ?Sized> Clone for DirectoryLoginBackend<R> {
	fn clone(&self) -> Self {
		Self {
			config: self.config,
			resolver: Arc::clone(&self.resolver),
		}
	}
}

impl<R: ?Sized> std::fmt::Debug for DirectoryLoginBackend<R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DirectoryLoginBackend")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}
