// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The credential resolver seam.
//!
//! A [`CredentialResolver`] is whatever validates a credential against the
//! directory and reports the policies it grants. Login and renewal both go
//! through it; neither handler knows how the directory is reached.

use async_trait::async_trait;
use std::sync::Arc;

use crate::credential::Credential;
use crate::error::ResolverError;
use crate::response::Response;

/// What a resolver learned about a credential.
///
/// An empty `policies` list means authentication did not succeed. That is a
/// normal denial, not a fault; `response` optionally explains it and is
/// handed back to the caller untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
	pub policies: Vec<String>,
	pub response: Option<Response>,
}

impl Resolution {
	pub fn granted<I, S>(policies: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			policies: policies.into_iter().map(Into::into).collect(),
			response: None,
		}
	}

	pub fn denied(response: Option<Response>) -> Self {
		Self {
			policies: Vec::new(),
			response,
		}
	}

	pub fn denied_with_error(message: impl Into<String>) -> Self {
		Self::denied(Some(Response::error(message)))
	}

	pub fn is_denied(&self) -> bool {
		self.policies.is_empty()
	}
}

/// Validates credentials against a directory.
///
/// Implementations may block on network I/O. Handlers never retry and never
/// impose timeouts; dropping the returned future cancels the lookup.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
	async fn resolve(&self, credential: &Credential) -> Result<Resolution, ResolverError>;
}

#[async_trait]
impl<T> CredentialResolver for Arc<T>
where
	T: CredentialResolver + ?Sized,
{
	async fn resolve(&self, credential: &Credential) -> Result<Resolution, ResolverError> {
		(**self).resolve(credential).await
	}
}

#[async_trait]
impl<T> CredentialResolver for Box<T>
where
	T: CredentialResolver + ?Sized,
{
	async fn resolve(&self, credential: &Credential) -> Result<Resolution, ResolverError> {
		(**self).resolve(credential).await
	}
}
