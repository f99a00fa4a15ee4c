// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for login and renewal.
//!
//! Authentication denials and policy drift are not errors; they come back as
//! outcomes. Only resolver faults and malformed session metadata surface here.

use thiserror::Error;

/// Faults raised by a [`CredentialResolver`](crate::CredentialResolver).
///
/// These are propagated to the caller verbatim; the handlers never wrap or
/// reclassify them.
#[derive(Debug, Error)]
pub enum ResolverError {
	/// The directory could not be reached (connection refused, timeout, DNS).
	#[error("directory unreachable: {0}")]
	Unreachable(String),

	/// The service account bind used for searching was rejected.
	#[error("directory bind failed: {0}")]
	Bind(String),

	/// The directory answered with something the resolver could not interpret.
	#[error("directory protocol error: {0}")]
	Protocol(String),
}

/// Errors returned by the login and renewal handlers.
#[derive(Debug, Error)]
pub enum AuthError {
	#[error(transparent)]
	Resolver(#[from] ResolverError),

	/// Session metadata handed in for renewal lacks a key written at login.
	#[error("session metadata is missing required key '{key}'")]
	MissingMetadata { key: &'static str },
}

/// Result type for login and renewal operations.
pub type Result<T> = std::result::Result<T, AuthError>;
