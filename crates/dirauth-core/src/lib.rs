// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory credential login and lease renewal.
//!
//! This crate turns a username/password credential into a renewable session
//! bound to a set of authorization policies, and decides whether a later
//! renewal of that session may be granted.
//!
//! # The Flow
//!
//! ```text
//! ┌──────────┐  login(credential)   ┌─────────────┐  resolve   ┌───────────┐
//! │  Caller  │─────────────────────>│   Backend   │───────────>│ Directory │
//! └────┬─────┘                      └──────┬──────┘            └───────────┘
//!      │   Auth { policies, metadata }     │
//!      │<──────────────────────────────────│
//!      │                                   │
//!      │  renew(stored metadata, lease)    │  resolve (replayed credential)
//!      │──────────────────────────────────>│───────────────────────────────>
//!      │                                   │
//!      │  Extended | Revoked | Denied      │  compare canonical policy strings
//!      │<──────────────────────────────────│
//! ```
//!
//! The directory itself, session persistence and lease enforcement belong to
//! the host platform. This crate only consumes a [`CredentialResolver`] and
//! returns decisions for the caller to enact.
//!
//! # Security Notes
//!
//! - Session metadata retains the plaintext password so renewal can replay
//!   it. The session store must protect that field at rest.
//! - Passwords are held in [`Password`], which redacts `Debug`/`Display` and
//!   zeroizes on drop. [`SessionMetadata::to_map`] is the only API that hands
//!   the plaintext out, and it exists for the store.

pub mod backend;
pub mod credential;
pub mod directory;
pub mod error;
pub mod lease;
pub mod login;
pub mod policy;
pub mod renew;
pub mod resolver;
pub mod response;
pub mod session;

pub use backend::{BackendConfig, DirectoryLoginBackend};
pub use credential::{Credential, Password, REDACTED};
pub use directory::{
	hash_password, DirectoryClient, DirectoryError, DirectoryUser, GroupPolicyResolver,
	StaticDirectory,
};
pub use error::{AuthError, ResolverError, Result};
pub use lease::{LeaseExtension, LeasePolicy, LeaseState, DEFAULT_RENEWAL_INCREMENT_SECS};
pub use login::{login, LoginOptions, LoginOutcome};
pub use policy::{canonical_policy_string, PolicySet, POLICY_DELIMITER};
pub use renew::{
	renew, renew_at, DriftReference, RenewOutcome, RenewRequest, RenewalOptions,
	RevocationReason, MAX_TTL_MESSAGE, POLICY_DRIFT_MESSAGE,
};
pub use resolver::{CredentialResolver, Resolution};
pub use response::Response;
pub use session::{
	Auth, LeaseOptions, SessionMetadata, SessionState, METADATA_PASSWORD, METADATA_POLICIES,
	METADATA_USERNAME,
};
