// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Responses handed back to the host framework.

use serde::Serialize;

use crate::lease::LeaseExtension;
use crate::session::Auth;

/// A response the host framework translates into its own wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
	/// A newly issued session.
	Auth(Auth),
	/// A granted lease extension.
	LeaseExtended(LeaseExtension),
	/// A user-visible error message.
	Error { message: String },
}

impl Response {
	pub fn error(message: impl Into<String>) -> Self {
		Self::Error {
			message: message.into(),
		}
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Self::Error { .. })
	}

	pub fn error_message(&self) -> Option<&str> {
		match self {
			Self::Error { message } => Some(message),
			_ => None,
		}
	}
}
