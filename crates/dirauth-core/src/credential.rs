// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Username/password credentials.
//!
//! The password is wrapped in [`Password`], which:
//!
//! - Never appears in logs (redacted `Debug`/`Display`)
//! - Never serializes to plain text (redacted `Serialize`)
//! - Is zeroized from memory on drop
//! - Requires an explicit `.expose()` call to read
//!
//! ```
//! use dirauth_core::Credential;
//!
//! let credential = Credential::new("alice", "hunter2");
//! assert_eq!(format!("{}", credential.password), "[REDACTED]");
//! assert_eq!(credential.password.expose(), "hunter2");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroize;

/// The redaction placeholder used in all password output.
pub const REDACTED: &str = "[REDACTED]";

/// A plaintext password that refuses to be printed.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Password {
	inner: String,
}

impl Password {
	pub fn new(inner: impl Into<String>) -> Self {
		Self {
			inner: inner.into(),
		}
	}

	/// Explicitly access the plaintext.
	///
	/// Every call site that needs the raw password goes through here so the
	/// access is visible in review.
	pub fn expose(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl Clone for Password {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl fmt::Debug for Password {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Password").field(&REDACTED).finish()
	}
}

impl fmt::Display for Password {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl PartialEq for Password {
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl Eq for Password {}

impl From<String> for Password {
	fn from(inner: String) -> Self {
		Self::new(inner)
	}
}

impl From<&str> for Password {
	fn from(inner: &str) -> Self {
		Self::new(inner)
	}
}

impl Serialize for Password {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for Password {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let inner = String::deserialize(deserializer)?;
		Ok(Password::new(inner))
	}
}

/// A username/password pair presented for login.
///
/// Neither field is format-validated; whatever the caller supplies is what
/// the directory sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	pub username: String,
	pub password: Password,
}

impl Credential {
	pub fn new(username: impl Into<String>, password: impl Into<Password>) -> Self {
		Self {
			username: username.into(),
			password: password.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod password {
		use super::*;

		#[test]
		fn debug_is_redacted() {
			let password = Password::new("correct-horse-battery");
			let debug_output = format!("{password:?}");

			assert!(!debug_output.contains("correct-horse-battery"));
			assert!(debug_output.contains(REDACTED));
		}

		#[test]
		fn display_is_redacted() {
			let password = Password::new("correct-horse-battery");
			assert_eq!(format!("{password}"), REDACTED);
		}

		#[test]
		fn expose_returns_plaintext() {
			let password = Password::new("correct-horse-battery");
			assert_eq!(password.expose(), "correct-horse-battery");
		}

		#[test]
		fn serialize_is_redacted() {
			let password = Password::new("correct-horse-battery");
			let json = serde_json::to_string(&password).unwrap();
			assert_eq!(json, format!("\"{REDACTED}\""));
		}

		#[test]
		fn deserialize_populates_plaintext() {
			let password: Password = serde_json::from_str(r#""s3cret""#).unwrap();
			assert_eq!(password.expose(), "s3cret");
		}

		#[test]
		fn empty_password_is_detected() {
			assert!(Password::new("").is_empty());
			assert!(!Password::new("x").is_empty());
		}
	}

	mod credential {
		use super::*;

		#[test]
		fn debug_never_leaks_password() {
			let credential = Credential::new("alice", "hunter2");
			let debug_output = format!("{credential:?}");
			assert!(debug_output.contains("alice"));
			assert!(!debug_output.contains("hunter2"));
		}

		#[test]
		fn deserializes_from_request_fields() {
			let credential: Credential =
				serde_json::from_str(r#"{"username":"uid=alice,ou=users","password":"pw"}"#).unwrap();
			assert_eq!(credential.username, "uid=alice,ou=users");
			assert_eq!(credential.password.expose(), "pw");
		}
	}

	proptest! {
			#[test]
			fn debug_never_contains_password(inner in "[0-9!@#$%^&*_+=;:,.<>?/-]{3,50}") {
					let password = Password::new(inner.clone());
					let rendered = format!("{password:?}");
					prop_assert!(!rendered.contains(&inner));
			}

			#[test]
			fn expose_roundtrips(inner in ".*") {
					let password = Password::new(inner.clone());
					prop_assert_eq!(password.expose(), inner.as_str());
			}
	}
}
