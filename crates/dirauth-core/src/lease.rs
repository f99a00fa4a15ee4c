// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded lease extension.
//!
//! A successful renewal never extends a session indefinitely. Each renewal
//! grants at most [`LeasePolicy::increment`], and when a maximum session
//! lifetime is configured the new expiry is capped at `issued_at +
//! max_session_ttl`.
//!
//! ```text
//! issued_at            now                 now + increment
//!     │─────────────────│─────────────────────│
//!     │<──────── max_session_ttl ───────>│
//!                                         ▲ capped expiry
//! ```

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default extension granted per renewal (one hour).
pub const DEFAULT_RENEWAL_INCREMENT_SECS: u64 = 3600;

/// How far a renewal may push a session's expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeasePolicy {
	/// Largest extension granted by a single renewal.
	pub increment: Duration,
	/// Cap on total session lifetime measured from issue time. `None` means
	/// the store's own maximum applies.
	pub max_session_ttl: Option<Duration>,
}

impl Default for LeasePolicy {
	fn default() -> Self {
		Self {
			increment: Duration::from_secs(DEFAULT_RENEWAL_INCREMENT_SECS),
			max_session_ttl: None,
		}
	}
}

/// Lease facts the store supplies with a renewal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseState {
	pub issued_at: DateTime<Utc>,
	/// Increment asked for by the client, if any.
	#[serde(default)]
	pub requested_increment_secs: Option<u64>,
}

impl LeaseState {
	pub fn issued_at(issued_at: DateTime<Utc>) -> Self {
		Self {
			issued_at,
			requested_increment_secs: None,
		}
	}

	pub fn with_requested_increment(mut self, increment: Duration) -> Self {
		self.requested_increment_secs = Some(increment.as_secs());
		self
	}
}

/// A granted extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseExtension {
	pub ttl_secs: u64,
	pub expires_at: DateTime<Utc>,
}

impl LeasePolicy {
	pub fn new(increment: Duration, max_session_ttl: Option<Duration>) -> Self {
		Self {
			increment,
			max_session_ttl,
		}
	}

	/// Compute the extension for `lease` at `now`.
	///
	/// Returns `None` when the session has already reached its maximum
	/// lifetime and nothing can be granted.
	pub fn extend(&self, lease: &LeaseState, now: DateTime<Utc>) -> Option<LeaseExtension> {
		let mut ttl_secs = match lease.requested_increment_secs {
			Some(requested) if requested > 0 && requested <= self.increment.as_secs() => requested,
			_ => self.increment.as_secs(),
		};

		if let Some(max) = self.max_session_ttl {
			let deadline = lease
				.issued_at
				.checked_add_signed(to_chrono(max))
				.unwrap_or(DateTime::<Utc>::MAX_UTC);
			let remaining = (deadline - now).num_seconds();
			if remaining <= 0 {
				debug!(
					issued_at = %lease.issued_at,
					max_session_ttl_secs = max.as_secs(),
					"lease reached maximum session lifetime"
				);
				return None;
			}
			ttl_secs = ttl_secs.min(remaining as u64);
		}

		let expires_at = now
			.checked_add_signed(to_chrono(Duration::from_secs(ttl_secs)))
			.unwrap_or(DateTime::<Utc>::MAX_UTC);

		Some(LeaseExtension {
			ttl_secs,
			expires_at,
		})
	}
}

fn to_chrono(duration: Duration) -> ChronoDuration {
	ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn hours(n: u64) -> Duration {
		Duration::from_secs(n * 3600)
	}

	#[test]
	fn default_increment_is_one_hour() {
		assert_eq!(LeasePolicy::default().increment, hours(1));
		assert!(LeasePolicy::default().max_session_ttl.is_none());
	}

	#[test]
	fn grants_full_increment_without_cap() {
		let now = Utc::now();
		let lease = LeaseState::issued_at(now - ChronoDuration::hours(10));

		let ext = LeasePolicy::default().extend(&lease, now).unwrap();
		assert_eq!(ext.ttl_secs, 3600);
		assert_eq!(ext.expires_at, now + ChronoDuration::hours(1));
	}

	#[test]
	fn honors_smaller_requested_increment() {
		let now = Utc::now();
		let lease = LeaseState::issued_at(now).with_requested_increment(Duration::from_secs(600));

		let ext = LeasePolicy::default().extend(&lease, now).unwrap();
		assert_eq!(ext.ttl_secs, 600);
	}

	#[test]
	fn clamps_oversized_requested_increment() {
		let now = Utc::now();
		let lease = LeaseState::issued_at(now).with_requested_increment(hours(24));

		let ext = LeasePolicy::default().extend(&lease, now).unwrap();
		assert_eq!(ext.ttl_secs, 3600);
	}

	#[test]
	fn zero_requested_increment_uses_policy_increment() {
		let now = Utc::now();
		let lease = LeaseState::issued_at(now).with_requested_increment(Duration::ZERO);

		let ext = LeasePolicy::default().extend(&lease, now).unwrap();
		assert_eq!(ext.ttl_secs, 3600);
	}

	#[test]
	fn caps_at_max_session_ttl() {
		let now = Utc::now();
		let lease = LeaseState::issued_at(now - ChronoDuration::minutes(90));
		let policy = LeasePolicy::new(hours(1), Some(hours(2)));

		let ext = policy.extend(&lease, now).unwrap();
		assert_eq!(ext.ttl_secs, 30 * 60);
		assert_eq!(ext.expires_at, lease.issued_at + ChronoDuration::hours(2));
	}

	#[test]
	fn refuses_when_max_session_ttl_reached() {
		let now = Utc::now();
		let lease = LeaseState::issued_at(now - ChronoDuration::hours(3));
		let policy = LeasePolicy::new(hours(1), Some(hours(2)));

		assert!(policy.extend(&lease, now).is_none());
	}

	#[test]
	fn huge_max_session_ttl_does_not_overflow() {
		let now = Utc::now();
		let lease = LeaseState::issued_at(now);
		let policy = LeasePolicy::new(hours(1), Some(Duration::from_secs(u64::MAX)));

		let ext = policy.extend(&lease, now).unwrap();
		assert_eq!(ext.ttl_secs, 3600);
	}

	proptest! {
			#[test]
			fn extension_never_exceeds_increment(
					increment_secs in 1u64..86_400,
					requested in proptest::option::of(0u64..200_000),
					age_secs in 0i64..100_000
			) {
					let now = Utc::now();
					let lease = LeaseState {
							issued_at: now - ChronoDuration::seconds(age_secs),
							requested_increment_secs: requested,
					};
					let policy = LeasePolicy::new(Duration::from_secs(increment_secs), None);

					let ext = policy.extend(&lease, now).unwrap();
					prop_assert!(ext.ttl_secs <= increment_secs);
					prop_assert!(ext.ttl_secs > 0);
			}

			#[test]
			fn capped_expiry_never_passes_deadline(
					increment_secs in 1u64..86_400,
					max_secs in 1u64..200_000,
					age_secs in 0i64..200_000
			) {
					let now = Utc::now();
					let lease = LeaseState::issued_at(now - ChronoDuration::seconds(age_secs));
					let policy = LeasePolicy::new(
							Duration::from_secs(increment_secs),
							Some(Duration::from_secs(max_secs)),
					);
					let deadline = lease.issued_at + ChronoDuration::seconds(max_secs as i64);

					match policy.extend(&lease, now) {
							Some(ext) => prop_assert!(ext.expires_at <= deadline),
							None => prop_assert!(deadline <= now),
					}
			}
	}
}
