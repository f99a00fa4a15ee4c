// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Renewal configuration section.

use dirauth_core::{DriftReference, DEFAULT_RENEWAL_INCREMENT_SECS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RenewalConfigLayer {
	#[serde(default)]
	pub increment_secs: Option<u64>,
	#[serde(default)]
	pub max_session_ttl_secs: Option<u64>,
	#[serde(default)]
	pub drift_reference: Option<DriftReference>,
}

impl RenewalConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.increment_secs.is_some() {
			self.increment_secs = other.increment_secs;
		}
		if other.max_session_ttl_secs.is_some() {
			self.max_session_ttl_secs = other.max_session_ttl_secs;
		}
		if other.drift_reference.is_some() {
			self.drift_reference = other.drift_reference;
		}
	}

	pub fn finalize(self) -> RenewalConfig {
		RenewalConfig {
			increment_secs: self
				.increment_secs
				.unwrap_or(DEFAULT_RENEWAL_INCREMENT_SECS),
			max_session_ttl_secs: self.max_session_ttl_secs.unwrap_or(0),
			drift_reference: self.drift_reference.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RenewalConfig {
	/// Largest extension a single renewal grants.
	pub increment_secs: u64,
	/// Cap on total session lifetime. Zero means unbounded.
	pub max_session_ttl_secs: u64,
	pub drift_reference: DriftReference,
}

impl Default for RenewalConfig {
	fn default() -> Self {
		RenewalConfigLayer::default().finalize()
	}
}
