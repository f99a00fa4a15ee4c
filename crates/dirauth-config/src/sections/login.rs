// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login configuration.

use serde::{Deserialize, Serialize};

/// Login configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LoginConfig {
	/// Initial session lifetime. Zero defers to the lease store's default.
	pub initial_ttl_secs: u64,
}

/// Login configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginConfigLayer {
	#[serde(default)]
	pub initial_ttl_secs: Option<u64>,
}

impl LoginConfigLayer {
	pub fn merge(&mut self, other: LoginConfigLayer) {
		if other.initial_ttl_secs.is_some() {
			self.initial_ttl_secs = other.initial_ttl_secs;
		}
	}

	pub fn finalize(self) -> LoginConfig {
		LoginConfig {
			initial_ttl_secs: self.initial_ttl_secs.unwrap_or(0),
		}
	}
}
