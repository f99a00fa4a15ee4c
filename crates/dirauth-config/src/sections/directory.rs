// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory configuration (runtime, fully resolved).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirectoryConfig {
	/// Static directory TOML file.
	pub users_file: Option<PathBuf>,
	/// Deny bound users that map to no policies with an explanatory message.
	pub deny_unmapped: bool,
}

impl Default for DirectoryConfig {
	fn default() -> Self {
		Self {
			users_file: None,
			deny_unmapped: true,
		}
	}
}

/// Directory configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfigLayer {
	#[serde(default)]
	pub users_file: Option<PathBuf>,
	#[serde(default)]
	pub deny_unmapped: Option<bool>,
}

impl DirectoryConfigLayer {
	pub fn merge(&mut self, other: DirectoryConfigLayer) {
		if other.users_file.is_some() {
			self.users_file = other.users_file;
		}
		if other.deny_unmapped.is_some() {
			self.deny_unmapped = other.deny_unmapped;
		}
	}

	pub fn finalize(self) -> DirectoryConfig {
		DirectoryConfig {
			users_file: self.users_file,
			deny_unmapped: self.deny_unmapped.unwrap_or(true),
		}
	}
}
