// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	DirectoryConfigLayer, LoggingConfigLayer, LoginConfigLayer, RenewalConfigLayer,
};

/// Configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirauthConfigLayer {
	#[serde(default)]
	pub login: Option<LoginConfigLayer>,
	#[serde(default)]
	pub renewal: Option<RenewalConfigLayer>,
	#[serde(default)]
	pub directory: Option<DirectoryConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl DirauthConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: DirauthConfigLayer) {
		merge_option(&mut self.login, other.login, LoginConfigLayer::merge);
		merge_option(&mut self.renewal, other.renewal, RenewalConfigLayer::merge);
		merge_option(
			&mut self.directory,
			other.directory,
			DirectoryConfigLayer::merge,
		);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}
