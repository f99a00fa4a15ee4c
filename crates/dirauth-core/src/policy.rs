// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy set canonicalization.
//!
//! Directory lookups return policies in whatever order the directory happens
//! to produce them. Before a policy set is stored in session metadata or
//! compared during renewal it is canonicalized: sorted lexicographically,
//! duplicates collapsed, and joined with [`POLICY_DELIMITER`].
//!
//! Two sets with the same members always canonicalize to byte-identical
//! strings, which is what renewal drift detection relies on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delimiter used when rendering a policy set as a single string.
pub const POLICY_DELIMITER: &str = ",";

/// A canonical (sorted, de-duplicated) set of policy identifiers.
///
/// Policies are opaque tokens; no interpretation happens here.
///
/// # Example
///
/// ```
/// use dirauth_core::PolicySet;
///
/// let policies = PolicySet::canonicalize(["ops", "dev", "ops"]);
/// assert_eq!(policies.as_slice(), ["dev", "ops"]);
/// assert_eq!(policies.to_canonical_string(), "dev,ops");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PolicySet(Vec<String>);

impl PolicySet {
	/// Canonicalize any collection of policy identifiers.
	pub fn canonicalize<I, S>(policies: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut policies: Vec<String> = policies.into_iter().map(Into::into).collect();
		policies.sort();
		policies.dedup();
		Self(policies)
	}

	/// Parse a canonical policy string back into a set.
	///
	/// Empty segments are dropped, so `""` parses to the empty set.
	pub fn parse(canonical: &str) -> Self {
		Self::canonicalize(
			canonical
				.split(POLICY_DELIMITER)
				.filter(|segment| !segment.is_empty()),
		)
	}

	/// Render the set as its canonical delimited string.
	pub fn to_canonical_string(&self) -> String {
		self.0.join(POLICY_DELIMITER)
	}

	pub fn as_slice(&self) -> &[String] {
		&self.0
	}

	pub fn iter(&self) -> std::slice::Iter<'_, String> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn contains(&self, policy: &str) -> bool {
		self.0
			.binary_search_by(|p| p.as_str().cmp(policy))
			.is_ok()
	}

	pub fn into_vec(self) -> Vec<String> {
		self.0
	}
}

impl From<Vec<String>> for PolicySet {
	fn from(policies: Vec<String>) -> Self {
		Self::canonicalize(policies)
	}
}

impl From<PolicySet> for Vec<String> {
	fn from(set: PolicySet) -> Self {
		set.0
	}
}

impl<S: Into<String>> FromIterator<S> for PolicySet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self::canonicalize(iter)
	}
}

impl<'a> IntoIterator for &'a PolicySet {
	type Item = &'a String;
	type IntoIter = std::slice::Iter<'a, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl fmt::Display for PolicySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_canonical_string())
	}
}

/// Canonicalize a policy collection straight to its delimited string form.
pub fn canonical_policy_string<I, S>(policies: I) -> String
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	PolicySet::canonicalize(policies).to_canonical_string()
}
