// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod directory;
mod logging;
mod login;
mod renewal;

pub use directory::{DirectoryConfig, DirectoryConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use login::{LoginConfig, LoginConfigLayer};
pub use renewal::{RenewalConfig, RenewalConfigLayer};
