// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod audit;
mod logging;
mod policy;

pub use audit::{
	is_known_severity, AuditConfig, AuditConfigLayer, QueueOverflowPolicy, SEVERITY_NAMES,
};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use policy::{PolicyConfig, PolicyConfigLayer, MAX_DEMO_WINDOW_DAYS};
