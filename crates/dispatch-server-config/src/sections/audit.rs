// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit logging configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_QUEUE_CAPACITY: usize = 10000;

/// Severity names accepted by `audit.min_severity`, including the `warn` and
/// `crit` aliases.
pub const SEVERITY_NAMES: &[&str] = &[
	"critical", "crit", "error", "warning", "warn", "notice", "info", "debug",
];

/// Returns true if `name` is a known severity, ignoring case and surrounding
/// whitespace.
pub fn is_known_severity(name: &str) -> bool {
	let normalized = name.trim().to_lowercase();
	SEVERITY_NAMES.contains(&normalized.as_str())
}

fn default_queue_capacity() -> usize {
	DEFAULT_QUEUE_CAPACITY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueOverflowPolicy {
	#[default]
	DropNewest,
	Block,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuditConfigLayer {
	pub enabled: Option<bool>,
	pub queue_capacity: Option<usize>,
	pub queue_overflow_policy: Option<QueueOverflowPolicy>,
	pub min_severity: Option<String>,
	pub file_path: Option<PathBuf>,
}

impl AuditConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.queue_capacity.is_some() {
			self.queue_capacity = other.queue_capacity;
		}
		if other.queue_overflow_policy.is_some() {
			self.queue_overflow_policy = other.queue_overflow_policy;
		}
		if other.min_severity.is_some() {
			self.min_severity = other.min_severity;
		}
		if other.file_path.is_some() {
			self.file_path = other.file_path;
		}
	}

	pub fn finalize(self) -> AuditConfig {
		AuditConfig {
			enabled: self.enabled.unwrap_or(true),
			queue_capacity: self.queue_capacity.unwrap_or_else(default_queue_capacity),
			queue_overflow_policy: self.queue_overflow_policy.unwrap_or_default(),
			min_severity: self.min_severity.unwrap_or_else(|| "info".to_string()),
			file_path: self.file_path,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditConfig {
	pub enabled: bool,
	pub queue_capacity: usize,
	pub queue_overflow_policy: QueueOverflowPolicy,
	pub min_severity: String,
	/// When set, entries are also appended to this file as JSON lines.
	pub file_path: Option<PathBuf>,
}

impl Default for AuditConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			queue_capacity: default_queue_capacity(),
			queue_overflow_policy: QueueOverflowPolicy::default(),
			min_severity: "info".to_string(),
			file_path: None,
		}
	}
}
