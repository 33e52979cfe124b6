// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::event::{AuditEventType, AuditLogEntry, AuditSeverity};

/// Decides which entries reach the sinks.
///
/// An entry passes when its severity is at least `min_severity`, it is in
/// `include_events` (if set) and it is not in `exclude_events`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFilterConfig {
	pub min_severity: AuditSeverity,
	pub include_events: Option<Vec<AuditEventType>>,
	pub exclude_events: Option<Vec<AuditEventType>>,
}

impl AuditFilterConfig {
	/// A filter passing everything at or above the named severity.
	pub fn from_min_severity(name: &str) -> Result<Self, AuditError> {
		let min_severity = name.parse().map_err(AuditError::ConfigError)?;
		Ok(Self {
			min_severity,
			..Default::default()
		})
	}

	/// A filter passing every entry.
	pub fn allow_all() -> Self {
		Self {
			min_severity: AuditSeverity::Debug,
			..Default::default()
		}
	}

	pub fn allows(&self, entry: &AuditLogEntry) -> bool {
		if entry.severity < self.min_severity {
			return false;
		}

		if let Some(include) = &self.include_events {
			if !include.contains(&entry.event_type) {
				return false;
			}
		}

		if let Some(exclude) = &self.exclude_events {
			if exclude.contains(&entry.event_type) {
				return false;
			}
		}

		true
	}
}
