// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::error::AuditSinkError;
use crate::event::{AuditLogEntry, AuditSeverity};
use crate::filter::AuditFilterConfig;
use crate::sink::AuditSink;

/// Emits audit entries as `tracing` events under the `audit` target.
pub struct TracingAuditSink {
	filter: AuditFilterConfig,
}

impl TracingAuditSink {
	pub fn new(filter: AuditFilterConfig) -> Self {
		Self { filter }
	}
}

impl Default for TracingAuditSink {
	fn default() -> Self {
		Self::new(AuditFilterConfig::allow_all())
	}
}

#[async_trait]
impl AuditSink for TracingAuditSink {
	fn name(&self) -> &str {
		"tracing"
	}

	fn filter(&self) -> &AuditFilterConfig {
		&self.filter
	}

	async fn publish(&self, entry: Arc<AuditLogEntry>) -> Result<(), AuditSinkError> {
		let details = entry.details.to_string();
		let actor = entry.actor_id.as_ref().map(|id| id.as_str()).unwrap_or("-");
		let resource_id = entry.resource_id.as_deref().unwrap_or("-");

		macro_rules! emit {
			($level:ident) => {
				$level!(
					target: "audit",
					audit_id = %entry.id,
					event_type = %entry.event_type,
					actor,
					resource_type = entry.resource_type.as_deref().unwrap_or("-"),
					resource_id,
					action = %entry.action,
					details = %details,
					"audit event"
				)
			};
		}

		match entry.severity {
			AuditSeverity::Debug => emit!(debug),
			AuditSeverity::Info | AuditSeverity::Notice => emit!(info),
			AuditSeverity::Warning => emit!(warn),
			AuditSeverity::Error | AuditSeverity::Critical => emit!(error),
		}

		Ok(())
	}
}
