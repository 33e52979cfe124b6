// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::AuditSinkError;
use crate::event::AuditLogEntry;
use crate::filter::AuditFilterConfig;
use crate::sink::AuditSink;

/// Keeps published entries in memory, in arrival order.
pub struct MemoryAuditSink {
	filter: AuditFilterConfig,
	entries: Mutex<Vec<Arc<AuditLogEntry>>>,
}

impl MemoryAuditSink {
	pub fn new(filter: AuditFilterConfig) -> Self {
		Self {
			filter,
			entries: Mutex::new(Vec::new()),
		}
	}

	/// Returns a snapshot of the entries received so far.
	pub async fn entries(&self) -> Vec<Arc<AuditLogEntry>> {
		self.entries.lock().await.clone()
	}

	pub async fn len(&self) -> usize {
		self.entries.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.entries.lock().await.is_empty()
	}
}

impl Default for MemoryAuditSink {
	fn default() -> Self {
		Self::new(AuditFilterConfig::allow_all())
	}
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
	fn name(&self) -> &str {
		"memory"
	}

	fn filter(&self) -> &AuditFilterConfig {
		&self.filter
	}

	async fn publish(&self, entry: Arc<AuditLogEntry>) -> Result<(), AuditSinkError> {
		self.entries.lock().await.push(entry);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::AuditEventType;

	#[tokio::test]
	async fn collects_in_order() {
		let sink = MemoryAuditSink::default();
		assert!(sink.is_empty().await);

		for event_type in [AuditEventType::OrderCreated, AuditEventType::OrderDelivered] {
			let entry = AuditLogEntry::builder(event_type).build();
			sink.publish(Arc::new(entry)).await.unwrap();
		}

		let entries = sink.entries().await;
		assert_eq!(sink.len().await, 2);
		assert_eq!(entries[0].event_type, AuditEventType::OrderCreated);
		assert_eq!(entries[1].event_type, AuditEventType::OrderDelivered);
	}
}
