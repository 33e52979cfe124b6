// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod file;
pub mod memory;
pub mod tracing;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuditSinkError;
use crate::event::AuditLogEntry;
use crate::filter::AuditFilterConfig;

/// A destination for audit entries.
///
/// Each sink applies its own filter after the service's global filter.
#[async_trait]
pub trait AuditSink: Send + Sync {
	fn name(&self) -> &str;

	fn filter(&self) -> &AuditFilterConfig;

	async fn publish(&self, entry: Arc<AuditLogEntry>) -> Result<(), AuditSinkError>;
}

pub use self::file::FileAuditSink;
pub use self::memory::MemoryAuditSink;
pub use self::tracing::TracingAuditSink;
