// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::AuditSinkError;
use crate::event::AuditLogEntry;
use crate::filter::AuditFilterConfig;
use crate::sink::AuditSink;

/// Appends entries to a file as JSON lines. The file is opened on first use.
pub struct FileAuditSink {
	path: PathBuf,
	filter: AuditFilterConfig,
	handle: Mutex<Option<File>>,
}

impl FileAuditSink {
	pub fn new(path: impl Into<PathBuf>, filter: AuditFilterConfig) -> Self {
		Self {
			path: path.into(),
			filter,
			handle: Mutex::new(None),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	async fn open(&self) -> Result<File, AuditSinkError> {
		OpenOptions::new()
			.create(true)
			.append(true)
			.open(&self.path)
			.await
			.map_err(|e| AuditSinkError::Transient(format!("failed to open file: {e}")))
	}
}

#[async_trait]
impl AuditSink for FileAuditSink {
	fn name(&self) -> &str {
		"file"
	}

	fn filter(&self) -> &AuditFilterConfig {
		&self.filter
	}

	async fn publish(&self, entry: Arc<AuditLogEntry>) -> Result<(), AuditSinkError> {
		let line = format_json_line(&entry)?;

		let mut guard = self.handle.lock().await;
		if guard.is_none() {
			*guard = Some(self.open().await?);
		}
		let file = guard
			.as_mut()
			.ok_or_else(|| AuditSinkError::Permanent("file handle not initialized".to_string()))?;

		file.write_all(line.as_bytes())
			.await
			.map_err(|e| AuditSinkError::Transient(format!("failed to write to file: {e}")))?;

		file.flush()
			.await
			.map_err(|e| AuditSinkError::Transient(format!("failed to flush file: {e}")))?;

		Ok(())
	}
}

pub fn format_json_line(entry: &AuditLogEntry) -> Result<String, AuditSinkError> {
	let json = serde_json::to_string(entry)
		.map_err(|e| AuditSinkError::Permanent(format!("JSON serialization failed: {e}")))?;
	Ok(format!("{json}\n"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::AuditEventType;
	use dispatch_server_auth::{Role, SubjectId};

	fn make_test_entry() -> AuditLogEntry {
		AuditLogEntry::builder(AuditEventType::AccessDenied)
			.actor(Some(SubjectId::new("R2")), Role::Restaurant)
			.resource("order", Some("o-1"))
			.details(serde_json::json!({ "reason": "not_owner" }))
			.build()
	}

	#[test]
	fn test_format_json_line_is_single_line() {
		let line = format_json_line(&make_test_entry()).unwrap();
		assert!(line.ends_with('\n'));
		assert!(!line.trim_end_matches('\n').contains('\n'));

		let json: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
		assert_eq!(json["event_type"], "access_denied");
		assert_eq!(json["details"]["reason"], "not_owner");
	}

	#[tokio::test]
	async fn test_appends_lines() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("audit.jsonl");
		std::fs::write(&path, "").unwrap();

		let sink = FileAuditSink::new(&path, AuditFilterConfig::allow_all());
		sink.publish(Arc::new(make_test_entry())).await.unwrap();
		sink.publish(Arc::new(make_test_entry())).await.unwrap();

		let content = std::fs::read_to_string(&path).unwrap();
		let lines: Vec<_> = content.lines().collect();
		assert_eq!(lines.len(), 2);
		for line in lines {
			let entry: AuditLogEntry = serde_json::from_str(line).unwrap();
			assert_eq!(entry.resource_id.as_deref(), Some("o-1"));
		}
	}

	#[tokio::test]
	async fn test_creates_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("new.jsonl");

		let sink = FileAuditSink::new(&path, AuditFilterConfig::allow_all());
		sink.publish(Arc::new(make_test_entry())).await.unwrap();
		assert!(path.exists());
	}

	#[tokio::test]
	async fn test_unwritable_path_is_transient_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing-dir").join("audit.jsonl");

		let sink = FileAuditSink::new(&path, AuditFilterConfig::allow_all());
		let err = sink.publish(Arc::new(make_test_entry())).await.unwrap_err();
		assert!(matches!(err, AuditSinkError::Transient(_)));
	}
}
