// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use dispatch_server_config::{AuditConfig, QueueOverflowPolicy};
use tokio::sync::mpsc::{self, error::SendError};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, instrument, warn};

use crate::error::AuditError;
use crate::event::AuditLogEntry;
use crate::filter::AuditFilterConfig;
use crate::sink::{AuditSink, FileAuditSink, TracingAuditSink};

pub struct AuditService {
	tx: mpsc::Sender<AuditLogEntry>,
	overflow_policy: QueueOverflowPolicy,
	worker: JoinHandle<()>,
}

impl AuditService {
	/// Starts the service on the current tokio runtime.
	pub fn new(
		global_filter: AuditFilterConfig,
		queue_capacity: usize,
		overflow_policy: QueueOverflowPolicy,
		sinks: Vec<Arc<dyn AuditSink>>,
	) -> Self {
		let (tx, rx) = mpsc::channel(queue_capacity);

		let worker = tokio::spawn(Self::background_task(rx, global_filter, sinks));

		Self {
			tx,
			overflow_policy,
			worker,
		}
	}

	/// Builds the service described by `config`: a tracing sink, plus a file
	/// sink when `file_path` is set.
	pub fn from_config(config: &AuditConfig) -> Result<Self, AuditError> {
		let global_filter = AuditFilterConfig::from_min_severity(&config.min_severity)?;

		let mut sinks: Vec<Arc<dyn AuditSink>> = vec![Arc::new(TracingAuditSink::default())];
		if let Some(path) = &config.file_path {
			sinks.push(Arc::new(FileAuditSink::new(
				path,
				AuditFilterConfig::allow_all(),
			)));
		}

		Ok(Self::new(
			global_filter,
			config.queue_capacity,
			config.queue_overflow_policy,
			sinks,
		))
	}

	async fn background_task(
		mut rx: mpsc::Receiver<AuditLogEntry>,
		global_filter: AuditFilterConfig,
		sinks: Vec<Arc<dyn AuditSink>>,
	) {
		while let Some(entry) = rx.recv().await {
			if !global_filter.allows(&entry) {
				continue;
			}

			let entry = Arc::new(entry);

			// Sinks publish one entry concurrently; the next entry waits, so each
			// sink sees entries in queue order.
			let mut publishes = JoinSet::new();
			for sink in &sinks {
				if !sink.filter().allows(&entry) {
					continue;
				}

				let sink = Arc::clone(sink);
				let entry = Arc::clone(&entry);

				publishes.spawn(async move {
					if let Err(e) = sink.publish(entry).await {
						warn!(sink = sink.name(), error = %e, "audit sink publish failed");
					}
				});
			}
			while publishes.join_next().await.is_some() {}
		}

		debug!("audit queue drained");
	}

	/// Log an audit event to the queue for processing.
	///
	/// Returns `true` if the event was queued, `false` if dropped.
	///
	/// - `Block`: spawns a task that waits for queue space, so the caller
	///   never waits
	/// - `DropNewest`: uses `try_send`, dropping the entry when the queue is full
	#[instrument(skip(self, entry), fields(event_type = %entry.event_type))]
	pub fn log(&self, entry: AuditLogEntry) -> bool {
		match self.overflow_policy {
			QueueOverflowPolicy::Block => {
				let tx = self.tx.clone();
				tokio::spawn(async move {
					let _ = tx.send(entry).await;
				});
				true
			}
			QueueOverflowPolicy::DropNewest => self.tx.try_send(entry).is_ok(),
		}
	}

	pub async fn log_blocking(&self, entry: AuditLogEntry) -> Result<(), SendError<AuditLogEntry>> {
		self.tx.send(entry).await
	}

	/// Closes the queue and waits until every queued entry has been
	/// published.
	pub async fn shutdown(self) -> Result<(), AuditError> {
		drop(self.tx);
		self.worker.await.map_err(|_| AuditError::Shutdown)
	}
}
