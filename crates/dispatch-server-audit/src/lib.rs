// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Audit logging for access decisions and order lifecycle changes.
//!
//! Entries flow through a bounded queue into [`AuditService`], which applies
//! a global [`AuditFilterConfig`] and fans out to every [`AuditSink`].
//! The storage collaborator reports committed writes through
//! [`HookRegistry::dispatch`]; [`AuditCommitHook`] turns them into entries.

pub mod error;
pub mod event;
pub mod filter;
pub mod hooks;
pub mod pipeline;
pub mod sink;

pub use error::{AuditError, AuditSinkError};
pub use event::{AuditEventType, AuditLogBuilder, AuditLogEntry, AuditSeverity};
pub use filter::AuditFilterConfig;
pub use hooks::{AuditCommitHook, CommitEvent, CommitHook, HookRegistry};
pub use pipeline::AuditService;
pub use sink::file::FileAuditSink;
pub use sink::memory::MemoryAuditSink;
pub use sink::tracing::TracingAuditSink;
pub use sink::AuditSink;

pub use dispatch_server_config::{AuditConfig, QueueOverflowPolicy};
