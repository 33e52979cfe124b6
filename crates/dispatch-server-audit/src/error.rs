// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors raised by the audit service and commit hooks.
#[derive(Error, Debug)]
pub enum AuditError {
	#[error("event queue is at capacity")]
	QueueFull,

	#[error("hook '{hook}' failed: {message}")]
	HookFailed { hook: String, message: String },

	#[error("configuration error: {0}")]
	ConfigError(String),

	#[error("service is shutting down")]
	Shutdown,
}

/// A failed publish. Logged by the service and never retried.
#[derive(Error, Debug)]
pub enum AuditSinkError {
	#[error("transient error: {0}")]
	Transient(String),

	#[error("permanent error: {0}")]
	Permanent(String),
}
