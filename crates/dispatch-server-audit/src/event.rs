// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core event types for audit logging.
//!
//! - [`AuditEventType`]: Enumeration of all auditable events
//! - [`AuditSeverity`]: RFC 5424-compatible severity levels
//! - [`AuditLogEntry`]: Complete audit record with correlation ID
//! - [`AuditLogBuilder`]: Fluent API for constructing entries

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use dispatch_server_auth::{Role, SubjectId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Types of events that can be recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
	// Access control events
	AccessGranted,
	AccessDenied,

	// Order lifecycle events
	OrderCreated,
	OrderStatusChanged,
	OrderTransitionDeclined,
	DriverAssigned,
	OrderDelivered,
	OrderCancelled,
}

impl AuditEventType {
	pub fn all() -> &'static [AuditEventType] {
		&[
			AuditEventType::AccessGranted,
			AuditEventType::AccessDenied,
			AuditEventType::OrderCreated,
			AuditEventType::OrderStatusChanged,
			AuditEventType::OrderTransitionDeclined,
			AuditEventType::DriverAssigned,
			AuditEventType::OrderDelivered,
			AuditEventType::OrderCancelled,
		]
	}

	/// Returns the default severity for this event type.
	///
	/// - `Debug`: Routine grants, which are high volume
	/// - `Info`: Normal order lifecycle progress
	/// - `Notice`: Cancellations
	/// - `Warning`: Denials and declined transitions
	pub fn default_severity(&self) -> AuditSeverity {
		match self {
			AuditEventType::AccessGranted => AuditSeverity::Debug,

			AuditEventType::OrderCreated
			| AuditEventType::OrderStatusChanged
			| AuditEventType::DriverAssigned
			| AuditEventType::OrderDelivered => AuditSeverity::Info,

			AuditEventType::OrderCancelled => AuditSeverity::Notice,

			AuditEventType::AccessDenied | AuditEventType::OrderTransitionDeclined => {
				AuditSeverity::Warning
			}
		}
	}
}

impl fmt::Display for AuditEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AuditEventType::AccessGranted => "access_granted",
			AuditEventType::AccessDenied => "access_denied",
			AuditEventType::OrderCreated => "order_created",
			AuditEventType::OrderStatusChanged => "order_status_changed",
			AuditEventType::OrderTransitionDeclined => "order_transition_declined",
			AuditEventType::DriverAssigned => "driver_assigned",
			AuditEventType::OrderDelivered => "order_delivered",
			AuditEventType::OrderCancelled => "order_cancelled",
		};
		write!(f, "{s}")
	}
}

/// Severity levels for audit events, compatible with RFC 5424 syslog.
///
/// The numeric values correspond to syslog severity codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
	Debug = 7,
	#[default]
	Info = 6,
	Notice = 5,
	Warning = 4,
	Error = 3,
	Critical = 2,
}

impl AuditSeverity {
	/// Returns the RFC 5424 numeric severity code.
	pub fn as_syslog_code(&self) -> u8 {
		*self as u8
	}

	/// Returns all severity levels from most to least severe.
	pub fn all() -> &'static [AuditSeverity] {
		&[
			AuditSeverity::Critical,
			AuditSeverity::Error,
			AuditSeverity::Warning,
			AuditSeverity::Notice,
			AuditSeverity::Info,
			AuditSeverity::Debug,
		]
	}
}

impl PartialOrd for AuditSeverity {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for AuditSeverity {
	fn cmp(&self, other: &Self) -> Ordering {
		// Lower numeric value = higher severity (Critical=2 > Debug=7)
		(*other as u8).cmp(&(*self as u8))
	}
}

impl fmt::Display for AuditSeverity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AuditSeverity::Debug => "debug",
			AuditSeverity::Info => "info",
			AuditSeverity::Notice => "notice",
			AuditSeverity::Warning => "warning",
			AuditSeverity::Error => "error",
			AuditSeverity::Critical => "critical",
		};
		write!(f, "{s}")
	}
}

impl FromStr for AuditSeverity {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_lowercase();
		match normalized.as_str() {
			"warn" => return Ok(AuditSeverity::Warning),
			"crit" => return Ok(AuditSeverity::Critical),
			_ => {}
		}
		AuditSeverity::all()
			.iter()
			.copied()
			.find(|severity| severity.to_string() == normalized)
			.ok_or_else(|| format!("unknown audit severity '{s}'"))
	}
}

/// An entry in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
	/// Unique identifier for this audit entry.
	pub id: Uuid,
	/// When the event occurred.
	pub timestamp: DateTime<Utc>,
	pub event_type: AuditEventType,
	pub severity: AuditSeverity,

	/// The subject who performed the action, if authenticated.
	pub actor_id: Option<SubjectId>,
	pub actor_role: Option<Role>,

	/// The type of resource affected (e.g., "order", "product").
	pub resource_type: Option<String>,
	pub resource_id: Option<String>,

	/// Short description of the action.
	pub action: String,
	/// Event-specific details such as the deny reason or side effects.
	pub details: serde_json::Value,
	/// Application-level request ID for correlation.
	pub request_id: Option<String>,
}

impl AuditLogEntry {
	/// Create a new audit log builder for the given event type.
	pub fn builder(event_type: AuditEventType) -> AuditLogBuilder {
		AuditLogBuilder::new(event_type)
	}
}

/// Builder for constructing audit log entries with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
	event_type: AuditEventType,
	severity: Option<AuditSeverity>,
	actor_id: Option<SubjectId>,
	actor_role: Option<Role>,
	resource_type: Option<String>,
	resource_id: Option<String>,
	action: Option<String>,
	details: serde_json::Value,
	request_id: Option<String>,
}

impl AuditLogBuilder {
	pub fn new(event_type: AuditEventType) -> Self {
		Self {
			event_type,
			severity: None,
			actor_id: None,
			actor_role: None,
			resource_type: None,
			resource_id: None,
			action: None,
			details: serde_json::Value::Null,
			request_id: None,
		}
	}

	/// Set the severity level. Defaults to the event type's default severity.
	pub fn severity(mut self, severity: AuditSeverity) -> Self {
		self.severity = Some(severity);
		self
	}

	/// Set the subject who performed the action.
	pub fn actor(mut self, id: Option<SubjectId>, role: Role) -> Self {
		self.actor_id = id;
		self.actor_role = Some(role);
		self
	}

	/// Set the resource type and, if known, its ID.
	pub fn resource(
		mut self,
		resource_type: impl Into<String>,
		resource_id: Option<impl Into<String>>,
	) -> Self {
		self.resource_type = Some(resource_type.into());
		self.resource_id = resource_id.map(Into::into);
		self
	}

	pub fn action(mut self, action: impl Into<String>) -> Self {
		self.action = Some(action.into());
		self
	}

	pub fn details(mut self, details: serde_json::Value) -> Self {
		self.details = details;
		self
	}

	pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
		self.request_id = Some(request_id.into());
		self
	}

	pub fn build(self) -> AuditLogEntry {
		AuditLogEntry {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			event_type: self.event_type,
			severity: self
				.severity
				.unwrap_or_else(|| self.event_type.default_severity()),
			actor_id: self.actor_id,
			actor_role: self.actor_role,
			resource_type: self.resource_type,
			resource_id: self.resource_id,
			action: self.action.unwrap_or_else(|| self.event_type.to_string()),
			details: self.details,
			request_id: self.request_id,
		}
	}
}
