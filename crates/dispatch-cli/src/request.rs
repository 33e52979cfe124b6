// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON requests accepted by the `access` and `transition` commands.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dispatch_server_audit::CommitEvent;
use dispatch_server_auth::{
	validate_transition_str, AccessPolicy, Action, OrderStatus, ResourceAttrs, ResourceChange,
	Role, Subject, TransitionContext,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Input of `dispatch access`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessRequest {
	pub subject: Subject,
	pub action: Action,
	pub resource: ResourceAttrs,
	#[serde(default)]
	pub change: Option<ResourceChange>,
}

/// Input of `dispatch transition`. Field names follow the camelCase wire
/// contract; snake_case is accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
	#[serde(alias = "current_status")]
	pub current_status: String,
	#[serde(alias = "requested_status")]
	pub requested_status: String,
	#[serde(alias = "actor_role")]
	pub actor_role: String,
	#[serde(default)]
	pub context: TransitionContext,
}

/// Reads and parses a request from `input`, where `-` means stdin.
pub fn read_request<T: DeserializeOwned>(input: &str) -> Result<T> {
	let raw = if input == "-" {
		let mut buf = String::new();
		std::io::stdin()
			.read_to_string(&mut buf)
			.context("failed to read request from stdin")?;
		buf
	} else {
		std::fs::read_to_string(Path::new(input))
			.with_context(|| format!("failed to read request file {input}"))?
	};

	serde_json::from_str(&raw).context("request is not valid JSON for this command")
}

/// Evaluates an access request and returns the decision JSON along with the
/// event to audit.
pub fn run_access(
	policy: &AccessPolicy,
	request: AccessRequest,
	now: DateTime<Utc>,
) -> Result<(serde_json::Value, CommitEvent)> {
	let decision = policy.evaluate(
		&request.subject,
		request.action,
		&request.resource,
		request.change.as_ref(),
		now,
	);
	let output = serde_json::to_value(decision)?;

	let event = CommitEvent::AccessDecided {
		subject: request.subject,
		action: request.action,
		resource: request.resource,
		decision,
	};
	Ok((output, event))
}

/// Validates a transition request and returns the decision JSON along with
/// the event to audit. No event is produced when a status or role does not
/// parse, since the entry could not name the transition.
pub fn run_transition(
	request: TransitionRequest,
	now: DateTime<Utc>,
) -> Result<(serde_json::Value, Option<CommitEvent>)> {
	let decision = validate_transition_str(
		&request.current_status,
		&request.requested_status,
		&request.actor_role,
		&request.context,
		now,
	);
	let output = serde_json::to_value(&decision)?;

	let parsed = (
		request.current_status.parse::<OrderStatus>(),
		request.requested_status.parse::<OrderStatus>(),
		request.actor_role.parse::<Role>(),
	);
	let event = match parsed {
		(Ok(from), Ok(to), Ok(actor_role)) => Some(CommitEvent::TransitionDecided {
			from,
			to,
			actor_role,
			decision,
		}),
		_ => {
			debug!("transition request names an unknown status or role, not audited");
			None
		}
	};
	Ok((output, event))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	mod parsing {
		use super::*;

		#[test]
		fn access_request_from_json() {
			let request: AccessRequest = serde_json::from_str(
				r#"{
					"subject": { "id": "D1", "role": "driver" },
					"action": "update",
					"resource": { "resource_type": "order", "id": "o-1", "restaurant_id": "R1", "driver_id": "D1" },
					"change": { "new_status": "delivered" }
				}"#,
			)
			.unwrap();
			assert_eq!(request.subject, Subject::driver("D1"));
			assert_eq!(request.action, Action::Update);
			assert_eq!(
				request.change.and_then(|c| c.new_status),
				Some(OrderStatus::Delivered)
			);
		}

		#[test]
		fn transition_request_accepts_both_casings() {
			let camel: TransitionRequest = serde_json::from_str(
				r#"{"currentStatus":"priced","requestedStatus":"assigned","actorRole":"admin","context":{"driverId":"D1"}}"#,
			)
			.unwrap();
			assert_eq!(camel.context.driver_id.as_deref(), Some("D1"));

			let snake: TransitionRequest = serde_json::from_str(
				r#"{"current_status":"pending","requested_status":"confirmed","actor_role":"restaurant"}"#,
			)
			.unwrap();
			assert_eq!(snake.requested_status, "confirmed");
			assert!(snake.context.driver_id.is_none());
		}

		#[test]
		fn reads_request_from_file() {
			let mut file = tempfile::NamedTempFile::new().unwrap();
			write!(
				file,
				r#"{{"currentStatus":"delivered","requestedStatus":"pending","actorRole":"admin"}}"#
			)
			.unwrap();

			let path = file.path().to_string_lossy().to_string();
			let request: TransitionRequest = read_request(&path).unwrap();
			assert_eq!(request.current_status, "delivered");
		}

		#[test]
		fn missing_file_is_an_error() {
			let result: Result<TransitionRequest> = read_request("/nonexistent/request.json");
			assert!(result.is_err());
		}
	}

	mod commands {
		use super::*;

		#[test]
		fn access_denial_is_reported_not_raised() {
			let request = AccessRequest {
				subject: Subject::restaurant("R2"),
				action: Action::Select,
				resource: ResourceAttrs::order("o-1", "R1"),
				change: None,
			};
			let (output, event) =
				run_access(&AccessPolicy::default(), request, Utc::now()).unwrap();
			assert_eq!(output["allowed"], false);
			assert_eq!(output["reason"], "not_owner");
			assert!(matches!(event, CommitEvent::AccessDecided { .. }));
		}

		#[test]
		fn delivery_reports_timestamp() {
			let request = TransitionRequest {
				current_status: "in_transit".to_string(),
				requested_status: "delivered".to_string(),
				actor_role: "driver".to_string(),
				context: TransitionContext::new(),
			};
			let (output, event) = run_transition(request, Utc::now()).unwrap();
			assert_eq!(output["allowed"], true);
			assert!(output["sideEffects"]["actualDeliveryTimestamp"].is_string());
			assert!(event.is_some());
		}

		#[test]
		fn unknown_status_declines_without_event() {
			let request = TransitionRequest {
				current_status: "lost".to_string(),
				requested_status: "delivered".to_string(),
				actor_role: "driver".to_string(),
				context: TransitionContext::new(),
			};
			let (output, event) = run_transition(request, Utc::now()).unwrap();
			assert_eq!(output["allowed"], false);
			assert_eq!(output["reason"], "invalid_transition");
			assert!(event.is_none());
		}
	}
}
