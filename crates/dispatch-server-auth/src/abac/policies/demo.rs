// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Demo account policies.
//!
//! Demo subjects read everything created within the trailing window and
//! write nothing. Ownership is irrelevant.

use chrono::{DateTime, Duration, Utc};

use crate::abac::{AccessDecision, Action, DenyReason, ResourceAttrs};

/// Evaluates demo access. A record is visible when `now - window < created_at`.
/// A window reaching past the earliest representable time covers every record.
pub fn evaluate(
	action: Action,
	resource: &ResourceAttrs,
	window: Duration,
	now: DateTime<Utc>,
) -> AccessDecision {
	if action.is_mutation() {
		return AccessDecision::deny(DenyReason::ReadOnlyRole);
	}

	let Some(created_at) = resource.created_at else {
		return AccessDecision::deny(DenyReason::MalformedInput("resource.created_at"));
	};

	let within = match now.checked_sub_signed(window) {
		Some(cutoff) => cutoff < created_at,
		None => true,
	};
	AccessDecision::allow_if(within, DenyReason::OutsideDemoWindow)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn week() -> Duration {
		Duration::days(7)
	}

	fn created(ago: Duration, now: DateTime<Utc>) -> ResourceAttrs {
		ResourceAttrs::order("o-1", "R1").with_created_at(now - ago)
	}

	#[test]
	fn recent_records_are_readable() {
		let now = Utc::now();
		let resource = created(Duration::days(6), now);
		assert!(evaluate(Action::Select, &resource, week(), now).allowed);
	}

	#[test]
	fn old_records_are_hidden() {
		let now = Utc::now();
		let resource = created(Duration::days(8), now);
		assert_eq!(
			evaluate(Action::Select, &resource, week(), now),
			AccessDecision::deny(DenyReason::OutsideDemoWindow)
		);
	}

	#[test]
	fn window_boundary_is_exclusive() {
		let now = Utc::now();
		let resource = created(week(), now);
		assert!(!evaluate(Action::Select, &resource, week(), now).allowed);

		let resource = created(week() - Duration::seconds(1), now);
		assert!(evaluate(Action::Select, &resource, week(), now).allowed);
	}

	#[test]
	fn writes_are_denied_even_for_fresh_records() {
		let now = Utc::now();
		let resource = created(Duration::minutes(1), now);
		for action in [Action::Insert, Action::Update, Action::Delete] {
			assert_eq!(
				evaluate(action, &resource, week(), now),
				AccessDecision::deny(DenyReason::ReadOnlyRole)
			);
		}
	}

	#[test]
	fn unbounded_window_does_not_overflow() {
		let now = Utc::now();
		let resource = created(Duration::minutes(1), now);
		let window = Duration::days(100_000_000);
		assert!(evaluate(Action::Select, &resource, window, now).allowed);
		assert!(evaluate(Action::Select, &resource, Duration::MAX, now).allowed);
	}

	#[test]
	fn missing_created_at_is_malformed() {
		let resource = ResourceAttrs::order("o-1", "R1");
		assert_eq!(
			evaluate(Action::Select, &resource, week(), Utc::now()),
			AccessDecision::deny(DenyReason::MalformedInput("resource.created_at"))
		);
	}
}
