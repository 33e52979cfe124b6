// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Order status transition validation.
//!
//! [`validate_transition`] checks a requested status change in three steps:
//!
//! 1. **Table lookup**: the edge must exist in [`TRANSITIONS`]
//! 2. **Actor check**: the actor's role must be listed on that edge
//! 3. **Required context**: assignment needs a driver, cancellation a reason
//!
//! A declined transition is an expected outcome reported through
//! [`TransitionDecision`], never an error.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, instrument};

use super::status::OrderStatus;
use crate::types::Role;

/// One edge of the order state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
	pub from: OrderStatus,
	pub to: OrderStatus,
	pub actors: &'static [Role],
}

impl Transition {
	/// Returns true if `role` may perform this transition.
	pub fn permits(&self, role: Role) -> bool {
		self.actors.contains(&role)
	}
}

const RESTAURANT_OR_ADMIN: &[Role] = &[Role::Restaurant, Role::Admin];
const ADMIN_ONLY: &[Role] = &[Role::Admin];
const DRIVER_OR_ADMIN: &[Role] = &[Role::Driver, Role::Admin];

/// The complete order lifecycle. Anything not listed is invalid, including
/// same-status transitions and any edge out of a terminal status.
pub const TRANSITIONS: &[Transition] = &[
	Transition {
		from: OrderStatus::Pending,
		to: OrderStatus::Confirmed,
		actors: RESTAURANT_OR_ADMIN,
	},
	Transition {
		from: OrderStatus::Pending,
		to: OrderStatus::Cancelled,
		actors: RESTAURANT_OR_ADMIN,
	},
	Transition {
		from: OrderStatus::Confirmed,
		to: OrderStatus::Priced,
		actors: RESTAURANT_OR_ADMIN,
	},
	Transition {
		from: OrderStatus::Confirmed,
		to: OrderStatus::Cancelled,
		actors: RESTAURANT_OR_ADMIN,
	},
	Transition {
		from: OrderStatus::Priced,
		to: OrderStatus::Assigned,
		actors: ADMIN_ONLY,
	},
	Transition {
		from: OrderStatus::Priced,
		to: OrderStatus::Cancelled,
		actors: ADMIN_ONLY,
	},
	Transition {
		from: OrderStatus::Assigned,
		to: OrderStatus::PickedUp,
		actors: DRIVER_OR_ADMIN,
	},
	Transition {
		from: OrderStatus::Assigned,
		to: OrderStatus::Cancelled,
		actors: DRIVER_OR_ADMIN,
	},
	Transition {
		from: OrderStatus::PickedUp,
		to: OrderStatus::InTransit,
		actors: DRIVER_OR_ADMIN,
	},
	Transition {
		from: OrderStatus::PickedUp,
		to: OrderStatus::Cancelled,
		actors: DRIVER_OR_ADMIN,
	},
	Transition {
		from: OrderStatus::InTransit,
		to: OrderStatus::Delivered,
		actors: DRIVER_OR_ADMIN,
	},
	Transition {
		from: OrderStatus::InTransit,
		to: OrderStatus::Cancelled,
		actors: DRIVER_OR_ADMIN,
	},
];

/// Looks up the edge `from -> to`.
pub fn find_transition(from: OrderStatus, to: OrderStatus) -> Option<&'static Transition> {
	TRANSITIONS.iter().find(|t| t.from == from && t.to == to)
}

/// Returns every status `role` can move an order into, in lifecycle order.
pub fn targets_for(role: Role) -> Vec<OrderStatus> {
	let mut targets: Vec<OrderStatus> = TRANSITIONS
		.iter()
		.filter(|t| t.permits(role))
		.map(|t| t.to)
		.collect();
	targets.sort();
	targets.dedup();
	targets
}

/// Caller-supplied values some transitions require.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionContext {
	#[serde(default)]
	pub driver_id: Option<String>,
	#[serde(default)]
	pub cancel_reason: Option<String>,
}

impl TransitionContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: set the driver being assigned.
	pub fn with_driver(mut self, driver_id: impl Into<String>) -> Self {
		self.driver_id = Some(driver_id.into());
		self
	}

	/// Builder: set the cancellation reason.
	pub fn with_cancel_reason(mut self, reason: impl Into<String>) -> Self {
		self.cancel_reason = Some(reason.into());
		self
	}
}

/// Fields the caller must write alongside an allowed transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideEffects {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub driver_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cancel_reason: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub actual_delivery_timestamp: Option<DateTime<Utc>>,
}

impl SideEffects {
	pub fn is_empty(&self) -> bool {
		self.driver_id.is_none()
			&& self.cancel_reason.is_none()
			&& self.actual_delivery_timestamp.is_none()
	}
}

/// Why a transition was declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionDeclined {
	/// The edge is not in the transition table.
	InvalidTransition,
	/// The edge exists but the actor's role is not listed on it.
	ActorNotPermitted,
	/// A value the transition needs was not supplied.
	MissingRequiredField(&'static str),
}

impl fmt::Display for TransitionDeclined {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransitionDeclined::InvalidTransition => write!(f, "invalid_transition"),
			TransitionDeclined::ActorNotPermitted => write!(f, "actor_not_permitted"),
			TransitionDeclined::MissingRequiredField(name) => {
				write!(f, "missing_required_field:{name}")
			}
		}
	}
}

impl Serialize for TransitionDeclined {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Outcome of a transition validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDecision {
	pub allowed: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<TransitionDeclined>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub side_effects: Option<SideEffects>,
}

impl TransitionDecision {
	pub fn allow(side_effects: SideEffects) -> Self {
		Self {
			allowed: true,
			reason: None,
			side_effects: (!side_effects.is_empty()).then_some(side_effects),
		}
	}

	pub fn decline(reason: TransitionDeclined) -> Self {
		Self {
			allowed: false,
			reason: Some(reason),
			side_effects: None,
		}
	}

	pub fn is_allowed(&self) -> bool {
		self.allowed
	}
}

fn present(value: Option<&String>) -> Option<String> {
	value
		.map(|v| v.trim())
		.filter(|v| !v.is_empty())
		.map(str::to_string)
}

/// Validates moving an order from `current` to `requested` on behalf of an
/// actor with role `actor`.
///
/// `now` is the validation time; it becomes the delivery timestamp when the
/// order is delivered.
#[instrument(
    level = "debug",
    skip_all,
    fields(from = %current, to = %requested, actor = %actor)
)]
pub fn validate_transition(
	current: OrderStatus,
	requested: OrderStatus,
	actor: Role,
	ctx: &TransitionContext,
	now: DateTime<Utc>,
) -> TransitionDecision {
	let decision = decide(current, requested, actor, ctx, now);
	debug!(
		allowed = decision.allowed,
		reason = ?decision.reason,
		"transition decision"
	);
	decision
}

fn decide(
	current: OrderStatus,
	requested: OrderStatus,
	actor: Role,
	ctx: &TransitionContext,
	now: DateTime<Utc>,
) -> TransitionDecision {
	let Some(edge) = find_transition(current, requested) else {
		return TransitionDecision::decline(TransitionDeclined::InvalidTransition);
	};

	if !edge.permits(actor) {
		return TransitionDecision::decline(TransitionDeclined::ActorNotPermitted);
	}

	let mut side_effects = SideEffects::default();
	match requested {
		OrderStatus::Assigned => {
			let Some(driver_id) = present(ctx.driver_id.as_ref()) else {
				return TransitionDecision::decline(TransitionDeclined::MissingRequiredField(
					"driverId",
				));
			};
			side_effects.driver_id = Some(driver_id);
		}
		OrderStatus::Cancelled => {
			let Some(reason) = present(ctx.cancel_reason.as_ref()) else {
				return TransitionDecision::decline(TransitionDeclined::MissingRequiredField(
					"cancelReason",
				));
			};
			side_effects.cancel_reason = Some(reason);
		}
		OrderStatus::Delivered => {
			side_effects.actual_delivery_timestamp = Some(now);
		}
		_ => {}
	}

	TransitionDecision::allow(side_effects)
}

/// String-typed form of [`validate_transition`] for callers holding raw
/// column values.
///
/// An unknown status declines with `invalid_transition` and an unknown role
/// with `actor_not_permitted`. Never panics.
pub fn validate_transition_str(
	current: &str,
	requested: &str,
	actor: &str,
	ctx: &TransitionContext,
	now: DateTime<Utc>,
) -> TransitionDecision {
	let (Ok(current), Ok(requested)) = (
		current.parse::<OrderStatus>(),
		requested.parse::<OrderStatus>(),
	) else {
		return TransitionDecision::decline(TransitionDeclined::InvalidTransition);
	};
	let Ok(actor) = actor.parse::<Role>() else {
		return TransitionDecision::decline(TransitionDeclined::ActorNotPermitted);
	};
	validate_transition(current, requested, actor, ctx, now)
}
