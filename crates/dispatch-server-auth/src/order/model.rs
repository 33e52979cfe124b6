// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::OrderStatus;
use super::transition::{
	validate_transition, TransitionContext, TransitionDecision, TransitionDeclined,
};
use crate::abac::ResourceAttrs;
use crate::types::{ResourceId, Role, SubjectId};

/// An order as read from storage.
///
/// Values are never mutated in place; [`Order::apply`] returns the updated
/// order for the caller to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	pub id: ResourceId,
	pub restaurant_id: SubjectId,
	#[serde(default)]
	pub driver_id: Option<SubjectId>,
	pub status: OrderStatus,
	pub created_at: DateTime<Utc>,
	#[serde(default)]
	pub actual_delivery_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub cancel_reason: Option<String>,
}

impl Order {
	/// Creates a pending order with no driver.
	pub fn new(
		id: impl Into<ResourceId>,
		restaurant_id: impl Into<SubjectId>,
		created_at: DateTime<Utc>,
	) -> Self {
		Self {
			id: id.into(),
			restaurant_id: restaurant_id.into(),
			driver_id: None,
			status: OrderStatus::INITIAL,
			created_at,
			actual_delivery_at: None,
			cancel_reason: None,
		}
	}

	/// Returns the attributes the access policy evaluates this order by.
	pub fn resource_attrs(&self) -> ResourceAttrs {
		let attrs = ResourceAttrs::order(self.id.clone(), self.restaurant_id.clone())
			.with_created_at(self.created_at);
		match &self.driver_id {
			Some(driver_id) => attrs.with_driver(driver_id.clone()),
			None => attrs,
		}
	}

	fn has_driver(&self) -> bool {
		self.driver_id.as_ref().is_some_and(|d| !d.is_blank())
	}

	/// Validates moving this order to `requested`.
	///
	/// On top of the transition table this enforces that an order has a driver
	/// before it is picked up, in transit or delivered.
	pub fn validate_transition(
		&self,
		requested: OrderStatus,
		actor: Role,
		ctx: &TransitionContext,
		now: DateTime<Utc>,
	) -> TransitionDecision {
		let decision = validate_transition(self.status, requested, actor, ctx, now);
		if decision.allowed && requested.requires_driver() && !self.has_driver() {
			return TransitionDecision::decline(TransitionDeclined::MissingRequiredField(
				"driver_id",
			));
		}
		decision
	}

	/// Returns this order moved to `requested` with the decision's side
	/// effects written, or `None` if the decision was declined.
	pub fn apply(&self, requested: OrderStatus, decision: &TransitionDecision) -> Option<Order> {
		if !decision.allowed {
			return None;
		}

		let mut next = self.clone();
		next.status = requested;
		if let Some(effects) = &decision.side_effects {
			if let Some(driver_id) = &effects.driver_id {
				next.driver_id = Some(SubjectId::new(driver_id.as_str()));
			}
			if let Some(reason) = &effects.cancel_reason {
				next.cancel_reason = Some(reason.clone());
			}
			if let Some(at) = effects.actual_delivery_timestamp {
				next.actual_delivery_at = Some(at);
			}
		}
		Some(next)
	}

	/// Validates and applies a transition in one step.
	pub fn transition(
		&self,
		requested: OrderStatus,
		actor: Role,
		ctx: &TransitionContext,
		now: DateTime<Utc>,
	) -> Result<(Order, TransitionDecision), TransitionDeclined> {
		let decision = self.validate_transition(requested, actor, ctx, now);
		match self.apply(requested, &decision) {
			Some(next) => Ok((next, decision)),
			None => Err(decision
				.reason
				.unwrap_or(TransitionDeclined::InvalidTransition)),
		}
	}
}
