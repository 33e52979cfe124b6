// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Driver access policies.
//!
//! A driver reaches an order only while it is assigned to them. Unassigned
//! orders are not visible to any driver.

use crate::abac::{
	AccessDecision, Action, DenyReason, ResourceAttrs, ResourceChange, ResourceType, Subject,
};
use crate::order::OrderStatus;
use crate::types::Role;

/// Evaluates driver access.
///
/// Order updates must carry a new status drawn from `update_statuses`.
pub fn evaluate(
	subject: &Subject,
	action: Action,
	resource: &ResourceAttrs,
	change: Option<&ResourceChange>,
	update_statuses: &[OrderStatus],
) -> AccessDecision {
	let is_order = resource.resource_type == ResourceType::Order;

	if is_order && action == Action::Insert {
		return AccessDecision::deny(DenyReason::DriverCannotInsertOrders);
	}

	let owner = resource.owner_for(Role::Driver);
	if is_order && owner.is_none() {
		return AccessDecision::deny(DenyReason::Unassigned);
	}
	if !subject.owns(owner) {
		return AccessDecision::deny(DenyReason::NotOwner);
	}

	if is_order && action == Action::Update {
		let permitted = change
			.and_then(|c| c.new_status)
			.is_some_and(|status| update_statuses.contains(&status));
		return AccessDecision::allow_if(permitted, DenyReason::DriverStatusNotPermitted);
	}

	AccessDecision::allow()
}
