// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Restaurant access policies.
//!
//! A restaurant reaches a record only through its `restaurant_id` (or
//! `user_id` for its own profile). Inserts are checked against the record as
//! it would be written, so a restaurant cannot create rows for another one.

use crate::abac::{
	AccessDecision, Action, DenyReason, ResourceAttrs, ResourceChange, ResourceType, Subject,
};
use crate::order::targets_for;
use crate::types::Role;

/// Evaluates restaurant access.
///
/// Order rows are not updatable by restaurants unless `status_updates` is
/// set, in which case only statuses the transition table grants restaurants
/// may be written.
pub fn evaluate(
	subject: &Subject,
	action: Action,
	resource: &ResourceAttrs,
	change: Option<&ResourceChange>,
	status_updates: bool,
) -> AccessDecision {
	if !subject.owns(resource.owner_for(Role::Restaurant)) {
		return AccessDecision::deny(DenyReason::NotOwner);
	}

	if action == Action::Update && resource.resource_type == ResourceType::Order {
		return evaluate_order_update(change, status_updates);
	}

	AccessDecision::allow()
}

fn evaluate_order_update(change: Option<&ResourceChange>, status_updates: bool) -> AccessDecision {
	if !status_updates {
		return AccessDecision::deny(DenyReason::RestaurantOrderUpdate);
	}

	let permitted = change
		.and_then(|c| c.new_status)
		.is_some_and(|status| targets_for(Role::Restaurant).contains(&status));
	AccessDecision::allow_if(permitted, DenyReason::RestaurantOrderUpdate)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::order::OrderStatus;

	fn check(subject: &Subject, action: Action, resource: &ResourceAttrs) -> AccessDecision {
		evaluate(subject, action, resource, None, false)
	}

	#[test]
	fn owner_can_read_insert_delete_own_orders() {
		let subject = Subject::restaurant("R1");
		let resource = ResourceAttrs::order("o-1", "R1");
		assert!(check(&subject, Action::Select, &resource).allowed);
		assert!(check(&subject, Action::Insert, &resource).allowed);
		assert!(check(&subject, Action::Delete, &resource).allowed);
	}

	#[test]
	fn other_restaurant_is_denied() {
		let subject = Subject::restaurant("R2");
		let resource = ResourceAttrs::order("o-1", "R1");
		for action in Action::all() {
			assert_eq!(
				check(&subject, *action, &resource),
				AccessDecision::deny(DenyReason::NotOwner)
			);
		}
	}

	#[test]
	fn cannot_insert_for_another_restaurant() {
		let subject = Subject::restaurant("R1");
		let resource = ResourceAttrs::new(ResourceType::Order).with_restaurant("R2");
		assert!(!check(&subject, Action::Insert, &resource).allowed);
	}

	#[test]
	fn record_without_restaurant_is_denied() {
		let subject = Subject::restaurant("R1");
		let resource = ResourceAttrs::new(ResourceType::Order).with_id("o-1");
		assert!(!check(&subject, Action::Select, &resource).allowed);
	}

	#[test]
	fn order_update_is_denied_by_default() {
		let subject = Subject::restaurant("R1");
		let resource = ResourceAttrs::order("o-1", "R1");
		let change = ResourceChange::status(OrderStatus::Confirmed);
		assert_eq!(
			evaluate(&subject, Action::Update, &resource, Some(&change), false),
			AccessDecision::deny(DenyReason::RestaurantOrderUpdate)
		);
	}

	#[test]
	fn order_update_follows_transition_table_when_enabled() {
		let subject = Subject::restaurant("R1");
		let resource = ResourceAttrs::order("o-1", "R1");

		let confirm = ResourceChange::status(OrderStatus::Confirmed);
		assert!(evaluate(&subject, Action::Update, &resource, Some(&confirm), true).allowed);

		let deliver = ResourceChange::status(OrderStatus::Delivered);
		assert!(!evaluate(&subject, Action::Update, &resource, Some(&deliver), true).allowed);

		assert!(!evaluate(&subject, Action::Update, &resource, None, true).allowed);
	}

	#[test]
	fn other_owned_records_are_updatable() {
		let subject = Subject::restaurant("R1");
		let item = ResourceAttrs::order_item("i-1", "R1");
		assert!(check(&subject, Action::Update, &item).allowed);

		let product = ResourceAttrs::product("p-1").with_restaurant("R1");
		assert!(check(&subject, Action::Update, &product).allowed);
	}

	#[test]
	fn own_profile_is_matched_by_user_id() {
		let subject = Subject::restaurant("R1");
		assert!(check(&subject, Action::Update, &ResourceAttrs::profile("R1")).allowed);
		assert!(!check(&subject, Action::Select, &ResourceAttrs::profile("R2")).allowed);
	}
}
