// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access policy evaluation engine.
//!
//! [`AccessPolicy::evaluate`] runs in fixed phases:
//!
//! 1. **Global role check**: admins are allowed everything
//! 2. **Public catalog**: reads of catalog resources are allowed for everyone
//! 3. **Input validation**: missing identities deny with `malformed_input`
//! 4. **Role guard**: only admins may write a role
//! 5. **Role policy**: delegates to the per-role modules in [`super::policies`]
//!
//! Every phase is a pure function of its arguments.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument};

use super::policies::{anonymous, demo, driver, restaurant};
use super::types::{
	AccessDecision, Action, DenyReason, ResourceAttrs, ResourceChange, ResourceType, Subject,
};
use crate::order::OrderStatus;
use crate::types::Role;

/// Length of the trailing window demo accounts may read, in days.
pub const DEFAULT_DEMO_WINDOW_DAYS: i64 = 7;

/// Tunable parts of the access policy.
///
/// The defaults encode the production rules; deployments override them from
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
	/// Demo accounts may read records created strictly within this window.
	pub demo_window: Duration,
	/// Resource types anyone may select, including anonymous visitors.
	pub public_catalog: Vec<ResourceType>,
	/// Statuses a driver may write onto an order assigned to them.
	pub driver_update_statuses: Vec<OrderStatus>,
	/// Whether restaurants may update the status of their own orders.
	pub restaurant_status_updates: bool,
}

impl Default for AccessPolicy {
	fn default() -> Self {
		Self {
			demo_window: Duration::days(DEFAULT_DEMO_WINDOW_DAYS),
			public_catalog: vec![ResourceType::Product],
			driver_update_statuses: vec![OrderStatus::InTransit, OrderStatus::Delivered],
			restaurant_status_updates: false,
		}
	}
}

impl AccessPolicy {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_demo_window(mut self, window: Duration) -> Self {
		self.demo_window = window;
		self
	}

	pub fn with_public_catalog(mut self, catalog: Vec<ResourceType>) -> Self {
		self.public_catalog = catalog;
		self
	}

	pub fn with_driver_update_statuses(mut self, statuses: Vec<OrderStatus>) -> Self {
		self.driver_update_statuses = statuses;
		self
	}

	pub fn with_restaurant_status_updates(mut self, enabled: bool) -> Self {
		self.restaurant_status_updates = enabled;
		self
	}

	/// Decides whether `subject` may perform `action` on `resource`.
	///
	/// `change` carries the new values of an update, if any. `now` is the
	/// evaluation time used for the demo window.
	///
	/// Never fails: malformed inputs produce a denial with a
	/// `malformed_input:<field>` reason.
	#[instrument(
		level = "debug",
		skip_all,
		fields(
			subject_id = ?subject.id,
			role = %subject.role,
			action = %action,
			resource_type = %resource.resource_type,
		)
	)]
	pub fn evaluate(
		&self,
		subject: &Subject,
		action: Action,
		resource: &ResourceAttrs,
		change: Option<&ResourceChange>,
		now: DateTime<Utc>,
	) -> AccessDecision {
		let decision = self.decide(subject, action, resource, change, now);
		debug!(
			allowed = decision.allowed,
			reason = ?decision.reason,
			"access evaluated"
		);
		decision
	}

	fn decide(
		&self,
		subject: &Subject,
		action: Action,
		resource: &ResourceAttrs,
		change: Option<&ResourceChange>,
		now: DateTime<Utc>,
	) -> AccessDecision {
		if subject.role == Role::Admin {
			return AccessDecision::allow();
		}

		if anonymous::is_catalog_read(action, resource, &self.public_catalog) {
			return AccessDecision::allow();
		}

		if subject.role == Role::Anonymous {
			return anonymous::evaluate();
		}

		if let Some(reason) = check_inputs(subject, action, resource) {
			return AccessDecision::deny(reason);
		}

		if change.is_some_and(|c| c.new_role.is_some()) {
			return AccessDecision::deny(DenyReason::RoleImmutable);
		}

		match subject.role {
			Role::Restaurant => restaurant::evaluate(
				subject,
				action,
				resource,
				change,
				self.restaurant_status_updates,
			),
			Role::Driver => driver::evaluate(
				subject,
				action,
				resource,
				change,
				&self.driver_update_statuses,
			),
			Role::Demo => demo::evaluate(action, resource, self.demo_window, now),
			Role::Admin => AccessDecision::allow(),
			Role::Anonymous => anonymous::evaluate(),
		}
	}
}

/// Returns the first missing input the request needs, if any.
fn check_inputs(subject: &Subject, action: Action, resource: &ResourceAttrs) -> Option<DenyReason> {
	if subject.role.requires_identity() && subject.identity().is_none() {
		return Some(DenyReason::MalformedInput("subject.id"));
	}
	if action != Action::Insert && resource.identity().is_none() {
		return Some(DenyReason::MalformedInput("resource.id"));
	}
	None
}

/// Evaluates `action` on `resource` for `subject` under the default policy.
pub fn evaluate_access(
	subject: &Subject,
	action: Action,
	resource: &ResourceAttrs,
	change: Option<&ResourceChange>,
	now: DateTime<Utc>,
) -> AccessDecision {
	AccessPolicy::default().evaluate(subject, action, resource, change, now)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn order() -> ResourceAttrs {
		ResourceAttrs::order("o-1", "R1").with_created_at(Utc::now())
	}

	mod global_roles {
		use super::*;

		#[test]
		fn admin_allowed_everything() {
			let admin = Subject::admin("A1");
			for resource_type in ResourceType::all() {
				for action in Action::all() {
					let resource = ResourceAttrs::new(*resource_type);
					let decision = evaluate_access(&admin, *action, &resource, None, Utc::now());
					assert!(decision.allowed, "admin denied {action} on {resource_type}");
				}
			}
		}

		#[test]
		fn admin_may_change_roles() {
			let admin = Subject::admin("A1");
			let change = ResourceChange::role(Role::Admin);
			let decision = evaluate_access(
				&admin,
				Action::Update,
				&ResourceAttrs::profile("U1").with_id("p-1"),
				Some(&change),
				Utc::now(),
			);
			assert!(decision.allowed);
		}
	}

	mod public_catalog {
		use super::*;

		#[test]
		fn anyone_can_read_products() {
			let product = ResourceAttrs::product("p-1");
			for subject in [
				Subject::anonymous(),
				Subject::restaurant("R1"),
				Subject::driver("D1"),
				Subject::demo("X1"),
			] {
				let decision =
					evaluate_access(&subject, Action::Select, &product, None, Utc::now());
				assert!(decision.allowed, "{} denied catalog read", subject.role);
			}
		}

		#[test]
		fn anonymous_cannot_write_catalog() {
			let decision = evaluate_access(
				&Subject::anonymous(),
				Action::Update,
				&ResourceAttrs::product("p-1"),
				None,
				Utc::now(),
			);
			assert_eq!(decision, AccessDecision::deny(DenyReason::AnonymousDenied));
		}

		#[test]
		fn anonymous_denied_outside_catalog() {
			let decision =
				evaluate_access(&Subject::anonymous(), Action::Select, &order(), None, Utc::now());
			assert_eq!(decision, AccessDecision::deny(DenyReason::AnonymousDenied));
		}

		#[test]
		fn catalog_is_configurable() {
			let policy = AccessPolicy::new().with_public_catalog(vec![]);
			let decision = policy.evaluate(
				&Subject::anonymous(),
				Action::Select,
				&ResourceAttrs::product("p-1"),
				None,
				Utc::now(),
			);
			assert!(!decision.allowed);
		}
	}

	mod malformed_input {
		use super::*;

		#[test]
		fn restaurant_without_id_is_denied() {
			let subject = Subject {
				id: None,
				role: Role::Restaurant,
			};
			let decision = evaluate_access(&subject, Action::Select, &order(), None, Utc::now());
			assert_eq!(
				decision,
				AccessDecision::deny(DenyReason::MalformedInput("subject.id"))
			);
			assert_eq!(
				decision.reason.map(|r| r.to_string()).as_deref(),
				Some("malformed_input:subject.id")
			);
		}

		#[test]
		fn blank_driver_id_is_denied() {
			let subject = Subject::driver("  ");
			let resource = order().with_driver("  ");
			let decision = evaluate_access(&subject, Action::Select, &resource, None, Utc::now());
			assert_eq!(
				decision,
				AccessDecision::deny(DenyReason::MalformedInput("subject.id"))
			);
		}

		#[test]
		fn resource_without_id_is_denied() {
			let resource = ResourceAttrs::new(ResourceType::Order).with_restaurant("R1");
			let decision = evaluate_access(
				&Subject::restaurant("R1"),
				Action::Select,
				&resource,
				None,
				Utc::now(),
			);
			assert_eq!(
				decision,
				AccessDecision::deny(DenyReason::MalformedInput("resource.id"))
			);
		}

		#[test]
		fn insert_does_not_need_resource_id() {
			let resource = ResourceAttrs::new(ResourceType::Order).with_restaurant("R1");
			let decision = evaluate_access(
				&Subject::restaurant("R1"),
				Action::Insert,
				&resource,
				None,
				Utc::now(),
			);
			assert!(decision.allowed);
		}

		#[test]
		fn demo_without_id_is_denied() {
			let missing = Subject {
				id: None,
				role: Role::Demo,
			};
			for subject in [missing, Subject::demo(" ")] {
				let decision =
					evaluate_access(&subject, Action::Select, &order(), None, Utc::now());
				assert_eq!(
					decision,
					AccessDecision::deny(DenyReason::MalformedInput("subject.id"))
				);
			}
		}

		#[test]
		fn demo_without_id_still_reads_catalog() {
			let subject = Subject {
				id: None,
				role: Role::Demo,
			};
			let product = ResourceAttrs::product("p-1");
			let decision = evaluate_access(&subject, Action::Select, &product, None, Utc::now());
			assert!(decision.allowed);
		}
	}

	mod role_guard {
		use super::*;

		#[test]
		fn non_admin_cannot_change_role() {
			let change = ResourceChange::role(Role::Admin);
			for (subject, id) in [
				(Subject::restaurant("R1"), "R1"),
				(Subject::driver("D1"), "D1"),
				(Subject::demo("X1"), "X1"),
			] {
				let profile = ResourceAttrs::profile(id).with_id("p-1");
				let decision =
					evaluate_access(&subject, Action::Update, &profile, Some(&change), Utc::now());
				assert_eq!(
					decision,
					AccessDecision::deny(DenyReason::RoleImmutable),
					"{} changed a role",
					subject.role
				);
			}
		}
	}

	mod per_role {
		use super::*;

		#[test]
		fn restaurant_reads_own_order() {
			let decision = evaluate_access(
				&Subject::restaurant("R1"),
				Action::Select,
				&order(),
				None,
				Utc::now(),
			);
			assert!(decision.allowed);
		}

		#[test]
		fn restaurant_order_update_follows_flag() {
			let subject = Subject::restaurant("R1");
			let change = ResourceChange::status(OrderStatus::Confirmed);
			let now = Utc::now();

			let denied = evaluate_access(&subject, Action::Update, &order(), Some(&change), now);
			assert_eq!(
				denied,
				AccessDecision::deny(DenyReason::RestaurantOrderUpdate)
			);

			let policy = AccessPolicy::new().with_restaurant_status_updates(true);
			let allowed = policy.evaluate(&subject, Action::Update, &order(), Some(&change), now);
			assert!(allowed.allowed);
		}

		#[test]
		fn driver_statuses_are_configurable() {
			let subject = Subject::driver("D1");
			let resource = order().with_driver("D1");
			let change = ResourceChange::status(OrderStatus::PickedUp);
			let now = Utc::now();

			assert!(
				!evaluate_access(&subject, Action::Update, &resource, Some(&change), now).allowed
			);

			let policy = AccessPolicy::new().with_driver_update_statuses(vec![
				OrderStatus::PickedUp,
				OrderStatus::InTransit,
				OrderStatus::Delivered,
			]);
			assert!(
				policy
					.evaluate(&subject, Action::Update, &resource, Some(&change), now)
					.allowed
			);
		}

		#[test]
		fn demo_window_is_configurable() {
			let now = Utc::now();
			let resource = order().with_created_at(now - Duration::days(10));
			let subject = Subject::demo("X1");

			assert!(!evaluate_access(&subject, Action::Select, &resource, None, now).allowed);

			let policy = AccessPolicy::new().with_demo_window(Duration::days(14));
			assert!(policy.evaluate(&subject, Action::Select, &resource, None, now).allowed);
		}
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		fn arb_action() -> impl Strategy<Value = Action> {
			prop::sample::select(Action::all().to_vec())
		}

		fn arb_resource_type() -> impl Strategy<Value = ResourceType> {
			prop::sample::select(ResourceType::all().to_vec())
		}

		fn arb_role() -> impl Strategy<Value = Role> {
			prop::sample::select(Role::all().to_vec())
		}

		fn arb_status() -> impl Strategy<Value = OrderStatus> {
			prop::sample::select(OrderStatus::all().to_vec())
		}

		fn arb_opt_id() -> impl Strategy<Value = Option<String>> {
			prop::option::of("[A-Z][0-9]{1,3}")
		}

		fn arb_resource() -> impl Strategy<Value = ResourceAttrs> {
			(
				arb_resource_type(),
				arb_opt_id(),
				arb_opt_id(),
				arb_opt_id(),
				arb_opt_id(),
				prop::option::of(0i64..30),
			)
				.prop_map(|(kind, id, restaurant, driver, user, age_days)| {
					let mut resource = ResourceAttrs::new(kind);
					resource.id = id.map(Into::into);
					resource.restaurant_id = restaurant.map(Into::into);
					resource.driver_id = driver.map(Into::into);
					resource.user_id = user.map(Into::into);
					resource.created_at = age_days.map(|d| Utc::now() - Duration::days(d));
					resource
				})
		}

		fn arb_change() -> impl Strategy<Value = Option<ResourceChange>> {
			prop::option::of(
				(prop::option::of(arb_status()), prop::option::of(arb_role())).prop_map(
					|(new_status, new_role)| ResourceChange {
						new_status,
						new_role,
					},
				),
			)
		}

		proptest! {
			#[test]
			fn admin_universality(
				resource in arb_resource(),
				action in arb_action(),
				change in arb_change(),
			) {
				let decision =
					evaluate_access(&Subject::admin("A1"), action, &resource, change.as_ref(), Utc::now());
				prop_assert!(decision.allowed);
			}

			#[test]
			fn ownership_isolation(
				x in "[A-Z][0-9]{1,3}",
				y in "[A-Z][0-9]{1,3}",
				resource_type in prop::sample::select(vec![ResourceType::Order, ResourceType::OrderItem]),
				action in arb_action(),
			) {
				prop_assume!(x != y);
				let resource = ResourceAttrs::new(resource_type)
					.with_id("r-1")
					.with_restaurant(y.as_str());
				let decision = evaluate_access(
					&Subject::restaurant(x.as_str()),
					action,
					&resource,
					None,
					Utc::now(),
				);
				prop_assert!(!decision.allowed);
			}

			#[test]
			fn non_admin_never_writes_a_role(
				role in prop::sample::select(vec![Role::Restaurant, Role::Driver, Role::Demo, Role::Anonymous]),
				new_role in arb_role(),
				resource in arb_resource(),
			) {
				let subject = Subject { id: Some("U1".into()), role };
				let change = ResourceChange::role(new_role);
				let decision =
					evaluate_access(&subject, Action::Update, &resource, Some(&change), Utc::now());
				prop_assert!(!decision.allowed);
			}

			#[test]
			fn evaluation_leaves_subject_unchanged(
				role in arb_role(),
				resource in arb_resource(),
				action in arb_action(),
				change in arb_change(),
			) {
				let subject = Subject { id: Some("U1".into()), role };
				let before = subject.clone();
				let _ = evaluate_access(&subject, action, &resource, change.as_ref(), Utc::now());
				prop_assert_eq!(subject, before);
			}

			#[test]
			fn demo_never_mutates(resource in arb_resource(), action in arb_action()) {
				prop_assume!(action.is_mutation());
				let decision =
					evaluate_access(&Subject::demo("X1"), action, &resource, None, Utc::now());
				prop_assert!(!decision.allowed);
			}

			#[test]
			fn unassigned_orders_invisible_to_drivers(driver in "[A-Z][0-9]{1,3}", action in arb_action()) {
				let resource = ResourceAttrs::order("o-1", "R1");
				let decision = evaluate_access(
					&Subject::driver(driver.as_str()),
					action,
					&resource,
					None,
					Utc::now(),
				);
				prop_assert!(!decision.allowed);
			}
		}
	}
}
