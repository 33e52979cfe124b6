// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for access policy evaluation.
//!
//! - [`Subject`]: The authenticated actor (ID and role)
//! - [`ResourceAttrs`]: Ownership and age attributes of the record being accessed
//! - [`Action`]: The row operation being attempted
//! - [`ResourceChange`]: The new values an update would write, where they matter
//! - [`AccessDecision`]: The allow/deny outcome with a machine-readable reason
//!
//! # Design Principles
//!
//! 1. **Immutable evaluation**: All attributes are loaded before evaluation
//! 2. **No database access**: Policy functions are pure
//! 3. **Explicit subject**: The caller passes the subject; nothing is read from
//!    ambient session state
//! 4. **Serializable**: Inputs deserialize from JSON, decisions serialize to it

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::AuthError;
use crate::order::OrderStatus;
use crate::types::{ResourceId, Role, SubjectId};

/// The authenticated actor making a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
	#[serde(default)]
	pub id: Option<SubjectId>,
	pub role: Role,
}

impl Subject {
	/// Creates a subject with the given ID and role.
	pub fn new(id: impl Into<SubjectId>, role: Role) -> Self {
		Self {
			id: Some(id.into()),
			role,
		}
	}

	pub fn admin(id: impl Into<SubjectId>) -> Self {
		Self::new(id, Role::Admin)
	}

	pub fn restaurant(id: impl Into<SubjectId>) -> Self {
		Self::new(id, Role::Restaurant)
	}

	pub fn driver(id: impl Into<SubjectId>) -> Self {
		Self::new(id, Role::Driver)
	}

	pub fn demo(id: impl Into<SubjectId>) -> Self {
		Self::new(id, Role::Demo)
	}

	/// An unauthenticated visitor. Has no ID.
	pub fn anonymous() -> Self {
		Self {
			id: None,
			role: Role::Anonymous,
		}
	}

	/// Returns the subject ID if present and not blank.
	pub fn identity(&self) -> Option<&SubjectId> {
		self.id.as_ref().filter(|id| !id.is_blank())
	}

	/// Returns true if `owner` names this subject.
	pub fn owns(&self, owner: Option<&SubjectId>) -> bool {
		match (self.identity(), owner) {
			(Some(me), Some(owner)) => me == owner,
			_ => false,
		}
	}
}

/// Types of records protected by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
	Order,
	OrderItem,
	Product,
	Profile,
}

impl ResourceType {
	/// Returns all resource types.
	pub fn all() -> &'static [ResourceType] {
		&[
			ResourceType::Order,
			ResourceType::OrderItem,
			ResourceType::Product,
			ResourceType::Profile,
		]
	}
}

impl fmt::Display for ResourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			ResourceType::Order => "order",
			ResourceType::OrderItem => "order_item",
			ResourceType::Product => "product",
			ResourceType::Profile => "profile",
		};
		write!(f, "{s}")
	}
}

impl FromStr for ResourceType {
	type Err = AuthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"order" | "orders" => Ok(ResourceType::Order),
			"order_item" | "order_items" => Ok(ResourceType::OrderItem),
			"product" | "products" => Ok(ResourceType::Product),
			"profile" | "profiles" => Ok(ResourceType::Profile),
			_ => Err(AuthError::UnknownResourceType(s.to_string())),
		}
	}
}

/// Attributes of the record being accessed.
///
/// For inserts this describes the record as it would be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttrs {
	pub resource_type: ResourceType,
	#[serde(default)]
	pub id: Option<ResourceId>,
	#[serde(default)]
	pub restaurant_id: Option<SubjectId>,
	#[serde(default)]
	pub driver_id: Option<SubjectId>,
	#[serde(default)]
	pub user_id: Option<SubjectId>,
	#[serde(default)]
	pub created_at: Option<DateTime<Utc>>,
}

impl ResourceAttrs {
	/// Creates attributes with no ID and no ownership fields.
	pub fn new(resource_type: ResourceType) -> Self {
		Self {
			resource_type,
			id: None,
			restaurant_id: None,
			driver_id: None,
			user_id: None,
			created_at: None,
		}
	}

	/// Creates resource attributes for an order owned by a restaurant.
	pub fn order(id: impl Into<ResourceId>, restaurant_id: impl Into<SubjectId>) -> Self {
		Self::new(ResourceType::Order)
			.with_id(id)
			.with_restaurant(restaurant_id)
	}

	/// Creates resource attributes for a line item of a restaurant's order.
	pub fn order_item(id: impl Into<ResourceId>, restaurant_id: impl Into<SubjectId>) -> Self {
		Self::new(ResourceType::OrderItem)
			.with_id(id)
			.with_restaurant(restaurant_id)
	}

	/// Creates resource attributes for a catalog product.
	pub fn product(id: impl Into<ResourceId>) -> Self {
		Self::new(ResourceType::Product).with_id(id)
	}

	/// Creates resource attributes for a user's profile. The profile ID is the
	/// user ID.
	pub fn profile(user_id: impl Into<SubjectId>) -> Self {
		let user_id = user_id.into();
		Self::new(ResourceType::Profile)
			.with_id(user_id.as_str())
			.with_user(user_id)
	}

	/// Builder: set id.
	pub fn with_id(mut self, id: impl Into<ResourceId>) -> Self {
		self.id = Some(id.into());
		self
	}

	/// Builder: set restaurant_id.
	pub fn with_restaurant(mut self, restaurant_id: impl Into<SubjectId>) -> Self {
		self.restaurant_id = Some(restaurant_id.into());
		self
	}

	/// Builder: set driver_id.
	pub fn with_driver(mut self, driver_id: impl Into<SubjectId>) -> Self {
		self.driver_id = Some(driver_id.into());
		self
	}

	/// Builder: set user_id.
	pub fn with_user(mut self, user_id: impl Into<SubjectId>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	/// Builder: set created_at.
	pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
		self.created_at = Some(created_at);
		self
	}

	/// Returns the resource ID if present and not blank.
	pub fn identity(&self) -> Option<&ResourceId> {
		self.id.as_ref().filter(|id| !id.is_blank())
	}

	/// Returns the ownership field a subject with `role` is matched against.
	///
	/// Profiles are always keyed by `user_id`; every other record is keyed by
	/// `restaurant_id` for restaurants and `driver_id` for drivers.
	pub fn owner_for(&self, role: Role) -> Option<&SubjectId> {
		let owner = if self.resource_type == ResourceType::Profile {
			self.user_id.as_ref()
		} else {
			match role {
				Role::Restaurant => self.restaurant_id.as_ref(),
				Role::Driver => self.driver_id.as_ref(),
				_ => None,
			}
		};
		owner.filter(|id| !id.is_blank())
	}
}

/// Row operations that can be performed on resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Select,
	Insert,
	Update,
	Delete,
}

impl Action {
	/// Returns all actions.
	pub fn all() -> &'static [Action] {
		&[Action::Select, Action::Insert, Action::Update, Action::Delete]
	}

	/// Returns true if the action writes.
	pub fn is_mutation(&self) -> bool {
		!matches!(self, Action::Select)
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::Select => write!(f, "select"),
			Action::Insert => write!(f, "insert"),
			Action::Update => write!(f, "update"),
			Action::Delete => write!(f, "delete"),
		}
	}
}

impl FromStr for Action {
	type Err = AuthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"select" => Ok(Action::Select),
			"insert" => Ok(Action::Insert),
			"update" => Ok(Action::Update),
			"delete" => Ok(Action::Delete),
			_ => Err(AuthError::UnknownAction(s.to_string())),
		}
	}
}

/// New values carried by an update that the policy inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
	#[serde(default)]
	pub new_status: Option<OrderStatus>,
	#[serde(default)]
	pub new_role: Option<Role>,
}

impl ResourceChange {
	/// A change that moves an order to `status`.
	pub fn status(status: OrderStatus) -> Self {
		Self {
			new_status: Some(status),
			new_role: None,
		}
	}

	/// A change that rewrites a profile's role.
	pub fn role(role: Role) -> Self {
		Self {
			new_status: None,
			new_role: Some(role),
		}
	}
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
	/// A required input (subject or resource ID, created_at) is missing.
	MalformedInput(&'static str),
	/// The subject does not own the record.
	NotOwner,
	/// The order has no driver; no driver can see it.
	Unassigned,
	/// The subject's role may only read.
	ReadOnlyRole,
	/// The record is older than the demo window.
	OutsideDemoWindow,
	/// Drivers may only move orders to the configured statuses.
	DriverStatusNotPermitted,
	/// Drivers never create orders.
	DriverCannotInsertOrders,
	/// Restaurants may not update order rows.
	RestaurantOrderUpdate,
	/// Only admins may change a role.
	RoleImmutable,
	/// Anonymous visitors may only read the public catalog.
	AnonymousDenied,
}

impl fmt::Display for DenyReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DenyReason::MalformedInput(field) => write!(f, "malformed_input:{field}"),
			DenyReason::NotOwner => write!(f, "not_owner"),
			DenyReason::Unassigned => write!(f, "unassigned"),
			DenyReason::ReadOnlyRole => write!(f, "read_only_role"),
			DenyReason::OutsideDemoWindow => write!(f, "outside_demo_window"),
			DenyReason::DriverStatusNotPermitted => write!(f, "driver_status_not_permitted"),
			DenyReason::DriverCannotInsertOrders => write!(f, "driver_cannot_insert_orders"),
			DenyReason::RestaurantOrderUpdate => write!(f, "restaurant_order_update"),
			DenyReason::RoleImmutable => write!(f, "role_immutable"),
			DenyReason::AnonymousDenied => write!(f, "anonymous_denied"),
		}
	}
}

impl Serialize for DenyReason {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Outcome of an access evaluation. Computed per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
	pub allowed: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<DenyReason>,
}

impl AccessDecision {
	pub fn allow() -> Self {
		Self {
			allowed: true,
			reason: None,
		}
	}

	pub fn deny(reason: DenyReason) -> Self {
		Self {
			allowed: false,
			reason: Some(reason),
		}
	}

	/// Allows when `condition` holds, otherwise denies with `reason`.
	pub fn allow_if(condition: bool, reason: DenyReason) -> Self {
		if condition {
			Self::allow()
		} else {
			Self::deny(reason)
		}
	}

	pub fn is_allowed(&self) -> bool {
		self.allowed
	}
}
