// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::transition::TRANSITIONS;
use crate::error::AuthError;

/// Status of an order.
///
/// Variants are declared in lifecycle order, so `Ord` compares progress.
/// `Cancelled` sorts last but is reachable from every non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	Pending,
	Confirmed,
	Priced,
	Assigned,
	PickedUp,
	InTransit,
	Delivered,
	Cancelled,
}

impl OrderStatus {
	/// The status every new order starts in.
	pub const INITIAL: OrderStatus = OrderStatus::Pending;

	/// Returns all statuses in lifecycle order.
	pub fn all() -> &'static [OrderStatus] {
		&[
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			OrderStatus::Priced,
			OrderStatus::Assigned,
			OrderStatus::PickedUp,
			OrderStatus::InTransit,
			OrderStatus::Delivered,
			OrderStatus::Cancelled,
		]
	}

	/// Returns true if no transition leaves this status.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
	}

	/// Returns true if an order in this status must have a driver.
	pub fn requires_driver(&self) -> bool {
		matches!(
			self,
			OrderStatus::PickedUp | OrderStatus::InTransit | OrderStatus::Delivered
		)
	}

	/// Returns the statuses this one may move to, regardless of actor.
	pub fn allowed_targets(&self) -> Vec<OrderStatus> {
		TRANSITIONS
			.iter()
			.filter(|t| t.from == *self)
			.map(|t| t.to)
			.collect()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Confirmed => "confirmed",
			OrderStatus::Priced => "priced",
			OrderStatus::Assigned => "assigned",
			OrderStatus::PickedUp => "picked_up",
			OrderStatus::InTransit => "in_transit",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Cancelled => "cancelled",
		};
		write!(f, "{s}")
	}
}

impl FromStr for OrderStatus {
	type Err = AuthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
		OrderStatus::all()
			.iter()
			.copied()
			.find(|status| status.to_string() == normalized)
			.ok_or_else(|| AuthError::UnknownStatus(s.to_string()))
	}
}
