// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access policy configuration section.

use chrono::Duration;
use dispatch_server_auth::{AccessPolicy, OrderStatus, ResourceType, DEFAULT_DEMO_WINDOW_DAYS};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest demo window accepted, in days.
pub const MAX_DEMO_WINDOW_DAYS: i64 = 3650;

fn default_public_catalog() -> Vec<String> {
	vec!["product".to_string()]
}

fn default_driver_update_statuses() -> Vec<String> {
	vec!["in_transit".to_string(), "delivered".to_string()]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfigLayer {
	pub demo_window_days: Option<i64>,
	pub public_catalog: Option<Vec<String>>,
	pub driver_update_statuses: Option<Vec<String>>,
	pub restaurant_status_updates: Option<bool>,
}

impl PolicyConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.demo_window_days.is_some() {
			self.demo_window_days = other.demo_window_days;
		}
		if other.public_catalog.is_some() {
			self.public_catalog = other.public_catalog;
		}
		if other.driver_update_statuses.is_some() {
			self.driver_update_statuses = other.driver_update_statuses;
		}
		if other.restaurant_status_updates.is_some() {
			self.restaurant_status_updates = other.restaurant_status_updates;
		}
	}

	pub fn finalize(self) -> PolicyConfig {
		PolicyConfig {
			demo_window_days: self.demo_window_days.unwrap_or(DEFAULT_DEMO_WINDOW_DAYS),
			public_catalog: self.public_catalog.unwrap_or_else(default_public_catalog),
			driver_update_statuses: self
				.driver_update_statuses
				.unwrap_or_else(default_driver_update_statuses),
			restaurant_status_updates: self.restaurant_status_updates.unwrap_or(false),
		}
	}
}

/// Resolved access policy settings.
///
/// Resource types and statuses are kept as strings here and checked by
/// [`PolicyConfig::to_access_policy`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
	pub demo_window_days: i64,
	pub public_catalog: Vec<String>,
	pub driver_update_statuses: Vec<String>,
	pub restaurant_status_updates: bool,
}

impl Default for PolicyConfig {
	fn default() -> Self {
		PolicyConfigLayer::default().finalize()
	}
}

impl PolicyConfig {
	/// Builds the evaluator policy, rejecting unknown names and a demo window
	/// outside `1..=MAX_DEMO_WINDOW_DAYS`.
	pub fn to_access_policy(&self) -> Result<AccessPolicy, ConfigError> {
		let demo_window = self.demo_window()?;

		let public_catalog = self
			.public_catalog
			.iter()
			.map(|s| {
				s.parse::<ResourceType>()
					.map_err(|e| ConfigError::InvalidValue {
						key: "policy.public_catalog".to_string(),
						message: e.to_string(),
					})
			})
			.collect::<Result<Vec<_>, _>>()?;

		let driver_update_statuses = self
			.driver_update_statuses
			.iter()
			.map(|s| {
				s.parse::<OrderStatus>()
					.map_err(|e| ConfigError::InvalidValue {
						key: "policy.driver_update_statuses".to_string(),
						message: e.to_string(),
					})
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(AccessPolicy::new()
			.with_demo_window(demo_window)
			.with_public_catalog(public_catalog)
			.with_driver_update_statuses(driver_update_statuses)
			.with_restaurant_status_updates(self.restaurant_status_updates))
	}

	fn demo_window(&self) -> Result<Duration, ConfigError> {
		let days = self.demo_window_days;
		if !(1..=MAX_DEMO_WINDOW_DAYS).contains(&days) {
			return Err(ConfigError::InvalidValue {
				key: "policy.demo_window_days".to_string(),
				message: format!("must be between 1 and {MAX_DEMO_WINDOW_DAYS}, got {days}"),
			});
		}
		Duration::try_days(days).ok_or_else(|| ConfigError::InvalidValue {
			key: "policy.demo_window_days".to_string(),
			message: format!("{days} days is out of range"),
		})
	}
}
