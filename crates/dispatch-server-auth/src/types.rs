// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions shared by the access evaluator and the order
//! state machine.
//!
//! - **ID newtypes**: Type-safe wrappers around opaque string identifiers
//!   ([`SubjectId`], [`ResourceId`]) preventing accidental mixing
//! - **Roles**: The closed set of [`Role`]s a subject can hold
//!
//! Identifiers are opaque strings because the storage layer hands them over
//! in whatever form it keys records by. All ID types serialize transparently.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AuthError;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Create a new ID from any string-like value.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			/// Generate a new random ID (UUIDv4, hyphenated).
			pub fn generate() -> Self {
				Self(Uuid::new_v4().to_string())
			}

			/// Get the ID as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}

			/// Get the inner string value.
			pub fn into_inner(self) -> String {
				self.0
			}

			/// Returns true if the ID is empty or whitespace only.
			///
			/// A blank ID is treated exactly like a missing one.
			pub fn is_blank(&self) -> bool {
				self.0.trim().is_empty()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}

		impl From<$name> for String {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(
	SubjectId,
	"Identifier of an authenticated subject (restaurant, driver, admin or demo user)."
);
define_id_type!(ResourceId, "Identifier of a protected record.");

// =============================================================================
// Roles
// =============================================================================

/// The role of the subject making a request.
///
/// Roles come from the session layer, never from the record or request body
/// being evaluated. Nothing in this crate can change a subject's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Platform operator. Unrestricted.
	Admin,
	/// A restaurant account; sees and creates its own records.
	Restaurant,
	/// A delivery driver; sees orders assigned to them.
	Driver,
	/// Read-only showcase account limited to recent records.
	Demo,
	/// Unauthenticated visitor.
	Anonymous,
}

impl Role {
	/// Returns all roles.
	pub fn all() -> &'static [Role] {
		&[
			Role::Admin,
			Role::Restaurant,
			Role::Driver,
			Role::Demo,
			Role::Anonymous,
		]
	}

	/// Returns true if a subject with this role must carry an ID. Admins are
	/// exempt because their decision never depends on it.
	pub fn requires_identity(&self) -> bool {
		matches!(self, Role::Restaurant | Role::Driver | Role::Demo)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Admin => write!(f, "admin"),
			Role::Restaurant => write!(f, "restaurant"),
			Role::Driver => write!(f, "driver"),
			Role::Demo => write!(f, "demo"),
			Role::Anonymous => write!(f, "anonymous"),
		}
	}
}

impl FromStr for Role {
	type Err = AuthError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"admin" => Ok(Role::Admin),
			"restaurant" => Ok(Role::Restaurant),
			"driver" => Ok(Role::Driver),
			"demo" => Ok(Role::Demo),
			"anonymous" | "anon" => Ok(Role::Anonymous),
			_ => Err(AuthError::UnknownRole(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod id_types {
		use super::*;

		#[test]
		fn subject_id_serializes_as_plain_string() {
			let id = SubjectId::new("R1");
			let json = serde_json::to_string(&id).unwrap();
			assert_eq!(json, "\"R1\"");
		}

		#[test]
		fn subject_id_deserializes_from_plain_string() {
			let id: SubjectId = serde_json::from_str("\"D1\"").unwrap();
			assert_eq!(id.as_str(), "D1");
		}

		#[test]
		fn generated_ids_are_unique_uuids() {
			let a = ResourceId::generate();
			let b = ResourceId::generate();
			assert_ne!(a, b);
			assert!(Uuid::parse_str(a.as_str()).is_ok());
		}

		#[test]
		fn blank_ids() {
			assert!(SubjectId::new("").is_blank());
			assert!(SubjectId::new("   ").is_blank());
			assert!(!SubjectId::new("R1").is_blank());
		}

		proptest! {
				#[test]
				fn display_matches_inner(s in "[a-zA-Z0-9-]{1,32}") {
						let id = SubjectId::new(s.clone());
						prop_assert_eq!(id.to_string(), s.clone());
						prop_assert_eq!(String::from(id), s);
				}
		}
	}

	mod roles {
		use super::*;

		#[test]
		fn role_serializes_snake_case() {
			let json = serde_json::to_string(&Role::Restaurant).unwrap();
			assert_eq!(json, "\"restaurant\"");
		}

		#[test]
		fn role_parses_case_insensitively() {
			assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
			assert_eq!(" driver ".parse::<Role>().unwrap(), Role::Driver);
			assert_eq!("anon".parse::<Role>().unwrap(), Role::Anonymous);
		}

		#[test]
		fn unknown_role_is_an_error() {
			let err = "superuser".parse::<Role>().unwrap_err();
			assert_eq!(err, AuthError::UnknownRole("superuser".to_string()));
		}

		#[test]
		fn display_roundtrips_through_from_str() {
			for role in Role::all() {
				assert_eq!(role.to_string().parse::<Role>().unwrap(), *role);
			}
		}

		#[test]
		fn only_ownership_roles_require_identity() {
			assert!(Role::Restaurant.requires_identity());
			assert!(Role::Driver.requires_identity());
			assert!(!Role::Admin.requires_identity());
			assert!(Role::Demo.requires_identity());
			assert!(!Role::Anonymous.requires_identity());
		}
	}
}
