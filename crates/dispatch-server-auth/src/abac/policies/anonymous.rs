// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Public catalog and anonymous visitor policies.

use crate::abac::{AccessDecision, Action, DenyReason, ResourceAttrs, ResourceType};

/// Returns true if the request reads a public catalog resource. Such reads
/// are allowed for every subject.
pub fn is_catalog_read(action: Action, resource: &ResourceAttrs, catalog: &[ResourceType]) -> bool {
	action == Action::Select && catalog.contains(&resource.resource_type)
}

/// Evaluates anonymous access outside the public catalog.
pub fn evaluate() -> AccessDecision {
	AccessDecision::deny(DenyReason::AnonymousDenied)
}
