// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors raised while parsing policy inputs from their string form.
///
/// Policy denials are never reported through this type; they are returned as
/// [`crate::AccessDecision`] or [`crate::TransitionDecision`] values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("unknown role: {0}")]
	UnknownRole(String),

	#[error("unknown order status: {0}")]
	UnknownStatus(String),

	#[error("unknown action: {0}")]
	UnknownAction(String),

	#[error("unknown resource type: {0}")]
	UnknownResourceType(String),
}
