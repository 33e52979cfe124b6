// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-based access control for Dispatch records.
//!
//! Row-level rules that would otherwise live in database policies are
//! expressed here as one explicit decision function, invoked by the API layer
//! before any persistence call.

mod engine;
pub mod policies;
mod types;

pub use engine::{evaluate_access, AccessPolicy, DEFAULT_DEMO_WINDOW_DAYS};
pub use types::{
	AccessDecision, Action, DenyReason, ResourceAttrs, ResourceChange, ResourceType, Subject,
};
