// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization core for Dispatch.
//!
//! Two pure decision functions live here:
//!
//! - [`abac`]: decides whether a [`Subject`] may `select`, `insert`, `update` or
//!   `delete` a resource ([`AccessPolicy::evaluate`]).
//! - [`order`]: validates order status transitions against the lifecycle table
//!   and the actor's role ([`validate_transition`]).
//!
//! Neither function performs I/O or holds state. The caller supplies the
//! authenticated subject, the persisted record and the evaluation time for
//! every call, and receives a fresh decision value back. Denials are ordinary
//! return values, never errors.

pub mod abac;
pub mod error;
pub mod order;
pub mod types;

pub use abac::{
	evaluate_access, AccessDecision, AccessPolicy, Action, DenyReason, ResourceAttrs,
	ResourceChange, ResourceType, Subject, DEFAULT_DEMO_WINDOW_DAYS,
};
pub use error::AuthError;
pub use order::{
	validate_transition, validate_transition_str, Order, OrderStatus, SideEffects,
	TransitionContext, TransitionDecision, TransitionDeclined,
};
pub use types::{ResourceId, Role, SubjectId};
