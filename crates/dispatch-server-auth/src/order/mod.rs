// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Order lifecycle: statuses, the transition table, and the [`Order`]
//! aggregate that applies validated transitions.

mod model;
mod status;
mod transition;

pub use model::Order;
pub use status::OrderStatus;
pub use transition::{
	find_transition, targets_for, validate_transition, validate_transition_str, SideEffects,
	Transition, TransitionContext, TransitionDecision, TransitionDeclined, TRANSITIONS,
};
