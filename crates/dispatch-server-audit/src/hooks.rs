// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post-commit hooks.
//!
//! The storage collaborator reports each committed write as a
//! [`CommitEvent`] through [`HookRegistry::dispatch`]. Hooks run after the
//! write, so a failing hook is logged and never undoes or blocks it.

use std::sync::Arc;

use async_trait::async_trait;
use dispatch_server_auth::{
	AccessDecision, Action, Order, OrderStatus, ResourceAttrs, Role, SideEffects, Subject,
	TransitionDecision,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AuditError;
use crate::event::{AuditEventType, AuditLogEntry};
use crate::pipeline::AuditService;

/// Something that happened, reported after it was committed or decided.
#[derive(Debug, Clone)]
pub enum CommitEvent {
	OrderCreated {
		order: Order,
		actor: Subject,
	},
	OrderStatusChanged {
		order: Order,
		from: OrderStatus,
		to: OrderStatus,
		actor: Subject,
		side_effects: Option<SideEffects>,
	},
	/// A transition was validated without a stored order, as the CLI does.
	TransitionDecided {
		from: OrderStatus,
		to: OrderStatus,
		actor_role: Role,
		decision: TransitionDecision,
	},
	AccessDecided {
		subject: Subject,
		action: Action,
		resource: ResourceAttrs,
		decision: AccessDecision,
	},
}

#[async_trait]
pub trait CommitHook: Send + Sync {
	fn name(&self) -> &str;

	async fn on_commit(&self, event: &CommitEvent) -> Result<(), AuditError>;
}

/// Ordered list of hooks.
#[derive(Default, Clone)]
pub struct HookRegistry {
	hooks: Vec<Arc<dyn CommitHook>>,
}

impl HookRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, hook: Arc<dyn CommitHook>) {
		self.hooks.push(hook);
	}

	pub fn with_hook(mut self, hook: Arc<dyn CommitHook>) -> Self {
		self.register(hook);
		self
	}

	pub fn len(&self) -> usize {
		self.hooks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.hooks.is_empty()
	}

	/// Runs every hook in registration order and returns how many failed.
	pub async fn dispatch(&self, event: &CommitEvent) -> usize {
		let mut failures = 0;
		for hook in &self.hooks {
			match hook.on_commit(event).await {
				Ok(()) => debug!(hook = hook.name(), "commit hook ran"),
				Err(e) => {
					failures += 1;
					warn!(hook = hook.name(), error = %e, "commit hook failed");
				}
			}
		}
		failures
	}
}

/// Records commit events in the audit log.
pub struct AuditCommitHook {
	service: Arc<AuditService>,
}

impl AuditCommitHook {
	pub fn new(service: Arc<AuditService>) -> Self {
		Self { service }
	}
}

#[async_trait]
impl CommitHook for AuditCommitHook {
	fn name(&self) -> &str {
		"audit"
	}

	async fn on_commit(&self, event: &CommitEvent) -> Result<(), AuditError> {
		if self.service.log(audit_entry(event)) {
			Ok(())
		} else {
			Err(AuditError::QueueFull)
		}
	}
}

fn status_event_type(to: OrderStatus) -> AuditEventType {
	match to {
		OrderStatus::Assigned => AuditEventType::DriverAssigned,
		OrderStatus::Delivered => AuditEventType::OrderDelivered,
		OrderStatus::Cancelled => AuditEventType::OrderCancelled,
		_ => AuditEventType::OrderStatusChanged,
	}
}

/// Maps a commit event to the audit entry that records it.
pub fn audit_entry(event: &CommitEvent) -> AuditLogEntry {
	match event {
		CommitEvent::OrderCreated { order, actor } => {
			AuditLogEntry::builder(AuditEventType::OrderCreated)
				.actor(actor.id.clone(), actor.role)
				.resource("order", Some(order.id.as_str()))
				.details(json!({
					"restaurant_id": order.restaurant_id,
					"status": order.status,
				}))
				.build()
		}
		CommitEvent::OrderStatusChanged {
			order,
			from,
			to,
			actor,
			side_effects,
		} => AuditLogEntry::builder(status_event_type(*to))
			.actor(actor.id.clone(), actor.role)
			.resource("order", Some(order.id.as_str()))
			.action(format!("{from} -> {to}"))
			.details(json!({
				"from": from,
				"to": to,
				"side_effects": side_effects,
			}))
			.build(),
		CommitEvent::TransitionDecided {
			from,
			to,
			actor_role,
			decision,
		} => {
			let event_type = if decision.allowed {
				status_event_type(*to)
			} else {
				AuditEventType::OrderTransitionDeclined
			};
			AuditLogEntry::builder(event_type)
				.actor(None, *actor_role)
				.resource("order", None::<String>)
				.action(format!("{from} -> {to}"))
				.details(json!({
					"from": from,
					"to": to,
					"decision": decision,
				}))
				.build()
		}
		CommitEvent::AccessDecided {
			subject,
			action,
			resource,
			decision,
		} => {
			let event_type = if decision.allowed {
				AuditEventType::AccessGranted
			} else {
				AuditEventType::AccessDenied
			};
			AuditLogEntry::builder(event_type)
				.actor(subject.id.clone(), subject.role)
				.resource(
					resource.resource_type.to_string(),
					resource.id.as_ref().map(|id| id.as_str()),
				)
				.action(action.to_string())
				.details(json!({ "reason": decision.reason }))
				.build()
		}
	}
}
