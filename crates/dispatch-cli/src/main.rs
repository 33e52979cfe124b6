// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dispatch policy command-line tool.
//!
//! Evaluates access requests and order status transitions read as JSON and
//! prints the decision. Denials are normal output; the process only fails on
//! unreadable input or invalid configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dispatch_server_audit::{AuditCommitHook, AuditService, CommitEvent, HookRegistry};
use dispatch_server_config::{AuditConfig, LogFormat, LoggingConfig, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod request;
mod version;

use request::{read_request, run_access, run_transition, AccessRequest, TransitionRequest};

/// Dispatch - access policy and order lifecycle checks.
#[derive(Parser, Debug)]
#[command(name = "dispatch", about = "Dispatch access policy and order transition checks", version)]
struct Args {
	/// TOML configuration file (defaults to /etc/dispatch/server.toml)
	#[arg(long, global = true, env = "DISPATCH_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Decide whether a subject may act on a resource
	Access {
		/// Request JSON file, or `-` for stdin
		#[arg(long, default_value = "-")]
		input: String,
	},
	/// Validate an order status transition
	Transition {
		/// Request JSON file, or `-` for stdin
		#[arg(long, default_value = "-")]
		input: String,
	},
	/// Show version and build information
	Version,
}

/// A command that produces a decision.
#[derive(Debug, PartialEq, Eq)]
enum Check {
	Access { input: String },
	Transition { input: String },
}

impl Command {
	/// Returns the decision this command asks for, or `None` for `version`.
	fn into_check(self) -> Option<Check> {
		match self {
			Command::Access { input } => Some(Check::Access { input }),
			Command::Transition { input } => Some(Check::Transition { input }),
			Command::Version => None,
		}
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let Some(check) = args.command.into_check() else {
		println!("{}", version::format_version_info());
		return Ok(());
	};

	let config = match &args.config {
		Some(path) => dispatch_server_config::load_config_with_file(path)?,
		None => dispatch_server_config::load_config()?,
	};

	init_tracing(&config.logging);

	let (output, event) = run(&config, check)?;
	println!("{}", serde_json::to_string_pretty(&output)?);

	if let Some(event) = event {
		record(&config.audit, event).await?;
	}

	Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);

	match logging.format {
		LogFormat::Json => registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init(),
	}
}

fn run(config: &ServerConfig, check: Check) -> Result<(serde_json::Value, Option<CommitEvent>)> {
	let now = Utc::now();
	match check {
		Check::Access { input } => {
			let policy = config.access_policy()?;
			let request: AccessRequest = read_request(&input)?;
			let (output, event) = run_access(&policy, request, now)?;
			Ok((output, Some(event)))
		}
		Check::Transition { input } => {
			let request: TransitionRequest = read_request(&input)?;
			run_transition(request, now)
		}
	}
}

/// Records `event` through the audit hook and waits for the sinks to finish.
async fn record(audit: &AuditConfig, event: CommitEvent) -> Result<()> {
	if !audit.enabled {
		return Ok(());
	}

	let service = Arc::new(AuditService::from_config(audit)?);
	let hooks = HookRegistry::new().with_hook(Arc::new(AuditCommitHook::new(Arc::clone(&service))));
	hooks.dispatch(&event).await;
	drop(hooks);

	match Arc::try_unwrap(service) {
		Ok(service) => service.shutdown().await?,
		Err(_) => warn!("audit service still shared at exit, entries may be lost"),
	}
	info!("decision recorded");
	Ok(())
}
