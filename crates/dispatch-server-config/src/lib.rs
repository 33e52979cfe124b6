// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Dispatch server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`DISPATCH_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use dispatch_server_config::load_config;
//!
//! let config = load_config()?;
//! let policy = config.access_policy()?;
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use dispatch_server_auth::AccessPolicy;
use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerConfig {
	pub policy: PolicyConfig,
	pub logging: LoggingConfig,
	pub audit: AuditConfig,
}

impl ServerConfig {
	/// Builds the access policy described by the `policy` section.
	pub fn access_policy(&self) -> Result<AccessPolicy, ConfigError> {
		self.policy.to_access_policy()
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`DISPATCH_SERVER_*`)
/// 2. Config file (`/etc/dispatch/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let policy = layer.policy.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let audit = layer.audit.unwrap_or_default().finalize();

	validate_config(&policy, &audit)?;

	info!(
		demo_window_days = policy.demo_window_days,
		public_catalog = ?policy.public_catalog,
		restaurant_status_updates = policy.restaurant_status_updates,
		log_level = %logging.level,
		log_format = %logging.format,
		audit_enabled = audit.enabled,
		audit_file = ?audit.file_path,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		policy,
		logging,
		audit,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(policy: &PolicyConfig, audit: &AuditConfig) -> Result<(), ConfigError> {
	policy.to_access_policy()?;

	if !is_known_severity(&audit.min_severity) {
		return Err(ConfigError::InvalidValue {
			key: "audit.min_severity".to_string(),
			message: format!(
				"unknown severity '{}', expected one of: {}",
				audit.min_severity,
				SEVERITY_NAMES.join(", ")
			),
		});
	}

	if audit.enabled && audit.queue_capacity == 0 {
		return Err(ConfigError::Validation(
			"audit.queue_capacity must be at least 1 while audit logging is enabled".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_defaults_validate() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config, ServerConfig::default());
		assert_eq!(config.access_policy().unwrap(), AccessPolicy::default());
	}

	#[test]
	fn test_unknown_min_severity_is_rejected() {
		let layer = ServerConfigLayer {
			audit: Some(AuditConfigLayer {
				min_severity: Some("loud".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(matches!(
			err,
			ConfigError::InvalidValue { ref key, .. } if key == "audit.min_severity"
		));
	}

	#[test]
	fn test_severity_alias_is_accepted() {
		let layer = ServerConfigLayer {
			audit: Some(AuditConfigLayer {
				min_severity: Some("warn".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		assert_eq!(finalize(layer).unwrap().audit.min_severity, "warn");
	}

	#[test]
	fn test_zero_demo_window_is_rejected() {
		let layer = ServerConfigLayer {
			policy: Some(PolicyConfigLayer {
				demo_window_days: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(finalize(layer).is_err());
	}

	#[test]
	fn test_zero_queue_capacity_is_rejected_when_enabled() {
		let layer = ServerConfigLayer {
			audit: Some(AuditConfigLayer {
				queue_capacity: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));

		let layer = ServerConfigLayer {
			audit: Some(AuditConfigLayer {
				enabled: Some(false),
				queue_capacity: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(finalize(layer).is_ok());
	}

	#[test]
	fn test_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[policy]\ndemo_window_days = 14\n\n[audit]\nmin_severity = \"warning\""
		)
		.unwrap();

		let sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
		];
		let config = load_from_sources(sources).unwrap();
		assert_eq!(config.policy.demo_window_days, 14);
		assert_eq!(config.audit.min_severity, "warning");
		assert_eq!(config.logging.level, "info");
	}

	#[test]
	fn test_sources_apply_in_precedence_order() {
		struct Fixed(Precedence, i64);

		impl ConfigSource for Fixed {
			fn name(&self) -> &'static str {
				"fixed"
			}

			fn precedence(&self) -> Precedence {
				self.0
			}

			fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
				Ok(ServerConfigLayer {
					policy: Some(PolicyConfigLayer {
						demo_window_days: Some(self.1),
						..Default::default()
					}),
					..Default::default()
				})
			}
		}

		let sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(Fixed(Precedence::Environment, 30)),
			Box::new(Fixed(Precedence::Defaults, 1)),
			Box::new(Fixed(Precedence::ConfigFile, 2)),
		];
		let config = load_from_sources(sources).unwrap();
		assert_eq!(config.policy.demo_window_days, 30);
	}
}
