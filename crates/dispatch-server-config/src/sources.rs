// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuditConfigLayer, LogFormat, LoggingConfigLayer, PolicyConfigLayer, QueueOverflowPolicy,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/dispatch/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: DISPATCH_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			policy: Some(load_policy_from_env()?),
			logging: Some(load_logging_from_env()?),
			audit: Some(load_audit_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_list(name: &str) -> Option<Vec<String>> {
	env_var(name).map(|s| {
		s.split(',')
			.map(|s| s.trim().to_string())
			.filter(|s| !s.is_empty())
			.collect()
	})
}

fn env_i64(name: &str) -> Result<Option<i64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid i64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid usize value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_policy_from_env() -> Result<PolicyConfigLayer, ConfigError> {
	Ok(PolicyConfigLayer {
		demo_window_days: env_i64("DISPATCH_SERVER_POLICY_DEMO_WINDOW_DAYS")?,
		public_catalog: env_list("DISPATCH_SERVER_POLICY_PUBLIC_CATALOG"),
		driver_update_statuses: env_list("DISPATCH_SERVER_POLICY_DRIVER_UPDATE_STATUSES"),
		restaurant_status_updates: env_bool("DISPATCH_SERVER_POLICY_RESTAURANT_STATUS_UPDATES"),
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var("DISPATCH_SERVER_LOG_FORMAT") {
		Some(v) => Some(v.parse::<LogFormat>().map_err(|message| {
			ConfigError::InvalidValue {
				key: "DISPATCH_SERVER_LOG_FORMAT".to_string(),
				message,
			}
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env_var("DISPATCH_SERVER_LOG_LEVEL"),
		format,
	})
}

fn load_audit_from_env() -> Result<AuditConfigLayer, ConfigError> {
	let queue_overflow_policy = env_var("DISPATCH_SERVER_AUDIT_QUEUE_OVERFLOW_POLICY").map(|v| {
		match v.to_lowercase().as_str() {
			"block" => QueueOverflowPolicy::Block,
			_ => QueueOverflowPolicy::DropNewest,
		}
	});

	Ok(AuditConfigLayer {
		enabled: env_bool("DISPATCH_SERVER_AUDIT_ENABLED"),
		queue_capacity: env_usize("DISPATCH_SERVER_AUDIT_QUEUE_CAPACITY")?,
		queue_overflow_policy,
		min_severity: env_var("DISPATCH_SERVER_AUDIT_MIN_SEVERITY"),
		file_path: env_var("DISPATCH_SERVER_AUDIT_FILE_PATH").map(PathBuf::from),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.policy.is_none());
		assert!(layer.audit.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let source = TomlSource::new("/nonexistent/config.toml");
		let layer = source.load().unwrap();
		assert_eq!(layer, ServerConfigLayer::default());
	}

	#[test]
	fn test_toml_source_reads_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("server.toml");
		std::fs::write(
			&path,
			"[policy]\npublic_catalog = [\"product\", \"order_item\"]\n[logging]\nformat = \"json\"\n",
		)
		.unwrap();

		let layer = TomlSource::new(&path).load().unwrap();
		assert_eq!(
			layer.policy.unwrap().public_catalog,
			Some(vec!["product".to_string(), "order_item".to_string()])
		);
		assert_eq!(layer.logging.unwrap().format, Some(LogFormat::Json));
	}

	#[test]
	fn test_toml_source_reports_parse_errors() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("server.toml");
		std::fs::write(&path, "[policy\n").unwrap();

		let err = TomlSource::new(&path).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_list_splits_and_trims() {
		std::env::set_var("DISPATCH_SERVER_TEST_LIST", " product , ,order_item");
		assert_eq!(
			env_list("DISPATCH_SERVER_TEST_LIST"),
			Some(vec!["product".to_string(), "order_item".to_string()])
		);
		std::env::remove_var("DISPATCH_SERVER_TEST_LIST");
	}

	#[test]
	fn test_env_i64_rejects_garbage() {
		std::env::set_var("DISPATCH_SERVER_TEST_I64", "seven");
		let err = env_i64("DISPATCH_SERVER_TEST_I64").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
		std::env::remove_var("DISPATCH_SERVER_TEST_I64");
	}

	#[test]
	fn test_env_bool_accepts_one_and_true() {
		std::env::set_var("DISPATCH_SERVER_TEST_BOOL_A", "1");
		std::env::set_var("DISPATCH_SERVER_TEST_BOOL_B", "TRUE");
		std::env::set_var("DISPATCH_SERVER_TEST_BOOL_C", "no");
		assert_eq!(env_bool("DISPATCH_SERVER_TEST_BOOL_A"), Some(true));
		assert_eq!(env_bool("DISPATCH_SERVER_TEST_BOOL_B"), Some(true));
		assert_eq!(env_bool("DISPATCH_SERVER_TEST_BOOL_C"), Some(false));
		assert_eq!(env_bool("DISPATCH_SERVER_TEST_BOOL_UNSET"), None);
	}
}
