//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates configuration from `engine.toml`. Settlement
//! policy (challenge window length, dispute threshold, the arbitration
//! admin account) is externalized here - nothing is hardcoded in the
//! domain layer.

pub mod loader;

use chrono::Duration;
use serde::Deserialize;

use crate::domain::market::AccountId;

/// Top-level engine configuration.
///
/// Loaded from `engine.toml` at startup. All fields are validated
/// before the engine begins operation.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
  /// Service identity and logging.
  pub engine: ServiceConfig,
  /// Settlement policy parameters.
  pub settlement: SettlementConfig,
  /// Audit-trail persistence configuration.
  #[serde(default)]
  pub persistence: PersistenceConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Settlement policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
  /// Challenge ("cooldown") window length in minutes.
  #[serde(default = "default_cooldown_minutes")]
  pub cooldown_minutes: u32,
  /// Fraud reports that escalate a cooldown market to review.
  #[serde(default = "default_dispute_threshold")]
  pub dispute_threshold: u32,
  /// Account allowed to cancel markets and arbitrate reviews.
  pub admin: AccountId,
}

impl SettlementConfig {
  /// Runtime parameters derived from this section.
  pub fn params(&self) -> SettlementParams {
    SettlementParams {
      cooldown: Duration::minutes(i64::from(self.cooldown_minutes)),
      dispute_threshold: self.dispute_threshold,
    }
  }
}

/// Settlement parameters in the units the desks consume.
#[derive(Debug, Clone, Copy)]
pub struct SettlementParams {
  /// Challenge window length.
  pub cooldown: Duration,
  /// Reports required to escalate to review.
  pub dispute_threshold: u32,
}

/// Audit-trail persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Whether to persist settlement events at all.
  #[serde(default)]
  pub enabled: bool,
  /// Base directory for JSONL event files.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      data_dir: default_data_dir(),
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_cooldown_minutes() -> u32 {
  24 * 60
}

fn default_dispute_threshold() -> u32 {
  3
}

fn default_data_dir() -> String {
  "data".to_string()
}
