//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `engine.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::EngineConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<EngineConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: EngineConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse engine.toml")?;

  validate_config(&config)?;

  info!(
    name = %config.engine.name,
    cooldown_minutes = config.settlement.cooldown_minutes,
    dispute_threshold = config.settlement.dispute_threshold,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &EngineConfig) -> Result<()> {
  anyhow::ensure!(
    !config.engine.name.is_empty(),
    "engine.name must not be empty"
  );

  anyhow::ensure!(
    config.settlement.cooldown_minutes > 0,
    "settlement.cooldown_minutes must be positive, got {}",
    config.settlement.cooldown_minutes
  );
  anyhow::ensure!(
    config.settlement.dispute_threshold >= 1,
    "settlement.dispute_threshold must be at least 1, got {}",
    config.settlement.dispute_threshold
  );
  anyhow::ensure!(
    !config.settlement.admin.is_empty(),
    "settlement.admin must name the arbitration account"
  );

  if config.persistence.enabled {
    anyhow::ensure!(
      !config.persistence.data_dir.is_empty(),
      "persistence.data_dir must not be empty when persistence is enabled"
    );
  }

  Ok(())
}
