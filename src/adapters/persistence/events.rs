//! Event Log - Append-only JSONL Settlement Records
//!
//! Persists settlement events to per-market JSONL files in the format
//! `events/market-<id>.jsonl`. Each line is a self-contained JSON
//! record for easy parsing, streaming, and dispute forensics.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::domain::market::MarketId;
use crate::ports::repository::{EventRepository, SettlementEvent};

/// Append-only JSONL event log with per-market file partitioning.
///
/// Event files are named `events/market-<id>.jsonl` and each line is a
/// complete JSON object. This format is optimized for:
/// - Append-only writes (no read-modify-write)
/// - Line-by-line streaming for analysis
/// - Natural per-market partitioning (the engine's concurrency domain)
pub struct EventLog {
    /// Base directory for event files.
    events_dir: PathBuf,
}

impl EventLog {
    /// Create a new event log in the given data directory.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let events_dir = Path::new(data_dir).join("events");

        fs::create_dir_all(&events_dir)
            .await
            .context("Failed to create events directory")?;

        Ok(Self { events_dir })
    }

    fn market_path(&self, market_id: MarketId) -> PathBuf {
        self.events_dir.join(format!("market-{market_id}.jsonl"))
    }
}

#[async_trait]
impl EventRepository for EventLog {
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn append(&self, event: &SettlementEvent) -> Result<()> {
        let path = self.market_path(event.market_id);

        let mut json = serde_json::to_string(event)
            .context("Failed to serialize settlement event")?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .context("Failed to open event log file")?;

        file.write_all(json.as_bytes())
            .await
            .context("Failed to write settlement event")?;

        file.flush().await.context("Failed to flush event log")?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_for_market(&self, market_id: MarketId) -> Result<Vec<SettlementEvent>> {
        let path = self.market_path(market_id);
        if fs::metadata(&path).await.is_err() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut events = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SettlementEvent>(line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(
                        file = %path.display(),
                        error = %e,
                        "Skipping malformed settlement event"
                    );
                }
            }
        }

        events.sort_by_key(|e| e.at);
        info!(market_id, count = events.len(), "Loaded settlement events");
        Ok(events)
    }

    async fn is_healthy(&self) -> bool {
        fs::metadata(&self.events_dir).await.is_ok()
    }
}
