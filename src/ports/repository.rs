//! Repository Port - Audit Trail Persistence Interface
//!
//! Defines the trait for persisting settlement events using JSONL files.
//! No database dependency - lightweight append-only log format
//! optimized for audit trails and dispute forensics. The in-memory
//! market book is authoritative at runtime; the log is the durable
//! record of every money-moving effect.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::market::{AccountId, AssetId, MarketId, StatusKind};

/// One settlement-relevant effect, recorded as a single JSONL line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementEvent {
  /// Unique event id.
  pub id: Uuid,
  /// Market the event belongs to.
  pub market_id: MarketId,
  /// When the effect was applied (engine time, not wall-clock).
  pub at: DateTime<Utc>,
  /// What happened.
  pub kind: EventKind,
}

impl SettlementEvent {
  /// Build an event with a fresh id.
  pub fn new(market_id: MarketId, at: DateTime<Utc>, kind: EventKind) -> Self {
    Self {
      id: Uuid::new_v4(),
      market_id,
      at,
      kind,
    }
  }
}

/// Settlement effect taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
  /// A market was created.
  MarketCreated {
    creator: AccountId,
    stake_asset: AssetId,
    option_count: usize,
  },
  /// Stake was pulled into escrow.
  BetPlaced {
    bettor: AccountId,
    asset: AssetId,
    option_index: usize,
    amount: Decimal,
  },
  /// The market moved between lifecycle phases (manual or deadline-driven).
  StatusChanged {
    from: StatusKind,
    to: StatusKind,
  },
  /// A fraud report was filed during the challenge window.
  FraudReported {
    reporter: AccountId,
    report_count: u32,
  },
  /// Winnings were paid out of escrow.
  WinningsClaimed {
    bettor: AccountId,
    asset: AssetId,
    amount: Decimal,
  },
  /// A stake was refunded out of escrow (cancel or overturned outcome).
  StakeRefunded {
    bettor: AccountId,
    asset: AssetId,
    amount: Decimal,
  },
}

/// Synchronous observer notified of every emitted event.
///
/// Implemented by the metrics adapter; observation must be cheap and
/// infallible (a counter bump, not IO).
pub trait EventObserver: Send + Sync + 'static {
  /// Observe one event.
  fn observe(&self, event: &SettlementEvent);
}

/// Trait for audit-trail persistence providers.
///
/// Uses JSONL (JSON Lines) format for append-only logging. Each line is
/// a self-contained JSON record, making it easy to parse, stream, and
/// recover from partial writes.
#[async_trait]
pub trait EventRepository: Send + Sync + 'static {
  /// Append one event to the log.
  async fn append(&self, event: &SettlementEvent) -> anyhow::Result<()>;

  /// Load all recorded events for a market, oldest first.
  async fn load_for_market(
    &self,
    market_id: MarketId,
  ) -> anyhow::Result<Vec<SettlementEvent>>;

  /// Check if the repository is healthy (disk space, permissions).
  async fn is_healthy(&self) -> bool;
}
