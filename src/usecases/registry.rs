//! Market Registry - Market Lifecycle Ownership
//!
//! Creates markets, assigns their ids, and serves snapshot reads. The
//! registry never mutates a live market after creation (that is the
//! settlement desk's job), so its reads are plain clones taken under a
//! brief lock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::market::{AccountId, AssetId, Market, MarketId, StatusKind};
use crate::domain::EngineError;
use crate::ports::clock::Clock;
use crate::ports::profiles::{CreatorProfile, MarketMedia, ProfileDirectory};
use crate::ports::repository::EventKind;

use super::audit::AuditLog;
use super::book::MarketBook;

/// Request to create a market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMarket {
  /// Account creating (and later resolving) the market.
  pub creator: AccountId,
  /// External ledger asset bets are denominated in.
  pub stake_asset: AssetId,
  /// Title text.
  pub title: String,
  /// Description text.
  pub description: String,
  /// Outcome descriptions, 2–10 entries, order is identity.
  pub options: Vec<String>,
  /// Betting deadline; `None` means no time limit.
  pub closes_at: Option<DateTime<Utc>>,
}

/// Market snapshot joined with presentation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSummary {
  /// The market snapshot.
  pub market: Market,
  /// Creator display profile, when the directory has one.
  pub creator_profile: Option<CreatorProfile>,
  /// Thumbnail/tags, when any were attached.
  pub media: Option<MarketMedia>,
}

/// Market registry over the shared book.
pub struct MarketRegistry {
  book: Arc<MarketBook>,
  clock: Arc<dyn Clock>,
  audit: AuditLog,
  profiles: Option<Arc<dyn ProfileDirectory>>,
}

impl MarketRegistry {
  /// Create a registry without a profile directory.
  pub fn new(book: Arc<MarketBook>, clock: Arc<dyn Clock>, audit: AuditLog) -> Self {
    Self {
      book,
      clock,
      audit,
      profiles: None,
    }
  }

  /// Attach the profile/media directory used by [`Self::summary`].
  #[must_use]
  pub fn with_profiles(mut self, profiles: Arc<dyn ProfileDirectory>) -> Self {
    self.profiles = Some(profiles);
    self
  }

  /// Create a new Active market and return its snapshot.
  pub async fn create_market(&self, req: CreateMarket) -> Result<Market, EngineError> {
    let now = self.clock.now();
    let market = self
      .book
      .insert_with(|id| {
        Market::new(
          id,
          req.creator.clone(),
          req.stake_asset.clone(),
          req.title.clone(),
          req.description.clone(),
          req.options.clone(),
          req.closes_at,
          now,
        )
      })
      .await?;

    info!(
      market_id = market.id,
      creator = %market.creator,
      stake_asset = %market.stake_asset,
      options = market.options.len(),
      closes_at = ?market.closes_at,
      "Market created"
    );
    self
      .audit
      .emit(
        market.id,
        now,
        EventKind::MarketCreated {
          creator: market.creator.clone(),
          stake_asset: market.stake_asset.clone(),
          option_count: market.options.len(),
        },
      )
      .await;

    Ok(market)
  }

  /// Snapshot of one market.
  pub async fn market(&self, id: MarketId) -> Result<Market, EngineError> {
    let entry = self.book.entry(id).await?;
    let guard = entry.lock().await;
    Ok(guard.market.clone())
  }

  /// Snapshots of all markets, id-ascending.
  pub async fn list(&self) -> Vec<Market> {
    let mut markets = Vec::new();
    for id in self.book.ids().await {
      if let Ok(entry) = self.book.entry(id).await {
        markets.push(entry.lock().await.market.clone());
      }
    }
    markets
  }

  /// Snapshots of all markets currently in the given status.
  pub async fn list_by_status(&self, kind: StatusKind) -> Vec<Market> {
    self
      .list()
      .await
      .into_iter()
      .filter(|m| m.status_kind() == kind)
      .collect()
  }

  /// Market snapshot joined with creator profile and media.
  ///
  /// Directory lookups are presentation-only: a failure is logged and
  /// surfaces as `None`, never as a settlement error.
  pub async fn summary(&self, id: MarketId) -> Result<MarketSummary, EngineError> {
    let market = self.market(id).await?;

    let (creator_profile, media) = match &self.profiles {
      Some(directory) => {
        let profile = match directory.creator_profile(&market.creator).await {
          Ok(profile) => profile,
          Err(e) => {
            warn!(market_id = id, error = %e, "Creator profile lookup failed");
            None
          }
        };
        let media = match directory.market_media(id).await {
          Ok(media) => media,
          Err(e) => {
            warn!(market_id = id, error = %e, "Market media lookup failed");
            None
          }
        };
        (profile, media)
      }
      None => (None, None),
    };

    Ok(MarketSummary {
      market,
      creator_profile,
      media,
    })
  }
}
