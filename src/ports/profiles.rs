//! Profile Port - Presentation Metadata Lookup
//!
//! Read-only view into the product's profile and media storage: creator
//! display data and market thumbnails/tags. Never required for
//! settlement correctness (a lookup failure degrades a summary view,
//! nothing else), so these methods return `anyhow::Result` rather than
//! the typed settlement taxonomy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::market::{AccountId, MarketId};

/// Display metadata for a market creator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorProfile {
  /// Ledger account the profile belongs to.
  pub account: AccountId,
  /// Public display name.
  pub display_name: String,
  /// Avatar image URL, if the creator uploaded one.
  pub avatar_url: Option<String>,
}

/// Presentation media attached to a market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMedia {
  /// Thumbnail image URL.
  pub thumbnail_url: Option<String>,
  /// Free-form tags for discovery.
  pub tags: Vec<String>,
}

/// Trait for the external profile/media store.
#[async_trait]
pub trait ProfileDirectory: Send + Sync + 'static {
  /// Display profile for an account, if one exists.
  async fn creator_profile(
    &self,
    account: &AccountId,
  ) -> anyhow::Result<Option<CreatorProfile>>;

  /// Presentation media for a market, if any was attached.
  async fn market_media(&self, market_id: MarketId) -> anyhow::Result<Option<MarketMedia>>;
}
