//! Market Book - Shared In-Memory Settlement State
//!
//! One entry per market, each behind its own `tokio::sync::Mutex`: the
//! single-writer discipline that makes every mutating operation an
//! atomic check-and-set. Markets are independent concurrency domains:
//! the outer map is only locked long enough to hand out an entry handle.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock};

use crate::domain::market::{AccountId, Bet, Market, MarketId};
use crate::domain::EngineError;

/// A market plus its bet records, locked as one unit.
#[derive(Debug)]
pub struct MarketEntry {
  /// The market itself.
  pub market: Market,
  /// Bets keyed by `(bettor, option_index)`; repeat stakes merge.
  pub bets: BTreeMap<(AccountId, usize), Bet>,
}

impl MarketEntry {
  /// Wrap a freshly created market with an empty bet book.
  pub fn new(market: Market) -> Self {
    Self {
      market,
      bets: BTreeMap::new(),
    }
  }

  /// A bettor's bets on this market, in option order.
  pub fn user_bets(&self, bettor: &AccountId) -> Vec<Bet> {
    self
      .bets
      .range((bettor.clone(), 0)..=(bettor.clone(), usize::MAX))
      .map(|(_, bet)| bet.clone())
      .collect()
  }

  /// The bettor's stake record on one option, if any.
  pub fn bet(&self, bettor: &AccountId, option_index: usize) -> Option<&Bet> {
    self.bets.get(&(bettor.clone(), option_index))
  }
}

/// Registry of live market entries with monotonic id assignment.
pub struct MarketBook {
  markets: RwLock<HashMap<MarketId, Arc<Mutex<MarketEntry>>>>,
  next_id: AtomicU64,
}

impl MarketBook {
  /// Create an empty book; ids start at 1.
  pub fn new() -> Self {
    Self {
      markets: RwLock::new(HashMap::new()),
      next_id: AtomicU64::new(1),
    }
  }

  /// Allocate the next id, build the market, and register it.
  ///
  /// The build closure may reject (e.g. bad option count); the id is
  /// still consumed; ids are monotonic, not dense.
  pub async fn insert_with(
    &self,
    build: impl FnOnce(MarketId) -> Result<Market, EngineError>,
  ) -> Result<Market, EngineError> {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let market = build(id)?;
    let snapshot = market.clone();
    self
      .markets
      .write()
      .await
      .insert(id, Arc::new(Mutex::new(MarketEntry::new(market))));
    Ok(snapshot)
  }

  /// Handle to a market's entry, for locking.
  pub async fn entry(&self, id: MarketId) -> Result<Arc<Mutex<MarketEntry>>, EngineError> {
    self
      .markets
      .read()
      .await
      .get(&id)
      .cloned()
      .ok_or(EngineError::MarketNotFound(id))
  }

  /// All registered market ids, ascending.
  pub async fn ids(&self) -> Vec<MarketId> {
    let mut ids: Vec<MarketId> = self.markets.read().await.keys().copied().collect();
    ids.sort_unstable();
    ids
  }
}

impl Default for MarketBook {
  fn default() -> Self {
    Self::new()
  }
}
