//! In-Memory Ledger - Dev/Test Implementation of the Ledger Port
//!
//! A minimal fungible-balance store with the same observable semantics
//! as the production token service: per-asset balances, owner→spender
//! allowances that deplete as they are spent, and typed rejections.
//! Used by integration tests and local runs; never by production wiring.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::domain::market::{AccountId, AssetId};
use crate::ports::ledger::{LedgerAdapter, LedgerError};

#[derive(Default)]
struct LedgerState {
    /// Registered assets and their decimal precision.
    assets: HashMap<AssetId, u32>,
    /// Balance per (asset, account).
    balances: HashMap<(AssetId, AccountId), Decimal>,
    /// Remaining allowance per (asset, owner, spender).
    allowances: HashMap<(AssetId, AccountId, AccountId), Decimal>,
}

/// In-memory fungible-balance store.
#[derive(Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Create an empty ledger with no registered assets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset and its decimal precision.
    pub async fn register_asset(&self, asset: &AssetId, decimals: u32) {
        self.state.write().await.assets.insert(asset.clone(), decimals);
    }

    /// Credit an account out of thin air (test setup).
    pub async fn mint(
        &self,
        asset: &AssetId,
        account: &AccountId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        if !state.assets.contains_key(asset) {
            return Err(LedgerError::UnknownAsset(asset.clone()));
        }
        *state
            .balances
            .entry((asset.clone(), account.clone()))
            .or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    /// Set the allowance `owner` grants to `spender`.
    pub async fn approve(
        &self,
        asset: &AssetId,
        owner: &AccountId,
        spender: &AccountId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        if !state.assets.contains_key(asset) {
            return Err(LedgerError::UnknownAsset(asset.clone()));
        }
        state
            .allowances
            .insert((asset.clone(), owner.clone(), spender.clone()), amount);
        Ok(())
    }
}

#[async_trait]
impl LedgerAdapter for InMemoryLedger {
    async fn balance_of(
        &self,
        asset: &AssetId,
        account: &AccountId,
    ) -> Result<Decimal, LedgerError> {
        let state = self.state.read().await;
        if !state.assets.contains_key(asset) {
            return Err(LedgerError::UnknownAsset(asset.clone()));
        }
        Ok(state
            .balances
            .get(&(asset.clone(), account.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    async fn allowance(
        &self,
        asset: &AssetId,
        owner: &AccountId,
        spender: &AccountId,
    ) -> Result<Decimal, LedgerError> {
        let state = self.state.read().await;
        if !state.assets.contains_key(asset) {
            return Err(LedgerError::UnknownAsset(asset.clone()));
        }
        Ok(state
            .allowances
            .get(&(asset.clone(), owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    async fn transfer_from(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        if !state.assets.contains_key(asset) {
            return Err(LedgerError::UnknownAsset(asset.clone()));
        }

        let allowance_key = (asset.clone(), from.clone(), to.clone());
        let allowance = state
            .allowances
            .get(&allowance_key)
            .copied()
            .unwrap_or(Decimal::ZERO);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance);
        }

        let from_key = (asset.clone(), from.clone());
        let balance = state.balances.get(&from_key).copied().unwrap_or(Decimal::ZERO);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }

        state.allowances.insert(allowance_key, allowance - amount);
        state.balances.insert(from_key, balance - amount);
        *state
            .balances
            .entry((asset.clone(), to.clone()))
            .or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    async fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        if !state.assets.contains_key(asset) {
            return Err(LedgerError::UnknownAsset(asset.clone()));
        }

        let from_key = (asset.clone(), from.clone());
        let balance = state.balances.get(&from_key).copied().unwrap_or(Decimal::ZERO);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }

        state.balances.insert(from_key, balance - amount);
        *state
            .balances
            .entry((asset.clone(), to.clone()))
            .or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    async fn decimals(&self, asset: &AssetId) -> Result<u32, LedgerError> {
        self.state
            .read()
            .await
            .assets
            .get(asset)
            .copied()
            .ok_or_else(|| LedgerError::UnknownAsset(asset.clone()))
    }
}
