//! Fanpool Settlement Engine — Library Root
//!
//! Optimistic settlement engine for creator-token prediction markets:
//! multi-option bets in a creator-specific fungible balance, a challenge
//! window after the creator declares an outcome, auto-confirmation when
//! undisputed, and proportional payout of the combined pool. The outer
//! web/API layer consumes this crate; the token ledger and profile
//! storage are reached through ports.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
