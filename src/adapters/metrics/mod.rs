//! Prometheus Metrics Registry - Settlement Observability
//!
//! Registers the engine's Prometheus metrics and keeps them current by
//! observing the audit event stream. The embedding application owns
//! exposition; this crate hands out the registry, it serves nothing.

use prometheus::{CounterVec, IntCounter, IntCounterVec, Opts, Registry};
use rust_decimal::prelude::ToPrimitive;

use crate::ports::repository::{EventKind, EventObserver, SettlementEvent};

/// Centralized Prometheus metrics for the settlement engine.
///
/// All metrics follow the naming convention `fanpool_engine_*` and
/// money-volume metrics carry the stake asset as a label.
pub struct EngineMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Total markets created.
    pub markets_created: IntCounter,
    /// Total bets placed, by stake asset.
    pub bets_placed: IntCounterVec,
    /// Total stake pulled into escrow, by stake asset.
    pub stake_volume: CounterVec,
    /// Status transitions applied, by destination status.
    pub status_transitions: IntCounterVec,
    /// Total fraud reports filed.
    pub fraud_reports: IntCounter,
    /// Total claims paid, by stake asset.
    pub claims_paid: IntCounterVec,
    /// Total winnings paid out of escrow, by stake asset.
    pub payout_volume: CounterVec,
    /// Total stakes refunded, by stake asset.
    pub refund_volume: CounterVec,
}

impl EngineMetrics {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let markets_created = IntCounter::with_opts(Opts::new(
            "fanpool_engine_markets_created_total",
            "Total markets created",
        ))?;

        let bets_placed = IntCounterVec::new(
            Opts::new("fanpool_engine_bets_placed_total", "Total bets placed"),
            &["asset"],
        )?;

        let stake_volume = CounterVec::new(
            Opts::new(
                "fanpool_engine_stake_volume",
                "Total stake pulled into market escrow",
            ),
            &["asset"],
        )?;

        let status_transitions = IntCounterVec::new(
            Opts::new(
                "fanpool_engine_status_transitions_total",
                "Market status transitions applied",
            ),
            &["to"],
        )?;

        let fraud_reports = IntCounter::with_opts(Opts::new(
            "fanpool_engine_fraud_reports_total",
            "Total fraud reports filed",
        ))?;

        let claims_paid = IntCounterVec::new(
            Opts::new("fanpool_engine_claims_paid_total", "Total claims paid"),
            &["asset"],
        )?;

        let payout_volume = CounterVec::new(
            Opts::new(
                "fanpool_engine_payout_volume",
                "Total winnings paid out of market escrow",
            ),
            &["asset"],
        )?;

        let refund_volume = CounterVec::new(
            Opts::new(
                "fanpool_engine_refund_volume",
                "Total stakes refunded out of market escrow",
            ),
            &["asset"],
        )?;

        registry.register(Box::new(markets_created.clone()))?;
        registry.register(Box::new(bets_placed.clone()))?;
        registry.register(Box::new(stake_volume.clone()))?;
        registry.register(Box::new(status_transitions.clone()))?;
        registry.register(Box::new(fraud_reports.clone()))?;
        registry.register(Box::new(claims_paid.clone()))?;
        registry.register(Box::new(payout_volume.clone()))?;
        registry.register(Box::new(refund_volume.clone()))?;

        Ok(Self {
            registry,
            markets_created,
            bets_placed,
            stake_volume,
            status_transitions,
            fraud_reports,
            claims_paid,
            payout_volume,
            refund_volume,
        })
    }

    /// The registry the embedding application exposes.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl EventObserver for EngineMetrics {
    fn observe(&self, event: &SettlementEvent) {
        match &event.kind {
            EventKind::MarketCreated { .. } => self.markets_created.inc(),
            EventKind::BetPlaced { asset, amount, .. } => {
                self.bets_placed.with_label_values(&[asset.as_str()]).inc();
                self.stake_volume
                    .with_label_values(&[asset.as_str()])
                    .inc_by(amount.to_f64().unwrap_or(0.0));
            }
            EventKind::StatusChanged { to, .. } => {
                self.status_transitions
                    .with_label_values(&[to.to_string().as_str()])
                    .inc();
            }
            EventKind::FraudReported { .. } => self.fraud_reports.inc(),
            EventKind::WinningsClaimed { asset, amount, .. } => {
                self.claims_paid.with_label_values(&[asset.as_str()]).inc();
                self.payout_volume
                    .with_label_values(&[asset.as_str()])
                    .inc_by(amount.to_f64().unwrap_or(0.0));
            }
            EventKind::StakeRefunded { asset, amount, .. } => {
                self.refund_volume
                    .with_label_values(&[asset.as_str()])
                    .inc_by(amount.to_f64().unwrap_or(0.0));
            }
        }
    }
}
