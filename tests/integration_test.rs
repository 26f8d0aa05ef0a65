//! Integration Tests - End-to-end Settlement Flows
//!
//! Exercises the desks together over the in-memory ledger and a manual
//! clock, so every deadline is driven by the test instead of wall time.
//! Uses mockall for ledger-failure injection and tokio::test for async.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockall::mock;
use mockall::Sequence;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use fanpool_settlement::adapters::ledger::InMemoryLedger;
use fanpool_settlement::config::SettlementParams;
use fanpool_settlement::domain::lifecycle::ArbitrationVerdict;
use fanpool_settlement::domain::market::{AccountId, AssetId, Bet, MarketStatus, StatusKind};
use fanpool_settlement::domain::EngineError;
use fanpool_settlement::ports::clock::Clock;
use fanpool_settlement::ports::ledger::{LedgerAdapter, LedgerError};
use fanpool_settlement::usecases::registry::CreateMarket;
use fanpool_settlement::usecases::{
    AuditLog, BetDesk, ClaimDesk, DisputeDesk, MarketBook, MarketRegistry, SettlementDesk,
};

const ASSET: &str = "token:river";
const CREATOR: &str = "river";
const ADMIN: &str = "ops:fanpool";
const COOLDOWN_SECS: i64 = 3600;

// ---- Test Clock ----

/// Manually driven clock shared by every desk in a test.
struct ManualClock(StdMutex<DateTime<Utc>>);

impl ManualClock {
    fn starting_at(t: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(StdMutex::new(t)))
    }

    fn set(&self, t: DateTime<Utc>) {
        *self.0.lock().unwrap() = t;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

// ---- Mock Definitions ----

mock! {
    pub Ledger {}

    #[async_trait::async_trait]
    impl LedgerAdapter for Ledger {
        async fn balance_of(
            &self,
            asset: &AssetId,
            account: &AccountId,
        ) -> Result<Decimal, LedgerError>;

        async fn allowance(
            &self,
            asset: &AssetId,
            owner: &AccountId,
            spender: &AccountId,
        ) -> Result<Decimal, LedgerError>;

        async fn transfer_from(
            &self,
            asset: &AssetId,
            from: &AccountId,
            to: &AccountId,
            amount: Decimal,
        ) -> Result<(), LedgerError>;

        async fn transfer(
            &self,
            asset: &AssetId,
            from: &AccountId,
            to: &AccountId,
            amount: Decimal,
        ) -> Result<(), LedgerError>;

        async fn decimals(&self, asset: &AssetId) -> Result<u32, LedgerError>;
    }
}

// ---- Harness ----

struct Harness {
    clock: Arc<ManualClock>,
    ledger: Arc<InMemoryLedger>,
    registry: MarketRegistry,
    bets: BetDesk<InMemoryLedger>,
    settlement: SettlementDesk<InMemoryLedger>,
    disputes: DisputeDesk,
    claims: ClaimDesk<InMemoryLedger>,
}

fn params() -> SettlementParams {
    SettlementParams {
        cooldown: Duration::seconds(COOLDOWN_SECS),
        dispute_threshold: 3,
    }
}

/// Route engine logs through the test harness when RUST_LOG is set.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn harness() -> Harness {
    init_tracing();
    let book = Arc::new(MarketBook::new());
    let clock = ManualClock::starting_at(t0());
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.register_asset(&ASSET.to_string(), 2).await;
    let audit = AuditLog::disabled();

    Harness {
        registry: MarketRegistry::new(
            Arc::clone(&book),
            clock.clone(),
            audit.clone(),
        ),
        bets: BetDesk::new(
            Arc::clone(&book),
            Arc::clone(&ledger),
            clock.clone(),
            audit.clone(),
            params(),
        ),
        settlement: SettlementDesk::new(
            Arc::clone(&book),
            Arc::clone(&ledger),
            clock.clone(),
            audit.clone(),
            params(),
            ADMIN.to_string(),
        ),
        disputes: DisputeDesk::new(
            Arc::clone(&book),
            clock.clone(),
            audit.clone(),
            params(),
        ),
        claims: ClaimDesk::new(
            Arc::clone(&book),
            Arc::clone(&ledger),
            clock.clone(),
            audit.clone(),
            params(),
        ),
        clock,
        ledger,
    }
}

impl Harness {
    async fn create_yes_no_market(&self, closes_at: Option<DateTime<Utc>>) -> u64 {
        self.registry
            .create_market(CreateMarket {
                creator: CREATOR.to_string(),
                stake_asset: ASSET.to_string(),
                title: "Will the tour sell out?".to_string(),
                description: String::new(),
                options: vec!["Yes".to_string(), "No".to_string()],
                closes_at,
            })
            .await
            .unwrap()
            .id
    }

    /// Mint and approve enough for `account` to stake into `market_id`.
    async fn fund(&self, market_id: u64, account: &str, amount: Decimal) {
        let escrow = format!("escrow:market:{market_id}");
        self.ledger
            .mint(&ASSET.to_string(), &account.to_string(), amount)
            .await
            .unwrap();
        self.ledger
            .approve(&ASSET.to_string(), &account.to_string(), &escrow, amount)
            .await
            .unwrap();
    }

    async fn stake(&self, market_id: u64, account: &str, option: usize, amount: Decimal) -> Bet {
        self.fund(market_id, account, amount).await;
        self.bets
            .place_bet(market_id, &account.to_string(), option, amount)
            .await
            .unwrap()
    }

    async fn balance(&self, account: &str) -> Decimal {
        self.ledger
            .balance_of(&ASSET.to_string(), &account.to_string())
            .await
            .unwrap()
    }

    /// Close manually, declare `winner`, and let the cooldown elapse.
    async fn resolve_and_confirm(&self, market_id: u64, winner: usize) {
        self.settlement
            .close_market(market_id, &CREATOR.to_string())
            .await
            .unwrap();
        self.settlement
            .declare_winner(market_id, &CREATOR.to_string(), winner)
            .await
            .unwrap();
        self.clock.set(t0() + Duration::seconds(COOLDOWN_SECS));
        assert_eq!(
            self.settlement.settle_if_due(market_id).await.unwrap(),
            StatusKind::Confirmed
        );
    }
}

// ---- Settlement Scenarios ----

#[tokio::test]
async fn test_single_winner_takes_the_whole_pool() {
    // X stakes 100 on "Yes", Y stakes 300 on "No"; "Yes" wins untouched.
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(100)).await;
    h.stake(market_id, "bettor-y", 1, dec!(300)).await;

    h.resolve_and_confirm(market_id, 0).await;

    assert_eq!(
        h.claims.claimable(market_id, &"bettor-x".to_string()).await.unwrap(),
        dec!(400)
    );
    assert_eq!(
        h.claims.claimable(market_id, &"bettor-y".to_string()).await.unwrap(),
        Decimal::ZERO
    );

    let paid = h
        .claims
        .claim_winnings(market_id, &"bettor-x".to_string())
        .await
        .unwrap();
    assert_eq!(paid, dec!(400));
    assert_eq!(h.balance("bettor-x").await, dec!(400));

    assert_eq!(
        h.claims
            .claim_winnings(market_id, &"bettor-y".to_string())
            .await
            .unwrap_err(),
        EngineError::NothingToClaim
    );
}

#[tokio::test]
async fn test_split_winners_conserve_the_pool() {
    // W = 400 (X: 100, Z: 300), losing pool 200, total 600.
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(100)).await;
    h.stake(market_id, "bettor-z", 0, dec!(300)).await;
    h.stake(market_id, "bettor-y", 1, dec!(200)).await;

    h.resolve_and_confirm(market_id, 0).await;

    let x = h
        .claims
        .claim_winnings(market_id, &"bettor-x".to_string())
        .await
        .unwrap();
    let z = h
        .claims
        .claim_winnings(market_id, &"bettor-z".to_string())
        .await
        .unwrap();
    assert_eq!(x, dec!(150));
    assert_eq!(z, dec!(450));
    assert_eq!(x + z, dec!(600));

    // Exact conservation: escrow fully drained.
    assert_eq!(h.balance(&format!("escrow:market:{market_id}")).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_report_threshold_blocks_auto_confirmation() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(50)).await;

    h.settlement.close_market(market_id, &CREATOR.to_string()).await.unwrap();
    h.settlement
        .declare_winner(market_id, &CREATOR.to_string(), 0)
        .await
        .unwrap();

    for reporter in ["r1", "r2", "r3"] {
        h.disputes
            .report_fraud(market_id, &reporter.to_string())
            .await
            .unwrap();
    }
    let market = h.registry.market(market_id).await.unwrap();
    assert_eq!(market.status_kind(), StatusKind::UnderReview);

    // The elapsed deadline must NOT confirm a market under review.
    h.clock.set(t0() + Duration::seconds(COOLDOWN_SECS * 2));
    assert_eq!(
        h.settlement.settle_if_due(market_id).await.unwrap(),
        StatusKind::UnderReview
    );
}

#[tokio::test]
async fn test_non_positive_stakes_always_rejected() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;

    for amount in [Decimal::ZERO, dec!(-5)] {
        assert_eq!(
            h.bets
                .place_bet(market_id, &"bettor-x".to_string(), 0, amount)
                .await
                .unwrap_err(),
            EngineError::InvalidAmount
        );
    }

    // Still rejected with validation, not status, after the market closes.
    h.settlement.close_market(market_id, &CREATOR.to_string()).await.unwrap();
    assert_eq!(
        h.bets
            .place_bet(market_id, &"bettor-x".to_string(), 0, Decimal::ZERO)
            .await
            .unwrap_err(),
        EngineError::InvalidAmount
    );
}

// ---- Lazy Expiry ----

#[tokio::test]
async fn test_no_bets_after_deadline() {
    let h = harness().await;
    let closes_at = t0() + Duration::seconds(600);
    let market_id = h.create_yes_no_market(Some(closes_at)).await;
    h.stake(market_id, "bettor-x", 0, dec!(10)).await;

    h.clock.set(closes_at);
    h.fund(market_id, "bettor-y", dec!(10)).await;
    assert_eq!(
        h.bets
            .place_bet(market_id, &"bettor-y".to_string(), 1, dec!(10))
            .await
            .unwrap_err(),
        EngineError::MarketClosed
    );

    // The rejected bet is what lazily applied the close.
    let market = h.registry.market(market_id).await.unwrap();
    assert_eq!(market.status, MarketStatus::Closed);
    assert_eq!(market.total_pool, dec!(10));
}

#[tokio::test]
async fn test_settle_if_due_is_idempotent() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(25)).await;

    h.settlement.close_market(market_id, &CREATOR.to_string()).await.unwrap();
    h.settlement
        .declare_winner(market_id, &CREATOR.to_string(), 0)
        .await
        .unwrap();
    h.clock.set(t0() + Duration::seconds(COOLDOWN_SECS + 5));

    let first = h.settlement.settle_if_due(market_id).await.unwrap();
    let snapshot = h.registry.market(market_id).await.unwrap();

    // Later invocations change nothing, including resolved_at.
    h.clock.set(t0() + Duration::seconds(COOLDOWN_SECS + 500));
    for _ in 0..3 {
        assert_eq!(h.settlement.settle_if_due(market_id).await.unwrap(), first);
    }
    assert_eq!(h.registry.market(market_id).await.unwrap(), snapshot);
}

#[tokio::test]
async fn test_late_report_fails_even_before_auto_confirm_ran() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;

    h.settlement.close_market(market_id, &CREATOR.to_string()).await.unwrap();
    h.settlement
        .declare_winner(market_id, &CREATOR.to_string(), 1)
        .await
        .unwrap();

    // Window elapses with no settle_if_due call in between.
    h.clock.set(t0() + Duration::seconds(COOLDOWN_SECS));
    assert_eq!(
        h.disputes
            .report_fraud(market_id, &"r1".to_string())
            .await
            .unwrap_err(),
        EngineError::WindowClosed
    );
}

// ---- Bets ----

#[tokio::test]
async fn test_repeat_stakes_merge_into_one_record() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;

    h.stake(market_id, "bettor-x", 0, dec!(10)).await;
    let merged = h.stake(market_id, "bettor-x", 0, dec!(15)).await;
    assert_eq!(merged.amount, dec!(25));

    let bets = h
        .bets
        .user_bets(market_id, &"bettor-x".to_string())
        .await
        .unwrap();
    assert_eq!(bets.len(), 1);

    let market = h.registry.market(market_id).await.unwrap();
    assert_eq!(market.options[0].total_bettors, 1);
    assert_eq!(market.options[0].total_amount, dec!(25));
    assert_eq!(market.total_pool, dec!(25));
}

#[tokio::test]
async fn test_distinct_bettors_counted_per_option() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;

    h.stake(market_id, "bettor-x", 0, dec!(10)).await;
    h.stake(market_id, "bettor-y", 0, dec!(20)).await;
    h.stake(market_id, "bettor-x", 1, dec!(5)).await;

    let market = h.registry.market(market_id).await.unwrap();
    assert_eq!(market.options[0].total_bettors, 2);
    assert_eq!(market.options[1].total_bettors, 1);
    assert_eq!(market.total_pool, dec!(35));
}

#[tokio::test]
async fn test_bet_requires_allowance_and_balance() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;

    h.ledger
        .mint(&ASSET.to_string(), &"bettor-x".to_string(), dec!(100))
        .await
        .unwrap();
    assert_eq!(
        h.bets
            .place_bet(market_id, &"bettor-x".to_string(), 0, dec!(50))
            .await
            .unwrap_err(),
        EngineError::InsufficientAllowance
    );

    let escrow = format!("escrow:market:{market_id}");
    h.ledger
        .approve(&ASSET.to_string(), &"bettor-x".to_string(), &escrow, dec!(500))
        .await
        .unwrap();
    assert_eq!(
        h.bets
            .place_bet(market_id, &"bettor-x".to_string(), 0, dec!(200))
            .await
            .unwrap_err(),
        EngineError::InsufficientBalance
    );

    // A rejected bet leaves no trace in the pool.
    let market = h.registry.market(market_id).await.unwrap();
    assert_eq!(market.total_pool, Decimal::ZERO);
    assert!(h
        .bets
        .user_bets(market_id, &"bettor-x".to_string())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_concurrent_bets_all_land_in_the_pool() {
    let h = Arc::new(harness().await);
    let market_id = h.create_yes_no_market(None).await;

    for i in 0..10 {
        h.fund(market_id, &format!("bettor-{i}"), dec!(10)).await;
    }

    let mut handles = Vec::new();
    for i in 0..10usize {
        let h = Arc::clone(&h);
        handles.push(tokio::spawn(async move {
            h.bets
                .place_bet(market_id, &format!("bettor-{i}"), i % 2, dec!(10))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let market = h.registry.market(market_id).await.unwrap();
    assert_eq!(market.total_pool, dec!(100));
    assert!(market.pool_balanced());
    assert_eq!(market.options[0].total_bettors + market.options[1].total_bettors, 10);
}

// ---- Claims ----

#[tokio::test]
async fn test_second_claim_fails_and_never_double_pays() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(100)).await;
    h.stake(market_id, "bettor-y", 1, dec!(300)).await;
    h.resolve_and_confirm(market_id, 0).await;

    let paid = h
        .claims
        .claim_winnings(market_id, &"bettor-x".to_string())
        .await
        .unwrap();
    assert_eq!(paid, dec!(400));
    assert_eq!(
        h.claims
            .claim_winnings(market_id, &"bettor-x".to_string())
            .await
            .unwrap_err(),
        EngineError::AlreadyClaimed
    );
    assert_eq!(h.balance("bettor-x").await, dec!(400));
}

#[tokio::test]
async fn test_concurrent_claims_pay_exactly_once() {
    let h = Arc::new(harness().await);
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(100)).await;
    h.stake(market_id, "bettor-y", 1, dec!(300)).await;
    h.resolve_and_confirm(market_id, 0).await;

    let a = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.claims.claim_winnings(market_id, &"bettor-x".to_string()).await })
    };
    let b = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.claims.claim_winnings(market_id, &"bettor-x".to_string()).await })
    };
    let results = [a.await.unwrap(), b.await.unwrap()];

    let paid: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(paid.len(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(EngineError::AlreadyClaimed))));
    assert_eq!(h.balance("bettor-x").await, dec!(400));
}

#[tokio::test]
async fn test_claim_before_confirmation_is_rejected() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(100)).await;

    assert_eq!(
        h.claims
            .claim_winnings(market_id, &"bettor-x".to_string())
            .await
            .unwrap_err(),
        EngineError::InvalidTransition { from: StatusKind::Active, action: "claim from" }
    );
}

#[tokio::test]
async fn test_claim_against_elapsed_cooldown_confirms_then_pays() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(100)).await;
    h.stake(market_id, "bettor-y", 1, dec!(50)).await;

    h.settlement.close_market(market_id, &CREATOR.to_string()).await.unwrap();
    h.settlement
        .declare_winner(market_id, &CREATOR.to_string(), 0)
        .await
        .unwrap();

    // No settle_if_due call: the claim itself applies the confirmation.
    h.clock.set(t0() + Duration::seconds(COOLDOWN_SECS + 1));
    let paid = h
        .claims
        .claim_winnings(market_id, &"bettor-x".to_string())
        .await
        .unwrap();
    assert_eq!(paid, dec!(150));
    assert_eq!(
        h.registry.market(market_id).await.unwrap().status_kind(),
        StatusKind::Confirmed
    );
}

#[tokio::test]
async fn test_rejected_credit_rolls_the_claim_back() {
    // Mock ledger: the first payout credit is rejected, the second lands.
    let book = Arc::new(MarketBook::new());
    let clock = ManualClock::starting_at(t0());
    let audit = AuditLog::disabled();

    let mut ledger = MockLedger::new();
    let mut seq = Sequence::new();
    ledger.expect_decimals().returning(|_| Ok(2));
    ledger
        .expect_transfer()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _, _| Err(LedgerError::Rejected("ledger offline".to_string())));
    ledger
        .expect_transfer()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _, _| Ok(()));

    // Seed a confirmed market with one winning bet directly.
    let market = book
        .insert_with(|id| {
            fanpool_settlement::domain::market::Market::new(
                id,
                CREATOR.to_string(),
                ASSET.to_string(),
                "seeded".to_string(),
                String::new(),
                vec!["Yes".to_string(), "No".to_string()],
                None,
                t0(),
            )
        })
        .await
        .unwrap();
    {
        let entry = book.entry(market.id).await.unwrap();
        let mut guard = entry.lock().await;
        guard.market.options[0].total_amount = dec!(100);
        guard.market.options[0].total_bettors = 1;
        guard.market.total_pool = dec!(100);
        guard.market.status = MarketStatus::Confirmed { winning_option: 0, resolved_at: t0() };
        guard.bets.insert(
            ("bettor-x".to_string(), 0),
            Bet {
                bettor: "bettor-x".to_string(),
                option_index: 0,
                amount: dec!(100),
                claimed: false,
            },
        );
    }

    let claims = ClaimDesk::new(Arc::clone(&book), Arc::new(ledger), clock, audit, params());

    let err = claims
        .claim_winnings(market.id, &"bettor-x".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::LedgerRejected(_)));

    // The latch rolled back, so the retry pays.
    {
        let entry = book.entry(market.id).await.unwrap();
        let guard = entry.lock().await;
        assert!(!guard.bet(&"bettor-x".to_string(), 0).unwrap().claimed);
    }
    let paid = claims
        .claim_winnings(market.id, &"bettor-x".to_string())
        .await
        .unwrap();
    assert_eq!(paid, dec!(100));
}

// ---- Authorization & Lifecycle ----

#[tokio::test]
async fn test_declare_winner_guards() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.settlement.close_market(market_id, &CREATOR.to_string()).await.unwrap();

    assert_eq!(
        h.settlement
            .declare_winner(market_id, &"intruder".to_string(), 0)
            .await
            .unwrap_err(),
        EngineError::Unauthorized
    );
    assert_eq!(
        h.settlement
            .declare_winner(market_id, &CREATOR.to_string(), 7)
            .await
            .unwrap_err(),
        EngineError::OptionOutOfRange { index: 7, count: 2 }
    );
}

#[tokio::test]
async fn test_duplicate_reports_rejected() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.settlement.close_market(market_id, &CREATOR.to_string()).await.unwrap();
    h.settlement
        .declare_winner(market_id, &CREATOR.to_string(), 0)
        .await
        .unwrap();

    assert_eq!(h.disputes.report_fraud(market_id, &"r1".to_string()).await, Ok(1));
    assert_eq!(
        h.disputes
            .report_fraud(market_id, &"r1".to_string())
            .await
            .unwrap_err(),
        EngineError::DuplicateReport
    );
}

#[tokio::test]
async fn test_cancel_refunds_every_bettor_in_full() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(100)).await;
    h.stake(market_id, "bettor-y", 1, dec!(300)).await;

    assert_eq!(
        h.settlement
            .cancel_market(market_id, &"bettor-x".to_string())
            .await
            .unwrap_err(),
        EngineError::Unauthorized
    );

    let summary = h
        .settlement
        .cancel_market(market_id, &ADMIN.to_string())
        .await
        .unwrap();
    assert_eq!(summary.bets_refunded, 2);
    assert_eq!(summary.amount_refunded, dec!(400));
    assert_eq!(h.balance("bettor-x").await, dec!(100));
    assert_eq!(h.balance("bettor-y").await, dec!(300));
    assert_eq!(h.balance(&format!("escrow:market:{market_id}")).await, Decimal::ZERO);

    // Terminal: betting, reporting, and claiming all fail now.
    h.fund(market_id, "bettor-z", dec!(10)).await;
    assert_eq!(
        h.bets
            .place_bet(market_id, &"bettor-z".to_string(), 0, dec!(10))
            .await
            .unwrap_err(),
        EngineError::MarketInactive
    );
    assert_eq!(
        h.disputes
            .report_fraud(market_id, &"r1".to_string())
            .await
            .unwrap_err(),
        EngineError::MarketInactive
    );
    assert_eq!(
        h.claims
            .claim_winnings(market_id, &"bettor-x".to_string())
            .await
            .unwrap_err(),
        EngineError::MarketInactive
    );

    // A second cancel is a refund retry with nothing left to pay.
    let retry = h
        .settlement
        .cancel_market(market_id, &ADMIN.to_string())
        .await
        .unwrap();
    assert_eq!(retry.bets_refunded, 0);
}

#[tokio::test]
async fn test_arbitration_uphold_confirms_and_pays_winners() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(100)).await;
    h.stake(market_id, "bettor-y", 1, dec!(100)).await;

    h.settlement.close_market(market_id, &CREATOR.to_string()).await.unwrap();
    h.settlement
        .declare_winner(market_id, &CREATOR.to_string(), 0)
        .await
        .unwrap();
    for reporter in ["r1", "r2", "r3"] {
        h.disputes
            .report_fraud(market_id, &reporter.to_string())
            .await
            .unwrap();
    }

    assert_eq!(
        h.settlement
            .arbitrate(market_id, &CREATOR.to_string(), ArbitrationVerdict::Uphold)
            .await
            .unwrap_err(),
        EngineError::Unauthorized
    );
    assert_eq!(
        h.settlement
            .arbitrate(market_id, &ADMIN.to_string(), ArbitrationVerdict::Uphold)
            .await
            .unwrap(),
        StatusKind::Confirmed
    );
    assert_eq!(
        h.claims
            .claim_winnings(market_id, &"bettor-x".to_string())
            .await
            .unwrap(),
        dec!(200)
    );
}

#[tokio::test]
async fn test_arbitration_overturn_refunds_all_stakes() {
    let h = harness().await;
    let market_id = h.create_yes_no_market(None).await;
    h.stake(market_id, "bettor-x", 0, dec!(100)).await;
    h.stake(market_id, "bettor-y", 1, dec!(300)).await;

    h.settlement.close_market(market_id, &CREATOR.to_string()).await.unwrap();
    h.settlement
        .declare_winner(market_id, &CREATOR.to_string(), 0)
        .await
        .unwrap();
    for reporter in ["r1", "r2", "r3"] {
        h.disputes
            .report_fraud(market_id, &reporter.to_string())
            .await
            .unwrap();
    }

    assert_eq!(
        h.settlement
            .arbitrate(market_id, &ADMIN.to_string(), ArbitrationVerdict::Overturn)
            .await
            .unwrap(),
        StatusKind::Disputed
    );
    assert_eq!(h.balance("bettor-x").await, dec!(100));
    assert_eq!(h.balance("bettor-y").await, dec!(300));
}
