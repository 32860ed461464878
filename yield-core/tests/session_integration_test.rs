use std::sync::Arc;
use std::time::Duration;
use yield_api::model::round_to;
use yield_api::{Address, DepositStatus, ProtocolId, WalletConnector};
use yield_core::clock::ManualClock;
use yield_core::config::{EnvOverrides, SimulationConfig};
use yield_core::driver::SECONDS_PER_YEAR;
use yield_core::paper::{PaperChain, PaperWallet};
use yield_core::shared::lock;
use yield_core::{DepositError, DepositOutcome, Session};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn user() -> Address {
    Address::repeat_byte(0x42)
}

fn create_session(config: &SimulationConfig) -> (Session, Arc<PaperWallet>, Arc<ManualClock>) {
    let wallet = Arc::new(PaperWallet::new(user()));
    let chain = Arc::new(PaperChain::new(config.deposit.confirmation()));
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let session = Session::new(config, wallet.clone(), chain, clock.clone()).unwrap();
    (session, wallet, clock)
}

fn seeded_config() -> SimulationConfig {
    let mut config = SimulationConfig::load_from(None, EnvOverrides::default()).unwrap();
    config.simulation.seed = Some(11);
    config
}

// Full dashboard flow on virtual time:
// connect, deposit 100 USDC, let the strategy run, log out.
#[tokio::test(start_paused = true)]
async fn test_deposit_then_simulate_then_logout() {
    init_logger();
    let config = seeded_config();
    let (mut session, wallet, _) = create_session(&config);

    assert_eq!(
        session.deposit(100.0).await,
        Err(DepositError::NoExternalWallet)
    );

    assert_eq!(session.connect_wallet().await.unwrap(), user());
    let outcome = session.deposit(100.0).await.unwrap();
    assert!(matches!(outcome, DepositOutcome::Confirmed { amount, .. } if amount == 100.0));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.virtual_balance, 100.0);
    assert_eq!(snapshot.deposit_status, DepositStatus::Idle);
    assert_eq!(snapshot.external_address, Some(user()));
    assert_eq!(snapshot.positions[0].allocated_amount, 40.0);

    session.start().unwrap();
    tokio::time::sleep(Duration::from_millis(60_500)).await;

    let snapshot = session.snapshot();
    assert!(snapshot.total_earnings > 0.0);
    let total: f64 = snapshot.positions.iter().map(|p| p.allocation).sum();
    assert!((total - 100.0).abs() < 1e-9);
    assert!(snapshot.history.len() <= 10);
    for position in &snapshot.positions {
        assert!(position.apr >= 0.5 && position.apr <= 15.0);
    }

    session.logout().await.unwrap();
    assert!(!session.is_running());
    assert!(!wallet.is_connected());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.total_earnings, 0.0);
    assert!(snapshot.history.is_empty());
    assert_eq!(snapshot.external_address, None);
    assert_eq!(snapshot.virtual_balance, 100.0);
    let allocations: Vec<f64> = snapshot.positions.iter().map(|p| p.allocation).collect();
    assert_eq!(allocations, vec![40.0, 35.0, 25.0]);
}

#[tokio::test(start_paused = true)]
async fn test_earnings_follow_balance_and_weighted_apr() {
    init_logger();
    let mut config = seeded_config();
    // Freeze APRs and allocations.
    config.driver.apr_jitter_ms = 3_600_000;
    config.driver.rebalance_ms = 3_600_000;
    let (mut session, _, _) = create_session(&config);

    session.connect_wallet().await.unwrap();
    session.deposit(1_000_000.0).await.unwrap();
    session.start().unwrap();

    tokio::time::sleep(Duration::from_millis(10_500)).await;

    let per_tick = 1_000_000.0 * 4.285 / 100.0 / SECONDS_PER_YEAR;
    let mut expected = 0.0;
    for _ in 0..10 {
        expected = round_to(expected + per_tick, 6);
    }
    let earnings = session.snapshot().total_earnings;
    assert!(
        (earnings - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        earnings
    );
}

#[tokio::test(start_paused = true)]
async fn test_manual_rebalance_and_toggle_through_session() {
    init_logger();
    let mut config = seeded_config();
    config.driver.apr_jitter_ms = 3_600_000;
    let (mut session, _, clock) = create_session(&config);

    clock.set(1_700_000_001_234);
    let event = session
        .rebalance(&ProtocolId::new("aave"), &ProtocolId::new("morpho"), 5.0)
        .unwrap();
    assert_eq!(event.id(), "rb-1700000001234");

    assert!(!session.toggle_auto_rebalance());
    session.start().unwrap();
    tokio::time::sleep(Duration::from_secs(31)).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.history.len(), 1);
    assert!(!snapshot.auto_rebalance);
    assert_eq!(snapshot.last_rebalance_at, 1_700_000_001_234);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["deposit_status"], "idle");
    assert_eq!(json["history"][0]["id"], "rb-1700000001234");
}
