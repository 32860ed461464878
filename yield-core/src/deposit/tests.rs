use super::*;
use crate::paper::{PaperChain, PaperWallet};
use crate::token::{transfer_calldata, USDC_ADDRESS};
use crate::wallet::WalletStore;
use async_trait::async_trait;
use mockall::mock;
use std::sync::Mutex;
use yield_api::{ReceiptStatus, TransactionReceipt};

mock! {
    pub Chain {}

    #[async_trait]
    impl ChainClient for Chain {
        async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError>;
    }
}

fn user() -> Address {
    Address::repeat_byte(0x11)
}

fn agent() -> Address {
    Address::repeat_byte(0xda)
}

const CONFIRMATION: Duration = Duration::from_secs(2);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct Fixture {
    flow: DepositFlow,
    wallet: Arc<PaperWallet>,
    chain: Arc<PaperChain>,
    store: SharedWallet,
}

fn create_fixture(wallet: PaperWallet) -> Fixture {
    let wallet = Arc::new(wallet);
    let chain = Arc::new(PaperChain::new(CONFIRMATION));
    let store = Arc::new(Mutex::new(WalletStore::new(agent())));
    let flow = DepositFlow::new(wallet.clone(), chain.clone(), store.clone());
    Fixture {
        flow,
        wallet,
        chain,
        store,
    }
}

fn status(store: &SharedWallet) -> DepositStatus {
    lock(store).pending().status
}

fn balance(store: &SharedWallet) -> f64 {
    lock(store).virtual_balance()
}

#[tokio::test(start_paused = true)]
async fn test_successful_deposit_credits_balance() {
    init_logger();
    let fx = create_fixture(PaperWallet::connected(user()));

    let outcome = fx.flow.deposit(100.0).await.unwrap();

    let tx_hash = match outcome {
        DepositOutcome::Confirmed { amount, tx_hash } => {
            assert_eq!(amount, 100.0);
            tx_hash
        }
        other => panic!("expected a confirmed deposit, got {:?}", other),
    };
    assert_eq!(balance(&fx.store), 100.0);
    assert_eq!(status(&fx.store), DepositStatus::Idle);
    assert!(lock(&fx.store).pending().tx_hash.is_none());

    let transfers = fx.wallet.transfers();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].token, USDC_ADDRESS);
    assert_eq!(transfers[0].from, user());
    assert_eq!(transfers[0].to, agent());
    assert_eq!(transfers[0].amount, U256::from(100_000_000u64));
    assert_eq!(
        transfers[0].calldata,
        transfer_calldata(agent(), U256::from(100_000_000u64))
    );
    assert_ne!(tx_hash, TxHash::ZERO);
    assert_eq!(fx.chain.next_block(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_status_is_confirming_while_waiting_for_receipt() {
    init_logger();
    let fx = create_fixture(PaperWallet::connected(user()));
    let flow = Arc::new(fx.flow);

    let task = {
        let flow = flow.clone();
        tokio::spawn(async move { flow.deposit(25.0).await })
    };

    tokio::time::sleep(Duration::from_secs(1)).await;
    {
        let store = lock(&fx.store);
        assert_eq!(store.pending().status, DepositStatus::Confirming);
        assert_eq!(store.pending().amount, 25.0);
        assert!(store.pending().tx_hash.is_some());
        assert_eq!(store.virtual_balance(), 0.0);
    }

    // A second deposit is refused while the first one is mined.
    assert_eq!(flow.deposit(5.0).await, Err(DepositError::InFlight));

    let outcome = task.await.unwrap().unwrap();
    assert!(matches!(outcome, DepositOutcome::Confirmed { .. }));
    assert_eq!(balance(&fx.store), 25.0);
}

#[tokio::test]
async fn test_invalid_amount_leaves_state_untouched() {
    let fx = create_fixture(PaperWallet::connected(user()));

    for amount in [0.0, -10.0, f64::INFINITY, 0.000_000_1] {
        assert!(matches!(
            fx.flow.deposit(amount).await,
            Err(DepositError::InvalidAmount(_))
        ));
    }
    assert!(matches!(
        fx.flow.deposit(f64::NAN).await,
        Err(DepositError::InvalidAmount(_))
    ));

    assert_eq!(status(&fx.store), DepositStatus::Idle);
    assert!(fx.wallet.transfers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_deposit_requires_external_wallet() {
    let fx = create_fixture(PaperWallet::new(user()));

    assert_eq!(
        fx.flow.deposit(100.0).await,
        Err(DepositError::NoExternalWallet)
    );
    assert_eq!(status(&fx.store), DepositStatus::Idle);

    fx.wallet.connect().await.unwrap();
    assert!(fx.flow.deposit(100.0).await.is_ok());
}

#[tokio::test]
async fn test_user_rejection_is_cancelled() {
    init_logger();
    let wallet = Arc::new(PaperWallet::connected(user()));
    let mut chain = MockChain::new();
    chain.expect_wait_for_receipt().never();
    let store = Arc::new(Mutex::new(WalletStore::new(agent())));
    let flow = DepositFlow::new(wallet.clone(), Arc::new(chain), store.clone());

    wallet.reject_next();
    assert_eq!(flow.deposit(50.0).await, Ok(DepositOutcome::Cancelled));
    assert_eq!(status(&store), DepositStatus::Idle);
    assert_eq!(balance(&store), 0.0);

    wallet.fail_next(WalletError::Provider(
        "MetaMask Tx Signature: User denied transaction signature.".into(),
    ));
    assert_eq!(flow.deposit(50.0).await, Ok(DepositOutcome::Cancelled));
    assert_eq!(status(&store), DepositStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_wallet_failure_resets_after_delay() {
    init_logger();
    let fx = create_fixture(PaperWallet::connected(user()));
    fx.wallet
        .fail_next(WalletError::Provider("insufficient funds".into()));

    let result = fx.flow.deposit(100.0).await;

    assert_eq!(
        result,
        Err(DepositError::Wallet(WalletError::Provider(
            "insufficient funds".into()
        )))
    );
    assert_eq!(status(&fx.store), DepositStatus::Failed);
    assert_eq!(lock(&fx.store).pending().amount, 100.0);

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert_eq!(status(&fx.store), DepositStatus::Failed);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(status(&fx.store), DepositStatus::Idle);
    assert_eq!(balance(&fx.store), 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_reverted_receipt_fails() {
    init_logger();
    let fx = create_fixture(PaperWallet::connected(user()));
    fx.chain.revert_next();

    let result = fx.flow.deposit(10.0).await;

    assert!(matches!(result, Err(DepositError::Reverted(_))));
    assert!(result.unwrap_err().to_string().starts_with("Transaction failed"));
    assert_eq!(status(&fx.store), DepositStatus::Failed);
    assert_eq!(balance(&fx.store), 0.0);
}

#[tokio::test]
async fn test_rpc_error_fails_with_mocked_chain() {
    init_logger();
    let wallet = Arc::new(PaperWallet::connected(user()));
    let mut chain = MockChain::new();
    chain
        .expect_wait_for_receipt()
        .times(1)
        .returning(|_| Err(ChainError::Rpc("connection reset".into())));
    let store = Arc::new(Mutex::new(WalletStore::new(agent())));
    let flow = DepositFlow::new(wallet, Arc::new(chain), store.clone())
        .with_failure_reset(Duration::from_secs(60));

    let result = flow.deposit(10.0).await;

    assert_eq!(
        result,
        Err(DepositError::Chain(ChainError::Rpc("connection reset".into())))
    );
    assert_eq!(status(&store), DepositStatus::Failed);
}

#[tokio::test]
async fn test_mocked_chain_receives_wallet_hash() {
    let wallet = Arc::new(PaperWallet::connected(user()));
    let mut chain = MockChain::new();
    chain
        .expect_wait_for_receipt()
        .times(1)
        .returning(|tx_hash| {
            Ok(TransactionReceipt {
                tx_hash,
                status: ReceiptStatus::Success,
                block_number: Some(42),
            })
        });
    let store = Arc::new(Mutex::new(WalletStore::new(agent())));
    let flow = DepositFlow::new(wallet, Arc::new(chain), store.clone());

    let outcome = flow.deposit(1.5).await.unwrap();

    match outcome {
        DepositOutcome::Confirmed { amount, tx_hash } => {
            assert_eq!(amount, 1.5);
            assert_ne!(tx_hash, TxHash::ZERO);
        }
        other => panic!("expected a confirmed deposit, got {:?}", other),
    }
    assert_eq!(balance(&store), 1.5);
}

#[tokio::test(start_paused = true)]
async fn test_reset_skips_replaced_deposit() {
    init_logger();
    let fx = create_fixture(PaperWallet::connected(user()));
    fx.chain.fail_next(ChainError::NotFound("0xdead".into()));

    assert!(fx.flow.deposit(10.0).await.is_err());
    assert_eq!(status(&fx.store), DepositStatus::Failed);

    // A new deposit starts before the failed one is cleared.
    lock(&fx.store).begin_deposit(20.0);

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(status(&fx.store), DepositStatus::Pending);
    assert_eq!(lock(&fx.store).pending().amount, 20.0);
}

#[tokio::test(start_paused = true)]
async fn test_second_failure_keeps_its_full_reset_delay() {
    init_logger();
    let fx = create_fixture(PaperWallet::connected(user()));

    fx.wallet.fail_next(WalletError::Provider("nonce too low".into()));
    assert!(fx.flow.deposit(10.0).await.is_err());
    assert_eq!(status(&fx.store), DepositStatus::Failed);

    tokio::time::sleep(Duration::from_secs(3)).await;
    fx.wallet.fail_next(WalletError::Provider("gas too low".into()));
    assert!(fx.flow.deposit(20.0).await.is_err());

    // The first failure's timer fires at 5 s and must leave the second alone.
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(status(&fx.store), DepositStatus::Failed);
    assert_eq!(lock(&fx.store).pending().amount, 20.0);

    tokio::time::sleep(Duration::from_millis(2_600)).await;
    assert_eq!(status(&fx.store), DepositStatus::Idle);
    assert_eq!(balance(&fx.store), 0.0);
}
