//! # Simulation Driver
//!
//! Three independent periodic tasks feed the strategy store:
//!
//! | Task         | Default period | Effect                                   |
//! |--------------|----------------|------------------------------------------|
//! | `apr-jitter` | 5 s            | random walk on every APR                 |
//! | `rebalance`  | 15 s           | one auto-rebalance step, if enabled      |
//! | `earnings`   | 1 s            | accrues yield on the agent's balance     |
//!
//! The tasks share nothing but the stores; there is no ordering between them
//! when their periods coincide. Each tick is also exposed as a method so it
//! can be driven by hand.

use crate::shared::{lock, SharedStrategy, SharedWallet};
use log::{debug, info};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use yield_api::RebalanceEvent;

pub mod schedule;

use schedule::PeriodicTask;

pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0;

pub const APR_JITTER_TASK: &str = "apr-jitter";
pub const REBALANCE_TASK: &str = "rebalance";
pub const EARNINGS_TASK: &str = "earnings";

pub type SharedRng = Arc<Mutex<Box<dyn RngCore + Send>>>;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("The simulation driver must be started inside a tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("Period of task '{0}' must be greater than zero")]
    ZeroPeriod(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPeriods {
    pub apr_jitter: Duration,
    pub rebalance: Duration,
    pub earnings: Duration,
}

impl Default for TickPeriods {
    fn default() -> Self {
        Self {
            apr_jitter: Duration::from_secs(5),
            rebalance: Duration::from_secs(15),
            earnings: Duration::from_secs(1),
        }
    }
}

impl TickPeriods {
    fn check(&self) -> Result<(), DriverError> {
        for (name, period) in [
            (APR_JITTER_TASK, self.apr_jitter),
            (REBALANCE_TASK, self.rebalance),
            (EARNINGS_TASK, self.earnings),
        ] {
            if period.is_zero() {
                return Err(DriverError::ZeroPeriod(name));
            }
        }
        Ok(())
    }
}

/// ChaCha8 generator, seeded when reproducible runs are wanted.
pub fn simulation_rng(seed: Option<u64>) -> Box<dyn RngCore + Send> {
    match seed {
        Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
        None => Box::new(ChaCha8Rng::from_entropy()),
    }
}

/// The tick bodies, cloned into each spawned task.
#[derive(Clone)]
struct Ticks {
    strategy: SharedStrategy,
    wallet: SharedWallet,
    rng: SharedRng,
    earnings_period: Duration,
}

impl Ticks {
    fn jitter(&self) {
        let mut rng = lock(&self.rng);
        lock(&self.strategy).randomize_aprs(&mut **rng);
    }

    fn rebalance(&self) -> Option<RebalanceEvent> {
        let mut strategy = lock(&self.strategy);
        if !strategy.state().is_auto_rebalancing() {
            debug!("Rebalance tick skipped: auto-rebalance disabled");
            return None;
        }
        strategy.auto_rebalance()
    }

    fn earnings(&self) -> f64 {
        let balance = lock(&self.wallet).virtual_balance();
        if balance <= 0.0 {
            return 0.0;
        }

        let mut strategy = lock(&self.strategy);
        let delta = balance * strategy.weighted_apr() / 100.0 * self.earnings_period.as_secs_f64()
            / SECONDS_PER_YEAR;

        if delta > 0.0 && strategy.accrue_earnings(delta) {
            debug!(
                "Accrued {:.8} USDC (total {})",
                delta,
                strategy.state().total_earnings()
            );
            delta
        } else {
            0.0
        }
    }
}

pub struct SimulationDriver {
    ticks: Ticks,
    periods: TickPeriods,
    tasks: Vec<PeriodicTask>,
}

impl SimulationDriver {
    pub fn new(
        strategy: SharedStrategy,
        wallet: SharedWallet,
        rng: Box<dyn RngCore + Send>,
        periods: TickPeriods,
    ) -> Self {
        Self {
            ticks: Ticks {
                strategy,
                wallet,
                rng: Arc::new(Mutex::new(rng)),
                earnings_period: periods.earnings,
            },
            periods,
            tasks: Vec::new(),
        }
    }

    pub fn periods(&self) -> TickPeriods {
        self.periods
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Names of the scheduled tasks.
    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(PeriodicTask::name).collect()
    }

    /// Schedules the three tasks on the current tokio runtime.
    ///
    /// Calling `start` on a running driver does nothing.
    pub fn start(&mut self) -> Result<(), DriverError> {
        if self.is_running() {
            return Ok(());
        }
        self.periods.check()?;
        let runtime = Handle::try_current()?;

        let ticks = self.ticks.clone();
        self.tasks.push(PeriodicTask::spawn(
            &runtime,
            APR_JITTER_TASK,
            self.periods.apr_jitter,
            move || ticks.jitter(),
        ));

        let ticks = self.ticks.clone();
        self.tasks.push(PeriodicTask::spawn(
            &runtime,
            REBALANCE_TASK,
            self.periods.rebalance,
            move || {
                ticks.rebalance();
            },
        ));

        let ticks = self.ticks.clone();
        self.tasks.push(PeriodicTask::spawn(
            &runtime,
            EARNINGS_TASK,
            self.periods.earnings,
            move || {
                ticks.earnings();
            },
        ));

        info!(
            "Simulation driver started (jitter {:?}, rebalance {:?}, earnings {:?})",
            self.periods.apr_jitter, self.periods.rebalance, self.periods.earnings
        );
        Ok(())
    }

    /// Cancels all three tasks together.
    pub fn stop(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.cancel();
        }
        info!("Simulation driver stopped");
    }

    pub fn jitter_tick(&self) {
        self.ticks.jitter();
    }

    /// Runs one auto-rebalance attempt if the flag is set.
    pub fn rebalance_tick(&self) -> Option<RebalanceEvent> {
        self.ticks.rebalance()
    }

    /// Accrues one earnings period and returns the amount added.
    pub fn earnings_tick(&self) -> f64 {
        self.ticks.earnings()
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
