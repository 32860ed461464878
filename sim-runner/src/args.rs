use clap::Parser;
use std::path::PathBuf;
use yield_core::SimulationConfig;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed of the APR random walk, overrides `simulation.seed`
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many seconds (runs until Ctrl-C otherwise)
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Seconds between two dashboard snapshots in the log
    #[arg(long, default_value_t = 5)]
    pub snapshot_secs: u64,

    /// Connect the paper wallet and deposit this many USDC at startup
    #[arg(long)]
    pub deposit: Option<f64>,

    /// Start with auto-rebalance disabled
    #[arg(long)]
    pub no_auto_rebalance: bool,

    /// Address of the simulated external wallet
    #[arg(long, default_value = "0x00000000000000000000000000000000000000a1")]
    pub external_address: String,

    /// Read session commands from stdin (type `help` for the list)
    #[arg(long)]
    pub interactive: bool,
}

impl Args {
    /// Applies the command line on top of the loaded configuration.
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
        if self.no_auto_rebalance {
            config.simulation.auto_rebalance = false;
        }
    }
}
