//! # CLI Interface
//!
//! Defines the command-line argument structure for `aurum-node` using
//! `clap` derive. Supports three subcommands: `run`, `status` and
//! `version`.

use clap::{Parser, Subcommand};

use aurum_ledger::config::{
    DEFAULT_CHAIN_ID, DEFAULT_CHAIN_NAME, DEFAULT_CONTRACT_ADDRESS, DEFAULT_RPC_URL,
};

use crate::logging::LogFormat;

/// Aurum vault API server.
///
/// Serves custodial gold-bar records from the built-in vault dataset and
/// read-only views of the on-chain reserve contract, and exposes
/// Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "aurum-node",
    about = "Aurum vault API server",
    version,
    propagate_version = true
)]
pub struct AurumNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the Aurum node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server.
    Run(RunArgs),
    /// Query the health of a running server.
    Status(StatusArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Port for the REST API.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "AURUM_METRICS_PORT", default_value_t = 9742)]
    pub metrics_port: u16,

    /// JSON-RPC endpoint of the chain hosting the reserve contract.
    #[arg(long, env = "AURUM_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Address of the reserve contract.
    #[arg(long, env = "AURUM_CONTRACT_ADDRESS", default_value = DEFAULT_CONTRACT_ADDRESS)]
    pub contract_address: String,

    /// EVM chain id reported by `/contract/info`.
    #[arg(long, env = "AURUM_CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    /// Chain display name reported by `/contract/info`.
    #[arg(long, env = "AURUM_CHAIN_NAME", default_value = DEFAULT_CHAIN_NAME)]
    pub chain_name: String,

    /// Seed for the reserve placeholder figures.
    ///
    /// When omitted, the placeholders are seeded from OS entropy.
    #[arg(long, env = "AURUM_RNG_SEED")]
    pub rng_seed: Option<u64>,

    /// Log output format.
    #[arg(long, env = "AURUM_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Base URL of the running server.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        AurumNodeCli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = AurumNodeCli::try_parse_from(["aurum-node", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.metrics_port, 9742);
        assert_eq!(args.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(args.chain_id, 11_155_111);
        assert_eq!(args.log_format, LogFormat::Pretty);
    }

    #[test]
    fn run_flags_override_defaults() {
        let cli = AurumNodeCli::try_parse_from([
            "aurum-node",
            "run",
            "--port",
            "8080",
            "--rng-seed",
            "7",
            "--log-format",
            "json",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.rng_seed, Some(7));
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
