//! MPC Guard CLI
//!
//! Unattended approver for fee-withdrawal sign requests: watches the MPC
//! signing service and answers AGREE or DISAGREE according to a fixed
//! allow-list policy. A `review` subcommand checks a single request
//! offline without touching the network.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use k256::ecdsa::SigningKey;
use mpc_guard_core::{ApprovalLoop, PolicyConfig, PolicyEngine, SignRequest};
use mpc_guard_rpc::{MpcClient, MpcClientConfig, DEFAULT_API_PREFIX};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "mpc-guard")]
#[command(about = "Transaction-policy guard for MPC fee withdrawals", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the signing service and submit verdicts until terminated
    Watch {
        /// MPC signing service URL
        #[arg(long)]
        server: String,

        /// File holding the operator's hex-encoded private key
        #[arg(long)]
        key_file: String,

        /// RPC method namespace prefix
        #[arg(long, default_value = DEFAULT_API_PREFIX)]
        api_prefix: String,

        /// RPC request timeout in seconds
        #[arg(long, default_value = "10")]
        rpc_timeout_secs: u64,

        /// Sleep between poll cycles in seconds
        #[arg(long, default_value = "5")]
        interval_secs: u64,

        /// Skip pending requests older than this many seconds (0 = keep all)
        #[arg(long, default_value = "0")]
        expired_interval_secs: u64,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Review one sign request from a JSON file and print the verdict
    Review {
        /// Path to a file holding the sign request JSON
        request_file: String,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

#[derive(Args)]
struct PolicyArgs {
    /// Address whose detached signature authorizes a withdrawal
    #[arg(long)]
    sender: String,

    /// Comma-separated addresses allowed to receive funds
    #[arg(long, value_delimiter = ',')]
    receivers: Vec<String>,

    /// Comma-separated multicall contract addresses batches may use
    #[arg(long, value_delimiter = ',')]
    multicall_contracts: Vec<String>,
}

impl PolicyArgs {
    fn to_config(&self) -> Result<PolicyConfig> {
        let sender = self
            .sender
            .parse()
            .with_context(|| format!("invalid sender address '{}'", self.sender))?;
        let receivers = self
            .receivers
            .iter()
            .map(|s| {
                s.trim()
                    .parse()
                    .with_context(|| format!("invalid receiver address '{s}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        let contracts = self
            .multicall_contracts
            .iter()
            .map(|s| {
                s.trim()
                    .parse()
                    .with_context(|| format!("invalid multicall contract address '{s}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PolicyConfig::new(sender)
            .with_receivers(receivers)
            .with_multicall_contracts(contracts))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            server,
            key_file,
            api_prefix,
            rpc_timeout_secs,
            interval_secs,
            expired_interval_secs,
            policy,
        } => {
            watch(
                server,
                key_file,
                api_prefix,
                rpc_timeout_secs,
                interval_secs,
                expired_interval_secs,
                policy,
            )
            .await?;
        }
        Commands::Review {
            request_file,
            policy,
        } => {
            review(&request_file, policy)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn watch(
    server: String,
    key_file: String,
    api_prefix: String,
    rpc_timeout_secs: u64,
    interval_secs: u64,
    expired_interval_secs: u64,
    policy: PolicyArgs,
) -> Result<()> {
    let config = policy.to_config()?;
    let key = load_key(&key_file)?;

    let client_config = MpcClientConfig::new(server)
        .with_api_prefix(api_prefix)
        .with_timeout_secs(rpc_timeout_secs)
        .with_expired_interval_secs(expired_interval_secs);
    let client = MpcClient::new(client_config, key)?;
    let (source, sink) = (client.clone(), client);

    info!(
        sender = %config.allowed_sender,
        receivers = config.allowed_receivers.len(),
        multicall_contracts = config.allowed_multicall_contracts.len(),
        "starting fee-withdrawal guard"
    );

    let engine = PolicyEngine::new(config);
    ApprovalLoop::new(source, sink, engine)
        .with_interval(Duration::from_secs(interval_secs))
        .run()
        .await;
    Ok(())
}

fn review(request_file: &str, policy: PolicyArgs) -> Result<()> {
    let config = policy.to_config()?;
    let raw = std::fs::read_to_string(request_file)
        .with_context(|| format!("cannot read request file '{request_file}'"))?;
    let request: SignRequest =
        serde_json::from_str(&raw).context("request file is not a sign request")?;

    // source and sink are never used for an offline review
    let engine = PolicyEngine::new(config);
    let reviewer = ApprovalLoop::new(NullSource, NullSink, engine);
    let verdict = reviewer.review(&request);

    if verdict.ignore {
        println!("IGNORE: {}", verdict.reason);
    } else if verdict.agree {
        println!("AGREE");
    } else {
        println!("DISAGREE: {}", verdict.reason);
    }
    Ok(())
}

fn load_key(path: &str) -> Result<SigningKey> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read key file '{path}'"))?;
    let hex_key = raw.trim().trim_start_matches("0x");
    let bytes = hex::decode(hex_key).context("key file is not hex")?;
    SigningKey::from_slice(&bytes).context("key file is not a valid secp256k1 key")
}

struct NullSource;
struct NullSink;

#[async_trait::async_trait]
impl mpc_guard_core::SignRequestSource for NullSource {
    async fn fetch_pending(&self) -> mpc_guard_core::Result<Vec<SignRequest>> {
        Ok(vec![])
    }
}

#[async_trait::async_trait]
impl mpc_guard_core::ApprovalSink for NullSink {
    async fn submit(
        &self,
        _request: &SignRequest,
        _verdict: &mpc_guard_core::Verdict,
    ) -> mpc_guard_core::Result<()> {
        Ok(())
    }
}
