//! Validation daemon: runs the validation service and provides tooling for
//! participants (commit hashes, namehashes).

use agij_crypto::{label_hash, namehash, sub_node};
use agij_node::{
    init_logging, load_or_build, save_snapshot, EventBus, IdentityServices, LogFormat, NodeConfig,
    ValidationMetrics, ValidationService,
};
use agij_nullables::{NullAttestations, NullChain, NullJobRegistry, NullNameService};
use agij_stake::{MemoryReputationLedger, MemoryStakeLedger};
use agij_types::{Hash256, JobId, Role, Timestamp};
use agij_validation::{commitment_hash, Collaborators};
use anyhow::Context;
use clap::Parser;
use rand::RngCore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "agij-daemon", about = "Validator consensus and identity-gated voting daemon")]
struct Cli {
    /// Log format: "human" or "json".
    #[arg(long, env = "AGIJ_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AGIJ_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the validation service against in-process development collaborators.
    Run {
        /// Path to a TOML configuration file.
        #[arg(long, env = "AGIJ_CONFIG")]
        config: PathBuf,

        /// Snapshot file; overrides `snapshot_path` from the config.
        #[arg(long, env = "AGIJ_SNAPSHOT")]
        snapshot: Option<PathBuf>,

        /// Print Prometheus metrics on shutdown.
        #[arg(long, env = "AGIJ_ENABLE_METRICS")]
        metrics: bool,
    },
    /// Print a default configuration file.
    DefaultConfig,
    /// Compute a vote commitment. Prints the salt used so the vote can be revealed.
    CommitHash {
        #[arg(long)]
        job: u64,
        #[arg(long, default_value_t = 0)]
        nonce: u64,
        #[arg(long)]
        approve: bool,
        /// Burn receipt hash (hex); zero when omitted.
        #[arg(long)]
        burn_hash: Option<Hash256>,
        /// Job specification hash (hex); zero when omitted.
        #[arg(long)]
        spec_hash: Option<Hash256>,
        /// Salt (hex); a random one is generated when omitted.
        #[arg(long)]
        salt: Option<Hash256>,
    },
    /// Namehash of a dotted name, optionally extended by one label.
    Namehash {
        name: String,
        #[arg(long)]
        label: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            snapshot,
            metrics,
        } => {
            let file_config = NodeConfig::from_toml_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let config = NodeConfig {
                log_format: cli.log_format.unwrap_or(file_config.log_format),
                log_level: cli.log_level.unwrap_or_else(|| file_config.log_level.clone()),
                snapshot_path: snapshot.or_else(|| file_config.snapshot_path.clone()),
                enable_metrics: metrics || file_config.enable_metrics,
                ..file_config
            };
            init_logging(config.log_format, &config.log_level);
            run(config).await?;
        }
        Command::DefaultConfig => {
            print!("{}", NodeConfig::default().to_toml_string()?);
        }
        Command::CommitHash {
            job,
            nonce,
            approve,
            burn_hash,
            spec_hash,
            salt,
        } => {
            let salt = salt.unwrap_or_else(random_salt);
            let burn_hash = burn_hash.unwrap_or(Hash256::ZERO);
            let spec_hash = spec_hash.unwrap_or(Hash256::ZERO);
            let commitment =
                commitment_hash(JobId::new(job), nonce, approve, &burn_hash, &salt, &spec_hash);
            let out = serde_json::json!({
                "job": job,
                "nonce": nonce,
                "approve": approve,
                "commitment": commitment.to_string(),
                "salt": salt.to_string(),
                "burn_hash": burn_hash.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Namehash { name, label } => {
            let root = namehash(&name);
            match label {
                Some(label) => {
                    println!("root:  {root}");
                    println!("label: {}", label_hash(&label));
                    println!("node:  {}", sub_node(&root, &label));
                }
                None => println!("{root}"),
            }
        }
    }

    Ok(())
}

fn random_salt() -> Hash256 {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    Hash256::new(bytes)
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    config.validate()?;

    let chain = Arc::new(NullChain::new(1, Timestamp::now().as_secs()));
    let jobs = Arc::new(NullJobRegistry::new(config.job_registry_address()?));
    let stake = Arc::new(MemoryStakeLedger::new());
    for (address, amount) in config.validator_pool()? {
        stake.set_stake(address, Role::Validator, amount);
    }
    let collaborators = Collaborators {
        jobs,
        stake,
        reputation: Arc::new(MemoryReputationLedger::new()),
        chain: chain.clone(),
    };
    let services = IdentityServices {
        name_service: Some(Arc::new(NullNameService::new())),
        attestations: Some(Arc::new(NullAttestations::new())),
    };

    let module = load_or_build(&config, collaborators, &services)?;
    let metrics = Arc::new(ValidationMetrics::new());
    let mut bus = EventBus::new();
    bus.subscribe(Box::new(|event| tracing::info!(?event, "validation event")));
    let (handle, task) =
        ValidationService::spawn(module, Arc::clone(&metrics), bus, config.command_buffer);

    let block_time = config.block_time_secs.max(1);
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(block_time));
        interval.tick().await;
        loop {
            interval.tick().await;
            chain.mine(1);
            chain.advance_time(block_time);
        }
    });

    tracing::info!(
        governance = %config.governance,
        job_registry = %config.job_registry,
        block_time,
        "validation daemon running, ctrl-c to stop"
    );
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, stopping validation service");

    ticker.abort();
    handle.shutdown().await?;
    let module = task.await?;
    if let Some(path) = &config.snapshot_path {
        save_snapshot(&module, path)?;
    }
    if config.enable_metrics {
        print!("{}", metrics.encode()?);
    }
    tracing::info!(open_rounds = module.open_rounds(), "validation daemon exited cleanly");
    Ok(())
}
