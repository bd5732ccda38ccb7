//! poolsweep: cleanup daemon for pooled Stratus test resources.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use poolsweep_common::defaults;

use poolsweep::auth;
use poolsweep::cleanup::StratusCleaner;
use poolsweep::config::{PoolConfig, ProviderConfig, SweepConfig};
use poolsweep::orchestrator::{Monitor, Sweeper};
use poolsweep::pool::PoolClient;
use poolsweep::stratus::StratusContext;

#[derive(Parser, Debug)]
#[command(name = "poolsweep")]
#[command(about = "Cleanup daemon for pooled Stratus test resources")]
#[command(version)]
struct Args {
    /// Pool broker URL
    #[arg(long, env = "POOLSWEEP_POOL_URL")]
    pool_url: String,

    /// Identity presented to the pool broker
    #[arg(long, default_value = defaults::DEFAULT_OWNER)]
    owner: String,

    /// File holding the broker password
    #[arg(long, env = "POOLSWEEP_PASSWORD_FILE")]
    password_file: PathBuf,

    /// File holding the Stratus API key
    #[arg(long, env = "STRATUS_CREDENTIALS_FILE")]
    credentials_file: PathBuf,

    /// Comma-separated resource kinds to manage
    #[arg(long, value_delimiter = ',')]
    resource_type: Vec<String>,

    /// Fixed account id, skipping per-attempt resolution
    #[arg(long)]
    account_id: Option<String>,

    /// Skip API key rotation after cleanup
    #[arg(long)]
    skip_rotation: bool,

    /// Log provider API calls
    #[arg(long)]
    debug: bool,
}

impl From<Args> for SweepConfig {
    fn from(args: Args) -> Self {
        Self {
            pool: PoolConfig {
                url: args.pool_url,
                owner: args.owner,
                password_file: args.password_file,
            },
            provider: ProviderConfig {
                credentials_file: args.credentials_file,
                debug: args.debug,
            },
            resource_types: SweepConfig::effective_resource_types(args.resource_type),
            sweep_interval: defaults::SWEEP_INTERVAL,
            monitor_period: defaults::MONITOR_PERIOD,
            account_id: args.account_id,
            skip_rotation: args.skip_rotation,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

fn print_error(e: &anyhow::Error) {
    eprintln!("\x1b[1;31merror\x1b[0m: {e}");
    let causes: Vec<_> = e.chain().skip(1).collect();
    if !causes.is_empty() {
        eprintln!("\ncaused by:");
        for (i, cause) in causes.iter().enumerate() {
            eprintln!("    {i}: {cause}");
        }
    }
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        eprintln!("\nnote: set RUST_BACKTRACE=1 for a backtrace");
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    if args.resource_type.is_empty() {
        info!(
            defaults = ?defaults::DEFAULT_RESOURCE_TYPES,
            "no resource types configured, managing the defaults"
        );
    }
    let config: SweepConfig = args.into();

    let password = auth::read_secret_file(&config.pool.password_file).await?;
    let api_key = auth::read_secret_file(&config.provider.credentials_file).await?;

    let broker = Arc::new(PoolClient::new(
        &config.pool.url,
        &config.pool.owner,
        &password,
    )?);
    let stratus = StratusContext::new(api_key, config.provider.debug)?;
    let cleaner = Arc::new(StratusCleaner::new(&stratus));

    info!(
        pool = %config.pool.url,
        owner = %config.pool.owner,
        resource_types = ?config.resource_types,
        rotate_credentials = !config.skip_rotation,
        "starting poolsweep"
    );

    let monitor = Monitor::new(
        Arc::clone(&broker),
        Arc::clone(&cleaner),
        config.resource_types.clone(),
        config.monitor_period,
    );
    tokio::spawn(async move { monitor.run().await });

    let sweeper = Sweeper::new(
        broker,
        cleaner,
        config.resource_types.clone(),
        config.sweep_interval,
        config.attempt_options(),
    );
    sweeper.run().await
}
