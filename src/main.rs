use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::providers::DynProvider;
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use uniswap_v3_toolkit::config::Config;
use uniswap_v3_toolkit::repository::{AlloyEthereumRepository, TransactionRepository};
use uniswap_v3_toolkit::service::{
    FlashLoanService, GovernanceService, MintRequest, PoolService, PositionService, QuoterService,
    TokenRegistry,
};

type Repository = Arc<AlloyEthereumRepository<DynProvider>>;

#[derive(Parser)]
#[command(name = "uniswap-v3-toolkit")]
#[command(about = "Uniswap V3 quoting, pool and position tooling, governance proposals and Aave flash loans", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Enable debug logging (ignored when RUST_LOG is set)
    #[arg(long, short)]
    verbose: bool,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote the configured exact-input swap through the Quoter
    Quote,

    /// Read the state of the configured pool
    Pool,

    /// Approve both tokens and mint a position around the current tick
    Mint,

    /// List the position NFT ids held by an account
    Positions {
        /// Owner address (defaults to the configured wallet)
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show a single position
    Position {
        /// Position NFT id
        token_id: String,
    },

    /// Submit the ENS subdomain governance proposal
    Propose,

    /// Fund the flash-loan harness from the whale and run a flash loan
    FlashLoan,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug,alloy=info"
    } else {
        "info,alloy=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("debug logging enabled");

    let config = Config::from_yaml(&cli.config).await?;

    let repository = Arc::new(
        AlloyEthereumRepository::connect(&config.rpc.endpoint(), &config.wallet.private_key)
            .context("failed to connect to RPC endpoint")?,
    );
    match repository.signer_address() {
        Some(address) => tracing::info!("Initialized with wallet address: {address}"),
        None => tracing::info!("No private key provided. Running in read-only mode."),
    }

    let cancellation_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancellation_token.clone()));

    tokio::select! {
        result = run(cli.command, cli.json, &config, repository) => result,
        _ = cancellation_token.cancelled() => {
            tracing::warn!("command cancelled before completion");
            Ok(())
        }
    }
}

async fn run(command: Commands, json: bool, config: &Config, repository: Repository) -> anyhow::Result<()> {
    let registry = TokenRegistry::new();

    match command {
        Commands::Quote => {
            let token_in = registry.resolve(&config.quote.token_in)?;
            let token_out = registry.resolve(&config.quote.token_out)?;

            let quote = QuoterService::new(repository, &config.uniswap)
                .quote(
                    &token_in,
                    &token_out,
                    config.quote.fee,
                    &config.quote.amount_in,
                    config.quote.display_chars,
                )
                .await?;

            if json {
                print_json(&quote)?;
            } else {
                println!("{}", quote.formatted);
            }
        }
        Commands::Pool => {
            let token_a = registry.resolve(&config.pool.token_a)?;
            let token_b = registry.resolve(&config.pool.token_b)?;

            let info = PoolService::new(repository, &config.uniswap)
                .pool_info(&token_a, &token_b, config.pool.fee)
                .await?;

            if json {
                print_json(&info)?;
            } else {
                println!("address:       {}", info.address);
                println!("token0:        {}", info.token0);
                println!("token1:        {}", info.token1);
                println!("fee:           {}", info.fee);
                println!("tickSpacing:   {}", info.tick_spacing);
                println!("liquidity:     {}", info.liquidity);
                println!("sqrtPriceX96:  {}", info.sqrt_price_x96);
                println!("tick:          {}", info.tick);
            }
        }
        Commands::Mint => {
            let settings = &config.mint;
            let amount = U256::from_str(settings.approve_amount.trim())
                .with_context(|| format!("invalid mint.approve_amount {:?}", settings.approve_amount))?;

            let request = MintRequest {
                token_a: registry.resolve(&settings.token_a)?,
                token_b: registry.resolve(&settings.token_b)?,
                fee: settings.fee,
                amount,
                max_fee_per_gas: settings.max_fee_per_gas,
                max_priority_fee_per_gas: settings.max_priority_fee_per_gas,
                slippage_bips: settings.slippage_bips,
                deadline_secs: settings.deadline_secs,
                tick_spacing_multiplier: settings.tick_spacing_multiplier,
            };

            let outcome = PositionService::new(repository.clone(), repository, &config.uniswap)
                .mint(&request)
                .await?;

            if json {
                print_json(&outcome)?;
            } else {
                println!(
                    "Minted ticks [{}, {}) liquidity {} in tx {}",
                    outcome.tick_lower, outcome.tick_upper, outcome.liquidity, outcome.tx_hash
                );
            }
        }
        Commands::Positions { owner } => {
            let owner = owner
                .map(|owner| Address::from_str(owner.trim()))
                .transpose()
                .context("invalid owner address")?;

            let ids = PositionService::new(repository.clone(), repository, &config.uniswap)
                .position_ids(owner)
                .await?;

            if json {
                print_json(&ids)?;
            } else {
                for id in ids {
                    println!("{id}");
                }
            }
        }
        Commands::Position { token_id } => {
            let token_id = U256::from_str(token_id.trim())
                .with_context(|| format!("invalid position id {token_id:?}"))?;

            let position = PositionService::new(repository.clone(), repository, &config.uniswap)
                .position(token_id)
                .await?;

            if json {
                print_json(&position)?;
            } else {
                println!("tickLower:                {}", position.tick_lower);
                println!("tickUpper:                {}", position.tick_upper);
                println!("liquidity:                {}", position.liquidity);
                println!("feeGrowthInside0LastX128: {}", position.fee_growth_inside0_last_x128);
                println!("feeGrowthInside1LastX128: {}", position.fee_growth_inside1_last_x128);
                println!("tokensOwed0:              {}", position.tokens_owed0);
                println!("tokensOwed1:              {}", position.tokens_owed1);
            }
        }
        Commands::Propose => {
            let service = GovernanceService::new(repository, config.governance.clone());

            // submission failures are reported, never retried
            match service.submit().await {
                Ok(submission) if json => print_json(&submission)?,
                Ok(submission) => println!(
                    "Proposal has been mined at block number: {}, transaction hash: {}",
                    submission.block_number, submission.tx_hash
                ),
                Err(e) => tracing::error!("Failed to submit proposal: {e}"),
            }
        }
        Commands::FlashLoan => {
            let report = FlashLoanService::new(repository.clone(), repository, config.flash_loan.clone())
                .run()
                .await?;

            if json {
                print_json(&report)?;
            } else {
                for log in &report.logs {
                    println!("{} {}", log.message, log.value);
                }
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn shutdown_signal(cancellation_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, cancelling tasks...");
    cancellation_token.cancel();
}
