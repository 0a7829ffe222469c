use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signer},
};
use std::str::FromStr;
use zap_farm_sdk::{instructions::FarmConfig, DepositParams, ZapFarmClient};

// ─── Program constants ────────────────────────────────────────────────────────

const PROGRAM_ID: &str = "DQ3mJXAPGftrLELHcyTfN17yy2SKEEQ4WxxPPhFRKQXq";

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}/{rest}");
        }
    }
    path.to_string()
}

fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded = expand_home(path);
    read_keypair_file(&expanded).map_err(|e| {
        anyhow!(
            "Cannot read keypair from '{}': {}\n  \
             Generate one with `solana-keygen new -o {}`",
            expanded, e, expanded
        )
    })
}

fn parse_pubkey(value: &str, what: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).with_context(|| format!("'{value}' is not a valid {what} address"))
}

fn client(rpc_url: &str) -> ZapFarmClient {
    ZapFarmClient::new(rpc_url).with_program_id(Pubkey::from_str(PROGRAM_ID).unwrap())
}

// ─── Version banner ───────────────────────────────────────────────────────────

/// Print the Zap-Farm banner to stdout.
fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  Zap-Farm  v{ver}  ·  auto-compounding vaults on Solana");
    println!("  {}", "─".repeat(62));
    println!("  Program   {PROGRAM_ID}");
    println!("  Network   Solana mainnet-beta");
    println!("  Docs      https://github.com/zap-farm/zap-farm");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// Zap-Farm — single-asset entry into gauge-staked LP farms on Solana.
///
/// Every command supports --json for machine-readable output.
/// Global options can also be set via environment variables:
///   ZAP_FARM_RPC_URL  — Solana JSON-RPC endpoint
///   ZAP_FARM_KEYPAIR  — path to Ed25519 keypair JSON
#[derive(Parser)]
#[command(
    name        = "zap-farm",
    version     = env!("CARGO_PKG_VERSION"),
    long_version = concat!(
        env!("CARGO_PKG_VERSION"), "\n",
        "Program:  DQ3mJXAPGftrLELHcyTfN17yy2SKEEQ4WxxPPhFRKQXq\n",
        "Network:  Solana mainnet-beta\n",
        "Slippage: 3.00% stable pairs  ·  0.50% volatile pairs\n",
        "License:  MIT",
    ),
    about   = "Deposit any routable asset into a gauge-staked LP farm — swap, join, and stake in one transaction.",
    after_help = "\
ENVIRONMENT:
  ZAP_FARM_RPC_URL    Solana JSON-RPC endpoint  [default: https://api.mainnet-beta.solana.com]
  ZAP_FARM_KEYPAIR    Path to Ed25519 keypair JSON  [default: ~/.config/solana/id.json]

QUICK START:
  zap-farm deposit   --gauge <GAUGE> --mint <MINT> --amount 1000000
  zap-farm pending   --gauge <GAUGE>
  zap-farm harvest   --gauge <GAUGE>
  zap-farm withdraw  --gauge <GAUGE>
  zap-farm my-positions

PROGRAM:
  DQ3mJXAPGftrLELHcyTfN17yy2SKEEQ4WxxPPhFRKQXq  (Solana mainnet-beta)"
)]
struct Cli {
    /// Solana JSON-RPC endpoint
    #[arg(
        long,
        global     = true,
        value_name = "URL",
        default_value = "https://api.mainnet-beta.solana.com",
        env = "ZAP_FARM_RPC_URL"
    )]
    rpc_url: String,

    /// Path to the signing Ed25519 keypair JSON file
    #[arg(
        long,
        global     = true,
        value_name = "PATH",
        default_value = "~/.config/solana/id.json",
        env = "ZAP_FARM_KEYPAIR"
    )]
    keypair: String,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a farm wrapping a gauge-staked liquidity pool
    ///
    /// Binds the pool, gauge, mints, and external program addresses once;
    /// every later deposit and harvest validates against this record.
    #[command(
        after_help = "\
EXAMPLES:
  zap-farm init-farm --pool <POOL> --gauge <GAUGE> \\
      --staking-token <LP_MINT> --reward-token <REWARD_MINT> \\
      --token-a <MINT_A> --token-b <MINT_B> \\
      --gauge-program <PROG> --router-program <PROG> --factory-program <PROG> \\
      --stable

NOTES:
  The LP and reward vaults are created as fresh accounts owned by the
  farm-authority PDA. One farm per gauge."
    )]
    InitFarm {
        /// Liquidity pool whose LP token the farm stakes
        #[arg(long, value_name = "PUBKEY")]
        pool: String,

        /// Gauge the LP tokens are staked into
        #[arg(long, value_name = "PUBKEY")]
        gauge: String,

        /// The pool's LP mint
        #[arg(long, value_name = "PUBKEY")]
        staking_token: String,

        /// Token the gauge pays rewards in
        #[arg(long, value_name = "PUBKEY")]
        reward_token: String,

        /// First constituent mint of the pool
        #[arg(long, value_name = "PUBKEY")]
        token_a: String,

        /// Second constituent mint of the pool
        #[arg(long, value_name = "PUBKEY")]
        token_b: String,

        /// Program owning the gauge
        #[arg(long, value_name = "PUBKEY")]
        gauge_program: String,

        /// Routing facility used for swaps and liquidity adds
        #[arg(long, value_name = "PUBKEY")]
        router_program: String,

        /// Pair registry queried for swap routes
        #[arg(long, value_name = "PUBKEY")]
        factory_program: String,

        /// The pool is a stable-variant pool (wider slippage tolerance)
        #[arg(long, default_value_t = false)]
        stable: bool,
    },

    /// Deposit an asset into a farm
    ///
    /// The LP token itself is staked unchanged. Anything else is split in
    /// half, swapped into the pool's two constituents, joined as liquidity,
    /// and staked — all in one transaction. Fails before submission when no
    /// route exists for either constituent.
    #[command(
        after_help = "\
EXAMPLES:
  # Deposit 1 USDC into a farm
  zap-farm deposit --gauge <GAUGE> --mint EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v --amount 1000000

  # Deposit LP tokens directly (fast path — no swaps, shares == amount)
  zap-farm deposit --gauge <GAUGE> --mint <LP_MINT> --amount 500000"
    )]
    Deposit {
        /// Gauge identifying the farm
        #[arg(long, value_name = "PUBKEY")]
        gauge: String,

        /// Mint of the asset to deposit
        #[arg(long, value_name = "PUBKEY")]
        mint: String,

        /// Amount in atomic units (must be > 0)
        #[arg(long, value_name = "AMOUNT")]
        amount: u64,
    },

    /// Claim gauge rewards and compound them into the farm's stake
    ///
    /// Permissionless: anyone may crank a harvest. The claimed reward is
    /// converted to LP tokens, staked, and credited to all depositors
    /// proportionally via the reward index.
    Harvest {
        /// Gauge identifying the farm
        #[arg(long, value_name = "PUBKEY")]
        gauge: String,
    },

    /// Withdraw your entire position plus pending rewards as LP tokens
    ///
    /// Full exit only — partial withdrawals are not supported.
    Withdraw {
        /// Gauge identifying the farm
        #[arg(long, value_name = "PUBKEY")]
        gauge: String,
    },

    /// Show the reward owed to an owner, as of the last on-chain accrual
    Pending {
        /// Gauge identifying the farm
        #[arg(long, value_name = "PUBKEY")]
        gauge: String,

        /// Owner to query (defaults to the configured keypair)
        #[arg(long, value_name = "PUBKEY")]
        owner: Option<String>,
    },

    /// Show a farm's configuration, share totals, and reward backlog
    FarmInfo {
        /// Gauge identifying the farm
        #[arg(long, value_name = "PUBKEY")]
        gauge: String,
    },

    /// List all farm positions owned by the configured keypair
    MyPositions,
}

#[tokio::main]
async fn main() -> Result<()> {
    // When invoked with no arguments, show banner + full help and exit cleanly.
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::InitFarm {
            pool, gauge, staking_token, reward_token, token_a, token_b,
            gauge_program, router_program, factory_program, stable,
        } => {
            cmd_init_farm(
                &cli.rpc_url, &cli.keypair,
                pool, gauge, staking_token, reward_token, token_a, token_b,
                gauge_program, router_program, factory_program, *stable,
                cli.json,
            ).await?;
        }
        Commands::Deposit { gauge, mint, amount } => {
            cmd_deposit(&cli.rpc_url, &cli.keypair, gauge, mint, *amount, cli.json).await?;
        }
        Commands::Harvest { gauge } => {
            cmd_harvest(&cli.rpc_url, &cli.keypair, gauge, cli.json).await?;
        }
        Commands::Withdraw { gauge } => {
            cmd_withdraw(&cli.rpc_url, &cli.keypair, gauge, cli.json).await?;
        }
        Commands::Pending { gauge, owner } => {
            cmd_pending(&cli.rpc_url, &cli.keypair, gauge, owner.as_deref(), cli.json).await?;
        }
        Commands::FarmInfo { gauge } => {
            cmd_farm_info(&cli.rpc_url, gauge, cli.json).await?;
        }
        Commands::MyPositions => {
            cmd_my_positions(&cli.rpc_url, &cli.keypair, cli.json).await?;
        }
    }

    Ok(())
}

// ─── init-farm ────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
async fn cmd_init_farm(
    rpc_url: &str,
    keypair_path: &str,
    pool: &str,
    gauge: &str,
    staking_token: &str,
    reward_token: &str,
    token_a: &str,
    token_b: &str,
    gauge_program: &str,
    router_program: &str,
    factory_program: &str,
    stable: bool,
    json_output: bool,
) -> Result<()> {
    let payer = load_keypair(keypair_path)?;
    let config = FarmConfig {
        pool:            parse_pubkey(pool, "pool")?,
        gauge:           parse_pubkey(gauge, "gauge")?,
        staking_token:   parse_pubkey(staking_token, "staking token mint")?,
        reward_token:    parse_pubkey(reward_token, "reward token mint")?,
        token_a_mint:    parse_pubkey(token_a, "token A mint")?,
        token_b_mint:    parse_pubkey(token_b, "token B mint")?,
        gauge_program:   parse_pubkey(gauge_program, "gauge program")?,
        router_program:  parse_pubkey(router_program, "router program")?,
        factory_program: parse_pubkey(factory_program, "factory program")?,
        stable,
    };
    let gauge_key = config.gauge;

    let sig = client(rpc_url)
        .initialize_farm(&payer, config)
        .await
        .context("initialize_farm failed")?;

    if json_output {
        println!("{}", json!({
            "status": "ok", "command": "init-farm",
            "signature": sig.to_string(),
            "gauge": gauge_key.to_string(),
            "stable": stable,
        }));
    } else {
        println!("─── Farm Registered ──────────────────────────────────────────────");
        println!("  Gauge      {gauge_key}");
        println!("  Variant    {}", if stable { "stable" } else { "volatile" });
        println!("  Signature  {sig}");
    }
    Ok(())
}

// ─── deposit ──────────────────────────────────────────────────────────────────

async fn cmd_deposit(
    rpc_url: &str,
    keypair_path: &str,
    gauge: &str,
    mint: &str,
    amount: u64,
    json_output: bool,
) -> Result<()> {
    if amount == 0 {
        return Err(anyhow!("--amount must be greater than zero"));
    }
    let payer = load_keypair(keypair_path)?;
    let params = DepositParams {
        gauge:      parse_pubkey(gauge, "gauge")?,
        asset_mint: parse_pubkey(mint, "mint")?,
        amount,
    };

    let result = client(rpc_url)
        .deposit(&payer, params)
        .await
        .context("deposit failed")?;

    if json_output {
        println!("{}", json!({
            "status": "ok", "command": "deposit",
            "signature": result.signature,
            "farm":      result.farm.to_string(),
            "position":  result.position.to_string(),
            "amount":    amount,
            "fast_path": result.fast_path,
        }));
    } else {
        println!("─── Deposit ──────────────────────────────────────────────────────");
        println!("  Farm       {}", result.farm);
        println!("  Position   {}", result.position);
        println!("  Amount     {amount}");
        println!("  Path       {}", if result.fast_path { "fast (LP token staked as-is)" } else { "routed (split + swap + join)" });
        println!("  Signature  {}", result.signature);
    }
    Ok(())
}

// ─── harvest ──────────────────────────────────────────────────────────────────

async fn cmd_harvest(
    rpc_url: &str,
    keypair_path: &str,
    gauge: &str,
    json_output: bool,
) -> Result<()> {
    let caller = load_keypair(keypair_path)?;
    let gauge_key = parse_pubkey(gauge, "gauge")?;

    let result = client(rpc_url)
        .harvest(&caller, &gauge_key)
        .await
        .context("harvest failed")?;

    if json_output {
        println!("{}", json!({
            "status": "ok", "command": "harvest",
            "signature": result.signature,
            "farm":      result.farm.to_string(),
        }));
    } else {
        println!("─── Harvest ──────────────────────────────────────────────────────");
        println!("  Farm       {}", result.farm);
        println!("  Signature  {}", result.signature);
    }
    Ok(())
}

// ─── withdraw ─────────────────────────────────────────────────────────────────

async fn cmd_withdraw(
    rpc_url: &str,
    keypair_path: &str,
    gauge: &str,
    json_output: bool,
) -> Result<()> {
    let payer = load_keypair(keypair_path)?;
    let gauge_key = parse_pubkey(gauge, "gauge")?;

    let result = client(rpc_url)
        .withdraw(&payer, &gauge_key)
        .await
        .context("withdraw failed")?;

    if json_output {
        println!("{}", json!({
            "status": "ok", "command": "withdraw",
            "signature": result.signature,
            "farm":      result.farm.to_string(),
            "position":  result.position.to_string(),
        }));
    } else {
        println!("─── Withdraw ─────────────────────────────────────────────────────");
        println!("  Farm       {}", result.farm);
        println!("  Position   {} (emptied)", result.position);
        println!("  Signature  {}", result.signature);
    }
    Ok(())
}

// ─── pending ──────────────────────────────────────────────────────────────────

async fn cmd_pending(
    rpc_url: &str,
    keypair_path: &str,
    gauge: &str,
    owner: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let gauge_key = parse_pubkey(gauge, "gauge")?;
    let owner_key = match owner {
        Some(o) => parse_pubkey(o, "owner")?,
        None => load_keypair(keypair_path)?.pubkey(),
    };

    let pending = client(rpc_url)
        .pending_reward(&gauge_key, &owner_key)
        .await
        .context("pending query failed")?;

    if json_output {
        println!("{}", json!({
            "status": "ok", "command": "pending",
            "gauge":   gauge_key.to_string(),
            "owner":   owner_key.to_string(),
            "pending": pending,
        }));
    } else {
        println!("─── Pending Reward ───────────────────────────────────────────────");
        println!("  Gauge    {gauge_key}");
        println!("  Owner    {owner_key}");
        println!("  Pending  {pending} (LP-share units, as of last accrual)");
    }
    Ok(())
}

// ─── farm-info ────────────────────────────────────────────────────────────────

async fn cmd_farm_info(rpc_url: &str, gauge: &str, json_output: bool) -> Result<()> {
    let gauge_key = parse_pubkey(gauge, "gauge")?;

    let info = client(rpc_url)
        .farm_info(&gauge_key)
        .await
        .context("farm-info query failed")?;

    if json_output {
        println!("{}", json!({
            "status": "ok", "command": "farm-info",
            "farm":                 info.farm.to_string(),
            "pool":                 info.pool.to_string(),
            "gauge":                info.gauge.to_string(),
            "staking_token":        info.staking_token.to_string(),
            "reward_token":         info.reward_token.to_string(),
            "token_a":              info.token_a.to_string(),
            "token_b":              info.token_b.to_string(),
            "stable":               info.stable,
            "total_shares":         info.total_shares,
            "reward_index":         info.reward_index.to_string(),
            "reward_vault_balance": info.reward_vault_balance,
        }));
    } else {
        println!("─── Farm Info ────────────────────────────────────────────────────");
        println!("  Farm           {}", info.farm);
        println!("  Pool           {}", info.pool);
        println!("  Gauge          {}", info.gauge);
        println!("  Staking token  {}", info.staking_token);
        println!("  Reward token   {}", info.reward_token);
        println!("  Constituents   {} / {}", info.token_a, info.token_b);
        println!("  Variant        {}", if info.stable { "stable" } else { "volatile" });
        println!("  Total shares   {:>20}", info.total_shares);
        println!("  Reward index   {:>39}", info.reward_index);
        println!("  Reward backlog {:>20}", info.reward_vault_balance);
    }
    Ok(())
}

// ─── my-positions ─────────────────────────────────────────────────────────────

async fn cmd_my_positions(rpc_url: &str, keypair_path: &str, json_output: bool) -> Result<()> {
    let payer = load_keypair(keypair_path)?;

    let positions = client(rpc_url)
        .my_positions(&payer.pubkey())
        .await
        .context("position query failed")?;

    if positions.is_empty() {
        if json_output {
            println!("{}", json!({
                "status": "ok", "command": "my-positions",
                "owner": payer.pubkey().to_string(), "positions": [],
            }));
        } else {
            println!("─── My Positions ─────────────────────────────────────────────────");
            println!("  Owner   {}", payer.pubkey());
            println!();
            println!("  No farm positions found.");
            println!("  Run `zap-farm deposit --gauge <GAUGE> --mint <MINT> --amount <AMT>` to start.");
        }
        return Ok(());
    }

    if json_output {
        let items: Vec<_> = positions.iter().map(|p| json!({
            "position":       p.address.to_string(),
            "farm":           p.farm.to_string(),
            "amount":         p.amount,
            "pending_reward": p.pending_reward,
        })).collect();
        println!("{}", json!({
            "status": "ok", "command": "my-positions",
            "owner": payer.pubkey().to_string(), "positions": items,
        }));
    } else {
        println!("─── My Positions ─────────────────────────────────────────────────");
        println!("  Owner   {}", payer.pubkey());
        println!();
        for (i, p) in positions.iter().enumerate() {
            println!("  [{i:>2}]  Position  {}", p.address);
            println!("        Farm      {}", p.farm);
            println!("        Shares    {:>20}", p.amount);
            println!("        Pending   {:>20}", p.pending_reward);
            println!();
        }
        println!("  Total: {} position(s)  ·  run `harvest` to compound rewards", positions.len());
    }
    Ok(())
}
