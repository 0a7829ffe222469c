//! Zap-Farm Rust SDK
//!
//! Auto-compounding farm vault client for Solana.
//! Deposit any routable asset, have it converted into the farm's staked LP
//! token on-chain, and let harvests fold gauge rewards back into the stake —
//! no Anchor dependency required.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use zap_farm_sdk::{ZapFarmClient, DepositParams};
//! use solana_sdk::{pubkey::Pubkey, signature::{Keypair, Signer}};
//! use std::str::FromStr;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ZapFarmClient::devnet();
//!     let keypair = Keypair::new(); // use your funded keypair
//!
//!     let gauge = Pubkey::from_str("4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R")?;
//!     let usdc  = Pubkey::from_str("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")?;
//!
//!     // 1. Deposit USDC — the SDK discovers routes for both pool legs and
//!     //    the program swaps + joins + stakes atomically
//!     let result = client.deposit(&keypair, DepositParams {
//!         gauge, asset_mint: usdc, amount: 1_000_000,
//!     }).await?;
//!     println!("Deposited! tx: {}  fast_path: {}", result.signature, result.fast_path);
//!
//!     // 2. Check what the position has earned so far
//!     let pending = client.pending_reward(&gauge, &keypair.pubkey()).await?;
//!     println!("Pending reward: {pending}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`ZapFarmClient::initialize_farm`] | Register a farm for a gauge |
//! | [`ZapFarmClient::deposit`] | Convert an asset into staked LP shares |
//! | [`ZapFarmClient::harvest`] | Claim + compound gauge rewards (permissionless) |
//! | [`ZapFarmClient::withdraw`] | Full exit: position + pending reward |
//! | [`ZapFarmClient::pending_reward`] | Reward owed as of the last accrual |
//! | [`ZapFarmClient::farm_info`] | Farm config, shares, reward-vault balance |
//! | [`ZapFarmClient::my_positions`] | All positions for an owner |

pub mod client;
pub mod error;
pub mod instructions;
pub mod math;
pub mod state;
pub mod types;

pub use client::ZapFarmClient;
pub use error::{Error, Result};
pub use types::*;
