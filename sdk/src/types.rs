//! Public parameter and result types.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

// ─── Zap planning ─────────────────────────────────────────────────────────────

/// Slippage-protected zap parameters, mirrored field-for-field from the
/// on-chain `ZapParams` instruction argument.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ZapParams {
    pub stable_a:  bool,
    pub stable_b:  bool,
    pub min_out_a: u64,
    pub min_out_b: u64,
    pub min_add_a: u64,
    pub min_add_b: u64,
    /// Number of route accounts belonging to this zap in the transaction's
    /// remaining accounts.
    pub route_len: u8,
}

/// A discovered route for one leg of a zap: the factory pair to trade
/// through plus its live reserves, oriented for the swap direction.
#[derive(Debug, Clone)]
pub struct LegRoute {
    pub pair:        Pubkey,
    /// Pair variant — stable pools are preferred at discovery time.
    pub stable:      bool,
    pub vault_in:    Pubkey,
    pub vault_out:   Pubkey,
    pub reserve_in:  u64,
    pub reserve_out: u64,
}

/// Outcome of planning a conversion.
#[derive(Debug, Clone)]
pub enum ZapPlan {
    /// The input already is the pool's LP token: stake it unchanged, no
    /// routing, no slippage math. Shares received == amount.
    FastPath,
    /// Swap both halves along discovered routes and add liquidity.
    Routed {
        params: ZapParams,
        /// Pair + vault accounts forwarded to the router, in order.
        route_accounts: Vec<Pubkey>,
    },
}

// ─── Client parameters ────────────────────────────────────────────────────────

/// Parameters for [`crate::ZapFarmClient::deposit`].
#[derive(Debug, Clone)]
pub struct DepositParams {
    /// Gauge identifying the farm.
    pub gauge:      Pubkey,
    /// Mint of the asset being deposited.
    pub asset_mint: Pubkey,
    /// Amount in atomic units. Must be nonzero.
    pub amount:     u64,
}

// ─── Client results ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DepositResult {
    pub signature: String,
    pub farm:      Pubkey,
    pub position:  Pubkey,
    /// True when the deposit took the LP-token fast path.
    pub fast_path: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestResult {
    pub signature: String,
    pub farm:      Pubkey,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawResult {
    pub signature: String,
    pub farm:      Pubkey,
    pub position:  Pubkey,
}

/// Farm state plus live vault balances.
#[derive(Debug, Clone, Serialize)]
pub struct FarmInfo {
    pub farm:                 Pubkey,
    pub pool:                 Pubkey,
    pub gauge:                Pubkey,
    pub staking_token:        Pubkey,
    pub reward_token:         Pubkey,
    pub token_a:              Pubkey,
    pub token_b:              Pubkey,
    pub stable:               bool,
    pub total_shares:         u64,
    pub reward_index:         u128,
    /// Reward tokens held but not yet compounded (carry-forward included).
    pub reward_vault_balance: u64,
}

/// One position with its ledger-pending reward.
#[derive(Debug, Clone, Serialize)]
pub struct PositionInfo {
    pub address:        Pubkey,
    pub farm:           Pubkey,
    pub owner:          Pubkey,
    pub amount:         u64,
    pub reward_debt:    u128,
    /// `amount * reward_index / SCALE - reward_debt`, as the ledger sees it.
    pub pending_reward: u64,
}
