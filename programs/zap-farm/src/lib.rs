/// Zap-Farm — auto-compounding farm vault over gauge-staked liquidity pools.
///
/// 4 instructions:
///   initialize_farm — bind a pool/gauge/router/factory set to a new farm
///   deposit         — convert any asset to staked LP shares, credit the user
///   harvest         — pull gauge reward, compound it, advance the index
///   withdraw        — full exit: shares + accrued reward paid as LP tokens
///
/// Accounting is a reward-per-share index (1e18 fixed-point): the gauge's
/// reward token is zapped into more staked LP, and the produced shares are
/// distributed pro-rata to depositors without iterating positions.

// ─── Security contact ─────────────────────────────────────────────────────────

use solana_security_txt::security_txt;

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    name:             "Zap-Farm",
    project_url:      "https://github.com/zap-farm/zap-farm",
    contacts:         "email:security@zap-farm.dev",
    policy:           "Please report security vulnerabilities by email. \
                       We aim to respond within 48 hours.",
    source_code:      "https://github.com/zap-farm/zap-farm",
    preferred_languages: "en"
}

pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;

use anchor_lang::prelude::*;
pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("DQ3mJXAPGftrLELHcyTfN17yy2SKEEQ4WxxPPhFRKQXq");

#[program]
pub mod zap_farm {
    use super::*;

    /// Register a farm. Collaborator identities are fixed here for good.
    pub fn initialize_farm(ctx: Context<InitializeFarm>, stable: bool) -> Result<()> {
        initialize_farm::handler(ctx, stable)
    }

    /// Deposit `amount` of any asset. LP-token deposits take the fast path
    /// (no routing); anything else is zapped through the router first.
    /// Accrues pending gauge reward before crediting.
    pub fn deposit<'info>(
        ctx: Context<'_, '_, '_, 'info, Deposit<'info>>,
        amount: u64,
        reward_zap: Option<ZapParams>,
        zap: Option<ZapParams>,
    ) -> Result<()> {
        deposit::handler(ctx, amount, reward_zap, zap)
    }

    /// Compound accrued gauge reward into staked LP shares for everyone.
    pub fn harvest<'info>(
        ctx: Context<'_, '_, '_, 'info, Harvest<'info>>,
        reward_zap: Option<ZapParams>,
    ) -> Result<()> {
        harvest::handler(ctx, reward_zap)
    }

    /// Full withdrawal of the caller's position plus accrued reward.
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
        reward_zap: Option<ZapParams>,
    ) -> Result<()> {
        withdraw::handler(ctx, reward_zap)
    }
}
