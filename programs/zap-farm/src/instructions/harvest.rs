use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};
use crate::{constants::*, error::FarmError, state::Farm};
use super::reward_math::accrue_index;
use super::zap::{split_half, GaugeCpi, RouterCpi, ZapParams};

// ─── Accrual sequence ──────────────────────────────────────────────────────
// Shared by deposit, harvest, and withdraw; MUST run before any credit or
// debit in the same instruction. Sequence:
//   1. gauge.get_reward → reward tokens land in the farm's reward vault
//   2. zap the vault's ENTIRE balance to LP shares (whole balance, not the
//      delta, so reward stranded during a zero-share window carries forward);
//      a reward paid in the staked LP token itself skips the router and is
//      staked as-is
//   3. stake the produced shares back into the gauge
//   4. advance the reward index by the produced shares
// Returns the LP shares produced. With zero shares outstanding the reward
// stays in the vault untouched and the index does not move.
#[allow(clippy::too_many_arguments)]
pub(crate) fn accrue_staking_reward<'info>(
    farm: &mut Account<'info, Farm>,
    farm_authority: &AccountInfo<'info>,
    gauge_program: &AccountInfo<'info>,
    gauge: &AccountInfo<'info>,
    gauge_stake_vault: &AccountInfo<'info>,
    router_program: &AccountInfo<'info>,
    lp_vault: &mut Box<Account<'info, TokenAccount>>,
    reward_vault: &mut Box<Account<'info, TokenAccount>>,
    token_program: &AccountInfo<'info>,
    route_accounts: &[AccountInfo<'info>],
    reward_zap: Option<&ZapParams>,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    let gauge_cpi = GaugeCpi {
        gauge_program,
        gauge,
        gauge_stake_vault,
        authority: farm_authority,
        token_program,
    };

    gauge_cpi.get_reward(&reward_vault.to_account_info(), signer_seeds)?;
    reward_vault.reload()?;

    // Whole balance, including anything carried from a zero-share window.
    let reward = reward_vault.amount;
    if reward == 0 {
        return Ok(0);
    }
    if farm.total_shares == 0 {
        msg!("Accrue skipped: reward={} held with zero shares outstanding", reward);
        return Ok(0);
    }

    let produced = if farm.reward_token == farm.staking_token {
        // The gauge pays reward in the staked LP token itself: stake the
        // vault balance directly, no router involved.
        gauge_cpi.deposit(&reward_vault.to_account_info(), reward, signer_seeds)?;
        reward
    } else {
        let params = reward_zap.ok_or(FarmError::ZapParamsRequired)?;
        let lp_before = lp_vault.amount;

        let (half_a, half_b) = split_half(reward);
        let reward_vault_info = reward_vault.to_account_info();
        let lp_vault_info = lp_vault.to_account_info();
        let router_cpi = RouterCpi {
            router_program,
            authority: farm_authority,
            input_vault: &reward_vault_info,
            lp_vault: &lp_vault_info,
            token_program,
            route_accounts,
        };
        router_cpi.zap_in(half_a, half_b, params, signer_seeds)?;

        lp_vault.reload()?;
        let produced = lp_vault
            .amount
            .checked_sub(lp_before)
            .ok_or(FarmError::MathOverflow)?;
        require!(produced > 0, FarmError::ZapProducedNothing);

        gauge_cpi.deposit(&lp_vault.to_account_info(), produced, signer_seeds)?;
        produced
    };

    let delta = accrue_index(farm, produced)?;
    msg!("Accrued: reward={} shares={} index_delta={}", reward, produced, delta);
    Ok(produced)
}

// ─── Handler ───────────────────────────────────────────────────────────────
/// Pull accrued gauge reward, convert it to staked LP shares, and distribute
/// it across all positions via the reward index. Anyone may crank this.
pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Harvest<'info>>,
    reward_zap: Option<ZapParams>,
) -> Result<()> {
    let farm_key = ctx.accounts.farm.key();
    let authority_bump = ctx.accounts.farm.authority_bump;
    let seeds: &[&[u8]] = &[FARM_AUTHORITY_SEED, farm_key.as_ref(), &[authority_bump]];
    let signer = &[seeds];

    let produced = accrue_staking_reward(
        &mut ctx.accounts.farm,
        &ctx.accounts.farm_authority.to_account_info(),
        &ctx.accounts.gauge_program.to_account_info(),
        &ctx.accounts.gauge.to_account_info(),
        &ctx.accounts.gauge_stake_vault.to_account_info(),
        &ctx.accounts.router_program.to_account_info(),
        &mut ctx.accounts.lp_vault,
        &mut ctx.accounts.reward_vault,
        &ctx.accounts.token_program.to_account_info(),
        ctx.remaining_accounts,
        reward_zap.as_ref(),
        signer,
    )?;

    msg!(
        "Harvest: shares_added={} total_shares={} index={}",
        produced,
        ctx.accounts.farm.total_shares,
        ctx.accounts.farm.reward_index
    );
    Ok(())
}

#[derive(Accounts)]
pub struct Harvest<'info> {
    pub caller: Signer<'info>,

    #[account(mut)]
    pub farm: Account<'info, Farm>,

    /// CHECK: farm-authority PDA — owns the vaults, signs gauge/router CPIs
    #[account(
        seeds = [FARM_AUTHORITY_SEED, farm.key().as_ref()],
        bump = farm.authority_bump,
    )]
    pub farm_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = lp_vault.key() == farm.lp_vault @ FarmError::FarmMismatch,
    )]
    pub lp_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = reward_vault.key() == farm.reward_vault @ FarmError::FarmMismatch,
    )]
    pub reward_vault: Box<Account<'info, TokenAccount>>,

    /// CHECK: external staking facility, validated against farm config
    #[account(
        mut,
        constraint = gauge.key() == farm.gauge @ FarmError::FarmMismatch,
    )]
    pub gauge: UncheckedAccount<'info>,

    /// CHECK: gauge-owned stake vault, layout belongs to the gauge program
    #[account(mut)]
    pub gauge_stake_vault: UncheckedAccount<'info>,

    /// CHECK: program owning `gauge`
    #[account(constraint = gauge_program.key() == farm.gauge_program @ FarmError::FarmMismatch)]
    pub gauge_program: UncheckedAccount<'info>,

    /// CHECK: routing facility
    #[account(constraint = router_program.key() == farm.router_program @ FarmError::FarmMismatch)]
    pub router_program: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
}
