use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use crate::{constants::*, error::FarmError, state::{Farm, Position}};
use super::harvest::accrue_staking_reward;
use super::reward_math::debit;
use super::zap::{GaugeCpi, ZapParams};

// ─── Handler ───────────────────────────────────────────────────────────────
/// Full withdrawal: accrue pending gauge reward first, then pay out the
/// position's shares plus its accumulated reward shares as raw LP tokens.
/// No conversion on the way out — the user receives the pool's LP token.
/// The position account is zeroed, not closed; it stays valid for future
/// deposits.
pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    reward_zap: Option<ZapParams>,
) -> Result<()> {
    let farm_key = ctx.accounts.farm.key();
    let authority_bump = ctx.accounts.farm.authority_bump;
    let seeds: &[&[u8]] = &[FARM_AUTHORITY_SEED, farm_key.as_ref(), &[authority_bump]];
    let signer = &[seeds];

    accrue_staking_reward(
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

    let (shares, reward) = debit(&mut ctx.accounts.farm, &mut ctx.accounts.position)?;
    require!(shares > 0, FarmError::InsufficientShares);

    let total = shares.checked_add(reward).ok_or(FarmError::MathOverflow)?;

    let gauge_cpi = GaugeCpi {
        gauge_program: &ctx.accounts.gauge_program.to_account_info(),
        gauge: &ctx.accounts.gauge.to_account_info(),
        gauge_stake_vault: &ctx.accounts.gauge_stake_vault.to_account_info(),
        authority: &ctx.accounts.farm_authority.to_account_info(),
        token_program: &ctx.accounts.token_program.to_account_info(),
    };
    gauge_cpi.withdraw(&ctx.accounts.lp_vault.to_account_info(), total, signer)?;

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.lp_vault.to_account_info(),
                to: ctx.accounts.user_lp.to_account_info(),
                authority: ctx.accounts.farm_authority.to_account_info(),
            },
            signer,
        ),
        total,
    )?;

    msg!(
        "Withdraw: shares={} reward={} total_shares={}",
        shares,
        reward,
        ctx.accounts.farm.total_shares
    );
    Ok(())
}

#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

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
        seeds = [POSITION_SEED, farm.key().as_ref(), user.key().as_ref()],
        bump = position.bump,
        constraint = position.owner == user.key(),
        constraint = position.farm == farm.key() @ FarmError::FarmMismatch,
    )]
    pub position: Account<'info, Position>,

    /// Destination for the LP tokens being paid out
    #[account(
        mut,
        constraint = user_lp.mint == farm.staking_token @ FarmError::TokenMismatch,
        constraint = user_lp.owner == user.key(),
    )]
    pub user_lp: Box<Account<'info, TokenAccount>>,

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
