use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};
use crate::{constants::*, error::FarmError, state::{Farm, Position}};
use super::harvest::accrue_staking_reward;
use super::reward_math::credit;
use super::zap::{split_half, GaugeCpi, RouterCpi, ZapParams};

// ─── Handler ───────────────────────────────────────────────────────────────
/// Deposit an arbitrary asset into the farm.
///
/// Sequence: accrue pending gauge reward first (ordering rule — credit must
/// never read a stale index), then either stake the asset directly when it
/// already is the pool's LP token (fast path, no routing, no slippage), or
/// zap it through the router and stake the produced shares.
///
/// Remaining accounts: first `reward_zap.route_len` accounts are the reward
/// zap's route, the rest belong to the deposit zap.
pub fn handler<'info>(
    ctx: Context<'_, '_, '_, 'info, Deposit<'info>>,
    amount: u64,
    reward_zap: Option<ZapParams>,
    zap: Option<ZapParams>,
) -> Result<()> {
    require!(amount > 0, FarmError::ZeroAmount);

    let farm_key = ctx.accounts.farm.key();
    let authority_bump = ctx.accounts.farm.authority_bump;
    let staking_token = ctx.accounts.farm.staking_token;
    let seeds: &[&[u8]] = &[FARM_AUTHORITY_SEED, farm_key.as_ref(), &[authority_bump]];
    let signer = &[seeds];

    let reward_route_len = reward_zap.map(|z| z.route_len as usize).unwrap_or(0);
    require!(
        ctx.remaining_accounts.len() >= reward_route_len,
        FarmError::NoRoute
    );
    let (reward_routes, zap_routes) = ctx.remaining_accounts.split_at(reward_route_len);

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
        reward_routes,
        reward_zap.as_ref(),
        signer,
    )?;

    let gauge_cpi = GaugeCpi {
        gauge_program: &ctx.accounts.gauge_program.to_account_info(),
        gauge: &ctx.accounts.gauge.to_account_info(),
        gauge_stake_vault: &ctx.accounts.gauge_stake_vault.to_account_info(),
        authority: &ctx.accounts.farm_authority.to_account_info(),
        token_program: &ctx.accounts.token_program.to_account_info(),
    };

    let shares = if ctx.accounts.user_asset.mint == staking_token {
        // Fast path: the asset already is the pool's LP token. Stake it
        // unchanged — shares == amount exactly, zero conversion loss.
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_asset.to_account_info(),
                    to: ctx.accounts.lp_vault.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            amount,
        )?;
        gauge_cpi.deposit(&ctx.accounts.lp_vault.to_account_info(), amount, signer)?;
        amount
    } else {
        let params = zap.as_ref().ok_or(FarmError::ZapParamsRequired)?;

        // Move the asset into farm custody, then swap-and-add atomically.
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_asset.to_account_info(),
                    to: ctx.accounts.input_vault.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            amount,
        )?;

        ctx.accounts.lp_vault.reload()?;
        let lp_before = ctx.accounts.lp_vault.amount;

        let (half_a, half_b) = split_half(amount);
        let input_vault_info = ctx.accounts.input_vault.to_account_info();
        let lp_vault_info = ctx.accounts.lp_vault.to_account_info();
        let router_cpi = RouterCpi {
            router_program: &ctx.accounts.router_program.to_account_info(),
            authority: &ctx.accounts.farm_authority.to_account_info(),
            input_vault: &input_vault_info,
            lp_vault: &lp_vault_info,
            token_program: &ctx.accounts.token_program.to_account_info(),
            route_accounts: zap_routes,
        };
        router_cpi.zap_in(half_a, half_b, params, signer)?;

        ctx.accounts.lp_vault.reload()?;
        let produced = ctx
            .accounts
            .lp_vault
            .amount
            .checked_sub(lp_before)
            .ok_or(FarmError::MathOverflow)?;
        require!(produced > 0, FarmError::ZapProducedNothing);

        gauge_cpi.deposit(&ctx.accounts.lp_vault.to_account_info(), produced, signer)?;
        produced
    };

    // Attribute the freshly staked shares to the user.
    {
        let pos = &mut ctx.accounts.position;
        if pos.amount == 0 && pos.owner == Pubkey::default() {
            pos.owner = ctx.accounts.user.key();
            pos.farm = farm_key;
            pos.reward_debt = 0;
            pos.bump = ctx.bumps.position;
        }
    }
    credit(&mut ctx.accounts.farm, &mut ctx.accounts.position, shares)?;

    msg!(
        "Deposit: amount={} shares={} total_shares={}",
        amount,
        shares,
        ctx.accounts.farm.total_shares
    );
    Ok(())
}

#[derive(Accounts)]
pub struct Deposit<'info> {
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
        init_if_needed,
        payer = user,
        space = Position::LEN,
        seeds = [POSITION_SEED, farm.key().as_ref(), user.key().as_ref()],
        bump,
    )]
    pub position: Account<'info, Position>,

    /// Token account the user deposits from; its mint decides the fast path
    #[account(
        mut,
        constraint = user_asset.owner == user.key(),
    )]
    pub user_asset: Box<Account<'info, TokenAccount>>,

    /// Farm-authority-owned staging vault for the asset being converted
    #[account(
        mut,
        constraint = input_vault.owner == farm_authority.key() @ FarmError::FarmMismatch,
        constraint = input_vault.mint == user_asset.mint @ FarmError::TokenMismatch,
    )]
    pub input_vault: Box<Account<'info, TokenAccount>>,

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
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}
