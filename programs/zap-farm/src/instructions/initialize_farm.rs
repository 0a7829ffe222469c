use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use crate::{constants::*, state::Farm};

/// Register a farm for a pool/gauge pair.
/// All collaborator identities are bound here, once — the farm never
/// reassigns them. The farm-authority PDA owns both vaults; no human key
/// controls custody. Any payer may register a farm for a gauge once.
pub fn handler(ctx: Context<InitializeFarm>, stable: bool) -> Result<()> {
    let farm = &mut ctx.accounts.farm;
    farm.authority = ctx.accounts.farm_authority.key();
    farm.authority_bump = ctx.bumps.farm_authority;
    farm.pool = ctx.accounts.pool.key();
    farm.gauge = ctx.accounts.gauge.key();
    farm.staking_token = ctx.accounts.staking_token.key();
    farm.reward_token = ctx.accounts.reward_token.key();
    farm.token_a = ctx.accounts.token_a_mint.key();
    farm.token_b = ctx.accounts.token_b_mint.key();
    farm.stable = stable;
    farm.gauge_program = ctx.accounts.gauge_program.key();
    farm.router_program = ctx.accounts.router_program.key();
    farm.factory_program = ctx.accounts.factory_program.key();
    farm.lp_vault = ctx.accounts.lp_vault.key();
    farm.reward_vault = ctx.accounts.reward_vault.key();
    farm.total_shares = 0;
    farm.reward_index = 0;
    farm.bump = ctx.bumps.farm;

    msg!(
        "Farm registered: pool={} gauge={} stable={}",
        farm.pool,
        farm.gauge,
        stable
    );
    Ok(())
}

#[derive(Accounts)]
pub struct InitializeFarm<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: external pool account, owned by the venue program
    pub pool: UncheckedAccount<'info>,

    /// CHECK: external gauge account, owned by `gauge_program`
    pub gauge: UncheckedAccount<'info>,

    /// The pool's LP mint — the only asset accepted without conversion
    pub staking_token: Account<'info, Mint>,

    /// Reward token the gauge pays out
    pub reward_token: Account<'info, Mint>,

    pub token_a_mint: Account<'info, Mint>,
    pub token_b_mint: Account<'info, Mint>,

    /// CHECK: program owning `gauge`
    pub gauge_program: UncheckedAccount<'info>,

    /// CHECK: routing facility program
    pub router_program: UncheckedAccount<'info>,

    /// CHECK: pair registry program (queried off-chain for routes)
    pub factory_program: UncheckedAccount<'info>,

    #[account(
        init,
        payer = payer,
        space = Farm::LEN,
        seeds = [FARM_SEED, gauge.key().as_ref()],
        bump,
    )]
    pub farm: Account<'info, Farm>,

    /// CHECK: farm-authority PDA — owns both vaults, holds no data
    #[account(
        seeds = [FARM_AUTHORITY_SEED, farm.key().as_ref()],
        bump,
    )]
    pub farm_authority: UncheckedAccount<'info>,

    #[account(
        init,
        payer = payer,
        token::mint = staking_token,
        token::authority = farm_authority,
    )]
    pub lp_vault: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = payer,
        token::mint = reward_token,
        token::authority = farm_authority,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}
