use anchor_lang::prelude::*;

// ─── Farm ──────────────────────────────────────────────────────────────────
// One farm per supported pool/gauge pair. All collaborator identities are
// bound once at initialization and never reassigned; the farm-authority PDA
// owns the vaults and signs every CPI into the gauge and router.
#[account]
pub struct Farm {
    /// PDA that owns lp_vault and reward_vault
    pub authority: Pubkey,          // 32
    pub authority_bump: u8,         // 1
    /// The two-token liquidity pool this farm compounds into
    pub pool: Pubkey,               // 32
    /// Staking facility custodying LP shares and accruing reward
    pub gauge: Pubkey,              // 32
    /// The pool's LP token — the only asset deposited without conversion
    pub staking_token: Pubkey,      // 32
    /// Reward token the gauge pays out
    pub reward_token: Pubkey,       // 32
    /// The pool's two constituent tokens
    pub token_a: Pubkey,            // 32
    pub token_b: Pubkey,            // 32
    /// Stable or volatile pricing curve for `pool` itself
    pub stable: bool,               // 1
    /// Program owning `gauge`
    pub gauge_program: Pubkey,      // 32
    /// Routing facility used for swaps and liquidity adds
    pub router_program: Pubkey,     // 32
    /// Pair registry queried for route discovery (off-chain)
    pub factory_program: Pubkey,    // 32
    /// Farm-owned LP token account (zap output, unstake destination)
    pub lp_vault: Pubkey,           // 32
    /// Farm-owned reward token account (get_reward destination)
    pub reward_vault: Pubkey,       // 32
    /// Sum of all Position.amount for this farm
    pub total_shares: u64,          // 8
    /// Cumulative reward (LP-share units) per staked share, 1e18 fixed-point.
    /// Never decreases.
    pub reward_index: u128,         // 16
    pub bump: u8,                   // 1
}

impl Farm {
    // 8 discriminator + 32+1 + 32*6 + 1 + 32*5 + 8 + 16 + 1 = 419
    pub const LEN: usize = 419;
}

// ─── Position ──────────────────────────────────────────────────────────────
// One user's stake in a single farm. Created zeroed on first deposit and
// reset to zero on full withdrawal; never closed, so the PDA stays a valid
// key for future deposits.
#[account]
pub struct Position {
    pub owner: Pubkey,              // 32
    pub farm: Pubkey,               // 32
    /// LP shares attributed to this user
    pub amount: u64,                // 8
    /// Reward already priced into `amount`, index-scale (1e18).
    /// pending = amount * reward_index / SCALE - reward_debt
    pub reward_debt: u128,          // 16
    pub bump: u8,                   // 1
}

impl Position {
    // 8 + 32+32+8+16+1 = 97
    pub const LEN: usize = 97;
}
