use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};
use crate::error::FarmError;

// ─── Collaborator interfaces ───────────────────────────────────────────────
// The gauge and router are external programs. Their instructions are built
// by hand (anchor discriminator + little-endian args) and invoked with the
// farm-authority PDA as signer. Every CPI is all-or-nothing: a failure in
// the router or gauge aborts the whole enclosing instruction, so no partial
// swap or half-updated ledger record can survive.
//
// Gauge account order:  [authority(s), gauge(w), gauge_stake_vault(w),
//                        farm vault(w), token_program]
// Router account order: [authority(s), input_vault(w), lp_vault(w),
//                        token_program] ++ route accounts (pass-through)

/// Slippage-protected zap execution parameters, computed off-chain by the
/// SDK from router quotes. The per-leg input amounts are NOT part of the
/// params: the program splits the actual vault balance at execution time,
/// so the minimums bind whatever amount really arrives.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default)]
pub struct ZapParams {
    /// Route variant per leg (stable preferred at discovery time)
    pub stable_a: bool,
    pub stable_b: bool,
    /// Minimum swap output per leg
    pub min_out_a: u64,
    pub min_out_b: u64,
    /// Minimum amounts accepted by the liquidity add
    pub min_add_a: u64,
    pub min_add_b: u64,
    /// How many of the transaction's remaining accounts belong to this
    /// zap's route (deposit carries two zaps in one instruction)
    pub route_len: u8,
}

/// Floor split with the odd unit absorbed into leg A.
pub fn split_half(amount: u64) -> (u64, u64) {
    let half = amount / 2;
    (amount - half, half)
}

// sha256("global:deposit")[..8]
const GAUGE_DEPOSIT_DISC: [u8; 8] = [242, 35, 198, 137, 82, 225, 242, 182];
// sha256("global:withdraw")[..8]
const GAUGE_WITHDRAW_DISC: [u8; 8] = [183, 18, 70, 156, 148, 109, 161, 34];
// sha256("global:get_reward")[..8]
const GAUGE_GET_REWARD_DISC: [u8; 8] = [221, 63, 124, 201, 96, 218, 238, 29];
// sha256("global:zap_in")[..8]
const ROUTER_ZAP_IN_DISC: [u8; 8] = [134, 212, 191, 106, 64, 48, 237, 107];

// ─── Gauge ─────────────────────────────────────────────────────────────────

/// Accounts shared by every gauge CPI.
pub struct GaugeCpi<'a, 'info> {
    pub gauge_program: &'a AccountInfo<'info>,
    pub gauge: &'a AccountInfo<'info>,
    pub gauge_stake_vault: &'a AccountInfo<'info>,
    /// Farm-authority PDA — signs via seeds
    pub authority: &'a AccountInfo<'info>,
    pub token_program: &'a AccountInfo<'info>,
}

impl<'a, 'info> GaugeCpi<'a, 'info> {
    fn invoke(
        &self,
        disc: [u8; 8],
        amount: Option<u64>,
        farm_vault: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        let mut data = disc.to_vec();
        if let Some(amount) = amount {
            data.extend_from_slice(&amount.to_le_bytes());
        }

        let ix = Instruction {
            program_id: self.gauge_program.key(),
            accounts: vec![
                AccountMeta::new_readonly(self.authority.key(), true),
                AccountMeta::new(self.gauge.key(), false),
                AccountMeta::new(self.gauge_stake_vault.key(), false),
                AccountMeta::new(farm_vault.key(), false),
                AccountMeta::new_readonly(self.token_program.key(), false),
            ],
            data,
        };

        invoke_signed(
            &ix,
            &[
                self.authority.clone(),
                self.gauge.clone(),
                self.gauge_stake_vault.clone(),
                farm_vault.clone(),
                self.token_program.clone(),
                self.gauge_program.clone(),
            ],
            signer_seeds,
        )
        .map_err(Into::into)
    }

    /// Stake `amount` LP tokens from `lp_vault` into the gauge.
    pub fn deposit(
        &self,
        lp_vault: &AccountInfo<'info>,
        amount: u64,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        self.invoke(GAUGE_DEPOSIT_DISC, Some(amount), lp_vault, signer_seeds)
    }

    /// Unstake `amount` LP tokens from the gauge into `lp_vault`.
    pub fn withdraw(
        &self,
        lp_vault: &AccountInfo<'info>,
        amount: u64,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        self.invoke(GAUGE_WITHDRAW_DISC, Some(amount), lp_vault, signer_seeds)
    }

    /// Pull all accrued reward tokens into `reward_vault`. The amount
    /// received is observed by the caller as a vault balance delta.
    pub fn get_reward(
        &self,
        reward_vault: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        self.invoke(GAUGE_GET_REWARD_DISC, None, reward_vault, signer_seeds)
    }
}

// ─── Router ────────────────────────────────────────────────────────────────

/// Accounts for the router's atomic swap-and-add-liquidity call.
pub struct RouterCpi<'a, 'info> {
    pub router_program: &'a AccountInfo<'info>,
    /// Farm-authority PDA — owns both vaults, signs via seeds
    pub authority: &'a AccountInfo<'info>,
    /// Vault holding the asset being converted
    pub input_vault: &'a AccountInfo<'info>,
    /// Vault receiving the produced LP shares
    pub lp_vault: &'a AccountInfo<'info>,
    pub token_program: &'a AccountInfo<'info>,
    /// Discovered route: pair + vault accounts for each leg, forwarded
    /// verbatim from the transaction (writability preserved)
    pub route_accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> RouterCpi<'a, 'info> {
    /// Swap both halves along their routes and add the outputs as liquidity
    /// in one atomic router call. LP shares land in `lp_vault`.
    pub fn zap_in(
        &self,
        amount_a: u64,
        amount_b: u64,
        params: &ZapParams,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        require!(amount_a > 0 || amount_b > 0, FarmError::ZeroAmount);

        let mut data = ROUTER_ZAP_IN_DISC.to_vec();
        data.extend_from_slice(&amount_a.to_le_bytes());
        data.extend_from_slice(&amount_b.to_le_bytes());
        data.push(params.stable_a as u8);
        data.push(params.stable_b as u8);
        data.extend_from_slice(&params.min_out_a.to_le_bytes());
        data.extend_from_slice(&params.min_out_b.to_le_bytes());
        data.extend_from_slice(&params.min_add_a.to_le_bytes());
        data.extend_from_slice(&params.min_add_b.to_le_bytes());
        data.push(1u8); // add_liquidity

        let mut accounts = vec![
            AccountMeta::new_readonly(self.authority.key(), true),
            AccountMeta::new(self.input_vault.key(), false),
            AccountMeta::new(self.lp_vault.key(), false),
            AccountMeta::new_readonly(self.token_program.key(), false),
        ];
        accounts.extend(self.route_accounts.iter().map(|a| AccountMeta {
            pubkey: a.key(),
            is_signer: a.is_signer,
            is_writable: a.is_writable,
        }));

        let mut infos = vec![
            self.authority.clone(),
            self.input_vault.clone(),
            self.lp_vault.clone(),
            self.token_program.clone(),
        ];
        infos.extend(self.route_accounts.iter().cloned());
        infos.push(self.router_program.clone());

        let ix = Instruction {
            program_id: self.router_program.key(),
            accounts,
            data,
        };
        invoke_signed(&ix, &infos, signer_seeds).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::split_half;

    #[test]
    fn split_is_floor_with_remainder_to_leg_a() {
        assert_eq!(split_half(100), (50, 50));
        assert_eq!(split_half(101), (51, 50));
        assert_eq!(split_half(1), (1, 0));
        assert_eq!(split_half(0), (0, 0));
        let (a, b) = split_half(u64::MAX);
        assert_eq!(a as u128 + b as u128, u64::MAX as u128);
    }
}
