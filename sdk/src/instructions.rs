//! Low-level Anchor instruction builders.
//!
//! Each function constructs a [`solana_sdk::instruction::Instruction`] ready
//! for signing and submission.  Account order mirrors the Anchor
//! `#[derive(Accounts)]` structs in the on-chain program exactly.
//!
//! Anchor instruction discriminators: `sha256("global:{name}")[..8]`.

use crate::types::ZapParams;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    sysvar,
};
use std::str::FromStr;

// ─── Well-known program IDs ───────────────────────────────────────────────────

pub(crate) fn spl_token_id() -> Pubkey {
    Pubkey::from_str("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA").unwrap()
}

pub(crate) fn ata_program_id() -> Pubkey {
    Pubkey::from_str("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL").unwrap()
}

// ─── PDA seeds (mirrors programs/zap-farm/src/constants.rs) ──────────────────

pub const FARM_SEED:           &[u8] = b"farm";
pub const POSITION_SEED:       &[u8] = b"position";
pub const FARM_AUTHORITY_SEED: &[u8] = b"farm_authority";
/// Pair PDA seed used by the external factory program.
pub const PAIR_SEED:           &[u8] = b"pair";

// ─── PDA derivation helpers ───────────────────────────────────────────────────

/// Derive the farm PDA for a gauge.
pub fn derive_farm(gauge: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[FARM_SEED, gauge.as_ref()], program_id)
}

/// Derive the farm-authority PDA that owns the vaults and signs CPIs.
pub fn derive_farm_authority(farm: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[FARM_AUTHORITY_SEED, farm.as_ref()], program_id)
}

/// Derive the per-user position PDA for a farm.
pub fn derive_position(farm: &Pubkey, owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[POSITION_SEED, farm.as_ref(), owner.as_ref()],
        program_id,
    )
}

/// Derive a factory pair PDA. Mints are sorted the way the factory sorts
/// them; the variant byte distinguishes the stable pool from the volatile
/// one for the same mint pair.
pub fn derive_pair(
    mint_x: &Pubkey,
    mint_y: &Pubkey,
    stable: bool,
    factory_program: &Pubkey,
) -> (Pubkey, u8) {
    let (lo, hi) = if mint_x.to_bytes() <= mint_y.to_bytes() {
        (mint_x, mint_y)
    } else {
        (mint_y, mint_x)
    };
    Pubkey::find_program_address(
        &[PAIR_SEED, lo.as_ref(), hi.as_ref(), &[stable as u8]],
        factory_program,
    )
}

/// Derive the Associated Token Account for a wallet + mint.
pub fn derive_ata(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    let token_prog = spl_token_id();
    Pubkey::find_program_address(
        &[wallet.as_ref(), token_prog.as_ref(), mint.as_ref()],
        &ata_program_id(),
    )
    .0
}

// ─── Discriminator ────────────────────────────────────────────────────────────

fn disc(name: &str) -> [u8; 8] {
    let preimage = format!("global:{name}");
    let h = solana_sdk::hash::hash(preimage.as_bytes());
    h.to_bytes()[..8].try_into().unwrap()
}

// ─── Argument encoding ────────────────────────────────────────────────────────

/// Borsh-encode an `Option<ZapParams>` the way Anchor deserializes it:
/// a presence byte followed by the struct fields in declaration order.
fn encode_zap_params(data: &mut Vec<u8>, params: Option<&ZapParams>) {
    match params {
        None => data.push(0),
        Some(p) => {
            data.push(1);
            data.push(p.stable_a as u8);
            data.push(p.stable_b as u8);
            data.extend_from_slice(&p.min_out_a.to_le_bytes());
            data.extend_from_slice(&p.min_out_b.to_le_bytes());
            data.extend_from_slice(&p.min_add_a.to_le_bytes());
            data.extend_from_slice(&p.min_add_b.to_le_bytes());
            data.push(p.route_len);
        }
    }
}

fn route_metas(route_accounts: &[Pubkey]) -> impl Iterator<Item = AccountMeta> + '_ {
    route_accounts.iter().map(|k| AccountMeta::new(*k, false))
}

// ─── gauge get_reward (external program) ─────────────────────────────────────

/// Build the external gauge's `get_reward` instruction, account order
/// matching the program's own CPI: `[authority(s), gauge(w),
/// gauge_stake_vault(w), reward_vault(w), token_program]`.
///
/// Never submitted by the SDK — it is simulated (signature checks off) to
/// learn the claimable reward amount before planning the reward zap.
pub fn gauge_get_reward_ix(
    gauge_program:     &Pubkey,
    gauge:             &Pubkey,
    gauge_stake_vault: &Pubkey,
    farm_authority:    &Pubkey,
    reward_vault:      &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *gauge_program,
        accounts: vec![
            AccountMeta::new_readonly(*farm_authority,    true),
            AccountMeta::new(*gauge,                      false),
            AccountMeta::new(*gauge_stake_vault,          false),
            AccountMeta::new(*reward_vault,               false),
            AccountMeta::new_readonly(spl_token_id(),     false),
        ],
        data: disc("get_reward").to_vec(),
    }
}

// ─── initialize_farm ──────────────────────────────────────────────────────────

/// Accounts bound once at registration time for a farm.
pub struct FarmConfig {
    pub pool:            Pubkey,
    pub gauge:           Pubkey,
    pub staking_token:   Pubkey,
    pub reward_token:    Pubkey,
    pub token_a_mint:    Pubkey,
    pub token_b_mint:    Pubkey,
    pub gauge_program:   Pubkey,
    pub router_program:  Pubkey,
    pub factory_program: Pubkey,
    pub stable:          bool,
}

/// Build the `initialize_farm` instruction.
///
/// `lp_vault` and `reward_vault` must be fresh keypairs — they will be
/// initialised as SPL token accounts owned by the farm authority.  Both must
/// be included as additional signers when the transaction is submitted.
pub fn initialize_farm_ix(
    program_id:   &Pubkey,
    payer:        &Pubkey,
    config:       &FarmConfig,
    lp_vault:     &Pubkey,
    reward_vault: &Pubkey,
) -> Instruction {
    let (farm, _)           = derive_farm(&config.gauge, program_id);
    let (farm_authority, _) = derive_farm_authority(&farm, program_id);

    let mut data = disc("initialize_farm").to_vec();
    data.push(config.stable as u8);

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*payer,                          true), // mut + signer
            AccountMeta::new_readonly(config.pool,            false),
            AccountMeta::new_readonly(config.gauge,           false),
            AccountMeta::new_readonly(config.staking_token,   false),
            AccountMeta::new_readonly(config.reward_token,    false),
            AccountMeta::new_readonly(config.token_a_mint,    false),
            AccountMeta::new_readonly(config.token_b_mint,    false),
            AccountMeta::new_readonly(config.gauge_program,   false),
            AccountMeta::new_readonly(config.router_program,  false),
            AccountMeta::new_readonly(config.factory_program, false),
            AccountMeta::new(farm,                            false), // mut PDA (init)
            AccountMeta::new_readonly(farm_authority,         false),
            AccountMeta::new(*lp_vault,                       true),  // mut + signer (init)
            AccountMeta::new(*reward_vault,                   true),  // mut + signer (init)
            AccountMeta::new_readonly(spl_token_id(),         false),
            AccountMeta::new_readonly(Pubkey::default(),      false), // system program
            AccountMeta::new_readonly(sysvar::rent::ID,       false),
        ],
        data,
    }
}

// ─── deposit ──────────────────────────────────────────────────────────────────

/// Per-farm accounts every mutating instruction needs.
pub struct FarmAccounts {
    pub farm:             Pubkey,
    pub lp_vault:         Pubkey,
    pub reward_vault:     Pubkey,
    pub gauge:            Pubkey,
    pub gauge_stake_vault: Pubkey,
    pub gauge_program:    Pubkey,
    pub router_program:   Pubkey,
}

/// Build the `deposit` instruction.
///
/// `route_accounts` concatenates the reward-zap route (first
/// `reward_zap.route_len` entries) and the input-zap route; the program
/// splits them at that boundary.
#[allow(clippy::too_many_arguments)]
pub fn deposit_ix(
    program_id:     &Pubkey,
    user:           &Pubkey,
    accounts:       &FarmAccounts,
    user_asset:     &Pubkey,
    input_vault:    &Pubkey,
    amount:         u64,
    reward_zap:     Option<&ZapParams>,
    zap:            Option<&ZapParams>,
    route_accounts: &[Pubkey],
) -> Instruction {
    let (farm_authority, _) = derive_farm_authority(&accounts.farm, program_id);
    let (position, _)       = derive_position(&accounts.farm, user, program_id);

    let mut data = disc("deposit").to_vec();
    data.extend_from_slice(&amount.to_le_bytes());
    encode_zap_params(&mut data, reward_zap);
    encode_zap_params(&mut data, zap);

    let mut metas = vec![
        AccountMeta::new(*user,                              true),
        AccountMeta::new(accounts.farm,                      false),
        AccountMeta::new_readonly(farm_authority,            false),
        AccountMeta::new(position,                           false),
        AccountMeta::new(*user_asset,                        false),
        AccountMeta::new(*input_vault,                       false),
        AccountMeta::new(accounts.lp_vault,                  false),
        AccountMeta::new(accounts.reward_vault,              false),
        AccountMeta::new(accounts.gauge,                     false),
        AccountMeta::new(accounts.gauge_stake_vault,         false),
        AccountMeta::new_readonly(accounts.gauge_program,    false),
        AccountMeta::new_readonly(accounts.router_program,   false),
        AccountMeta::new_readonly(spl_token_id(),            false),
        AccountMeta::new_readonly(Pubkey::default(),         false), // system program
        AccountMeta::new_readonly(sysvar::rent::ID,          false),
    ];
    metas.extend(route_metas(route_accounts));

    Instruction { program_id: *program_id, accounts: metas, data }
}

// ─── harvest ──────────────────────────────────────────────────────────────────

/// Build the `harvest` instruction. Permissionless: any `caller` may crank.
pub fn harvest_ix(
    program_id:     &Pubkey,
    caller:         &Pubkey,
    accounts:       &FarmAccounts,
    reward_zap:     Option<&ZapParams>,
    route_accounts: &[Pubkey],
) -> Instruction {
    let (farm_authority, _) = derive_farm_authority(&accounts.farm, program_id);

    let mut data = disc("harvest").to_vec();
    encode_zap_params(&mut data, reward_zap);

    let mut metas = vec![
        AccountMeta::new_readonly(*caller,                   true),
        AccountMeta::new(accounts.farm,                      false),
        AccountMeta::new_readonly(farm_authority,            false),
        AccountMeta::new(accounts.lp_vault,                  false),
        AccountMeta::new(accounts.reward_vault,              false),
        AccountMeta::new(accounts.gauge,                     false),
        AccountMeta::new(accounts.gauge_stake_vault,         false),
        AccountMeta::new_readonly(accounts.gauge_program,    false),
        AccountMeta::new_readonly(accounts.router_program,   false),
        AccountMeta::new_readonly(spl_token_id(),            false),
    ];
    metas.extend(route_metas(route_accounts));

    Instruction { program_id: *program_id, accounts: metas, data }
}

// ─── withdraw ─────────────────────────────────────────────────────────────────

/// Build the `withdraw` instruction. Full exit: the whole position plus its
/// pending reward leaves as LP tokens to `user_lp`.
pub fn withdraw_ix(
    program_id:     &Pubkey,
    user:           &Pubkey,
    accounts:       &FarmAccounts,
    user_lp:        &Pubkey,
    reward_zap:     Option<&ZapParams>,
    route_accounts: &[Pubkey],
) -> Instruction {
    let (farm_authority, _) = derive_farm_authority(&accounts.farm, program_id);
    let (position, _)       = derive_position(&accounts.farm, user, program_id);

    let mut data = disc("withdraw").to_vec();
    encode_zap_params(&mut data, reward_zap);

    let mut metas = vec![
        AccountMeta::new(*user,                              true),
        AccountMeta::new(accounts.farm,                      false),
        AccountMeta::new_readonly(farm_authority,            false),
        AccountMeta::new(position,                           false),
        AccountMeta::new(*user_lp,                           false),
        AccountMeta::new(accounts.lp_vault,                  false),
        AccountMeta::new(accounts.reward_vault,              false),
        AccountMeta::new(accounts.gauge,                     false),
        AccountMeta::new(accounts.gauge_stake_vault,         false),
        AccountMeta::new_readonly(accounts.gauge_program,    false),
        AccountMeta::new_readonly(accounts.router_program,   false),
        AccountMeta::new_readonly(spl_token_id(),            false),
    ];
    metas.extend(route_metas(route_accounts));

    Instruction { program_id: *program_id, accounts: metas, data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_matches_anchor_preimage() {
        assert_eq!(disc("deposit"), [242, 35, 198, 137, 82, 225, 242, 182]);
        assert_eq!(disc("withdraw"), [183, 18, 70, 156, 148, 109, 161, 34]);
        assert_eq!(disc("harvest"), [228, 241, 31, 182, 53, 169, 59, 199]);
    }

    #[test]
    fn zap_params_encoding_is_borsh_shaped() {
        let mut none = Vec::new();
        encode_zap_params(&mut none, None);
        assert_eq!(none, vec![0]);

        let p = ZapParams {
            stable_a:  true,
            stable_b:  false,
            min_out_a: 1,
            min_out_b: 2,
            min_add_a: 3,
            min_add_b: 4,
            route_len: 6,
        };
        let mut some = Vec::new();
        encode_zap_params(&mut some, Some(&p));
        // tag + 2 bools + 4 u64s + route_len
        assert_eq!(some.len(), 1 + 2 + 32 + 1);
        assert_eq!(some[0], 1);
        assert_eq!(some[1], 1);
        assert_eq!(some[2], 0);
        assert_eq!(&some[3..11], &1u64.to_le_bytes());
        assert_eq!(*some.last().unwrap(), 6);
    }

    #[test]
    fn get_reward_builder_mirrors_the_cpi_shape() {
        let gauge_program = Pubkey::new_unique();
        let gauge = Pubkey::new_unique();
        let stake_vault = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let reward_vault = Pubkey::new_unique();
        let ix = gauge_get_reward_ix(&gauge_program, &gauge, &stake_vault, &authority, &reward_vault);

        // sha256("global:get_reward")[..8], same bytes the program embeds.
        assert_eq!(ix.data, vec![221, 63, 124, 201, 96, 218, 238, 29]);
        assert_eq!(ix.program_id, gauge_program);
        assert_eq!(ix.accounts[0].pubkey, authority);
        assert!(ix.accounts[0].is_signer);
        assert!(!ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[3].pubkey, reward_vault);
        assert!(ix.accounts[3].is_writable);
        assert_eq!(ix.accounts.len(), 5);
    }

    #[test]
    fn pair_derivation_is_mint_order_independent() {
        let factory = Pubkey::new_unique();
        let x = Pubkey::new_unique();
        let y = Pubkey::new_unique();
        assert_eq!(derive_pair(&x, &y, true, &factory), derive_pair(&y, &x, true, &factory));
        assert_ne!(derive_pair(&x, &y, true, &factory), derive_pair(&x, &y, false, &factory));
    }
}
