//! On-chain account deserialization.
//!
//! Parses raw account bytes for `Farm` (419 bytes), `Position` (97 bytes),
//! and the slice of the external factory's pair account the route planner
//! needs. Byte offsets mirror the Anchor `#[account]` layouts exactly.

use solana_sdk::pubkey::Pubkey;
use crate::error::{Error, Result};

// ─── Farm ─────────────────────────────────────────────────────────────────────

/// Deserialized `Farm` account state.
///
/// Layout (after 8-byte Anchor discriminator):
/// ```text
/// authority(32) authority_bump(1) pool(32) gauge(32) staking_token(32)
/// reward_token(32) token_a(32) token_b(32) stable(1) gauge_program(32)
/// router_program(32) factory_program(32) lp_vault(32) reward_vault(32)
/// total_shares(8) reward_index(16) bump(1) = 419 bytes
/// ```
#[derive(Debug, Clone)]
pub struct FarmState {
    pub authority:       Pubkey,
    pub pool:            Pubkey,
    pub gauge:           Pubkey,
    pub staking_token:   Pubkey,
    pub reward_token:    Pubkey,
    pub token_a:         Pubkey,
    pub token_b:         Pubkey,
    pub stable:          bool,
    pub gauge_program:   Pubkey,
    pub router_program:  Pubkey,
    pub factory_program: Pubkey,
    pub lp_vault:        Pubkey,
    pub reward_vault:    Pubkey,
    pub total_shares:    u64,
    /// Cumulative reward (LP-share units) per staked share, 1e18 fixed-point.
    pub reward_index:    u128,
}

/// Deserialize a `Farm` account from raw bytes.
pub fn parse_farm(data: &[u8]) -> Result<FarmState> {
    const EXPECTED: usize = 419;
    if data.len() < EXPECTED {
        return Err(Error::ParseError {
            offset: 0,
            reason: format!("Farm account is {} bytes; expected {}", data.len(), EXPECTED),
        });
    }
    Ok(FarmState {
        authority:       read_pubkey(data, 8)?,
        pool:            read_pubkey(data, 41)?,
        gauge:           read_pubkey(data, 73)?,
        staking_token:   read_pubkey(data, 105)?,
        reward_token:    read_pubkey(data, 137)?,
        token_a:         read_pubkey(data, 169)?,
        token_b:         read_pubkey(data, 201)?,
        stable:          data[233] != 0,
        gauge_program:   read_pubkey(data, 234)?,
        router_program:  read_pubkey(data, 266)?,
        factory_program: read_pubkey(data, 298)?,
        lp_vault:        read_pubkey(data, 330)?,
        reward_vault:    read_pubkey(data, 362)?,
        total_shares:    read_u64(data, 394)?,
        reward_index:    read_u128(data, 402)?,
    })
}

// ─── Position ─────────────────────────────────────────────────────────────────

/// Deserialized `Position` account state.
///
/// Layout (after 8-byte Anchor discriminator):
/// ```text
/// owner(32) farm(32) amount(8) reward_debt(16) bump(1) = 97 bytes
/// ```
#[derive(Debug, Clone)]
pub struct PositionState {
    pub owner:       Pubkey,
    pub farm:        Pubkey,
    /// LP shares attributed to this position.
    pub amount:      u64,
    /// Reward already priced into `amount`, index-scale (1e18).
    pub reward_debt: u128,
}

/// Deserialize a `Position` account from raw bytes.
pub fn parse_position(data: &[u8]) -> Result<PositionState> {
    const EXPECTED: usize = 97;
    if data.len() < EXPECTED {
        return Err(Error::ParseError {
            offset: 0,
            reason: format!("Position account is {} bytes; expected {}", data.len(), EXPECTED),
        });
    }
    Ok(PositionState {
        owner:       read_pubkey(data, 8)?,
        farm:        read_pubkey(data, 40)?,
        amount:      read_u64(data, 72)?,
        reward_debt: read_u128(data, 80)?,
    })
}

// ─── Factory pair ─────────────────────────────────────────────────────────────

/// The slice of the factory's pair account the route planner reads.
///
/// Layout (after 8-byte discriminator):
/// ```text
/// token_a_mint(32) token_b_mint(32) token_a_vault(32) token_b_vault(32)
/// stable(1) …
/// ```
#[derive(Debug, Clone)]
pub struct PairState {
    pub token_a_mint:  Pubkey,
    pub token_b_mint:  Pubkey,
    pub token_a_vault: Pubkey,
    pub token_b_vault: Pubkey,
    pub stable:        bool,
}

/// Deserialize the planner-visible prefix of a pair account.
pub fn parse_pair(data: &[u8]) -> Result<PairState> {
    const EXPECTED: usize = 137;
    if data.len() < EXPECTED {
        return Err(Error::ParseError {
            offset: 0,
            reason: format!("Pair account is {} bytes; need at least {}", data.len(), EXPECTED),
        });
    }
    Ok(PairState {
        token_a_mint:  read_pubkey(data, 8)?,
        token_b_mint:  read_pubkey(data, 40)?,
        token_a_vault: read_pubkey(data, 72)?,
        token_b_vault: read_pubkey(data, 104)?,
        stable:        data[136] != 0,
    })
}

// ─── SPL token account ────────────────────────────────────────────────────────

/// Read the `amount` field from a packed SPL token account.
///
/// Token account layout: `mint(32) owner(32) amount(8) …`
pub fn parse_token_amount(data: &[u8]) -> Result<u64> {
    if data.len() < 72 {
        return Err(Error::ParseError {
            offset: 64,
            reason: format!("Token account is {} bytes; need at least 72", data.len()),
        });
    }
    read_u64(data, 64)
}

// ─── Byte-slice primitives ────────────────────────────────────────────────────

pub(crate) fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey> {
    let b: [u8; 32] = data[offset..offset + 32]
        .try_into()
        .map_err(|_| Error::ParseError {
            offset,
            reason: "slice too short for Pubkey (32 bytes)".into(),
        })?;
    Ok(Pubkey::from(b))
}

pub(crate) fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let b: [u8; 8] = data[offset..offset + 8]
        .try_into()
        .map_err(|_| Error::ParseError { offset, reason: "slice too short for u64".into() })?;
    Ok(u64::from_le_bytes(b))
}

pub(crate) fn read_u128(data: &[u8], offset: usize) -> Result<u128> {
    let b: [u8; 16] = data[offset..offset + 16]
        .try_into()
        .map_err(|_| Error::ParseError { offset, reason: "slice too short for u128".into() })?;
    Ok(u128::from_le_bytes(b))
}
