/// PDA seeds
pub const FARM_SEED: &[u8] = b"farm";
pub const POSITION_SEED: &[u8] = b"position";
pub const FARM_AUTHORITY_SEED: &[u8] = b"farm_authority";

/// Fixed-point scale for the reward-per-share index (1e18)
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Denominator for basis-point math (u128 to avoid up-cast noise)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Slippage tolerance applied to stable-variant routes: 3.00 %
pub const STABLE_SLIPPAGE_BPS: u64 = 300;

/// Slippage tolerance applied to volatile-variant routes: 0.50 %
pub const VOLATILE_SLIPPAGE_BPS: u64 = 50;
