//! Off-chain quote, split, and slippage math.
//!
//! Mirrors the program's ledger arithmetic for read-side pending-reward
//! queries, and computes the slippage-protected minimums enforced on-chain
//! during a zap. All division is floor division on purpose: minimums round
//! down, never up.

use crate::error::{Error, Result};
use crate::state::FarmState;
use crate::types::{LegRoute, ZapParams, ZapPlan};
use solana_sdk::pubkey::Pubkey;

/// Reward-index fixed-point scale, identical to the on-chain constant.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Tolerated slippage for a stable-variant pair, in basis points.
pub const STABLE_SLIPPAGE_BPS: u64 = 300;
/// Tolerated slippage for a volatile-variant pair, in basis points.
pub const VOLATILE_SLIPPAGE_BPS: u64 = 50;

const BPS_DENOMINATOR: u128 = 10_000;

// ─── Ledger mirror ────────────────────────────────────────────────────────────

/// Pending reward for a position, computed the same way the program does:
/// `amount * reward_index / SCALE - reward_debt`, saturating at zero on the
/// read side rather than erroring.
pub fn pending_reward(amount: u64, reward_debt: u128, reward_index: u128) -> u64 {
    let entitled = scaled_debt(amount, reward_index);
    let pending = entitled.saturating_sub(reward_debt);
    u64::try_from(pending).unwrap_or(u64::MAX)
}

/// `amount * index / SCALE` without intermediate overflow: split the index
/// into its whole and fractional parts and divide the fraction first.
fn scaled_debt(amount: u64, index: u128) -> u128 {
    let amount = amount as u128;
    let q = index / SCALE;
    let r = index % SCALE;
    amount * q + amount * r / SCALE
}

// ─── Zap planning ─────────────────────────────────────────────────────────────

/// Which pair variant to route through, given which variants the factory
/// has for the mint pair. Stable is preferred, volatile is the fallback,
/// neither means the leg has no route.
pub fn choose_variant(stable_exists: bool, volatile_exists: bool) -> Option<bool> {
    if stable_exists {
        Some(true)
    } else if volatile_exists {
        Some(false)
    } else {
        None
    }
}

/// Size of the reward conversion: everything already sitting in the reward
/// vault (carry-forward) plus what the gauge would pay out right now. The
/// program zaps the post-claim vault balance, so minimums must be planned
/// from this sum, not from the vault balance alone — after every prior
/// accrual the vault is drained and its balance says nothing about the
/// next claim.
pub fn reward_conversion_input(carried: u64, claimable: u64) -> u64 {
    carried.saturating_add(claimable)
}

/// Split an input amount into the two swap legs. Floor halving: the second
/// leg gets `amount / 2`, the first leg gets the rest, so an odd unit always
/// lands on the first leg and the two sides sum back to `amount`.
pub fn split_input(amount: u64) -> (u64, u64) {
    let half_b = amount / 2;
    (amount - half_b, half_b)
}

/// Minimum acceptable output for a quoted swap: `quote * (1 - bps/10_000)`,
/// floored. Stable pairs tolerate 3%, volatile pairs 0.5%.
pub fn min_after_slippage(quote: u64, stable: bool) -> Result<u64> {
    let bps = if stable { STABLE_SLIPPAGE_BPS } else { VOLATILE_SLIPPAGE_BPS };
    let min = (quote as u128)
        .checked_mul(BPS_DENOMINATOR - bps as u128)
        .ok_or(Error::MathOverflow)?
        / BPS_DENOMINATOR;
    u64::try_from(min).map_err(|_| Error::MathOverflow)
}

/// Constant-product spot quote for `amount_in` against the pair's reserves.
/// Fees are ignored here; the slippage tolerance absorbs them.
pub fn quote_swap(amount_in: u64, reserve_in: u64, reserve_out: u64) -> Result<u64> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(Error::NoLiquidity);
    }
    let out = (amount_in as u128)
        .checked_mul(reserve_out as u128)
        .ok_or(Error::MathOverflow)?
        / (reserve_in as u128 + amount_in as u128);
    u64::try_from(out).map_err(|_| Error::MathOverflow)
}

/// Plan the conversion of `amount` of `input_mint` into the farm's staked
/// LP token.
///
/// Fast path: the input already is the LP token, so there is nothing to
/// route. Otherwise both legs must resolve — either as an identity leg
/// (input == leg token, no swap) or through a discovered pair. A leg that
/// is neither is a routing failure the caller surfaces before anything is
/// submitted.
pub fn plan_zap(
    input_mint: &Pubkey,
    farm: &FarmState,
    amount: u64,
    leg_a: Option<LegRoute>,
    leg_b: Option<LegRoute>,
) -> Result<ZapPlan> {
    if amount == 0 {
        return Err(Error::ZeroAmount);
    }
    if *input_mint == farm.staking_token {
        return Ok(ZapPlan::FastPath);
    }

    let (half_a, half_b) = split_input(amount);
    let mut route_accounts = Vec::new();

    let (stable_a, min_out_a) =
        plan_leg(input_mint, &farm.token_a, half_a, leg_a, &mut route_accounts)?;
    let (stable_b, min_out_b) =
        plan_leg(input_mint, &farm.token_b, half_b, leg_b, &mut route_accounts)?;

    // The add-liquidity step trades against the target pool itself, so its
    // minimums take the pool's own variant tolerance on top of the swap
    // output floor.
    let min_add_a = min_after_slippage(min_out_a, farm.stable)?;
    let min_add_b = min_after_slippage(min_out_b, farm.stable)?;

    let route_len =
        u8::try_from(route_accounts.len()).map_err(|_| {
            Error::InvalidArgument("route spans too many accounts".into())
        })?;

    Ok(ZapPlan::Routed {
        params: ZapParams {
            stable_a,
            stable_b,
            min_out_a,
            min_out_b,
            min_add_a,
            min_add_b,
            route_len,
        },
        route_accounts,
    })
}

/// Resolve one leg: identity legs pass the half through untouched; routed
/// legs get a reserve quote with the pair variant's slippage floor applied.
fn plan_leg(
    input_mint: &Pubkey,
    leg_mint: &Pubkey,
    half: u64,
    route: Option<LegRoute>,
    route_accounts: &mut Vec<Pubkey>,
) -> Result<(bool, u64)> {
    if input_mint == leg_mint {
        return Ok((false, half));
    }
    let route = route.ok_or(Error::NoRoute(*input_mint, *leg_mint))?;
    let quote = quote_swap(half, route.reserve_in, route.reserve_out)?;
    let min_out = min_after_slippage(quote, route.stable)?;
    route_accounts.push(route.pair);
    route_accounts.push(route.vault_in);
    route_accounts.push(route.vault_out);
    Ok((route.stable, min_out))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn farm(staking_token: Pubkey, token_a: Pubkey, token_b: Pubkey, stable: bool) -> FarmState {
        FarmState {
            authority: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            gauge: Pubkey::new_unique(),
            staking_token,
            reward_token: Pubkey::new_unique(),
            token_a,
            token_b,
            stable,
            gauge_program: Pubkey::new_unique(),
            router_program: Pubkey::new_unique(),
            factory_program: Pubkey::new_unique(),
            lp_vault: Pubkey::new_unique(),
            reward_vault: Pubkey::new_unique(),
            total_shares: 0,
            reward_index: 0,
        }
    }

    fn leg(stable: bool, reserve_in: u64, reserve_out: u64) -> LegRoute {
        LegRoute {
            pair: Pubkey::new_unique(),
            stable,
            vault_in: Pubkey::new_unique(),
            vault_out: Pubkey::new_unique(),
            reserve_in,
            reserve_out,
        }
    }

    #[test]
    fn split_conserves_amount_and_favors_first_leg() {
        for amount in [1u64, 2, 3, 100, 101, u64::MAX] {
            let (a, b) = split_input(amount);
            assert_eq!(a + b, amount);
            assert!(a == b || a == b + 1);
        }
    }

    #[test]
    fn slippage_minimums_stay_within_tolerance() {
        for quote in [1u64, 33, 100, 101, 9_999, 1_000_000_000_000] {
            let stable = min_after_slippage(quote, true).unwrap();
            let volatile = min_after_slippage(quote, false).unwrap();
            // 97% and 99.5% of nominal, never above.
            assert!(stable as u128 * 10_000 <= quote as u128 * 9_700);
            assert!(volatile as u128 * 10_000 <= quote as u128 * 9_950);
            // Floor only shaves a single denominator's worth.
            assert!(stable as u128 * 10_000 + 10_000 > quote as u128 * 9_700);
            assert!(volatile as u128 * 10_000 + 10_000 > quote as u128 * 9_950);
            assert!(stable <= volatile);
        }
    }

    #[test]
    fn quote_rejects_empty_reserves() {
        assert!(matches!(quote_swap(100, 0, 1_000), Err(Error::NoLiquidity)));
        assert!(matches!(quote_swap(100, 1_000, 0), Err(Error::NoLiquidity)));
    }

    #[test]
    fn lp_token_input_takes_the_fast_path() {
        let lp = Pubkey::new_unique();
        let farm = farm(lp, Pubkey::new_unique(), Pubkey::new_unique(), false);
        let plan = plan_zap(&lp, &farm, 12_345, None, None).unwrap();
        assert!(matches!(plan, ZapPlan::FastPath));
    }

    #[test]
    fn missing_route_on_either_leg_fails_closed() {
        let input = Pubkey::new_unique();
        let farm = farm(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            false,
        );
        let err = plan_zap(&input, &farm, 1_000, None, Some(leg(false, 10_000, 10_000)));
        assert!(matches!(err, Err(Error::NoRoute(_, _))));
        let err = plan_zap(&input, &farm, 1_000, Some(leg(false, 10_000, 10_000)), None);
        assert!(matches!(err, Err(Error::NoRoute(_, _))));
    }

    #[test]
    fn zero_amount_is_rejected_before_routing() {
        let lp = Pubkey::new_unique();
        let farm = farm(lp, Pubkey::new_unique(), Pubkey::new_unique(), false);
        assert!(matches!(
            plan_zap(&lp, &farm, 0, None, None),
            Err(Error::ZeroAmount)
        ));
    }

    #[test]
    fn identity_leg_passes_the_half_through() {
        let input = Pubkey::new_unique();
        let token_b = Pubkey::new_unique();
        let farm = farm(Pubkey::new_unique(), input, token_b, false);
        let plan = plan_zap(
            &input,
            &farm,
            1_001,
            None,
            Some(leg(false, 1_000_000, 1_000_000)),
        )
        .unwrap();
        let ZapPlan::Routed { params, route_accounts } = plan else {
            panic!("expected a routed plan");
        };
        // Leg A is the input itself: full half, no route accounts for it.
        assert_eq!(params.min_out_a, 501);
        assert_eq!(route_accounts.len(), 3);
        assert_eq!(params.route_len, 3);
        // Leg B got quoted and floored below its half.
        assert!(params.min_out_b < 500);
    }

    #[test]
    fn stable_route_uses_the_wider_tolerance() {
        let input = Pubkey::new_unique();
        let farm = farm(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            true,
        );
        let reserves = 1_000_000_000u64;
        let routed = |stable| {
            plan_zap(
                &input,
                &farm,
                100_000,
                Some(leg(stable, reserves, reserves)),
                Some(leg(stable, reserves, reserves)),
            )
            .unwrap()
        };
        let (ZapPlan::Routed { params: stable, .. }, ZapPlan::Routed { params: volatile, .. }) =
            (routed(true), routed(false))
        else {
            panic!("expected routed plans");
        };
        assert!(stable.stable_a && stable.stable_b);
        assert!(!volatile.stable_a && !volatile.stable_b);
        assert!(stable.min_out_a < volatile.min_out_a);
        assert!(stable.min_out_b < volatile.min_out_b);
    }

    #[test]
    fn routed_plan_carries_both_legs_accounts() {
        let input = Pubkey::new_unique();
        let farm = farm(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            false,
        );
        let plan = plan_zap(
            &input,
            &farm,
            2_000_000,
            Some(leg(true, 5_000_000, 5_000_000)),
            Some(leg(false, 5_000_000, 5_000_000)),
        )
        .unwrap();
        let ZapPlan::Routed { params, route_accounts } = plan else {
            panic!("expected a routed plan");
        };
        assert_eq!(route_accounts.len(), 6);
        assert_eq!(params.route_len, 6);
        assert!(params.stable_a);
        assert!(!params.stable_b);
        assert!(params.min_add_a <= params.min_out_a);
        assert!(params.min_add_b <= params.min_out_b);
    }

    #[test]
    fn stable_variant_is_preferred_when_both_exist() {
        assert_eq!(choose_variant(true, true), Some(true));
        assert_eq!(choose_variant(true, false), Some(true));
        assert_eq!(choose_variant(false, true), Some(false));
        assert_eq!(choose_variant(false, false), None);
    }

    #[test]
    fn reward_plan_sized_from_claimable_keeps_real_minimums() {
        // The reward vault is drained by every accrual, so between harvests
        // its balance is 0. Sizing the plan from carried + claimable must
        // still produce binding minimums for the amount actually claimed.
        let claimable = 1_000_000u64;
        let input = reward_conversion_input(0, claimable);
        assert_eq!(input, claimable);

        let reward_mint = Pubkey::new_unique();
        let farm = farm(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            false,
        );
        let reserves = 100_000_000u64;
        let plan = plan_zap(
            &reward_mint,
            &farm,
            input,
            Some(leg(false, reserves, reserves)),
            Some(leg(false, reserves, reserves)),
        )
        .unwrap();
        let ZapPlan::Routed { params, .. } = plan else {
            panic!("expected a routed plan");
        };
        // Minimums scale with the claimable amount instead of collapsing
        // to zero the way a stale vault-balance quote would.
        assert!(params.min_out_a > claimable / 2 * 9 / 10);
        assert!(params.min_out_b > claimable / 2 * 9 / 10);
        assert!(params.min_add_a > 0 && params.min_add_b > 0);

        assert_eq!(reward_conversion_input(u64::MAX, 1), u64::MAX);
    }

    #[test]
    fn pending_matches_the_ledger_formula() {
        // One share, index one whole unit: pending is exactly one.
        assert_eq!(pending_reward(1, 0, SCALE), 1);
        // Debt subtracts off what was already checkpointed.
        assert_eq!(pending_reward(100, 40 * SCALE, SCALE), 60);
        // Fractional index floors.
        assert_eq!(pending_reward(3, 0, SCALE / 2), 1);
        // Stale-read underflow saturates instead of wrapping.
        assert_eq!(pending_reward(1, 10 * SCALE, SCALE), 0);
    }

    #[test]
    fn pending_survives_large_magnitudes() {
        let amount = u64::MAX;
        let index = 1_000 * SCALE + SCALE / 3;
        let expected = amount as u128 * 1_000 + amount as u128 * (SCALE / 3) / SCALE;
        assert_eq!(
            pending_reward(amount, 0, index) as u128,
            expected.min(u64::MAX as u128)
        );
    }
}
