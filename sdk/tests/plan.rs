//! End-to-end planning over raw account bytes: build on-chain-shaped
//! buffers, parse them, and run the zap planner the way the client does.

use solana_sdk::pubkey::Pubkey;
use zap_farm_sdk::math::plan_zap;
use zap_farm_sdk::state::{parse_farm, parse_pair, parse_token_amount};
use zap_farm_sdk::types::{LegRoute, ZapPlan};
use zap_farm_sdk::Error;

fn put_pubkey(buf: &mut [u8], offset: usize, key: &Pubkey) {
    buf[offset..offset + 32].copy_from_slice(key.as_ref());
}

/// A Farm account image with the given mint wiring; every other field is a
/// fresh unique key, counters zeroed.
fn farm_bytes(staking_token: &Pubkey, token_a: &Pubkey, token_b: &Pubkey, stable: bool) -> Vec<u8> {
    let mut buf = vec![0u8; 419];
    put_pubkey(&mut buf, 8, &Pubkey::new_unique()); // authority
    put_pubkey(&mut buf, 41, &Pubkey::new_unique()); // pool
    put_pubkey(&mut buf, 73, &Pubkey::new_unique()); // gauge
    put_pubkey(&mut buf, 105, staking_token);
    put_pubkey(&mut buf, 137, &Pubkey::new_unique()); // reward token
    put_pubkey(&mut buf, 169, token_a);
    put_pubkey(&mut buf, 201, token_b);
    buf[233] = stable as u8;
    put_pubkey(&mut buf, 234, &Pubkey::new_unique()); // gauge program
    put_pubkey(&mut buf, 266, &Pubkey::new_unique()); // router program
    put_pubkey(&mut buf, 298, &Pubkey::new_unique()); // factory program
    put_pubkey(&mut buf, 330, &Pubkey::new_unique()); // lp vault
    put_pubkey(&mut buf, 362, &Pubkey::new_unique()); // reward vault
    buf
}

fn pair_bytes(mint_a: &Pubkey, mint_b: &Pubkey, stable: bool) -> Vec<u8> {
    let mut buf = vec![0u8; 137];
    put_pubkey(&mut buf, 8, mint_a);
    put_pubkey(&mut buf, 40, mint_b);
    put_pubkey(&mut buf, 72, &Pubkey::new_unique()); // vault a
    put_pubkey(&mut buf, 104, &Pubkey::new_unique()); // vault b
    buf[136] = stable as u8;
    buf
}

fn token_account_bytes(amount: u64) -> Vec<u8> {
    let mut buf = vec![0u8; 165];
    buf[64..72].copy_from_slice(&amount.to_le_bytes());
    buf
}

fn leg_from_pair(input_mint: &Pubkey, pair_addr: Pubkey, data: &[u8], reserves: (u64, u64)) -> LegRoute {
    let pair = parse_pair(data).unwrap();
    let (vault_in, vault_out, reserve_in, reserve_out) = if pair.token_a_mint == *input_mint {
        (pair.token_a_vault, pair.token_b_vault, reserves.0, reserves.1)
    } else {
        (pair.token_b_vault, pair.token_a_vault, reserves.1, reserves.0)
    };
    LegRoute { pair: pair_addr, stable: pair.stable, vault_in, vault_out, reserve_in, reserve_out }
}

#[test]
fn routed_deposit_plans_from_parsed_state() {
    let input = Pubkey::new_unique();
    let token_a = Pubkey::new_unique();
    let token_b = Pubkey::new_unique();
    let farm = parse_farm(&farm_bytes(&Pubkey::new_unique(), &token_a, &token_b, false)).unwrap();

    let reserve = parse_token_amount(&token_account_bytes(10_000_000)).unwrap();
    assert_eq!(reserve, 10_000_000);

    // Leg A trades through a stable pair, leg B through a volatile one;
    // the pair data is oriented with the input mint second.
    let pair_a_addr = Pubkey::new_unique();
    let pair_b_addr = Pubkey::new_unique();
    let pair_a = pair_bytes(&token_a, &input, true);
    let pair_b = pair_bytes(&input, &token_b, false);

    let leg_a = leg_from_pair(&input, pair_a_addr, &pair_a, (reserve, reserve));
    let leg_b = leg_from_pair(&input, pair_b_addr, &pair_b, (reserve, reserve));
    assert!(leg_a.stable);
    assert!(!leg_b.stable);

    let plan = plan_zap(&input, &farm, 1_000_000, Some(leg_a), Some(leg_b)).unwrap();
    let ZapPlan::Routed { params, route_accounts } = plan else {
        panic!("expected a routed plan");
    };

    assert!(params.stable_a);
    assert!(!params.stable_b);
    assert_eq!(route_accounts.len(), 6);
    assert_eq!(route_accounts[0], pair_a_addr);
    assert_eq!(route_accounts[3], pair_b_addr);
    assert_eq!(params.route_len, 6);

    // Half of 1_000_000 against 10M/10M reserves quotes just under 500_000;
    // the stable leg keeps at most 97% of it, the volatile leg 99.5%.
    assert!(params.min_out_a as u128 * 10_000 <= 500_000u128 * 9_700);
    assert!(params.min_out_b as u128 * 10_000 <= 500_000u128 * 9_950);
    assert!(params.min_out_a > 0 && params.min_out_b > 0);
    assert!(params.min_add_a <= params.min_out_a);
    assert!(params.min_add_b <= params.min_out_b);
}

#[test]
fn lp_token_deposit_needs_no_routes() {
    let lp = Pubkey::new_unique();
    let farm = parse_farm(&farm_bytes(&lp, &Pubkey::new_unique(), &Pubkey::new_unique(), true)).unwrap();
    assert!(matches!(plan_zap(&lp, &farm, 42, None, None), Ok(ZapPlan::FastPath)));
}

#[test]
fn unroutable_asset_is_rejected_before_submission() {
    let input = Pubkey::new_unique();
    let farm = parse_farm(&farm_bytes(
        &Pubkey::new_unique(),
        &Pubkey::new_unique(),
        &Pubkey::new_unique(),
        false,
    ))
    .unwrap();
    assert!(matches!(
        plan_zap(&input, &farm, 1_000, None, None),
        Err(Error::NoRoute(_, _))
    ));
}
