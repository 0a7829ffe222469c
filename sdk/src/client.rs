//! [`ZapFarmClient`] — the main entry point for integrations.

use std::collections::HashMap;
use std::str::FromStr;

use solana_account_decoder_client_types::UiAccountEncoding;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{
        RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSimulateTransactionAccountsConfig,
        RpcSimulateTransactionConfig,
    },
    rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType},
};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::hash,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};

use crate::{
    error::{Error, Result},
    instructions::{
        deposit_ix, derive_ata, derive_farm, derive_farm_authority, derive_pair,
        derive_position, gauge_get_reward_ix, harvest_ix, initialize_farm_ix, withdraw_ix,
        FarmAccounts, FarmConfig,
    },
    math::{choose_variant, pending_reward, plan_zap, reward_conversion_input},
    state::{parse_farm, parse_pair, parse_position, parse_token_amount, FarmState, PositionState},
    types::{
        DepositParams, DepositResult, FarmInfo, HarvestResult, LegRoute, PositionInfo,
        WithdrawResult, ZapParams, ZapPlan,
    },
};

// ─── Constants ────────────────────────────────────────────────────────────────

const DEFAULT_PROGRAM_ID: &str = "DQ3mJXAPGftrLELHcyTfN17yy2SKEEQ4WxxPPhFRKQXq";
const DEVNET_RPC:  &str = "https://api.devnet.solana.com";
const MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async Zap-Farm client for Solana.
///
/// ```rust,no_run
/// # use zap_farm_sdk::{ZapFarmClient, DepositParams};
/// # use solana_sdk::{pubkey::Pubkey, signature::Keypair};
/// # use std::str::FromStr;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ZapFarmClient::devnet();
/// let payer  = Keypair::new();
/// let gauge  = Pubkey::from_str("4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R")?;
/// let usdc   = Pubkey::from_str("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")?;
/// let result = client.deposit(&payer, DepositParams {
///     gauge, asset_mint: usdc, amount: 1_000_000,
/// }).await?;
/// println!("Deposited: {}", result.signature);
/// # Ok(())
/// # }
/// ```
pub struct ZapFarmClient {
    rpc_url:    String,
    program_id: Pubkey,
}

impl ZapFarmClient {
    /// Create a client pointing at any RPC endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url:    rpc_url.into(),
            program_id: Pubkey::from_str(DEFAULT_PROGRAM_ID).unwrap(),
        }
    }

    /// Pre-configured client for Solana devnet.
    pub fn devnet() -> Self {
        Self::new(DEVNET_RPC)
    }

    /// Pre-configured client for Solana mainnet-beta.
    pub fn mainnet() -> Self {
        Self::new(MAINNET_RPC)
    }

    /// Override the program ID (useful for locally deployed programs in tests).
    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    // ── Write operations ──────────────────────────────────────────────────────

    /// Register a farm for a gauge.
    ///
    /// Fresh keypairs for the LP and reward vaults are generated internally
    /// and signed with — no need to provide them.
    pub async fn initialize_farm(
        &self,
        payer:  &Keypair,
        config: FarmConfig,
    ) -> Result<Signature> {
        let rpc = self.rpc();

        let lp_vault     = Keypair::new();
        let reward_vault = Keypair::new();
        let ix = initialize_farm_ix(
            &self.program_id,
            &payer.pubkey(),
            &config,
            &lp_vault.pubkey(),
            &reward_vault.pubkey(),
        );
        self.sign_and_send(&rpc, &[ix], payer, &[&lp_vault, &reward_vault])
            .await
    }

    /// Deposit an asset into a farm.
    ///
    /// The asset is converted into the farm's staked LP token on-chain: the
    /// LP token itself passes straight through, anything else is split,
    /// routed through factory pairs discovered here, and joined as
    /// liquidity.  Fails before submission when either leg has no route.
    pub async fn deposit(
        &self,
        payer:  &Keypair,
        params: DepositParams,
    ) -> Result<DepositResult> {
        if params.amount == 0 {
            return Err(Error::ZeroAmount);
        }
        let rpc = self.rpc();
        let (farm_addr, farm) = self.fetch_farm(&rpc, &params.gauge).await?;
        let (farm_authority, _) = derive_farm_authority(&farm_addr, &self.program_id);
        let user = payer.pubkey();

        let (reward_zap, mut route_accounts) = self
            .plan_reward_zap(&rpc, &farm_addr, &farm, &user)
            .await?;
        let (zap, fast_path) = match self
            .plan_conversion(&rpc, &farm, &params.asset_mint, params.amount)
            .await?
        {
            ZapPlan::FastPath => (None, true),
            ZapPlan::Routed { params, route_accounts: route } => {
                route_accounts.extend(route);
                (Some(params), false)
            }
        };

        // On the fast path the staging vault is never read; the LP vault
        // satisfies its owner + mint constraints.
        let accounts = farm_accounts(&farm_addr, &farm);
        let input_vault = if fast_path {
            farm.lp_vault
        } else {
            derive_ata(&farm_authority, &params.asset_mint)
        };
        let ix = deposit_ix(
            &self.program_id,
            &user,
            &accounts,
            &derive_ata(&user, &params.asset_mint),
            &input_vault,
            params.amount,
            reward_zap.as_ref(),
            zap.as_ref(),
            &route_accounts,
        );
        let sig = self.sign_and_send(&rpc, &[ix], payer, &[]).await?;

        Ok(DepositResult {
            signature: sig.to_string(),
            farm:      farm_addr,
            position:  derive_position(&farm_addr, &user, &self.program_id).0,
            fast_path,
        })
    }

    /// Claim and compound the farm's gauge reward. Permissionless.
    pub async fn harvest(&self, caller: &Keypair, gauge: &Pubkey) -> Result<HarvestResult> {
        let rpc = self.rpc();
        let (farm_addr, farm) = self.fetch_farm(&rpc, gauge).await?;
        let (reward_zap, route_accounts) = self
            .plan_reward_zap(&rpc, &farm_addr, &farm, &caller.pubkey())
            .await?;

        let ix = harvest_ix(
            &self.program_id,
            &caller.pubkey(),
            &farm_accounts(&farm_addr, &farm),
            reward_zap.as_ref(),
            &route_accounts,
        );
        let sig = self.sign_and_send(&rpc, &[ix], caller, &[]).await?;

        Ok(HarvestResult { signature: sig.to_string(), farm: farm_addr })
    }

    /// Withdraw the caller's entire position plus pending reward as LP
    /// tokens. Partial withdrawals are not supported.
    pub async fn withdraw(&self, payer: &Keypair, gauge: &Pubkey) -> Result<WithdrawResult> {
        let rpc = self.rpc();
        let (farm_addr, farm) = self.fetch_farm(&rpc, gauge).await?;
        let user = payer.pubkey();
        let (reward_zap, route_accounts) = self
            .plan_reward_zap(&rpc, &farm_addr, &farm, &user)
            .await?;

        let ix = withdraw_ix(
            &self.program_id,
            &user,
            &farm_accounts(&farm_addr, &farm),
            &derive_ata(&user, &farm.staking_token),
            reward_zap.as_ref(),
            &route_accounts,
        );
        let sig = self.sign_and_send(&rpc, &[ix], payer, &[]).await?;

        Ok(WithdrawResult {
            signature: sig.to_string(),
            farm:      farm_addr,
            position:  derive_position(&farm_addr, &user, &self.program_id).0,
        })
    }

    // ── Read operations ───────────────────────────────────────────────────────

    /// Reward owed to `owner` in the given farm, as of the last on-chain
    /// accrual. Read-only: repeated calls return the same value until the
    /// index moves.
    pub async fn pending_reward(&self, gauge: &Pubkey, owner: &Pubkey) -> Result<u64> {
        let rpc = self.rpc();
        let (farm_addr, farm) = self.fetch_farm(&rpc, gauge).await?;
        let (position_addr, _) = derive_position(&farm_addr, owner, &self.program_id);

        let pos = match rpc.get_account_data(&position_addr).await {
            Ok(data) => parse_position(&data)?,
            Err(_) => return Ok(0),
        };
        Ok(pending_reward(pos.amount, pos.reward_debt, farm.reward_index))
    }

    /// Farm configuration, share totals, and live reward-vault balance.
    pub async fn farm_info(&self, gauge: &Pubkey) -> Result<FarmInfo> {
        let rpc = self.rpc();
        let (farm_addr, farm) = self.fetch_farm(&rpc, gauge).await?;
        let reward_vault_balance = rpc
            .get_account_data(&farm.reward_vault)
            .await
            .ok()
            .and_then(|d| parse_token_amount(&d).ok())
            .unwrap_or(0);

        Ok(FarmInfo {
            farm:          farm_addr,
            pool:          farm.pool,
            gauge:         farm.gauge,
            staking_token: farm.staking_token,
            reward_token:  farm.reward_token,
            token_a:       farm.token_a,
            token_b:       farm.token_b,
            stable:        farm.stable,
            total_shares:  farm.total_shares,
            reward_index:  farm.reward_index,
            reward_vault_balance,
        })
    }

    /// All positions owned by `owner` across every farm, with pending
    /// rewards computed against each farm's current index.
    pub async fn my_positions(&self, owner: &Pubkey) -> Result<Vec<PositionInfo>> {
        let rpc = self.rpc();
        let positions = self.fetch_positions(&rpc, owner).await?;

        // Batch-fetch unique farm accounts in one RPC call.
        let farm_keys: Vec<Pubkey> = {
            let mut v: Vec<Pubkey> = positions.iter().map(|(_, p)| p.farm).collect();
            v.sort();
            v.dedup();
            v
        };
        let farm_data = rpc.get_multiple_accounts(&farm_keys).await?;
        let farms: HashMap<Pubkey, FarmState> = farm_keys
            .iter()
            .zip(farm_data.iter())
            .filter_map(|(k, maybe)| {
                let acc = maybe.as_ref()?;
                parse_farm(&acc.data).ok().map(|f| (*k, f))
            })
            .collect();

        Ok(positions
            .into_iter()
            .map(|(addr, pos)| {
                let pending = farms
                    .get(&pos.farm)
                    .map(|f| pending_reward(pos.amount, pos.reward_debt, f.reward_index))
                    .unwrap_or(0);
                PositionInfo {
                    address:        addr,
                    farm:           pos.farm,
                    owner:          pos.owner,
                    amount:         pos.amount,
                    reward_debt:    pos.reward_debt,
                    pending_reward: pending,
                }
            })
            .collect())
    }

    // ── Route planning ────────────────────────────────────────────────────────

    /// Plan the conversion of `amount` of `input_mint` into the farm's
    /// staked LP token. Public so integrators can inspect minimums before
    /// submitting.
    pub async fn plan_conversion(
        &self,
        rpc:        &RpcClient,
        farm:       &FarmState,
        input_mint: &Pubkey,
        amount:     u64,
    ) -> Result<ZapPlan> {
        if *input_mint == farm.staking_token {
            return Ok(ZapPlan::FastPath);
        }
        let leg_a = self
            .find_leg_route(rpc, farm, input_mint, &farm.token_a)
            .await?;
        let leg_b = self
            .find_leg_route(rpc, farm, input_mint, &farm.token_b)
            .await?;
        plan_zap(input_mint, farm, amount, leg_a, leg_b)
    }

    /// Plan the reward-compounding zap. Sized from the vault's carried
    /// balance plus the gauge's claimable amount (learned by simulating
    /// `get_reward`), because the program zaps the post-claim balance —
    /// the vault alone is drained by every prior accrual and would quote
    /// near-zero minimums.
    async fn plan_reward_zap(
        &self,
        rpc:       &RpcClient,
        farm_addr: &Pubkey,
        farm:      &FarmState,
        payer:     &Pubkey,
    ) -> Result<(Option<ZapParams>, Vec<Pubkey>)> {
        let carried = rpc
            .get_account_data(&farm.reward_vault)
            .await
            .ok()
            .and_then(|d| parse_token_amount(&d).ok())
            .unwrap_or(0);
        let claimable = self
            .claimable_reward(rpc, farm_addr, farm, payer, carried)
            .await;
        let input = reward_conversion_input(carried, claimable);

        // With nothing to convert the program skips the zap entirely; send
        // no params so a surprise claim aborts instead of converting with
        // zero minimums.
        if input == 0 {
            return Ok((None, Vec::new()));
        }

        match self
            .plan_conversion(rpc, farm, &farm.reward_token, input)
            .await?
        {
            // Reward is the LP token itself: the program stakes it as-is.
            ZapPlan::FastPath => Ok((None, Vec::new())),
            ZapPlan::Routed { params, route_accounts } => {
                Ok((Some(params), route_accounts))
            }
        }
    }

    /// Reward the gauge would pay the farm right now: simulate `get_reward`
    /// (signature checks off — the farm authority is a PDA) and read the
    /// reward vault's post-simulation balance delta. Falls back to zero
    /// when the node cannot simulate; planned minimums then degrade to the
    /// carried balance rather than failing the whole operation.
    async fn claimable_reward(
        &self,
        rpc:       &RpcClient,
        farm_addr: &Pubkey,
        farm:      &FarmState,
        payer:     &Pubkey,
        carried:   u64,
    ) -> u64 {
        let (farm_authority, _) = derive_farm_authority(farm_addr, &self.program_id);
        let ix = gauge_get_reward_ix(
            &farm.gauge_program,
            &farm.gauge,
            &derive_ata(&farm.gauge, &farm.staking_token),
            &farm_authority,
            &farm.reward_vault,
        );
        let tx = Transaction::new_unsigned(Message::new(&[ix], Some(payer)));
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(CommitmentConfig::confirmed()),
            accounts: Some(RpcSimulateTransactionAccountsConfig {
                encoding: Some(UiAccountEncoding::Base64),
                addresses: vec![farm.reward_vault.to_string()],
            }),
            ..Default::default()
        };

        let Ok(sim) = rpc.simulate_transaction_with_config(&tx, config).await else {
            return 0;
        };
        if sim.value.err.is_some() {
            return 0;
        }
        let post = sim
            .value
            .accounts
            .and_then(|accounts| accounts.into_iter().next().flatten())
            .and_then(|ui| ui.decode::<Account>())
            .and_then(|acc| parse_token_amount(&acc.data).ok())
            .unwrap_or(0);
        post.saturating_sub(carried)
    }

    /// Discover the factory pair for one leg. Both variant PDAs are
    /// fetched in one call and [`choose_variant`] picks between them
    /// (stable preferred). `None` when the leg needs no swap or no pair
    /// exists in either variant.
    async fn find_leg_route(
        &self,
        rpc:        &RpcClient,
        farm:       &FarmState,
        input_mint: &Pubkey,
        leg_mint:   &Pubkey,
    ) -> Result<Option<LegRoute>> {
        if input_mint == leg_mint {
            return Ok(None);
        }
        let (stable_addr, _) = derive_pair(input_mint, leg_mint, true, &farm.factory_program);
        let (volatile_addr, _) = derive_pair(input_mint, leg_mint, false, &farm.factory_program);
        let fetched = rpc
            .get_multiple_accounts(&[stable_addr, volatile_addr])
            .await?;
        let parsed = |i: usize| {
            fetched[i]
                .as_ref()
                .and_then(|acc| parse_pair(&acc.data).ok())
        };
        let (stable_pair, volatile_pair) = (parsed(0), parsed(1));

        let Some(stable) = choose_variant(stable_pair.is_some(), volatile_pair.is_some()) else {
            return Ok(None);
        };
        let (pair_addr, pair) = if stable {
            (stable_addr, stable_pair.unwrap())
        } else {
            (volatile_addr, volatile_pair.unwrap())
        };

        let (vault_in, vault_out) = if pair.token_a_mint == *input_mint {
            (pair.token_a_vault, pair.token_b_vault)
        } else {
            (pair.token_b_vault, pair.token_a_vault)
        };
        let reserves = rpc.get_multiple_accounts(&[vault_in, vault_out]).await?;
        let read = |maybe: &Option<Account>| {
            maybe
                .as_ref()
                .and_then(|acc| parse_token_amount(&acc.data).ok())
                .unwrap_or(0)
        };
        Ok(Some(LegRoute {
            pair: pair_addr,
            stable,
            vault_in,
            vault_out,
            reserve_in: read(&reserves[0]),
            reserve_out: read(&reserves[1]),
        }))
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn rpc(&self) -> RpcClient {
        RpcClient::new_with_commitment(self.rpc_url.clone(), CommitmentConfig::confirmed())
    }

    async fn sign_and_send(
        &self,
        rpc:          &RpcClient,
        instructions: &[Instruction],
        payer:        &Keypair,
        extra:        &[&Keypair],
    ) -> Result<Signature> {
        let blockhash = rpc.get_latest_blockhash().await?;
        let mut signers: Vec<&dyn Signer> = vec![payer];
        signers.extend(extra.iter().map(|k| k as &dyn Signer));
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &signers,
            blockhash,
        );
        Ok(rpc.send_and_confirm_transaction(&tx).await?)
    }

    async fn fetch_farm(&self, rpc: &RpcClient, gauge: &Pubkey) -> Result<(Pubkey, FarmState)> {
        let (farm_addr, _) = derive_farm(gauge, &self.program_id);
        let data = rpc
            .get_account_data(&farm_addr)
            .await
            .map_err(|_| Error::FarmNotFound(*gauge))?;
        Ok((farm_addr, parse_farm(&data)?))
    }

    /// Fetch all `Position` accounts owned by `owner` via `getProgramAccounts`.
    async fn fetch_positions(
        &self,
        rpc:   &RpcClient,
        owner: &Pubkey,
    ) -> Result<Vec<(Pubkey, PositionState)>> {
        let disc = account_disc("Position");

        let config = RpcProgramAccountsConfig {
            filters: Some(vec![
                RpcFilterType::DataSize(97),
                RpcFilterType::Memcmp(Memcmp::new(
                    0,
                    MemcmpEncodedBytes::Bytes(disc.to_vec()),
                )),
                RpcFilterType::Memcmp(Memcmp::new(
                    8,
                    MemcmpEncodedBytes::Bytes(owner.to_bytes().to_vec()),
                )),
            ]),
            account_config: RpcAccountInfoConfig { ..Default::default() },
            ..Default::default()
        };

        let raw = rpc
            .get_program_accounts_with_config(&self.program_id, config)
            .await?;

        Ok(raw
            .into_iter()
            .filter_map(|(pk, acc)| parse_position(&acc.data).ok().map(|p| (pk, p)))
            .collect())
    }
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn farm_accounts(farm_addr: &Pubkey, farm: &FarmState) -> FarmAccounts {
    FarmAccounts {
        farm:              *farm_addr,
        lp_vault:          farm.lp_vault,
        reward_vault:      farm.reward_vault,
        gauge:             farm.gauge,
        gauge_stake_vault: derive_ata(&farm.gauge, &farm.staking_token),
        gauge_program:     farm.gauge_program,
        router_program:    farm.router_program,
    }
}

/// Anchor account discriminator: `sha256("account:{TypeName}")[..8]`.
fn account_disc(type_name: &str) -> [u8; 8] {
    let h = hash(format!("account:{type_name}").as_bytes());
    h.to_bytes()[..8].try_into().unwrap()
}
