//! SDK error type.

use solana_sdk::pubkey::Pubkey;

/// All errors returned by the Zap-Farm SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── RPC / network ────────────────────────────────────────────────────────
    /// A Solana JSON-RPC call failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    // ── Farm / route discovery ───────────────────────────────────────────────
    /// No farm account exists for the given gauge.
    #[error("Farm not found for gauge {0}")]
    FarmNotFound(Pubkey),

    /// Neither a stable- nor a volatile-variant pair exists for the leg.
    #[error("No route from {0} to {1} — no pair in either variant")]
    NoRoute(Pubkey, Pubkey),

    /// The discovered pair has empty reserves and cannot be quoted.
    #[error("Pair has no liquidity — cannot quote the swap")]
    NoLiquidity,

    // ── Validation ───────────────────────────────────────────────────────────
    /// Deposit amount of zero, rejected before anything is submitted.
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("Integer overflow in quote / slippage math")]
    MathOverflow,

    // ── Account parsing ──────────────────────────────────────────────────────
    /// Raw account bytes could not be deserialized.
    #[error("Account parse error at offset {offset}: {reason}")]
    ParseError { offset: usize, reason: String },
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
