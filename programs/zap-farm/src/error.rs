use anchor_lang::prelude::*;

#[error_code]
pub enum FarmError {
    #[msg("Amount must be greater than zero")]
    ZeroAmount,
    #[msg("No trading route for the requested token pair")]
    NoRoute,
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Pending reward computed negative — accrual ordering violated")]
    NegativePending,
    #[msg("Reward is pending but no zap parameters were supplied")]
    ZapParamsRequired,
    #[msg("Zap produced zero liquidity shares")]
    ZapProducedNothing,
    #[msg("Token mint does not match farm configuration")]
    TokenMismatch,
    #[msg("Account does not belong to this farm")]
    FarmMismatch,
    #[msg("Position has no shares to withdraw")]
    InsufficientShares,
}
