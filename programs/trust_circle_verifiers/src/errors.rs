// programs/trust_circle_verifiers/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum VerifierPoolError {
    #[msg("Unauthorized: caller is not the pool owner")]
    NotOwner,

    #[msg("Pool ownership has already been transferred")]
    OwnershipLocked,

    #[msg("Invalid pool configuration")]
    InvalidPoolConfig,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Stake below minimum")]
    StakeBelowMinimum,

    #[msg("Recent verification pending")]
    RecentVerificationPending,

    #[msg("No active stake")]
    NoActiveStake,

    #[msg("Verifier stake is not eligible")]
    NotEligibleVerifier,

    #[msg("Slash amount exceeds stake")]
    SlashExceedsStake,

    #[msg("Invalid token account")]
    InvalidTokenAccount,

    #[msg("Insufficient balance")]
    InsufficientBalance,

    #[msg("Token transfer failed")]
    TransferFailed,

    #[msg("Math overflow")]
    MathOverflow,
}
