// programs/trust_circle_verifiers/src/lib.rs
//
// Trust Circle Verifier Pool
// ==========================
// Cross-circle registry of external claim verifiers:
// - Any account becomes an eligible verifier by staking collateral
// - Unstaking is blocked for a cooldown window after each verification
// - Verification hooks and slashing are restricted to the pool owner
//   (the circle registry that consumes this pool)

use anchor_lang::prelude::*;

pub mod state;
pub mod errors;
pub mod events;
pub mod instructions;

use instructions::*;

declare_id!("9fQ2DKLHnDr74KLFJNvsZKurA6ijjce3GvybwnzYgBL");

#[program]
pub mod trust_circle_verifiers {
    use super::*;

    // ==================== INITIALIZATION ====================

    /// Initialize the verifier pool and its stake vault
    pub fn initialize_pool(ctx: Context<InitializePool>, params: InitializePoolParams) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    /// Hand the pool to its consuming circle registry (once)
    pub fn transfer_ownership(ctx: Context<TransferOwnership>, new_owner: Pubkey) -> Result<()> {
        instructions::initialize::transfer_ownership(ctx, new_owner)
    }

    // ==================== STAKING ====================

    /// Stake collateral to become (or remain) an eligible verifier
    pub fn stake_as_verifier(ctx: Context<StakeAsVerifier>, amount: u64) -> Result<()> {
        instructions::staking::stake_as_verifier(ctx, amount)
    }

    /// Withdraw the full stake once the cooldown has elapsed
    pub fn unstake_verifier(ctx: Context<UnstakeVerifier>) -> Result<()> {
        instructions::staking::unstake_verifier(ctx)
    }

    /// Stake, eligibility and cooldown for a verifier
    pub fn get_verifier_status(ctx: Context<GetVerifierStatus>) -> Result<VerifierStatus> {
        instructions::staking::get_verifier_status(ctx)
    }

    // ==================== OWNER HOOKS ====================

    /// Stamp a successful verification (extends the unstake cooldown)
    pub fn record_verification(ctx: Context<RecordVerification>, verifier: Pubkey) -> Result<()> {
        instructions::owner::record_verification(ctx, verifier)
    }

    /// Remove part of a verifier's stake
    pub fn slash_verifier(ctx: Context<SlashVerifier>, amount: u64, reason: String) -> Result<()> {
        instructions::owner::slash_verifier(ctx, amount, reason)
    }
}

/// Public helpers for CPI consumers
pub mod pool_helpers {
    use super::*;

    pub fn verifier_pool_address() -> Pubkey {
        Pubkey::find_program_address(&[state::VerifierPool::SEED_PREFIX], &crate::ID).0
    }

    pub fn verifier_stake_address(verifier: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[state::VerifierStake::SEED_PREFIX, verifier.as_ref()],
            &crate::ID,
        )
        .0
    }
}
