// programs/trust_circle_verifiers/src/events.rs

use anchor_lang::prelude::*;

/// Emitted when the pool is initialized
#[event]
pub struct VerifierPoolInitialized {
    pub owner: Pubkey,
    pub stake_mint: Pubkey,
    pub min_stake: u64,
    pub cooldown_period: i64,
    pub timestamp: i64,
}

/// Emitted when pool ownership is handed over
#[event]
pub struct PoolOwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a verifier stakes
#[event]
pub struct VerifierStaked {
    pub verifier: Pubkey,
    pub amount: u64,
    pub total_stake: u64,
    pub timestamp: i64,
}

/// Emitted when a verifier withdraws
#[event]
pub struct VerifierUnstaked {
    pub verifier: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct VerificationRecorded {
    pub verifier: Pubkey,
    pub verification_count: u64,
    pub cooldown_ends_at: i64,
    pub timestamp: i64,
}

#[event]
pub struct VerifierSlashed {
    pub verifier: Pubkey,
    pub amount: u64,
    pub remaining_stake: u64,
    pub still_eligible: bool,
    pub reason: String,
    pub timestamp: i64,
}
