// programs/trust_circle/src/events.rs

use anchor_lang::prelude::*;
use crate::state::VotingMode;

/// Emitted when the circle registry is created and linked to the verifier pool
#[event]
pub struct RegistryInitialized {
    pub authority: Pubkey,
    pub verifier_pool: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a new circle is deployed through the registry
#[event]
pub struct CircleCreated {
    pub circle_id: u64,
    pub circle: Pubkey,
    pub admin: Pubkey,
    pub asset: Pubkey,
    pub voting_mode: VotingMode,
    pub policy_end: i64,
    pub co_pay_bps: u16,
    pub per_claim_cap: u64,
    pub coverage_limit_total: u64,
    pub timestamp: i64,
}

#[event]
pub struct MemberJoined {
    pub circle_id: u64,
    pub member: Pubkey,
    pub contribution: u64,
    pub active_members: u32,
    pub timestamp: i64,
}

#[event]
pub struct ContributionMade {
    pub circle_id: u64,
    pub member: Pubkey,
    pub amount: u64,
    pub total_contribution: u64,
    pub total_pool: u64,
    pub timestamp: i64,
}

/// Carries the group index so off-chain tooling can rebuild the identity tree
#[event]
pub struct ZkIdentityRegistered {
    pub circle_id: u64,
    pub member: Pubkey,
    pub commitment: [u8; 32],
    pub group_index: u32,
    pub timestamp: i64,
}

#[event]
pub struct GovernanceConfigUpdated {
    pub circle_id: u64,
    pub quorum_bps: u16,
    pub approval_bps: u16,
    pub timestamp: i64,
}

#[event]
pub struct CapsUpdated {
    pub circle_id: u64,
    pub cap_internal: u64,
    pub cap_one_ext: u64,
    pub timestamp: i64,
}

#[event]
pub struct MemberLimitsUpdated {
    pub circle_id: u64,
    pub min_members: u32,
    pub max_members: u32,
    pub timestamp: i64,
}

/// New identity-tree root for anonymous voting
#[event]
pub struct MerkleRootUpdated {
    pub circle_id: u64,
    pub root: [u8; 32],
    pub registered_identities: u32,
    pub timestamp: i64,
}

#[event]
pub struct ClaimOpened {
    pub circle_id: u64,
    pub claim_id: u64,
    pub requester: Pubkey,
    pub amount: u64,
    pub required_external_approvals: u8,
    pub metadata_uri: String,
    pub timestamp: i64,
}

#[event]
pub struct ClaimVoted {
    pub circle_id: u64,
    pub claim_id: u64,
    pub voter: Pubkey,
    pub support: bool,
    pub votes_for: u32,
    pub votes_against: u32,
    pub timestamp: i64,
}

/// Anonymous vote: only the nullifier is published, never the voter
#[event]
pub struct ZkVote {
    pub circle_id: u64,
    pub claim_id: u64,
    pub nullifier: [u8; 32],
    pub support: bool,
    pub votes_for: u32,
    pub votes_against: u32,
    pub timestamp: i64,
}

#[event]
pub struct ExternalApprovalRecorded {
    pub circle_id: u64,
    pub claim_id: u64,
    pub verifier: Pubkey,
    pub external_approvals: u8,
    pub required_external_approvals: u8,
    pub timestamp: i64,
}

#[event]
pub struct ClaimProcessed {
    pub circle_id: u64,
    pub claim_id: u64,
    pub approved: bool,
    pub payout: u64,
    pub co_pay_retained: u64,
    pub timestamp: i64,
}
