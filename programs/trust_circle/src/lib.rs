// programs/trust_circle/src/lib.rs
//
// Trust Circle Program
// ====================
// Peer-pooled mutual insurance:
// - Members join a circle by contributing to a shared pool
// - Members open claims and vote on them (identified or anonymous)
// - Larger claims also need approvals from staked external verifiers
// - Approved claims are paid out minus the circle's co-pay

use anchor_lang::prelude::*;

pub mod custody;
pub mod errors;
pub mod escalation;
pub mod events;
pub mod instructions;
pub mod state;
pub mod voting;

use instructions::*;
use voting::ZkVoteProof;

declare_id!("GhQcAbboiE9KXKyNBeTeivNrXZRr21AcaZgGnmoSANUX");

#[program]
pub mod trust_circle {
    use super::*;

    // ==================== INITIALIZATION ====================

    /// Create the circle registry and take ownership of the verifier pool
    pub fn initialize_registry(ctx: Context<InitializeRegistry>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    /// Deploy a new circle with its pool vault
    pub fn create_circle(ctx: Context<CreateCircle>, params: CreateCircleParams) -> Result<()> {
        instructions::initialize::create_circle(ctx, params)
    }

    // ==================== MEMBERSHIP ====================

    /// Join with an initial contribution and optional identity commitment
    pub fn join_circle(
        ctx: Context<JoinCircle>,
        amount: u64,
        zk_commitment: Option<[u8; 32]>,
    ) -> Result<()> {
        instructions::membership::join_circle(ctx, amount, zk_commitment)
    }

    pub fn contribute(ctx: Context<Contribute>, amount: u64) -> Result<()> {
        instructions::membership::contribute(ctx, amount)
    }

    /// Register an identity commitment for anonymous voting (once)
    pub fn register_zk_identity(ctx: Context<RegisterZkIdentity>, commitment: [u8; 32]) -> Result<()> {
        instructions::membership::register_zk_identity(ctx, commitment)
    }

    // ==================== GOVERNANCE ====================

    pub fn update_governance_config(
        ctx: Context<UpdateCircle>,
        quorum_bps: u16,
        approval_bps: u16,
    ) -> Result<()> {
        instructions::governance::update_governance_config(ctx, quorum_bps, approval_bps)
    }

    /// Set the escalation thresholds
    pub fn set_caps(ctx: Context<UpdateCircle>, cap_internal: u64, cap_one_ext: u64) -> Result<()> {
        instructions::governance::set_caps(ctx, cap_internal, cap_one_ext)
    }

    pub fn update_member_limits(
        ctx: Context<UpdateCircle>,
        min_members: u32,
        max_members: u32,
    ) -> Result<()> {
        instructions::governance::update_member_limits(ctx, min_members, max_members)
    }

    /// Publish the member identity-tree root (anonymous circles)
    pub fn update_merkle_root(ctx: Context<UpdateCircle>, root: [u8; 32]) -> Result<()> {
        instructions::governance::update_merkle_root(ctx, root)
    }

    // ==================== CLAIMS ====================

    /// Open a claim; returns its id
    pub fn open_claim(ctx: Context<OpenClaim>, amount: u64, metadata_uri: String) -> Result<u64> {
        instructions::claims::open_claim(ctx, amount, metadata_uri)
    }

    pub fn vote_claim(ctx: Context<VoteClaim>, claim_id: u64, support: bool) -> Result<()> {
        instructions::claims::vote_claim(ctx, claim_id, support)
    }

    /// Anonymous vote backed by a membership proof and nullifier
    pub fn vote_claim_zk(
        ctx: Context<VoteClaimZk>,
        claim_id: u64,
        support: bool,
        proof: ZkVoteProof,
    ) -> Result<()> {
        instructions::anonymous::vote_claim_zk(ctx, claim_id, support, proof)
    }

    /// Approval from a staked external verifier
    pub fn external_approve(ctx: Context<ExternalApprove>, claim_id: u64) -> Result<()> {
        instructions::verification::external_approve(ctx, claim_id)
    }

    /// Finalize and pay out an approved claim
    pub fn process_claim(ctx: Context<ProcessClaim>, claim_id: u64) -> Result<()> {
        instructions::claims::process_claim(ctx, claim_id)
    }

    // ==================== VERIFIER POOL ====================

    /// Forward a slash to the verifier pool (registry authority only)
    pub fn slash_verifier(ctx: Context<SlashVerifier>, amount: u64, reason: String) -> Result<()> {
        instructions::verification::slash_verifier(ctx, amount, reason)
    }

    // ==================== QUERIES ====================

    pub fn circle_count(ctx: Context<RegistryQuery>) -> Result<u64> {
        instructions::queries::circle_count(ctx)
    }

    pub fn get_claim(ctx: Context<ClaimQuery>, claim_id: u64) -> Result<ClaimView> {
        instructions::queries::get_claim(ctx, claim_id)
    }

    pub fn claims_length(ctx: Context<CircleQuery>) -> Result<u64> {
        instructions::queries::claims_length(ctx)
    }

    pub fn required_external_approvals(ctx: Context<CircleQuery>, amount: u64) -> Result<u8> {
        instructions::queries::required_external_approvals(ctx, amount)
    }

    pub fn get_member_limits(ctx: Context<CircleQuery>) -> Result<MemberLimits> {
        instructions::queries::get_member_limits(ctx)
    }

    pub fn active_members_count(ctx: Context<CircleQuery>) -> Result<u32> {
        instructions::queries::active_members_count(ctx)
    }

    pub fn total_pool(ctx: Context<CircleQuery>) -> Result<u64> {
        instructions::queries::total_pool(ctx)
    }

    pub fn get_circle_summary(ctx: Context<CircleQuery>) -> Result<CircleSummary> {
        instructions::queries::get_circle_summary(ctx)
    }

    pub fn get_zk_stats(ctx: Context<CircleQuery>) -> Result<ZkStats> {
        instructions::queries::get_zk_stats(ctx)
    }
}

/// PDA helpers for clients and CPI consumers
pub mod circle_helpers {
    use super::*;
    use crate::state::{Circle, CircleRegistry, ClaimAccount, MemberAccount, NullifierRecord};

    pub fn registry_address() -> Pubkey {
        Pubkey::find_program_address(&[CircleRegistry::SEED_PREFIX], &crate::ID).0
    }

    pub fn circle_address(circle_id: u64) -> Pubkey {
        Pubkey::find_program_address(&[Circle::SEED_PREFIX, &circle_id.to_le_bytes()], &crate::ID).0
    }

    /// Every circle deployed through the registry, in creation order
    pub fn deployed_circles(circle_count: u64) -> Vec<Pubkey> {
        (0..circle_count).map(circle_address).collect()
    }

    pub fn member_address(circle: &Pubkey, wallet: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[MemberAccount::SEED_PREFIX, circle.as_ref(), wallet.as_ref()],
            &crate::ID,
        )
        .0
    }

    pub fn claim_address(circle: &Pubkey, claim_id: u64) -> Pubkey {
        Pubkey::find_program_address(
            &[ClaimAccount::SEED_PREFIX, circle.as_ref(), &claim_id.to_le_bytes()],
            &crate::ID,
        )
        .0
    }

    pub fn nullifier_address(circle: &Pubkey, nullifier: &[u8; 32]) -> Pubkey {
        Pubkey::find_program_address(
            &[NullifierRecord::SEED_PREFIX, circle.as_ref(), nullifier.as_ref()],
            &crate::ID,
        )
        .0
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_deployed_circles_are_distinct() {
            let circles = deployed_circles(3);
            assert_eq!(circles.len(), 3);
            assert_eq!(circles[0], circle_address(0));
            assert_ne!(circles[0], circles[1]);
            assert_ne!(circles[1], circles[2]);
        }
    }
}
