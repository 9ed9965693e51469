// programs/trust_circle/src/state.rs

use anchor_lang::prelude::*;
use crate::errors::CircleError;
use crate::escalation::required_external_approvals;
use crate::voting::{
    check_approval, check_quorum, MembershipProofVerifier, ZkVoteProof, BPS_DENOMINATOR,
};

// =============================================================================
// CIRCLE REGISTRY
// =============================================================================

/// Factory for circles; owner of the shared verifier pool
/// PDA seeds: ["circle_registry"]
#[account]
#[derive(InitSpace)]
pub struct CircleRegistry {
    /// Registry authority (may forward slashes to the verifier pool)
    pub authority: Pubkey,

    /// Verifier pool consumed by every circle in this registry
    pub verifier_pool: Pubkey,

    /// Circles created so far; also the next circle id
    pub circle_count: u64,

    /// Bump seed
    pub bump: u8,
}

impl CircleRegistry {
    pub const SEED_PREFIX: &'static [u8] = b"circle_registry";

    pub fn allocate_circle_id(&mut self) -> Result<u64> {
        let circle_id = self.circle_count;
        self.circle_count = self
            .circle_count
            .checked_add(1)
            .ok_or(CircleError::MathOverflow)?;
        Ok(circle_id)
    }
}

// =============================================================================
// CIRCLE
// =============================================================================

/// How members cast votes in a circle. Fixed at creation.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, InitSpace)]
pub enum VotingMode {
    /// One vote per member wallet
    Identified,
    /// Group-membership proof plus nullifier, voter never revealed
    Anonymous,
}

/// One mutual-insurance agreement
/// PDA seeds: ["circle", circle_id]
#[account]
#[derive(InitSpace)]
pub struct Circle {
    pub circle_id: u64,

    /// Governance admin
    pub admin: Pubkey,

    /// Pooled token mint
    pub asset: Pubkey,

    /// Token account holding the pool
    pub vault: Pubkey,

    /// No new claims after this timestamp
    pub policy_end: i64,

    /// Share of each approved claim borne by the claimant
    pub co_pay_bps: u16,

    pub per_claim_cap: u64,
    pub coverage_limit_total: u64,

    /// Sum of contributions minus payouts
    pub total_pool: u64,

    pub quorum_bps: u16,
    pub approval_bps: u16,
    pub min_members: u32,
    pub max_members: u32,

    /// Escalation thresholds
    pub cap_internal: u64,
    pub cap_one_ext: u64,

    pub voting_mode: VotingMode,

    /// External proof verifier program (anonymous circles)
    pub proof_verifier: Option<Pubkey>,

    /// Verifier pool consulted for external approvals
    pub verifier_pool: Pubkey,

    pub active_members: u32,
    pub total_members: u32,

    /// Id the next opened claim receives (starts at 1)
    pub next_claim_id: u64,

    /// Cumulative approved payouts, bounded by `coverage_limit_total`
    pub total_approved_payouts: u64,

    /// Lifetime token inflow
    pub total_contributions: u64,

    /// Registered identity commitments (next group index)
    pub zk_identity_count: u32,

    /// Recent roots of the member identity tree; zero slots are unset
    pub merkle_roots: [[u8; 32]; 4],

    /// Slot holding the current root
    pub merkle_root_index: u8,

    /// Anonymous votes cast
    pub zk_votes: u64,

    /// Nullifiers consumed
    pub nullifiers_used: u64,

    pub created_at: i64,

    /// Bump seed
    pub bump: u8,

    /// Vault bump seed
    pub vault_bump: u8,
}

impl Circle {
    pub const SEED_PREFIX: &'static [u8] = b"circle";
    pub const VAULT_SEED: &'static [u8] = b"circle_vault";

    pub const DEFAULT_QUORUM_BPS: u16 = 5_000;
    pub const DEFAULT_APPROVAL_BPS: u16 = 7_000;
    pub const DEFAULT_MIN_MEMBERS: u32 = 3;
    pub const DEFAULT_MAX_MEMBERS: u32 = 10;
    pub const DEFAULT_CAP_INTERNAL: u64 = 100_000_000; // 100 tokens at 6 decimals
    pub const DEFAULT_CAP_ONE_EXT: u64 = 500_000_000; // 500 tokens at 6 decimals

    /// Roots kept so proofs built just before a tree update still verify
    pub const MERKLE_ROOT_HISTORY: usize = 4;

    /// Validate a freshly populated circle
    pub fn validate_config(&self, now: i64) -> Result<()> {
        require!(self.co_pay_bps as u64 <= BPS_DENOMINATOR, CircleError::InvalidBps);
        validate_bps(self.quorum_bps)?;
        validate_bps(self.approval_bps)?;
        validate_member_limits(self.min_members, self.max_members)?;
        require!(
            self.per_claim_cap > 0 && self.per_claim_cap <= self.coverage_limit_total,
            CircleError::InvalidCircleConfig
        );
        require!(self.policy_end > now, CircleError::InvalidCircleConfig);
        require!(
            self.cap_internal > 0 && self.cap_internal <= self.cap_one_ext,
            CircleError::InvalidCaps
        );
        if self.voting_mode == VotingMode::Anonymous {
            require!(self.proof_verifier.is_some(), CircleError::InvalidCircleConfig);
        }
        Ok(())
    }

    pub fn require_admin(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.admin, CircleError::NotOwner);
        Ok(())
    }

    pub fn claims_length(&self) -> u64 {
        self.next_claim_id.saturating_sub(1)
    }

    pub fn required_external_approvals(&self, amount: u64) -> u8 {
        required_external_approvals(amount, self.cap_internal, self.cap_one_ext)
    }

    /// Co-pay split of an approved claim: (payout, retained)
    pub fn split_co_pay(&self, amount: u64) -> Result<(u64, u64)> {
        let payout = (amount as u128)
            .checked_mul(BPS_DENOMINATOR as u128 - self.co_pay_bps as u128)
            .ok_or(CircleError::MathOverflow)?
            / BPS_DENOMINATOR as u128;
        let payout = u64::try_from(payout).map_err(|_| CircleError::MathOverflow)?;
        Ok((payout, amount - payout))
    }

    // ==================== MEMBERSHIP ====================

    /// Admit a new member with an initial contribution.
    /// Returns the group index when an identity commitment is registered.
    pub fn admit_member(
        &mut self,
        member: &mut MemberAccount,
        wallet: Pubkey,
        amount: u64,
        commitment: Option<[u8; 32]>,
        now: i64,
    ) -> Result<Option<u32>> {
        require!(!member.is_active, CircleError::AlreadyMember);
        require!(self.active_members < self.max_members, CircleError::CircleFull);
        require!(amount > 0, CircleError::InvalidAmount);

        self.credit_pool(amount)?;
        self.active_members += 1;
        self.total_members = self.total_members.saturating_add(1);

        member.wallet = wallet;
        member.is_active = true;
        member.contribution = amount;
        member.joined_at = now;

        match commitment {
            Some(commitment) => Ok(Some(self.register_identity(member, commitment)?)),
            None => Ok(None),
        }
    }

    pub fn add_contribution(&mut self, member: &mut MemberAccount, amount: u64) -> Result<u64> {
        require!(member.is_active, CircleError::NotMember);
        require!(amount > 0, CircleError::InvalidAmount);

        self.credit_pool(amount)?;
        member.contribution = member
            .contribution
            .checked_add(amount)
            .ok_or(CircleError::MathOverflow)?;

        Ok(member.contribution)
    }

    /// Bind an identity commitment to a member, once. Returns its group index.
    pub fn register_identity(
        &mut self,
        member: &mut MemberAccount,
        commitment: [u8; 32],
    ) -> Result<u32> {
        require!(member.is_active, CircleError::NotMember);
        require!(
            member.zk_identity_commitment.is_none(),
            CircleError::IdentityAlreadyRegistered
        );

        let group_index = self.zk_identity_count;
        member.zk_identity_commitment = Some(commitment);
        self.zk_identity_count = self
            .zk_identity_count
            .checked_add(1)
            .ok_or(CircleError::MathOverflow)?;

        Ok(group_index)
    }

    fn credit_pool(&mut self, amount: u64) -> Result<()> {
        self.total_pool = self
            .total_pool
            .checked_add(amount)
            .ok_or(CircleError::MathOverflow)?;
        self.total_contributions = self
            .total_contributions
            .checked_add(amount)
            .ok_or(CircleError::MathOverflow)?;
        Ok(())
    }

    // ==================== GOVERNANCE ====================

    pub fn update_governance_config(
        &mut self,
        caller: &Pubkey,
        quorum_bps: u16,
        approval_bps: u16,
    ) -> Result<()> {
        self.require_admin(caller)?;
        validate_bps(quorum_bps)?;
        validate_bps(approval_bps)?;

        self.quorum_bps = quorum_bps;
        self.approval_bps = approval_bps;
        Ok(())
    }

    /// Caps should satisfy `cap_internal <= cap_one_ext`; only positivity is enforced
    pub fn set_caps(&mut self, caller: &Pubkey, cap_internal: u64, cap_one_ext: u64) -> Result<()> {
        self.require_admin(caller)?;
        require!(cap_internal > 0 && cap_one_ext > 0, CircleError::InvalidCaps);

        self.cap_internal = cap_internal;
        self.cap_one_ext = cap_one_ext;
        Ok(())
    }

    pub fn update_member_limits(
        &mut self,
        caller: &Pubkey,
        min_members: u32,
        max_members: u32,
    ) -> Result<()> {
        self.require_admin(caller)?;
        validate_member_limits(min_members, max_members)?;
        require!(
            max_members >= self.active_members,
            CircleError::InvalidMemberLimits
        );

        self.min_members = min_members;
        self.max_members = max_members;
        Ok(())
    }

    /// Publish a new identity-tree root built from the registered commitments
    pub fn update_merkle_root(&mut self, caller: &Pubkey, root: [u8; 32]) -> Result<()> {
        self.require_admin(caller)?;
        require!(
            self.voting_mode == VotingMode::Anonymous,
            CircleError::VotingModeMismatch
        );
        require!(root != [0u8; 32], CircleError::InvalidMerkleRoot);

        let next = (self.merkle_root_index as usize + 1) % Self::MERKLE_ROOT_HISTORY;
        self.merkle_roots[next] = root;
        self.merkle_root_index = next as u8;
        Ok(())
    }

    pub fn current_merkle_root(&self) -> [u8; 32] {
        self.merkle_roots[self.merkle_root_index as usize % Self::MERKLE_ROOT_HISTORY]
    }

    /// True for any non-zero root among the recent history
    pub fn is_known_root(&self, root: &[u8; 32]) -> bool {
        *root != [0u8; 32] && self.merkle_roots.iter().any(|known| known == root)
    }

    // ==================== CLAIMS ====================

    /// Open a claim in the slot `next_claim_id`. Returns the claim id.
    pub fn open_claim(
        &mut self,
        claim: &mut ClaimAccount,
        requester: &MemberAccount,
        amount: u64,
        metadata_uri: String,
        now: i64,
    ) -> Result<u64> {
        require!(requester.is_active, CircleError::NotMember);
        require!(now <= self.policy_end, CircleError::PolicyExpired);
        require!(
            self.active_members >= self.min_members,
            CircleError::NotEnoughMembers
        );
        require!(amount > 0, CircleError::InvalidAmount);
        require!(amount <= self.per_claim_cap, CircleError::ExceedsPerClaimCap);
        let projected = self
            .total_approved_payouts
            .checked_add(amount)
            .ok_or(CircleError::MathOverflow)?;
        require!(
            projected <= self.coverage_limit_total,
            CircleError::ExceedsCoverageLimit
        );
        require!(
            metadata_uri.len() <= ClaimAccount::MAX_METADATA_LEN,
            CircleError::MetadataTooLong
        );

        let claim_id = self.next_claim_id;
        let required = self.required_external_approvals(amount);

        claim.circle_id = self.circle_id;
        claim.claim_id = claim_id;
        claim.requester = requester.wallet;
        claim.amount = amount;
        claim.metadata_uri = metadata_uri;
        claim.votes_for = 0;
        claim.votes_against = 0;
        claim.finalized = false;
        claim.approved = false;
        claim.external_verification_required = required > 0;
        claim.required_external_approvals = required;
        claim.external_approvals = 0;
        claim.opened_at = now;
        claim.finalized_at = 0;
        claim.payout_amount = 0;

        self.next_claim_id = self
            .next_claim_id
            .checked_add(1)
            .ok_or(CircleError::MathOverflow)?;

        Ok(claim_id)
    }

    /// Identified vote by a member wallet
    pub fn cast_vote(
        &self,
        claim: &mut ClaimAccount,
        voter: &MemberAccount,
        record: &mut VoteRecord,
        support: bool,
        now: i64,
    ) -> Result<()> {
        claim.require_open()?;
        require!(
            self.voting_mode == VotingMode::Identified,
            CircleError::VotingModeMismatch
        );
        require!(voter.is_active, CircleError::NotMember);
        require!(!record.used, CircleError::AlreadyVoted);

        claim.tally(support, self.active_members)?;

        record.claim_id = claim.claim_id;
        record.voter = voter.wallet;
        record.used = true;
        record.support = support;
        record.voted_at = now;
        Ok(())
    }

    /// Anonymous vote gated by a membership proof and a fresh nullifier
    pub fn cast_anonymous_vote<V: MembershipProofVerifier>(
        &mut self,
        claim: &mut ClaimAccount,
        nullifier_record: &mut NullifierRecord,
        verifier: &V,
        proof: &ZkVoteProof,
        support: bool,
        now: i64,
    ) -> Result<()> {
        claim.require_open()?;
        require!(
            self.voting_mode == VotingMode::Anonymous,
            CircleError::VotingModeMismatch
        );
        require!(!nullifier_record.used, CircleError::NullifierAlreadyUsed);
        require!(proof.has_valid_depth(), CircleError::InvalidProof);
        require!(
            self.is_known_root(&proof.merkle_tree_root),
            CircleError::UnknownMerkleRoot
        );

        let inputs = proof.public_inputs(self.circle_id, claim.claim_id, support);
        require!(
            verifier.verify(&proof.points, &inputs)?,
            CircleError::InvalidProof
        );

        nullifier_record.nullifier = proof.nullifier;
        nullifier_record.used = true;
        nullifier_record.claim_id = claim.claim_id;
        nullifier_record.used_at = now;
        self.nullifiers_used = self.nullifiers_used.saturating_add(1);

        claim.tally(support, self.active_members)?;
        self.zk_votes = self.zk_votes.saturating_add(1);
        Ok(())
    }

    /// External verifier sign-off. `eligible` is the pool's view of the verifier.
    pub fn record_external_approval(
        &self,
        claim: &mut ClaimAccount,
        approval: &mut ExternalApproval,
        verifier: Pubkey,
        eligible: bool,
        now: i64,
    ) -> Result<()> {
        claim.require_open()?;
        require!(eligible, CircleError::NotEligibleVerifier);
        require!(verifier != claim.requester, CircleError::NotEligibleVerifier);
        require!(!approval.used, CircleError::AlreadyApproved);

        claim.external_approvals = claim
            .external_approvals
            .checked_add(1)
            .ok_or(CircleError::MathOverflow)?;

        approval.claim_id = claim.claim_id;
        approval.verifier = verifier;
        approval.used = true;
        approval.approved_at = now;
        Ok(())
    }

    /// Finalize an approved claim. Any failed check leaves the claim open.
    /// Returns `(payout, co_pay_retained)`.
    pub fn finalize_claim(
        &mut self,
        claim: &mut ClaimAccount,
        vault_balance: u64,
        now: i64,
    ) -> Result<(u64, u64)> {
        claim.require_open()?;
        require!(
            claim.external_approvals >= claim.required_external_approvals,
            CircleError::ExternalVerificationPending
        );
        check_quorum(claim.total_votes(), self.active_members, self.quorum_bps)?;
        check_approval(claim.votes_for, claim.votes_against, self.approval_bps)?;

        let (payout, retained) = self.split_co_pay(claim.amount)?;

        let approved_total = self
            .total_approved_payouts
            .checked_add(payout)
            .ok_or(CircleError::MathOverflow)?;
        require!(
            approved_total <= self.coverage_limit_total,
            CircleError::ExceedsCoverageLimit
        );
        require!(
            payout <= self.total_pool && payout <= vault_balance,
            CircleError::InsufficientBalance
        );

        self.total_pool -= payout;
        self.total_approved_payouts = approved_total;

        claim.finalized = true;
        claim.approved = true;
        claim.finalized_at = now;
        claim.payout_amount = payout;

        Ok((payout, retained))
    }
}

pub fn validate_bps(bps: u16) -> Result<()> {
    require!(
        bps > 0 && bps as u64 <= BPS_DENOMINATOR,
        CircleError::InvalidBps
    );
    Ok(())
}

pub fn validate_member_limits(min_members: u32, max_members: u32) -> Result<()> {
    require!(
        min_members > 0 && min_members <= max_members,
        CircleError::InvalidMemberLimits
    );
    Ok(())
}

// =============================================================================
// MEMBER
// =============================================================================

/// Membership record
/// PDA seeds: ["member", circle, wallet]
#[account]
#[derive(InitSpace)]
pub struct MemberAccount {
    pub circle: Pubkey,
    pub wallet: Pubkey,

    /// Flips to true exactly once
    pub is_active: bool,

    /// Cumulative contribution
    pub contribution: u64,

    /// Set once, immutable afterwards
    pub zk_identity_commitment: Option<[u8; 32]>,

    pub joined_at: i64,

    /// Bump seed
    pub bump: u8,
}

impl MemberAccount {
    pub const SEED_PREFIX: &'static [u8] = b"member";
}

// =============================================================================
// CLAIM
// =============================================================================

/// Claim against the circle pool
/// PDA seeds: ["claim", circle, claim_id]
#[account]
#[derive(InitSpace)]
pub struct ClaimAccount {
    pub circle_id: u64,
    pub claim_id: u64,
    pub requester: Pubkey,
    pub amount: u64,

    /// Evidence reference (e.g. IPFS URI)
    #[max_len(200)]
    pub metadata_uri: String,

    pub votes_for: u32,
    pub votes_against: u32,

    /// Terminal once set
    pub finalized: bool,
    pub approved: bool,

    /// Frozen at open time
    pub external_verification_required: bool,
    pub required_external_approvals: u8,
    pub external_approvals: u8,

    pub opened_at: i64,
    pub finalized_at: i64,

    /// Amount actually paid after co-pay
    pub payout_amount: u64,

    /// Bump seed
    pub bump: u8,
}

impl ClaimAccount {
    pub const SEED_PREFIX: &'static [u8] = b"claim";
    pub const MAX_METADATA_LEN: usize = 200;

    pub fn require_open(&self) -> Result<()> {
        require!(!self.finalized, CircleError::ClaimFinalized);
        Ok(())
    }

    pub fn total_votes(&self) -> u32 {
        self.votes_for.saturating_add(self.votes_against)
    }

    /// The only place vote counters move. Shared by both voting modes.
    pub fn tally(&mut self, support: bool, active_members: u32) -> Result<()> {
        require!(
            self.total_votes() < active_members,
            CircleError::VoteCapacityReached
        );
        if support {
            self.votes_for += 1;
        } else {
            self.votes_against += 1;
        }
        Ok(())
    }
}

// =============================================================================
// MARKERS
// =============================================================================

/// Per (claim, voter) marker for identified votes
/// PDA seeds: ["vote", claim, voter]
#[account]
#[derive(InitSpace)]
pub struct VoteRecord {
    pub claim_id: u64,
    pub voter: Pubkey,
    pub used: bool,
    pub support: bool,
    pub voted_at: i64,
    pub bump: u8,
}

impl VoteRecord {
    pub const SEED_PREFIX: &'static [u8] = b"vote";
}

/// Per (claim, verifier) marker for external approvals
/// PDA seeds: ["external_approval", claim, verifier]
#[account]
#[derive(InitSpace)]
pub struct ExternalApproval {
    pub claim_id: u64,
    pub verifier: Pubkey,
    pub used: bool,
    pub approved_at: i64,
    pub bump: u8,
}

impl ExternalApproval {
    pub const SEED_PREFIX: &'static [u8] = b"external_approval";
}

/// Consumed nullifier; never closed
/// PDA seeds: ["nullifier", circle, nullifier]
#[account]
#[derive(InitSpace)]
pub struct NullifierRecord {
    pub nullifier: [u8; 32],
    pub used: bool,
    /// Claim the nullifier was spent on
    pub claim_id: u64,
    pub used_at: i64,
    pub bump: u8,
}

impl NullifierRecord {
    pub const SEED_PREFIX: &'static [u8] = b"nullifier";
}

// =============================================================================
// UNIT TESTS
// =============================================================================
