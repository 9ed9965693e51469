// programs/trust_circle/src/instructions/queries.rs
//
// Read-only views (returned via return data)

use anchor_lang::prelude::*;
use crate::state::{Circle, CircleRegistry, ClaimAccount, VotingMode};

#[derive(Accounts)]
pub struct RegistryQuery<'info> {
    #[account(
        seeds = [CircleRegistry::SEED_PREFIX],
        bump = circle_registry.bump,
    )]
    pub circle_registry: Account<'info, CircleRegistry>,
}

#[derive(Accounts)]
pub struct CircleQuery<'info> {
    #[account(
        seeds = [Circle::SEED_PREFIX, &circle.circle_id.to_le_bytes()],
        bump = circle.bump,
    )]
    pub circle: Account<'info, Circle>,
}

#[derive(Accounts)]
#[instruction(claim_id: u64)]
pub struct ClaimQuery<'info> {
    #[account(
        seeds = [Circle::SEED_PREFIX, &circle.circle_id.to_le_bytes()],
        bump = circle.bump,
    )]
    pub circle: Account<'info, Circle>,

    #[account(
        seeds = [ClaimAccount::SEED_PREFIX, circle.key().as_ref(), &claim_id.to_le_bytes()],
        bump = claim.bump,
    )]
    pub claim: Account<'info, ClaimAccount>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClaimView {
    pub claim_id: u64,
    pub requester: Pubkey,
    pub amount: u64,
    pub metadata_uri: String,
    pub votes_for: u32,
    pub votes_against: u32,
    pub finalized: bool,
    pub approved: bool,
    pub external_verification_required: bool,
    pub required_external_approvals: u8,
    pub external_approvals: u8,
    pub payout_amount: u64,
}

impl From<&ClaimAccount> for ClaimView {
    fn from(claim: &ClaimAccount) -> Self {
        Self {
            claim_id: claim.claim_id,
            requester: claim.requester,
            amount: claim.amount,
            metadata_uri: claim.metadata_uri.clone(),
            votes_for: claim.votes_for,
            votes_against: claim.votes_against,
            finalized: claim.finalized,
            approved: claim.approved,
            external_verification_required: claim.external_verification_required,
            required_external_approvals: claim.required_external_approvals,
            external_approvals: claim.external_approvals,
            payout_amount: claim.payout_amount,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberLimits {
    pub min_members: u32,
    pub max_members: u32,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CircleSummary {
    pub circle_id: u64,
    pub admin: Pubkey,
    pub asset: Pubkey,
    pub voting_mode: VotingMode,
    pub policy_end: i64,
    pub total_pool: u64,
    pub active_members: u32,
    pub total_members: u32,
    pub claims_length: u64,
    pub total_approved_payouts: u64,
    pub quorum_bps: u16,
    pub approval_bps: u16,
    pub cap_internal: u64,
    pub cap_one_ext: u64,
}

impl From<&Circle> for CircleSummary {
    fn from(circle: &Circle) -> Self {
        Self {
            circle_id: circle.circle_id,
            admin: circle.admin,
            asset: circle.asset,
            voting_mode: circle.voting_mode,
            policy_end: circle.policy_end,
            total_pool: circle.total_pool,
            active_members: circle.active_members,
            total_members: circle.total_members,
            claims_length: circle.claims_length(),
            total_approved_payouts: circle.total_approved_payouts,
            quorum_bps: circle.quorum_bps,
            approval_bps: circle.approval_bps,
            cap_internal: circle.cap_internal,
            cap_one_ext: circle.cap_one_ext,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZkStats {
    pub zk_votes: u64,
    pub nullifiers_used: u64,
    pub registered_identities: u32,
    pub merkle_root: [u8; 32],
}

pub fn circle_count(ctx: Context<RegistryQuery>) -> Result<u64> {
    Ok(ctx.accounts.circle_registry.circle_count)
}

pub fn get_claim(ctx: Context<ClaimQuery>, _claim_id: u64) -> Result<ClaimView> {
    Ok(ClaimView::from(&*ctx.accounts.claim))
}

pub fn claims_length(ctx: Context<CircleQuery>) -> Result<u64> {
    Ok(ctx.accounts.circle.claims_length())
}

pub fn required_external_approvals(ctx: Context<CircleQuery>, amount: u64) -> Result<u8> {
    Ok(ctx.accounts.circle.required_external_approvals(amount))
}

pub fn get_member_limits(ctx: Context<CircleQuery>) -> Result<MemberLimits> {
    let circle = &ctx.accounts.circle;
    Ok(MemberLimits {
        min_members: circle.min_members,
        max_members: circle.max_members,
    })
}

pub fn active_members_count(ctx: Context<CircleQuery>) -> Result<u32> {
    Ok(ctx.accounts.circle.active_members)
}

pub fn total_pool(ctx: Context<CircleQuery>) -> Result<u64> {
    Ok(ctx.accounts.circle.total_pool)
}

pub fn get_circle_summary(ctx: Context<CircleQuery>) -> Result<CircleSummary> {
    Ok(CircleSummary::from(&*ctx.accounts.circle))
}

pub fn get_zk_stats(ctx: Context<CircleQuery>) -> Result<ZkStats> {
    let circle = &ctx.accounts.circle;
    Ok(ZkStats {
        zk_votes: circle.zk_votes,
        nullifiers_used: circle.nullifiers_used,
        registered_identities: circle.zk_identity_count,
        merkle_root: circle.current_merkle_root(),
    })
}
