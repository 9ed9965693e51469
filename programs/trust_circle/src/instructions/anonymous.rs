// programs/trust_circle/src/instructions/anonymous.rs
//
// Anonymous Voting
// ================
// Any payer (typically a relayer) may submit; the voter is identified only by
// a group-membership proof. Uniqueness comes from the circle-wide nullifier
// set, never from the signer.

use anchor_lang::prelude::*;
use crate::errors::CircleError;
use crate::events::ZkVote;
use crate::state::{Circle, ClaimAccount, NullifierRecord};
use crate::voting::{ProgramProofVerifier, ZkVoteProof};

#[derive(Accounts)]
#[instruction(claim_id: u64, support: bool, proof: ZkVoteProof)]
pub struct VoteClaimZk<'info> {
    #[account(
        mut,
        seeds = [Circle::SEED_PREFIX, &circle.circle_id.to_le_bytes()],
        bump = circle.bump,
    )]
    pub circle: Account<'info, Circle>,

    #[account(
        mut,
        seeds = [ClaimAccount::SEED_PREFIX, circle.key().as_ref(), &claim_id.to_le_bytes()],
        bump = claim.bump,
    )]
    pub claim: Account<'info, ClaimAccount>,

    /// Created on first use and never closed; a used record means `NullifierAlreadyUsed`
    #[account(
        init_if_needed,
        payer = payer,
        space = 8 + NullifierRecord::INIT_SPACE,
        seeds = [NullifierRecord::SEED_PREFIX, circle.key().as_ref(), proof.nullifier.as_ref()],
        bump
    )]
    pub nullifier_record: Account<'info, NullifierRecord>,

    /// CHECK: must be the proof verifier program configured on the circle
    #[account(
        executable,
        constraint = circle.proof_verifier == Some(proof_verifier_program.key()) @ CircleError::ProofVerifierMismatch
    )]
    pub proof_verifier_program: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn vote_claim_zk(
    ctx: Context<VoteClaimZk>,
    _claim_id: u64,
    support: bool,
    proof: ZkVoteProof,
) -> Result<()> {
    let clock = Clock::get()?;
    let program_info = ctx.accounts.proof_verifier_program.to_account_info();
    let verifier = ProgramProofVerifier { program: &program_info };

    let circle = &mut ctx.accounts.circle;
    let claim = &mut ctx.accounts.claim;
    let record = &mut ctx.accounts.nullifier_record;

    circle.cast_anonymous_vote(claim, record, &verifier, &proof, support, clock.unix_timestamp)?;
    record.bump = ctx.bumps.nullifier_record;

    emit!(ZkVote {
        circle_id: circle.circle_id,
        claim_id: claim.claim_id,
        nullifier: proof.nullifier,
        support,
        votes_for: claim.votes_for,
        votes_against: claim.votes_against,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
