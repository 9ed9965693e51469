// programs/trust_circle/src/instructions/claims.rs
//
// Claims Registry
// ===============
// open_claim -> vote_claim / vote_claim_zk / external_approve -> process_claim
//
// process_claim is permissionless. It either finalizes and pays out, or
// fails and leaves the claim open for a later retry.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    Mint as MintInterface, TokenAccount as TokenAccountInterface, TokenInterface,
};
use crate::custody::TokenCustody;
use crate::errors::CircleError;
use crate::events::{ClaimOpened, ClaimProcessed, ClaimVoted};
use crate::instructions::load_member;
use crate::state::{Circle, ClaimAccount, MemberAccount, VoteRecord};

// =============================================================================
// OPEN CLAIM
// =============================================================================

#[derive(Accounts)]
pub struct OpenClaim<'info> {
    #[account(
        mut,
        seeds = [Circle::SEED_PREFIX, &circle.circle_id.to_le_bytes()],
        bump = circle.bump,
    )]
    pub circle: Account<'info, Circle>,

    /// CHECK: requester's member PDA, loaded by `load_member`
    #[account(
        seeds = [MemberAccount::SEED_PREFIX, circle.key().as_ref(), requester.key().as_ref()],
        bump,
    )]
    pub member_account: UncheckedAccount<'info>,

    #[account(
        init,
        payer = requester,
        space = 8 + ClaimAccount::INIT_SPACE,
        seeds = [ClaimAccount::SEED_PREFIX, circle.key().as_ref(), &circle.next_claim_id.to_le_bytes()],
        bump
    )]
    pub claim: Account<'info, ClaimAccount>,

    #[account(mut)]
    pub requester: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn open_claim(ctx: Context<OpenClaim>, amount: u64, metadata_uri: String) -> Result<u64> {
    let clock = Clock::get()?;
    let member = load_member(&ctx.accounts.member_account.to_account_info())?;

    let circle = &mut ctx.accounts.circle;
    let claim = &mut ctx.accounts.claim;

    let claim_id = circle.open_claim(claim, &member, amount, metadata_uri, clock.unix_timestamp)?;
    claim.bump = ctx.bumps.claim;

    emit!(ClaimOpened {
        circle_id: circle.circle_id,
        claim_id,
        requester: claim.requester,
        amount,
        required_external_approvals: claim.required_external_approvals,
        metadata_uri: claim.metadata_uri.clone(),
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Claim {} opened for {} ({} external approvals required)",
        claim_id,
        amount,
        claim.required_external_approvals
    );
    Ok(claim_id)
}

// =============================================================================
// VOTE (IDENTIFIED)
// =============================================================================

#[derive(Accounts)]
#[instruction(claim_id: u64)]
pub struct VoteClaim<'info> {
    #[account(
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

    /// CHECK: voter's member PDA, loaded by `load_member`
    #[account(
        seeds = [MemberAccount::SEED_PREFIX, circle.key().as_ref(), voter.key().as_ref()],
        bump,
    )]
    pub member_account: UncheckedAccount<'info>,

    /// Marker; a used record means `AlreadyVoted`
    #[account(
        init_if_needed,
        payer = voter,
        space = 8 + VoteRecord::INIT_SPACE,
        seeds = [VoteRecord::SEED_PREFIX, claim.key().as_ref(), voter.key().as_ref()],
        bump
    )]
    pub vote_record: Account<'info, VoteRecord>,

    #[account(mut)]
    pub voter: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn vote_claim(ctx: Context<VoteClaim>, _claim_id: u64, support: bool) -> Result<()> {
    let clock = Clock::get()?;
    let member = load_member(&ctx.accounts.member_account.to_account_info())?;

    let circle = &ctx.accounts.circle;
    let claim = &mut ctx.accounts.claim;
    let record = &mut ctx.accounts.vote_record;

    circle.cast_vote(claim, &member, record, support, clock.unix_timestamp)?;
    record.bump = ctx.bumps.vote_record;

    emit!(ClaimVoted {
        circle_id: circle.circle_id,
        claim_id: claim.claim_id,
        voter: ctx.accounts.voter.key(),
        support,
        votes_for: claim.votes_for,
        votes_against: claim.votes_against,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// PROCESS CLAIM
// =============================================================================

#[derive(Accounts)]
#[instruction(claim_id: u64)]
pub struct ProcessClaim<'info> {
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

    #[account(
        constraint = asset_mint.key() == circle.asset @ CircleError::InvalidTokenAccount
    )]
    pub asset_mint: InterfaceAccount<'info, MintInterface>,

    #[account(
        mut,
        address = circle.vault @ CircleError::InvalidTokenAccount
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    /// Requester's token account for the circle asset
    #[account(
        mut,
        constraint = requester_token_account.mint == circle.asset @ CircleError::InvalidTokenAccount,
        constraint = requester_token_account.owner == claim.requester @ CircleError::InvalidTokenAccount
    )]
    pub requester_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    /// Anyone may trigger finalization
    pub caller: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn process_claim(ctx: Context<ProcessClaim>, _claim_id: u64) -> Result<()> {
    let clock = Clock::get()?;
    let vault_balance = ctx.accounts.vault_token_account.amount;

    let (payout, retained) = {
        let circle = &mut ctx.accounts.circle;
        let claim = &mut ctx.accounts.claim;
        circle.finalize_claim(claim, vault_balance, clock.unix_timestamp)?
    };

    let circle_id_bytes = ctx.accounts.circle.circle_id.to_le_bytes();
    let bump = ctx.accounts.circle.bump;
    let seeds = &[Circle::SEED_PREFIX, circle_id_bytes.as_ref(), &[bump]];
    let signer_seeds = &[&seeds[..]];

    TokenCustody {
        token_program: &ctx.accounts.token_program,
        mint: &ctx.accounts.asset_mint,
        vault: &mut ctx.accounts.vault_token_account,
    }
    .payout(
        &ctx.accounts.requester_token_account,
        ctx.accounts.circle.to_account_info(),
        signer_seeds,
        payout,
    )?;

    emit!(ClaimProcessed {
        circle_id: ctx.accounts.circle.circle_id,
        claim_id: ctx.accounts.claim.claim_id,
        approved: true,
        payout,
        co_pay_retained: retained,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Claim {} approved: paid {}, co-pay retained {}",
        ctx.accounts.claim.claim_id,
        payout,
        retained
    );
    Ok(())
}
