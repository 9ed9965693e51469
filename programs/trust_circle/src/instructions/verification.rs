// programs/trust_circle/src/instructions/verification.rs
//
// External Verification
// =====================
// Staked verifiers from the shared pool sign off on escalated claims.
// Each approval is stamped back into the pool, restarting the verifier's
// unstake cooldown. The registry PDA owns the pool and signs those calls.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    Mint as MintInterface, TokenAccount as TokenAccountInterface, TokenInterface,
};
use trust_circle_verifiers::program::TrustCircleVerifiers;
use trust_circle_verifiers::state::{VerifierPool, VerifierStake};
use crate::errors::CircleError;
use crate::events::ExternalApprovalRecorded;
use crate::state::{Circle, CircleRegistry, ClaimAccount, ExternalApproval};

/// Read a verifier's stake record; absent or foreign data counts as no stake
fn load_stake(info: &AccountInfo) -> Option<VerifierStake> {
    if info.owner != &trust_circle_verifiers::ID {
        return None;
    }
    let data = info.try_borrow_data().ok()?;
    VerifierStake::try_deserialize(&mut &data[..]).ok()
}

// =============================================================================
// EXTERNAL APPROVE
// =============================================================================

#[derive(Accounts)]
#[instruction(claim_id: u64)]
pub struct ExternalApprove<'info> {
    #[account(
        seeds = [CircleRegistry::SEED_PREFIX],
        bump = circle_registry.bump,
    )]
    pub circle_registry: Account<'info, CircleRegistry>,

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

    #[account(
        mut,
        address = circle.verifier_pool @ CircleError::NotEligibleVerifier
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    /// CHECK: verifier's stake PDA in the pool program, read by `load_stake`
    #[account(
        mut,
        seeds = [VerifierStake::SEED_PREFIX, verifier.key().as_ref()],
        bump,
        seeds::program = trust_circle_verifiers::ID,
    )]
    pub verifier_stake: UncheckedAccount<'info>,

    /// Marker; a used record means `AlreadyApproved`
    #[account(
        init_if_needed,
        payer = verifier,
        space = 8 + ExternalApproval::INIT_SPACE,
        seeds = [ExternalApproval::SEED_PREFIX, claim.key().as_ref(), verifier.key().as_ref()],
        bump
    )]
    pub external_approval: Account<'info, ExternalApproval>,

    #[account(mut)]
    pub verifier: Signer<'info>,

    pub verifier_program: Program<'info, TrustCircleVerifiers>,

    pub system_program: Program<'info, System>,
}

pub fn external_approve(ctx: Context<ExternalApprove>, _claim_id: u64) -> Result<()> {
    let clock = Clock::get()?;
    let verifier = ctx.accounts.verifier.key();

    let eligible = load_stake(&ctx.accounts.verifier_stake.to_account_info())
        .map(|stake| ctx.accounts.verifier_pool.is_eligible(&stake))
        .unwrap_or(false);

    {
        let circle = &ctx.accounts.circle;
        let claim = &mut ctx.accounts.claim;
        let approval = &mut ctx.accounts.external_approval;
        circle.record_external_approval(claim, approval, verifier, eligible, clock.unix_timestamp)?;
        approval.bump = ctx.bumps.external_approval;
    }

    let registry_bump = ctx.accounts.circle_registry.bump;
    let seeds = &[CircleRegistry::SEED_PREFIX, &[registry_bump]];
    let signer_seeds = &[&seeds[..]];

    trust_circle_verifiers::cpi::record_verification(
        CpiContext::new_with_signer(
            ctx.accounts.verifier_program.to_account_info(),
            trust_circle_verifiers::cpi::accounts::RecordVerification {
                verifier_pool: ctx.accounts.verifier_pool.to_account_info(),
                verifier_stake: ctx.accounts.verifier_stake.to_account_info(),
                owner: ctx.accounts.circle_registry.to_account_info(),
            },
            signer_seeds,
        ),
        verifier,
    )?;

    let claim = &ctx.accounts.claim;
    emit!(ExternalApprovalRecorded {
        circle_id: ctx.accounts.circle.circle_id,
        claim_id: claim.claim_id,
        verifier,
        external_approvals: claim.external_approvals,
        required_external_approvals: claim.required_external_approvals,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// SLASH VERIFIER
// =============================================================================

/// Registry authority forwards a slash to the pool it owns
#[derive(Accounts)]
pub struct SlashVerifier<'info> {
    #[account(
        seeds = [CircleRegistry::SEED_PREFIX],
        bump = circle_registry.bump,
        has_one = authority @ CircleError::NotOwner,
    )]
    pub circle_registry: Account<'info, CircleRegistry>,

    #[account(
        mut,
        address = circle_registry.verifier_pool @ CircleError::NotEligibleVerifier
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    #[account(mut)]
    pub verifier_stake: Account<'info, VerifierStake>,

    pub stake_mint: InterfaceAccount<'info, MintInterface>,

    #[account(mut)]
    pub pool_vault_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(mut)]
    pub recipient_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    pub authority: Signer<'info>,

    pub verifier_program: Program<'info, TrustCircleVerifiers>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn slash_verifier(ctx: Context<SlashVerifier>, amount: u64, reason: String) -> Result<()> {
    let registry_bump = ctx.accounts.circle_registry.bump;
    let seeds = &[CircleRegistry::SEED_PREFIX, &[registry_bump]];
    let signer_seeds = &[&seeds[..]];

    trust_circle_verifiers::cpi::slash_verifier(
        CpiContext::new_with_signer(
            ctx.accounts.verifier_program.to_account_info(),
            trust_circle_verifiers::cpi::accounts::SlashVerifier {
                verifier_pool: ctx.accounts.verifier_pool.to_account_info(),
                verifier_stake: ctx.accounts.verifier_stake.to_account_info(),
                stake_mint: ctx.accounts.stake_mint.to_account_info(),
                vault_token_account: ctx.accounts.pool_vault_token_account.to_account_info(),
                recipient_token_account: ctx.accounts.recipient_token_account.to_account_info(),
                owner: ctx.accounts.circle_registry.to_account_info(),
                token_program: ctx.accounts.token_program.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
        reason,
    )?;

    msg!("Forwarded slash of {} for verifier {}", amount, ctx.accounts.verifier_stake.verifier);
    Ok(())
}
