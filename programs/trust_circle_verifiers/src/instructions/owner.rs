// programs/trust_circle_verifiers/src/instructions/owner.rs
//
// Owner Hooks
// ===========
// Only the pool owner (the circle registry PDA, via CPI) may stamp
// verifications or slash collateral.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    self, Mint as MintInterface, TokenAccount as TokenAccountInterface, TokenInterface,
    TransferChecked,
};
use crate::state::{VerifierPool, VerifierStake};
use crate::errors::VerifierPoolError;
use crate::events::{VerificationRecorded, VerifierSlashed};

// =============================================================================
// RECORD VERIFICATION
// =============================================================================

#[derive(Accounts)]
#[instruction(verifier: Pubkey)]
pub struct RecordVerification<'info> {
    #[account(
        mut,
        seeds = [VerifierPool::SEED_PREFIX],
        bump = verifier_pool.bump,
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    #[account(
        mut,
        seeds = [VerifierStake::SEED_PREFIX, verifier.as_ref()],
        bump = verifier_stake.bump,
    )]
    pub verifier_stake: Account<'info, VerifierStake>,

    #[account(
        constraint = owner.key() == verifier_pool.owner @ VerifierPoolError::NotOwner
    )]
    pub owner: Signer<'info>,
}

pub fn record_verification(ctx: Context<RecordVerification>, verifier: Pubkey) -> Result<()> {
    let clock = Clock::get()?;
    let pool = &mut ctx.accounts.verifier_pool;
    let stake = &mut ctx.accounts.verifier_stake;

    pool.record_verification(stake, clock.unix_timestamp)?;

    emit!(VerificationRecorded {
        verifier,
        verification_count: stake.verification_count,
        cooldown_ends_at: stake.cooldown_ends_at(pool.cooldown_period),
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// SLASH
// =============================================================================

#[derive(Accounts)]
pub struct SlashVerifier<'info> {
    #[account(
        mut,
        seeds = [VerifierPool::SEED_PREFIX],
        bump = verifier_pool.bump,
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    #[account(
        mut,
        seeds = [VerifierStake::SEED_PREFIX, verifier_stake.verifier.as_ref()],
        bump = verifier_stake.bump,
    )]
    pub verifier_stake: Account<'info, VerifierStake>,

    #[account(
        constraint = stake_mint.key() == verifier_pool.stake_mint @ VerifierPoolError::InvalidTokenAccount
    )]
    pub stake_mint: InterfaceAccount<'info, MintInterface>,

    #[account(
        mut,
        address = verifier_pool.vault @ VerifierPoolError::InvalidTokenAccount
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    /// Receives the slashed collateral
    #[account(
        mut,
        constraint = recipient_token_account.mint == verifier_pool.stake_mint @ VerifierPoolError::InvalidTokenAccount
    )]
    pub recipient_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(
        constraint = owner.key() == verifier_pool.owner @ VerifierPoolError::NotOwner
    )]
    pub owner: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn slash_verifier(ctx: Context<SlashVerifier>, amount: u64, reason: String) -> Result<()> {
    let clock = Clock::get()?;

    let (verifier, remaining_stake, still_eligible) = {
        let pool = &mut ctx.accounts.verifier_pool;
        let stake = &mut ctx.accounts.verifier_stake;
        let remaining = pool.apply_slash(stake, amount)?;
        (stake.verifier, remaining, pool.is_eligible(stake))
    };

    let bump = ctx.accounts.verifier_pool.bump;
    let seeds = &[VerifierPool::SEED_PREFIX, &[bump]];
    let signer_seeds = &[&seeds[..]];

    token_interface::transfer_checked(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.vault_token_account.to_account_info(),
                mint: ctx.accounts.stake_mint.to_account_info(),
                to: ctx.accounts.recipient_token_account.to_account_info(),
                authority: ctx.accounts.verifier_pool.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
        ctx.accounts.stake_mint.decimals,
    )
    .map_err(|_| error!(VerifierPoolError::TransferFailed))?;

    emit!(VerifierSlashed {
        verifier,
        amount,
        remaining_stake,
        still_eligible,
        reason: reason.clone(),
        timestamp: clock.unix_timestamp,
    });

    msg!("Slashed verifier {} by {}: {}", verifier, amount, reason);
    Ok(())
}
