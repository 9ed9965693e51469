// programs/trust_circle_verifiers/src/instructions/staking.rs
//
// Verifier Staking
// ================
// Collateral moves through token_interface so either token program works.

use crate::errors::VerifierPoolError;
use crate::events::{VerifierStaked, VerifierUnstaked};
use crate::state::{VerifierPool, VerifierStake};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    self, Mint as MintInterface, TokenAccount as TokenAccountInterface, TokenInterface,
    TransferChecked,
};

// =============================================================================
// STAKE
// =============================================================================

#[derive(Accounts)]
pub struct StakeAsVerifier<'info> {
    #[account(
        mut,
        seeds = [VerifierPool::SEED_PREFIX],
        bump = verifier_pool.bump,
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    #[account(
        init_if_needed,
        payer = verifier,
        space = 8 + VerifierStake::INIT_SPACE,
        seeds = [VerifierStake::SEED_PREFIX, verifier.key().as_ref()],
        bump
    )]
    pub verifier_stake: Account<'info, VerifierStake>,

    #[account(
        constraint = stake_mint.key() == verifier_pool.stake_mint @ VerifierPoolError::InvalidTokenAccount
    )]
    pub stake_mint: InterfaceAccount<'info, MintInterface>,

    #[account(
        mut,
        constraint = verifier_token_account.mint == verifier_pool.stake_mint @ VerifierPoolError::InvalidTokenAccount,
        constraint = verifier_token_account.owner == verifier.key() @ VerifierPoolError::InvalidTokenAccount
    )]
    pub verifier_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(
        mut,
        address = verifier_pool.vault @ VerifierPoolError::InvalidTokenAccount
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(mut)]
    pub verifier: Signer<'info>,

    pub system_program: Program<'info, System>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn stake_as_verifier(ctx: Context<StakeAsVerifier>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;

    require!(
        ctx.accounts.verifier_token_account.amount >= amount,
        VerifierPoolError::InsufficientBalance
    );

    let verifier = ctx.accounts.verifier.key();
    let vault_before = ctx.accounts.vault_token_account.amount;

    token_interface::transfer_checked(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.verifier_token_account.to_account_info(),
                mint: ctx.accounts.stake_mint.to_account_info(),
                to: ctx.accounts.vault_token_account.to_account_info(),
                authority: ctx.accounts.verifier.to_account_info(),
            },
        ),
        amount,
        ctx.accounts.stake_mint.decimals,
    )
    .map_err(|_| error!(VerifierPoolError::TransferFailed))?;

    // Fee-bearing mints deliver less than `amount`; stake what arrived
    ctx.accounts.vault_token_account.reload()?;
    let received = ctx
        .accounts
        .vault_token_account
        .amount
        .checked_sub(vault_before)
        .ok_or(VerifierPoolError::TransferFailed)?;

    let total_stake = {
        let pool = &mut ctx.accounts.verifier_pool;
        let stake = &mut ctx.accounts.verifier_stake;
        stake.bump = ctx.bumps.verifier_stake;
        pool.apply_stake(stake, verifier, received, clock.unix_timestamp)?
    };

    emit!(VerifierStaked {
        verifier,
        amount: received,
        total_stake,
        timestamp: clock.unix_timestamp,
    });

    msg!("Verifier {} staked {} (total {})", verifier, received, total_stake);
    Ok(())
}

// =============================================================================
// UNSTAKE
// =============================================================================

#[derive(Accounts)]
pub struct UnstakeVerifier<'info> {
    #[account(
        mut,
        seeds = [VerifierPool::SEED_PREFIX],
        bump = verifier_pool.bump,
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    #[account(
        mut,
        seeds = [VerifierStake::SEED_PREFIX, verifier.key().as_ref()],
        bump = verifier_stake.bump,
    )]
    pub verifier_stake: Account<'info, VerifierStake>,

    #[account(
        constraint = stake_mint.key() == verifier_pool.stake_mint @ VerifierPoolError::InvalidTokenAccount
    )]
    pub stake_mint: InterfaceAccount<'info, MintInterface>,

    #[account(
        mut,
        constraint = verifier_token_account.mint == verifier_pool.stake_mint @ VerifierPoolError::InvalidTokenAccount,
        constraint = verifier_token_account.owner == verifier.key() @ VerifierPoolError::InvalidTokenAccount
    )]
    pub verifier_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(
        mut,
        address = verifier_pool.vault @ VerifierPoolError::InvalidTokenAccount
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    pub verifier: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn unstake_verifier(ctx: Context<UnstakeVerifier>) -> Result<()> {
    let clock = Clock::get()?;

    let amount = {
        let pool = &mut ctx.accounts.verifier_pool;
        let stake = &mut ctx.accounts.verifier_stake;
        pool.apply_unstake(stake, clock.unix_timestamp)?
    };

    require!(
        ctx.accounts.vault_token_account.amount >= amount,
        VerifierPoolError::InsufficientBalance
    );

    let bump = ctx.accounts.verifier_pool.bump;
    let seeds = &[VerifierPool::SEED_PREFIX, &[bump]];
    let signer_seeds = &[&seeds[..]];

    token_interface::transfer_checked(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.vault_token_account.to_account_info(),
                mint: ctx.accounts.stake_mint.to_account_info(),
                to: ctx.accounts.verifier_token_account.to_account_info(),
                authority: ctx.accounts.verifier_pool.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
        ctx.accounts.stake_mint.decimals,
    )
    .map_err(|_| error!(VerifierPoolError::TransferFailed))?;

    emit!(VerifierUnstaked {
        verifier: ctx.accounts.verifier.key(),
        amount,
        timestamp: clock.unix_timestamp,
    });

    msg!("Verifier {} unstaked {}", ctx.accounts.verifier.key(), amount);
    Ok(())
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Accounts)]
pub struct GetVerifierStatus<'info> {
    #[account(
        seeds = [VerifierPool::SEED_PREFIX],
        bump = verifier_pool.bump,
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    #[account(
        seeds = [VerifierStake::SEED_PREFIX, verifier_stake.verifier.as_ref()],
        bump = verifier_stake.bump,
    )]
    pub verifier_stake: Account<'info, VerifierStake>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct VerifierStatus {
    pub staked_amount: u64,
    pub is_eligible: bool,
    pub cooldown_ends_at: i64,
    pub verification_count: u64,
}

impl VerifierStatus {
    pub fn of(pool: &VerifierPool, stake: &VerifierStake) -> Self {
        Self {
            staked_amount: stake.staked_amount,
            is_eligible: pool.is_eligible(stake),
            cooldown_ends_at: stake.cooldown_ends_at(pool.cooldown_period),
            verification_count: stake.verification_count,
        }
    }
}

pub fn get_verifier_status(ctx: Context<GetVerifierStatus>) -> Result<VerifierStatus> {
    Ok(VerifierStatus::of(&ctx.accounts.verifier_pool, &ctx.accounts.verifier_stake))
}
