// programs/trust_circle_verifiers/src/instructions/initialize.rs
//
// Verifier Pool Initialization
// ============================
// Creates the pool config and the vault that custodies every stake.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    Mint as MintInterface, TokenAccount as TokenAccountInterface, TokenInterface,
};
use crate::state::VerifierPool;
use crate::events::{PoolOwnershipTransferred, VerifierPoolInitialized};
use crate::errors::VerifierPoolError;

// =============================================================================
// INITIALIZE POOL
// =============================================================================

#[derive(Accounts)]
pub struct InitializePool<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + VerifierPool::INIT_SPACE,
        seeds = [VerifierPool::SEED_PREFIX],
        bump
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    /// Collateral mint (SPL Token or Token-2022)
    pub stake_mint: InterfaceAccount<'info, MintInterface>,

    #[account(
        init,
        payer = authority,
        token::mint = stake_mint,
        token::authority = verifier_pool,
        token::token_program = token_program,
        seeds = [VerifierPool::VAULT_SEED, verifier_pool.key().as_ref()],
        bump
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,

    pub token_program: Interface<'info, TokenInterface>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Default)]
pub struct InitializePoolParams {
    /// Defaults to `VerifierPool::DEFAULT_MIN_STAKE`
    pub min_stake: Option<u64>,
    /// Defaults to `VerifierPool::DEFAULT_COOLDOWN`
    pub cooldown_period: Option<i64>,
}

pub fn handler(ctx: Context<InitializePool>, params: InitializePoolParams) -> Result<()> {
    let clock = Clock::get()?;

    let min_stake = params.min_stake.unwrap_or(VerifierPool::DEFAULT_MIN_STAKE);
    let cooldown_period = params.cooldown_period.unwrap_or(VerifierPool::DEFAULT_COOLDOWN);

    require!(min_stake > 0, VerifierPoolError::InvalidPoolConfig);
    require!(cooldown_period >= 0, VerifierPoolError::InvalidPoolConfig);

    let pool = &mut ctx.accounts.verifier_pool;
    pool.owner = ctx.accounts.authority.key();
    pool.ownership_locked = false;
    pool.stake_mint = ctx.accounts.stake_mint.key();
    pool.vault = ctx.accounts.vault_token_account.key();
    pool.min_stake = min_stake;
    pool.cooldown_period = cooldown_period;
    pool.total_staked = 0;
    pool.verifier_count = 0;
    pool.total_verifications = 0;
    pool.total_slashed = 0;
    pool.bump = ctx.bumps.verifier_pool;
    pool.vault_bump = ctx.bumps.vault_token_account;

    emit!(VerifierPoolInitialized {
        owner: pool.owner,
        stake_mint: pool.stake_mint,
        min_stake,
        cooldown_period,
        timestamp: clock.unix_timestamp,
    });

    msg!("Verifier pool initialized (min stake {}, cooldown {}s)", min_stake, cooldown_period);
    Ok(())
}

// =============================================================================
// TRANSFER OWNERSHIP
// =============================================================================

#[derive(Accounts)]
pub struct TransferOwnership<'info> {
    #[account(
        mut,
        seeds = [VerifierPool::SEED_PREFIX],
        bump = verifier_pool.bump,
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    pub owner: Signer<'info>,
}

pub fn transfer_ownership(ctx: Context<TransferOwnership>, new_owner: Pubkey) -> Result<()> {
    let clock = Clock::get()?;
    let pool = &mut ctx.accounts.verifier_pool;
    let previous_owner = pool.owner;

    pool.transfer_ownership(&ctx.accounts.owner.key(), new_owner)?;

    emit!(PoolOwnershipTransferred {
        previous_owner,
        new_owner,
        timestamp: clock.unix_timestamp,
    });

    msg!("Verifier pool ownership transferred to {}", new_owner);
    Ok(())
}
