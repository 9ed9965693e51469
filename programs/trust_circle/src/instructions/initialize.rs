// programs/trust_circle/src/instructions/initialize.rs
//
// Registry and Circle Creation
// ============================
// The registry takes ownership of the verifier pool when it is created, so
// every circle it deploys shares one cross-circle verifier set.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    Mint as MintInterface, TokenAccount as TokenAccountInterface, TokenInterface,
};
use trust_circle_verifiers::program::TrustCircleVerifiers;
use trust_circle_verifiers::state::VerifierPool;
use crate::state::{CircleRegistry, Circle, VotingMode};
use crate::events::{RegistryInitialized, CircleCreated};

// =============================================================================
// INITIALIZE REGISTRY
// =============================================================================

#[derive(Accounts)]
pub struct InitializeRegistry<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + CircleRegistry::INIT_SPACE,
        seeds = [CircleRegistry::SEED_PREFIX],
        bump
    )]
    pub circle_registry: Account<'info, CircleRegistry>,

    /// Pool whose ownership moves to the registry PDA
    #[account(
        mut,
        seeds = [VerifierPool::SEED_PREFIX],
        bump = verifier_pool.bump,
        seeds::program = trust_circle_verifiers::ID,
    )]
    pub verifier_pool: Account<'info, VerifierPool>,

    /// Current pool owner
    #[account(mut)]
    pub authority: Signer<'info>,

    pub verifier_program: Program<'info, TrustCircleVerifiers>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeRegistry>) -> Result<()> {
    let clock = Clock::get()?;
    let registry_key = ctx.accounts.circle_registry.key();

    let registry = &mut ctx.accounts.circle_registry;
    registry.authority = ctx.accounts.authority.key();
    registry.verifier_pool = ctx.accounts.verifier_pool.key();
    registry.circle_count = 0;
    registry.bump = ctx.bumps.circle_registry;

    trust_circle_verifiers::cpi::transfer_ownership(
        CpiContext::new(
            ctx.accounts.verifier_program.to_account_info(),
            trust_circle_verifiers::cpi::accounts::TransferOwnership {
                verifier_pool: ctx.accounts.verifier_pool.to_account_info(),
                owner: ctx.accounts.authority.to_account_info(),
            },
        ),
        registry_key,
    )?;

    emit!(RegistryInitialized {
        authority: ctx.accounts.authority.key(),
        verifier_pool: ctx.accounts.verifier_pool.key(),
        timestamp: clock.unix_timestamp,
    });

    msg!("Circle registry initialized; verifier pool now owned by {}", registry_key);
    Ok(())
}

// =============================================================================
// CREATE CIRCLE
// =============================================================================

#[derive(Accounts)]
pub struct CreateCircle<'info> {
    #[account(
        mut,
        seeds = [CircleRegistry::SEED_PREFIX],
        bump = circle_registry.bump,
    )]
    pub circle_registry: Account<'info, CircleRegistry>,

    #[account(
        init,
        payer = creator,
        space = 8 + Circle::INIT_SPACE,
        seeds = [Circle::SEED_PREFIX, &circle_registry.circle_count.to_le_bytes()],
        bump
    )]
    pub circle: Account<'info, Circle>,

    /// Pooled asset (SPL Token or Token-2022)
    pub asset_mint: InterfaceAccount<'info, MintInterface>,

    #[account(
        init,
        payer = creator,
        token::mint = asset_mint,
        token::authority = circle,
        token::token_program = token_program,
        seeds = [Circle::VAULT_SEED, circle.key().as_ref()],
        bump
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(mut)]
    pub creator: Signer<'info>,

    pub system_program: Program<'info, System>,

    pub token_program: Interface<'info, TokenInterface>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct CreateCircleParams {
    /// Governance admin; defaults to the creator
    pub admin: Option<Pubkey>,
    pub policy_end: i64,
    pub co_pay_bps: u16,
    pub per_claim_cap: u64,
    pub coverage_limit_total: u64,
    pub quorum_bps: Option<u16>,
    pub approval_bps: Option<u16>,
    pub min_members: Option<u32>,
    pub max_members: Option<u32>,
    pub cap_internal: Option<u64>,
    pub cap_one_ext: Option<u64>,
    pub voting_mode: VotingMode,
    /// Required for anonymous circles
    pub proof_verifier: Option<Pubkey>,
}

pub fn create_circle(ctx: Context<CreateCircle>, params: CreateCircleParams) -> Result<()> {
    let clock = Clock::get()?;
    let circle_key = ctx.accounts.circle.key();
    let circle_id = ctx.accounts.circle_registry.allocate_circle_id()?;
    let verifier_pool = ctx.accounts.circle_registry.verifier_pool;

    let circle = &mut ctx.accounts.circle;
    circle.circle_id = circle_id;
    circle.admin = params.admin.unwrap_or(ctx.accounts.creator.key());
    circle.asset = ctx.accounts.asset_mint.key();
    circle.vault = ctx.accounts.vault_token_account.key();
    circle.policy_end = params.policy_end;
    circle.co_pay_bps = params.co_pay_bps;
    circle.per_claim_cap = params.per_claim_cap;
    circle.coverage_limit_total = params.coverage_limit_total;
    circle.total_pool = 0;
    circle.quorum_bps = params.quorum_bps.unwrap_or(Circle::DEFAULT_QUORUM_BPS);
    circle.approval_bps = params.approval_bps.unwrap_or(Circle::DEFAULT_APPROVAL_BPS);
    circle.min_members = params.min_members.unwrap_or(Circle::DEFAULT_MIN_MEMBERS);
    circle.max_members = params.max_members.unwrap_or(Circle::DEFAULT_MAX_MEMBERS);
    circle.cap_internal = params.cap_internal.unwrap_or(Circle::DEFAULT_CAP_INTERNAL);
    circle.cap_one_ext = params.cap_one_ext.unwrap_or(Circle::DEFAULT_CAP_ONE_EXT);
    circle.voting_mode = params.voting_mode;
    circle.proof_verifier = params.proof_verifier;
    circle.verifier_pool = verifier_pool;
    circle.active_members = 0;
    circle.total_members = 0;
    circle.next_claim_id = 1;
    circle.total_approved_payouts = 0;
    circle.total_contributions = 0;
    circle.zk_identity_count = 0;
    circle.merkle_roots = [[0u8; 32]; Circle::MERKLE_ROOT_HISTORY];
    circle.merkle_root_index = 0;
    circle.zk_votes = 0;
    circle.nullifiers_used = 0;
    circle.created_at = clock.unix_timestamp;
    circle.bump = ctx.bumps.circle;
    circle.vault_bump = ctx.bumps.vault_token_account;

    circle.validate_config(clock.unix_timestamp)?;

    emit!(CircleCreated {
        circle_id,
        circle: circle_key,
        admin: circle.admin,
        asset: circle.asset,
        voting_mode: circle.voting_mode,
        policy_end: circle.policy_end,
        co_pay_bps: circle.co_pay_bps,
        per_claim_cap: circle.per_claim_cap,
        coverage_limit_total: circle.coverage_limit_total,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Circle {} created: {:?} voting, {}-{} members",
        circle_id,
        circle.voting_mode,
        circle.min_members,
        circle.max_members
    );
    Ok(())
}
