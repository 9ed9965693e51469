// programs/trust_circle/src/instructions/membership.rs
//
// Membership Ledger
// =================
// join -> contribute -> (optional) identity commitment for anonymous voting

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    Mint as MintInterface, TokenAccount as TokenAccountInterface, TokenInterface,
};
use crate::custody::TokenCustody;
use crate::errors::CircleError;
use crate::events::{ContributionMade, MemberJoined, ZkIdentityRegistered};
use crate::state::{Circle, MemberAccount};

// =============================================================================
// JOIN
// =============================================================================

#[derive(Accounts)]
pub struct JoinCircle<'info> {
    #[account(
        mut,
        seeds = [Circle::SEED_PREFIX, &circle.circle_id.to_le_bytes()],
        bump = circle.bump,
    )]
    pub circle: Account<'info, Circle>,

    /// Created on first join; an active record means `AlreadyMember`
    #[account(
        init_if_needed,
        payer = wallet,
        space = 8 + MemberAccount::INIT_SPACE,
        seeds = [MemberAccount::SEED_PREFIX, circle.key().as_ref(), wallet.key().as_ref()],
        bump
    )]
    pub member_account: Account<'info, MemberAccount>,

    #[account(
        constraint = asset_mint.key() == circle.asset @ CircleError::InvalidTokenAccount
    )]
    pub asset_mint: InterfaceAccount<'info, MintInterface>,

    #[account(
        mut,
        constraint = member_token_account.mint == circle.asset @ CircleError::InvalidTokenAccount,
        constraint = member_token_account.owner == wallet.key() @ CircleError::InvalidTokenAccount
    )]
    pub member_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(
        mut,
        address = circle.vault @ CircleError::InvalidTokenAccount
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(mut)]
    pub wallet: Signer<'info>,

    pub system_program: Program<'info, System>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn join_circle(
    ctx: Context<JoinCircle>,
    amount: u64,
    zk_commitment: Option<[u8; 32]>,
) -> Result<()> {
    let clock = Clock::get()?;
    let wallet = ctx.accounts.wallet.key();
    let circle_key = ctx.accounts.circle.key();

    let received = TokenCustody {
        token_program: &ctx.accounts.token_program,
        mint: &ctx.accounts.asset_mint,
        vault: &mut ctx.accounts.vault_token_account,
    }
    .deposit(&ctx.accounts.member_token_account, &ctx.accounts.wallet, amount)?;

    let group_index = {
        let circle = &mut ctx.accounts.circle;
        let member = &mut ctx.accounts.member_account;
        let group_index =
            circle.admit_member(member, wallet, received, zk_commitment, clock.unix_timestamp)?;
        member.circle = circle_key;
        member.bump = ctx.bumps.member_account;
        group_index
    };

    let circle = &ctx.accounts.circle;

    emit!(MemberJoined {
        circle_id: circle.circle_id,
        member: wallet,
        contribution: received,
        active_members: circle.active_members,
        timestamp: clock.unix_timestamp,
    });

    if let (Some(group_index), Some(commitment)) = (group_index, zk_commitment) {
        emit!(ZkIdentityRegistered {
            circle_id: circle.circle_id,
            member: wallet,
            commitment,
            group_index,
            timestamp: clock.unix_timestamp,
        });
    }

    Ok(())
}

// =============================================================================
// CONTRIBUTE
// =============================================================================

#[derive(Accounts)]
pub struct Contribute<'info> {
    #[account(
        mut,
        seeds = [Circle::SEED_PREFIX, &circle.circle_id.to_le_bytes()],
        bump = circle.bump,
    )]
    pub circle: Account<'info, Circle>,

    #[account(
        mut,
        seeds = [MemberAccount::SEED_PREFIX, circle.key().as_ref(), wallet.key().as_ref()],
        bump = member_account.bump,
    )]
    pub member_account: Account<'info, MemberAccount>,

    #[account(
        constraint = asset_mint.key() == circle.asset @ CircleError::InvalidTokenAccount
    )]
    pub asset_mint: InterfaceAccount<'info, MintInterface>,

    #[account(
        mut,
        constraint = member_token_account.mint == circle.asset @ CircleError::InvalidTokenAccount,
        constraint = member_token_account.owner == wallet.key() @ CircleError::InvalidTokenAccount
    )]
    pub member_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    #[account(
        mut,
        address = circle.vault @ CircleError::InvalidTokenAccount
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccountInterface>,

    pub wallet: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn contribute(ctx: Context<Contribute>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;

    let received = TokenCustody {
        token_program: &ctx.accounts.token_program,
        mint: &ctx.accounts.asset_mint,
        vault: &mut ctx.accounts.vault_token_account,
    }
    .deposit(&ctx.accounts.member_token_account, &ctx.accounts.wallet, amount)?;

    let total_contribution = {
        let circle = &mut ctx.accounts.circle;
        let member = &mut ctx.accounts.member_account;
        circle.add_contribution(member, received)?
    };

    emit!(ContributionMade {
        circle_id: ctx.accounts.circle.circle_id,
        member: ctx.accounts.wallet.key(),
        amount: received,
        total_contribution,
        total_pool: ctx.accounts.circle.total_pool,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

// =============================================================================
// REGISTER ZK IDENTITY
// =============================================================================

#[derive(Accounts)]
pub struct RegisterZkIdentity<'info> {
    #[account(
        mut,
        seeds = [Circle::SEED_PREFIX, &circle.circle_id.to_le_bytes()],
        bump = circle.bump,
    )]
    pub circle: Account<'info, Circle>,

    #[account(
        mut,
        seeds = [MemberAccount::SEED_PREFIX, circle.key().as_ref(), wallet.key().as_ref()],
        bump = member_account.bump,
    )]
    pub member_account: Account<'info, MemberAccount>,

    pub wallet: Signer<'info>,
}

pub fn register_zk_identity(ctx: Context<RegisterZkIdentity>, commitment: [u8; 32]) -> Result<()> {
    let clock = Clock::get()?;
    let circle = &mut ctx.accounts.circle;
    let member = &mut ctx.accounts.member_account;

    let group_index = circle.register_identity(member, commitment)?;

    emit!(ZkIdentityRegistered {
        circle_id: circle.circle_id,
        member: ctx.accounts.wallet.key(),
        commitment,
        group_index,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
