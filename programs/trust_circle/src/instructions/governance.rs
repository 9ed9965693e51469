// programs/trust_circle/src/instructions/governance.rs
//
// Governance Parameter Store (admin only)

use anchor_lang::prelude::*;
use crate::state::Circle;
use crate::events::{CapsUpdated, GovernanceConfigUpdated, MemberLimitsUpdated, MerkleRootUpdated};

#[derive(Accounts)]
pub struct UpdateCircle<'info> {
    #[account(
        mut,
        seeds = [Circle::SEED_PREFIX, &circle.circle_id.to_le_bytes()],
        bump = circle.bump,
    )]
    pub circle: Account<'info, Circle>,

    pub admin: Signer<'info>,
}

pub fn update_governance_config(
    ctx: Context<UpdateCircle>,
    quorum_bps: u16,
    approval_bps: u16,
) -> Result<()> {
    let clock = Clock::get()?;
    let circle = &mut ctx.accounts.circle;

    circle.update_governance_config(&ctx.accounts.admin.key(), quorum_bps, approval_bps)?;

    emit!(GovernanceConfigUpdated {
        circle_id: circle.circle_id,
        quorum_bps,
        approval_bps,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

/// Open claims keep the escalation they were opened with
pub fn set_caps(ctx: Context<UpdateCircle>, cap_internal: u64, cap_one_ext: u64) -> Result<()> {
    let clock = Clock::get()?;
    let circle = &mut ctx.accounts.circle;

    circle.set_caps(&ctx.accounts.admin.key(), cap_internal, cap_one_ext)?;

    if cap_internal > cap_one_ext {
        msg!("Warning: cap_internal {} exceeds cap_one_ext {}", cap_internal, cap_one_ext);
    }

    emit!(CapsUpdated {
        circle_id: circle.circle_id,
        cap_internal,
        cap_one_ext,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

pub fn update_member_limits(
    ctx: Context<UpdateCircle>,
    min_members: u32,
    max_members: u32,
) -> Result<()> {
    let clock = Clock::get()?;
    let circle = &mut ctx.accounts.circle;

    circle.update_member_limits(&ctx.accounts.admin.key(), min_members, max_members)?;

    emit!(MemberLimitsUpdated {
        circle_id: circle.circle_id,
        min_members,
        max_members,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

/// Publish the identity-tree root anonymous votes must prove against
pub fn update_merkle_root(ctx: Context<UpdateCircle>, root: [u8; 32]) -> Result<()> {
    let clock = Clock::get()?;
    let circle = &mut ctx.accounts.circle;

    circle.update_merkle_root(&ctx.accounts.admin.key(), root)?;

    emit!(MerkleRootUpdated {
        circle_id: circle.circle_id,
        root,
        registered_identities: circle.zk_identity_count,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
