// programs/trust_circle_verifiers/src/state.rs

use anchor_lang::prelude::*;
use crate::errors::VerifierPoolError;

/// Cross-circle verifier pool
/// PDA seeds: ["verifier_pool"]
#[account]
#[derive(InitSpace)]
pub struct VerifierPool {
    /// Account allowed to record verifications and slash
    /// (the consuming circle registry once ownership is transferred)
    pub owner: Pubkey,

    /// Set after the one-time ownership handover
    pub ownership_locked: bool,

    /// Collateral mint
    pub stake_mint: Pubkey,

    /// Vault token account holding all stakes
    pub vault: Pubkey,

    /// Minimum stake for eligibility
    pub min_stake: u64,

    /// Seconds after a verification during which unstaking is blocked
    pub cooldown_period: i64,

    /// Sum of all active stakes
    pub total_staked: u64,

    /// Verifiers with a non-zero stake
    pub verifier_count: u32,

    /// Verifications recorded across all circles
    pub total_verifications: u64,

    /// Collateral removed by slashing
    pub total_slashed: u64,

    /// Bump seed
    pub bump: u8,

    /// Vault bump seed
    pub vault_bump: u8,
}

impl VerifierPool {
    pub const SEED_PREFIX: &'static [u8] = b"verifier_pool";
    pub const VAULT_SEED: &'static [u8] = b"verifier_vault";

    pub const DEFAULT_MIN_STAKE: u64 = 20_000_000; // 20 tokens at 6 decimals
    pub const DEFAULT_COOLDOWN: i64 = 24 * 60 * 60; // 1 day

    /// A stake counts only while it meets the current minimum
    pub fn is_eligible(&self, stake: &VerifierStake) -> bool {
        stake.staked_amount > 0 && stake.staked_amount >= self.min_stake
    }

    pub fn transfer_ownership(&mut self, caller: &Pubkey, new_owner: Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.owner, VerifierPoolError::NotOwner);
        require!(!self.ownership_locked, VerifierPoolError::OwnershipLocked);

        self.owner = new_owner;
        self.ownership_locked = true;
        Ok(())
    }

    /// Add `amount` to a verifier's stake. Returns the resulting stake.
    pub fn apply_stake(
        &mut self,
        stake: &mut VerifierStake,
        verifier: Pubkey,
        amount: u64,
        now: i64,
    ) -> Result<u64> {
        require!(amount > 0, VerifierPoolError::InvalidAmount);

        let new_stake = stake
            .staked_amount
            .checked_add(amount)
            .ok_or(VerifierPoolError::MathOverflow)?;
        require!(new_stake >= self.min_stake, VerifierPoolError::StakeBelowMinimum);

        if stake.staked_amount == 0 {
            stake.verifier = verifier;
            stake.staked_at = now;
            self.verifier_count = self.verifier_count.saturating_add(1);
        }
        stake.staked_amount = new_stake;

        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(VerifierPoolError::MathOverflow)?;

        Ok(new_stake)
    }

    /// Zero a verifier's stake. Returns the amount to hand back.
    pub fn apply_unstake(&mut self, stake: &mut VerifierStake, now: i64) -> Result<u64> {
        require!(stake.staked_amount > 0, VerifierPoolError::NoActiveStake);
        require!(
            stake.cooldown_elapsed(now, self.cooldown_period),
            VerifierPoolError::RecentVerificationPending
        );

        let amount = stake.staked_amount;
        stake.staked_amount = 0;

        self.total_staked = self.total_staked.saturating_sub(amount);
        self.verifier_count = self.verifier_count.saturating_sub(1);

        Ok(amount)
    }

    pub fn record_verification(&mut self, stake: &mut VerifierStake, now: i64) -> Result<()> {
        require!(self.is_eligible(stake), VerifierPoolError::NotEligibleVerifier);

        stake.last_verification_at = now;
        stake.verification_count = stake.verification_count.saturating_add(1);
        self.total_verifications = self.total_verifications.saturating_add(1);

        Ok(())
    }

    /// Remove `amount` from a stake. Returns the remaining stake.
    pub fn apply_slash(&mut self, stake: &mut VerifierStake, amount: u64) -> Result<u64> {
        require!(amount > 0, VerifierPoolError::InvalidAmount);
        require!(amount <= stake.staked_amount, VerifierPoolError::SlashExceedsStake);

        stake.staked_amount -= amount;
        stake.slashed_amount = stake.slashed_amount.saturating_add(amount);

        self.total_staked = self.total_staked.saturating_sub(amount);
        self.total_slashed = self.total_slashed.saturating_add(amount);
        if stake.staked_amount == 0 {
            self.verifier_count = self.verifier_count.saturating_sub(1);
        }

        Ok(stake.staked_amount)
    }
}

/// Stake record for a single verifier
/// PDA seeds: ["verifier_stake", verifier]
#[account]
#[derive(InitSpace)]
pub struct VerifierStake {
    /// Verifier wallet
    pub verifier: Pubkey,

    /// Collateral currently staked
    pub staked_amount: u64,

    /// When the current stake was opened
    pub staked_at: i64,

    /// Last successful claim verification (0 if none)
    pub last_verification_at: i64,

    /// Verifications performed
    pub verification_count: u64,

    /// Total collateral lost to slashing
    pub slashed_amount: u64,

    /// Bump seed
    pub bump: u8,
}

impl VerifierStake {
    pub const SEED_PREFIX: &'static [u8] = b"verifier_stake";

    /// Earliest unstake time; 0 when no verification was ever recorded
    pub fn cooldown_ends_at(&self, cooldown_period: i64) -> i64 {
        if self.last_verification_at == 0 {
            return 0;
        }
        self.last_verification_at.saturating_add(cooldown_period)
    }

    pub fn cooldown_elapsed(&self, now: i64, cooldown_period: i64) -> bool {
        now >= self.cooldown_ends_at(cooldown_period)
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const DAY: i64 = 24 * 60 * 60;

    fn create_test_pool() -> VerifierPool {
        VerifierPool {
            owner: Pubkey::new_unique(),
            ownership_locked: false,
            stake_mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            min_stake: VerifierPool::DEFAULT_MIN_STAKE,
            cooldown_period: VerifierPool::DEFAULT_COOLDOWN,
            total_staked: 0,
            verifier_count: 0,
            total_verifications: 0,
            total_slashed: 0,
            bump: 255,
            vault_bump: 254,
        }
    }

    fn create_empty_stake() -> VerifierStake {
        VerifierStake {
            verifier: Pubkey::default(),
            staked_amount: 0,
            staked_at: 0,
            last_verification_at: 0,
            verification_count: 0,
            slashed_amount: 0,
            bump: 255,
        }
    }

    fn staked(pool: &mut VerifierPool, amount: u64) -> VerifierStake {
        let mut stake = create_empty_stake();
        pool.apply_stake(&mut stake, Pubkey::new_unique(), amount, NOW).unwrap();
        stake
    }

    // ==================== CONFIG ====================

    #[test]
    fn test_pool_defaults() {
        assert_eq!(VerifierPool::DEFAULT_MIN_STAKE, 20_000_000);
        assert_eq!(VerifierPool::DEFAULT_COOLDOWN, 86_400);
        assert_eq!(VerifierPool::SEED_PREFIX, b"verifier_pool");
        assert_eq!(VerifierStake::SEED_PREFIX, b"verifier_stake");
    }

    // ==================== STAKING ====================

    #[test]
    fn test_stake_at_or_above_minimum() {
        let mut pool = create_test_pool();
        let verifier = Pubkey::new_unique();
        let mut stake = create_empty_stake();

        let total = pool.apply_stake(&mut stake, verifier, 30_000_000, NOW).unwrap();

        assert_eq!(total, 30_000_000);
        assert_eq!(stake.verifier, verifier);
        assert_eq!(stake.staked_at, NOW);
        assert_eq!(pool.total_staked, 30_000_000);
        assert_eq!(pool.verifier_count, 1);
        assert!(pool.is_eligible(&stake));
    }

    #[test]
    fn test_stake_below_minimum_rejected() {
        let mut pool = create_test_pool();
        let mut stake = create_empty_stake();

        let err = pool
            .apply_stake(&mut stake, Pubkey::new_unique(), 10_000_000, NOW)
            .unwrap_err();

        assert_eq!(err, VerifierPoolError::StakeBelowMinimum.into());
        assert_eq!(stake.staked_amount, 0);
        assert_eq!(pool.total_staked, 0);
        assert_eq!(pool.verifier_count, 0);
    }

    #[test]
    fn test_top_up_counts_toward_minimum() {
        let mut pool = create_test_pool();
        let mut stake = staked(&mut pool, 20_000_000);

        // A small top-up is fine because the resulting stake stays above minimum
        let verifier = stake.verifier;
        let total = pool
            .apply_stake(&mut stake, verifier, 1_000, NOW + 10)
            .unwrap();

        assert_eq!(total, 20_001_000);
        assert_eq!(stake.staked_at, NOW);
        assert_eq!(pool.verifier_count, 1);
    }

    #[test]
    fn test_zero_stake_rejected() {
        let mut pool = create_test_pool();
        let mut stake = create_empty_stake();
        let err = pool
            .apply_stake(&mut stake, Pubkey::new_unique(), 0, NOW)
            .unwrap_err();
        assert_eq!(err, VerifierPoolError::InvalidAmount.into());
    }

    #[test]
    fn test_minimum_applies_to_amount_received() {
        let mut pool = create_test_pool();
        let mut stake = create_empty_stake();

        // 20 tokens sent through a 1% transfer-fee mint arrive as 19.8
        let received = 20_000_000 - 20_000_000 / 100;
        let err = pool
            .apply_stake(&mut stake, Pubkey::new_unique(), received, NOW)
            .unwrap_err();

        assert_eq!(err, VerifierPoolError::StakeBelowMinimum.into());
        assert_eq!(pool.total_staked, 0);
        assert!(!pool.is_eligible(&stake));
    }

    // ==================== COOLDOWN ====================

    #[test]
    fn test_unstake_without_verification_is_immediate() {
        let mut pool = create_test_pool();
        let mut stake = staked(&mut pool, 30_000_000);

        let returned = pool.apply_unstake(&mut stake, NOW).unwrap();

        assert_eq!(returned, 30_000_000);
        assert_eq!(stake.staked_amount, 0);
        assert_eq!(pool.total_staked, 0);
        assert_eq!(pool.verifier_count, 0);
    }

    #[test]
    fn test_unstake_blocked_during_cooldown() {
        let mut pool = create_test_pool();
        let mut stake = staked(&mut pool, 30_000_000);
        pool.record_verification(&mut stake, NOW).unwrap();

        let err = pool.apply_unstake(&mut stake, NOW + DAY - 1).unwrap_err();
        assert_eq!(err, VerifierPoolError::RecentVerificationPending.into());
        assert_eq!(stake.staked_amount, 30_000_000);

        let returned = pool.apply_unstake(&mut stake, NOW + DAY).unwrap();
        assert_eq!(returned, 30_000_000);
        assert_eq!(stake.staked_amount, 0);
    }

    #[test]
    fn test_verification_extends_cooldown() {
        let mut pool = create_test_pool();
        let mut stake = staked(&mut pool, 30_000_000);

        pool.record_verification(&mut stake, NOW).unwrap();
        pool.record_verification(&mut stake, NOW + DAY / 2).unwrap();

        assert_eq!(stake.verification_count, 2);
        assert_eq!(pool.total_verifications, 2);
        assert_eq!(stake.cooldown_ends_at(pool.cooldown_period), NOW + DAY / 2 + DAY);
        assert!(!stake.cooldown_elapsed(NOW + DAY, pool.cooldown_period));
    }

    #[test]
    fn test_unstake_empty_rejected() {
        let mut pool = create_test_pool();
        let mut stake = create_empty_stake();
        let err = pool.apply_unstake(&mut stake, NOW).unwrap_err();
        assert_eq!(err, VerifierPoolError::NoActiveStake.into());
    }

    #[test]
    fn test_record_verification_requires_eligibility() {
        let mut pool = create_test_pool();
        let mut stake = create_empty_stake();
        let err = pool.record_verification(&mut stake, NOW).unwrap_err();
        assert_eq!(err, VerifierPoolError::NotEligibleVerifier.into());
        assert_eq!(stake.last_verification_at, 0);
    }

    // ==================== OWNERSHIP ====================

    #[test]
    fn test_ownership_transfers_once() {
        let mut pool = create_test_pool();
        let original = pool.owner;
        let registry = Pubkey::new_unique();

        let err = pool
            .transfer_ownership(&Pubkey::new_unique(), registry)
            .unwrap_err();
        assert_eq!(err, VerifierPoolError::NotOwner.into());

        pool.transfer_ownership(&original, registry).unwrap();
        assert_eq!(pool.owner, registry);
        assert!(pool.ownership_locked);

        let err = pool
            .transfer_ownership(&registry, Pubkey::new_unique())
            .unwrap_err();
        assert_eq!(err, VerifierPoolError::OwnershipLocked.into());
    }

    // ==================== SLASHING ====================

    #[test]
    fn test_slash_below_minimum_removes_eligibility() {
        let mut pool = create_test_pool();
        let mut stake = staked(&mut pool, 30_000_000);

        let remaining = pool.apply_slash(&mut stake, 15_000_000).unwrap();

        assert_eq!(remaining, 15_000_000);
        assert_eq!(stake.slashed_amount, 15_000_000);
        assert_eq!(pool.total_staked, 15_000_000);
        assert_eq!(pool.total_slashed, 15_000_000);
        assert_eq!(pool.verifier_count, 1);
        assert!(!pool.is_eligible(&stake));
    }

    #[test]
    fn test_full_slash_drops_verifier() {
        let mut pool = create_test_pool();
        let mut stake = staked(&mut pool, 30_000_000);

        pool.apply_slash(&mut stake, 30_000_000).unwrap();
        assert_eq!(pool.verifier_count, 0);

        let err = pool.apply_slash(&mut stake, 1).unwrap_err();
        assert_eq!(err, VerifierPoolError::SlashExceedsStake.into());
    }
}
