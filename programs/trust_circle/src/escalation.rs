// programs/trust_circle/src/escalation.rs
//
// Verifier Escalation Policy
// ==========================
// Larger claims need sign-off from staked external verifiers on top of the
// member vote:
//   amount <= cap_internal               -> 0 approvals
//   cap_internal < amount <= cap_one_ext -> 1 approval
//   amount > cap_one_ext                 -> 2 approvals
//
// The result is frozen on the claim when it is opened.

/// Highest number of external approvals any claim can require
pub const MAX_EXTERNAL_APPROVALS: u8 = 2;

pub fn required_external_approvals(amount: u64, cap_internal: u64, cap_one_ext: u64) -> u8 {
    if amount <= cap_internal {
        0
    } else if amount <= cap_one_ext {
        1
    } else {
        MAX_EXTERNAL_APPROVALS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP_INTERNAL: u64 = 100_000_000; // 100 tokens
    const CAP_ONE_EXT: u64 = 500_000_000; // 500 tokens

    #[test]
    fn test_tiers() {
        assert_eq!(required_external_approvals(50_000_000, CAP_INTERNAL, CAP_ONE_EXT), 0);
        assert_eq!(required_external_approvals(150_000_000, CAP_INTERNAL, CAP_ONE_EXT), 1);
        assert_eq!(required_external_approvals(600_000_000, CAP_INTERNAL, CAP_ONE_EXT), 2);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert_eq!(required_external_approvals(CAP_INTERNAL, CAP_INTERNAL, CAP_ONE_EXT), 0);
        assert_eq!(required_external_approvals(CAP_INTERNAL + 1, CAP_INTERNAL, CAP_ONE_EXT), 1);
        assert_eq!(required_external_approvals(CAP_ONE_EXT, CAP_INTERNAL, CAP_ONE_EXT), 1);
        assert_eq!(required_external_approvals(CAP_ONE_EXT + 1, CAP_INTERNAL, CAP_ONE_EXT), 2);
    }

    #[test]
    fn test_monotonic_in_amount() {
        let mut previous = 0;
        for amount in (0..=1_000_000_000u64).step_by(10_000_000) {
            let required = required_external_approvals(amount, CAP_INTERNAL, CAP_ONE_EXT);
            assert!(required >= previous);
            assert!(required <= MAX_EXTERNAL_APPROVALS);
            previous = required;
        }
    }

    #[test]
    fn test_equal_caps_skip_single_tier() {
        assert_eq!(required_external_approvals(100, 100, 100), 0);
        assert_eq!(required_external_approvals(101, 100, 100), 2);
    }
}
