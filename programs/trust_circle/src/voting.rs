// programs/trust_circle/src/voting.rs
//
// Vote Arithmetic and Anonymous Membership Proofs
// ===============================================
// Quorum is measured against the active membership at finalize time.
// Approval is measured against votes actually cast.
//
// Anonymous votes carry a group-membership proof. The proof system itself
// lives outside this program; `MembershipProofVerifier` is the seam.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    hash::hash,
    instruction::Instruction,
    program::{get_return_data, invoke},
};
use crate::errors::CircleError;

pub const BPS_DENOMINATOR: u64 = 10_000;

/// Deepest identity tree a proof may reference
pub const MAX_MERKLE_TREE_DEPTH: u8 = 32;

// =============================================================================
// QUORUM / APPROVAL
// =============================================================================

/// Share of active members that voted. Zero votes or zero members is 0.
pub fn participation_bps(total_votes: u32, active_members: u32) -> u64 {
    if total_votes == 0 || active_members == 0 {
        return 0;
    }
    (total_votes as u64 * BPS_DENOMINATOR) / active_members as u64
}

/// Share of cast votes in favor. Zero votes is 0.
pub fn approval_ratio_bps(votes_for: u32, votes_against: u32) -> u64 {
    let total = votes_for as u64 + votes_against as u64;
    if total == 0 {
        return 0;
    }
    (votes_for as u64 * BPS_DENOMINATOR) / total
}

pub fn check_quorum(total_votes: u32, active_members: u32, quorum_bps: u16) -> Result<()> {
    require!(
        participation_bps(total_votes, active_members) >= quorum_bps as u64,
        CircleError::NoQuorum
    );
    Ok(())
}

pub fn check_approval(votes_for: u32, votes_against: u32, approval_bps: u16) -> Result<()> {
    require!(
        approval_ratio_bps(votes_for, votes_against) >= approval_bps as u64,
        CircleError::NotApproved
    );
    Ok(())
}

// =============================================================================
// MEMBERSHIP PROOFS
// =============================================================================

/// Identity group of a circle. Group 0 is reserved as "no group" by
/// Semaphore-style verifiers, so circle ids are shifted by one.
pub fn group_id(circle_id: u64) -> u64 {
    circle_id.saturating_add(1)
}

/// Public inputs bound into an anonymous vote proof
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProofPublicInputs {
    /// Identity group (`group_id(circle_id)`)
    pub group_id: u64,
    pub merkle_tree_depth: u8,
    pub merkle_tree_root: [u8; 32],
    pub nullifier: [u8; 32],
    /// Vote scope (the claim id); a nullifier is only valid for one scope
    pub scope: u64,
    /// The vote itself: 1 = support, 0 = against
    pub message: u8,
}

/// Proof payload supplied by an anonymous voter
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ZkVoteProof {
    pub merkle_tree_depth: u8,
    pub merkle_tree_root: [u8; 32],
    pub nullifier: [u8; 32],
    /// Groth16 proof points
    pub points: [[u8; 32]; 8],
}

impl ZkVoteProof {
    pub fn public_inputs(&self, circle_id: u64, claim_id: u64, support: bool) -> ProofPublicInputs {
        ProofPublicInputs {
            group_id: group_id(circle_id),
            merkle_tree_depth: self.merkle_tree_depth,
            merkle_tree_root: self.merkle_tree_root,
            nullifier: self.nullifier,
            scope: claim_id,
            message: support as u8,
        }
    }

    pub fn has_valid_depth(&self) -> bool {
        (1..=MAX_MERKLE_TREE_DEPTH).contains(&self.merkle_tree_depth)
    }
}

/// Black-box proof predicate
pub trait MembershipProofVerifier {
    fn verify(&self, points: &[[u8; 32]; 8], inputs: &ProofPublicInputs) -> Result<bool>;
}

/// Instruction payload for the external verifier program
#[derive(AnchorSerialize, AnchorDeserialize)]
struct VerifyProofArgs {
    inputs: ProofPublicInputs,
    points: [[u8; 32]; 8],
}

/// Verifies proofs by invoking the circle's configured verifier program.
/// The callee answers through return data: a single byte, 1 for valid.
pub struct ProgramProofVerifier<'a, 'info> {
    pub program: &'a AccountInfo<'info>,
}

impl<'a, 'info> ProgramProofVerifier<'a, 'info> {
    pub const VERIFY_IX_NAME: &'static str = "global:verify_proof";

    fn instruction_data(points: &[[u8; 32]; 8], inputs: &ProofPublicInputs) -> Result<Vec<u8>> {
        let mut data = hash(Self::VERIFY_IX_NAME.as_bytes()).to_bytes()[..8].to_vec();
        let args = VerifyProofArgs {
            inputs: inputs.clone(),
            points: *points,
        };
        let encoded = args
            .try_to_vec()
            .map_err(|_| error!(CircleError::InvalidProof))?;
        data.extend_from_slice(&encoded);
        Ok(data)
    }
}

impl<'a, 'info> MembershipProofVerifier for ProgramProofVerifier<'a, 'info> {
    fn verify(&self, points: &[[u8; 32]; 8], inputs: &ProofPublicInputs) -> Result<bool> {
        let ix = Instruction {
            program_id: *self.program.key,
            accounts: vec![],
            data: Self::instruction_data(points, inputs)?,
        };

        invoke(&ix, &[self.program.clone()]).map_err(|_| error!(CircleError::InvalidProof))?;

        Ok(match get_return_data() {
            Some((program_id, data)) if program_id == *self.program.key => {
                data.first() == Some(&1)
            }
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_five_members() {
        // 1 of 5 = 20%
        assert_eq!(participation_bps(1, 5), 2_000);
        assert_eq!(
            check_quorum(1, 5, 5_000).unwrap_err(),
            CircleError::NoQuorum.into()
        );

        // 3 of 5 = 60%
        assert_eq!(participation_bps(3, 5), 6_000);
        assert!(check_quorum(3, 5, 5_000).is_ok());
    }

    #[test]
    fn test_zero_votes_never_reach_quorum() {
        assert_eq!(participation_bps(0, 5), 0);
        assert_eq!(participation_bps(0, 0), 0);
        assert!(check_quorum(0, 5, 1).is_err());
    }

    #[test]
    fn test_quorum_boundary_is_inclusive() {
        // 2 of 4 = exactly 50%
        assert!(check_quorum(2, 4, 5_000).is_ok());
        // 1 of 3 = 33.33% rounds down
        assert_eq!(participation_bps(1, 3), 3_333);
    }

    #[test]
    fn test_approval_ratio() {
        // 2 for / 3 against = 40%
        assert_eq!(approval_ratio_bps(2, 3), 4_000);
        assert_eq!(
            check_approval(2, 3, 7_000).unwrap_err(),
            CircleError::NotApproved.into()
        );

        // 3 for / 0 against = 100%
        assert_eq!(approval_ratio_bps(3, 0), 10_000);
        assert!(check_approval(3, 0, 7_000).is_ok());
    }

    #[test]
    fn test_approval_without_votes_fails() {
        assert_eq!(approval_ratio_bps(0, 0), 0);
        assert!(check_approval(0, 0, 1).is_err());
    }

    #[test]
    fn test_public_inputs_bind_circle_claim_and_vote() {
        let proof = ZkVoteProof {
            merkle_tree_depth: 20,
            merkle_tree_root: [7u8; 32],
            nullifier: [9u8; 32],
            points: [[0u8; 32]; 8],
        };

        let inputs = proof.public_inputs(4, 12, true);
        assert_eq!(inputs.group_id, 5);
        assert_eq!(inputs.scope, 12);
        assert_eq!(inputs.message, 1);
        assert_eq!(inputs.nullifier, [9u8; 32]);

        assert_eq!(proof.public_inputs(4, 12, false).message, 0);
    }

    #[test]
    fn test_first_circle_has_nonzero_group() {
        let proof = ZkVoteProof {
            merkle_tree_depth: 20,
            merkle_tree_root: [7u8; 32],
            nullifier: [9u8; 32],
            points: [[0u8; 32]; 8],
        };
        assert_eq!(group_id(0), 1);
        assert_eq!(proof.public_inputs(0, 1, true).group_id, 1);
        assert_eq!(group_id(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_merkle_depth_bounds() {
        let mut proof = ZkVoteProof {
            merkle_tree_depth: 0,
            merkle_tree_root: [0u8; 32],
            nullifier: [0u8; 32],
            points: [[0u8; 32]; 8],
        };
        assert!(!proof.has_valid_depth());
        proof.merkle_tree_depth = 1;
        assert!(proof.has_valid_depth());
        proof.merkle_tree_depth = 32;
        assert!(proof.has_valid_depth());
        proof.merkle_tree_depth = 33;
        assert!(!proof.has_valid_depth());
    }

    #[test]
    fn test_verify_instruction_layout() {
        let inputs = ZkVoteProof {
            merkle_tree_depth: 16,
            merkle_tree_root: [1u8; 32],
            nullifier: [2u8; 32],
            points: [[3u8; 32]; 8],
        }
        .public_inputs(0, 1, true);

        let data = ProgramProofVerifier::instruction_data(&[[3u8; 32]; 8], &inputs).unwrap();

        assert_eq!(&data[..8], &hash(b"global:verify_proof").to_bytes()[..8]);
        // discriminator + inputs (8 + 1 + 32 + 32 + 8 + 1) + points (8 * 32)
        assert_eq!(data.len(), 8 + 82 + 256);
    }
}
