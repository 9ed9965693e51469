// programs/trust_circle/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum CircleError {
    // Authorization
    #[msg("Caller is not the circle admin")]
    NotOwner,

    #[msg("Not a member")]
    NotMember,

    // State conflict
    #[msg("Already a member")]
    AlreadyMember,

    #[msg("Already voted on this claim")]
    AlreadyVoted,

    #[msg("Verifier already approved this claim")]
    AlreadyApproved,

    #[msg("Nullifier already used")]
    NullifierAlreadyUsed,

    #[msg("Claim already finalized")]
    ClaimFinalized,

    #[msg("ZK identity already registered")]
    IdentityAlreadyRegistered,

    // Capacity / limits
    #[msg("Circle is full")]
    CircleFull,

    #[msg("Not enough members")]
    NotEnoughMembers,

    #[msg("Claim amount exceeds per-claim cap")]
    ExceedsPerClaimCap,

    #[msg("Claim would exceed total coverage limit")]
    ExceedsCoverageLimit,

    #[msg("Vote count already equals active members")]
    VoteCapacityReached,

    #[msg("Policy period has ended")]
    PolicyExpired,

    // Governance outcome
    #[msg("No quorum")]
    NoQuorum,

    #[msg("Not approved")]
    NotApproved,

    #[msg("External verification pending")]
    ExternalVerificationPending,

    #[msg("Verifier has no eligible stake")]
    NotEligibleVerifier,

    // Economic
    #[msg("Insufficient balance")]
    InsufficientBalance,

    #[msg("Token transfer failed")]
    TransferFailed,

    #[msg("Invalid token account")]
    InvalidTokenAccount,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Arithmetic overflow")]
    MathOverflow,

    // Proof validation
    #[msg("Invalid proof")]
    InvalidProof,

    #[msg("Proof verifier does not match circle configuration")]
    ProofVerifierMismatch,

    #[msg("Operation not available in this circle's voting mode")]
    VotingModeMismatch,

    #[msg("Proof references an unknown group root")]
    UnknownMerkleRoot,

    #[msg("Merkle root must be non-zero")]
    InvalidMerkleRoot,

    // Configuration
    #[msg("Basis points must be within (0, 10000]")]
    InvalidBps,

    #[msg("Escalation caps must be positive")]
    InvalidCaps,

    #[msg("Invalid member limits")]
    InvalidMemberLimits,

    #[msg("Invalid circle configuration")]
    InvalidCircleConfig,

    #[msg("Metadata URI too long")]
    MetadataTooLong,
}
