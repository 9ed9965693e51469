// programs/trust_circle_verifiers/src/instructions/mod.rs

pub mod initialize;
pub mod staking;
pub mod owner;

pub use initialize::*;
pub use staking::*;
pub use owner::*;
