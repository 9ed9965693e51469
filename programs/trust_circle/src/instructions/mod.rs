// programs/trust_circle/src/instructions/mod.rs

pub mod initialize;
pub mod membership;
pub mod governance;
pub mod claims;
pub mod verification;
pub mod anonymous;
pub mod queries;

pub use initialize::*;
pub use membership::*;
pub use governance::*;
pub use claims::*;
pub use verification::*;
pub use anonymous::*;
pub use queries::*;

use anchor_lang::prelude::*;
use crate::errors::CircleError;
use crate::state::MemberAccount;

/// Read a member PDA that may not exist; a missing record is `NotMember`
pub(crate) fn load_member(info: &AccountInfo) -> Result<MemberAccount> {
    if info.owner != &crate::ID || info.data_is_empty() {
        return err!(CircleError::NotMember);
    }
    let data = info.try_borrow_data()?;
    MemberAccount::try_deserialize(&mut &data[..]).map_err(|_| error!(CircleError::NotMember))
}
