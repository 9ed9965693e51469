// programs/trust_circle/src/custody.rs
//
// Token Custody Adapter
// =====================
// Moves the circle asset in and out of the circle vault. Built on
// token_interface so SPL Token and Token-2022 mints (e.g. PYUSD) both work.
// Deposits report what the vault actually received, which is less than the
// requested amount for Token-2022 mints with a transfer fee. The ledger is
// credited with that figure.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    self, Mint as MintInterface, TokenAccount as TokenAccountInterface, TokenInterface,
    TransferChecked,
};
use crate::errors::CircleError;

pub fn ensure_balance(available: u64, amount: u64) -> Result<()> {
    require!(available >= amount, CircleError::InsufficientBalance);
    Ok(())
}

/// Vault balance increase across a deposit
pub fn received_amount(before: u64, after: u64) -> Result<u64> {
    let received = after.checked_sub(before).ok_or(CircleError::TransferFailed)?;
    require!(received > 0, CircleError::InvalidAmount);
    Ok(received)
}

pub struct TokenCustody<'a, 'info> {
    pub token_program: &'a Interface<'info, TokenInterface>,
    pub mint: &'a InterfaceAccount<'info, MintInterface>,
    pub vault: &'a mut InterfaceAccount<'info, TokenAccountInterface>,
}

impl<'a, 'info> TokenCustody<'a, 'info> {
    /// Pull `amount` from a member-signed token account into the vault.
    /// Returns the amount the vault received.
    pub fn deposit(
        &mut self,
        from: &InterfaceAccount<'info, TokenAccountInterface>,
        authority: &Signer<'info>,
        amount: u64,
    ) -> Result<u64> {
        ensure_balance(from.amount, amount)?;
        let before = self.vault.amount;

        token_interface::transfer_checked(
            CpiContext::new(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: from.to_account_info(),
                    mint: self.mint.to_account_info(),
                    to: self.vault.to_account_info(),
                    authority: authority.to_account_info(),
                },
            ),
            amount,
            self.mint.decimals,
        )
        .map_err(|_| error!(CircleError::TransferFailed))?;

        self.vault.reload()?;
        received_amount(before, self.vault.amount)
    }

    /// Send `amount` from the vault, signed by the vault's owning PDA
    pub fn payout(
        &self,
        to: &InterfaceAccount<'info, TokenAccountInterface>,
        vault_authority: AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
        amount: u64,
    ) -> Result<()> {
        ensure_balance(self.vault.amount, amount)?;
        if amount == 0 {
            return Ok(());
        }

        token_interface::transfer_checked(
            CpiContext::new_with_signer(
                self.token_program.to_account_info(),
                TransferChecked {
                    from: self.vault.to_account_info(),
                    mint: self.mint.to_account_info(),
                    to: to.to_account_info(),
                    authority: vault_authority,
                },
                signer_seeds,
            ),
            amount,
            self.mint.decimals,
        )
        .map_err(|_| error!(CircleError::TransferFailed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_received_amount() {
        assert_eq!(received_amount(1_000, 1_990).unwrap(), 990);
        assert_eq!(
            received_amount(1_000, 1_000).unwrap_err(),
            CircleError::InvalidAmount.into()
        );
        assert_eq!(
            received_amount(1_000, 999).unwrap_err(),
            CircleError::TransferFailed.into()
        );
    }

    #[test]
    fn test_ensure_balance() {
        assert!(ensure_balance(100, 100).is_ok());
        assert!(ensure_balance(100, 0).is_ok());
        assert_eq!(
            ensure_balance(99, 100).unwrap_err(),
            CircleError::InsufficientBalance.into()
        );
    }
}
