//! Pull-based payment escrow.
//!
//! The engine never pushes NEAR at recipients during settlement. Every
//! payout — seller proceeds, royalties, platform fees, outbid refunds —
//! is credited to a pending balance that the recipient withdraws later.
//! A hostile recipient therefore cannot stall or re-enter a sale.

use near_sdk::json_types::U128;
use near_sdk::{env, near, AccountId, Gas, NearToken, Promise, PromiseError};

use crate::internal::check_one_yocto;
use crate::*;

#[near]
impl Contract {
    /// Withdraw `amount` (or the full balance when `amount` is None) from the
    /// caller's pending escrow balance. The balance is debited before the
    /// transfer fires; a failed transfer is re-credited in the callback.
    #[payable]
    #[handle_result]
    pub fn withdraw(&mut self, amount: Option<U128>) -> Result<Promise, MarketplaceError> {
        check_one_yocto()?;
        let account_id = env::predecessor_account_id();

        let balance = self.internal_pending_balance(&account_id);
        let amount = amount.map(|a| a.0).unwrap_or(balance);
        if amount == 0 {
            return Err(MarketplaceError::InvalidInput(
                "Withdrawal amount must be greater than 0".into(),
            ));
        }
        self.internal_debit_escrow(&account_id, amount)?;

        events::emit_escrow_withdrawal(&account_id, amount);
        Ok(Promise::new(account_id.clone())
            .transfer(NearToken::from_yoctonear(amount))
            .then(
                external::ext_self::ext(env::current_account_id())
                    .with_static_gas(Gas::from_tgas(WITHDRAW_RESOLVE_GAS))
                    .resolve_withdraw(account_id, U128(amount)),
            ))
    }

    /// Restore the debited balance if the outward transfer failed.
    #[private]
    pub fn resolve_withdraw(
        &mut self,
        account_id: AccountId,
        amount: U128,
        #[callback_result] result: Result<(), PromiseError>,
    ) {
        if result.is_err() {
            self.internal_credit_escrow(&account_id, amount.0, "withdrawal_reverted");
            events::emit_escrow_withdrawal_failed(&account_id, amount.0);
        }
    }

    // --- Views ---

    pub fn pending_balance_of(&self, account_id: AccountId) -> U128 {
        U128(self.internal_pending_balance(&account_id))
    }

    pub fn get_total_escrowed(&self) -> U128 {
        U128(self.total_escrowed)
    }
}

impl Contract {
    pub(crate) fn internal_pending_balance(&self, account_id: &AccountId) -> u128 {
        self.pending_balances.get(account_id).copied().unwrap_or(0)
    }

    /// Credit escrow and keep the aggregate total in sync. Zero-amount
    /// credits are dropped so dust-free splits never create empty entries.
    pub(crate) fn internal_credit_escrow(
        &mut self,
        account_id: &AccountId,
        amount: u128,
        reason: &str,
    ) {
        if amount == 0 {
            return;
        }
        let balance = self.internal_pending_balance(account_id);
        self.pending_balances
            .insert(account_id.clone(), balance.saturating_add(amount));
        self.total_escrowed = self.total_escrowed.saturating_add(amount);
        events::emit_escrow_credited(account_id, amount, reason);
    }

    pub(crate) fn internal_debit_escrow(
        &mut self,
        account_id: &AccountId,
        amount: u128,
    ) -> Result<(), MarketplaceError> {
        let balance = self.internal_pending_balance(account_id);
        if balance < amount {
            return Err(MarketplaceError::InsufficientBalance(format!(
                "Pending balance {} is less than requested {}",
                balance, amount
            )));
        }
        let remaining = balance - amount;
        if remaining == 0 {
            self.pending_balances.remove(account_id);
        } else {
            self.pending_balances.insert(account_id.clone(), remaining);
        }
        self.total_escrowed = self.total_escrowed.saturating_sub(amount);
        Ok(())
    }
}
