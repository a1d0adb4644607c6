use crate::tests::test_utils::*;
use crate::*;
use near_sdk::json_types::U128;
use near_sdk::{testing_env, PromiseError};

#[test]
fn credit_accumulates_and_tracks_total() {
    let mut contract = new_contract();

    contract.internal_credit_escrow(&seller(), near(2), "test");
    contract.internal_credit_escrow(&seller(), near(3), "test");
    contract.internal_credit_escrow(&buyer(), near(1), "test");

    assert_eq!(contract.pending_balance_of(seller()).0, near(5));
    assert_eq!(contract.pending_balance_of(buyer()).0, near(1));
    assert_eq!(contract.get_total_escrowed().0, near(6));
}

#[test]
fn zero_credit_creates_no_entry() {
    let mut contract = new_contract();
    contract.internal_credit_escrow(&seller(), 0, "test");
    assert_eq!(contract.pending_balance_of(seller()).0, 0);
    assert_eq!(contract.get_total_escrowed().0, 0);
}

#[test]
fn debit_reduces_and_removes_at_zero() {
    let mut contract = new_contract();
    contract.internal_credit_escrow(&seller(), near(5), "test");

    contract.internal_debit_escrow(&seller(), near(2)).unwrap();
    assert_eq!(contract.pending_balance_of(seller()).0, near(3));

    contract.internal_debit_escrow(&seller(), near(3)).unwrap();
    assert_eq!(contract.pending_balance_of(seller()).0, 0);
    assert_eq!(contract.get_total_escrowed().0, 0);
}

#[test]
fn debit_beyond_balance_fails() {
    let mut contract = new_contract();
    contract.internal_credit_escrow(&seller(), near(1), "test");

    let err = contract.internal_debit_escrow(&seller(), near(2)).unwrap_err();
    assert!(matches!(err, MarketplaceError::InsufficientBalance(_)));
    // Balance untouched by the failed debit.
    assert_eq!(contract.pending_balance_of(seller()).0, near(1));
}

#[test]
fn withdraw_debits_before_transfer() {
    let mut contract = new_contract();
    contract.internal_credit_escrow(&seller(), near(5), "test");

    testing_env!(context_with_deposit(seller(), 1).build());
    contract.withdraw(Some(U128(near(2)))).unwrap();

    assert_eq!(contract.pending_balance_of(seller()).0, near(3));
    assert_eq!(contract.get_total_escrowed().0, near(3));
}

#[test]
fn withdraw_none_drains_full_balance() {
    let mut contract = new_contract();
    contract.internal_credit_escrow(&seller(), near(5), "test");

    testing_env!(context_with_deposit(seller(), 1).build());
    contract.withdraw(None).unwrap();

    assert_eq!(contract.pending_balance_of(seller()).0, 0);
}

#[test]
fn withdraw_with_empty_balance_fails() {
    let mut contract = new_contract();
    testing_env!(context_with_deposit(seller(), 1).build());

    let err = contract.withdraw(None).err().unwrap();
    assert!(matches!(err, MarketplaceError::InvalidInput(_)));
}

#[test]
fn withdraw_requires_one_yocto() {
    let mut contract = new_contract();
    contract.internal_credit_escrow(&seller(), near(5), "test");

    testing_env!(context(seller()).build());
    let err = contract.withdraw(None).err().unwrap();
    assert!(matches!(err, MarketplaceError::IncorrectAmount(_)));
}

#[test]
fn failed_withdrawal_is_recredited() {
    let mut contract = new_contract();
    contract.internal_credit_escrow(&seller(), near(5), "test");

    testing_env!(context_with_deposit(seller(), 1).build());
    contract.withdraw(Some(U128(near(5)))).unwrap();
    assert_eq!(contract.pending_balance_of(seller()).0, 0);

    // Transfer failed; the callback restores the ledger.
    testing_env!(context("market.near".parse().unwrap()).build());
    contract.resolve_withdraw(seller(), U128(near(5)), Err(PromiseError::Failed));

    assert_eq!(contract.pending_balance_of(seller()).0, near(5));
    assert_eq!(contract.get_total_escrowed().0, near(5));
}

#[test]
fn successful_withdrawal_leaves_ledger_alone() {
    let mut contract = new_contract();
    contract.internal_credit_escrow(&seller(), near(5), "test");

    testing_env!(context_with_deposit(seller(), 1).build());
    contract.withdraw(Some(U128(near(2)))).unwrap();

    testing_env!(context("market.near".parse().unwrap()).build());
    contract.resolve_withdraw(seller(), U128(near(2)), Ok(()));

    assert_eq!(contract.pending_balance_of(seller()).0, near(3));
}
