// External contract interfaces for cross-contract calls
//
// `#[ext_contract]` generates helper structs that the compiler flags as dead_code
// even though they are used at runtime for cross-contract calls.
#![allow(dead_code)]

use near_sdk::json_types::U128;
use near_sdk::{ext_contract, near, AccountId};

use crate::types::{AuctionReceipt, CollaboratorShare, CollectorMintReceipt, PurchaseReceipt};

/// Snapshot of everything the engine needs to admit a listing, returned by
/// the registry's `market_sale_info` view. Both registry variants implement
/// the same engine-facing interface; single-edition registries report a
/// balance of 0 or 1.
#[near(serializers = [json])]
#[derive(Clone)]
pub struct SaleInfo {
    pub owner_id: AccountId,
    /// Editions held by `owner_id`.
    pub balance: U128,
    /// Whether this marketplace holds a transfer approval for the asset.
    pub market_approved: bool,
    pub royalty_bps: u32,
    pub royalty_recipient: Option<AccountId>,
    pub collaborators: Vec<CollaboratorShare>,
}

/// Engine-facing asset registry interface (both edition models).
#[ext_contract(ext_asset_registry)]
pub trait AssetRegistry {
    /// Ownership, approval, and royalty snapshot for listing admission.
    fn market_sale_info(&self, token_id: String, owner_id: AccountId) -> SaleInfo;

    /// Custody transfer using the approval granted to this marketplace.
    fn market_transfer(
        &mut self,
        token_id: String,
        sender_id: AccountId,
        receiver_id: AccountId,
        quantity: u64,
        memo: Option<String>,
    );

    /// Mint-with-royalty-and-collaborators for the collector-mint flow.
    /// Returns the new token ID.
    fn market_mint(
        &mut self,
        receiver_id: AccountId,
        metadata_ref: String,
        quantity: u64,
        royalty_bps: u32,
        royalty_recipient: Option<AccountId>,
        collaborators: Vec<CollaboratorShare>,
    ) -> String;
}

/// Self callback interface
#[ext_contract(ext_self)]
pub trait ExtSelf {
    /// Create the listing after the registry snapshot arrives.
    fn process_listing(
        &mut self,
        asset_contract: AccountId,
        token_id: String,
        seller: AccountId,
        unit_price: U128,
        quantity: u64,
        is_auction: bool,
    );

    /// Settle or roll back a fixed-price purchase after the asset transfer.
    fn resolve_purchase(&mut self, receipt: PurchaseReceipt) -> U128;

    /// Settle an auction after the asset transfer to the winner.
    fn resolve_auction(&mut self, receipt: AuctionReceipt);

    /// Settle a collector mint after the registry mint.
    fn resolve_collector_mint(&mut self, receipt: CollectorMintReceipt);

    /// Re-credit escrow if the outward transfer failed.
    fn resolve_withdraw(&mut self, account_id: AccountId, amount: U128);
}
