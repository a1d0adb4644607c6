//! Atelier Marketplace — fixed-price and timed-auction settlement engine with
//! atomic fee splitting, pull-based refund escrow, and signature-authorized
//! collector mints over single- and multi-edition asset registries.

use near_sdk::store::{IterableMap, IterableSet, LookupMap};
use near_sdk::{near, AccountId, BorshStorageKey, PanicOnDefault, PublicKey};

// --- Modules ---

mod admin;
pub mod constants;
mod errors;
mod escrow;
mod events;
mod external;
mod fees;
mod internal;
mod sale;
mod sale_auction;
mod settlement;
pub mod types;
mod voucher;


pub use constants::*;
pub use errors::MarketplaceError;
pub use external::SaleInfo;
pub use types::*;

// --- Storage Keys ---

#[near]
#[derive(BorshStorageKey)]
pub enum StorageKey {
    Listings,
    BySeller,
    BySellerInner { account_id_hash: Vec<u8> },
    ByAssetContract,
    ByAssetContractInner { account_id_hash: Vec<u8> },
    PendingBalances,
    CompletedFirstSales,
    ConsumedNonces,
    MintingKeys,
    ListingAllowlist,
}

// --- Contract State ---

#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct Contract {
    /// From Cargo.toml; updated on each migration.
    pub version: String,

    pub owner_id: AccountId,
    /// Receives platform fees, collector fees, and buyer surcharges (via escrow).
    pub fee_recipient: AccountId,

    /// Registry for single-edition assets (quantity is always 1).
    pub single_edition_registry: AccountId,
    /// Registry for multi-edition assets.
    pub multi_edition_registry: AccountId,

    pub config: MarketConfig,

    /// Active listings; key = "{asset_contract}:{seller}:{token_id}".
    pub listings: IterableMap<String, Listing>,
    pub by_seller: LookupMap<AccountId, IterableSet<String>>,
    pub by_asset_contract: LookupMap<AccountId, IterableSet<String>>,

    /// Escrowed value withdrawable by each recipient.
    pub pending_balances: LookupMap<AccountId, u128>,
    /// Sum of all pending balances; maintained by every credit and debit.
    pub total_escrowed: u128,

    /// Listing keys whose first sale has settled.
    pub completed_first_sales: LookupMap<String, bool>,
    /// Consumed voucher nonces; key = "{creator_id}:{nonce}".
    pub consumed_nonces: LookupMap<String, bool>,
    /// Ed25519 key authorizing each creator's collector-mint vouchers.
    pub minting_keys: LookupMap<AccountId, PublicKey>,

    /// Accounts allowed to list while the allowlist is enabled.
    pub listing_allowlist: IterableSet<AccountId>,
}

// --- Helpers ---

impl Contract {
    /// Account IDs cannot contain ':'; the token id goes last so it may.
    pub(crate) fn make_listing_id(
        asset_contract: &AccountId,
        seller: &AccountId,
        token_id: &str,
    ) -> String {
        format!(
            "{}{}{}{}{}",
            asset_contract, DELIMITER, seller, DELIMITER, token_id
        )
    }

    pub(crate) fn asset_kind_of(&self, asset_contract: &AccountId) -> Option<AssetKind> {
        if asset_contract == &self.single_edition_registry {
            Some(AssetKind::SingleEdition)
        } else if asset_contract == &self.multi_edition_registry {
            Some(AssetKind::MultiEdition)
        } else {
            None
        }
    }
}
