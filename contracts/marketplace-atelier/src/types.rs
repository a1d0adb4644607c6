use near_sdk::json_types::U128;
use near_sdk::{near, AccountId};

use crate::constants::*;

// --- Enums ---

/// Which ownership model the listed asset follows. Derived from the registry
/// account a listing names; single-edition listings always have quantity 1.
#[near(serializers = [borsh, json])]
#[serde(rename_all = "snake_case")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    SingleEdition,
    MultiEdition,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleEdition => "single_edition",
            Self::MultiEdition => "multi_edition",
        }
    }
}

// --- Structs ---

/// One co-creator's share of a first sale's seller proceeds, in basis points.
/// Shares on a listing or voucher must sum to exactly `BASIS_POINTS`.
#[near(serializers = [borsh, json])]
#[derive(Clone, Debug, PartialEq)]
pub struct CollaboratorShare {
    pub account_id: AccountId,
    pub share_bps: u32,
}

/// English auction state — lives alongside an auction-mode Listing.
#[near(serializers = [borsh, json])]
#[derive(Clone)]
pub struct AuctionState {
    /// yoctoNEAR. Strictly increases across accepted bids.
    pub highest_bid: u128,
    pub highest_bidder: Option<AccountId>,
    pub bid_count: u32,
    /// Set by the first accepted bid only (ns).
    pub start_time: Option<u64>,
    /// start_time + auction duration; pushed out by the anti-snipe rule (ns).
    pub end_time: Option<u64>,
    /// One-way false → true.
    pub settled: bool,
}

impl AuctionState {
    pub(crate) fn new() -> Self {
        Self {
            highest_bid: 0,
            highest_bidder: None,
            bid_count: 0,
            start_time: None,
            end_time: None,
            settled: false,
        }
    }

    pub(crate) fn has_started(&self) -> bool {
        self.bid_count > 0
    }
}

/// An active offer to sell `quantity` editions of one asset at `unit_price`.
/// Keyed by `"{asset_contract}:{seller}:{token_id}"`.
#[near(serializers = [borsh, json])]
#[derive(Clone)]
pub struct Listing {
    pub asset_contract: AccountId,
    pub token_id: String,
    pub seller: AccountId,
    /// yoctoNEAR per edition; the reserve price for auction listings.
    pub unit_price: U128,
    /// Editions originally listed.
    pub quantity: u64,
    pub quantity_sold: u64,
    pub asset_kind: AssetKind,
    /// Captured at listing time; drives the primary/secondary fee split.
    pub is_first_sale: bool,
    /// Royalty snapshot from the registry, capped at the configured maximum.
    pub royalty_bps: u32,
    pub royalty_recipient: Option<AccountId>,
    /// First-sale split; empty = all seller proceeds to the seller.
    pub collaborators: Vec<CollaboratorShare>,
    /// None = fixed-price listing.
    pub auction: Option<AuctionState>,
}

impl Listing {
    pub fn remaining(&self) -> u64 {
        self.quantity.saturating_sub(self.quantity_sold)
    }
}

/// Exact distribution of one sale's gross price.
/// The four amounts always sum to the gross price.
#[near(serializers = [json])]
#[derive(Clone, Debug, PartialEq)]
pub struct FeeBreakdown {
    pub seller_amount: u128,
    pub royalty_amount: u128,
    pub collector_fee_amount: u128,
    pub platform_fee_amount: u128,
}

impl FeeBreakdown {
    pub fn gross(&self) -> u128 {
        self.seller_amount
            + self.royalty_amount
            + self.collector_fee_amount
            + self.platform_fee_amount
    }
}

/// An off-chain purchase authorization signed by the creator's registered
/// minting key. Field order is the wire contract: the signing payload is the
/// borsh serialization of this struct in declaration order.
#[near(serializers = [borsh, json])]
#[derive(Clone)]
pub struct Voucher {
    pub asset_contract: AccountId,
    /// Metadata reference stamped onto the minted asset.
    pub metadata_ref: String,
    pub royalty_bps: u32,
    /// Must sum to exactly `BASIS_POINTS`.
    pub collaborators: Vec<CollaboratorShare>,
    pub quantity: u64,
    pub creator_id: AccountId,
    /// yoctoNEAR per edition.
    pub price: U128,
    /// Consumed at most once per (creator, nonce).
    pub nonce: u64,
}

/// Fee percentages and auction timing. The dependency-injected stand-in for
/// an external config registry: constructed at init, owner-updatable.
#[near(serializers = [borsh, json])]
#[derive(Clone)]
pub struct MarketConfig {
    pub primary_sale_fee_bps: u32,
    pub secondary_sale_fee_bps: u32,
    /// Charged on primary sales only; routed to the fee recipient.
    pub collector_fee_bps: u32,
    /// Buyer-side surcharge on fixed-price and collector-mint purchases.
    pub buyer_surcharge_bps: u32,
    /// Cap applied when the royalty snapshot is taken at listing time.
    pub max_royalty_bps: u32,
    /// Duration from the first accepted bid (ns).
    pub auction_duration_ns: u64,
    /// Bids landing within this window of the end time arm the extension (ns).
    pub final_window_ns: u64,
    /// A bid inside the final window moves the end time to now + this (ns).
    pub extension_ns: u64,
    /// true = only allowlisted accounts may list.
    pub allowlist_enabled: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            primary_sale_fee_bps: DEFAULT_PRIMARY_SALE_FEE_BPS,
            secondary_sale_fee_bps: DEFAULT_SECONDARY_SALE_FEE_BPS,
            collector_fee_bps: DEFAULT_COLLECTOR_FEE_BPS,
            buyer_surcharge_bps: DEFAULT_BUYER_SURCHARGE_BPS,
            max_royalty_bps: MAX_ROYALTY_BPS,
            auction_duration_ns: DEFAULT_AUCTION_DURATION_NS,
            final_window_ns: DEFAULT_FINAL_WINDOW_NS,
            extension_ns: DEFAULT_EXTENSION_NS,
            allowlist_enabled: false,
        }
    }
}

// --- Callback receipts ---
//
// Listing state is mutated before the cross-contract call fires, so the
// resolve callbacks carry everything needed to settle or compensate.

/// State carried from `purchase` into `resolve_purchase`.
#[near(serializers = [json])]
#[derive(Clone, Debug)]
pub struct PurchaseReceipt {
    pub listing_key: String,
    pub asset_contract: AccountId,
    pub token_id: String,
    pub seller: AccountId,
    pub buyer: AccountId,
    pub quantity: u64,
    pub unit_price: U128,
    pub gross: U128,
    pub surcharge: U128,
    pub asset_kind: AssetKind,
    pub is_first_sale: bool,
    pub royalty_bps: u32,
    pub royalty_recipient: Option<AccountId>,
    pub collaborators: Vec<CollaboratorShare>,
    /// true = the listing was removed (sold out) and must be recreated on rollback.
    pub listing_removed: bool,
}

/// State carried from `end_auction` into `resolve_auction`.
#[near(serializers = [json])]
#[derive(Clone, Debug)]
pub struct AuctionReceipt {
    pub listing_key: String,
    pub asset_contract: AccountId,
    pub token_id: String,
    pub seller: AccountId,
    pub winner: AccountId,
    pub winning_bid: U128,
    pub quantity: u64,
    pub asset_kind: AssetKind,
    pub is_first_sale: bool,
    pub royalty_bps: u32,
    pub royalty_recipient: Option<AccountId>,
    pub collaborators: Vec<CollaboratorShare>,
}

/// State carried from `collector_mint` into `resolve_collector_mint`.
#[near(serializers = [json])]
#[derive(Clone, Debug)]
pub struct CollectorMintReceipt {
    pub buyer: AccountId,
    pub creator_id: AccountId,
    pub asset_contract: AccountId,
    pub quantity: u64,
    pub gross: U128,
    pub surcharge: U128,
    pub royalty_bps: u32,
    pub collaborators: Vec<CollaboratorShare>,
    /// "{creator_id}:{nonce}" — removed again if the mint fails.
    pub nonce_key: String,
}
