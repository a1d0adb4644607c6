//! Structured event emission.
//!
//! Every state change emits one JSON event wrapped in the standard
//! `EVENT_JSON:` envelope so indexers can follow listings, sales, and escrow
//! movements without replaying contract state.

use near_sdk::json_types::U128;
use near_sdk::serde_json::{json, Map, Value};
use near_sdk::{env, AccountId};

use crate::types::{AssetKind, FeeBreakdown};

pub const EVENT_STANDARD: &str = "atelier";
pub const EVENT_VERSION: &str = "1.0.0";
const EVENT_PREFIX: &str = "EVENT_JSON:";

// Event categories
pub const MARKET: &str = "market";
pub const ESCROW: &str = "escrow";
pub const ADMIN: &str = "admin";

/// Values accepted by `EventBuilder::add`.
pub trait IntoEventValue {
    fn into_event_value(self) -> Value;
}

impl IntoEventValue for &str {
    fn into_event_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoEventValue for String {
    fn into_event_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoEventValue for &AccountId {
    fn into_event_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoEventValue for u64 {
    fn into_event_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoEventValue for u32 {
    fn into_event_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoEventValue for bool {
    fn into_event_value(self) -> Value {
        Value::Bool(self)
    }
}

/// u128 amounts are emitted as decimal strings, matching U128 JSON form.
impl IntoEventValue for u128 {
    fn into_event_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoEventValue for U128 {
    fn into_event_value(self) -> Value {
        Value::String(self.0.to_string())
    }
}

impl IntoEventValue for Value {
    fn into_event_value(self) -> Value {
        self
    }
}

pub struct EventBuilder {
    category: &'static str,
    event: &'static str,
    data: Map<String, Value>,
}

impl EventBuilder {
    pub fn new(category: &'static str, event: &'static str) -> Self {
        Self {
            category,
            event,
            data: Map::new(),
        }
    }

    pub fn add(mut self, key: &str, value: impl IntoEventValue) -> Self {
        self.data.insert(key.to_string(), value.into_event_value());
        self
    }

    pub fn add_opt(self, key: &str, value: Option<impl IntoEventValue>) -> Self {
        match value {
            Some(v) => self.add(key, v),
            None => self,
        }
    }

    pub fn emit(self) {
        let envelope = json!({
            "standard": EVENT_STANDARD,
            "version": EVENT_VERSION,
            "event": format!("{}_{}", self.category, self.event),
            "data": [Value::Object(self.data)],
        });
        env::log_str(&format!("{}{}", EVENT_PREFIX, envelope));
    }
}

fn breakdown_value(breakdown: &FeeBreakdown) -> Value {
    json!({
        "seller_amount": breakdown.seller_amount.to_string(),
        "royalty_amount": breakdown.royalty_amount.to_string(),
        "collector_fee_amount": breakdown.collector_fee_amount.to_string(),
        "platform_fee_amount": breakdown.platform_fee_amount.to_string(),
    })
}

// --- Market events ---

#[allow(clippy::too_many_arguments)]
pub fn emit_listed(
    listing_key: &str,
    seller: &AccountId,
    asset_contract: &AccountId,
    token_id: &str,
    unit_price: u128,
    quantity: u64,
    asset_kind: AssetKind,
    is_auction: bool,
    is_first_sale: bool,
) {
    EventBuilder::new(MARKET, "listed")
        .add("listing_key", listing_key)
        .add("seller", seller)
        .add("asset_contract", asset_contract)
        .add("token_id", token_id)
        .add("unit_price", unit_price)
        .add("quantity", quantity)
        .add("asset_kind", asset_kind.as_str())
        .add("is_auction", is_auction)
        .add("is_first_sale", is_first_sale)
        .emit();
}

pub fn emit_delisted(listing_key: &str, seller: &AccountId) {
    EventBuilder::new(MARKET, "delisted")
        .add("listing_key", listing_key)
        .add("seller", seller)
        .emit();
}

pub fn emit_price_updated(listing_key: &str, old_price: u128, new_price: u128) {
    EventBuilder::new(MARKET, "price_updated")
        .add("listing_key", listing_key)
        .add("old_price", old_price)
        .add("new_price", new_price)
        .emit();
}

pub fn emit_purchase(
    listing_key: &str,
    buyer: &AccountId,
    seller: &AccountId,
    quantity: u64,
    gross: u128,
    surcharge: u128,
    is_first_sale: bool,
    breakdown: &FeeBreakdown,
) {
    EventBuilder::new(MARKET, "purchase")
        .add("listing_key", listing_key)
        .add("buyer", buyer)
        .add("seller", seller)
        .add("quantity", quantity)
        .add("gross", gross)
        .add("surcharge", surcharge)
        .add("is_first_sale", is_first_sale)
        .add("breakdown", breakdown_value(breakdown))
        .emit();
}

pub fn emit_purchase_failed(listing_key: &str, buyer: &AccountId, refunded: u128) {
    EventBuilder::new(MARKET, "purchase_failed")
        .add("listing_key", listing_key)
        .add("buyer", buyer)
        .add("refunded", refunded)
        .emit();
}

pub fn emit_bid_placed(
    listing_key: &str,
    bidder: &AccountId,
    amount: u128,
    bid_count: u32,
    end_time: u64,
    extended: bool,
) {
    EventBuilder::new(MARKET, "bid_placed")
        .add("listing_key", listing_key)
        .add("bidder", bidder)
        .add("amount", amount)
        .add("bid_count", bid_count)
        .add("end_time", end_time)
        .add("extended", extended)
        .emit();
}

pub fn emit_auction_settled(
    listing_key: &str,
    winner: &AccountId,
    seller: &AccountId,
    winning_bid: u128,
    breakdown: &FeeBreakdown,
) {
    EventBuilder::new(MARKET, "auction_settled")
        .add("listing_key", listing_key)
        .add("winner", winner)
        .add("seller", seller)
        .add("winning_bid", winning_bid)
        .add("breakdown", breakdown_value(breakdown))
        .emit();
}

pub fn emit_auction_settle_failed(listing_key: &str, winner: &AccountId, refunded: u128) {
    EventBuilder::new(MARKET, "auction_settle_failed")
        .add("listing_key", listing_key)
        .add("winner", winner)
        .add("refunded", refunded)
        .emit();
}

pub fn emit_auction_cancelled(listing_key: &str, seller: &AccountId) {
    EventBuilder::new(MARKET, "auction_cancelled")
        .add("listing_key", listing_key)
        .add("seller", seller)
        .emit();
}

pub fn emit_collector_mint(
    creator_id: &AccountId,
    buyer: &AccountId,
    token_id: &str,
    quantity: u64,
    gross: u128,
    breakdown: &FeeBreakdown,
) {
    EventBuilder::new(MARKET, "collector_mint")
        .add("creator_id", creator_id)
        .add("buyer", buyer)
        .add("token_id", token_id)
        .add("quantity", quantity)
        .add("gross", gross)
        .add("breakdown", breakdown_value(breakdown))
        .emit();
}

pub fn emit_collector_mint_failed(creator_id: &AccountId, buyer: &AccountId, refunded: u128) {
    EventBuilder::new(MARKET, "collector_mint_failed")
        .add("creator_id", creator_id)
        .add("buyer", buyer)
        .add("refunded", refunded)
        .emit();
}

pub fn emit_minting_key_registered(creator_id: &AccountId) {
    EventBuilder::new(MARKET, "minting_key_registered")
        .add("creator_id", creator_id)
        .emit();
}

// --- Escrow events ---

pub fn emit_escrow_credited(account_id: &AccountId, amount: u128, reason: &str) {
    EventBuilder::new(ESCROW, "credited")
        .add("account_id", account_id)
        .add("amount", amount)
        .add("reason", reason)
        .emit();
}

pub fn emit_escrow_withdrawal(account_id: &AccountId, amount: u128) {
    EventBuilder::new(ESCROW, "withdrawal")
        .add("account_id", account_id)
        .add("amount", amount)
        .emit();
}

pub fn emit_escrow_withdrawal_failed(account_id: &AccountId, amount: u128) {
    EventBuilder::new(ESCROW, "withdrawal_failed")
        .add("account_id", account_id)
        .add("amount", amount)
        .emit();
}

// --- Admin events ---

pub fn emit_ownership_transferred(old_owner: &AccountId, new_owner: &AccountId) {
    EventBuilder::new(ADMIN, "ownership_transferred")
        .add("old_owner", old_owner)
        .add("new_owner", new_owner)
        .emit();
}

pub fn emit_fee_recipient_changed(old_recipient: &AccountId, new_recipient: &AccountId) {
    EventBuilder::new(ADMIN, "fee_recipient_changed")
        .add("old_recipient", old_recipient)
        .add("new_recipient", new_recipient)
        .emit();
}

pub fn emit_config_updated() {
    EventBuilder::new(ADMIN, "config_updated").emit();
}

pub fn emit_allowlist_changed(account_id: &AccountId, added: bool) {
    EventBuilder::new(ADMIN, "allowlist_changed")
        .add("account_id", account_id)
        .add("added", added)
        .emit();
}
