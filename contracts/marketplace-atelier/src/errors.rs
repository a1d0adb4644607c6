//! Typed error handling.
//!
//! `#[derive(near_sdk::FunctionError)]` lets public methods return
//! `Result<_, MarketplaceError>` under `#[handle_result]`: an `Err` is
//! turned into `env::panic_str()` with the Display message, so the
//! on-wire behaviour matches raw panics while unit tests get structured
//! variants to match on.

use near_sdk_macros::NearSchema;

#[derive(NearSchema, near_sdk::FunctionError)]
#[abi(borsh, json)]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum MarketplaceError {
    /// Caller lacks permission (not the seller, not the highest bidder, etc.)
    Unauthorized(String),
    /// Invalid parameters, IDs, or data from the caller.
    InvalidInput(String),
    /// Requested entity does not exist.
    NotFound(String),
    /// Operation not allowed given current listing/auction state.
    InvalidState(String),
    /// Attached deposit does not match the required total.
    IncorrectAmount(String),
    /// Escrow balance is too low for the requested withdrawal.
    InsufficientBalance(String),
    /// Voucher signature or digest does not verify.
    InvalidSignature(String),
    /// Internal invariant violation (should never happen).
    InternalError(String),
}

impl std::fmt::Display for MarketplaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Self::IncorrectAmount(msg) => write!(f, "Incorrect amount: {}", msg),
            Self::InsufficientBalance(msg) => write!(f, "Insufficient balance: {}", msg),
            Self::InvalidSignature(msg) => write!(f, "Invalid signature: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

// ── Factory helpers for common errors ────────────────────────────────────────

impl MarketplaceError {
    pub fn already_listed() -> Self {
        Self::InvalidState("An active listing already exists for this asset and seller".into())
    }
    pub fn not_listed_by_seller() -> Self {
        Self::NotFound("No active listing by this seller for this asset".into())
    }
    pub fn inexistent_item() -> Self {
        Self::NotFound("No active listing found".into())
    }
    pub fn unknown_asset_kind(contract_id: &near_sdk::AccountId) -> Self {
        Self::InvalidInput(format!(
            "Asset contract '{}' is not a registered edition registry",
            contract_id
        ))
    }
    pub fn auction_already_started() -> Self {
        Self::InvalidState("Auction already has bids and can no longer be cancelled".into())
    }
    pub fn auction_ended() -> Self {
        Self::InvalidState("Auction has ended".into())
    }
    pub fn auction_not_endable_yet() -> Self {
        Self::InvalidState("Auction cannot be ended before its end time".into())
    }
    pub fn bid_too_low(current_highest: u128) -> Self {
        Self::IncorrectAmount(format!(
            "Bid must be strictly greater than the current highest bid of {}",
            current_highest
        ))
    }
    pub fn voucher_already_consumed() -> Self {
        Self::InvalidState("Voucher nonce has already been consumed".into())
    }
    pub fn voucher_data_mismatch() -> Self {
        Self::InvalidSignature("Supplied digest does not match the recomputed voucher digest".into())
    }
    pub fn only_owner(what: &str) -> Self {
        Self::Unauthorized(format!("Only {} can perform this action", what))
    }
}
