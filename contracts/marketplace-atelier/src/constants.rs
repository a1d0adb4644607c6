//! Marketplace-wide constants.

use near_sdk::NearToken;

/// Basis points denominator (10,000 = 100%).
pub const BASIS_POINTS: u32 = 10_000;

/// Default primary-sale platform fee (1500 = 15%).
pub const DEFAULT_PRIMARY_SALE_FEE_BPS: u32 = 1_500;

/// Default secondary-sale platform fee (500 = 5%).
pub const DEFAULT_SECONDARY_SALE_FEE_BPS: u32 = 500;

/// Default collector fee charged on primary sales (300 = 3%).
pub const DEFAULT_COLLECTOR_FEE_BPS: u32 = 300;

/// Default buyer-side surcharge on fixed-price purchases (300 = 3%).
/// Added on top of the gross price; routed to the fee recipient.
pub const DEFAULT_BUYER_SURCHARGE_BPS: u32 = 300;

/// Maximum royalty a listing snapshot may carry (5000 = 50%).
pub const MAX_ROYALTY_BPS: u32 = 5_000;

/// Default auction duration, measured from the first accepted bid (24 h, ns).
pub const DEFAULT_AUCTION_DURATION_NS: u64 = 24 * 60 * 60 * 1_000_000_000;

/// Final window that arms the anti-snipe extension (15 min, ns).
pub const DEFAULT_FINAL_WINDOW_NS: u64 = 15 * 60 * 1_000_000_000;

/// A bid landing inside the final window moves the end time to now + this (ns).
pub const DEFAULT_EXTENSION_NS: u64 = 15 * 60 * 1_000_000_000;

/// Maximum token ID length.
pub const MAX_TOKEN_ID_LEN: usize = 256;

/// Maximum collaborators on a listing or voucher.
pub const MAX_COLLABORATORS: usize = 10;

/// Delimiter for composite listing keys.
/// ":" is not a valid character in NEAR account IDs, preventing key collisions.
pub const DELIMITER: &str = ":";

/// Attached to every state-changing registry call.
pub const ONE_YOCTO: NearToken = NearToken::from_yoctonear(1);

// Gas constants (TGas)
pub const SALE_INFO_GAS: u64 = 25;
pub const TRANSFER_GAS: u64 = 50;
pub const MINT_GAS: u64 = 60;
pub const RESOLVE_GAS: u64 = 60;
pub const WITHDRAW_RESOLVE_GAS: u64 = 10;
