//! Fee splitting — pure computation of each sale's exact value distribution.
//!
//! Every percentage share is floor-divided against `BASIS_POINTS` and the
//! seller amount is always the subtraction remainder, so
//! `seller + royalty + collector + platform == gross` holds to the smallest
//! unit for every input.

use near_sdk::AccountId;
use primitive_types::U256;

use crate::constants::BASIS_POINTS;
use crate::types::{CollaboratorShare, FeeBreakdown, MarketConfig};

/// Floor of `amount * bps / BASIS_POINTS`, widened through U256.
pub(crate) fn bps_share(amount: u128, bps: u32) -> u128 {
    (U256::from(amount) * U256::from(bps) / U256::from(BASIS_POINTS)).as_u128()
}

/// First sale: platform fee + collector fee, remainder to the seller side.
pub(crate) fn split_primary(gross: u128, config: &MarketConfig) -> FeeBreakdown {
    let platform_fee_amount = bps_share(gross, config.primary_sale_fee_bps);
    let collector_fee_amount = bps_share(gross, config.collector_fee_bps);
    FeeBreakdown {
        seller_amount: gross - platform_fee_amount - collector_fee_amount,
        royalty_amount: 0,
        collector_fee_amount,
        platform_fee_amount,
    }
}

/// Secondary sale: platform fee + creator royalty, remainder to the seller.
/// The royalty cap is enforced where the snapshot is taken, not here.
pub(crate) fn split_secondary(
    gross: u128,
    royalty_bps: u32,
    config: &MarketConfig,
) -> FeeBreakdown {
    let platform_fee_amount = bps_share(gross, config.secondary_sale_fee_bps);
    let royalty_amount = bps_share(gross, royalty_bps);
    FeeBreakdown {
        seller_amount: gross - platform_fee_amount - royalty_amount,
        royalty_amount,
        collector_fee_amount: 0,
        platform_fee_amount,
    }
}

/// Divide the seller amount across collaborator shares. Each share is
/// floored; the truncation remainder goes to the first collaborator (the
/// primary creator), never dropped.
pub(crate) fn split_collaborators(
    seller_amount: u128,
    collaborators: &[CollaboratorShare],
) -> Vec<(AccountId, u128)> {
    let mut amounts: Vec<(AccountId, u128)> = collaborators
        .iter()
        .map(|c| (c.account_id.clone(), bps_share(seller_amount, c.share_bps)))
        .collect();

    let distributed: u128 = amounts.iter().map(|(_, a)| *a).sum();
    let remainder = seller_amount.saturating_sub(distributed);
    if remainder > 0 {
        if let Some(first) = amounts.first_mut() {
            first.1 += remainder;
        }
    }
    amounts
}
