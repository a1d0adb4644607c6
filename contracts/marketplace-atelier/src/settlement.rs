//! Value distribution for completed sales.
//!
//! Runs after custody has provably moved (the resolve callbacks), never
//! before. All proceeds land in the pull-payment escrow ledger; nothing is
//! transferred outward here.

use near_sdk::AccountId;

use crate::fees;
use crate::types::{CollaboratorShare, FeeBreakdown};
use crate::Contract;

/// Everything needed to split one completed sale's value.
pub(crate) struct SettlementContext<'a> {
    /// Listing key (or synthetic key for collector mints) recorded under
    /// completed first sales.
    pub listing_key: &'a str,
    pub seller: &'a AccountId,
    pub is_first_sale: bool,
    /// Price actually paid, excluding the buyer surcharge.
    pub gross: u128,
    /// Buyer-side surcharge; routed to the fee recipient in full.
    pub surcharge: u128,
    pub royalty_bps: u32,
    pub royalty_recipient: Option<&'a AccountId>,
    pub collaborators: &'a [CollaboratorShare],
}

impl Contract {
    /// Split one sale's value and credit every recipient's escrow balance.
    /// Conservation holds by construction: the breakdown sums to the gross,
    /// and the surcharge is credited on top.
    pub(crate) fn internal_settle_sale(&mut self, ctx: &SettlementContext) -> FeeBreakdown {
        let breakdown = if ctx.is_first_sale {
            fees::split_primary(ctx.gross, &self.config)
        } else {
            fees::split_secondary(ctx.gross, ctx.royalty_bps, &self.config)
        };

        let fee_recipient = self.fee_recipient.clone();
        let platform_total = breakdown.platform_fee_amount + breakdown.collector_fee_amount
            + ctx.surcharge;
        self.internal_credit_escrow(&fee_recipient, platform_total, "platform_fee");

        if breakdown.royalty_amount > 0 {
            // Snapshot may lack a recipient; the seller absorbs the royalty then.
            let recipient = ctx.royalty_recipient.unwrap_or(ctx.seller).clone();
            self.internal_credit_escrow(&recipient, breakdown.royalty_amount, "royalty");
        }

        if ctx.is_first_sale && !ctx.collaborators.is_empty() {
            for (account_id, amount) in
                fees::split_collaborators(breakdown.seller_amount, ctx.collaborators)
            {
                self.internal_credit_escrow(&account_id, amount, "collaborator_share");
            }
        } else {
            let seller = ctx.seller.clone();
            self.internal_credit_escrow(&seller, breakdown.seller_amount, "sale_proceeds");
        }

        if ctx.is_first_sale {
            self.completed_first_sales
                .insert(ctx.listing_key.to_string(), true);
        }

        breakdown
    }
}
