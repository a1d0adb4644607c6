//! Timed English auctions over the same listing store.
//!
//! Bid admission is fully synchronous — no external calls, so no partial
//! states. Settlement (`end_auction`) follows the purchase pattern: listing
//! removed first, custody transfer fired, compensation in the callback.

use near_sdk::json_types::U128;
use near_sdk::{env, near, AccountId, Gas, Promise, PromiseError};

use crate::external::{ext_asset_registry, ext_self};
use crate::internal::{check_at_least_one_yocto, check_one_yocto};
use crate::settlement::SettlementContext;
use crate::*;

#[near]
impl Contract {
    /// List an asset for timed auction. `reserve_price` is the minimum first
    /// bid; the clock only starts when that first bid lands.
    #[payable]
    #[handle_result]
    pub fn list_auction(
        &mut self,
        asset_contract: AccountId,
        token_id: String,
        reserve_price: U128,
        quantity: Option<u64>,
    ) -> Result<Promise, MarketplaceError> {
        check_at_least_one_yocto()?;
        let seller = env::predecessor_account_id();
        let quantity = quantity.unwrap_or(1);
        self.internal_validate_listing_request(
            &seller,
            &asset_contract,
            &token_id,
            quantity,
            reserve_price.0,
        )?;

        Ok(self.request_listing_snapshot(
            asset_contract,
            token_id,
            seller,
            reserve_price,
            quantity,
            true,
        ))
    }

    /// Bid the attached deposit on an auction listing. The outbid deposit is
    /// credited to the previous bidder's escrow balance, never pushed.
    #[payable]
    #[handle_result]
    pub fn place_bid(
        &mut self,
        asset_contract: AccountId,
        seller: AccountId,
        token_id: String,
    ) -> Result<(), MarketplaceError> {
        let bidder = env::predecessor_account_id();
        let amount = env::attached_deposit().as_yoctonear();
        self.internal_place_bid(
            &bidder,
            &asset_contract,
            &seller,
            &token_id,
            amount,
            env::block_timestamp(),
        )
    }

    /// Settle an ended auction. Only the winning bidder may trigger this;
    /// they are the party holding value at risk in the contract.
    #[payable]
    #[handle_result]
    pub fn end_auction(
        &mut self,
        asset_contract: AccountId,
        seller: AccountId,
        token_id: String,
    ) -> Result<Promise, MarketplaceError> {
        check_one_yocto()?;
        let caller = env::predecessor_account_id();
        let receipt = self.internal_end_auction_prepare(
            &caller,
            &asset_contract,
            &seller,
            &token_id,
            env::block_timestamp(),
        )?;

        Ok(ext_asset_registry::ext(asset_contract)
            .with_attached_deposit(ONE_YOCTO)
            .with_static_gas(Gas::from_tgas(TRANSFER_GAS))
            .market_transfer(
                token_id,
                seller,
                receipt.winner.clone(),
                receipt.quantity,
                Some(format!("atelier auction:{}", receipt.listing_key)),
            )
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(Gas::from_tgas(RESOLVE_GAS))
                    .resolve_auction(receipt),
            ))
    }

    /// Settle or compensate after the custody transfer to the winner.
    #[private]
    pub fn resolve_auction(
        &mut self,
        receipt: AuctionReceipt,
        #[callback_result] result: Result<(), PromiseError>,
    ) {
        match result {
            Ok(()) => {
                let breakdown = self.internal_settle_auction(&receipt);
                events::emit_auction_settled(
                    &receipt.listing_key,
                    &receipt.winner,
                    &receipt.seller,
                    receipt.winning_bid.0,
                    &breakdown,
                );
            }
            Err(_) => {
                // Asset stayed with the seller; the bid goes back to the winner.
                let winner = receipt.winner.clone();
                self.internal_credit_escrow(&winner, receipt.winning_bid.0, "auction_reverted");
                events::emit_auction_settle_failed(
                    &receipt.listing_key,
                    &receipt.winner,
                    receipt.winning_bid.0,
                );
            }
        }
    }

    /// Withdraw an auction that has received no bids. Once a bid lands the
    /// seller is committed.
    #[payable]
    #[handle_result]
    pub fn cancel_auction(
        &mut self,
        asset_contract: AccountId,
        token_id: String,
    ) -> Result<(), MarketplaceError> {
        check_one_yocto()?;
        let seller = env::predecessor_account_id();
        let listing_key = Contract::make_listing_id(&asset_contract, &seller, &token_id);

        let listing = self
            .listings
            .get(&listing_key)
            .ok_or_else(MarketplaceError::not_listed_by_seller)?;
        let auction = listing.auction.as_ref().ok_or_else(|| {
            MarketplaceError::InvalidState("Fixed-price listings are removed via delist".into())
        })?;
        if auction.has_started() {
            return Err(MarketplaceError::auction_already_started());
        }

        self.internal_remove_listing(&listing_key)?;
        events::emit_auction_cancelled(&listing_key, &seller);
        Ok(())
    }
}

impl Contract {
    /// Synchronous bid admission. `now` is a parameter so the clock rules
    /// are directly testable.
    pub(crate) fn internal_place_bid(
        &mut self,
        bidder: &AccountId,
        asset_contract: &AccountId,
        seller: &AccountId,
        token_id: &str,
        amount: u128,
        now: u64,
    ) -> Result<(), MarketplaceError> {
        let listing_key = Contract::make_listing_id(asset_contract, seller, token_id);
        let config = self.config.clone();

        let mut listing = self
            .listings
            .get(&listing_key)
            .ok_or_else(MarketplaceError::inexistent_item)?
            .clone();
        let auction = listing.auction.as_mut().ok_or_else(|| {
            MarketplaceError::InvalidState("This listing is not an auction".into())
        })?;

        if bidder == seller {
            return Err(MarketplaceError::InvalidInput(
                "Seller cannot bid on their own auction".into(),
            ));
        }
        if auction.settled {
            return Err(MarketplaceError::auction_ended());
        }

        let mut end_time = match auction.end_time {
            Some(end) => {
                if now >= end {
                    return Err(MarketplaceError::auction_ended());
                }
                end
            }
            // First bid starts the clock.
            None => now + config.auction_duration_ns,
        };

        if auction.bid_count == 0 {
            if amount < listing.unit_price.0 {
                return Err(MarketplaceError::IncorrectAmount(format!(
                    "First bid must meet the reserve price of {}",
                    listing.unit_price.0
                )));
            }
        } else if amount <= auction.highest_bid {
            return Err(MarketplaceError::bid_too_low(auction.highest_bid));
        }

        // Anti-snipe: a bid inside the final window pushes the end time out.
        let extended = end_time - now <= config.final_window_ns;
        if extended {
            end_time = now + config.extension_ns;
        }

        let previous = auction
            .highest_bidder
            .take()
            .map(|account| (account, auction.highest_bid));

        auction.highest_bid = amount;
        auction.highest_bidder = Some(bidder.clone());
        auction.bid_count += 1;
        auction.start_time.get_or_insert(now);
        auction.end_time = Some(end_time);
        let bid_count = auction.bid_count;

        self.listings.insert(listing_key.clone(), listing);

        if let Some((account, refund)) = previous {
            self.internal_credit_escrow(&account, refund, "outbid_refund");
        }

        events::emit_bid_placed(&listing_key, bidder, amount, bid_count, end_time, extended);
        Ok(())
    }

    /// Validate and remove the listing before the settlement transfer fires.
    pub(crate) fn internal_end_auction_prepare(
        &mut self,
        caller: &AccountId,
        asset_contract: &AccountId,
        seller: &AccountId,
        token_id: &str,
        now: u64,
    ) -> Result<AuctionReceipt, MarketplaceError> {
        let listing_key = Contract::make_listing_id(asset_contract, seller, token_id);
        let listing = self
            .listings
            .get(&listing_key)
            .ok_or_else(MarketplaceError::not_listed_by_seller)?;
        let auction = listing.auction.as_ref().ok_or_else(|| {
            MarketplaceError::InvalidState("This listing is not an auction".into())
        })?;

        let winner = auction
            .highest_bidder
            .clone()
            .ok_or_else(|| MarketplaceError::InvalidState("Auction received no bids".into()))?;
        if caller != &winner {
            return Err(MarketplaceError::Unauthorized(
                "Only the highest bidder can end the auction".into(),
            ));
        }
        let end_time = auction
            .end_time
            .ok_or_else(|| MarketplaceError::InternalError("Auction has bids but no end time".into()))?;
        if now < end_time {
            return Err(MarketplaceError::auction_not_endable_yet());
        }

        let winning_bid = auction.highest_bid;

        // One-way transition, recorded before the listing leaves the store.
        if let Some(stored) = self.listings.get_mut(&listing_key) {
            if let Some(auction) = stored.auction.as_mut() {
                auction.settled = true;
            }
        }
        let listing = self.internal_remove_listing(&listing_key)?;

        Ok(AuctionReceipt {
            listing_key,
            asset_contract: asset_contract.clone(),
            token_id: token_id.to_string(),
            seller: seller.clone(),
            winner,
            winning_bid: U128(winning_bid),
            quantity: listing.remaining(),
            asset_kind: listing.asset_kind,
            is_first_sale: listing.is_first_sale,
            royalty_bps: listing.royalty_bps,
            royalty_recipient: listing.royalty_recipient,
            collaborators: listing.collaborators,
        })
    }

    /// Gross = winning bid; auctions carry no buyer surcharge.
    pub(crate) fn internal_settle_auction(&mut self, receipt: &AuctionReceipt) -> FeeBreakdown {
        self.internal_settle_sale(&SettlementContext {
            listing_key: &receipt.listing_key,
            seller: &receipt.seller,
            is_first_sale: receipt.is_first_sale,
            gross: receipt.winning_bid.0,
            surcharge: 0,
            royalty_bps: receipt.royalty_bps,
            royalty_recipient: receipt.royalty_recipient.as_ref(),
            collaborators: &receipt.collaborators,
        })
    }
}
