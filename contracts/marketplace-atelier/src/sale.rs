//! Fixed-price listing lifecycle: list, delist, reprice, purchase.
//!
//! Listing admission is asynchronous (the registry snapshot arrives in a
//! callback); purchase settlement mutates listing state first, fires the
//! custody transfer, and compensates in `resolve_purchase` if it failed.

use near_sdk::json_types::U128;
use near_sdk::{env, near, AccountId, Gas, Promise, PromiseError};

use crate::external::{ext_asset_registry, ext_self, SaleInfo};
use crate::fees::bps_share;
use crate::internal::{check_at_least_one_yocto, check_one_yocto, validate_collaborators};
use crate::settlement::SettlementContext;
use crate::*;

#[near]
impl Contract {
    /// List `quantity` editions at `unit_price` yoctoNEAR each. Fires a
    /// snapshot query at the registry; the listing is created in
    /// `process_listing` once ownership and approval check out.
    #[payable]
    #[handle_result]
    pub fn list(
        &mut self,
        asset_contract: AccountId,
        token_id: String,
        unit_price: U128,
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
            unit_price.0,
        )?;

        Ok(self.request_listing_snapshot(asset_contract, token_id, seller, unit_price, quantity, false))
    }

    /// Registry snapshot callback for both `list` and `list_auction`.
    /// Admission failures log and leave state untouched; the snapshot query
    /// already proved nothing.
    #[private]
    pub fn process_listing(
        &mut self,
        asset_contract: AccountId,
        token_id: String,
        seller: AccountId,
        unit_price: U128,
        quantity: u64,
        is_auction: bool,
        #[callback_result] info: Result<SaleInfo, PromiseError>,
    ) {
        let info = match info {
            Ok(info) => info,
            Err(_) => {
                env::log_str(&format!(
                    "Listing rejected: registry {} did not return a sale snapshot for {}",
                    asset_contract, token_id
                ));
                return;
            }
        };
        if let Err(e) = self.internal_create_listing(
            asset_contract,
            token_id,
            seller,
            unit_price.0,
            quantity,
            is_auction,
            info,
        ) {
            env::log_str(&format!("Listing rejected: {}", e));
        }
    }

    /// Remove the caller's fixed-price listing. Auction listings go through
    /// `cancel_auction`, which enforces the no-bids rule.
    #[payable]
    #[handle_result]
    pub fn delist(
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
        if listing.auction.is_some() {
            return Err(MarketplaceError::InvalidState(
                "Auction listings are removed via cancel_auction".into(),
            ));
        }

        self.internal_remove_listing(&listing_key)?;
        events::emit_delisted(&listing_key, &seller);
        Ok(())
    }

    /// Change the unit price of the caller's fixed-price listing.
    #[payable]
    #[handle_result]
    pub fn update_price(
        &mut self,
        asset_contract: AccountId,
        token_id: String,
        unit_price: U128,
    ) -> Result<(), MarketplaceError> {
        check_one_yocto()?;
        if unit_price.0 == 0 {
            return Err(MarketplaceError::InvalidInput(
                "Price must be greater than 0".into(),
            ));
        }
        let seller = env::predecessor_account_id();
        let listing_key = Contract::make_listing_id(&asset_contract, &seller, &token_id);

        let listing = self
            .listings
            .get_mut(&listing_key)
            .ok_or_else(MarketplaceError::not_listed_by_seller)?;
        if listing.auction.is_some() {
            return Err(MarketplaceError::InvalidState(
                "Auction reserve prices cannot be changed; cancel and relist".into(),
            ));
        }

        let old_price = listing.unit_price.0;
        listing.unit_price = unit_price;
        events::emit_price_updated(&listing_key, old_price, unit_price.0);
        Ok(())
    }

    /// Buy `quantity` editions at the listed price. The attached deposit must
    /// equal gross + buyer surcharge exactly; anything else is rejected
    /// rather than partially refunded.
    #[payable]
    #[handle_result]
    pub fn purchase(
        &mut self,
        asset_contract: AccountId,
        seller: AccountId,
        token_id: String,
        quantity: Option<u64>,
    ) -> Result<Promise, MarketplaceError> {
        let buyer = env::predecessor_account_id();
        let quantity = quantity.unwrap_or(1);
        let deposit = env::attached_deposit().as_yoctonear();

        let receipt = self.internal_purchase_prepare(
            &buyer,
            &asset_contract,
            &seller,
            &token_id,
            quantity,
            deposit,
        )?;

        Ok(ext_asset_registry::ext(asset_contract)
            .with_attached_deposit(ONE_YOCTO)
            .with_static_gas(Gas::from_tgas(TRANSFER_GAS))
            .market_transfer(
                token_id,
                seller,
                buyer,
                quantity,
                Some(format!("atelier purchase:{}", receipt.listing_key)),
            )
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(Gas::from_tgas(RESOLVE_GAS))
                    .resolve_purchase(receipt),
            ))
    }

    /// Settle a purchase after the custody transfer, or compensate if it
    /// failed. Returns the gross amount settled (0 on rollback).
    #[private]
    pub fn resolve_purchase(
        &mut self,
        receipt: PurchaseReceipt,
        #[callback_result] result: Result<(), PromiseError>,
    ) -> U128 {
        match result {
            Ok(()) => {
                let breakdown = self.internal_purchase_settle(&receipt);
                events::emit_purchase(
                    &receipt.listing_key,
                    &receipt.buyer,
                    &receipt.seller,
                    receipt.quantity,
                    receipt.gross.0,
                    receipt.surcharge.0,
                    receipt.is_first_sale,
                    &breakdown,
                );
                receipt.gross
            }
            Err(_) => {
                self.internal_purchase_rollback(&receipt);
                events::emit_purchase_failed(
                    &receipt.listing_key,
                    &receipt.buyer,
                    receipt.gross.0 + receipt.surcharge.0,
                );
                U128(0)
            }
        }
    }

    // --- Views ---

    pub fn get_listing(
        &self,
        asset_contract: AccountId,
        seller: AccountId,
        token_id: String,
    ) -> Option<Listing> {
        self.listings
            .get(&Contract::make_listing_id(&asset_contract, &seller, &token_id))
            .cloned()
    }

    pub fn get_listings(&self, from_index: Option<u64>, limit: Option<u64>) -> Vec<Listing> {
        let start = from_index.unwrap_or(0) as usize;
        let limit = limit.unwrap_or(50) as usize;
        self.listings
            .values()
            .skip(start)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn get_supply_listings(&self) -> u64 {
        self.listings.len() as u64
    }

    pub fn get_listings_by_seller(
        &self,
        seller: AccountId,
        from_index: Option<u64>,
        limit: Option<u64>,
    ) -> Vec<Listing> {
        self.collect_indexed_listings(self.by_seller.get(&seller), from_index, limit)
    }

    pub fn get_listings_by_asset_contract(
        &self,
        asset_contract: AccountId,
        from_index: Option<u64>,
        limit: Option<u64>,
    ) -> Vec<Listing> {
        self.collect_indexed_listings(
            self.by_asset_contract.get(&asset_contract),
            from_index,
            limit,
        )
    }
}

impl Contract {
    fn collect_indexed_listings(
        &self,
        keys: Option<&near_sdk::store::IterableSet<String>>,
        from_index: Option<u64>,
        limit: Option<u64>,
    ) -> Vec<Listing> {
        let start = from_index.unwrap_or(0) as usize;
        let limit = limit.unwrap_or(50) as usize;
        match keys {
            Some(set) => set
                .iter()
                .skip(start)
                .take(limit)
                .filter_map(|key| self.listings.get(key).cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn request_listing_snapshot(
        &self,
        asset_contract: AccountId,
        token_id: String,
        seller: AccountId,
        unit_price: U128,
        quantity: u64,
        is_auction: bool,
    ) -> Promise {
        ext_asset_registry::ext(asset_contract.clone())
            .with_static_gas(Gas::from_tgas(SALE_INFO_GAS))
            .market_sale_info(token_id.clone(), seller.clone())
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(Gas::from_tgas(RESOLVE_GAS))
                    .process_listing(asset_contract, token_id, seller, unit_price, quantity, is_auction),
            )
    }

    /// Admit a listing against the registry snapshot. Runs in the callback,
    /// so the double-list check repeats here.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn internal_create_listing(
        &mut self,
        asset_contract: AccountId,
        token_id: String,
        seller: AccountId,
        unit_price: u128,
        quantity: u64,
        is_auction: bool,
        info: SaleInfo,
    ) -> Result<(), MarketplaceError> {
        if info.owner_id != seller {
            return Err(MarketplaceError::Unauthorized(
                "Seller does not own the asset".into(),
            ));
        }
        if info.balance.0 < quantity as u128 {
            return Err(MarketplaceError::InvalidState(format!(
                "Seller holds {} editions, cannot list {}",
                info.balance.0, quantity
            )));
        }
        if !info.market_approved {
            return Err(MarketplaceError::InvalidState(
                "Marketplace does not hold a transfer approval for this asset".into(),
            ));
        }
        validate_collaborators(&info.collaborators)?;

        let listing_key = Contract::make_listing_id(&asset_contract, &seller, &token_id);
        if self.listings.contains_key(&listing_key) {
            return Err(MarketplaceError::already_listed());
        }

        let asset_kind = self
            .asset_kind_of(&asset_contract)
            .ok_or_else(|| MarketplaceError::unknown_asset_kind(&asset_contract))?;
        let is_first_sale = !self.completed_first_sales.contains_key(&listing_key);

        let listing = Listing {
            asset_contract: asset_contract.clone(),
            token_id: token_id.clone(),
            seller: seller.clone(),
            unit_price: U128(unit_price),
            quantity,
            quantity_sold: 0,
            asset_kind,
            is_first_sale,
            royalty_bps: info.royalty_bps.min(self.config.max_royalty_bps),
            royalty_recipient: info.royalty_recipient,
            collaborators: info.collaborators,
            auction: is_auction.then(AuctionState::new),
        };
        self.internal_add_listing(listing);

        events::emit_listed(
            &listing_key,
            &seller,
            &asset_contract,
            &token_id,
            unit_price,
            quantity,
            asset_kind,
            is_auction,
            is_first_sale,
        );
        Ok(())
    }

    /// Validate a purchase and mutate listing state before the transfer
    /// fires. A sold-out listing is removed here; the receipt remembers that
    /// so rollback can recreate it.
    pub(crate) fn internal_purchase_prepare(
        &mut self,
        buyer: &AccountId,
        asset_contract: &AccountId,
        seller: &AccountId,
        token_id: &str,
        quantity: u64,
        deposit: u128,
    ) -> Result<PurchaseReceipt, MarketplaceError> {
        if quantity == 0 {
            return Err(MarketplaceError::InvalidInput(
                "Quantity must be greater than 0".into(),
            ));
        }
        let listing_key = Contract::make_listing_id(asset_contract, seller, token_id);
        let listing = self
            .listings
            .get(&listing_key)
            .ok_or_else(MarketplaceError::inexistent_item)?
            .clone();

        if listing.auction.is_some() {
            return Err(MarketplaceError::InvalidState(
                "Auction listings are bought via place_bid".into(),
            ));
        }
        if buyer == seller {
            return Err(MarketplaceError::InvalidInput(
                "Seller cannot buy their own listing".into(),
            ));
        }
        if quantity > listing.remaining() {
            return Err(MarketplaceError::InvalidState(format!(
                "Only {} editions remain",
                listing.remaining()
            )));
        }

        let gross = listing
            .unit_price
            .0
            .checked_mul(quantity as u128)
            .ok_or_else(|| MarketplaceError::InvalidInput("Price overflow".into()))?;
        let surcharge = bps_share(gross, self.config.buyer_surcharge_bps);
        let required = gross + surcharge;
        if deposit != required {
            return Err(MarketplaceError::IncorrectAmount(format!(
                "Attached deposit must be exactly {} (price {} + surcharge {})",
                required, gross, surcharge
            )));
        }

        let listing_removed = quantity == listing.remaining();
        if listing_removed {
            self.internal_remove_listing(&listing_key)?;
        } else {
            let stored = self
                .listings
                .get_mut(&listing_key)
                .ok_or_else(MarketplaceError::inexistent_item)?;
            stored.quantity_sold += quantity;
            // The receipt keeps the pre-sale value; once this sale settles,
            // later purchases of the remaining editions are secondary.
            stored.is_first_sale = false;
        }

        Ok(PurchaseReceipt {
            listing_key,
            asset_contract: asset_contract.clone(),
            token_id: token_id.to_string(),
            seller: seller.clone(),
            buyer: buyer.clone(),
            quantity,
            unit_price: listing.unit_price,
            gross: U128(gross),
            surcharge: U128(surcharge),
            asset_kind: listing.asset_kind,
            is_first_sale: listing.is_first_sale,
            royalty_bps: listing.royalty_bps,
            royalty_recipient: listing.royalty_recipient.clone(),
            collaborators: listing.collaborators.clone(),
            listing_removed,
        })
    }

    pub(crate) fn internal_purchase_settle(&mut self, receipt: &PurchaseReceipt) -> FeeBreakdown {
        self.internal_settle_sale(&SettlementContext {
            listing_key: &receipt.listing_key,
            seller: &receipt.seller,
            is_first_sale: receipt.is_first_sale,
            gross: receipt.gross.0,
            surcharge: receipt.surcharge.0,
            royalty_bps: receipt.royalty_bps,
            royalty_recipient: receipt.royalty_recipient.as_ref(),
            collaborators: &receipt.collaborators,
        })
    }

    /// Compensation path: the transfer failed, so the buyer's full deposit is
    /// credited to escrow and the listing state is restored.
    pub(crate) fn internal_purchase_rollback(&mut self, receipt: &PurchaseReceipt) {
        if receipt.listing_removed {
            // Recreate only if nothing took the key in the meantime.
            if !self.listings.contains_key(&receipt.listing_key) {
                self.internal_add_listing(Listing {
                    asset_contract: receipt.asset_contract.clone(),
                    token_id: receipt.token_id.clone(),
                    seller: receipt.seller.clone(),
                    unit_price: receipt.unit_price,
                    quantity: receipt.quantity,
                    quantity_sold: 0,
                    asset_kind: receipt.asset_kind,
                    is_first_sale: receipt.is_first_sale,
                    royalty_bps: receipt.royalty_bps,
                    royalty_recipient: receipt.royalty_recipient.clone(),
                    collaborators: receipt.collaborators.clone(),
                    auction: None,
                });
            }
        } else if let Some(listing) = self.listings.get_mut(&receipt.listing_key) {
            listing.quantity_sold = listing.quantity_sold.saturating_sub(receipt.quantity);
            listing.is_first_sale = receipt.is_first_sale;
        }

        let refund = receipt.gross.0 + receipt.surcharge.0;
        let buyer = receipt.buyer.clone();
        self.internal_credit_escrow(&buyer, refund, "purchase_reverted");
    }
}
