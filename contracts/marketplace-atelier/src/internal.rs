// Internal helpers: listing registry maintenance, admission guards.

use near_sdk::store::IterableSet;
use near_sdk::{env, AccountId};

use crate::*;

impl Contract {
    /// Insert a listing and maintain the by-seller / by-contract indexes.
    pub(crate) fn internal_add_listing(&mut self, listing: Listing) {
        let listing_key =
            Contract::make_listing_id(&listing.asset_contract, &listing.seller, &listing.token_id);
        let seller = listing.seller.clone();
        let asset_contract = listing.asset_contract.clone();

        self.listings.insert(listing_key.clone(), listing);

        let mut seller_set = self.by_seller.remove(&seller).unwrap_or_else(|| {
            IterableSet::new(StorageKey::BySellerInner {
                account_id_hash: hash_account_id(&seller),
            })
        });
        seller_set.insert(listing_key.clone());
        self.by_seller.insert(seller, seller_set);

        let mut contract_set = self
            .by_asset_contract
            .remove(&asset_contract)
            .unwrap_or_else(|| {
                IterableSet::new(StorageKey::ByAssetContractInner {
                    account_id_hash: hash_account_id(&asset_contract),
                })
            });
        contract_set.insert(listing_key);
        self.by_asset_contract.insert(asset_contract, contract_set);
    }

    /// Remove a listing and its index entries. Returns the removed Listing.
    pub(crate) fn internal_remove_listing(
        &mut self,
        listing_key: &str,
    ) -> Result<Listing, MarketplaceError> {
        let listing = self
            .listings
            .remove(listing_key)
            .ok_or_else(MarketplaceError::not_listed_by_seller)?;

        if let Some(mut seller_set) = self.by_seller.remove(&listing.seller) {
            seller_set.remove(listing_key);
            if !seller_set.is_empty() {
                self.by_seller.insert(listing.seller.clone(), seller_set);
            }
        }
        if let Some(mut contract_set) = self.by_asset_contract.remove(&listing.asset_contract) {
            contract_set.remove(listing_key);
            if !contract_set.is_empty() {
                self.by_asset_contract
                    .insert(listing.asset_contract.clone(), contract_set);
            }
        }

        Ok(listing)
    }

    pub(crate) fn check_contract_owner(
        &self,
        caller: &AccountId,
    ) -> Result<(), MarketplaceError> {
        if caller != &self.owner_id {
            return Err(MarketplaceError::only_owner("the contract owner"));
        }
        Ok(())
    }

    /// Allowlist gate on all listing paths.
    pub(crate) fn check_may_list(&self, seller: &AccountId) -> Result<(), MarketplaceError> {
        if self.config.allowlist_enabled && !self.listing_allowlist.contains(seller) {
            return Err(MarketplaceError::Unauthorized(
                "Account is not on the listing allowlist".into(),
            ));
        }
        Ok(())
    }

    /// Shared admission checks for `list` and `list_auction`.
    /// Returns the asset kind for the named registry.
    pub(crate) fn internal_validate_listing_request(
        &self,
        seller: &AccountId,
        asset_contract: &AccountId,
        token_id: &str,
        quantity: u64,
        unit_price: u128,
    ) -> Result<AssetKind, MarketplaceError> {
        self.check_may_list(seller)?;

        if token_id.is_empty() || token_id.len() > MAX_TOKEN_ID_LEN {
            return Err(MarketplaceError::InvalidInput(format!(
                "Token ID must be 1..={} characters",
                MAX_TOKEN_ID_LEN
            )));
        }
        if quantity == 0 {
            return Err(MarketplaceError::InvalidInput(
                "Quantity must be greater than 0".into(),
            ));
        }
        if unit_price == 0 {
            return Err(MarketplaceError::InvalidInput(
                "Price must be greater than 0".into(),
            ));
        }

        let asset_kind = self
            .asset_kind_of(asset_contract)
            .ok_or_else(|| MarketplaceError::unknown_asset_kind(asset_contract))?;
        if asset_kind == AssetKind::SingleEdition && quantity != 1 {
            return Err(MarketplaceError::InvalidInput(
                "Single-edition assets must be listed with quantity 1".into(),
            ));
        }

        let listing_key = Contract::make_listing_id(asset_contract, seller, token_id);
        if self.listings.contains_key(&listing_key) {
            return Err(MarketplaceError::already_listed());
        }

        Ok(asset_kind)
    }
}

/// Collaborator shares must sum to exactly 100% (BASIS_POINTS), with no
/// zero-share entries. An empty list is valid and means "all to the seller".
pub(crate) fn validate_collaborators(
    collaborators: &[CollaboratorShare],
) -> Result<(), MarketplaceError> {
    if collaborators.is_empty() {
        return Ok(());
    }
    if collaborators.len() > MAX_COLLABORATORS {
        return Err(MarketplaceError::InvalidInput(format!(
            "At most {} collaborators are supported",
            MAX_COLLABORATORS
        )));
    }
    let mut total: u64 = 0;
    for share in collaborators {
        if share.share_bps == 0 {
            return Err(MarketplaceError::InvalidInput(
                "Collaborator shares must be greater than 0".into(),
            ));
        }
        total += share.share_bps as u64;
    }
    if total != BASIS_POINTS as u64 {
        return Err(MarketplaceError::InvalidInput(format!(
            "Collaborator shares must sum to {} bps, got {}",
            BASIS_POINTS, total
        )));
    }
    Ok(())
}

/// Hash an account ID for use in storage keys
pub(crate) fn hash_account_id(account_id: &AccountId) -> Vec<u8> {
    env::sha256(account_id.as_bytes())
}

/// Check exactly one yoctoNEAR is attached (security measure)
pub(crate) fn check_one_yocto() -> Result<(), MarketplaceError> {
    if env::attached_deposit() != ONE_YOCTO {
        return Err(MarketplaceError::IncorrectAmount(
            "Requires attached deposit of exactly 1 yoctoNEAR".into(),
        ));
    }
    Ok(())
}

/// Check at least one yoctoNEAR is attached
pub(crate) fn check_at_least_one_yocto() -> Result<(), MarketplaceError> {
    if env::attached_deposit() < ONE_YOCTO {
        return Err(MarketplaceError::IncorrectAmount(
            "Requires attached deposit of at least 1 yoctoNEAR".into(),
        ));
    }
    Ok(())
}
