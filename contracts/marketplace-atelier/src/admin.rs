//! Initialization and owner-gated administration.

use near_sdk::store::{IterableMap, IterableSet, LookupMap};
use near_sdk::{env, near, AccountId};

use crate::internal::check_one_yocto;
use crate::*;

#[near]
impl Contract {
    #[init]
    pub fn new(
        owner_id: AccountId,
        fee_recipient: AccountId,
        single_edition_registry: AccountId,
        multi_edition_registry: AccountId,
        config: Option<MarketConfig>,
    ) -> Self {
        let config = config.unwrap_or_default();
        if let Err(e) = validate_config(&config) {
            env::panic_str(&e.to_string());
        }
        if single_edition_registry == multi_edition_registry {
            env::panic_str("Edition registries must be distinct accounts");
        }
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            owner_id,
            fee_recipient,
            single_edition_registry,
            multi_edition_registry,
            config,
            listings: IterableMap::new(StorageKey::Listings),
            by_seller: LookupMap::new(StorageKey::BySeller),
            by_asset_contract: LookupMap::new(StorageKey::ByAssetContract),
            pending_balances: LookupMap::new(StorageKey::PendingBalances),
            total_escrowed: 0,
            completed_first_sales: LookupMap::new(StorageKey::CompletedFirstSales),
            consumed_nonces: LookupMap::new(StorageKey::ConsumedNonces),
            minting_keys: LookupMap::new(StorageKey::MintingKeys),
            listing_allowlist: IterableSet::new(StorageKey::ListingAllowlist),
        }
    }

    #[payable]
    #[handle_result]
    pub fn transfer_ownership(&mut self, new_owner: AccountId) -> Result<(), MarketplaceError> {
        check_one_yocto()?;
        self.check_contract_owner(&env::predecessor_account_id())?;
        let old_owner = std::mem::replace(&mut self.owner_id, new_owner);
        events::emit_ownership_transferred(&old_owner, &self.owner_id);
        Ok(())
    }

    #[payable]
    #[handle_result]
    pub fn set_fee_recipient(&mut self, fee_recipient: AccountId) -> Result<(), MarketplaceError> {
        check_one_yocto()?;
        self.check_contract_owner(&env::predecessor_account_id())?;
        let old = std::mem::replace(&mut self.fee_recipient, fee_recipient);
        events::emit_fee_recipient_changed(&old, &self.fee_recipient);
        Ok(())
    }

    /// Replace the whole market config. Validated as a unit so partial
    /// updates cannot leave inconsistent timing rules.
    #[payable]
    #[handle_result]
    pub fn set_market_config(&mut self, config: MarketConfig) -> Result<(), MarketplaceError> {
        check_one_yocto()?;
        self.check_contract_owner(&env::predecessor_account_id())?;
        validate_config(&config)?;
        self.config = config;
        events::emit_config_updated();
        Ok(())
    }

    /// Toggle the listing allowlist without touching the rest of the config.
    #[payable]
    #[handle_result]
    pub fn set_allowlist_enabled(&mut self, enabled: bool) -> Result<(), MarketplaceError> {
        check_one_yocto()?;
        self.check_contract_owner(&env::predecessor_account_id())?;
        self.config.allowlist_enabled = enabled;
        events::emit_config_updated();
        Ok(())
    }

    #[payable]
    #[handle_result]
    pub fn allowlist_add(&mut self, account_id: AccountId) -> Result<(), MarketplaceError> {
        check_one_yocto()?;
        self.check_contract_owner(&env::predecessor_account_id())?;
        self.listing_allowlist.insert(account_id.clone());
        events::emit_allowlist_changed(&account_id, true);
        Ok(())
    }

    #[payable]
    #[handle_result]
    pub fn allowlist_remove(&mut self, account_id: AccountId) -> Result<(), MarketplaceError> {
        check_one_yocto()?;
        self.check_contract_owner(&env::predecessor_account_id())?;
        self.listing_allowlist.remove(&account_id);
        events::emit_allowlist_changed(&account_id, false);
        Ok(())
    }

    // --- Views ---

    pub fn get_owner(&self) -> AccountId {
        self.owner_id.clone()
    }

    pub fn get_fee_recipient(&self) -> AccountId {
        self.fee_recipient.clone()
    }

    pub fn get_config(&self) -> MarketConfig {
        self.config.clone()
    }

    pub fn get_version(&self) -> String {
        self.version.clone()
    }

    pub fn is_allowlisted(&self, account_id: AccountId) -> bool {
        self.listing_allowlist.contains(&account_id)
    }
}

pub(crate) fn validate_config(config: &MarketConfig) -> Result<(), MarketplaceError> {
    let fee_fields = [
        config.primary_sale_fee_bps,
        config.secondary_sale_fee_bps,
        config.collector_fee_bps,
        config.buyer_surcharge_bps,
        config.max_royalty_bps,
    ];
    if fee_fields.iter().any(|bps| *bps > BASIS_POINTS) {
        return Err(MarketplaceError::InvalidInput(format!(
            "Fee percentages cannot exceed {} bps",
            BASIS_POINTS
        )));
    }
    // The primary split must leave the seller a non-negative remainder.
    if config.primary_sale_fee_bps + config.collector_fee_bps > BASIS_POINTS {
        return Err(MarketplaceError::InvalidInput(
            "Primary fee plus collector fee cannot exceed 100%".into(),
        ));
    }
    if config.secondary_sale_fee_bps + config.max_royalty_bps > BASIS_POINTS {
        return Err(MarketplaceError::InvalidInput(
            "Secondary fee plus maximum royalty cannot exceed 100%".into(),
        ));
    }
    if config.auction_duration_ns == 0 || config.final_window_ns == 0 || config.extension_ns == 0 {
        return Err(MarketplaceError::InvalidInput(
            "Auction timing values must be greater than 0".into(),
        ));
    }
    if config.final_window_ns > config.auction_duration_ns {
        return Err(MarketplaceError::InvalidInput(
            "Final window cannot exceed the auction duration".into(),
        ));
    }
    Ok(())
}
