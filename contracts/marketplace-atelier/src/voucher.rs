//! Signature-authorized collector mints.
//!
//! A creator signs a `Voucher` off-chain with their registered ed25519
//! minting key; any buyer can then pay the voucher price and have the asset
//! minted straight to them. Everything is validated before the nonce is
//! consumed and the mint fires; a failed mint un-consumes the nonce and
//! refunds the buyer through escrow.

use near_sdk::json_types::{Base64VecU8, U128};
use near_sdk::{borsh, env, near, AccountId, CurveType, Gas, Promise, PromiseError, PublicKey};

use crate::external::{ext_asset_registry, ext_self};
use crate::fees::bps_share;
use crate::internal::{check_one_yocto, validate_collaborators};
use crate::settlement::SettlementContext;
use crate::*;

/// Domain separator for voucher digests. Versioned so a future payload
/// change cannot collide with signatures issued against this one.
pub const VOUCHER_DOMAIN_PREFIX: &[u8] = b"atelier:collector-mint:v1";

/// `sha256(prefix || 0x00 || borsh(voucher))`. The zero byte keeps the
/// prefix unambiguous against payloads that happen to start with it.
pub fn voucher_digest(voucher: &Voucher) -> Result<[u8; 32], MarketplaceError> {
    let payload = borsh::to_vec(voucher)
        .map_err(|_| MarketplaceError::InternalError("Voucher serialization failed".into()))?;
    let mut buf = Vec::with_capacity(VOUCHER_DOMAIN_PREFIX.len() + 1 + payload.len());
    buf.extend_from_slice(VOUCHER_DOMAIN_PREFIX);
    buf.push(0);
    buf.extend_from_slice(&payload);
    Ok(env::sha256_array(&buf))
}

/// Raw 32-byte ed25519 key material, stripped of the curve-type prefix.
pub(crate) fn ed25519_key_bytes(public_key: &PublicKey) -> Result<[u8; 32], MarketplaceError> {
    if public_key.curve_type() != CurveType::ED25519 {
        return Err(MarketplaceError::InvalidInput(
            "Minting keys must be ed25519".into(),
        ));
    }
    public_key.as_bytes()[1..]
        .try_into()
        .map_err(|_| MarketplaceError::InvalidInput("Malformed ed25519 public key".into()))
}

#[near]
impl Contract {
    /// Register the ed25519 key that authorizes the caller's vouchers.
    /// Re-registering replaces the key; previously signed, unconsumed
    /// vouchers stop verifying.
    #[payable]
    #[handle_result]
    pub fn register_minting_key(
        &mut self,
        public_key: PublicKey,
    ) -> Result<(), MarketplaceError> {
        check_one_yocto()?;
        ed25519_key_bytes(&public_key)?;
        let creator_id = env::predecessor_account_id();
        self.minting_keys.insert(creator_id.clone(), public_key);
        events::emit_minting_key_registered(&creator_id);
        Ok(())
    }

    /// Redeem a creator-signed voucher: pay the voucher price (plus buyer
    /// surcharge) and have the registry mint the asset to the caller.
    #[payable]
    #[handle_result]
    pub fn collector_mint(
        &mut self,
        voucher: Voucher,
        digest: Base64VecU8,
        signature: Base64VecU8,
    ) -> Result<Promise, MarketplaceError> {
        let buyer = env::predecessor_account_id();
        let deposit = env::attached_deposit().as_yoctonear();
        let (gross, surcharge, nonce_key) =
            self.internal_verify_voucher(&buyer, &voucher, &digest.0, &signature.0, deposit)?;

        // Consume the nonce before the external call; the resolve callback
        // releases it again if the mint fails.
        self.consumed_nonces.insert(nonce_key.clone(), true);

        let receipt = CollectorMintReceipt {
            buyer,
            creator_id: voucher.creator_id.clone(),
            asset_contract: voucher.asset_contract.clone(),
            quantity: voucher.quantity,
            gross: U128(gross),
            surcharge: U128(surcharge),
            royalty_bps: voucher.royalty_bps,
            collaborators: voucher.collaborators.clone(),
            nonce_key,
        };

        Ok(ext_asset_registry::ext(voucher.asset_contract)
            .with_attached_deposit(ONE_YOCTO)
            .with_static_gas(Gas::from_tgas(MINT_GAS))
            .market_mint(
                receipt.buyer.clone(),
                voucher.metadata_ref,
                voucher.quantity,
                voucher.royalty_bps,
                Some(voucher.creator_id),
                voucher.collaborators,
            )
            .then(
                ext_self::ext(env::current_account_id())
                    .with_static_gas(Gas::from_tgas(RESOLVE_GAS))
                    .resolve_collector_mint(receipt),
            ))
    }

    /// Settle a successful mint as a first sale, or release the nonce and
    /// refund the buyer if the registry rejected it.
    #[private]
    pub fn resolve_collector_mint(
        &mut self,
        receipt: CollectorMintReceipt,
        #[callback_result] result: Result<String, PromiseError>,
    ) {
        match result {
            Ok(token_id) => {
                let listing_key = Contract::make_listing_id(
                    &receipt.asset_contract,
                    &receipt.creator_id,
                    &token_id,
                );
                let breakdown = self.internal_settle_sale(&SettlementContext {
                    listing_key: &listing_key,
                    seller: &receipt.creator_id,
                    is_first_sale: true,
                    gross: receipt.gross.0,
                    surcharge: receipt.surcharge.0,
                    royalty_bps: receipt.royalty_bps,
                    royalty_recipient: Some(&receipt.creator_id),
                    collaborators: &receipt.collaborators,
                });
                events::emit_collector_mint(
                    &receipt.creator_id,
                    &receipt.buyer,
                    &token_id,
                    receipt.quantity,
                    receipt.gross.0,
                    &breakdown,
                );
            }
            Err(_) => {
                self.consumed_nonces.remove(&receipt.nonce_key);
                let refund = receipt.gross.0 + receipt.surcharge.0;
                let buyer = receipt.buyer.clone();
                self.internal_credit_escrow(&buyer, refund, "collector_mint_reverted");
                events::emit_collector_mint_failed(&receipt.creator_id, &receipt.buyer, refund);
            }
        }
    }

    // --- Views ---

    pub fn get_minting_key(&self, creator_id: AccountId) -> Option<PublicKey> {
        self.minting_keys.get(&creator_id).cloned()
    }

    pub fn is_nonce_consumed(&self, creator_id: AccountId, nonce: u64) -> bool {
        self.consumed_nonces
            .contains_key(&format!("{}{}{}", creator_id, DELIMITER, nonce))
    }
}

impl Contract {
    /// Full voucher admission: data validation, digest check, signature
    /// verification, replay check, and exact payment — all before any state
    /// change or external call. Returns (gross, surcharge, nonce_key).
    pub(crate) fn internal_verify_voucher(
        &self,
        buyer: &AccountId,
        voucher: &Voucher,
        digest: &[u8],
        signature: &[u8],
        deposit: u128,
    ) -> Result<(u128, u128, String), MarketplaceError> {
        let asset_kind = self
            .asset_kind_of(&voucher.asset_contract)
            .ok_or_else(|| MarketplaceError::unknown_asset_kind(&voucher.asset_contract))?;
        if voucher.quantity == 0 {
            return Err(MarketplaceError::InvalidInput(
                "Quantity must be greater than 0".into(),
            ));
        }
        if asset_kind == AssetKind::SingleEdition && voucher.quantity != 1 {
            return Err(MarketplaceError::InvalidInput(
                "Single-edition vouchers must mint quantity 1".into(),
            ));
        }
        if voucher.price.0 == 0 {
            return Err(MarketplaceError::InvalidInput(
                "Price must be greater than 0".into(),
            ));
        }
        if voucher.royalty_bps > self.config.max_royalty_bps {
            return Err(MarketplaceError::InvalidInput(format!(
                "Royalty exceeds the maximum of {} bps",
                self.config.max_royalty_bps
            )));
        }
        validate_collaborators(&voucher.collaborators)?;
        if buyer == &voucher.creator_id {
            return Err(MarketplaceError::InvalidInput(
                "Creator cannot redeem their own voucher".into(),
            ));
        }

        let expected = voucher_digest(voucher)?;
        if digest != expected {
            return Err(MarketplaceError::voucher_data_mismatch());
        }

        let public_key = self
            .minting_keys
            .get(&voucher.creator_id)
            .ok_or_else(|| {
                MarketplaceError::NotFound(format!(
                    "No minting key registered for {}",
                    voucher.creator_id
                ))
            })?;
        let key_bytes = ed25519_key_bytes(public_key)?;
        let sig_bytes: [u8; 64] = signature
            .try_into()
            .map_err(|_| MarketplaceError::InvalidSignature("Signature must be 64 bytes".into()))?;
        if !env::ed25519_verify(&sig_bytes, &expected, &key_bytes) {
            return Err(MarketplaceError::InvalidSignature(
                "Signature does not verify against the creator's minting key".into(),
            ));
        }

        let nonce_key = format!("{}{}{}", voucher.creator_id, DELIMITER, voucher.nonce);
        if self.consumed_nonces.contains_key(&nonce_key) {
            return Err(MarketplaceError::voucher_already_consumed());
        }

        let gross = voucher
            .price
            .0
            .checked_mul(voucher.quantity as u128)
            .ok_or_else(|| MarketplaceError::InvalidInput("Price overflow".into()))?;
        let surcharge = bps_share(gross, self.config.buyer_surcharge_bps);
        if deposit != gross + surcharge {
            return Err(MarketplaceError::IncorrectAmount(format!(
                "Attached deposit must be exactly {} (price {} + surcharge {})",
                gross + surcharge,
                gross,
                surcharge
            )));
        }

        Ok((gross, surcharge, nonce_key))
    }
}
