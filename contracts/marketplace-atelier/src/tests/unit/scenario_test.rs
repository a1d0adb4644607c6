//! End-to-end flows across listing, settlement, and escrow, asserting exact
//! yoctoNEAR accounting at every step.

use crate::tests::test_utils::*;
use crate::*;
use near_sdk::testing_env;

/// Single-edition primary sale at 6 NEAR: 15% platform + 3% collector fee,
/// 3% buyer surcharge. Seller nets 4.92 NEAR; the fee wallet collects
/// 0.9 + 0.18 + 0.18 = 1.26 NEAR; every yocto of the deposit is accounted for.
#[test]
fn primary_fixed_price_sale_accounting() {
    let mut contract = new_contract();
    list_fixed(&mut contract, nft_registry(), "art-1", seller(), near(6), 1);

    let deposit = millinear(6_180); // 6 NEAR + 3%
    let receipt = contract
        .internal_purchase_prepare(&buyer(), &nft_registry(), &seller(), "art-1", 1, deposit)
        .unwrap();
    let breakdown = contract.internal_purchase_settle(&receipt);

    assert_eq!(breakdown.seller_amount, millinear(4_920));
    assert_eq!(breakdown.platform_fee_amount, millinear(900));
    assert_eq!(breakdown.collector_fee_amount, millinear(180));
    assert_eq!(breakdown.gross(), near(6));

    assert_eq!(contract.pending_balance_of(seller()).0, millinear(4_920));
    assert_eq!(contract.pending_balance_of(fee_wallet()).0, millinear(1_260));
    assert_eq!(contract.get_total_escrowed().0, deposit);
}

/// Multi-edition partial purchase: 6 of 10 editions at 2 NEAR each. The
/// deposit must match 12 NEAR + 3% exactly; 4 editions stay listed.
#[test]
fn multi_edition_partial_purchase() {
    let mut contract = new_contract();
    list_fixed(&mut contract, mt_registry(), "print-7", seller(), near(2), 10);

    // One yocto short is rejected outright.
    let err = contract
        .internal_purchase_prepare(
            &buyer(),
            &mt_registry(),
            &seller(),
            "print-7",
            6,
            millinear(12_360) - 1,
        )
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::IncorrectAmount(_)));

    let receipt = contract
        .internal_purchase_prepare(
            &buyer(),
            &mt_registry(),
            &seller(),
            "print-7",
            6,
            millinear(12_360),
        )
        .unwrap();
    contract.internal_purchase_settle(&receipt);

    let listing = contract
        .get_listing(mt_registry(), seller(), "print-7".to_string())
        .unwrap();
    assert_eq!(listing.remaining(), 4);

    // 12 NEAR gross: seller 82% = 9.84; fee wallet 1.8 + 0.36 + 0.36 = 2.52.
    assert_eq!(contract.pending_balance_of(seller()).0, millinear(9_840));
    assert_eq!(contract.pending_balance_of(fee_wallet()).0, millinear(2_520));
}

/// A full auction round: reserve bid, outbid, snipe extension, settlement.
/// Conservation: bidder deposits in minus refunds out equals distributed value.
#[test]
fn auction_lifecycle_accounting() {
    let mut contract = new_contract();
    list_auction(&mut contract, nft_registry(), "art-9", seller(), near(2), 1);

    let t0 = TEST_TIMESTAMP;
    contract
        .internal_place_bid(&bidder(), &nft_registry(), &seller(), "art-9", near(2), t0)
        .unwrap();

    // Sniped one minute before the deadline; the clock moves out 15 minutes.
    let end = t0 + contract.get_config().auction_duration_ns;
    let snipe = end - 60 * 1_000_000_000;
    contract
        .internal_place_bid(&buyer(), &nft_registry(), &seller(), "art-9", near(5), snipe)
        .unwrap();
    assert_eq!(contract.pending_balance_of(bidder()).0, near(2));

    let new_end = snipe + contract.get_config().extension_ns;
    let receipt = contract
        .internal_end_auction_prepare(&buyer(), &nft_registry(), &seller(), "art-9", new_end)
        .unwrap();

    testing_env!(context("market.near".parse().unwrap()).build());
    contract.resolve_auction(receipt, Ok(()));

    // 5 NEAR winning bid: seller 4.1, fee wallet 0.75 + 0.15.
    assert_eq!(contract.pending_balance_of(seller()).0, millinear(4_100));
    assert_eq!(contract.pending_balance_of(fee_wallet()).0, millinear(900));

    // Ledger holds the losing bid plus the distributed winning bid.
    assert_eq!(contract.get_total_escrowed().0, near(2) + near(5));
}

/// A first sale with a 60/40 collaborator split settles atomically: both
/// collaborators are credited in the same settlement, dust and all.
#[test]
fn collaborator_split_settles_atomically() {
    let mut contract = new_contract();
    let info = {
        let mut info = sale_info(seller(), 1);
        info.collaborators = vec![
            CollaboratorShare {
                account_id: seller(),
                share_bps: 6_000,
            },
            CollaboratorShare {
                account_id: collab(),
                share_bps: 4_000,
            },
        ];
        info
    };
    contract
        .internal_create_listing(
            nft_registry(),
            "duo-1".to_string(),
            seller(),
            near(10),
            1,
            false,
            info,
        )
        .unwrap();

    let receipt = contract
        .internal_purchase_prepare(
            &buyer(),
            &nft_registry(),
            &seller(),
            "duo-1",
            1,
            millinear(10_300),
        )
        .unwrap();
    contract.internal_purchase_settle(&receipt);

    // Seller side = 10 - 1.5 - 0.3 = 8.2 NEAR, split 60/40.
    assert_eq!(contract.pending_balance_of(seller()).0, millinear(4_920));
    assert_eq!(contract.pending_balance_of(collab()).0, millinear(3_280));
    assert_eq!(contract.pending_balance_of(fee_wallet()).0, millinear(2_100));
    assert_eq!(contract.get_total_escrowed().0, millinear(10_300));
}

/// Once a first sale has settled on a multi-edition listing, purchases of
/// the remaining editions of that same live listing route as secondary
/// sales: royalty instead of collector fee, 5% platform instead of 15%.
#[test]
fn second_purchase_on_live_listing_settles_secondary() {
    let mut contract = new_contract();
    let info = {
        let mut info = sale_info(seller(), 10);
        info.royalty_bps = 1_000;
        info.royalty_recipient = Some(collab());
        info
    };
    contract
        .internal_create_listing(
            mt_registry(),
            "print-3".to_string(),
            seller(),
            near(2),
            10,
            false,
            info,
        )
        .unwrap();

    // First sale: 6 editions, 12 NEAR gross, primary split (no royalty).
    let receipt = contract
        .internal_purchase_prepare(
            &buyer(),
            &mt_registry(),
            &seller(),
            "print-3",
            6,
            millinear(12_360),
        )
        .unwrap();
    assert!(receipt.is_first_sale);
    let first = contract.internal_purchase_settle(&receipt);
    assert_eq!(first.royalty_amount, 0);
    assert_eq!(contract.pending_balance_of(collab()).0, 0);

    // Remaining 4 editions: 8 NEAR gross, now a secondary sale.
    let receipt = contract
        .internal_purchase_prepare(
            &bidder(),
            &mt_registry(),
            &seller(),
            "print-3",
            4,
            millinear(8_240),
        )
        .unwrap();
    assert!(!receipt.is_first_sale);
    let second = contract.internal_purchase_settle(&receipt);

    assert_eq!(second.platform_fee_amount, millinear(400));
    assert_eq!(second.royalty_amount, millinear(800));
    assert_eq!(second.collector_fee_amount, 0);
    assert_eq!(contract.pending_balance_of(collab()).0, millinear(800));
    assert_eq!(contract.pending_balance_of(seller()).0, millinear(16_640));
    assert_eq!(contract.pending_balance_of(fee_wallet()).0, millinear(3_160));
}

/// Secondary sale routing: after the first sale settles, a relisting of the
/// same key splits with royalty instead of the collector fee.
#[test]
fn secondary_sale_pays_royalty() {
    let mut contract = new_contract();
    let info = {
        let mut info = sale_info(seller(), 1);
        info.royalty_bps = 1_000;
        info.royalty_recipient = Some(collab());
        info
    };
    contract
        .internal_create_listing(
            nft_registry(),
            "art-2".to_string(),
            seller(),
            near(4),
            1,
            false,
            info.clone(),
        )
        .unwrap();

    let receipt = contract
        .internal_purchase_prepare(
            &buyer(),
            &nft_registry(),
            &seller(),
            "art-2",
            1,
            millinear(4_120),
        )
        .unwrap();
    let first = contract.internal_purchase_settle(&receipt);
    assert_eq!(first.royalty_amount, 0);

    // Relist and sell again: now a secondary sale.
    contract
        .internal_create_listing(
            nft_registry(),
            "art-2".to_string(),
            seller(),
            near(10),
            1,
            false,
            info,
        )
        .unwrap();
    let receipt = contract
        .internal_purchase_prepare(
            &buyer(),
            &nft_registry(),
            &seller(),
            "art-2",
            1,
            millinear(10_300),
        )
        .unwrap();
    assert!(!receipt.is_first_sale);
    let second = contract.internal_purchase_settle(&receipt);

    // 10 NEAR gross: 5% platform, 10% royalty to the designated recipient.
    assert_eq!(second.platform_fee_amount, millinear(500));
    assert_eq!(second.royalty_amount, near(1));
    assert_eq!(second.collector_fee_amount, 0);
    assert_eq!(contract.pending_balance_of(collab()).0, near(1));
}

/// Withdrawals drain the ledger and conservation still holds.
#[test]
fn settlement_then_withdrawal_conserves_value() {
    let mut contract = new_contract();
    list_fixed(&mut contract, nft_registry(), "art-1", seller(), near(6), 1);
    let receipt = contract
        .internal_purchase_prepare(
            &buyer(),
            &nft_registry(),
            &seller(),
            "art-1",
            1,
            millinear(6_180),
        )
        .unwrap();
    contract.internal_purchase_settle(&receipt);
    let total_before = contract.get_total_escrowed().0;

    testing_env!(context_with_deposit(seller(), 1).build());
    contract.withdraw(None).unwrap();

    assert_eq!(contract.pending_balance_of(seller()).0, 0);
    assert_eq!(
        contract.get_total_escrowed().0,
        total_before - millinear(4_920)
    );
}
