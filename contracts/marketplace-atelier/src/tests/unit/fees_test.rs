use crate::fees::{bps_share, split_collaborators, split_primary, split_secondary};
use crate::tests::test_utils::*;
use crate::types::{CollaboratorShare, MarketConfig};

#[test]
fn bps_share_floors() {
    assert_eq!(bps_share(10_000, 300), 300);
    assert_eq!(bps_share(999, 300), 29); // 29.97 floors
    assert_eq!(bps_share(1, 9_999), 0);
    assert_eq!(bps_share(0, 1_500), 0);
}

#[test]
fn bps_share_survives_u128_scale() {
    // gross * bps would overflow u128 without widening.
    let gross = u128::MAX / 2;
    assert_eq!(bps_share(gross, 10_000), gross);
    assert_eq!(bps_share(gross, 5_000), gross / 2);
}

#[test]
fn primary_split_six_near() {
    let config = MarketConfig::default();
    let breakdown = split_primary(near(6), &config);

    assert_eq!(breakdown.platform_fee_amount, millinear(900));
    assert_eq!(breakdown.collector_fee_amount, millinear(180));
    assert_eq!(breakdown.royalty_amount, 0);
    assert_eq!(breakdown.seller_amount, millinear(4_920));
    assert_eq!(breakdown.gross(), near(6));
}

#[test]
fn primary_split_conserves_awkward_amounts() {
    let config = MarketConfig::default();
    for gross in [1u128, 3, 7, 999, 10_001, 123_456_789] {
        let breakdown = split_primary(gross, &config);
        assert_eq!(breakdown.gross(), gross, "gross {}", gross);
    }
}

#[test]
fn secondary_split_pays_royalty_not_collector_fee() {
    let config = MarketConfig::default();
    let breakdown = split_secondary(near(10), 1_000, &config);

    assert_eq!(breakdown.platform_fee_amount, millinear(500));
    assert_eq!(breakdown.royalty_amount, near(1));
    assert_eq!(breakdown.collector_fee_amount, 0);
    assert_eq!(breakdown.seller_amount, millinear(8_500));
    assert_eq!(breakdown.gross(), near(10));
}

#[test]
fn secondary_split_zero_royalty() {
    let config = MarketConfig::default();
    let breakdown = split_secondary(near(10), 0, &config);
    assert_eq!(breakdown.royalty_amount, 0);
    assert_eq!(breakdown.seller_amount, millinear(9_500));
}

#[test]
fn collaborator_split_dust_goes_to_first() {
    let shares = vec![
        CollaboratorShare {
            account_id: seller(),
            share_bps: 3_333,
        },
        CollaboratorShare {
            account_id: collab(),
            share_bps: 3_333,
        },
        CollaboratorShare {
            account_id: buyer(),
            share_bps: 3_334,
        },
    ];
    // 100 does not divide into thirds; the first collaborator absorbs the dust.
    let amounts = split_collaborators(100, &shares);
    assert_eq!(amounts[0], (seller(), 34));
    assert_eq!(amounts[1], (collab(), 33));
    assert_eq!(amounts[2], (buyer(), 33));
    assert_eq!(amounts.iter().map(|(_, a)| a).sum::<u128>(), 100);
}

#[test]
fn collaborator_split_even_shares_exact() {
    let shares = vec![
        CollaboratorShare {
            account_id: seller(),
            share_bps: 7_000,
        },
        CollaboratorShare {
            account_id: collab(),
            share_bps: 3_000,
        },
    ];
    let amounts = split_collaborators(near(1), &shares);
    assert_eq!(amounts[0].1, millinear(700));
    assert_eq!(amounts[1].1, millinear(300));
}

#[test]
fn collaborator_split_empty_is_empty() {
    assert!(split_collaborators(near(1), &[]).is_empty());
}
