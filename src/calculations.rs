use concordium_std::*;

use crate::percentage::Percentage;

/// Split of a sale price between the seller and the marketplace.
#[derive(Debug, PartialEq, Eq)]
pub struct Shares {
    /// Amount transferred to the seller on settlement.
    pub seller: Amount,
    /// Amount credited to the fee accumulator.
    pub fee: Amount,
}

/// Split a sale price according to the marketplace fee.
///
/// The seller share is rounded down, so the fee absorbs any rounding residue
/// and the two shares always add up to the full price.
pub fn calc_shares(price: Amount, fee: Percentage) -> Shares {
    let seller = (Percentage::from_percent(100) - fee) * price;
    Shares {
        seller,
        fee: price - seller,
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;

    #[concordium_test]
    fn test_shares_exact() {
        let expected_shares = Shares {
            seller: Amount::from_ccd(95),
            fee: Amount::from_ccd(5),
        };

        let actual_shares = calc_shares(Amount::from_ccd(100), Percentage::from_percent(5));

        claim_eq!(expected_shares, actual_shares);
    }

    /// The seller share of 123 units at a 5% fee rounds down to 116, leaving
    /// 7 to the fee instead of the 6 that symmetric rounding would give.
    #[concordium_test]
    fn test_shares_rounding_residue_goes_to_fee() {
        let price = Amount::from_micro_ccd(123);

        let shares = calc_shares(price, Percentage::from_percent(5));

        claim_eq!(shares.seller, Amount::from_micro_ccd(116));
        claim_eq!(shares.fee, Amount::from_micro_ccd(7));
        claim_eq!(shares.seller + shares.fee, price);
    }

    #[concordium_test]
    fn test_shares_fractional_fee() {
        let shares = calc_shares(
            Amount::from_ccd(200),
            Percentage::from_micro_percent(2_500_000),
        );

        claim_eq!(shares.seller, Amount::from_ccd(195));
        claim_eq!(shares.fee, Amount::from_ccd(5));
    }

    #[concordium_test]
    fn test_shares_zero_fee() {
        let price = Amount::from_micro_ccd(77);

        let shares = calc_shares(price, Percentage::from_percent(0));

        claim_eq!(shares.seller, price);
        claim_eq!(shares.fee, Amount::zero());
    }
}
