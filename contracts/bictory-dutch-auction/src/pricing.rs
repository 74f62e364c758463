use commons::CustomContractError;
use concordium_cis1::TokenAmount;
use concordium_std::*;

use crate::state::AuctionData;

/// Price implied by the auction terms at `now`.
///
/// The price falls linearly from `max_price` at `started_at` to `min_price`
/// at the deadline. The discount is rounded down, so the price may plateau
/// between consecutive timestamps but never increases. Fails once `now` is
/// strictly past the deadline.
pub fn current_price(
    auction: &AuctionData,
    now: Timestamp,
) -> Result<TokenAmount, CustomContractError> {
    let start = auction.started_at.timestamp_millis();
    let span = auction.duration.millis();
    let deadline = start.saturating_add(span);

    ensure!(
        now.timestamp_millis() <= deadline,
        CustomContractError::AuctionExpired
    );

    let elapsed = now.timestamp_millis().saturating_sub(start);
    let band = auction.max_price - auction.min_price;
    // Widening keeps `band * elapsed` from overflowing. The discount reaches
    // `band` exactly when `elapsed` reaches `span`, so the deadline price is
    // `min_price` with no rounding error.
    let discount = (band as u128 * elapsed as u128 / span as u128) as TokenAmount;

    Ok(auction.max_price - discount)
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::Token;
    use concordium_cis1::TokenIdVec;

    const PAYMENT_CONTRACT: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    const START: u64 = 1_000_000;

    fn auction(max_price: TokenAmount, min_price: TokenAmount, duration_secs: u64) -> AuctionData {
        AuctionData {
            owner: AccountAddress([0; 32]),
            buy_with: Token {
                contract: PAYMENT_CONTRACT,
                id: TokenIdVec(vec![0]),
            },
            max_price,
            min_price,
            duration: Duration::from_seconds(duration_secs),
            started_at: Timestamp::from_timestamp_millis(START),
        }
    }

    fn at_elapsed_secs(secs: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(START + secs * 1000)
    }

    #[concordium_test]
    fn test_price_at_start_is_max() {
        let auction = auction(10, 1, 300);
        claim_eq!(current_price(&auction, at_elapsed_secs(0)), Ok(10));
    }

    #[concordium_test]
    fn test_price_at_deadline_is_min() {
        let auction = auction(10, 1, 300);
        claim_eq!(current_price(&auction, at_elapsed_secs(300)), Ok(1));
    }

    #[concordium_test]
    fn test_price_midway_rounds_down() {
        // Halfway through, the full discount of 9 would be 4.5: the price
        // truncates to 10 - 4 = 6.
        let auction = auction(10, 1, 300);
        claim_eq!(current_price(&auction, at_elapsed_secs(150)), Ok(6));
    }

    #[concordium_test]
    fn test_price_is_monotonically_non_increasing() {
        let auction = auction(10, 1, 300);

        let mut previous = current_price(&auction, at_elapsed_secs(0)).expect("Price at start");
        for secs in 1..=300 {
            let price = current_price(&auction, at_elapsed_secs(secs)).expect("Price in window");
            claim!(price <= previous, "Price must never increase");
            claim!(price >= 1, "Price must stay within the band");
            previous = price;
        }
        claim_eq!(previous, 1);
    }

    #[concordium_test]
    fn test_price_fails_past_deadline() {
        let auction = auction(10, 1, 300);

        claim_eq!(
            current_price(&auction, at_elapsed_secs(400)),
            Err(CustomContractError::AuctionExpired)
        );
        // The window is inclusive: expiry starts one tick after the deadline.
        claim_eq!(
            current_price(
                &auction,
                Timestamp::from_timestamp_millis(START + 300 * 1000 + 1)
            ),
            Err(CustomContractError::AuctionExpired)
        );
    }

    #[concordium_test]
    fn test_flat_band_keeps_constant_price() {
        let auction = auction(5, 5, 300);

        claim_eq!(current_price(&auction, at_elapsed_secs(0)), Ok(5));
        claim_eq!(current_price(&auction, at_elapsed_secs(150)), Ok(5));
        claim_eq!(current_price(&auction, at_elapsed_secs(300)), Ok(5));
    }
}
