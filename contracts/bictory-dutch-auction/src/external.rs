use commons::Token;
use concordium_cis1::TokenAmount;
use concordium_std::*;

use crate::state::AuctionData;

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct InitParams {
    /// Account that receives auction payments.
    pub beneficiary: AccountAddress,
}

/// Descending price auction terms. Attached as the data payload of the CIS-1
/// transfer that escrows the token.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct AuctionInfo {
    /// Fungible token kind accepted as payment.
    pub buy_with: Token,
    /// Price at the moment the token enters escrow.
    pub max_price: TokenAmount,
    /// Price at the deadline.
    pub min_price: TokenAmount,
    /// Time between escrow and the deadline.
    pub duration: Duration,
}

/// Auction record read-back.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct AuctionView {
    /// Seller account address.
    pub owner: AccountAddress,
    /// Fungible token kind accepted as payment.
    pub buy_with: Token,
    /// Price at `started_at`.
    pub max_price: TokenAmount,
    /// Price at the deadline.
    pub min_price: TokenAmount,
    /// Auction length.
    pub duration: Duration,
    /// Slot time of the escrow transfer.
    pub started_at: Timestamp,
}

impl From<AuctionData> for AuctionView {
    fn from(auction: AuctionData) -> Self {
        Self {
            owner: auction.owner,
            buy_with: auction.buy_with,
            max_price: auction.max_price,
            min_price: auction.min_price,
            duration: auction.duration,
            started_at: auction.started_at,
        }
    }
}
