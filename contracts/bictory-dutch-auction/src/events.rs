use commons::{ContractTokenId, AUCTION_TAG, BID_TAG};
use concordium_cis1::TokenAmount;
use concordium_std::*;

use crate::external::AuctionInfo;

/// Auction start event data.
#[derive(Debug, Serial)]
pub struct AuctionEvent<'a> {
    /// NFT contract address.
    pub contract: &'a ContractAddress,
    /// NFT token identifier.
    pub id: &'a ContractTokenId,
    /// Address of the token owner.
    pub owner: &'a AccountAddress,
    /// Auction terms.
    pub conditions: &'a AuctionInfo,
}

/// Accepted bid event data.
#[derive(Debug, Serial)]
pub struct BidEvent<'a> {
    /// NFT contract address.
    pub contract: &'a ContractAddress,
    /// NFT token identifier.
    pub id: &'a ContractTokenId,
    /// Bidder account address.
    pub bidder: &'a AccountAddress,
    /// Settlement price.
    pub price: TokenAmount,
}

/// Tagged Custom event to be serialized for the event log.
#[derive(Debug)]
pub enum AuctionEvents<'a> {
    /// Token escrowed under auction terms
    Auction(AuctionEvent<'a>),
    /// Accepted bid
    Bid(BidEvent<'a>),
}

impl<'a> AuctionEvents<'a> {
    pub fn auction(
        contract: &'a ContractAddress,
        id: &'a ContractTokenId,
        owner: &'a AccountAddress,
        conditions: &'a AuctionInfo,
    ) -> Self {
        Self::Auction(AuctionEvent {
            contract,
            id,
            owner,
            conditions,
        })
    }

    pub fn bid(
        contract: &'a ContractAddress,
        id: &'a ContractTokenId,
        bidder: &'a AccountAddress,
        price: TokenAmount,
    ) -> Self {
        Self::Bid(BidEvent {
            contract,
            id,
            bidder,
            price,
        })
    }
}

impl<'a> Serial for AuctionEvents<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            AuctionEvents::Auction(event) => {
                out.write_u8(AUCTION_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Bid(event) => {
                out.write_u8(BID_TAG)?;
                event.serial(out)
            }
        }
    }
}
