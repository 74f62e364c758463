use commons::{CustomContractError, Token};
use concordium_cis1::{TokenAmount, TokenIdVec};
use concordium_std::*;

use crate::external::AuctionInfo;

/// A single lot: the auction terms recorded when the token entered escrow.
/// Immutable for the lifetime of the record.
#[derive(Debug, Clone, Serialize, SchemaType)]
pub struct AuctionData {
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

impl AuctionData {
    pub fn new(owner: AccountAddress, info: AuctionInfo, started_at: Timestamp) -> Self {
        Self {
            owner,
            buy_with: info.buy_with,
            max_price: info.max_price,
            min_price: info.min_price,
            duration: info.duration,
            started_at,
        }
    }
}

/// The contract state.
#[derive(Serial, DeserialWithState)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Account allowed to put tokens up for auction.
    pub owner: AccountAddress,
    /// Account that receives auction payments.
    pub beneficiary: AccountAddress,
    /// Auction records, keyed by the escrowed token.
    pub auctions: StateMap<Token, AuctionData, S>,
}

impl<S: HasStateApi> State<S> {
    /// Create a new state with no auctions.
    pub fn new(
        state_builder: &mut StateBuilder<S>,
        owner: AccountAddress,
        beneficiary: AccountAddress,
    ) -> Self {
        State {
            owner,
            beneficiary,
            auctions: state_builder.new_map(),
        }
    }

    /// Predicate gating auction creation to the configured owner account.
    pub fn is_owner(&self, account: &AccountAddress) -> bool {
        *account == self.owner
    }

    /// Store a new auction record. A token with an existing record is
    /// rejected: every record is consumed at most once, and records are kept
    /// after settlement.
    pub fn start_auction(
        &mut self,
        contract: ContractAddress,
        id: TokenIdVec,
        auction: AuctionData,
    ) -> Result<(), CustomContractError> {
        if self
            .auctions
            .insert(Token { contract, id }, auction)
            .is_some()
        {
            // Duplicate token auctioning is not allowed. The insert is rolled
            // back together with the rest of the rejected transaction.
            Err(CustomContractError::TokenAlreadyOnAuction)
        } else {
            Ok(())
        }
    }

    /// Look up an auction record.
    pub fn get(&self, token: &Token) -> Result<AuctionData, CustomContractError> {
        self.auctions
            .get(token)
            .map(|auction| auction.clone())
            .ok_or(CustomContractError::UnknownToken)
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use concordium_std::test_infrastructure::*;

    const OWNER: AccountAddress = AccountAddress([0; 32]);
    const BENEFICIARY: AccountAddress = AccountAddress([9; 32]);

    const NFT_CONTRACT: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const PAYMENT_CONTRACT: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    fn payment_token() -> Token {
        Token {
            contract: PAYMENT_CONTRACT,
            id: TokenIdVec(vec![0]),
        }
    }

    fn dummy_auction() -> AuctionData {
        AuctionData {
            owner: OWNER,
            buy_with: payment_token(),
            max_price: 10,
            min_price: 1,
            duration: Duration::from_seconds(300),
            started_at: Timestamp::from_timestamp_millis(1_000_000),
        }
    }

    fn new_state(state_builder: &mut TestStateBuilder) -> State<TestStateApi> {
        State::new(state_builder, OWNER, BENEFICIARY)
    }

    #[concordium_test]
    fn test_is_owner() {
        let mut state_builder = TestStateBuilder::new();
        let state = new_state(&mut state_builder);

        claim!(state.is_owner(&OWNER));
        claim!(!state.is_owner(&BENEFICIARY));
    }

    #[concordium_test]
    fn test_start_auction_stores_record() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder);

        let result = state.start_auction(NFT_CONTRACT, TokenIdVec(vec![0, 1]), dummy_auction());
        claim_eq!(result, Ok(()));

        let stored = state
            .get(&Token {
                contract: NFT_CONTRACT,
                id: TokenIdVec(vec![0, 1]),
            })
            .expect("Record should be stored");
        claim_eq!(stored.max_price, 10);
        claim_eq!(stored.min_price, 1);
        claim_eq!(stored.started_at, Timestamp::from_timestamp_millis(1_000_000));
    }

    #[concordium_test]
    fn test_start_auction_duplicate_rejected() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = new_state(&mut state_builder);

        let result = state.start_auction(NFT_CONTRACT, TokenIdVec(vec![0, 1]), dummy_auction());
        claim_eq!(result, Ok(()));

        let result = state.start_auction(NFT_CONTRACT, TokenIdVec(vec![0, 1]), dummy_auction());
        claim_eq!(result, Err(CustomContractError::TokenAlreadyOnAuction));
    }

    #[concordium_test]
    fn test_get_unknown_token() {
        let mut state_builder = TestStateBuilder::new();
        let state = new_state(&mut state_builder);

        let result = state.get(&Token {
            contract: NFT_CONTRACT,
            id: TokenIdVec(vec![7]),
        });
        claim_eq!(result.err(), Some(CustomContractError::UnknownToken));
    }
}
