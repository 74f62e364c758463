use commons::{CustomContractError, Token};
use concordium_cis1::{OnReceivingCis1Params, TokenAmount, TokenIdVec};
use concordium_std::*;

use crate::events::*;
use crate::external::*;
use crate::nft;
use crate::pricing;
use crate::state::{AuctionData, State};
use crate::token;

/// Initialize the auction contract with an empty registry. The instantiating
/// account becomes the only account allowed to put tokens up for auction.
#[init(contract = "BictoryDutchAuction", parameter = "InitParams")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params = InitParams::deserial(&mut ctx.parameter_cursor())?;
    Ok(State::new(
        state_builder,
        ctx.init_origin(),
        params.beneficiary,
    ))
}

/// Put a token up for auction. This function is intended to be passed as a
/// callback to the CIS-1 transfer function: the transfer escrows the token
/// with this contract, and the attached data payload carries the auction
/// terms.
///
/// Rejecting here rolls the escrow transfer back together with the record,
/// so custody and storage always change together.
#[receive(
    mutable,
    contract = "BictoryDutchAuction",
    name = "startAuction",
    parameter = "OnReceivingCis1Params<TokenIdVec>",
    enable_logger
)]
fn contract_start_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let transfer_info = OnReceivingCis1Params::<TokenIdVec>::deserial(&mut ctx.parameter_cursor())?;
    // Do not auction anything if no tokens were transfered
    if transfer_info.amount == 0 {
        return Ok(());
    }
    // Amount of tokens over 1 is not currently supported
    ensure!(
        transfer_info.amount == 1,
        CustomContractError::Unsupported.into()
    );

    let owner = if let Address::Account(owner) = transfer_info.from {
        owner
    } else {
        bail!(CustomContractError::Unsupported.into());
    };

    let contract = if let Address::Contract(sender) = ctx.sender() {
        sender
    } else {
        bail!(CustomContractError::ContractOnly.into());
    };

    ensure!(
        host.state().is_owner(&owner),
        CustomContractError::Unauthorized.into()
    );

    let info: AuctionInfo = from_bytes(transfer_info.data.as_ref())?;

    ensure!(
        info.max_price >= info.min_price,
        CustomContractError::InvalidPriceRange.into()
    );
    ensure!(
        info.duration.millis() > 0,
        CustomContractError::InvalidDuration.into()
    );

    logger.log(&AuctionEvents::auction(
        &contract,
        &transfer_info.token_id,
        &owner,
        &info,
    ))?;

    let started_at = ctx.metadata().slot_time();
    host.state_mut().start_auction(
        contract,
        transfer_info.token_id,
        AuctionData::new(owner, info, started_at),
    )?;

    Ok(())
}

/// Buy the escrowed token at the price currently implied by the auction
/// terms. Custody of the escrowed token is re-checked on every call, so the
/// first bid that completes wins the token and every later bid fails.
///
/// The payment is pulled before the token leaves escrow. A rejected payment
/// rejects the whole call with the token untouched; a rejected token
/// transfer rolls the payment back with the rest of the transaction. Both
/// legs commit together or not at all.
#[receive(
    mutable,
    contract = "BictoryDutchAuction",
    name = "bid",
    parameter = "Token",
    enable_logger
)]
fn contract_bid<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let token = Token::deserial(&mut ctx.parameter_cursor())?;

    let bidder = if let Address::Account(bidder) = ctx.sender() {
        bidder
    } else {
        bail!(CustomContractError::OnlyAccountAddress.into());
    };

    let auction = host.state().get(&token)?;

    // Custody is the only liveness signal: the record stays in storage after
    // settlement, but the escrow balance drops to zero.
    let held = nft::balance_of(host, &token, Address::Contract(ctx.self_address()))?;
    ensure!(held == 1, CustomContractError::TokenNotOnAuction.into());

    let price = pricing::current_price(&auction, ctx.metadata().slot_time())?;

    let beneficiary = host.state().beneficiary;
    token::transfer(host, &auction.buy_with, price, bidder, beneficiary)?;

    // Transfer token out of escrow to the bidder
    nft::transfer(host, &token, Address::Contract(ctx.self_address()), bidder)?;

    logger.log(&AuctionEvents::bid(
        &token.contract,
        &token.id,
        &bidder,
        price,
    ))?;

    Ok(())
}

/// Look up an auction record.
#[receive(
    contract = "BictoryDutchAuction",
    name = "view",
    parameter = "Token",
    return_value = "AuctionView"
)]
fn contract_view<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<AuctionView> {
    let token = Token::deserial(&mut ctx.parameter_cursor())?;
    let auction = host.state().get(&token)?;
    Ok(auction.into())
}

/// Price the escrowed token sells for at the current slot time.
#[receive(
    contract = "BictoryDutchAuction",
    name = "viewPrice",
    parameter = "Token",
    return_value = "TokenAmount"
)]
fn contract_view_price<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<TokenAmount> {
    let token = Token::deserial(&mut ctx.parameter_cursor())?;
    let auction = host.state().get(&token)?;
    let price = pricing::current_price(&auction, ctx.metadata().slot_time())?;
    Ok(price)
}

#[concordium_cfg_test]
mod tests {
    use commons::test::{logic_reject_mock, parse_and_check_mock, parse_and_map_mock};
    use commons::{AUCTION_TAG, BID_TAG};
    use concordium_cis1::{
        AdditionalData, BalanceOfQueryParams, BalanceOfQueryResponse, Receiver, TransferParams,
    };
    use concordium_std::test_infrastructure::*;

    use super::*;

    const OWNER: AccountAddress = AccountAddress([0u8; 32]);
    const BIDDER: AccountAddress = AccountAddress([1u8; 32]);
    const BENEFICIARY: AccountAddress = AccountAddress([9u8; 32]);

    const SELF_ADDRESS: ContractAddress = ContractAddress {
        index: 0,
        subindex: 0,
    };
    const NFT_CONTRACT: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const PAYMENT_CONTRACT: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    // Auction terms used throughout: the price falls from 10 to 1 over 300
    // seconds, starting at slot time 1_000_000.
    const STARTED_AT: u64 = 1_000_000;
    const DURATION_SECS: u64 = 300;

    fn token_0() -> Token {
        Token {
            contract: NFT_CONTRACT,
            id: TokenIdVec(vec![0, 1]),
        }
    }

    fn payment_token() -> Token {
        Token {
            contract: PAYMENT_CONTRACT,
            id: TokenIdVec(vec![0]),
        }
    }

    fn auction_info(max_price: TokenAmount, min_price: TokenAmount, duration_secs: u64) -> AuctionInfo {
        AuctionInfo {
            buy_with: payment_token(),
            max_price,
            min_price,
            duration: Duration::from_seconds(duration_secs),
        }
    }

    fn new_host() -> TestHost<State<TestStateApi>> {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, OWNER, BENEFICIARY);
        TestHost::new(state, state_builder)
    }

    fn new_host_with_auction() -> TestHost<State<TestStateApi>> {
        let mut host = new_host();
        let token = token_0();
        host.state_mut()
            .start_auction(
                token.contract,
                token.id,
                AuctionData::new(
                    OWNER,
                    auction_info(10, 1, DURATION_SECS),
                    Timestamp::from_timestamp_millis(STARTED_AT),
                ),
            )
            .expect("Fresh registry accepts the record");
        host
    }

    fn start_parameter(from: AccountAddress, info: &AuctionInfo) -> Vec<u8> {
        to_bytes(&OnReceivingCis1Params {
            token_id: TokenIdVec(vec![0, 1]),
            amount: 1,
            from: Address::Account(from),
            data: AdditionalData::from(to_bytes(info)),
        })
    }

    fn receive_ctx<'a>(sender: Address, parameter_bytes: &'a [u8], slot_time: u64) -> TestReceiveContext<'a> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(sender);
        ctx.set_self_address(SELF_ADDRESS);
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(slot_time));
        ctx.set_parameter(parameter_bytes);
        ctx
    }

    fn setup_escrow_balance(host: &mut TestHost<State<TestStateApi>>, held: TokenAmount) {
        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            OwnedEntrypointName::new_unchecked("balanceOf".into()),
            parse_and_map_mock::<BalanceOfQueryParams<TokenIdVec>, _, _>(move |queries| {
                if queries.queries.len() == 1
                    && queries.queries[0].address == Address::Contract(SELF_ADDRESS)
                {
                    Some(BalanceOfQueryResponse(vec![held]))
                } else {
                    None
                }
            }),
        );
    }

    #[concordium_test]
    fn test_init() {
        let parameter_bytes = to_bytes(&InitParams {
            beneficiary: BENEFICIARY,
        });
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER);
        ctx.set_parameter(&parameter_bytes);

        let mut state_builder = TestStateBuilder::new();
        let state = contract_init(&ctx, &mut state_builder).expect("Init should pass");

        claim!(state.is_owner(&OWNER));
        claim_eq!(state.beneficiary, BENEFICIARY);
        claim_eq!(state.auctions.iter().count(), 0);
    }

    #[concordium_test]
    fn test_start_auction() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let parameter_bytes = start_parameter(OWNER, &auction_info(10, 1, DURATION_SECS));
        let ctx = receive_ctx(
            Address::Contract(NFT_CONTRACT),
            &parameter_bytes,
            STARTED_AT,
        );

        let result = contract_start_auction(&ctx, &mut host, &mut logger);
        claim_eq!(result, Ok(()));

        let auction = host
            .state()
            .get(&token_0())
            .expect("Record should be stored");
        claim_eq!(auction.owner, OWNER);
        claim_eq!(auction.max_price, 10);
        claim_eq!(auction.min_price, 1);
        claim_eq!(
            auction.started_at,
            Timestamp::from_timestamp_millis(STARTED_AT)
        );

        claim_eq!(logger.logs.len(), 1);
        claim_eq!(logger.logs[0][0], AUCTION_TAG);
    }

    #[concordium_test]
    /// Escrow transfers carrying no tokens are accepted without storing
    /// anything.
    fn test_start_auction_zero_amount() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let parameter_bytes = to_bytes(&OnReceivingCis1Params {
            token_id: TokenIdVec(vec![0, 1]),
            amount: 0,
            from: Address::Account(OWNER),
            data: AdditionalData::from(to_bytes(&auction_info(10, 1, DURATION_SECS))),
        });
        let ctx = receive_ctx(
            Address::Contract(NFT_CONTRACT),
            &parameter_bytes,
            STARTED_AT,
        );

        let result = contract_start_auction(&ctx, &mut host, &mut logger);
        claim_eq!(result, Ok(()));
        claim!(host.state().get(&token_0()).is_err());
        claim_eq!(logger.logs.len(), 0);
    }

    #[concordium_test]
    /// Accounts other than the configured owner must not be able to start
    /// auctions, and a rejected start must leave the registry empty.
    fn test_start_auction_not_owner() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let parameter_bytes = start_parameter(BIDDER, &auction_info(10, 1, DURATION_SECS));
        let ctx = receive_ctx(
            Address::Contract(NFT_CONTRACT),
            &parameter_bytes,
            STARTED_AT,
        );

        let result = contract_start_auction(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::Unauthorized.into()));
        claim!(host.state().get(&token_0()).is_err());
    }

    #[concordium_test]
    fn test_start_auction_invalid_prices() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let parameter_bytes = start_parameter(OWNER, &auction_info(1, 10, DURATION_SECS));
        let ctx = receive_ctx(
            Address::Contract(NFT_CONTRACT),
            &parameter_bytes,
            STARTED_AT,
        );

        let result = contract_start_auction(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::InvalidPriceRange.into()));
        claim!(host.state().get(&token_0()).is_err());
    }

    #[concordium_test]
    fn test_start_auction_zero_duration() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let parameter_bytes = start_parameter(OWNER, &auction_info(10, 1, 0));
        let ctx = receive_ctx(
            Address::Contract(NFT_CONTRACT),
            &parameter_bytes,
            STARTED_AT,
        );

        let result = contract_start_auction(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::InvalidDuration.into()));
        claim!(host.state().get(&token_0()).is_err());
    }

    #[concordium_test]
    fn test_start_auction_duplicate() {
        let mut host = new_host_with_auction();
        let mut logger = TestLogger::init();

        let parameter_bytes = start_parameter(OWNER, &auction_info(10, 1, DURATION_SECS));
        let ctx = receive_ctx(
            Address::Contract(NFT_CONTRACT),
            &parameter_bytes,
            STARTED_AT,
        );

        let result = contract_start_auction(&ctx, &mut host, &mut logger);
        claim_eq!(
            result,
            Err(CustomContractError::TokenAlreadyOnAuction.into())
        );
    }

    #[concordium_test]
    fn test_start_auction_from_account_sender() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let parameter_bytes = start_parameter(OWNER, &auction_info(10, 1, DURATION_SECS));
        let ctx = receive_ctx(Address::Account(OWNER), &parameter_bytes, STARTED_AT);

        let result = contract_start_auction(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::ContractOnly.into()));
    }

    #[concordium_test]
    /// Halfway through the window the implied price is 6: the full discount
    /// of 9 would be 4.5 and truncates to 4. The bidder pays 6 units to the
    /// beneficiary and receives the token out of escrow.
    fn test_bid() {
        let mut host = new_host_with_auction();
        let mut logger = TestLogger::init();

        setup_escrow_balance(&mut host, 1);
        host.setup_mock_entrypoint(
            PAYMENT_CONTRACT,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            parse_and_check_mock::<TransferParams<TokenIdVec>, _>(
                |transfers| {
                    transfers.0.len() == 1
                        && transfers.0[0].amount == 6
                        && transfers.0[0].from == Address::Account(BIDDER)
                        && matches!(transfers.0[0].to, Receiver::Account(to) if to == BENEFICIARY)
                },
                (),
            ),
        );
        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            parse_and_check_mock::<TransferParams<TokenIdVec>, _>(
                |transfers| {
                    transfers.0.len() == 1
                        && transfers.0[0].amount == 1
                        && transfers.0[0].from == Address::Contract(SELF_ADDRESS)
                        && matches!(transfers.0[0].to, Receiver::Account(to) if to == BIDDER)
                },
                (),
            ),
        );

        let parameter_bytes = to_bytes(&token_0());
        let ctx = receive_ctx(
            Address::Account(BIDDER),
            &parameter_bytes,
            STARTED_AT + 150 * 1000,
        );

        let result = contract_bid(&ctx, &mut host, &mut logger);
        claim_eq!(result, Ok(()));

        claim_eq!(logger.logs.len(), 1);
        claim_eq!(logger.logs[0][0], BID_TAG);

        // The record is kept after settlement; custody is the liveness signal
        claim!(host.state().get(&token_0()).is_ok());
    }

    #[concordium_test]
    fn test_bid_unknown_token() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let parameter_bytes = to_bytes(&token_0());
        let ctx = receive_ctx(
            Address::Account(BIDDER),
            &parameter_bytes,
            STARTED_AT + 150 * 1000,
        );

        let result = contract_bid(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::UnknownToken.into()));
    }

    #[concordium_test]
    /// Once the token has left escrow, the record alone no longer makes the
    /// auction biddable.
    fn test_bid_after_sale() {
        let mut host = new_host_with_auction();
        let mut logger = TestLogger::init();

        setup_escrow_balance(&mut host, 0);

        let parameter_bytes = to_bytes(&token_0());
        let ctx = receive_ctx(
            Address::Account(BIDDER),
            &parameter_bytes,
            STARTED_AT + 150 * 1000,
        );

        let result = contract_bid(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::TokenNotOnAuction.into()));
    }

    #[concordium_test]
    /// Bids strictly after the deadline are rejected and the token stays in
    /// escrow.
    fn test_bid_expired() {
        let mut host = new_host_with_auction();
        let mut logger = TestLogger::init();

        setup_escrow_balance(&mut host, 1);

        let parameter_bytes = to_bytes(&token_0());
        let ctx = receive_ctx(
            Address::Account(BIDDER),
            &parameter_bytes,
            STARTED_AT + 400 * 1000,
        );

        let result = contract_bid(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::AuctionExpired.into()));
        claim!(host.state().get(&token_0()).is_ok());
    }

    #[concordium_test]
    /// A rejected payment rejects the bid before the token leg runs: no mock
    /// is installed for the NFT transfer, so reaching it would trap. The
    /// record stays biddable.
    fn test_bid_payment_fails() {
        let mut host = new_host_with_auction();
        let mut logger = TestLogger::init();

        setup_escrow_balance(&mut host, 1);
        host.setup_mock_entrypoint(
            PAYMENT_CONTRACT,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            logic_reject_mock(-42),
        );

        let parameter_bytes = to_bytes(&token_0());
        let ctx = receive_ctx(
            Address::Account(BIDDER),
            &parameter_bytes,
            STARTED_AT + 150 * 1000,
        );

        let result = contract_bid(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::InvokeContractError.into()));
        claim!(host.state().get(&token_0()).is_ok());
        claim_eq!(logger.logs.len(), 0);
    }

    #[concordium_test]
    fn test_bid_from_contract_sender() {
        let mut host = new_host_with_auction();
        let mut logger = TestLogger::init();

        let parameter_bytes = to_bytes(&token_0());
        let ctx = receive_ctx(
            Address::Contract(PAYMENT_CONTRACT),
            &parameter_bytes,
            STARTED_AT + 150 * 1000,
        );

        let result = contract_bid(&ctx, &mut host, &mut logger);
        claim_eq!(result, Err(CustomContractError::OnlyAccountAddress.into()));
    }

    #[concordium_test]
    fn test_view() {
        let host = new_host_with_auction();

        let parameter_bytes = to_bytes(&token_0());
        let ctx = receive_ctx(Address::Account(BIDDER), &parameter_bytes, STARTED_AT);

        let view = contract_view(&ctx, &host).expect("View should pass");
        claim_eq!(view.owner, OWNER);
        claim_eq!(view.buy_with, payment_token());
        claim_eq!(view.max_price, 10);
        claim_eq!(view.min_price, 1);
        claim_eq!(view.duration, Duration::from_seconds(DURATION_SECS));
        claim_eq!(view.started_at, Timestamp::from_timestamp_millis(STARTED_AT));
    }

    #[concordium_test]
    fn test_view_price() {
        let host = new_host_with_auction();

        let parameter_bytes = to_bytes(&token_0());

        let ctx = receive_ctx(Address::Account(BIDDER), &parameter_bytes, STARTED_AT);
        claim_eq!(contract_view_price(&ctx, &host), Ok(10));

        let ctx = receive_ctx(
            Address::Account(BIDDER),
            &parameter_bytes,
            STARTED_AT + 150 * 1000,
        );
        claim_eq!(contract_view_price(&ctx, &host), Ok(6));

        let ctx = receive_ctx(
            Address::Account(BIDDER),
            &parameter_bytes,
            STARTED_AT + 300 * 1000,
        );
        claim_eq!(contract_view_price(&ctx, &host), Ok(1));

        let ctx = receive_ctx(
            Address::Account(BIDDER),
            &parameter_bytes,
            STARTED_AT + 400 * 1000,
        );
        claim_eq!(
            contract_view_price(&ctx, &host),
            Err(CustomContractError::AuctionExpired.into())
        );
    }
}
