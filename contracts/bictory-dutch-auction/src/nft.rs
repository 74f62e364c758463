use commons::{CustomContractError, Token};
use concordium_cis1::{
    AdditionalData, BalanceOfQuery, BalanceOfQueryResponse, Receiver, TokenAmount, Transfer,
};
use concordium_std::*;

/// Move a single NFT between addresses on its CIS-1 contract.
pub fn transfer<T>(
    host: &mut impl HasHost<T>,
    token: &Token,
    from: Address,
    to: AccountAddress,
) -> ReceiveResult<()> {
    host.invoke_contract(
        &token.contract,
        &(
            1u16,
            Transfer {
                token_id: token.id.clone(),
                amount: 1,
                from,
                to: Receiver::Account(to),
                data: AdditionalData::empty(),
            },
        ),
        EntrypointName::new_unchecked("transfer"),
        Amount::zero(),
    )
    .map_err(handle_call_error)?;

    Ok(())
}

/// Amount of `token` held by `address` according to the NFT contract.
///
/// This is the custody check behind every settlement: an auction is live
/// while the escrow balance is 1.
pub fn balance_of<T>(
    host: &impl HasHost<T>,
    token: &Token,
    address: Address,
) -> ReceiveResult<TokenAmount> {
    let mut response = host
        .invoke_contract_read_only(
            &token.contract,
            &(
                1u16,
                BalanceOfQuery {
                    token_id: token.id.clone(),
                    address,
                },
            ),
            EntrypointName::new_unchecked("balanceOf"),
            Amount::zero(),
        )
        .map_err(handle_call_error)?
        .ok_or(CustomContractError::Incompatible)?;

    let amounts = BalanceOfQueryResponse::deserial(&mut response)
        .map_err(|_| CustomContractError::Incompatible)?;

    amounts
        .0
        .first()
        .copied()
        .ok_or_else(|| CustomContractError::Incompatible.into())
}

pub(crate) fn handle_call_error<R>(error: CallContractError<R>) -> Reject {
    match error {
        CallContractError::MissingEntrypoint | CallContractError::MessageFailed => {
            CustomContractError::Incompatible.into()
        }
        CallContractError::LogicReject { .. } => CustomContractError::InvokeContractError.into(),
        e => e.into(),
    }
}

#[concordium_cfg_test]
mod tests {
    use commons::test::{parse_and_check_mock, parse_and_map_mock};
    use concordium_cis1::{BalanceOfQueryParams, TokenIdVec, TransferParams};
    use concordium_std::test_infrastructure::*;

    use super::*;

    const NFT_CONTRACT: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const SELF_ADDRESS: ContractAddress = ContractAddress {
        index: 0,
        subindex: 0,
    };

    const USER_1: AccountAddress = AccountAddress([1; 32]);

    fn token() -> Token {
        Token {
            contract: NFT_CONTRACT,
            id: TokenIdVec(vec![0, 1]),
        }
    }

    #[concordium_test]
    fn test_transfer() {
        let state = ();
        let state_builder = TestStateBuilder::default();
        let mut host = TestHost::new(state, state_builder);

        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            parse_and_check_mock::<TransferParams<TokenIdVec>, _>(
                |transfers| {
                    transfers.0.len() == 1
                        && transfers.0[0].amount == 1
                        && transfers.0[0].from == Address::Contract(SELF_ADDRESS)
                        && matches!(transfers.0[0].to, Receiver::Account(to) if to == USER_1)
                },
                (),
            ),
        );

        let response = transfer(
            &mut host,
            &token(),
            Address::Contract(SELF_ADDRESS),
            USER_1,
        );

        claim_eq!(response, Ok(()))
    }

    #[concordium_test]
    fn test_balance_of() {
        let state = ();
        let state_builder = TestStateBuilder::default();
        let mut host = TestHost::new(state, state_builder);

        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            OwnedEntrypointName::new_unchecked("balanceOf".into()),
            parse_and_map_mock::<BalanceOfQueryParams<TokenIdVec>, _, _>(|queries| {
                if queries.queries.len() == 1
                    && queries.queries[0].address == Address::Contract(SELF_ADDRESS)
                {
                    Some(BalanceOfQueryResponse(vec![1]))
                } else {
                    None
                }
            }),
        );

        let response = balance_of(&host, &token(), Address::Contract(SELF_ADDRESS));

        claim_eq!(response, Ok(1))
    }

    #[concordium_test]
    fn test_balance_of_empty_response_is_incompatible() {
        let state = ();
        let state_builder = TestStateBuilder::default();
        let mut host = TestHost::new(state, state_builder);

        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            OwnedEntrypointName::new_unchecked("balanceOf".into()),
            parse_and_map_mock::<BalanceOfQueryParams<TokenIdVec>, _, _>(|_| {
                Some(BalanceOfQueryResponse(vec![]))
            }),
        );

        let response = balance_of(&host, &token(), Address::Contract(SELF_ADDRESS));

        claim_eq!(response, Err(CustomContractError::Incompatible.into()))
    }
}
