use commons::Token;
use concordium_cis1::{AdditionalData, Receiver, TokenAmount, Transfer};
use concordium_std::*;

use crate::nft::handle_call_error;

/// Pull `amount` units of the payment token from `from` to `to`.
///
/// The token contract rejects the call when the payer balance is
/// insufficient or this contract is not an authorized operator of the payer.
/// Nothing moves in that case.
pub fn transfer<T>(
    host: &mut impl HasHost<T>,
    token: &Token,
    amount: TokenAmount,
    from: AccountAddress,
    to: AccountAddress,
) -> ReceiveResult<()> {
    host.invoke_contract(
        &token.contract,
        &(
            1u16,
            Transfer {
                token_id: token.id.clone(),
                amount,
                from: Address::Account(from),
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

#[concordium_cfg_test]
mod tests {
    use commons::test::{logic_reject_mock, parse_and_check_mock};
    use commons::CustomContractError;
    use concordium_cis1::{TokenIdVec, TransferParams};
    use concordium_std::test_infrastructure::*;

    use super::*;

    const PAYMENT_CONTRACT: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    const USER_1: AccountAddress = AccountAddress([1; 32]);
    const USER_2: AccountAddress = AccountAddress([2; 32]);

    fn payment_token() -> Token {
        Token {
            contract: PAYMENT_CONTRACT,
            id: TokenIdVec(vec![0]),
        }
    }

    #[concordium_test]
    fn test_transfer() {
        let state = ();
        let state_builder = TestStateBuilder::default();
        let mut host = TestHost::new(state, state_builder);

        host.setup_mock_entrypoint(
            PAYMENT_CONTRACT,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            parse_and_check_mock::<TransferParams<TokenIdVec>, _>(
                |transfers| {
                    transfers.0.len() == 1
                        && transfers.0[0].amount == 6
                        && transfers.0[0].from == Address::Account(USER_1)
                        && matches!(transfers.0[0].to, Receiver::Account(to) if to == USER_2)
                },
                (),
            ),
        );

        let response = transfer(&mut host, &payment_token(), 6, USER_1, USER_2);

        claim_eq!(response, Ok(()))
    }

    #[concordium_test]
    fn test_transfer_rejected_by_ledger() {
        let state = ();
        let state_builder = TestStateBuilder::default();
        let mut host = TestHost::new(state, state_builder);

        host.setup_mock_entrypoint(
            PAYMENT_CONTRACT,
            OwnedEntrypointName::new_unchecked("transfer".into()),
            logic_reject_mock(-42),
        );

        let response = transfer(&mut host, &payment_token(), 6, USER_1, USER_2);

        claim_eq!(
            response,
            Err(CustomContractError::InvokeContractError.into())
        )
    }
}
