use super::*;

/// Contract token ID type.
pub type ContractTokenId = TokenIdVec;

/// Wrapping the custom errors in a type with CIS1 errors.
pub type ContractError = Cis1Error<CustomContractError>;

pub type ContractResult<A> = Result<A, ContractError>;
