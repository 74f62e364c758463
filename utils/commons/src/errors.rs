use super::*;

/// The custom errors the contract can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject)]
pub enum CustomContractError {
    /// Failed parsing the parameter (Error code: -1).
    #[from(ParseError)]
    ParseParams,
    /// Failed logging: Log is full (Error code: -2).
    LogFull,
    /// Failed logging: Log is malformed (Error code: -3).
    LogMalformed,
    /// Unknown auction handle (Error code: -4).
    UnknownToken,
    /// Token is no longer held in escrow (Error code: -5).
    TokenNotOnAuction,
    /// Token is already up for auction (Error code: -6).
    TokenAlreadyOnAuction,
    /// Maximum price is below minimum price (Error code: -7).
    InvalidPriceRange,
    /// Auction duration must be positive (Error code: -8).
    InvalidDuration,
    /// Auction deadline has passed (Error code: -9).
    AuctionExpired,
    /// Only account addresses can bid (Error code: -10).
    OnlyAccountAddress,
    /// This function must only be called by a contract (Error code: -11).
    ContractOnly,
    /// Unauthorized (Error code: -12).
    Unauthorized,
    /// Unsupported (Error code: -13).
    Unsupported,
    /// Incompatible contract (Error code: -14).
    Incompatible,
    /// Failed to invoke a contract (Error code: -15).
    InvokeContractError,
}

/// Mapping the logging errors to CustomContractError.
impl From<LogError> for CustomContractError {
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

/// Mapping CustomContractError to ContractError
impl From<CustomContractError> for ContractError {
    fn from(c: CustomContractError) -> Self {
        Cis1Error::Custom(c)
    }
}
