use concordium_std::*;

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
    /// Marketplace fee above 100% (Error code: -4).
    InvalidFee,
    /// Token URI is empty or too long (Error code: -5).
    InvalidUri,
    /// Listing price must be strictly positive (Error code: -6).
    InvalidPrice,
    /// Sender does not currently own the token (Error code: -7).
    NotOwnerOrApproved,
    /// Token has no active listing (Error code: -8).
    NotListed,
    /// Attached payment differs from the listing price (Error code: -9).
    IncorrectPrice,
    /// Sender is not the seller of the listing (Error code: -10).
    NotSeller,
    /// Sender is not the marketplace operator (Error code: -11).
    NotOperator,
    /// No fees have accumulated (Error code: -12).
    ZeroBalance,
    /// Unknown token (Error code: -13).
    NotFound,
    /// Only account addresses can call this function (Error code: -14).
    OnlyAccountAddress,
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
