/// Tag for the custom ownership transfer event.
pub const TRANSFER_TAG: u8 = u8::MAX - 5;

/// Identifier assigned to the first minted token. Later tokens count up from
/// here, identifiers are never reused.
pub const INITIAL_TOKEN_ID: u64 = 1;

/// Longest accepted token metadata URI, in bytes.
pub const MAX_URI_LENGTH: usize = 2048;
