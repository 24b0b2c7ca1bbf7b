//! A fixed-price marketplace for non-fungible tokens.
//!
//! The contract keeps its own token registry. Tokens are minted with an
//! immutable metadata URI, listed for sale by transferring them into contract
//! escrow, and bought by attaching the exact listing price. A fixed share of
//! every sale is collected as a marketplace fee that the operator account can
//! withdraw.
#![cfg_attr(not(feature = "std"), no_std)]

mod calculations;
mod constants;
mod contract;
mod errors;
mod events;
mod external;
mod percentage;
mod state;
