use concordium_cis1::TokenIdU64;
use concordium_std::*;

use crate::calculations::{calc_shares, Shares};
use crate::constants::INITIAL_TOKEN_ID;
use crate::errors::CustomContractError;
use crate::percentage::Percentage;

/// Token identifiers are assigned sequentially at mint time and never reused.
pub type ContractTokenId = TokenIdU64;

/// A minted token.
#[derive(Debug, Serialize, SchemaType)]
pub struct TokenData {
    /// Current holder. While the token is listed for sale, this is the
    /// marketplace contract itself.
    pub owner: Address,
    /// Metadata URI, immutable after minting.
    pub uri: String,
}

/// An active fixed-price listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SchemaType)]
pub struct ListingData {
    /// Account that listed the token and receives the sale proceeds.
    pub seller: AccountAddress,
    /// Sale price in the smallest currency unit.
    pub price: Amount,
}

/// The contract state.
#[derive(Serial, DeserialWithState)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Account entitled to withdraw accumulated marketplace fees.
    pub operator: AccountAddress,
    /// Marketplace fee deducted from every sale.
    pub fee: Percentage,
    /// Identifier to assign to the next minted token. Only ever counts up.
    pub next_token_id: ContractTokenId,
    /// Marketplace fees collected from sales and not yet withdrawn.
    pub accumulated_fees: Amount,
    /// All minted tokens.
    pub tokens: StateMap<ContractTokenId, TokenData, S>,
    /// Active listings. A token is listed for sale iff it has an entry here,
    /// and it has an entry here iff the contract holds it in escrow.
    pub listings: StateMap<ContractTokenId, ListingData, S>,
}

// Functions for creating and updating the contract state.
impl<S: HasStateApi> State<S> {
    /// Creates a new state with no tokens and no listings.
    pub fn new(state_builder: &mut StateBuilder<S>, operator: AccountAddress, fee: Percentage) -> Self {
        State {
            operator,
            fee,
            next_token_id: TokenIdU64(INITIAL_TOKEN_ID),
            accumulated_fees: Amount::zero(),
            tokens: state_builder.new_map(),
            listings: state_builder.new_map(),
        }
    }

    /// Store a new token owned by `owner` and return the assigned identifier.
    pub fn mint(&mut self, owner: Address, uri: String) -> ContractTokenId {
        let token_id = self.next_token_id;
        self.next_token_id = TokenIdU64(token_id.0 + 1);
        self.tokens.insert(token_id, TokenData { owner, uri });
        token_id
    }

    /// Move the token into escrow and record an active listing for it.
    ///
    /// Fails with `NotOwnerOrApproved` unless `seller` currently owns the
    /// token. A listed token is owned by the contract, so this also rejects
    /// listing a token that is already for sale.
    pub fn list(
        &mut self,
        token_id: ContractTokenId,
        seller: AccountAddress,
        price: Amount,
        escrow: Address,
    ) -> Result<(), CustomContractError> {
        let mut entry = self
            .tokens
            .get_mut(&token_id)
            .ok_or(CustomContractError::NotFound)?;
        let token = entry.get_mut();
        ensure_eq!(
            token.owner,
            Address::Account(seller),
            CustomContractError::NotOwnerOrApproved
        );
        token.owner = escrow;
        self.listings.insert(token_id, ListingData { seller, price });
        Ok(())
    }

    /// Deactivate a listing and return the token from escrow to its seller.
    ///
    /// Fails with `NotListed` if there is no active listing and with
    /// `NotSeller` unless `sender` created the listing. No state is touched
    /// on failure.
    pub fn unlist(
        &mut self,
        token_id: ContractTokenId,
        sender: AccountAddress,
    ) -> Result<AccountAddress, CustomContractError> {
        let seller = {
            let listing = self
                .listings
                .get(&token_id)
                .ok_or(CustomContractError::NotListed)?;
            listing.seller
        };
        ensure_eq!(seller, sender, CustomContractError::NotSeller);
        self.listings.remove(&token_id);
        let mut entry = self
            .tokens
            .get_mut(&token_id)
            .ok_or(CustomContractError::NotFound)?;
        entry.get_mut().owner = Address::Account(seller);
        Ok(seller)
    }

    /// Settle a sale: credit the fee accumulator, hand the token to `buyer`
    /// and deactivate the listing. Returns the listing and the computed
    /// shares so the caller can pay out the seller.
    ///
    /// The attached `payment` must equal the listing price exactly, over- and
    /// underpayment are both rejected with `IncorrectPrice` before any state
    /// is touched.
    pub fn buy(
        &mut self,
        token_id: ContractTokenId,
        buyer: AccountAddress,
        payment: Amount,
    ) -> Result<(ListingData, Shares), CustomContractError> {
        let (seller, price) = {
            let listing = self
                .listings
                .get(&token_id)
                .ok_or(CustomContractError::NotListed)?;
            (listing.seller, listing.price)
        };
        ensure_eq!(payment, price, CustomContractError::IncorrectPrice);

        let shares = calc_shares(price, self.fee);
        self.listings.remove(&token_id);
        let mut entry = self
            .tokens
            .get_mut(&token_id)
            .ok_or(CustomContractError::NotFound)?;
        entry.get_mut().owner = Address::Account(buyer);
        self.accumulated_fees += shares.fee;

        Ok((ListingData { seller, price }, shares))
    }

    /// Drain the fee accumulator, failing with `ZeroBalance` if nothing has
    /// accumulated. The accumulator is reset before the returned amount is
    /// paid out.
    pub fn withdraw_fees(&mut self) -> Result<Amount, CustomContractError> {
        ensure!(
            self.accumulated_fees > Amount::zero(),
            CustomContractError::ZeroBalance
        );
        let fees = self.accumulated_fees;
        self.accumulated_fees = Amount::zero();
        Ok(fees)
    }
}
