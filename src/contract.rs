use concordium_std::*;

use crate::constants::MAX_URI_LENGTH;
use crate::errors::CustomContractError;
use crate::events::MarketplaceEvent;
use crate::external::*;
use crate::percentage::Percentage;
use crate::state::{ContractTokenId, ListingData, State};

/// Initialize the marketplace with an empty token registry and no listings.
///
/// The operator account and the fee rate are fixed for the lifetime of the
/// contract. Rejects if the fee is above 100%.
#[init(contract = "Marketplace", parameter = "InitParams")]
fn init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params = InitParams::deserial(&mut ctx.parameter_cursor())?;
    ensure!(
        params.fee <= Percentage::from_percent(100),
        CustomContractError::InvalidFee.into()
    );
    Ok(State::new(state_builder, params.operator, params.fee))
}

/// Mint a new token owned by the sender and return its identifier.
///
/// Identifiers count up from 1 and are never reused. Any address may mint.
///
/// It rejects if:
/// - Fails to parse the parameter.
/// - The URI is empty or longer than `MAX_URI_LENGTH` bytes.
#[receive(
    mutable,
    contract = "Marketplace",
    name = "mint",
    parameter = "MintParams",
    return_value = "ContractTokenId",
    enable_logger
)]
fn mint<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<ContractTokenId> {
    let params = MintParams::deserial(&mut ctx.parameter_cursor())?;
    ensure!(
        !params.uri.is_empty() && params.uri.len() <= MAX_URI_LENGTH,
        CustomContractError::InvalidUri.into()
    );

    let owner = ctx.sender();
    let token_id = host.state_mut().mint(owner, params.uri.clone());

    logger.log(&MarketplaceEvent::mint(token_id, &owner, params.uri))?;

    Ok(token_id)
}

/// Offer a token for sale at a fixed price.
///
/// While listed, the contract itself owns the token. It is returned to the
/// seller by `unlist` or handed to the buyer by `buy`. Since a listed token
/// is owned by the contract, listing it a second time fails the ownership
/// check, so no separate already-listed check is needed.
///
/// It rejects if:
/// - Fails to parse the parameter.
/// - The price is zero.
/// - The sender is a contract address.
/// - The token does not exist.
/// - The sender does not currently own the token.
#[receive(
    mutable,
    contract = "Marketplace",
    name = "list",
    parameter = "ListParams",
    enable_logger
)]
fn list<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let params = ListParams::deserial(&mut ctx.parameter_cursor())?;
    ensure!(
        params.price > Amount::zero(),
        CustomContractError::InvalidPrice.into()
    );

    let seller = if let Address::Account(seller) = ctx.sender() {
        seller
    } else {
        bail!(CustomContractError::OnlyAccountAddress.into());
    };
    let escrow = Address::Contract(ctx.self_address());

    host.state_mut()
        .list(params.token_id, seller, params.price, escrow)?;

    let seller_address = Address::Account(seller);
    logger.log(&MarketplaceEvent::list(
        params.token_id,
        &seller_address,
        &escrow,
        params.price,
    ))?;

    Ok(())
}

/// Buy a listed token by attaching the exact listing price.
///
/// The fee share of the price stays with the contract and is credited to the
/// fee accumulator, the remainder is transferred to the seller. All state is
/// finalized before the outbound transfer, so a reentrant call observes the
/// listing as already sold.
///
/// It rejects if:
/// - Fails to parse the parameter.
/// - The sender is a contract address.
/// - The token has no active listing.
/// - The attached amount differs from the listing price in either direction.
#[receive(
    mutable,
    payable,
    contract = "Marketplace",
    name = "buy",
    parameter = "ContractTokenId",
    enable_logger
)]
fn buy<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let token_id = ContractTokenId::deserial(&mut ctx.parameter_cursor())?;

    let buyer = if let Address::Account(buyer) = ctx.sender() {
        buyer
    } else {
        bail!(CustomContractError::OnlyAccountAddress.into());
    };

    let (listing, shares) = host.state_mut().buy(token_id, buyer, amount)?;

    let escrow = Address::Contract(ctx.self_address());
    let buyer_address = Address::Account(buyer);
    logger.log(&MarketplaceEvent::transfer(token_id, &escrow, &buyer_address))?;

    // Pay out the seller share last, after all bookkeeping is finalized.
    host.invoke_transfer(&listing.seller, shares.seller)?;

    Ok(())
}

/// Cancel a listing. The token returns from escrow to the seller, no funds
/// move.
///
/// It rejects if:
/// - Fails to parse the parameter.
/// - The sender is a contract address.
/// - The token has no active listing.
/// - The sender is not the seller of the listing.
#[receive(
    mutable,
    contract = "Marketplace",
    name = "unlist",
    parameter = "ContractTokenId",
    enable_logger
)]
fn unlist<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ReceiveResult<()> {
    let token_id = ContractTokenId::deserial(&mut ctx.parameter_cursor())?;

    let sender = if let Address::Account(sender) = ctx.sender() {
        sender
    } else {
        bail!(CustomContractError::OnlyAccountAddress.into());
    };

    let seller = host.state_mut().unlist(token_id, sender)?;

    let escrow = Address::Contract(ctx.self_address());
    let seller_address = Address::Account(seller);
    logger.log(&MarketplaceEvent::transfer(
        token_id,
        &escrow,
        &seller_address,
    ))?;

    Ok(())
}

/// Withdraw the full accumulated fee balance to the operator account.
///
/// The accumulator is zeroed before the payment is dispatched, so a
/// reentrant call cannot withdraw twice.
///
/// It rejects if:
/// - The sender is not the operator.
/// - No fees have accumulated.
#[receive(mutable, contract = "Marketplace", name = "withdrawFees")]
fn withdraw_fees<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<()> {
    ensure!(
        ctx.sender().matches_account(&host.state().operator),
        CustomContractError::NotOperator.into()
    );

    let fees = host.state_mut().withdraw_fees()?;

    let operator = host.state().operator;
    host.invoke_transfer(&operator, fees)?;

    Ok(())
}

/// Current holder of a token. While listed, this is the contract itself.
#[receive(
    contract = "Marketplace",
    name = "ownerOf",
    parameter = "ContractTokenId",
    return_value = "Address"
)]
fn owner_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Address> {
    let token_id = ContractTokenId::deserial(&mut ctx.parameter_cursor())?;
    let token = host
        .state()
        .tokens
        .get(&token_id)
        .ok_or(CustomContractError::NotFound)?;
    Ok(token.owner)
}

/// Metadata URI assigned to a token at mint time.
#[receive(
    contract = "Marketplace",
    name = "tokenUri",
    parameter = "ContractTokenId",
    return_value = "String"
)]
fn token_uri<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<String> {
    let token_id = ContractTokenId::deserial(&mut ctx.parameter_cursor())?;
    let token = host
        .state()
        .tokens
        .get(&token_id)
        .ok_or(CustomContractError::NotFound)?;
    Ok(token.uri.clone())
}

/// Active listing of a token, or `None` if it is not for sale. Rejects for
/// tokens that were never minted.
#[receive(
    contract = "Marketplace",
    name = "listingOf",
    parameter = "ContractTokenId",
    return_value = "Option<ListingData>"
)]
fn listing_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Option<ListingData>> {
    let token_id = ContractTokenId::deserial(&mut ctx.parameter_cursor())?;
    let state = host.state();
    ensure!(
        state.tokens.get(&token_id).is_some(),
        CustomContractError::NotFound.into()
    );
    Ok(state.listings.get(&token_id).map(|listing| ListingData {
        seller: listing.seller,
        price: listing.price,
    }))
}

/// Marketplace configuration and accounting summary.
#[receive(contract = "Marketplace", name = "view", return_value = "ViewResult")]
fn view<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewResult> {
    let state = host.state();
    Ok(ViewResult {
        operator: state.operator,
        fee: state.fee,
        accumulated_fees: state.accumulated_fees,
    })
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use concordium_cis1::TokenIdU64;
    use concordium_std::test_infrastructure::*;

    const OPERATOR: AccountAddress = AccountAddress([1; 32]);

    const SELLER: AccountAddress = AccountAddress([16; 32]);
    const BUYER: AccountAddress = AccountAddress([17; 32]);
    const INTRUDER: AccountAddress = AccountAddress([18; 32]);

    const SELF_ADDRESS: ContractAddress = ContractAddress {
        index: 0,
        subindex: 0,
    };

    const URI: &str = "ipfs://QmYwAPJzv5CZsnAzt8auVTL5wGG9ZWcQ5WLTPzWPJG2bvu";

    fn test_fee() -> Percentage {
        Percentage::from_percent(5)
    }

    fn default_host() -> TestHost<State<TestStateApi>> {
        let mut ctx = TestInitContext::empty();
        let params = InitParams {
            operator: OPERATOR,
            fee: test_fee(),
        };
        let bytes = to_bytes(&params);
        ctx.set_init_origin(OPERATOR).set_parameter(&bytes);
        let mut state_builder = TestStateBuilder::new();

        let state = init(&ctx, &mut state_builder).expect_report("Failed during init_Marketplace");

        TestHost::new(state, state_builder)
    }

    fn mint_token(
        host: &mut TestHost<State<TestStateApi>>,
        owner: AccountAddress,
        uri: &str,
    ) -> ContractTokenId {
        let mut ctx = TestReceiveContext::empty();
        let params = MintParams {
            uri: String::from(uri),
        };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(owner)).set_parameter(&bytes);
        let mut logger = TestLogger::init();

        mint(&ctx, host, &mut logger).expect_report("Failed to mint token")
    }

    fn list_token(
        host: &mut TestHost<State<TestStateApi>>,
        seller: AccountAddress,
        token_id: ContractTokenId,
        price: Amount,
    ) {
        let mut ctx = TestReceiveContext::empty();
        let params = ListParams { token_id, price };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(seller))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        list(&ctx, host, &mut logger).expect_report("Failed to list token");
    }

    fn token_owner(host: &TestHost<State<TestStateApi>>, token_id: ContractTokenId) -> Address {
        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_parameter(&bytes);

        owner_of(&ctx, host).expect_report("Failed to query token owner")
    }

    fn token_listing(
        host: &TestHost<State<TestStateApi>>,
        token_id: ContractTokenId,
    ) -> Option<ListingData> {
        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_parameter(&bytes);

        listing_of(&ctx, host).expect_report("Failed to query listing")
    }

    #[concordium_test]
    fn test_init() {
        let host = default_host();
        let state = host.state();

        claim_eq!(state.operator, OPERATOR);
        claim_eq!(state.fee, test_fee());
        claim_eq!(state.next_token_id, TokenIdU64(1));
        claim_eq!(state.accumulated_fees, Amount::zero());
    }

    #[concordium_test]
    fn test_init_rejects_excessive_fee() {
        let mut ctx = TestInitContext::empty();
        let params = InitParams {
            operator: OPERATOR,
            fee: Percentage::from_percent(101),
        };
        let bytes = to_bytes(&params);
        ctx.set_init_origin(OPERATOR).set_parameter(&bytes);
        let mut state_builder = TestStateBuilder::new();

        match init(&ctx, &mut state_builder) {
            Ok(_) => fail!("Init accepted a fee above 100%"),
            Err(err) => claim_eq!(err, CustomContractError::InvalidFee.into()),
        }
    }

    #[concordium_test]
    fn test_mint() {
        let mut host = default_host();

        let mut ctx = TestReceiveContext::empty();
        let params = MintParams {
            uri: String::from(URI),
        };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let token_id = mint(&ctx, &mut host, &mut logger).expect_report("Failed to mint token");

        claim_eq!(token_id, TokenIdU64(1));
        claim_eq!(token_owner(&host, token_id), Address::Account(SELLER));
        claim_eq!(token_listing(&host, token_id), None);

        claim_eq!(logger.logs.len(), 1);
        claim_eq!(
            logger.logs[0],
            to_bytes(&MarketplaceEvent::mint(
                token_id,
                &Address::Account(SELLER),
                String::from(URI),
            ))
        );
    }

    #[concordium_test]
    fn test_mint_assigns_sequential_ids() {
        let mut host = default_host();

        let first = mint_token(&mut host, SELLER, URI);
        let second = mint_token(&mut host, BUYER, "ipfs://QmAnother");
        let third = mint_token(&mut host, SELLER, "ipfs://QmThird");

        claim_eq!(first, TokenIdU64(1));
        claim_eq!(second, TokenIdU64(2));
        claim_eq!(third, TokenIdU64(3));
        claim_eq!(token_owner(&host, second), Address::Account(BUYER));
    }

    #[concordium_test]
    fn test_mint_rejects_empty_uri() {
        let mut host = default_host();

        let mut ctx = TestReceiveContext::empty();
        let params = MintParams { uri: String::new() };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = mint(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::InvalidUri.into()));
    }

    #[concordium_test]
    fn test_mint_rejects_oversized_uri() {
        let mut host = default_host();

        let mut ctx = TestReceiveContext::empty();
        let params = MintParams {
            uri: "a".repeat(MAX_URI_LENGTH + 1),
        };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(SELLER))
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = mint(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::InvalidUri.into()));
    }

    #[concordium_test]
    fn test_list() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        let price = Amount::from_ccd(10);

        let mut ctx = TestReceiveContext::empty();
        let params = ListParams { token_id, price };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = list(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        // The contract holds the token in escrow while it is listed.
        claim_eq!(token_owner(&host, token_id), Address::Contract(SELF_ADDRESS));
        claim_eq!(
            token_listing(&host, token_id),
            Some(ListingData {
                seller: SELLER,
                price,
            })
        );

        claim_eq!(logger.logs.len(), 1);
        claim_eq!(
            logger.logs[0],
            to_bytes(&MarketplaceEvent::list(
                token_id,
                &Address::Account(SELLER),
                &Address::Contract(SELF_ADDRESS),
                price,
            ))
        );
    }

    #[concordium_test]
    fn test_list_rejects_non_owner() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);

        let mut ctx = TestReceiveContext::empty();
        let params = ListParams {
            token_id,
            price: Amount::from_ccd(10),
        };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(INTRUDER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = list(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::NotOwnerOrApproved.into()));
        claim_eq!(token_owner(&host, token_id), Address::Account(SELLER));
        claim_eq!(token_listing(&host, token_id), None);
    }

    #[concordium_test]
    fn test_list_rejects_zero_price() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);

        let mut ctx = TestReceiveContext::empty();
        let params = ListParams {
            token_id,
            price: Amount::zero(),
        };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = list(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::InvalidPrice.into()));
    }

    #[concordium_test]
    fn test_list_rejects_unknown_token() {
        let mut host = default_host();

        let mut ctx = TestReceiveContext::empty();
        let params = ListParams {
            token_id: TokenIdU64(42),
            price: Amount::from_ccd(10),
        };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = list(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::NotFound.into()));
    }

    /// Listing moves the token into escrow, so the seller no longer owns it
    /// and a second list call fails the ownership check.
    #[concordium_test]
    fn test_list_rejects_already_listed_token() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        list_token(&mut host, SELLER, token_id, Amount::from_ccd(10));

        let mut ctx = TestReceiveContext::empty();
        let params = ListParams {
            token_id,
            price: Amount::from_ccd(20),
        };
        let bytes = to_bytes(&params);
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = list(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::NotOwnerOrApproved.into()));
        claim_eq!(
            token_listing(&host, token_id),
            Some(ListingData {
                seller: SELLER,
                price: Amount::from_ccd(10),
            })
        );
    }

    #[concordium_test]
    fn test_buy() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        let price = Amount::from_micro_ccd(123);
        list_token(&mut host, SELLER, token_id, price);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(price);

        let result = buy(&ctx, &mut host, price, &mut logger);

        claim_eq!(result, Ok(()));
        // 123 at a 5% fee: the seller share rounds down to 116, the fee
        // absorbs the remaining 7.
        claim!(host.transfer_occurred(&SELLER, Amount::from_micro_ccd(116)));
        claim_eq!(
            host.state().accumulated_fees,
            Amount::from_micro_ccd(7)
        );
        claim_eq!(token_owner(&host, token_id), Address::Account(BUYER));
        claim_eq!(token_listing(&host, token_id), None);

        claim_eq!(logger.logs.len(), 1);
        claim_eq!(
            logger.logs[0],
            to_bytes(&MarketplaceEvent::transfer(
                token_id,
                &Address::Contract(SELF_ADDRESS),
                &Address::Account(BUYER),
            ))
        );
    }

    #[concordium_test]
    fn test_buy_rejects_underpayment() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        let price = Amount::from_micro_ccd(123);
        list_token(&mut host, SELLER, token_id, price);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy(&ctx, &mut host, Amount::from_micro_ccd(122), &mut logger);

        claim_eq!(result, Err(CustomContractError::IncorrectPrice.into()));
        // The listing survives a failed purchase untouched.
        claim_eq!(
            token_listing(&host, token_id),
            Some(ListingData {
                seller: SELLER,
                price,
            })
        );
        claim_eq!(host.state().accumulated_fees, Amount::zero());
    }

    #[concordium_test]
    fn test_buy_rejects_overpayment() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        let price = Amount::from_micro_ccd(123);
        list_token(&mut host, SELLER, token_id, price);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy(&ctx, &mut host, Amount::from_micro_ccd(124), &mut logger);

        claim_eq!(result, Err(CustomContractError::IncorrectPrice.into()));
        claim_eq!(token_owner(&host, token_id), Address::Contract(SELF_ADDRESS));
    }

    #[concordium_test]
    fn test_buy_rejects_unlisted_token() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy(&ctx, &mut host, Amount::from_ccd(10), &mut logger);

        claim_eq!(result, Err(CustomContractError::NotListed.into()));
    }

    #[concordium_test]
    fn test_buy_rejects_unknown_token() {
        let mut host = default_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&TokenIdU64(42));
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = buy(&ctx, &mut host, Amount::from_ccd(10), &mut logger);

        claim_eq!(result, Err(CustomContractError::NotListed.into()));
    }

    /// A successful sale deactivates the listing, so a second purchase of the
    /// same token is rejected.
    #[concordium_test]
    fn test_buy_rejects_double_sale() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        let price = Amount::from_ccd(10);
        list_token(&mut host, SELLER, token_id, price);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(price);

        let result = buy(&ctx, &mut host, price, &mut logger);
        claim_eq!(result, Ok(()));

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(INTRUDER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(price);

        let result = buy(&ctx, &mut host, price, &mut logger);

        claim_eq!(result, Err(CustomContractError::NotListed.into()));
        claim_eq!(token_owner(&host, token_id), Address::Account(BUYER));
    }

    #[concordium_test]
    fn test_unlist() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        list_token(&mut host, SELLER, token_id, Amount::from_ccd(10));

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = unlist(&ctx, &mut host, &mut logger);

        claim_eq!(result, Ok(()));
        claim_eq!(token_owner(&host, token_id), Address::Account(SELLER));
        claim_eq!(token_listing(&host, token_id), None);
        // No funds move on cancellation.
        claim_eq!(host.state().accumulated_fees, Amount::zero());
        claim!(!host.transfer_occurred(&SELLER, Amount::from_ccd(10)));

        claim_eq!(logger.logs.len(), 1);
        claim_eq!(
            logger.logs[0],
            to_bytes(&MarketplaceEvent::transfer(
                token_id,
                &Address::Contract(SELF_ADDRESS),
                &Address::Account(SELLER),
            ))
        );
    }

    #[concordium_test]
    fn test_unlist_rejects_non_seller() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        let price = Amount::from_ccd(10);
        list_token(&mut host, SELLER, token_id, price);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(INTRUDER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = unlist(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::NotSeller.into()));
        claim_eq!(token_owner(&host, token_id), Address::Contract(SELF_ADDRESS));
        claim_eq!(
            token_listing(&host, token_id),
            Some(ListingData {
                seller: SELLER,
                price,
            })
        );
    }

    #[concordium_test]
    fn test_unlist_rejects_unlisted_token() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();

        let result = unlist(&ctx, &mut host, &mut logger);

        claim_eq!(result, Err(CustomContractError::NotListed.into()));
    }

    /// A cancelled listing leaves the token free to be listed again at a
    /// different price.
    #[concordium_test]
    fn test_relist_after_unlist() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        list_token(&mut host, SELLER, token_id, Amount::from_ccd(10));

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(SELLER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        unlist(&ctx, &mut host, &mut logger).expect_report("Failed to unlist token");

        list_token(&mut host, SELLER, token_id, Amount::from_ccd(25));

        claim_eq!(token_owner(&host, token_id), Address::Contract(SELF_ADDRESS));
        claim_eq!(
            token_listing(&host, token_id),
            Some(ListingData {
                seller: SELLER,
                price: Amount::from_ccd(25),
            })
        );
    }

    #[concordium_test]
    fn test_withdraw_fees() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        let price = Amount::from_micro_ccd(123);
        list_token(&mut host, SELLER, token_id, price);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(price);
        buy(&ctx, &mut host, price, &mut logger).expect_report("Failed to buy token");

        let fees = host.state().accumulated_fees;
        claim_eq!(fees, Amount::from_micro_ccd(7));

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OPERATOR));
        host.set_self_balance(fees);

        let result = withdraw_fees(&ctx, &mut host);

        claim_eq!(result, Ok(()));
        claim!(host.transfer_occurred(&OPERATOR, fees));
        claim_eq!(host.state().accumulated_fees, Amount::zero());

        // A second withdrawal right away finds an empty accumulator.
        let result = withdraw_fees(&ctx, &mut host);
        claim_eq!(result, Err(CustomContractError::ZeroBalance.into()));
    }

    #[concordium_test]
    fn test_withdraw_fees_rejects_non_operator() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        let price = Amount::from_ccd(10);
        list_token(&mut host, SELLER, token_id, price);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(price);
        buy(&ctx, &mut host, price, &mut logger).expect_report("Failed to buy token");

        let fees = host.state().accumulated_fees;
        claim!(fees > Amount::zero());

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(INTRUDER));

        let result = withdraw_fees(&ctx, &mut host);

        claim_eq!(result, Err(CustomContractError::NotOperator.into()));
        claim_eq!(host.state().accumulated_fees, fees);
    }

    #[concordium_test]
    fn test_withdraw_fees_rejects_empty_accumulator() {
        let mut host = default_host();

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OPERATOR));

        let result = withdraw_fees(&ctx, &mut host);

        claim_eq!(result, Err(CustomContractError::ZeroBalance.into()));
    }

    #[concordium_test]
    fn test_token_uri() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_parameter(&bytes);

        let uri = token_uri(&ctx, &host).expect_report("Failed to query token URI");

        claim_eq!(uri, String::from(URI));
    }

    #[concordium_test]
    fn test_queries_reject_unknown_token() {
        let host = default_host();

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&TokenIdU64(42));
        ctx.set_parameter(&bytes);

        let result = owner_of(&ctx, &host);
        claim_eq!(result, Err(CustomContractError::NotFound.into()));

        let result = token_uri(&ctx, &host);
        claim_eq!(result, Err(CustomContractError::NotFound.into()));

        let result = listing_of(&ctx, &host);
        claim_eq!(result, Err(CustomContractError::NotFound.into()));
    }

    #[concordium_test]
    fn test_view() {
        let mut host = default_host();
        let token_id = mint_token(&mut host, SELLER, URI);
        let price = Amount::from_micro_ccd(123);
        list_token(&mut host, SELLER, token_id, price);

        let mut ctx = TestReceiveContext::empty();
        let bytes = to_bytes(&token_id);
        ctx.set_sender(Address::Account(BUYER))
            .set_self_address(SELF_ADDRESS)
            .set_parameter(&bytes);
        let mut logger = TestLogger::init();
        host.set_self_balance(price);
        buy(&ctx, &mut host, price, &mut logger).expect_report("Failed to buy token");

        let ctx = TestReceiveContext::empty();
        let result = view(&ctx, &host).expect_report("Failed to query marketplace view");

        claim_eq!(result.operator, OPERATOR);
        claim_eq!(result.fee, test_fee());
        claim_eq!(result.accumulated_fees, Amount::from_micro_ccd(7));
    }
}
