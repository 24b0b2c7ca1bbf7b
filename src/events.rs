use concordium_std::*;

use crate::constants::TRANSFER_TAG;
use crate::state::ContractTokenId;

/// Ownership transfer event data. Every operation that moves a token between
/// addresses logs one of these.
#[derive(Debug)]
pub struct TransferEvent<'a> {
    /// Token identifier.
    pub token_id: ContractTokenId,
    /// Previous holder. `None` when the token is first minted.
    pub from: Option<&'a Address>,
    /// New holder.
    pub to: &'a Address,
    /// Token metadata URI. Only populated on mint.
    pub uri: String,
    /// Listing price. Only populated when a listing is created.
    pub price: Amount,
}

// Serialized field by field in declaration order, exactly as `derive(Serial)`
// would. The derive cannot be used here because the pinned
// concordium-contracts-common has no `Serial` impl for references.
impl<'a> Serial for TransferEvent<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        self.token_id.serial(out)?;
        match self.from {
            None => out.write_u8(0)?,
            Some(from) => {
                out.write_u8(1)?;
                from.serial(out)?;
            }
        }
        self.to.serial(out)?;
        self.uri.serial(out)?;
        self.price.serial(out)
    }
}

/// Tagged custom event to be serialized for the event log.
#[derive(Debug)]
pub enum MarketplaceEvent<'a> {
    /// Token ownership moved between addresses.
    Transfer(TransferEvent<'a>),
}

impl<'a> MarketplaceEvent<'a> {
    /// A freshly minted token. Carries the URI, has no previous holder.
    pub fn mint(token_id: ContractTokenId, to: &'a Address, uri: String) -> Self {
        Self::Transfer(TransferEvent {
            token_id,
            from: None,
            to,
            uri,
            price: Amount::zero(),
        })
    }

    /// A token moved into contract escrow by listing it. Carries the price.
    pub fn list(
        token_id: ContractTokenId,
        from: &'a Address,
        to: &'a Address,
        price: Amount,
    ) -> Self {
        Self::Transfer(TransferEvent {
            token_id,
            from: Some(from),
            to,
            uri: String::new(),
            price,
        })
    }

    /// A token leaving contract escrow, either to a buyer or back to the
    /// seller on cancellation.
    pub fn transfer(token_id: ContractTokenId, from: &'a Address, to: &'a Address) -> Self {
        Self::Transfer(TransferEvent {
            token_id,
            from: Some(from),
            to,
            uri: String::new(),
            price: Amount::zero(),
        })
    }
}

impl<'a> Serial for MarketplaceEvent<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            MarketplaceEvent::Transfer(event) => {
                out.write_u8(TRANSFER_TAG)?;
                event.serial(out)
            }
        }
    }
}
