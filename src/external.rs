use concordium_std::*;

use crate::percentage::Percentage;
use crate::state::ContractTokenId;

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct InitParams {
    /// Account entitled to withdraw accumulated marketplace fees.
    pub operator: AccountAddress,
    /// Marketplace fee deducted from every sale.
    pub fee: Percentage,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct MintParams {
    /// Token metadata URI. Immutable after minting.
    pub uri: String,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct ListParams {
    /// Token to offer for sale.
    pub token_id: ContractTokenId,
    /// Sale price in the smallest currency unit.
    pub price: Amount,
}

/// Marketplace configuration and accounting summary.
#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct ViewResult {
    pub operator: AccountAddress,
    pub fee: Percentage,
    /// Fees collected from sales and not yet withdrawn.
    pub accumulated_fees: Amount,
}
