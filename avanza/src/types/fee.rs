use rust_decimal::Decimal;
use serde::Deserialize;

/// Request payload observed on the preliminary-fee endpoint.
///
/// Only the fields the decision engine needs are modeled; the payload
/// carries more. Price and volume arrive as JSON numbers or numeric
/// strings depending on the client build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreliminaryFeeRequest {
    pub price: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub orderbook_id: Option<String>,
}

/// Response payload observed on the preliminary-fee endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreliminaryFeeResponse {
    pub orderbook_currency: Option<String>,
    pub commission: Option<Decimal>,
}
