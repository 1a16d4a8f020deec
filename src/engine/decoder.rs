//! Decoding observed traffic and form state into [`OrderFacts`].
//!
//! Two independent sources converge on the same shape: the fee-preview
//! request/response pair seen on the wire, and a scan of the order form's
//! numeric inputs. Malformed or non-positive input decodes to nothing, so
//! nothing downstream runs for it.

use avanza::{OrderSubmitResponse, PreliminaryFeeRequest, PreliminaryFeeResponse};
use rust_decimal::Decimal;
use serde::Serialize;

use super::traffic::InputField;

/// Normalized economic description of the pending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderFacts {
    /// Total order value (`price * volume`), always positive.
    pub total: Decimal,
    /// Orderbook currency (ISO code).
    pub currency: String,
    /// Commission quoted by the fee preview, when present.
    pub commission: Option<Decimal>,
}

/// Decode an observed fee-preview request/response pair.
///
/// Returns `None` when either payload is malformed or when price/volume
/// are missing or non-positive.
pub fn decode_fee_preview(request_body: Option<&str>, response_body: &str) -> Option<OrderFacts> {
    let payload: PreliminaryFeeRequest = serde_json::from_str(request_body?).ok()?;
    let response: PreliminaryFeeResponse = serde_json::from_str(response_body).ok()?;

    let price = payload.price.filter(|p| *p > Decimal::ZERO)?;
    let volume = payload.volume.filter(|v| *v > Decimal::ZERO)?;

    Some(OrderFacts {
        total: price * volume,
        currency: response
            .orderbook_currency
            .unwrap_or_else(|| "SEK".to_string()),
        commission: response.commission,
    })
}

/// Whether an observed order-submission response reports success.
pub fn order_submitted_ok(response_body: &str) -> bool {
    serde_json::from_str::<OrderSubmitResponse>(response_body)
        .map(|r| r.is_success())
        .unwrap_or(false)
}

/// Recover the order total from a scan of the order form's numeric fields.
///
/// Field roles are recognized by keywords in the surrounding text. A total
/// amount field wins outright; otherwise a recognized price and volume are
/// multiplied. `None` when no complete reading exists.
pub fn scan_order_inputs(fields: &[InputField]) -> Option<Decimal> {
    let mut price: Option<Decimal> = None;
    let mut volume: Option<Decimal> = None;

    for field in fields {
        let Some(value) = parse_field_value(&field.value) else {
            continue;
        };
        let context = field.context.to_lowercase();

        if ["antal", "volume", "st"].iter().any(|kw| context.contains(kw)) {
            volume = Some(value);
        } else if ["kurs", "pris", "price"].iter().any(|kw| context.contains(kw)) {
            price = Some(value);
        } else if ["belopp", "amount"].iter().any(|kw| context.contains(kw)) {
            return Some(value);
        }
    }

    match (price, volume) {
        (Some(p), Some(v)) => Some(p * v),
        _ => None,
    }
}

/// Parse a localized numeric input value (`"1 234,56"` → `1234.56`).
///
/// `None` for non-numeric or non-positive values.
fn parse_field_value(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .replace(',', ".")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let value = cleaned.parse::<Decimal>().ok()?;
    (value > Decimal::ZERO).then_some(value)
}
