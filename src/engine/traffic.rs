//! Tap events delivered by the host-side traffic observation layer.
//!
//! Which transport was intercepted (fetch, XHR, ...) is the host's concern;
//! the engine only sees this normalized event stream. The bundled binary
//! feeds it from NDJSON lines on stdin.

use std::collections::HashMap;

use avanza::CourtageClass;
use serde::Deserialize;

/// URL fragment identifying the fee-preview endpoint.
pub const FEE_PREVIEW_PATH: &str = "preliminary-fee";
/// URL fragment identifying the order submission endpoint.
pub const ORDER_SUBMIT_PATH: &str = "trading-critical/rest/order/new";

/// A numeric input field scanned from the order form, with the surrounding
/// text (placeholder, label, container) used for role classification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    pub value: String,
    #[serde(default)]
    pub context: String,
}

/// One event from the traffic tap.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TapEvent {
    /// A completed outgoing request/response pair.
    #[serde(rename_all = "camelCase")]
    Request {
        url: String,
        #[serde(default)]
        request_headers: HashMap<String, String>,
        #[serde(default)]
        request_body: Option<String>,
        #[serde(default)]
        response_body: Option<String>,
    },
    /// A (host-debounced) scan of the order form's input fields.
    #[serde(rename_all = "camelCase")]
    InputScan { fields: Vec<InputField> },
    /// A tier button pressed in the host panel.
    #[serde(rename_all = "camelCase")]
    ManualSwitch { class: CourtageClass },
}
