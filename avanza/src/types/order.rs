use serde::Deserialize;

/// Response observed on the order submission endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderSubmitResponse {
    pub order_request_status: Option<String>,
    pub message: Option<String>,
}

impl OrderSubmitResponse {
    /// Whether the order was accepted by the broker.
    pub fn is_success(&self) -> bool {
        self.order_request_status.as_deref() == Some("SUCCESS")
    }
}
