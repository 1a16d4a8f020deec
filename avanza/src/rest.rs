//! HTTP client for the courtage-class REST endpoints.

use std::collections::HashMap;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{AvanzaError, Result};
use crate::types::{
    CourtageClass, CourtageClassInfo, UpdateCourtageClassRequest, UpdateCourtageClassResponse,
};

/// Path of the current-class endpoint, relative to the base URL.
pub const COURTAGE_CLASS_PATH: &str = "/_api/trading/courtageclass/courtageclass/";
/// Path of the class-update endpoint, relative to the base URL.
pub const COURTAGE_CLASS_UPDATE_PATH: &str = "/_api/trading/courtageclass/courtageclass/update/";

/// HTTP client wrapper for the courtage-class REST API.
///
/// Authorization material is not constructed here: callers pass the header
/// set captured from the host page's own traffic, and it is relayed
/// verbatim on every call.
#[derive(Debug, Clone)]
pub struct AvanzaHttpClient {
    client: Client,
    base_url: String,
}

impl AvanzaHttpClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Current courtage class of the account.
    pub async fn get_courtage_class(
        &self,
        headers: &HashMap<String, String>,
    ) -> Result<CourtageClass> {
        let info: CourtageClassInfo = self.get(COURTAGE_CLASS_PATH, headers).await?;
        info.current_courtage_class.ok_or(AvanzaError::MissingClass)
    }

    /// Switch the account to `new_class`.
    ///
    /// Anything the endpoint does not explicitly acknowledge as successful
    /// is a [`AvanzaError::SwitchRejected`].
    pub async fn update_courtage_class(
        &self,
        new_class: &CourtageClass,
        headers: &HashMap<String, String>,
    ) -> Result<()> {
        let body = UpdateCourtageClassRequest {
            new_class: new_class.clone(),
        };
        let resp: UpdateCourtageClassResponse = self
            .post(COURTAGE_CLASS_UPDATE_PATH, &body, headers)
            .await?;
        if resp.is_success() {
            Ok(())
        } else {
            Err(AvanzaError::SwitchRejected)
        }
    }

    /// GET a JSON resource with the given extra headers.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &HashMap<String, String>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let req = apply_headers(self.client.get(&url), headers);
        Self::decode(req.send().await?).await
    }

    /// POST a JSON body, returning the decoded response.
    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        headers: &HashMap<String, String>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let req = apply_headers(self.client.post(&url), headers).json(body);
        Self::decode(req.send().await?).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AvanzaError::Http {
                status,
                message: body,
            });
        }
        resp.json::<T>().await.map_err(AvanzaError::Request)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Attach the captured credential headers, defaulting the content type.
///
/// Captured values win over the default; headers that do not form valid
/// HTTP names or values are skipped rather than poisoning the request.
fn apply_headers(mut req: RequestBuilder, headers: &HashMap<String, String>) -> RequestBuilder {
    if !headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case("content-type"))
    {
        req = req.header("content-type", "application/json");
    }
    for (name, value) in headers {
        match (name.parse::<HeaderName>(), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => req = req.header(name, value),
            _ => debug!(header = %name, "skipping invalid captured header"),
        }
    }
    req
}
