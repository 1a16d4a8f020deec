//! Credential capture from observed fee-preview requests.
//!
//! The account API requires anti-forgery headers the engine cannot
//! construct itself; they are harvested from the host page's own calls and
//! relayed verbatim on every API request.

use std::collections::HashMap;

use tracing::debug;

use super::session::SessionContext;
use super::traffic::FEE_PREVIEW_PATH;

/// Merge the request's headers into the session when the URL matches the
/// fee-preview endpoint. Anything else is ignored.
pub fn observe_request(session: &SessionContext, url: &str, headers: &HashMap<String, String>) {
    if !url.contains(FEE_PREVIEW_PATH) || headers.is_empty() {
        return;
    }
    debug!(count = headers.len(), "captured credential headers");
    session.merge_credentials(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
}
