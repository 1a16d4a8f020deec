use serde::{Deserialize, Serialize};

use super::class::CourtageClass;

/// Response from `GET /_api/trading/courtageclass/courtageclass/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtageClassInfo {
    pub current_courtage_class: Option<CourtageClass>,
}

/// Request body for `POST /_api/trading/courtageclass/courtageclass/update/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourtageClassRequest {
    pub new_class: CourtageClass,
}

/// Response from the update endpoint.
///
/// The endpoint acknowledges with either a bare boolean or an object
/// carrying a `success` flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UpdateCourtageClassResponse {
    Flag(bool),
    Object { success: bool },
}

impl UpdateCourtageClassResponse {
    pub fn is_success(&self) -> bool {
        match self {
            UpdateCourtageClassResponse::Flag(ok) => *ok,
            UpdateCourtageClassResponse::Object { success } => *success,
        }
    }
}
