use std::fmt;

use serde::{Deserialize, Serialize};

/// Commission class identifier as used by the courtage-class API.
///
/// Unknown identifiers coming off the wire are preserved verbatim in
/// [`CourtageClass::Other`], so a server-side schedule change never turns
/// into a deserialization error here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CourtageClass {
    Mini,
    Small,
    Medium,
    FastPris,
    PrivateBankingMini,
    PrivateBanking,
    PrivateBankingFastPris,
    Other(String),
}

impl CourtageClass {
    /// The wire identifier for this class.
    pub fn as_str(&self) -> &str {
        match self {
            CourtageClass::Mini => "MINI",
            CourtageClass::Small => "SMALL",
            CourtageClass::Medium => "MEDIUM",
            CourtageClass::FastPris => "FASTPRIS",
            CourtageClass::PrivateBankingMini => "PRIVATE_BANKING_MINI",
            CourtageClass::PrivateBanking => "PRIVATE_BANKING",
            CourtageClass::PrivateBankingFastPris => "PRIVATE_BANKING_FASTPRIS",
            CourtageClass::Other(s) => s,
        }
    }

    /// Whether this class belongs to the private-banking schedule family.
    pub fn is_private_banking(&self) -> bool {
        self.as_str().starts_with("PRIVATE_BANKING")
    }
}

impl From<String> for CourtageClass {
    fn from(s: String) -> Self {
        match s.as_str() {
            "MINI" => CourtageClass::Mini,
            "SMALL" => CourtageClass::Small,
            "MEDIUM" => CourtageClass::Medium,
            "FASTPRIS" => CourtageClass::FastPris,
            "PRIVATE_BANKING_MINI" => CourtageClass::PrivateBankingMini,
            "PRIVATE_BANKING" => CourtageClass::PrivateBanking,
            "PRIVATE_BANKING_FASTPRIS" => CourtageClass::PrivateBankingFastPris,
            _ => CourtageClass::Other(s),
        }
    }
}

impl From<CourtageClass> for String {
    fn from(class: CourtageClass) -> Self {
        match class {
            CourtageClass::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CourtageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
