pub mod error;
pub mod rest;
pub mod tariff;
pub mod types;

// ---- Top-level re-exports for ergonomic usage ----

pub use error::{AvanzaError, Result};

// REST client
pub use rest::{AvanzaHttpClient, COURTAGE_CLASS_PATH, COURTAGE_CLASS_UPDATE_PATH};

// Wire types
pub use types::{
    CourtageClass, CourtageClassInfo, OrderSubmitResponse, PreliminaryFeeRequest,
    PreliminaryFeeResponse, UpdateCourtageClassRequest, UpdateCourtageClassResponse,
};

// Tariff model
pub use tariff::{Breakpoint, PB_SCHEDULE, STANDARD_SCHEDULE};
