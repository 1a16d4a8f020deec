mod account;
mod class;
mod fee;
mod order;

pub use account::{CourtageClassInfo, UpdateCourtageClassRequest, UpdateCourtageClassResponse};
pub use class::CourtageClass;
pub use fee::{PreliminaryFeeRequest, PreliminaryFeeResponse};
pub use order::OrderSubmitResponse;
