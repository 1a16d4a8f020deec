//! Pure tariff model for the tiered courtage schedules.
//!
//! Two disjoint schedules exist (standard and private banking); which one
//! applies is decided solely by the family of the account's current class.
//! Optimization never moves an account across families.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::CourtageClass;

/// One row of a pricing schedule.
#[derive(Debug, Clone)]
pub struct Breakpoint {
    /// Exclusive upper bound on order value; `None` marks the unbounded top tier.
    pub limit: Option<Decimal>,
    pub class: CourtageClass,
    pub label: &'static str,
    /// Commission rate as a fraction of the order value.
    pub percent: Decimal,
    /// Minimum fee charged regardless of order value.
    pub min: Decimal,
}

/// Standard schedule, ascending by limit.
pub static STANDARD_SCHEDULE: [Breakpoint; 4] = [
    Breakpoint {
        limit: Some(dec!(15600)),
        class: CourtageClass::Mini,
        label: "Mini",
        percent: dec!(0.0025),
        min: dec!(1),
    },
    Breakpoint {
        limit: Some(dec!(46000)),
        class: CourtageClass::Small,
        label: "Small",
        percent: dec!(0.0015),
        min: dec!(39),
    },
    Breakpoint {
        limit: Some(dec!(143500)),
        class: CourtageClass::Medium,
        label: "Medium",
        percent: dec!(0.00069),
        min: dec!(69),
    },
    Breakpoint {
        limit: None,
        class: CourtageClass::FastPris,
        label: "Fast Pris",
        percent: dec!(0),
        min: dec!(99),
    },
];

/// Private-banking schedule, ascending by limit.
pub static PB_SCHEDULE: [Breakpoint; 3] = [
    Breakpoint {
        limit: Some(dec!(39333)),
        class: CourtageClass::PrivateBankingMini,
        label: "PB Mini",
        percent: dec!(0.0025),
        min: dec!(1),
    },
    Breakpoint {
        limit: Some(dec!(180000)),
        class: CourtageClass::PrivateBanking,
        label: "PB",
        percent: dec!(0.00079),
        min: dec!(59),
    },
    Breakpoint {
        limit: None,
        class: CourtageClass::PrivateBankingFastPris,
        label: "PB Fast Pris",
        percent: dec!(0),
        min: dec!(99),
    },
];

/// The schedule that applies to an account currently in `class`.
pub fn schedule_for(class: &CourtageClass) -> &'static [Breakpoint] {
    if class.is_private_banking() {
        &PB_SCHEDULE
    } else {
        &STANDARD_SCHEDULE
    }
}

/// The cheapest class for an order of `amount`, staying within the family
/// of `current`.
///
/// Bounds are exclusive: an amount exactly at a limit belongs to the next
/// tier up. Amounts beyond every bound land on the unbounded top tier.
pub fn solve_optimal(amount: Decimal, current: &CourtageClass) -> CourtageClass {
    let schedule = schedule_for(current);
    for bp in schedule {
        if let Some(limit) = bp.limit {
            if amount < limit {
                return bp.class.clone();
            }
        }
    }
    schedule[schedule.len() - 1].class.clone()
}

/// Fee for an order of `amount` under `class`: `max(amount * percent, min)`
/// rounded to two decimals, half away from zero.
///
/// An unknown class yields zero rather than an error.
pub fn calculate_fee(amount: Decimal, class: &CourtageClass) -> Decimal {
    let Some(bp) = find_breakpoint(class) else {
        return Decimal::ZERO;
    };
    (amount * bp.percent)
        .max(bp.min)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Display label for `class`, falling back to the raw identifier.
pub fn class_label(class: &CourtageClass) -> String {
    match find_breakpoint(class) {
        Some(bp) => bp.label.to_string(),
        None => class.as_str().to_string(),
    }
}

fn find_breakpoint(class: &CourtageClass) -> Option<&'static Breakpoint> {
    STANDARD_SCHEDULE
        .iter()
        .chain(PB_SCHEDULE.iter())
        .find(|bp| bp.class == *class)
}
