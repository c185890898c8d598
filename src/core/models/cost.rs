use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Whether a cost figure was measured or derived from aggregate totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostSource {
    Reported,
    Estimated,
}

impl std::fmt::Display for CostSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reported => write!(f, "REPORTED"),
            Self::Estimated => write!(f, "ESTIMATED"),
        }
    }
}

/// The cost of a single day, ready for threshold evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveCost {
    /// Figure compared against the thresholds.
    pub amount: Decimal,
    /// Charge after discounts, kept for performance data.
    pub charge: Decimal,
    pub discount: Decimal,
    pub source: CostSource,
    pub for_date: NaiveDate,
}

impl EffectiveCost {
    pub fn zero(for_date: NaiveDate) -> Self {
        Self {
            amount: Decimal::ZERO,
            charge: Decimal::ZERO,
            discount: Decimal::ZERO,
            source: CostSource::Reported,
            for_date,
        }
    }
}
