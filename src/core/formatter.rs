use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::models::billing::CURRENCY;

/// Returns "12.50": two decimals, rounded half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Returns "12.50 EUR".
pub fn format_eur(amount: Decimal) -> String {
    format!("{} {}", format_amount(amount), CURRENCY)
}

/// Returns a performance data item "label=value;warn;crit;min".
/// Empty fields are kept so parsers see the same number of separators.
pub fn format_perf_item(
    label: &str,
    value: Decimal,
    warn: Option<Decimal>,
    crit: Option<Decimal>,
    min: Option<Decimal>,
) -> String {
    let field = |v: Option<Decimal>| v.map(format_amount).unwrap_or_default();
    format!(
        "{}={};{};{};{}",
        label,
        format_amount(value),
        field(warn),
        field(crit),
        min.map(|m| m.normalize().to_string()).unwrap_or_default()
    )
}
