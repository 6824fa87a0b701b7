use crate::state::OddsEntry;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

const HUNDRED: Decimal = dec!(100);

/// Relative odds for one event, as percentages rounded to 2 decimals.
///
/// With no stake yet, every option gets an equal share (`100 / n`): a
/// uniform prior avoids a division by zero and avoids implying confidence
/// before any bet exists. With stake, each option gets its share of the
/// total. Per-option rounding is never renormalized, so the sum may drift
/// slightly off 100; that drift is displayed as-is.
pub fn compute_odds(options: &[String], option_bets: &[u128], total_bets: u128) -> Vec<OddsEntry> {
    if total_bets == 0 {
        return uniform_odds(options);
    }

    let total = match Decimal::try_from(total_bets) {
        Ok(d) => d,
        Err(_) => return zero_odds(options),
    };

    options
        .iter()
        .zip(option_bets)
        .map(|(option, &bets)| {
            let share = Decimal::try_from(bets)
                .map(|b| round2(b / total * HUNDRED))
                .unwrap_or(Decimal::ZERO);
            OddsEntry {
                option: option.clone(),
                percentage: share,
            }
        })
        .collect()
}

/// Equal share for every option, used before any stake exists.
pub fn uniform_odds(options: &[String]) -> Vec<OddsEntry> {
    if options.is_empty() {
        return Vec::new();
    }
    let share = round2(HUNDRED / Decimal::from(options.len() as u64));
    options
        .iter()
        .map(|option| OddsEntry {
            option: option.clone(),
            percentage: share,
        })
        .collect()
}

/// Fail-soft fallback when per-option totals could not be fetched: every
/// option reads 0 rather than the whole listing failing.
pub fn zero_odds(options: &[String]) -> Vec<OddsEntry> {
    options
        .iter()
        .map(|option| OddsEntry {
            option: option.clone(),
            percentage: Decimal::ZERO,
        })
        .collect()
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
