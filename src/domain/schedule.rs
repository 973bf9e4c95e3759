//! Installment schedule allocation
//!
//! Pure function that splits a plan total into monthly installments.
//! The per-installment base amount is the total divided by the count and
//! rounded half-up to 2 decimal places; the final installment absorbs the
//! rounding remainder so the schedule always sums exactly to the total.

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use super::Money;

/// One scheduled installment before persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledInstallment {
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

/// Build the monthly installment schedule for a plan.
///
/// Callers guarantee `count >= 1`; the total is positive by construction of
/// `Money`. Due dates advance by one calendar month per installment, with
/// the day-of-month clamped to the last day of shorter months.
///
/// Postconditions: `result.len() == count`, the amounts sum exactly to
/// `total`, and the first due date equals `start_date`.
pub fn monthly_schedule(total: Money, count: u32, start_date: NaiveDate) -> Vec<ScheduledInstallment> {
    let total = total.value();
    let base = (total / Decimal::from(count))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    // Last installment takes whatever the rounded base amounts leave over
    let last = total - base * Decimal::from(count - 1);

    (0..count)
        .map(|i| ScheduledInstallment {
            due_date: add_months(start_date, i),
            amount: if i == count - 1 { last } else { base },
        })
        .collect()
}

/// Advance a date by `months` calendar months, clamping the day-of-month.
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .expect("due date out of supported range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_even_split() {
        let schedule = monthly_schedule(money("1000.00"), 4, date(2025, 1, 1));

        assert_eq!(schedule.len(), 4);
        for entry in &schedule {
            assert_eq!(entry.amount, dec!(250.00));
        }
        assert_eq!(schedule[0].due_date, date(2025, 1, 1));
        assert_eq!(schedule[1].due_date, date(2025, 2, 1));
        assert_eq!(schedule[2].due_date, date(2025, 3, 1));
        assert_eq!(schedule[3].due_date, date(2025, 4, 1));
    }

    #[test]
    fn test_remainder_absorbed_by_last() {
        let schedule = monthly_schedule(money("100.01"), 3, date(2025, 1, 15));

        let amounts: Vec<Decimal> = schedule.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![dec!(33.34), dec!(33.34), dec!(33.33)]);

        let sum: Decimal = amounts.iter().sum();
        assert_eq!(sum, dec!(100.01));
    }

    #[test]
    fn test_sum_is_exact_for_awkward_totals() {
        for (total, count) in [("100.00", 3), ("999.99", 7), ("0.05", 2), ("1.00", 6)] {
            let schedule = monthly_schedule(money(total), count, date(2025, 6, 1));
            let sum: Decimal = schedule.iter().map(|e| e.amount).sum();
            assert_eq!(sum, total.parse::<Decimal>().unwrap(), "total={total} count={count}");
            assert_eq!(schedule.len(), count as usize);
        }
    }

    #[test]
    fn test_amounts_have_at_most_two_decimals() {
        let schedule = monthly_schedule(money("100.00"), 3, date(2025, 1, 1));
        for entry in &schedule {
            assert!(entry.amount.scale() <= 2, "amount {} has scale {}", entry.amount, entry.amount.scale());
        }
    }

    #[test]
    fn test_single_installment() {
        let schedule = monthly_schedule(money("250.00"), 1, date(2025, 3, 10));
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].amount, dec!(250.00));
        assert_eq!(schedule[0].due_date, date(2025, 3, 10));
    }

    #[test]
    fn test_dates_strictly_increasing() {
        let schedule = monthly_schedule(money("600.00"), 12, date(2025, 1, 1));
        for pair in schedule.windows(2) {
            assert!(pair[0].due_date < pair[1].due_date);
        }
    }

    #[test]
    fn test_month_end_clamps() {
        // Jan 31 -> Feb 28 (2025 is not a leap year) -> Mar 31
        let schedule = monthly_schedule(money("300.00"), 3, date(2025, 1, 31));
        assert_eq!(schedule[0].due_date, date(2025, 1, 31));
        assert_eq!(schedule[1].due_date, date(2025, 2, 28));
        assert_eq!(schedule[2].due_date, date(2025, 3, 31));
    }

    #[test]
    fn test_month_end_leap_year() {
        let schedule = monthly_schedule(money("200.00"), 2, date(2024, 1, 31));
        assert_eq!(schedule[1].due_date, date(2024, 2, 29));
    }

    #[test]
    fn test_maximum_validated_shape_stays_in_range() {
        // Largest plan validation lets through: 120 installments starting
        // a century out
        let schedule = monthly_schedule(money("1200.00"), 120, date(2126, 8, 30));
        assert_eq!(schedule.len(), 120);
        assert_eq!(schedule.last().unwrap().due_date, date(2136, 7, 30));
    }

    #[test]
    fn test_year_rollover() {
        let schedule = monthly_schedule(money("300.00"), 3, date(2025, 11, 15));
        assert_eq!(schedule[1].due_date, date(2025, 12, 15));
        assert_eq!(schedule[2].due_date, date(2026, 1, 15));
    }
}
