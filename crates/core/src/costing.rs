use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Human agents average 12.5 answered calls per hour over an
/// 8-hour shift and a 22-working-day month.
pub const HUMAN_CALLS_PER_MONTH: u32 = 2_200;

/// One AI deployment handles 50 simultaneous calls, around the clock.
pub const AI_SIMULTANEOUS_CALLS: u32 = 50;
pub const AI_CALLS_PER_MONTH: u32 = AI_SIMULTANEOUS_CALLS * 60 * 24 * 30;

/// Hourly rate used for the human-staffing comparison, in dollars.
const HUMAN_HOURLY_RATE_DOLLARS: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCapacity {
    pub human_calls_per_month: u32,
    pub ai_calls_per_month: u32,
    pub ai_simultaneous_calls: u32,
}

impl Default for CallCapacity {
    fn default() -> Self {
        Self {
            human_calls_per_month: HUMAN_CALLS_PER_MONTH,
            ai_calls_per_month: AI_CALLS_PER_MONTH,
            ai_simultaneous_calls: AI_SIMULTANEOUS_CALLS,
        }
    }
}

/// Comparative monthly cost of human staffing versus the two AI
/// service tiers, for a projected call volume.
///
/// A breakdown is a pure function of `(minutes, cost_per_minute)`:
/// the same inputs always produce the same breakdown, which is what
/// lets a report be regenerated later from the durable price alone.
/// Amounts keep full decimal precision here; display rounding is the
/// report assembler's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub minutes: u32,
    pub cost_per_minute: Decimal,
    pub premium_cost_per_minute: Decimal,
    pub standard_cost: Decimal,
    pub premium_cost: Decimal,
    pub human_cost: Decimal,
    pub standard_savings: Decimal,
    pub premium_savings: Decimal,
    pub standard_savings_pct: Decimal,
    pub premium_savings_pct: Decimal,
    pub capacity: CallCapacity,
}

impl CostBreakdown {
    /// Computes the full comparative breakdown.
    ///
    /// `cost_per_minute` must be positive; the premium tier is always
    /// exactly twice the standard rate. `minutes == 0` is valid and
    /// yields zero savings percentages rather than a division error.
    pub fn compute(minutes: u32, cost_per_minute: Decimal) -> Result<Self, DomainError> {
        if cost_per_minute <= Decimal::ZERO {
            return Err(DomainError::NonPositiveRate { cost_per_minute });
        }

        let minutes_dec = Decimal::from(minutes);
        let premium_cost_per_minute = cost_per_minute * Decimal::TWO;

        let standard_cost = minutes_dec * cost_per_minute;
        let premium_cost = minutes_dec * premium_cost_per_minute;
        let human_cost =
            minutes_dec / Decimal::from(60) * Decimal::from(HUMAN_HOURLY_RATE_DOLLARS);

        let standard_savings = human_cost - standard_cost;
        let premium_savings = human_cost - premium_cost;

        let standard_savings_pct = savings_pct(standard_savings, human_cost);
        let premium_savings_pct = savings_pct(premium_savings, human_cost);

        Ok(Self {
            minutes,
            cost_per_minute,
            premium_cost_per_minute,
            standard_cost,
            premium_cost,
            human_cost,
            standard_savings,
            premium_savings,
            standard_savings_pct,
            premium_savings_pct,
            capacity: CallCapacity::default(),
        })
    }
}

// Zero projected minutes means zero human cost; the percentage is
// defined as zero there instead of a division failure.
fn savings_pct(savings: Decimal, human_cost: Decimal) -> Decimal {
    if human_cost.is_zero() {
        Decimal::ZERO
    } else {
        savings / human_cost * Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::{Decimal, RoundingStrategy};

    use super::{CostBreakdown, AI_CALLS_PER_MONTH, HUMAN_CALLS_PER_MONTH};
    use crate::errors::DomainError;

    fn rate(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn worked_example_at_five_cents() {
        let breakdown = CostBreakdown::compute(1_000, rate(5)).expect("valid inputs");

        assert_eq!(breakdown.standard_cost, Decimal::new(5_000, 2));
        assert_eq!(breakdown.premium_cost, Decimal::new(10_000, 2));
        assert_eq!(breakdown.premium_cost_per_minute, Decimal::new(10, 2));
        assert_eq!(breakdown.human_cost.round_dp(2), Decimal::new(26_667, 2));
        assert_eq!(breakdown.standard_savings.round_dp(2), Decimal::new(21_667, 2));
        assert_eq!(breakdown.premium_savings.round_dp(2), Decimal::new(16_667, 2));
        // Display rounding is half away from zero, 81.25% -> 81.3%.
        assert_eq!(
            breakdown
                .standard_savings_pct
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
            Decimal::new(813, 1)
        );
        assert_eq!(
            breakdown
                .premium_savings_pct
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
            Decimal::new(625, 1)
        );
    }

    #[test]
    fn premium_tier_is_exactly_double() {
        for minutes in [1u32, 60, 999, 10_000] {
            for cents in [1i64, 5, 37, 250] {
                let breakdown = CostBreakdown::compute(minutes, rate(cents)).expect("valid");
                assert_eq!(breakdown.premium_cost, breakdown.standard_cost * Decimal::TWO);
                assert_eq!(
                    breakdown.premium_cost_per_minute,
                    breakdown.cost_per_minute * Decimal::TWO
                );
            }
        }
    }

    #[test]
    fn identical_inputs_yield_identical_breakdowns() {
        let first = CostBreakdown::compute(4_321, rate(7)).expect("valid");
        let second = CostBreakdown::compute(4_321, rate(7)).expect("valid");
        assert_eq!(first, second);
    }

    #[test]
    fn zero_minutes_reports_zero_percentages() {
        let breakdown = CostBreakdown::compute(0, rate(5)).expect("zero minutes is valid");

        assert_eq!(breakdown.standard_cost, Decimal::ZERO);
        assert_eq!(breakdown.human_cost, Decimal::ZERO);
        assert_eq!(breakdown.standard_savings_pct, Decimal::ZERO);
        assert_eq!(breakdown.premium_savings_pct, Decimal::ZERO);
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        let error = CostBreakdown::compute(100, Decimal::ZERO).expect_err("zero rate");
        assert!(matches!(error, DomainError::NonPositiveRate { .. }));

        let error = CostBreakdown::compute(100, rate(-5)).expect_err("negative rate");
        assert!(matches!(error, DomainError::NonPositiveRate { .. }));
    }

    #[test]
    fn capacity_constants_match_staffing_assumptions() {
        // 12.5 calls/hour * 8 hours * 22 days, and 50 * 60 * 24 * 30.
        assert_eq!(HUMAN_CALLS_PER_MONTH, 2_200);
        assert_eq!(AI_CALLS_PER_MONTH, 2_160_000);
    }
}
