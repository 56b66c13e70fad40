//! Parking fee calculation.
//!
//! Pure: a quote is a function of the billing policy and the two timestamps,
//! nothing else. All arithmetic is integer seconds and [`Decimal`] money;
//! no floating point anywhere so a persisted fee re-reads bit-for-bit.
//!
//! Two billing policies are supported and deliberately kept separate:
//! a flat per-block rate in USD and a daily-capped rate in EUR. The policy
//! is a deployment choice (`FEE_POLICY`), not something merged at runtime.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Billing unit. Partial blocks always round up.
const BLOCK_SECS: i64 = 15 * 60;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Which rate card applies to this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePolicy {
    /// $2.50 per 15-minute block, no cap.
    Flat,
    /// €2.00 per 15-minute block, capped at €40.00 per 24-hour period.
    DailyCapped,
}

impl FeePolicy {
    /// Parse the `FEE_POLICY` environment value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "flat" => Some(FeePolicy::Flat),
            "daily_capped" | "capped" => Some(FeePolicy::DailyCapped),
            _ => None,
        }
    }

    pub fn block_rate(&self) -> Decimal {
        match self {
            FeePolicy::Flat => Decimal::new(250, 2),
            FeePolicy::DailyCapped => Decimal::new(200, 2),
        }
    }

    pub fn daily_cap(&self) -> Option<Decimal> {
        match self {
            FeePolicy::Flat => None,
            FeePolicy::DailyCapped => Some(Decimal::new(4000, 2)),
        }
    }

    pub fn currency(&self) -> &'static str {
        match self {
            FeePolicy::Flat => "USD",
            FeePolicy::DailyCapped => "EUR",
        }
    }
}

/// A computed charge plus the figures it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeQuote {
    /// Parked duration in minutes, rounded to 2 decimal places for display.
    pub duration_minutes: Decimal,
    /// Parked duration in hours, rounded to 2 decimal places for display.
    pub duration_hours: Decimal,
    /// Billed 15-minute blocks over the whole stay, floored at 1.
    pub blocks: i64,
    /// Full 24-hour periods charged at the daily cap (0 under the flat policy).
    pub days_charged: i64,
    pub fee: Decimal,
    pub currency: &'static str,
}

/// Quote the charge for a stay from `entry_time` to `exit_time`.
///
/// A stay is always charged at least one block, including zero and negative
/// durations (clocks are not guarded upstream; a negative duration bills as
/// the minimum stay).
pub fn quote(policy: FeePolicy, entry_time: DateTime<Utc>, exit_time: DateTime<Utc>) -> FeeQuote {
    let secs = (exit_time - entry_time).num_seconds();
    let billable_secs = secs.max(0);
    let blocks = blocks_for(billable_secs);

    let (fee, days_charged) = match policy.daily_cap() {
        None => (policy.block_rate() * Decimal::from(blocks), 0),
        Some(cap) => {
            let days = billable_secs / SECS_PER_DAY;
            let remainder_blocks = if days == 0 {
                blocks_for(billable_secs % SECS_PER_DAY)
            } else {
                ceil_blocks(billable_secs % SECS_PER_DAY)
            };
            let remainder_fee = (policy.block_rate() * Decimal::from(remainder_blocks)).min(cap);
            (cap * Decimal::from(days) + remainder_fee, days)
        }
    };

    FeeQuote {
        duration_minutes: (Decimal::from(secs) / Decimal::from(60)).round_dp(2),
        duration_hours: (Decimal::from(secs) / Decimal::from(3600)).round_dp(2),
        blocks,
        days_charged,
        fee,
        currency: policy.currency(),
    }
}

/// Blocks for a span of seconds, rounded up, floored at one block.
fn blocks_for(secs: i64) -> i64 {
    ceil_blocks(secs).max(1)
}

fn ceil_blocks(secs: i64) -> i64 {
    (secs + BLOCK_SECS - 1) / BLOCK_SECS
}
