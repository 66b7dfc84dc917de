//! # Grant Record & Vesting Schedule
//!
//! A [`Grant`] is one beneficiary's time-released entitlement to a fixed
//! quantity of the asset. Entitlement accrues linearly between `start` and
//! `end`, gated by a `cliff` before which nothing is claimable.
//!
//! The schedule function is pure integer arithmetic with floor (truncating)
//! division, widened through `u128` so `value * elapsed` cannot overflow.
//! It never rounds up: the sum of any sequence of partial claims can never
//! exceed `value`, which is what keeps the trustee's aggregate reserve
//! bound intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A beneficiary's vesting grant.
///
/// Schedule invariant (enforced at creation by the trustee):
/// `start <= cliff <= end` and `end > start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Total quantity ever allotted, in the smallest denomination.
    /// Immutable after creation.
    pub value: u64,
    /// When entitlement starts accruing.
    pub start: DateTime<Utc>,
    /// No portion is claimable before this timestamp.
    pub cliff: DateTime<Utc>,
    /// Everything has vested at (and after) this timestamp.
    pub end: DateTime<Utc>,
    /// Cumulative quantity already paid out. Monotonically non-decreasing,
    /// bounded by `value`.
    pub transferred: u64,
    /// Whether the issuer may revoke this grant. Fixed at creation.
    pub revokable: bool,
}

impl Grant {
    /// Total quantity vested (entitled-to-date) at `now`, whether or not
    /// it has been claimed yet.
    ///
    /// Zero before the cliff, `value` from `end` onwards, and
    /// `floor(value * (now - start) / (end - start))` in between.
    pub fn vested_at(&self, now: DateTime<Utc>) -> u64 {
        if self.value == 0 || now < self.cliff {
            return 0;
        }
        if now >= self.end {
            return self.value;
        }

        // cliff <= now < end, and end > start. The clamp hardens against an
        // externally built record with cliff < start, where elapsed could
        // go negative.
        let elapsed = (now - self.start).num_seconds().max(0) as u128;
        let duration = (self.end - self.start).num_seconds() as u128;
        ((self.value as u128 * elapsed) / duration) as u64
    }

    /// Quantity the beneficiary could withdraw right now: vested minus
    /// already transferred.
    ///
    /// Pure query, safe at any `now` — including after full payout, where
    /// it returns 0.
    pub fn claimable(&self, now: DateTime<Utc>) -> u64 {
        self.vested_at(now).saturating_sub(self.transferred)
    }

    /// The unpaid remainder of the grant, `value - transferred`. This is
    /// what the trustee owes for this grant, and what a revocation refunds
    /// to the issuer.
    pub fn remaining(&self) -> u64 {
        self.value.saturating_sub(self.transferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    /// 1000 tokens, 30-day cliff, 365-day schedule starting at t=0.
    fn year_grant() -> Grant {
        Grant {
            value: 1000,
            start: ts(0),
            cliff: ts(30 * DAY),
            end: ts(365 * DAY),
            transferred: 0,
            revokable: false,
        }
    }

    #[test]
    fn nothing_vests_before_cliff() {
        let grant = year_grant();
        assert_eq!(grant.claimable(ts(0)), 0);
        assert_eq!(grant.claimable(ts(29 * DAY)), 0);
        assert_eq!(grant.claimable(ts(30 * DAY - 1)), 0);
    }

    #[test]
    fn cliff_unlocks_elapsed_portion() {
        let grant = year_grant();
        // floor(1000 * 30 / 365) == 82 — the cliff does not reset accrual,
        // it only gates withdrawal.
        assert_eq!(grant.claimable(ts(30 * DAY)), 82);
    }

    #[test]
    fn midpoint_vests_half() {
        let grant = Grant {
            value: 1000,
            start: ts(0),
            cliff: ts(0),
            end: ts(100 * DAY),
            transferred: 0,
            revokable: false,
        };
        assert_eq!(grant.claimable(ts(50 * DAY)), 500);
    }

    #[test]
    fn floor_division_never_rounds_up() {
        let grant = Grant {
            value: 10,
            start: ts(0),
            cliff: ts(0),
            end: ts(3),
            transferred: 0,
            revokable: false,
        };
        // 10/3 per second: 3, 6, then full 10 at the end.
        assert_eq!(grant.claimable(ts(1)), 3);
        assert_eq!(grant.claimable(ts(2)), 6);
        assert_eq!(grant.claimable(ts(3)), 10);
    }

    #[test]
    fn everything_vests_at_and_after_end() {
        let grant = year_grant();
        assert_eq!(grant.claimable(ts(365 * DAY)), 1000);
        assert_eq!(grant.claimable(ts(366 * DAY)), 1000);
        assert_eq!(grant.claimable(ts(10 * 365 * DAY)), 1000);
    }

    #[test]
    fn transferred_is_subtracted() {
        let mut grant = year_grant();
        grant.transferred = 82;
        assert_eq!(grant.claimable(ts(30 * DAY)), 0);
        assert_eq!(grant.claimable(ts(365 * DAY)), 918);
    }

    #[test]
    fn claimable_is_monotonic_in_time() {
        let grant = year_grant();
        let mut previous = 0;
        for day in 0..=400 {
            let current = grant.claimable(ts(day * DAY));
            assert!(current >= previous, "claimable regressed on day {day}");
            previous = current;
        }
    }

    #[test]
    fn claimable_plus_transferred_never_exceeds_value() {
        let mut grant = year_grant();
        grant.transferred = 400;
        for day in 0..=400 {
            let now = ts(day * DAY);
            assert!(grant.claimable(now) + grant.transferred <= grant.value);
        }
    }

    #[test]
    fn zero_value_grant_is_never_claimable() {
        let grant = Grant {
            value: 0,
            start: ts(0),
            cliff: ts(0),
            end: ts(DAY),
            transferred: 0,
            revokable: false,
        };
        assert_eq!(grant.claimable(ts(2 * DAY)), 0);
    }

    #[test]
    fn inverted_cliff_record_vests_nothing_before_start() {
        // The trustee never creates a record with cliff < start, but the
        // fields are public; a query between cliff and start must not wrap.
        let grant = Grant {
            value: 1000,
            start: ts(100),
            cliff: ts(0),
            end: ts(200),
            transferred: 0,
            revokable: false,
        };
        assert_eq!(grant.vested_at(ts(50)), 0);
        assert_eq!(grant.claimable(ts(50)), 0);
    }

    #[test]
    fn overclaimed_grant_saturates_to_zero() {
        // transferred > vested cannot happen through the trustee, but the
        // query must not underflow if handed such a record.
        let mut grant = year_grant();
        grant.transferred = 900;
        assert_eq!(grant.claimable(ts(40 * DAY)), 0);
    }

    #[test]
    fn large_values_do_not_overflow_interpolation() {
        let grant = Grant {
            value: u64::MAX,
            start: ts(0),
            cliff: ts(0),
            end: ts(100 * 365 * DAY),
            transferred: 0,
            revokable: false,
        };
        // value * elapsed would overflow u64; the u128 widening keeps the
        // midpoint exact.
        assert_eq!(grant.claimable(ts(50 * 365 * DAY)), u64::MAX / 2);
    }

    #[test]
    fn remaining_is_value_minus_transferred() {
        let mut grant = year_grant();
        assert_eq!(grant.remaining(), 1000);
        grant.transferred = 200;
        assert_eq!(grant.remaining(), 800);
        grant.transferred = 1000;
        assert_eq!(grant.remaining(), 0);
    }

    #[test]
    fn grant_serialization_roundtrip() {
        let grant = year_grant();
        let json = serde_json::to_string(&grant).unwrap();
        let restored: Grant = serde_json::from_str(&json).unwrap();
        assert_eq!(grant, restored);
    }
}
