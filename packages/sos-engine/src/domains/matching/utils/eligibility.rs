//! Donation interval rule.
//!
//! Pure functions over an explicit `as_of`; nothing here reads the wall clock.

use chrono::{DateTime, Utc};

/// Minimum whole days between two whole-blood donations.
pub const ELIGIBILITY_WINDOW_DAYS: i64 = 56;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days elapsed from `since` to `as_of`, floored.
///
/// Negative when `since` lies after `as_of`.
pub fn whole_days_between(since: DateTime<Utc>, as_of: DateTime<Utc>) -> i64 {
    (as_of - since).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// A donor who never donated is eligible; otherwise at least 56 whole days must
/// have passed (exactly 56 counts).
pub fn is_eligible(last_donation: Option<DateTime<Utc>>, as_of: DateTime<Utc>) -> bool {
    match last_donation {
        None => true,
        Some(last) => whole_days_between(last, as_of) >= ELIGIBILITY_WINDOW_DAYS,
    }
}

/// Days since the donor crossed the eligibility line.
///
/// `None` for donors who never donated, a negative value for donors still
/// inside the window.
pub fn days_since_eligible(last_donation: Option<DateTime<Utc>>, as_of: DateTime<Utc>) -> Option<i64> {
    last_donation.map(|last| whole_days_between(last, as_of) - ELIGIBILITY_WINDOW_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn never_donated_is_eligible() {
        assert!(is_eligible(None, as_of()));
    }

    #[test]
    fn exactly_56_days_is_eligible() {
        assert!(is_eligible(Some(as_of() - Duration::days(56)), as_of()));
    }

    #[test]
    fn day_55_is_not_eligible() {
        assert!(!is_eligible(Some(as_of() - Duration::days(55)), as_of()));
    }

    #[test]
    fn partial_days_are_floored() {
        let last = as_of() - Duration::days(56) + Duration::milliseconds(1);
        assert_eq!(whole_days_between(last, as_of()), 55);
        assert!(!is_eligible(Some(last), as_of()));

        let last = as_of() - Duration::days(56) - Duration::hours(23);
        assert!(is_eligible(Some(last), as_of()));
    }

    #[test]
    fn future_donation_is_never_eligible() {
        let last = as_of() + Duration::hours(1);
        assert_eq!(whole_days_between(last, as_of()), -1);
        assert!(!is_eligible(Some(last), as_of()));
    }

    #[test]
    fn days_since_eligible_offsets_by_window() {
        assert_eq!(days_since_eligible(None, as_of()), None);
        assert_eq!(
            days_since_eligible(Some(as_of() - Duration::days(100)), as_of()),
            Some(44)
        );
        assert_eq!(
            days_since_eligible(Some(as_of() - Duration::days(30)), as_of()),
            Some(-26)
        );
    }
}
