use chrono::NaiveDate;

use crate::leave::error::LeaveError;

/// Inclusive day count for a leave date range. A same-day request counts as
/// one day. Fails when `end` precedes `start`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Result<u32, LeaveError> {
    if end < start {
        return Err(LeaveError::Validation(
            "end_date cannot be before start_date".into(),
        ));
    }
    Ok((end - start).num_days() as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_counts_one() {
        assert_eq!(days_between(date(2024, 6, 10), date(2024, 6, 10)).unwrap(), 1);
    }

    #[test]
    fn range_is_inclusive_of_both_endpoints() {
        assert_eq!(days_between(date(2024, 6, 10), date(2024, 6, 12)).unwrap(), 3);
    }

    #[test]
    fn range_spans_month_boundary() {
        assert_eq!(days_between(date(2024, 1, 30), date(2024, 2, 2)).unwrap(), 4);
    }

    #[test]
    fn range_spans_leap_day() {
        assert_eq!(days_between(date(2024, 2, 28), date(2024, 3, 1)).unwrap(), 3);
    }

    #[test]
    fn reversed_range_fails() {
        let err = days_between(date(2024, 6, 12), date(2024, 6, 10)).unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
    }
}
