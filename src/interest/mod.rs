pub mod mora;

use chrono::NaiveDate;

pub use mora::{MoraCalculator, RecomputeResult};

/// whole days `as_of` lies past `due_date`, floored at zero
pub fn days_overdue(due_date: NaiveDate, as_of: NaiveDate) -> u32 {
    let days = (as_of - due_date).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_overdue() {
        let due = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        assert_eq!(days_overdue(due, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()), 2);
        assert_eq!(days_overdue(due, due), 0);
        assert_eq!(days_overdue(due, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 0);
    }
}
