use chrono::{Datelike, NaiveDate, Days, Months};
use sea_orm::{ConnectionTrait, Statement};

use crate::{Money, ResultEngine, users};

use super::Engine;

/// Inclusive first and last day of a calendar month.
pub(crate) fn month_window(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start
        .checked_add_months(Months::new(1))?
        .checked_sub_days(Days::new(1))?;
    Some((start, end))
}

/// The calendar month `offset` months before the one containing `today`.
pub(crate) fn relative_month(today: NaiveDate, offset: u32) -> Option<(NaiveDate, NaiveDate)> {
    let anchor = today.checked_sub_months(Months::new(offset))?;
    month_window(anchor.year(), anchor.month())
}

impl Engine {
    /// Total spend across all sources within an inclusive date window.
    pub async fn sum_expenses(
        &self,
        user: &users::Model,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Money> {
        let stmt = Statement::from_sql_and_values(
            self.database.get_database_backend(),
            "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
             FROM expenses \
             WHERE user_id = ? AND date >= ? AND date <= ?",
            vec![user.id.into(), start.into(), end.into()],
        );
        let row = self.database.query_one(stmt).await?;
        let total: i64 = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
        Ok(Money::new(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_window_covers_whole_month() {
        assert_eq!(
            month_window(2024, 9),
            Some((date(2024, 9, 1), date(2024, 9, 30)))
        );
        assert_eq!(
            month_window(2024, 2),
            Some((date(2024, 2, 1), date(2024, 2, 29)))
        );
        assert_eq!(
            month_window(2024, 12),
            Some((date(2024, 12, 1), date(2024, 12, 31)))
        );
    }

    #[test]
    fn relative_month_crosses_year_boundary() {
        assert_eq!(
            relative_month(date(2025, 1, 15), 1),
            Some((date(2024, 12, 1), date(2024, 12, 31)))
        );
        assert_eq!(
            relative_month(date(2025, 1, 15), 0),
            Some((date(2025, 1, 1), date(2025, 1, 31)))
        );
    }
}
