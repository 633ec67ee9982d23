use chrono::{Datelike, Month, Months, NaiveDate};

/// One day cell of a month view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarGridCell {
    pub date: NaiveDate,
    pub day_number: u32,
    /// False for the padding days of the neighbouring months
    pub is_current_month: bool,
}

/// Sunday-first weeks covering `month`.
///
/// Leading cells are the last days of the previous month, trailing cells the
/// first days of the next one. Only whole weeks are produced and the grid
/// stops after the week holding the last day of the month.
pub fn build_month_grid(year: i32, month: Month) -> Option<Vec<[CalendarGridCell; 7]>> {
    let first = NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    let leading = u64::from(first.weekday().num_days_from_sunday());
    let mut day = first.checked_sub_days(chrono::Days::new(leading))?;

    let mut weeks = Vec::with_capacity(6);
    while day <= last {
        let mut week = Vec::with_capacity(7);
        for _ in 0..7 {
            week.push(CalendarGridCell {
                date: day,
                day_number: day.day(),
                is_current_month: day.year() == year && day.month() == first.month(),
            });
            day = day.succ_opt()?;
        }
        weeks.push(week.try_into().ok()?);
    }

    Some(weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_february_2026_fits_four_rows() {
        let grid = build_month_grid(2026, Month::February).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0][0].date, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(grid[0][0].date.weekday(), Weekday::Sun);
        assert!(grid.iter().flatten().all(|cell| cell.is_current_month));
        assert_eq!(grid[3][6].day_number, 28);
    }

    #[test]
    fn test_padding_days_come_from_neighbouring_months() {
        // March 2026 starts on a Sunday and ends on a Tuesday
        let grid = build_month_grid(2026, Month::March).unwrap();
        assert_eq!(grid.len(), 5);
        let last_week = grid[4];
        assert_eq!(last_week[2].date, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
        assert!(last_week[2].is_current_month);
        assert_eq!(last_week[3].day_number, 1);
        assert!(!last_week[3].is_current_month);

        // January 2026 starts on a Thursday
        let grid = build_month_grid(2026, Month::January).unwrap();
        let first_week = grid[0];
        assert_eq!(first_week[0].date, NaiveDate::from_ymd_opt(2025, 12, 28).unwrap());
        assert!(!first_week[3].is_current_month);
        assert_eq!(first_week[4].day_number, 1);
        assert!(first_week[4].is_current_month);
    }

    #[test]
    fn test_six_row_month() {
        // August 2026 starts on a Saturday and has 31 days
        let grid = build_month_grid(2026, Month::August).unwrap();
        assert_eq!(grid.len(), 6);
        assert_eq!(grid[5][1].date, NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());
    }

    #[test]
    fn test_year_out_of_range() {
        assert!(build_month_grid(i32::MAX, Month::January).is_none());
    }
}
