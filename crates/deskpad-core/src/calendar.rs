//! Month grid layout.
//!
//! A month is always laid out as six weeks of seven days (42 cells), Sunday
//! first, with days from the neighbouring months filling the gaps.

use anyhow::{anyhow, bail, Result};
use chrono::{Datelike, NaiveDate};

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
pub const GRID_CELLS: usize = 42;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    PreviousMonth,
    CurrentMonth,
    NextMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub kind: CellKind,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    /// Zero-based month (0 = January).
    pub month0: u32,
    pub headers: [&'static str; 7],
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn leading_days(&self) -> usize {
        self.cells
            .iter()
            .take_while(|c| c.kind == CellKind::PreviousMonth)
            .count()
    }

    pub fn days_in_month(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.kind == CellKind::CurrentMonth)
            .count()
    }
}

/// Lays out `year`/`month0` (zero-based) as a 42-cell grid, flagging `today`.
pub fn month_grid(year: i32, month0: u32, today: NaiveDate) -> Result<MonthGrid> {
    if month0 > 11 {
        bail!("month index {} out of range 0..=11", month0);
    }

    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .ok_or_else(|| anyhow!("year {} is out of range", year))?;
    let days_in_month = days_in_month(first)?;
    let prev_month_days = first
        .pred_opt()
        .map(|d| d.day())
        .ok_or_else(|| anyhow!("no month precedes {}-{:02}", year, month0 + 1))?;
    let leading = first.weekday().num_days_from_sunday();

    let mut cells = Vec::with_capacity(GRID_CELLS);

    for offset in (0..leading).rev() {
        cells.push(DayCell {
            day: prev_month_days - offset,
            kind: CellKind::PreviousMonth,
            is_today: false,
        });
    }

    let today_in_month = today.year() == year && today.month0() == month0;
    for day in 1..=days_in_month {
        cells.push(DayCell {
            day,
            kind: CellKind::CurrentMonth,
            is_today: today_in_month && today.day() == day,
        });
    }

    let trailing = GRID_CELLS - cells.len();
    for day in 1..=trailing as u32 {
        cells.push(DayCell {
            day,
            kind: CellKind::NextMonth,
            is_today: false,
        });
    }

    Ok(MonthGrid {
        year,
        month0,
        headers: WEEKDAY_HEADERS,
        cells,
    })
}

fn days_in_month(first: NaiveDate) -> Result<u32> {
    let next_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .ok_or_else(|| anyhow!("no month follows {}", first))?;

    Ok((next_first - first).num_days() as u32)
}

/// The month currently shown on the calendar view. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month0: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month0: u32) -> Self {
        Self {
            year,
            month0: month0.min(11),
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month0())
    }

    pub fn next(&mut self) {
        if self.month0 == 11 {
            self.month0 = 0;
            self.year += 1;
        } else {
            self.month0 += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.month0 == 0 {
            self.month0 = 11;
            self.year -= 1;
        } else {
            self.month0 -= 1;
        }
    }

    /// e.g. "October 2026"
    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month0 as usize], self.year)
    }

    pub fn grid(&self, today: NaiveDate) -> Result<MonthGrid> {
        month_grid(self.year, self.month0, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_every_month_has_42_cells() {
        let today = date(2026, 10, 17);
        for year in [1999, 2000, 2023, 2024, 2026, 2100] {
            for month0 in 0..12 {
                let grid = month_grid(year, month0, today).unwrap();
                assert_eq!(grid.cells.len(), GRID_CELLS, "{}-{}", year, month0);
                assert_eq!(grid.headers.len(), 7);
                assert_eq!(grid.weeks().count(), 6);
            }
        }
    }

    #[test]
    fn test_october_2026_layout() {
        // October 1st 2026 is a Thursday.
        let grid = month_grid(2026, 9, date(2026, 10, 17)).unwrap();
        assert_eq!(grid.leading_days(), 4);
        let leading: Vec<u32> = grid.cells[..4].iter().map(|c| c.day).collect();
        assert_eq!(leading, vec![27, 28, 29, 30]);
        assert_eq!(grid.days_in_month(), 31);
        assert_eq!(grid.cells[4].day, 1);
        assert_eq!(grid.cells[4].kind, CellKind::CurrentMonth);

        let today: Vec<&DayCell> = grid.cells.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].day, 17);

        let trailing: Vec<u32> = grid.cells[35..].iter().map(|c| c.day).collect();
        assert_eq!(trailing, vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(grid.cells[35..].iter().all(|c| c.kind == CellKind::NextMonth));
    }

    #[test]
    fn test_month_starting_on_sunday_has_no_leading_days() {
        // February 2026 starts on a Sunday and spans exactly four weeks.
        let grid = month_grid(2026, 1, date(2026, 10, 17)).unwrap();
        assert_eq!(grid.leading_days(), 0);
        assert_eq!(grid.days_in_month(), 28);
        assert_eq!(grid.cells.iter().filter(|c| c.kind == CellKind::NextMonth).count(), 14);
    }

    #[test]
    fn test_leap_february() {
        let grid = month_grid(2024, 1, date(2024, 2, 29)).unwrap();
        assert_eq!(grid.days_in_month(), 29);
        let today = grid.cells.iter().find(|c| c.is_today).unwrap();
        assert_eq!(today.day, 29);
        // January has 31 days; February 2024 starts on a Thursday.
        assert_eq!(grid.cells[0].day, 28);
    }

    #[test]
    fn test_today_only_flagged_in_matching_month() {
        let grid = month_grid(2025, 9, date(2026, 10, 17)).unwrap();
        assert!(grid.cells.iter().all(|c| !c.is_today));
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(month_grid(2026, 12, date(2026, 1, 1)).is_err());
    }

    #[test]
    fn test_cursor_rolls_over_years() {
        let mut cursor = MonthCursor::new(2025, 11);
        cursor.next();
        assert_eq!(cursor, MonthCursor::new(2026, 0));
        assert_eq!(cursor.title(), "January 2026");
        cursor.prev();
        assert_eq!(cursor, MonthCursor::new(2025, 11));
        assert_eq!(cursor.title(), "December 2025");
    }

    #[test]
    fn test_cursor_grid_across_december_january() {
        let today = date(2026, 1, 1);
        let mut cursor = MonthCursor::new(2025, 11);
        let december = cursor.grid(today).unwrap();
        cursor.next();
        let january = cursor.grid(today).unwrap();
        assert_eq!(december.cells.len(), GRID_CELLS);
        assert_eq!(january.cells.len(), GRID_CELLS);
        assert!(january.cells.iter().any(|c| c.is_today && c.day == 1));
    }
}
