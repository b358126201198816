//! Month-view date arithmetic: month offsets, calendar dates and the fixed
//! 6×7 grid a month is rendered into.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const GRID_ROWS:  usize = 6;
pub const GRID_COLS:  usize = 7;
pub const GRID_CELLS: usize = GRID_ROWS * GRID_COLS;

/// Weekday headers, Sunday first.
pub const WEEKDAY_ABBR: [&str; GRID_COLS] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

// Keeps every reachable grid well inside chrono's representable range.
const MIN_YEAR: i32 = -250_000;
const MAX_YEAR: i32 =  250_000;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid month offset {0:?} (expected an integer within ±{})", MonthIndex::LIMIT)]
    InvalidOffset(String),
}

// ─── Month offset ─────────────────────────────────────────────────────────────

/// Signed distance in months from the current real-world month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthIndex(i32);

impl MonthIndex {
    /// Largest accepted offset in either direction (±200 000 years).
    pub const LIMIT: i32 = 2_400_000;

    pub fn new(offset: i32) -> Option<Self> {
        (-Self::LIMIT..=Self::LIMIT).contains(&offset).then_some(Self(offset))
    }

    pub fn saturating(offset: i64) -> Self {
        let limit = Self::LIMIT as i64;
        Self(offset.clamp(-limit, limit) as i32)
    }

    pub fn today() -> Self { Self(0) }

    pub fn get(self) -> i32 { self.0 }

    /// Saturates at `LIMIT`.
    pub fn next(self) -> Self { Self((self.0 + 1).min(Self::LIMIT)) }

    /// Saturates at `-LIMIT`.
    pub fn prev(self) -> Self { Self((self.0 - 1).max(-Self::LIMIT)) }

    /// Offset of `date`'s month relative to `anchor`'s month.
    pub fn between(anchor: NaiveDate, date: NaiveDate) -> Self {
        Self::saturating(month_count(date) - month_count(anchor))
    }
}

impl fmt::Display for MonthIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

impl FromStr for MonthIndex {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .ok()
            .and_then(MonthIndex::new)
            .ok_or_else(|| CalendarError::InvalidOffset(s.to_owned()))
    }
}

// ─── Calendar date ────────────────────────────────────────────────────────────

/// A single day. Months are exposed both zero-based (`month0`) and
/// one-based (`month`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month0: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month0 + 1, day).map(Self)
    }

    pub fn year(&self)    -> i32     { self.0.year() }
    pub fn month0(&self)  -> u32     { self.0.month0() }
    pub fn month(&self)   -> u32     { self.0.month() }
    pub fn day(&self)     -> u32     { self.0.day() }
    pub fn weekday(&self) -> Weekday { self.0.weekday() }
    pub fn date(&self)    -> NaiveDate { self.0 }

    pub fn succ(&self) -> Option<Self> { self.0.succ_opt().map(Self) }
}

impl From<NaiveDate> for CalendarDate {
    fn from(d: NaiveDate) -> Self { Self(d) }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

// ─── Month grid ───────────────────────────────────────────────────────────────

/// 42 consecutive days, six rows of seven, starting on the Sunday on or
/// before the 1st of the target month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    year:   i32,
    month0: u32,
    cells:  [CalendarDate; GRID_CELLS],
}

/// Grid for `index` months away from today's local date.
pub fn build_month(index: MonthIndex) -> MonthGrid {
    MonthGrid::build(Local::now().date_naive(), index)
}

impl MonthGrid {
    pub fn build(anchor: NaiveDate, index: MonthIndex) -> Self {
        let total  = month_count(anchor) + index.get() as i64;
        let year   = total.div_euclid(12).clamp(MIN_YEAR as i64, MAX_YEAR as i64) as i32;
        let month0 = total.rem_euclid(12) as u32;

        let first = first_of_month(year, month0 + 1);
        let lead  = first.weekday().num_days_from_sunday() as u64;
        let start = first - Days::new(lead);

        let cells = std::array::from_fn(|i| CalendarDate(start + Days::new(i as u64)));
        Self { year, month0, cells }
    }

    pub fn year(&self)   -> i32 { self.year }
    pub fn month0(&self) -> u32 { self.month0 }
    pub fn month(&self)  -> u32 { self.month0 + 1 }

    pub fn cells(&self) -> &[CalendarDate] { &self.cells }

    pub fn rows(&self) -> impl Iterator<Item = &[CalendarDate]> {
        self.cells.chunks(GRID_COLS)
    }

    pub fn first(&self) -> CalendarDate { self.cells[0] }
    pub fn last(&self)  -> CalendarDate { self.cells[GRID_CELLS - 1] }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first().date() <= date && date <= self.last().date()
    }

    /// Position of `date` in the grid as `(row, col)`.
    pub fn position(&self, date: NaiveDate) -> Option<(usize, usize)> {
        if !self.contains(date) { return None; }
        let idx = (date - self.first().date()).num_days() as usize;
        Some((idx / GRID_COLS, idx % GRID_COLS))
    }

    pub fn in_target_month(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month0
    }

    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month()), self.year)
    }
}

/// Plain-text month view: title, weekday header, then six rows. Days of the
/// adjacent months are parenthesised.
impl fmt::Display for MonthGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = GRID_COLS * 4;
        writeln!(f, "{:^width$}", self.title())?;
        for abbr in WEEKDAY_ABBR {
            write!(f, " {abbr} ")?;
        }
        writeln!(f)?;
        for row in self.rows() {
            for cell in row {
                if self.in_target_month(cell.date()) {
                    write!(f, " {:2} ", cell.day())?;
                } else {
                    write!(f, "({:2})", cell.day())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn month_count(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = first_of_month(year, month);
    let next  = if month == 12 {
        first_of_month(year + 1, 1)
    } else {
        first_of_month(year, month + 1)
    };
    (next - first).num_days() as u32
}

/// Same day-of-month in `year`/`month`, clamped to the month's length.
pub fn clamp_day(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| first_of_month(year, month))
}

pub fn month_name(m: u32) -> &'static str {
    match m {
        1=>"January", 2=>"February", 3=>"March",    4=>"April",
        5=>"May",     6=>"June",     7=>"July",      8=>"August",
        9=>"September",10=>"October",11=>"November",12=>"December",
        _=>"???",
    }
}
