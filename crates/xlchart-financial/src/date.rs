//! Spreadsheet date serials and day-count conventions.
//!
//! A serial is a day number relative to the workbook's epoch. The 1900 system optionally keeps the
//! Lotus 1-2-3 leap-year bug, where serial 60 is the nonexistent 1900-02-29.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{ExcelError, ExcelResult};

const MAX_YEAR: i32 = 9999;
const LOTUS_LEAP_DAY: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExcelDateSystem {
    /// Serial 1 is 1900-01-01.
    Excel1900 { lotus_compat: bool },
    /// Serial 0 is 1904-01-01.
    Excel1904,
}

impl ExcelDateSystem {
    /// The system Excel uses for new workbooks on every platform.
    pub const EXCEL_1900: Self = ExcelDateSystem::Excel1900 { lotus_compat: true };

    fn first_year(self) -> i32 {
        match self {
            ExcelDateSystem::Excel1900 { .. } => 1900,
            ExcelDateSystem::Excel1904 => 1904,
        }
    }

    fn lotus(self) -> bool {
        matches!(self, ExcelDateSystem::Excel1900 { lotus_compat: true })
    }
}

impl Default for ExcelDateSystem {
    fn default() -> Self {
        Self::EXCEL_1900
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExcelDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl ExcelDate {
    pub const fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    pub fn is_month_end(self, system: ExcelDateSystem) -> bool {
        self.day == days_in_month(self.year, self.month, system)
    }

    fn from_naive(date: NaiveDate) -> Self {
        // chrono months and days always fit in a u8.
        Self::new(date.year(), date.month() as u8, date.day() as u8)
    }

    fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month), u32::from(self.day))
    }
}

fn is_leap_year(year: i32, system: ExcelDateSystem) -> bool {
    if year == 1900 && system.lotus() {
        return true;
    }
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Month length, counting the phantom 1900-02-29 when the system keeps it.
pub fn days_in_month(year: i32, month: u8, system: ExcelDateSystem) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year, system) => 29,
        2 => 28,
        _ => 0,
    }
}

fn epoch(system: ExcelDateSystem) -> ExcelResult<NaiveDate> {
    let (y, m, d) = match system {
        ExcelDateSystem::Excel1900 { .. } => (1899, 12, 31),
        ExcelDateSystem::Excel1904 => (1904, 1, 1),
    };
    NaiveDate::from_ymd_opt(y, m, d).ok_or(ExcelError::Num)
}

/// Day number without the workbook range check. Used for day counts that may step one period
/// past the last representable year.
pub(crate) fn day_number(date: ExcelDate, system: ExcelDateSystem) -> ExcelResult<i64> {
    if !(1..=12).contains(&date.month)
        || date.day == 0
        || date.day > days_in_month(date.year, date.month, system)
    {
        return Err(ExcelError::Num);
    }
    if system.lotus() && date.year == 1900 && date.month == 2 && date.day == 29 {
        return Ok(LOTUS_LEAP_DAY);
    }

    let naive = date.to_naive().ok_or(ExcelError::Num)?;
    let mut serial = naive.signed_duration_since(epoch(system)?).num_days();
    if system.lotus() && serial >= LOTUS_LEAP_DAY {
        serial += 1;
    }
    Ok(serial)
}

pub fn ymd_to_serial(date: ExcelDate, system: ExcelDateSystem) -> ExcelResult<i32> {
    if date.year < system.first_year() || date.year > MAX_YEAR {
        return Err(ExcelError::Num);
    }
    let serial = day_number(date, system)?;
    i32::try_from(serial).map_err(|_| ExcelError::Num)
}

pub fn serial_to_ymd(serial: i32, system: ExcelDateSystem) -> ExcelResult<ExcelDate> {
    let min = match system {
        ExcelDateSystem::Excel1900 { .. } => 1,
        ExcelDateSystem::Excel1904 => 0,
    };
    if serial < min {
        return Err(ExcelError::Num);
    }

    let mut offset = i64::from(serial);
    if system.lotus() {
        if offset == LOTUS_LEAP_DAY {
            return Ok(ExcelDate::new(1900, 2, 29));
        }
        if offset > LOTUS_LEAP_DAY {
            offset -= 1;
        }
    }

    // `offset` is non-negative here.
    let naive = epoch(system)?
        .checked_add_days(Days::new(offset as u64))
        .ok_or(ExcelError::Num)?;
    if naive.year() > MAX_YEAR {
        return Err(ExcelError::Num);
    }
    Ok(ExcelDate::from_naive(naive))
}

/// Moves `date` by whole months, clamping the day to the target month's length.
pub(crate) fn add_months(date: ExcelDate, months: i32, system: ExcelDateSystem) -> ExcelResult<ExcelDate> {
    let index = i64::from(date.year) * 12 + i64::from(date.month) - 1 + i64::from(months);
    let year = i32::try_from(index.div_euclid(12)).map_err(|_| ExcelError::Num)?;
    let month = (index.rem_euclid(12) + 1) as u8;
    let day = date.day.min(days_in_month(year, month, system));
    Ok(ExcelDate::new(year, month, day))
}

/// EDATE: the same day `months` months away.
pub fn edate(start: i32, months: i32, system: ExcelDateSystem) -> ExcelResult<i32> {
    let date = serial_to_ymd(start, system)?;
    ymd_to_serial(add_months(date, months, system)?, system)
}

/// EOMONTH: the last day of the month `months` months away.
pub fn eomonth(start: i32, months: i32, system: ExcelDateSystem) -> ExcelResult<i32> {
    let date = serial_to_ymd(start, system)?;
    let mut target = add_months(ExcelDate::new(date.year, date.month, 1), months, system)?;
    target.day = days_in_month(target.year, target.month, system);
    ymd_to_serial(target, system)
}

pub(crate) fn months_apart(start: ExcelDate, end: ExcelDate) -> i64 {
    (i64::from(end.year) - i64::from(start.year)) * 12 + i64::from(end.month) - i64::from(start.month)
}

fn thirty_day_count(start: ExcelDate, start_day: u8, end: ExcelDate, end_day: u8) -> i64 {
    months_apart(start, end) * 30 + i64::from(end_day) - i64::from(start_day)
}

/// DAYS360.
///
/// The US method moves a month-end start to the 30th. A month-end end date rolls to the first of
/// the following month when the adjusted start is before the 30th, otherwise it becomes the 30th.
/// The European method only caps the 31st at 30.
pub fn days360(start: i32, end: i32, european: bool, system: ExcelDateSystem) -> ExcelResult<i64> {
    let s = serial_to_ymd(start, system)?;
    let e = serial_to_ymd(end, system)?;
    if european {
        return Ok(european_30_360(s, e));
    }

    let start_day = if s.is_month_end(system) { 30 } else { s.day };
    if e.is_month_end(system) {
        if start_day < 30 {
            let rolled = add_months(ExcelDate::new(e.year, e.month, 1), 1, system)?;
            return Ok(thirty_day_count(s, start_day, rolled, 1));
        }
        return Ok(thirty_day_count(s, start_day, e, 30));
    }
    Ok(thirty_day_count(s, start_day, e, e.day))
}

fn european_30_360(s: ExcelDate, e: ExcelDate) -> i64 {
    thirty_day_count(s, s.day.min(30), e, e.day.min(30))
}

/// The NASD 30/360 count used by basis 0 of YEARFRAC and the coupon functions.
fn nasd_30_360(s: ExcelDate, e: ExcelDate, system: ExcelDateSystem) -> i64 {
    let last_of_feb = |d: ExcelDate| d.month == 2 && d.is_month_end(system);
    let (mut d1, mut d2) = (s.day, e.day);
    if d1 == 31 && d2 == 31 {
        d1 = 30;
        d2 = 30;
    } else if d1 == 31 {
        d1 = 30;
    } else if d1 == 30 && d2 == 31 {
        d2 = 30;
    } else if last_of_feb(s) && last_of_feb(e) {
        d1 = 30;
        d2 = 30;
    } else if last_of_feb(s) {
        d1 = 30;
    }
    thirty_day_count(s, d1, e, d2)
}

/// Day-count convention selected by a `basis` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Basis {
    /// 0: US (NASD) 30/360.
    Us30_360,
    /// 1: actual/actual.
    ActualActual,
    /// 2: actual/360.
    Actual360,
    /// 3: actual/365.
    Actual365,
    /// 4: European 30/360.
    European30_360,
}

impl Basis {
    pub fn from_code(code: i32) -> ExcelResult<Self> {
        match code {
            0 => Ok(Basis::Us30_360),
            1 => Ok(Basis::ActualActual),
            2 => Ok(Basis::Actual360),
            3 => Ok(Basis::Actual365),
            4 => Ok(Basis::European30_360),
            _ => Err(ExcelError::Num),
        }
    }

    pub fn is_thirty_360(self) -> bool {
        matches!(self, Basis::Us30_360 | Basis::European30_360)
    }

    /// Days from `start` to `end` under this convention.
    pub(crate) fn day_count(self, start: i32, end: i32, system: ExcelDateSystem) -> ExcelResult<i64> {
        match self {
            Basis::Us30_360 => Ok(nasd_30_360(
                serial_to_ymd(start, system)?,
                serial_to_ymd(end, system)?,
                system,
            )),
            Basis::European30_360 => Ok(european_30_360(
                serial_to_ymd(start, system)?,
                serial_to_ymd(end, system)?,
            )),
            _ => Ok(i64::from(end) - i64::from(start)),
        }
    }
}

/// YEARFRAC. Reversed arguments produce the negated fraction.
pub fn yearfrac(start: i32, end: i32, basis: i32, system: ExcelDateSystem) -> ExcelResult<f64> {
    year_fraction(start, end, Basis::from_code(basis)?, system)
}

pub(crate) fn year_fraction(start: i32, end: i32, basis: Basis, system: ExcelDateSystem) -> ExcelResult<f64> {
    if start > end {
        return yearfrac_ordered(end, start, basis, system).map(|f| -f);
    }
    yearfrac_ordered(start, end, basis, system)
}

fn yearfrac_ordered(start: i32, end: i32, basis: Basis, system: ExcelDateSystem) -> ExcelResult<f64> {
    let days = basis.day_count(start, end, system)? as f64;
    match basis {
        Basis::Us30_360 | Basis::European30_360 | Basis::Actual360 => Ok(days / 360.0),
        Basis::Actual365 => Ok(days / 365.0),
        Basis::ActualActual => actual_actual(start, end, system),
    }
}

fn anniversary(start: ExcelDate, years: i32, system: ExcelDateSystem) -> ExcelDate {
    let year = start.year + years;
    let day = start.day.min(days_in_month(year, start.month, system));
    ExcelDate::new(year, start.month, day)
}

/// Whole years by anniversary, plus the remainder over the length of the year that contains it.
fn actual_actual(start: i32, end: i32, system: ExcelDateSystem) -> ExcelResult<f64> {
    let s = serial_to_ymd(start, system)?;
    let e = serial_to_ymd(end, system)?;
    let end_day = i64::from(end);

    let mut years = e.year - s.year;
    while years > 0 && day_number(anniversary(s, years, system), system)? > end_day {
        years -= 1;
    }

    let anchor = day_number(anniversary(s, years, system), system)?;
    let next = day_number(anniversary(s, years + 1, system), system)?;
    let year_len = (next - anchor) as f64;
    Ok(f64::from(years) + (end_day - anchor) as f64 / year_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SYS: ExcelDateSystem = ExcelDateSystem::EXCEL_1900;

    fn serial(y: i32, m: u8, d: u8) -> i32 {
        ymd_to_serial(ExcelDate::new(y, m, d), SYS).expect("valid date")
    }

    #[test]
    fn lotus_leap_day_occupies_serial_60() {
        assert_eq!(serial(1900, 1, 1), 1);
        assert_eq!(serial(1900, 2, 28), 59);
        assert_eq!(serial(1900, 2, 29), 60);
        assert_eq!(serial(1900, 3, 1), 61);
        assert_eq!(serial(2020, 1, 1), 43831);
        assert_eq!(serial_to_ymd(60, SYS), Ok(ExcelDate::new(1900, 2, 29)));
        assert_eq!(serial_to_ymd(61, SYS), Ok(ExcelDate::new(1900, 3, 1)));
    }

    #[test]
    fn strict_1900_has_no_phantom_day() {
        let strict = ExcelDateSystem::Excel1900 { lotus_compat: false };
        assert_eq!(ymd_to_serial(ExcelDate::new(1900, 2, 29), strict), Err(ExcelError::Num));
        assert_eq!(ymd_to_serial(ExcelDate::new(1900, 3, 1), strict), Ok(60));
    }

    #[test]
    fn system_1904_starts_at_zero() {
        let sys = ExcelDateSystem::Excel1904;
        assert_eq!(ymd_to_serial(ExcelDate::new(1904, 1, 1), sys), Ok(0));
        assert_eq!(ymd_to_serial(ExcelDate::new(1903, 12, 31), sys), Err(ExcelError::Num));
        assert_eq!(serial_to_ymd(366, sys), Ok(ExcelDate::new(1905, 1, 1)));
    }

    #[test]
    fn out_of_range_serials_are_num() {
        assert_eq!(serial_to_ymd(0, SYS), Err(ExcelError::Num));
        assert_eq!(serial_to_ymd(2_958_466, SYS), Err(ExcelError::Num));
        assert_eq!(serial_to_ymd(2_958_465, SYS), Ok(ExcelDate::new(9999, 12, 31)));
    }

    #[test]
    fn edate_clamps_and_eomonth_pins() {
        assert_eq!(edate(serial(2020, 1, 31), 1, SYS), Ok(serial(2020, 2, 29)));
        assert_eq!(edate(serial(2020, 3, 31), -13, SYS), Ok(serial(2019, 2, 28)));
        assert_eq!(eomonth(serial(2020, 1, 15), 1, SYS), Ok(serial(2020, 2, 29)));
        assert_eq!(eomonth(serial(2020, 1, 15), -1, SYS), Ok(serial(2019, 12, 31)));
    }

    #[test]
    fn basis_codes() {
        assert_eq!(Basis::from_code(4), Ok(Basis::European30_360));
        assert_eq!(Basis::from_code(5), Err(ExcelError::Num));
        assert_eq!(Basis::from_code(-1), Err(ExcelError::Num));
    }
}
