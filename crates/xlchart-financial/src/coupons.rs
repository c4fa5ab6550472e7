//! Coupon calendars and the COUP* family.
//!
//! Regular coupon dates are generated backwards from maturity in whole periods. When maturity is
//! the last day of its month every coupon date is pinned to month-end, so a 30 April maturity pays
//! on 31 January and 31 October as well.

use crate::date::{add_months, day_number, days_in_month, months_apart, serial_to_ymd, ymd_to_serial};
use crate::date::{Basis, ExcelDate, ExcelDateSystem};
use crate::error::{ExcelError, ExcelResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Annual,
    SemiAnnual,
    Quarterly,
}

impl Frequency {
    pub fn from_code(code: i32) -> ExcelResult<Self> {
        match code {
            1 => Ok(Frequency::Annual),
            2 => Ok(Frequency::SemiAnnual),
            4 => Ok(Frequency::Quarterly),
            _ => Err(ExcelError::Num),
        }
    }

    pub fn per_year(self) -> i32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
        }
    }

    fn months(self) -> i32 {
        12 / self.per_year()
    }
}

/// Coupon dates a whole number of periods away from an anchor date.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CouponCalendar {
    anchor: ExcelDate,
    months: i32,
    month_end: bool,
    system: ExcelDateSystem,
}

impl CouponCalendar {
    pub(crate) fn new(anchor: i32, frequency: Frequency, system: ExcelDateSystem) -> ExcelResult<Self> {
        let anchor = serial_to_ymd(anchor, system)?;
        Ok(Self {
            anchor,
            months: frequency.months(),
            month_end: anchor.is_month_end(system),
            system,
        })
    }

    /// Each date is computed from the anchor directly; stepping one period at a time would let
    /// day-of-month clamping drift.
    fn date(&self, periods: i32) -> ExcelResult<ExcelDate> {
        let months = periods.checked_mul(self.months).ok_or(ExcelError::Num)?;
        let mut date = add_months(self.anchor, months, self.system)?;
        if self.month_end {
            date.day = days_in_month(date.year, date.month, self.system);
        }
        Ok(date)
    }

    fn day(&self, periods: i32) -> ExcelResult<i64> {
        day_number(self.date(periods)?, self.system)
    }

    pub(crate) fn serial(&self, periods: i32) -> ExcelResult<i32> {
        ymd_to_serial(self.date(periods)?, self.system)
    }

    /// Largest period index whose date is on or before `serial`.
    pub(crate) fn floor_index(&self, serial: i32) -> ExcelResult<i32> {
        let target = serial_to_ymd(serial, self.system)?;
        let estimate = months_apart(self.anchor, target).div_euclid(i64::from(self.months));
        let mut index = i32::try_from(estimate).map_err(|_| ExcelError::Num)?;
        let day = i64::from(serial);
        while self.day(index)? > day {
            index -= 1;
        }
        while self.day(index + 1)? <= day {
            index += 1;
        }
        Ok(index)
    }
}

/// Where a settlement date falls within a bond's regular coupon schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CouponPosition {
    pub settlement: i32,
    pub previous: i32,
    pub next: i32,
    /// Coupons payable from `next` through maturity.
    pub remaining: i32,
    pub frequency: Frequency,
    pub basis: Basis,
    pub system: ExcelDateSystem,
}

impl CouponPosition {
    pub(crate) fn locate(
        settlement: i32,
        maturity: i32,
        frequency: i32,
        basis: i32,
        system: ExcelDateSystem,
    ) -> ExcelResult<Self> {
        let frequency = Frequency::from_code(frequency)?;
        let basis = Basis::from_code(basis)?;
        if settlement >= maturity {
            return Err(ExcelError::Num);
        }

        let calendar = CouponCalendar::new(maturity, frequency, system)?;
        // Index is zero at maturity and negative before it.
        let index = calendar.floor_index(settlement)?;
        Ok(Self {
            settlement,
            previous: calendar.serial(index)?,
            next: calendar.serial(index + 1)?,
            remaining: -index,
            frequency,
            basis,
            system,
        })
    }

    /// Days from the previous coupon to settlement.
    pub(crate) fn accrued_days(&self) -> ExcelResult<f64> {
        Ok(self.basis.day_count(self.previous, self.settlement, self.system)? as f64)
    }

    /// Days in the coupon period containing settlement.
    pub(crate) fn period_days(&self) -> f64 {
        period_length(self.basis, self.frequency, self.previous, self.next)
    }

    /// Days from settlement to the next coupon.
    pub(crate) fn days_to_next(&self) -> ExcelResult<f64> {
        if self.basis.is_thirty_360() {
            Ok(self.period_days() - self.accrued_days()?)
        } else {
            Ok(f64::from(self.next) - f64::from(self.settlement))
        }
    }
}

/// Nominal length of a coupon period under `basis`.
pub(crate) fn period_length(basis: Basis, frequency: Frequency, previous: i32, next: i32) -> f64 {
    let per_year = f64::from(frequency.per_year());
    match basis {
        Basis::ActualActual => f64::from(next) - f64::from(previous),
        Basis::Actual365 => 365.0 / per_year,
        Basis::Us30_360 | Basis::Actual360 | Basis::European30_360 => 360.0 / per_year,
    }
}

/// COUPDAYBS
pub fn coupdaybs(
    settlement: i32,
    maturity: i32,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    CouponPosition::locate(settlement, maturity, frequency, basis, system)?.accrued_days()
}

/// COUPDAYS
pub fn coupdays(
    settlement: i32,
    maturity: i32,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    Ok(CouponPosition::locate(settlement, maturity, frequency, basis, system)?.period_days())
}

/// COUPDAYSNC
pub fn coupdaysnc(
    settlement: i32,
    maturity: i32,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    CouponPosition::locate(settlement, maturity, frequency, basis, system)?.days_to_next()
}

/// COUPNCD
pub fn coupncd(
    settlement: i32,
    maturity: i32,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<i32> {
    Ok(CouponPosition::locate(settlement, maturity, frequency, basis, system)?.next)
}

/// COUPPCD
pub fn couppcd(
    settlement: i32,
    maturity: i32,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<i32> {
    Ok(CouponPosition::locate(settlement, maturity, frequency, basis, system)?.previous)
}

/// COUPNUM
pub fn coupnum(
    settlement: i32,
    maturity: i32,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<i32> {
    Ok(CouponPosition::locate(settlement, maturity, frequency, basis, system)?.remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SYS: ExcelDateSystem = ExcelDateSystem::EXCEL_1900;

    fn serial(y: i32, m: u8, d: u8) -> i32 {
        ymd_to_serial(ExcelDate::new(y, m, d), SYS).expect("date")
    }

    #[test]
    fn calendar_keeps_day_without_drift() {
        let calendar =
            CouponCalendar::new(serial(2025, 8, 31), Frequency::SemiAnnual, SYS).expect("calendar");
        assert_eq!(calendar.serial(-1), Ok(serial(2025, 2, 28)));
        assert_eq!(calendar.serial(-2), Ok(serial(2024, 8, 31)));
        assert_eq!(calendar.serial(-3), Ok(serial(2024, 2, 29)));
    }

    #[test]
    fn settlement_on_coupon_date_starts_a_period() {
        let pos =
            CouponPosition::locate(serial(2024, 7, 1), serial(2025, 1, 1), 2, 0, SYS).expect("locate");
        assert_eq!(pos.previous, serial(2024, 7, 1));
        assert_eq!(pos.next, serial(2025, 1, 1));
        assert_eq!(pos.remaining, 1);
        assert_eq!(pos.accrued_days(), Ok(0.0));
    }

    #[test]
    fn frequency_codes() {
        assert_eq!(Frequency::from_code(4), Ok(Frequency::Quarterly));
        assert_eq!(Frequency::from_code(3), Err(ExcelError::Num));
    }
}
