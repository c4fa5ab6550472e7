//! Depreciation schedules: straight-line, sum-of-years, declining balance and the French
//! accounting AMOR* functions.

use crate::date::{year_fraction, Basis, ExcelDateSystem};
use crate::error::{finite, ExcelError, ExcelResult};

/// Slack for float artifacts around whole numbers and period boundaries.
const ROUNDING_SLACK: f64 = 1e-12;
const DEFAULT_DDB_FACTOR: f64 = 2.0;

fn check_finite(values: &[f64]) -> ExcelResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ExcelError::Num)
    }
}

/// SLN
pub fn sln(cost: f64, salvage: f64, life: f64) -> ExcelResult<f64> {
    check_finite(&[cost, salvage, life])?;
    if life == 0.0 {
        return Err(ExcelError::Div0);
    }
    finite((cost - salvage) / life)
}

/// SYD
pub fn syd(cost: f64, salvage: f64, life: f64, per: f64) -> ExcelResult<f64> {
    check_finite(&[cost, salvage, life, per])?;
    if life <= 0.0 || per <= 0.0 || per > life {
        return Err(ExcelError::Num);
    }
    finite((cost - salvage) * (life - per + 1.0) * 2.0 / (life * (life + 1.0)))
}

/// DB: fixed-declining balance with the rate rounded to three decimals. `month` is the number
/// of months in the first year.
pub fn db(cost: f64, salvage: f64, life: f64, period: f64, month: Option<f64>) -> ExcelResult<f64> {
    let month = month.unwrap_or(12.0).trunc();
    check_finite(&[cost, salvage, life, period, month])?;
    let period = period.trunc();
    if cost < 0.0 || salvage < 0.0 || life <= 0.0 || period < 1.0 {
        return Err(ExcelError::Num);
    }
    if !(1.0..=12.0).contains(&month) {
        return Err(ExcelError::Num);
    }
    // A short first year pushes the tail into an extra period.
    let last_period = if month < 12.0 { life + 1.0 } else { life };
    if period > last_period {
        return Err(ExcelError::Num);
    }
    if cost == 0.0 {
        return Ok(0.0);
    }

    let rate = ((1.0 - (salvage / cost).powf(1.0 / life)) * 1000.0).round() / 1000.0;
    let first = cost * rate * month / 12.0;
    if period == 1.0 {
        return Ok(first);
    }

    let mut total = first;
    let mut current = 0.0;
    let mut p = 2.0;
    while p <= period {
        current = if p == life + 1.0 {
            (cost - total) * rate * (12.0 - month) / 12.0
        } else {
            (cost - total) * rate
        };
        total += current;
        p += 1.0;
    }
    finite(current)
}

/// Double-declining depreciation for a single whole period, never going below salvage.
fn declining_period(cost: f64, salvage: f64, life: f64, period: f64, factor: f64) -> f64 {
    let rate = factor / life;
    let (before, after) = if rate >= 1.0 {
        (if period == 1.0 { cost } else { 0.0 }, 0.0)
    } else {
        (
            cost * (1.0 - rate).powf(period - 1.0),
            cost * (1.0 - rate).powf(period),
        )
    };
    let amount = if after < salvage { before - salvage } else { before - after };
    amount.max(0.0)
}

/// DDB
pub fn ddb(cost: f64, salvage: f64, life: f64, period: f64, factor: Option<f64>) -> ExcelResult<f64> {
    let factor = factor.unwrap_or(DEFAULT_DDB_FACTOR);
    check_finite(&[cost, salvage, life, period, factor])?;
    if cost < 0.0 || salvage < 0.0 || life <= 0.0 || factor <= 0.0 {
        return Err(ExcelError::Num);
    }
    if period <= 0.0 || period > life {
        return Err(ExcelError::Num);
    }
    finite(declining_period(cost, salvage, life, period, factor))
}

/// Cumulative declining-balance depreciation over the first `periods` (possibly fractional)
/// periods, switching to straight-line once that is larger.
fn declining_with_switch(
    cost: f64,
    salvage: f64,
    life: f64,
    remaining_life: f64,
    periods: f64,
    factor: f64,
) -> f64 {
    let last = periods.ceil();
    let mut book_left = cost - salvage;
    let mut straight_line: Option<f64> = None;
    let mut total = 0.0;

    let mut i = 1.0;
    while i <= last {
        let mut term = match straight_line {
            Some(sl) => sl,
            None => {
                let declining = declining_period(cost, salvage, life, i, factor);
                let sl = book_left / (remaining_life - (i - 1.0));
                if sl > declining {
                    straight_line = Some(sl);
                    sl
                } else {
                    book_left -= declining;
                    declining
                }
            }
        };
        if i == last {
            term *= periods + 1.0 - last;
        }
        total += term;
        i += 1.0;
    }
    total
}

/// VDB: declining-balance depreciation between two (possibly fractional) period boundaries.
pub fn vdb(
    cost: f64,
    salvage: f64,
    life: f64,
    start: f64,
    end: f64,
    factor: Option<f64>,
    no_switch: bool,
) -> ExcelResult<f64> {
    let factor = factor.unwrap_or(DEFAULT_DDB_FACTOR);
    check_finite(&[cost, salvage, life, start, end, factor])?;
    if cost < 0.0 || salvage < 0.0 || life <= 0.0 || factor <= 0.0 {
        return Err(ExcelError::Num);
    }
    if start < 0.0 || end < start || end > life {
        return Err(ExcelError::Num);
    }

    let whole_start = start.floor();
    let whole_end = end.ceil();

    if no_switch {
        let mut total = 0.0;
        let mut i = whole_start + 1.0;
        while i <= whole_end {
            let mut term = declining_period(cost, salvage, life, i, factor);
            if i == whole_start + 1.0 {
                term *= end.min(whole_start + 1.0) - start;
            } else if i == whole_end {
                term *= end + 1.0 - whole_end;
            }
            total += term;
            i += 1.0;
        }
        return finite(total);
    }

    // Depreciation over `[from, from + 1)` given what was taken before `from`.
    let one_period_from = |from: f64| {
        let value = cost - declining_with_switch(cost, salvage, life, life, from, factor);
        declining_with_switch(value, salvage, life, life - from, 1.0, factor)
    };

    let mut partial = 0.0;
    if (start - whole_start).abs() > ROUNDING_SLACK {
        partial += (start - whole_start) * one_period_from(whole_start);
    }
    if (whole_end - end).abs() > ROUNDING_SLACK {
        partial += (whole_end - end) * one_period_from(whole_end - 1.0);
    }

    let value = cost - declining_with_switch(cost, salvage, life, life, whole_start, factor);
    let span = whole_end - whole_start;
    let whole = declining_with_switch(value, salvage, life, life - whole_start, span, factor);
    finite(whole - partial)
}

/// Rounds toward zero to a whole currency unit, forgiving float noise just below an integer.
fn truncate_amount(value: f64) -> f64 {
    if value.is_sign_negative() {
        (value - ROUNDING_SLACK).ceil()
    } else {
        (value + ROUNDING_SLACK).floor()
    }
}

/// AMORDEGRC's multiplier for an asset life in years.
fn degressive_coefficient(life_years: f64) -> f64 {
    match life_years {
        l if l < 3.0 => 1.0,
        l if l < 5.0 => 1.5,
        l if l <= 6.0 => 2.0,
        _ => 2.5,
    }
}

/// Period lengths shared by AMORLINC and AMORDEGRC. Period 0 runs from purchase to the end of
/// the first period; each later period is a year, and the last may be shortened so the total
/// equals the life implied by `rate`.
struct FrenchSchedule {
    cost: f64,
    salvage: f64,
    rate: f64,
    life_years: f64,
    first_years: f64,
    period: i32,
}

impl FrenchSchedule {
    #[allow(clippy::too_many_arguments)]
    fn new(
        cost: f64,
        date_purchased: i32,
        first_period: i32,
        salvage: f64,
        period: f64,
        rate: f64,
        basis: i32,
        system: ExcelDateSystem,
    ) -> ExcelResult<Self> {
        check_finite(&[cost, salvage, period, rate])?;
        if cost <= 0.0 || salvage < 0.0 || rate <= 0.0 || period < 0.0 {
            return Err(ExcelError::Num);
        }
        if date_purchased > first_period {
            return Err(ExcelError::Num);
        }
        let basis = Basis::from_code(basis)?;
        // Actual/360 is not a valid AMOR* basis.
        if basis == Basis::Actual360 {
            return Err(ExcelError::Num);
        }

        let first_years = year_fraction(date_purchased, first_period, basis, system)?;
        let life_years = 1.0 / rate;
        let remaining = life_years - first_years;
        let last_period = if remaining <= 0.0 {
            0.0
        } else {
            (remaining - ROUNDING_SLACK).ceil().max(0.0)
        };
        let period = period.trunc();
        if period > last_period {
            return Err(ExcelError::Num);
        }

        Ok(Self {
            cost,
            salvage,
            rate,
            life_years,
            first_years,
            period: period as i32,
        })
    }

    /// Walks the schedule, asking `regular` for each non-final period's raw amount given
    /// `(book_value, remaining_life, period_years)`, and returns the requested period's charge.
    fn charge_for(&self, mut regular: impl FnMut(f64, f64, f64) -> f64) -> ExcelResult<f64> {
        let mut remaining_life = self.life_years;
        let mut book_value = self.cost;

        for index in 0..=self.period {
            let nominal = if index == 0 { self.first_years } else { 1.0 };
            let years = nominal.min(remaining_life);
            let headroom = book_value - self.salvage;

            let charge = if headroom <= 0.0 {
                0.0
            } else if (remaining_life - years).abs() <= ROUNDING_SLACK {
                headroom
            } else {
                truncate_amount(regular(book_value, remaining_life, years)).clamp(0.0, headroom)
            };

            if index == self.period {
                return finite(charge);
            }
            book_value -= charge;
            remaining_life -= years;
        }
        Err(ExcelError::Num)
    }
}

/// AMORLINC: linear depreciation with a prorated first period.
#[allow(clippy::too_many_arguments)]
pub fn amorlinc(
    cost: f64,
    date_purchased: i32,
    first_period: i32,
    salvage: f64,
    period: f64,
    rate: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let schedule = FrenchSchedule::new(
        cost,
        date_purchased,
        first_period,
        salvage,
        period,
        rate,
        basis,
        system,
    )?;
    let annual = schedule.cost * schedule.rate;
    schedule.charge_for(|_, _, years| annual * years)
}

/// AMORDEGRC: degressive depreciation that falls back to linear once that is larger.
#[allow(clippy::too_many_arguments)]
pub fn amordegrc(
    cost: f64,
    date_purchased: i32,
    first_period: i32,
    salvage: f64,
    period: f64,
    rate: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let schedule = FrenchSchedule::new(
        cost,
        date_purchased,
        first_period,
        salvage,
        period,
        rate,
        basis,
        system,
    )?;
    let degressive_rate = schedule.rate * degressive_coefficient(schedule.life_years);
    let mut linear = false;
    schedule.charge_for(|book_value, remaining_life, years| {
        if !linear && degressive_rate <= 1.0 / remaining_life {
            linear = true;
        }
        if linear {
            book_value / remaining_life * years
        } else {
            book_value * degressive_rate * years
        }
    })
}
