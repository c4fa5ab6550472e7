//! Coupon bonds: price, yield, duration and accrued interest.

use crate::coupons::{period_length, CouponCalendar, CouponPosition, Frequency};
use crate::date::{yearfrac, Basis, ExcelDateSystem};
use crate::error::{finite, ExcelError, ExcelResult};
use crate::iterative::newton_raphson;

const YIELD_MAX_ITERATIONS: usize = 100;
const YIELD_GUESS: f64 = 0.05;

fn non_negative(value: f64) -> ExcelResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ExcelError::Num)
    }
}

fn positive(value: f64) -> ExcelResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ExcelError::Num)
    }
}

/// Remaining cash flows per 100 of face value, timed in coupon periods from settlement.
#[derive(Debug, Clone, Copy)]
struct BondFlows {
    coupon: f64,
    redemption: f64,
    per_year: f64,
    remaining: i32,
    /// Fraction of the current period already elapsed.
    accrued: f64,
    /// Fraction of the current period left until the next coupon.
    to_next: f64,
}

impl BondFlows {
    fn new(position: &CouponPosition, rate: f64, redemption: f64) -> ExcelResult<Self> {
        let per_year = f64::from(position.frequency.per_year());
        let period = position.period_days();
        if period <= 0.0 {
            return Err(ExcelError::Num);
        }
        Ok(Self {
            coupon: 100.0 * rate / per_year,
            redemption,
            per_year,
            remaining: position.remaining,
            accrued: position.accrued_days()? / period,
            to_next: position.days_to_next()? / period,
        })
    }

    /// `(time in periods, amount)` for each payment.
    fn payments(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (1..=self.remaining).map(move |k| {
            let amount = if k == self.remaining {
                self.coupon + self.redemption
            } else {
                self.coupon
            };
            (f64::from(k - 1) + self.to_next, amount)
        })
    }

    fn accrued_interest(&self) -> f64 {
        self.accrued * self.coupon
    }

    /// Clean price at `yld`. A bond in its final period is discounted with simple interest.
    fn price(&self, yld: f64) -> Option<f64> {
        let base = 1.0 + yld / self.per_year;
        if base <= 0.0 {
            return None;
        }
        let dirty = if self.remaining == 1 {
            (self.coupon + self.redemption) / (1.0 + self.to_next * yld / self.per_year)
        } else {
            self.payments().map(|(t, cf)| cf / base.powf(t)).sum()
        };
        let clean = dirty - self.accrued_interest();
        clean.is_finite().then_some(clean)
    }

    fn price_slope(&self, yld: f64) -> Option<f64> {
        let base = 1.0 + yld / self.per_year;
        if base <= 0.0 {
            return None;
        }
        let slope = if self.remaining == 1 {
            let denom = 1.0 + self.to_next * yld / self.per_year;
            -(self.coupon + self.redemption) * (self.to_next / self.per_year) / (denom * denom)
        } else {
            self.payments()
                .map(|(t, cf)| -t / self.per_year * cf / base.powf(t + 1.0))
                .sum()
        };
        slope.is_finite().then_some(slope)
    }

    /// Macaulay duration in years.
    fn duration(&self, yld: f64) -> ExcelResult<f64> {
        let base = 1.0 + yld / self.per_year;
        if base <= 0.0 {
            return Err(ExcelError::Num);
        }
        let (weighted, value) = self.payments().fold((0.0, 0.0), |(weighted, value), (t, cf)| {
            let discounted = cf / base.powf(t);
            (weighted + t * discounted, value + discounted)
        });
        if value == 0.0 {
            return Err(ExcelError::Div0);
        }
        finite(weighted / value / self.per_year)
    }
}

/// PRICE per 100 face value.
#[allow(clippy::too_many_arguments)]
pub fn price(
    settlement: i32,
    maturity: i32,
    rate: f64,
    yld: f64,
    redemption: f64,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let rate = non_negative(rate)?;
    let yld = non_negative(yld)?;
    let redemption = positive(redemption)?;
    let position = CouponPosition::locate(settlement, maturity, frequency, basis, system)?;
    BondFlows::new(&position, rate, redemption)?
        .price(yld)
        .ok_or(ExcelError::Num)
}

/// YIELD. Closed form in the final coupon period, Newton-Raphson on the price otherwise.
#[allow(clippy::too_many_arguments)]
pub fn yield_rate(
    settlement: i32,
    maturity: i32,
    rate: f64,
    pr: f64,
    redemption: f64,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let rate = non_negative(rate)?;
    let pr = positive(pr)?;
    let redemption = positive(redemption)?;
    let position = CouponPosition::locate(settlement, maturity, frequency, basis, system)?;
    let flows = BondFlows::new(&position, rate, redemption)?;

    if flows.remaining == 1 {
        if flows.to_next == 0.0 {
            return Err(ExcelError::Div0);
        }
        let invested = pr + flows.accrued_interest();
        let returned = flows.redemption + flows.coupon;
        return finite((returned - invested) / invested * flows.per_year / flows.to_next);
    }

    newton_raphson(
        YIELD_GUESS,
        YIELD_MAX_ITERATIONS,
        |y| flows.price(y).map(|p| p - pr),
        |y| flows.price_slope(y),
    )
    .ok_or(ExcelError::Num)
}

/// DURATION (Macaulay) per 100 face value.
pub fn duration(
    settlement: i32,
    maturity: i32,
    coupon: f64,
    yld: f64,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let coupon = non_negative(coupon)?;
    let yld = non_negative(yld)?;
    let position = CouponPosition::locate(settlement, maturity, frequency, basis, system)?;
    BondFlows::new(&position, coupon, 100.0)?.duration(yld)
}

/// MDURATION: Macaulay duration divided by `1 + yld / frequency`.
pub fn mduration(
    settlement: i32,
    maturity: i32,
    coupon: f64,
    yld: f64,
    frequency: i32,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let macaulay = duration(settlement, maturity, coupon, yld, frequency, basis, system)?;
    let per_year = f64::from(Frequency::from_code(frequency)?.per_year());
    finite(macaulay / (1.0 + yld / per_year))
}

/// ACCRINTM: interest accrued on a security that pays at maturity.
pub fn accrintm(
    issue: i32,
    settlement: i32,
    rate: f64,
    par: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    if issue >= settlement {
        return Err(ExcelError::Num);
    }
    let rate = non_negative(rate)?;
    let par = positive(par)?;
    finite(par * rate * yearfrac(issue, settlement, basis, system)?)
}

/// ACCRINT: interest accrued on a periodic-coupon security.
///
/// The schedule is anchored at `first_interest`. Before the first coupon, `calc_method` picks
/// whether accrual starts at `issue` (false) or at the notional previous coupon (true); after it,
/// accrual always runs from the last coupon paid.
#[allow(clippy::too_many_arguments)]
pub fn accrint(
    issue: i32,
    first_interest: i32,
    settlement: i32,
    rate: f64,
    par: f64,
    frequency: i32,
    basis: i32,
    calc_method: bool,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    if issue >= settlement || issue >= first_interest {
        return Err(ExcelError::Num);
    }
    let rate = non_negative(rate)?;
    let par = positive(par)?;
    let basis = Basis::from_code(basis)?;
    let frequency = Frequency::from_code(frequency)?;

    let calendar = CouponCalendar::new(first_interest, frequency, system)?;
    let index = if settlement < first_interest {
        -1
    } else {
        calendar.floor_index(settlement)?
    };
    let previous = calendar.serial(index)?;
    let next = calendar.serial(index + 1)?;

    let accrual_start = if settlement < first_interest && !calc_method {
        issue
    } else {
        previous
    };
    let accrued = basis.day_count(accrual_start, settlement, system)?;
    if accrued < 0 {
        return Err(ExcelError::Num);
    }
    let period = period_length(basis, frequency, previous, next);
    if period <= 0.0 {
        return Err(ExcelError::Num);
    }

    let coupon = par * rate / f64::from(frequency.per_year());
    finite(coupon * accrued as f64 / period)
}
