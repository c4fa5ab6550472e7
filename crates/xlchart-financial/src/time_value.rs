//! Time value of money: annuities, loan schedules and growth periods.
//!
//! Sign convention follows Excel: cash paid out is negative, cash received is positive, so
//! `pv + pmt * annuity + fv * discount == 0` for a balanced schedule.

use crate::error::{finite, ExcelError, ExcelResult};
use crate::iterative::{newton_raphson, EXCEL_ITERATION_TOLERANCE};

const RATE_MAX_ITERATIONS: usize = 20;
const RATE_DEFAULT_GUESS: f64 = 0.1;

/// When payments fall within each period (Excel's `type` argument).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaymentTiming {
    #[default]
    End,
    Begin,
}

impl PaymentTiming {
    /// Zero means end of period. Any other value means beginning.
    pub fn from_type(value: f64) -> Self {
        if value == 0.0 {
            PaymentTiming::End
        } else {
            PaymentTiming::Begin
        }
    }

    /// Only accepts exactly 0 or 1, as the cumulative functions do.
    pub fn from_strict_type(value: f64) -> ExcelResult<Self> {
        match value {
            v if v == 0.0 => Ok(PaymentTiming::End),
            v if v == 1.0 => Ok(PaymentTiming::Begin),
            _ => Err(ExcelError::Num),
        }
    }

    fn offset(self) -> f64 {
        match self {
            PaymentTiming::End => 0.0,
            PaymentTiming::Begin => 1.0,
        }
    }
}

/// `(1 + rate)^nper` alongside `(1 + rate)^nper - 1`, the latter kept accurate for small rates.
#[derive(Debug, Clone, Copy)]
struct Growth {
    factor: f64,
    excess: f64,
}

impl Growth {
    fn new(rate: f64, nper: f64) -> Option<Self> {
        let log_base = rate.ln_1p();
        if !log_base.is_finite() {
            return None;
        }
        let excess = (nper * log_base).exp_m1();
        let factor = excess + 1.0;
        (factor.is_finite() && excess.is_finite()).then_some(Self { factor, excess })
    }

    /// Value at the horizon of one unit paid each period.
    fn annuity(self, rate: f64, timing: PaymentTiming) -> f64 {
        (1.0 + rate * timing.offset()) * self.excess / rate
    }
}

pub fn pv(rate: f64, nper: f64, pmt: f64, fv: f64, timing: PaymentTiming) -> ExcelResult<f64> {
    if rate == 0.0 {
        return Ok(-fv - pmt * nper);
    }
    if rate == -1.0 && nper != 0.0 {
        return Err(ExcelError::Div0);
    }
    let growth = Growth::new(rate, nper).ok_or(ExcelError::Num)?;
    if growth.factor == 0.0 {
        return Err(ExcelError::Div0);
    }
    finite(-(fv + pmt * growth.annuity(rate, timing)) / growth.factor)
}

pub fn fv(rate: f64, nper: f64, pmt: f64, pv: f64, timing: PaymentTiming) -> ExcelResult<f64> {
    if rate == 0.0 {
        return Ok(-(pv + pmt * nper));
    }
    let growth = Growth::new(rate, nper).ok_or(ExcelError::Num)?;
    finite(-(pv * growth.factor + pmt * growth.annuity(rate, timing)))
}

pub fn pmt(rate: f64, nper: f64, pv: f64, fv: f64, timing: PaymentTiming) -> ExcelResult<f64> {
    if nper == 0.0 {
        return Err(ExcelError::Div0);
    }
    if rate == 0.0 {
        return Ok(-(pv + fv) / nper);
    }
    let growth = Growth::new(rate, nper).ok_or(ExcelError::Num)?;
    let annuity = growth.annuity(rate, timing);
    if annuity == 0.0 {
        return Err(ExcelError::Div0);
    }
    finite(-(pv * growth.factor + fv) / annuity)
}

pub fn nper(rate: f64, pmt: f64, pv: f64, fv: f64, timing: PaymentTiming) -> ExcelResult<f64> {
    if rate == 0.0 {
        if pmt == 0.0 {
            return if pv + fv == 0.0 { Ok(0.0) } else { Err(ExcelError::Num) };
        }
        return Ok(-(pv + fv) / pmt);
    }

    let log_base = rate.ln_1p();
    if !log_base.is_finite() || log_base == 0.0 {
        return Err(ExcelError::Num);
    }

    // Solve pv*g + k*(g - 1) + fv = 0 for g = (1 + rate)^n, with k the payment's annuity weight.
    let k = pmt * (1.0 + rate * timing.offset()) / rate;
    if pv + k == 0.0 {
        return Err(ExcelError::Num);
    }
    let g = (k - fv) / (pv + k);
    if g <= 0.0 {
        return Err(ExcelError::Num);
    }
    finite(g.ln() / log_base)
}

/// Periodic rate solving the annuity equation, by Newton-Raphson from `guess` (10% when `None`).
pub fn rate(
    nper: f64,
    pmt: f64,
    pv: f64,
    fv: f64,
    timing: PaymentTiming,
    guess: Option<f64>,
) -> ExcelResult<f64> {
    let guess = guess.unwrap_or(RATE_DEFAULT_GUESS);
    if nper <= 0.0 || guess <= -1.0 {
        return Err(ExcelError::Num);
    }
    let balance = AnnuityBalance { nper, pmt, pv, fv, timing };
    newton_raphson(guess, RATE_MAX_ITERATIONS, |r| balance.at(r), |r| balance.slope(r))
        .ok_or(ExcelError::Num)
}

/// The residual `pv*g + pmt*annuity + fv` as a function of the rate.
struct AnnuityBalance {
    nper: f64,
    pmt: f64,
    pv: f64,
    fv: f64,
    timing: PaymentTiming,
}

impl AnnuityBalance {
    fn at(&self, rate: f64) -> Option<f64> {
        if rate <= -1.0 {
            return None;
        }
        if rate == 0.0 {
            return Some(self.pv + self.pmt * self.nper + self.fv);
        }
        let growth = Growth::new(rate, self.nper)?;
        Some(self.pv * growth.factor + self.pmt * growth.annuity(rate, self.timing) + self.fv)
    }

    fn slope(&self, rate: f64) -> Option<f64> {
        if rate <= -1.0 {
            return None;
        }
        let offset = self.timing.offset();
        let n = self.nper;

        let slope = if rate == 0.0 {
            // Limit of the general form; avoids cancellation in (g - 1) / r.
            n * self.pv + self.pmt * (n * (n - 1.0) / 2.0 + offset * n)
        } else {
            let growth = Growth::new(rate, n)?;
            let d_factor = n * growth.factor / (1.0 + rate);
            let plain = growth.excess / rate;
            let d_plain = (d_factor * rate - growth.excess) / (rate * rate);
            let d_annuity = offset * plain + (1.0 + rate * offset) * d_plain;
            self.pv * d_factor + self.pmt * d_annuity
        };
        (slope.is_finite() && slope != 0.0).then_some(slope)
    }
}

/// Interest portion of payment `per` (1-based).
pub fn ipmt(
    rate: f64,
    per: f64,
    nper: f64,
    pv: f64,
    future_value: f64,
    timing: PaymentTiming,
) -> ExcelResult<f64> {
    if per < 1.0 || per > nper {
        return Err(ExcelError::Num);
    }
    if rate == 0.0 {
        return Ok(0.0);
    }

    let payment = pmt(rate, nper, pv, future_value, timing)?;
    match timing {
        PaymentTiming::End => Ok(fv(rate, per - 1.0, payment, pv, timing)? * rate),
        // An annuity due pays its first installment before any interest accrues.
        PaymentTiming::Begin if (per - 1.0).abs() <= EXCEL_ITERATION_TOLERANCE => Ok(0.0),
        PaymentTiming::Begin => {
            let discount = 1.0 + rate;
            if discount == 0.0 {
                return Err(ExcelError::Div0);
            }
            Ok(fv(rate, per - 1.0, payment, pv, timing)? * rate / discount)
        }
    }
}

/// Principal portion of payment `per`.
pub fn ppmt(
    rate: f64,
    per: f64,
    nper: f64,
    pv: f64,
    future_value: f64,
    timing: PaymentTiming,
) -> ExcelResult<f64> {
    let payment = pmt(rate, nper, pv, future_value, timing)?;
    Ok(payment - ipmt(rate, per, nper, pv, future_value, timing)?)
}

/// Periods bounded by `start..=end`, validated the way CUMIPMT and CUMPRINC require.
fn cumulative_periods(rate: f64, nper: f64, pv: f64, start: f64, end: f64) -> ExcelResult<(i64, i64)> {
    if [rate, nper, pv, start, end].iter().any(|v| !v.is_finite()) {
        return Err(ExcelError::Num);
    }
    if rate <= 0.0 || nper <= 0.0 || pv <= 0.0 {
        return Err(ExcelError::Num);
    }
    if start < 1.0 || end < start || end > nper {
        return Err(ExcelError::Num);
    }
    let whole = |v: f64| (v - v.round()).abs() <= EXCEL_ITERATION_TOLERANCE;
    if !whole(start) || !whole(end) {
        return Err(ExcelError::Num);
    }
    Ok((start.round() as i64, end.round() as i64))
}

/// Compensated sum; long schedules otherwise drift in the last digits.
fn compensated_sum(terms: impl IntoIterator<Item = ExcelResult<f64>>) -> ExcelResult<f64> {
    let mut sum = 0.0;
    let mut carry = 0.0;
    for term in terms {
        let adjusted = term? - carry;
        let next = sum + adjusted;
        carry = (next - sum) - adjusted;
        sum = next;
    }
    finite(sum)
}

/// Interest paid between periods `start` and `end` inclusive. `typ` must be 0 or 1.
pub fn cumipmt(rate: f64, nper: f64, pv: f64, start: f64, end: f64, typ: f64) -> ExcelResult<f64> {
    let (first, last) = cumulative_periods(rate, nper, pv, start, end)?;
    let timing = PaymentTiming::from_strict_type(typ)?;
    compensated_sum((first..=last).map(|per| ipmt(rate, per as f64, nper, pv, 0.0, timing)))
}

/// Principal repaid between periods `start` and `end` inclusive. `typ` must be 0 or 1.
pub fn cumprinc(rate: f64, nper: f64, pv: f64, start: f64, end: f64, typ: f64) -> ExcelResult<f64> {
    let (first, last) = cumulative_periods(rate, nper, pv, start, end)?;
    let timing = PaymentTiming::from_strict_type(typ)?;
    compensated_sum((first..=last).map(|per| ppmt(rate, per as f64, nper, pv, 0.0, timing)))
}

/// Periods for `pv` to grow to `fv` at `rate`: `ln(fv / pv) / ln(1 + rate)`.
pub fn pduration(rate: f64, pv: f64, fv: f64) -> ExcelResult<f64> {
    if [rate, pv, fv].iter().any(|v| !v.is_finite()) || rate <= 0.0 || pv <= 0.0 || fv <= 0.0 {
        return Err(ExcelError::Num);
    }
    let log_base = rate.ln_1p();
    if log_base == 0.0 {
        return Err(ExcelError::Div0);
    }
    finite((fv / pv).ln() / log_base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: ExcelResult<f64>, expected: f64, tol: f64) {
        let actual = actual.expect("finite result");
        assert!((actual - expected).abs() <= tol, "{actual} vs {expected}");
    }

    #[test]
    fn loan_payment() {
        close(pmt(0.08 / 12.0, 10.0, 10_000.0, 0.0, PaymentTiming::End), -1037.0321, 1e-4);
        close(pmt(0.0, 10.0, 1000.0, 0.0, PaymentTiming::End), -100.0, 1e-12);
        assert_eq!(pmt(0.1, 0.0, 1000.0, 0.0, PaymentTiming::End), Err(ExcelError::Div0));
    }

    #[test]
    fn present_and_future_value() {
        close(pv(0.08 / 12.0, 240.0, 500.0, 0.0, PaymentTiming::End), -59_777.1458, 1e-3);
        close(fv(0.06 / 12.0, 10.0, -200.0, -500.0, PaymentTiming::Begin), 2581.4034, 1e-3);
    }

    #[test]
    fn periods_and_rate() {
        close(nper(0.01, -100.0, -1000.0, 10_000.0, PaymentTiming::Begin), 59.6738657, 1e-6);
        close(rate(48.0, -200.0, 8000.0, 0.0, PaymentTiming::End, None), 0.007701472, 1e-8);
        assert_eq!(
            rate(0.0, -200.0, 8000.0, 0.0, PaymentTiming::End, None),
            Err(ExcelError::Num)
        );
    }

    #[test]
    fn split_payment() {
        close(ipmt(0.1 / 12.0, 1.0, 36.0, 8000.0, 0.0, PaymentTiming::End), -66.6667, 1e-4);
        close(ppmt(0.1 / 12.0, 1.0, 24.0, 2000.0, 0.0, PaymentTiming::End), -75.6231, 1e-3);
        assert_eq!(ipmt(0.1, 1.0, 10.0, 1000.0, 0.0, PaymentTiming::Begin), Ok(0.0));
        assert_eq!(ipmt(0.1, 11.0, 10.0, 1000.0, 0.0, PaymentTiming::End), Err(ExcelError::Num));
    }

    #[test]
    fn cumulative_schedule() {
        close(cumipmt(0.09 / 12.0, 360.0, 125_000.0, 13.0, 24.0, 0.0), -11_135.2321, 1e-3);
        close(cumprinc(0.09 / 12.0, 360.0, 125_000.0, 13.0, 24.0, 0.0), -934.1071, 1e-3);
        assert_eq!(cumipmt(0.09 / 12.0, 360.0, 125_000.0, 13.0, 24.0, 2.0), Err(ExcelError::Num));
        assert_eq!(cumipmt(0.09 / 12.0, 360.0, 125_000.0, 13.5, 24.0, 0.0), Err(ExcelError::Num));
    }

    #[test]
    fn growth_periods() {
        close(pduration(0.025, 2000.0, 2200.0), 3.8598661, 1e-6);
        assert_eq!(pduration(0.0, 2000.0, 2200.0), Err(ExcelError::Num));
    }
}
