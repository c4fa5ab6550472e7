//! Discount securities, interest-at-maturity securities and Treasury bills.

use crate::date::{yearfrac, ExcelDateSystem};
use crate::error::{finite, ExcelError, ExcelResult};

/// Longest Treasury bill term Excel accepts, in days.
const TBILL_MAX_DAYS: i32 = 365;
/// Bills up to this many days use the money-market yield conversion.
const TBILL_SHORT_DAYS: i32 = 182;

fn positive(value: f64) -> ExcelResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ExcelError::Num)
    }
}

/// Years from settlement to maturity under `basis`, after the shared argument checks.
fn term(settlement: i32, maturity: i32, basis: i32, system: ExcelDateSystem) -> ExcelResult<f64> {
    if settlement >= maturity {
        return Err(ExcelError::Num);
    }
    yearfrac(settlement, maturity, basis, system)
}

fn nonzero_term(settlement: i32, maturity: i32, basis: i32, system: ExcelDateSystem) -> ExcelResult<f64> {
    let years = term(settlement, maturity, basis, system)?;
    if years == 0.0 {
        return Err(ExcelError::Div0);
    }
    Ok(years)
}

/// DISC: discount rate implied by a price.
pub fn disc(
    settlement: i32,
    maturity: i32,
    pr: f64,
    redemption: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let (pr, redemption) = (positive(pr)?, positive(redemption)?);
    let years = nonzero_term(settlement, maturity, basis, system)?;
    finite((redemption - pr) / redemption / years)
}

/// PRICEDISC: price of a discounted security per 100 face value.
pub fn pricedisc(
    settlement: i32,
    maturity: i32,
    discount: f64,
    redemption: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let (discount, redemption) = (positive(discount)?, positive(redemption)?);
    let factor = 1.0 - discount * term(settlement, maturity, basis, system)?;
    // A discount that consumes the whole redemption leaves no valid price.
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ExcelError::Num);
    }
    finite(redemption * factor)
}

/// YIELDDISC: annual yield of a discounted security.
pub fn yielddisc(
    settlement: i32,
    maturity: i32,
    pr: f64,
    redemption: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let (pr, redemption) = (positive(pr)?, positive(redemption)?);
    let years = nonzero_term(settlement, maturity, basis, system)?;
    finite((redemption - pr) / pr / years)
}

/// INTRATE: interest rate of a fully invested security.
pub fn intrate(
    settlement: i32,
    maturity: i32,
    investment: f64,
    redemption: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let (investment, redemption) = (positive(investment)?, positive(redemption)?);
    let years = nonzero_term(settlement, maturity, basis, system)?;
    finite((redemption - investment) / investment / years)
}

/// RECEIVED: amount returned at maturity for a fully invested security.
pub fn received(
    settlement: i32,
    maturity: i32,
    investment: f64,
    discount: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let (investment, discount) = (positive(investment)?, positive(discount)?);
    let factor = 1.0 - discount * term(settlement, maturity, basis, system)?;
    match factor {
        f if !f.is_finite() || f < 0.0 => Err(ExcelError::Num),
        f if f == 0.0 => Err(ExcelError::Div0),
        f => finite(investment / f),
    }
}

/// Year fractions issue→maturity, issue→settlement and settlement→maturity.
struct MaturityTerms {
    issue_to_maturity: f64,
    issue_to_settlement: f64,
    settlement_to_maturity: f64,
}

impl MaturityTerms {
    fn new(
        settlement: i32,
        maturity: i32,
        issue: i32,
        basis: i32,
        system: ExcelDateSystem,
    ) -> ExcelResult<Self> {
        if settlement >= maturity || issue > settlement || issue >= maturity {
            return Err(ExcelError::Num);
        }
        Ok(Self {
            issue_to_maturity: yearfrac(issue, maturity, basis, system)?,
            issue_to_settlement: yearfrac(issue, settlement, basis, system)?,
            settlement_to_maturity: yearfrac(settlement, maturity, basis, system)?,
        })
    }

    /// Principal plus all interest paid at maturity, per 100 face value.
    fn maturity_value(&self, rate: f64) -> f64 {
        100.0 * (1.0 + rate * self.issue_to_maturity)
    }

    fn accrued(&self, rate: f64) -> f64 {
        100.0 * rate * self.issue_to_settlement
    }
}

/// PRICEMAT: price per 100 face value of a security paying interest at maturity.
pub fn pricemat(
    settlement: i32,
    maturity: i32,
    issue: i32,
    rate: f64,
    yld: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let (rate, yld) = (positive(rate)?, positive(yld)?);
    let terms = MaturityTerms::new(settlement, maturity, issue, basis, system)?;
    let discount = 1.0 + yld * terms.settlement_to_maturity;
    if discount == 0.0 {
        return Err(ExcelError::Div0);
    }
    finite(terms.maturity_value(rate) / discount - terms.accrued(rate))
}

/// YIELDMAT: annual yield of a security paying interest at maturity.
pub fn yieldmat(
    settlement: i32,
    maturity: i32,
    issue: i32,
    rate: f64,
    pr: f64,
    basis: i32,
    system: ExcelDateSystem,
) -> ExcelResult<f64> {
    let (rate, pr) = (positive(rate)?, positive(pr)?);
    let terms = MaturityTerms::new(settlement, maturity, issue, basis, system)?;
    let paid = pr + terms.accrued(rate);
    if terms.settlement_to_maturity == 0.0 || paid == 0.0 {
        return Err(ExcelError::Div0);
    }
    finite((terms.maturity_value(rate) / paid - 1.0) / terms.settlement_to_maturity)
}

/// Days to maturity of a Treasury bill, which must be within one year.
fn tbill_days(settlement: i32, maturity: i32) -> ExcelResult<i32> {
    let days = maturity.checked_sub(settlement).ok_or(ExcelError::Num)?;
    if (1..=TBILL_MAX_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ExcelError::Num)
    }
}

/// TBILLPRICE per 100 face value.
pub fn tbillprice(settlement: i32, maturity: i32, discount: f64) -> ExcelResult<f64> {
    let discount = positive(discount)?;
    let days = f64::from(tbill_days(settlement, maturity)?);
    let price = 100.0 * (1.0 - discount * days / 360.0);
    if !price.is_finite() || price <= 0.0 {
        return Err(ExcelError::Num);
    }
    Ok(price)
}

/// TBILLYIELD
pub fn tbillyield(settlement: i32, maturity: i32, pr: f64) -> ExcelResult<f64> {
    let pr = positive(pr)?;
    let days = f64::from(tbill_days(settlement, maturity)?);
    finite((100.0 - pr) / pr * 360.0 / days)
}

/// TBILLEQ: bond-equivalent yield of a Treasury bill.
///
/// Bills of up to half a year convert the discount rate directly. Longer bills solve for the
/// semiannually compounded rate that reproduces the bill's price.
pub fn tbilleq(settlement: i32, maturity: i32, discount: f64) -> ExcelResult<f64> {
    let discount = positive(discount)?;
    let days_i = tbill_days(settlement, maturity)?;
    let days = f64::from(days_i);

    let price = 1.0 - discount * days / 360.0;
    if !price.is_finite() || price <= 0.0 {
        return Err(ExcelError::Num);
    }

    if days_i <= TBILL_SHORT_DAYS {
        let denom = 360.0 - discount * days;
        if denom <= 0.0 {
            return Err(ExcelError::Num);
        }
        return finite(365.0 * discount / denom);
    }

    // 2 * ((1 / price)^(365 / (2 * days)) - 1), via exp_m1 for small exponents.
    let exponent = 365.0 / (2.0 * days) * -price.ln();
    if !exponent.is_finite() {
        return Err(ExcelError::Num);
    }
    finite(2.0 * exponent.exp_m1())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tbill_term_is_bounded() {
        assert_eq!(tbill_days(100, 100), Err(ExcelError::Num));
        assert_eq!(tbill_days(100, 466), Err(ExcelError::Num));
        assert_eq!(tbill_days(100, 465), Ok(365));
    }

    #[test]
    fn tbill_price_and_yield_agree() {
        let price = tbillprice(39_538, 39_600, 0.09).expect("price");
        let back = tbillyield(39_538, 39_600, price).expect("yield");
        assert!((price - 98.45).abs() < 1e-9);
        assert!((back - 0.09 / (1.0 - 0.09 * 62.0 / 360.0)).abs() < 1e-12);
    }
}
