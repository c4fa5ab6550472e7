use pretty_assertions::assert_eq;
use xlchart_financial::{
    disc, intrate, pricedisc, pricemat, received, tbilleq, tbillprice, tbillyield, yielddisc,
    yieldmat, ymd_to_serial, ExcelDate, ExcelDateSystem, ExcelError,
};

const SYS: ExcelDateSystem = ExcelDateSystem::EXCEL_1900;

fn date(y: i32, m: u8, d: u8) -> i32 {
    ymd_to_serial(ExcelDate::new(y, m, d), SYS).expect("valid date")
}

fn assert_close(actual: Result<f64, ExcelError>, expected: f64, tolerance: f64) {
    let actual = actual.expect("numeric result");
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn one_year_discount_instruments() {
    let (settlement, maturity) = (date(2020, 1, 1), date(2021, 1, 1));
    for basis in [0, 1] {
        assert_close(disc(settlement, maturity, 97.0, 100.0, basis, SYS), 0.03, 1e-12);
        assert_close(pricedisc(settlement, maturity, 0.05, 100.0, basis, SYS), 95.0, 1e-9);
        assert_close(received(settlement, maturity, 95.0, 0.05, basis, SYS), 100.0, 1e-9);
    }
}

#[test]
fn short_dated_actual_360() {
    let (settlement, maturity) = (date(2008, 2, 16), date(2008, 3, 1));
    assert_close(pricedisc(settlement, maturity, 0.0525, 100.0, 2, SYS), 99.795_833_3, 1e-6);
    assert_close(yielddisc(settlement, maturity, 99.795, 100.0, 2, SYS), 0.052_823, 1e-6);

    let (settlement, maturity) = (date(2008, 2, 15), date(2008, 5, 15));
    assert_close(intrate(settlement, maturity, 1_000_000.0, 1_014_420.0, 2, SYS), 0.05768, 1e-9);
    assert_close(received(settlement, maturity, 1_000_000.0, 0.0575, 2, SYS), 1_014_584.654, 1e-3);
}

#[test]
fn discount_functions_validate_arguments() {
    let (settlement, maturity) = (date(2020, 1, 1), date(2021, 1, 1));
    assert_eq!(disc(maturity, settlement, 97.0, 100.0, 0, SYS), Err(ExcelError::Num));
    assert_eq!(disc(settlement, maturity, 0.0, 100.0, 0, SYS), Err(ExcelError::Num));
    assert_eq!(disc(settlement, maturity, 97.0, 100.0, 7, SYS), Err(ExcelError::Num));
    // A 100% discount over a full year leaves nothing to pay.
    assert_eq!(pricedisc(settlement, maturity, 1.0, 100.0, 0, SYS), Err(ExcelError::Num));
    assert_eq!(received(settlement, maturity, 95.0, 1.0, 0, SYS), Err(ExcelError::Div0));
}

#[test]
fn interest_at_maturity() {
    assert_close(
        pricemat(date(2008, 2, 15), date(2008, 4, 13), date(2007, 11, 11), 0.061, 0.061, 0, SYS),
        99.984_498_88,
        1e-7,
    );
    assert_close(
        yieldmat(date(2008, 3, 15), date(2008, 11, 3), date(2007, 11, 8), 0.0625, 100.0123, 0, SYS),
        0.060_954_33,
        1e-7,
    );
    assert_eq!(
        pricemat(date(2008, 2, 15), date(2008, 4, 13), date(2008, 3, 1), 0.061, 0.061, 0, SYS),
        Err(ExcelError::Num)
    );
}

#[test]
fn treasury_bills() {
    let (settlement, maturity) = (date(2008, 3, 31), date(2008, 6, 1));
    assert_close(tbillprice(settlement, maturity, 0.09), 98.45, 1e-9);
    assert_close(tbillyield(settlement, maturity, 98.45), 0.091_417, 1e-6);
    assert_close(tbilleq(settlement, maturity, 0.0914), 0.094_151_49, 1e-8);

    // Past half a year the bond-equivalent yield compounds semiannually.
    assert_close(tbilleq(settlement, settlement + 300, 0.05), 0.052_457_001, 1e-8);

    assert_eq!(tbillprice(settlement, settlement + 366, 0.05), Err(ExcelError::Num));
    assert_eq!(tbillprice(settlement, settlement, 0.05), Err(ExcelError::Num));
    assert_eq!(tbillyield(settlement, maturity, 0.0), Err(ExcelError::Num));
}
