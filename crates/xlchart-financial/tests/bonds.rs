use pretty_assertions::assert_eq;
use xlchart_financial::{
    accrint, accrintm, coupdaybs, coupdays, coupdaysnc, coupncd, coupnum, couppcd, duration,
    mduration, price, yield_rate, ymd_to_serial, ExcelDate, ExcelDateSystem, ExcelError,
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
fn coupon_schedule_semiannual_30_360() {
    let (settlement, maturity) = (date(2024, 4, 1), date(2025, 1, 1));
    assert_eq!(couppcd(settlement, maturity, 2, 0, SYS), Ok(date(2024, 1, 1)));
    assert_eq!(coupncd(settlement, maturity, 2, 0, SYS), Ok(date(2024, 7, 1)));
    assert_eq!(coupdaybs(settlement, maturity, 2, 0, SYS), Ok(90.0));
    assert_eq!(coupdaysnc(settlement, maturity, 2, 0, SYS), Ok(90.0));
    assert_eq!(coupdays(settlement, maturity, 2, 0, SYS), Ok(180.0));
    assert_eq!(coupnum(settlement, maturity, 2, 0, SYS), Ok(2));
}

#[test]
fn coupon_schedule_quarterly_actual() {
    let (settlement, maturity) = (date(2024, 2, 1), date(2024, 12, 15));
    assert_eq!(couppcd(settlement, maturity, 4, 1, SYS), Ok(date(2023, 12, 15)));
    assert_eq!(coupncd(settlement, maturity, 4, 1, SYS), Ok(date(2024, 3, 15)));
    assert_eq!(coupdaybs(settlement, maturity, 4, 1, SYS), Ok(48.0));
    assert_eq!(coupdaysnc(settlement, maturity, 4, 1, SYS), Ok(43.0));
    assert_eq!(coupdays(settlement, maturity, 4, 1, SYS), Ok(91.0));
    assert_eq!(coupnum(settlement, maturity, 4, 1, SYS), Ok(4));
}

#[test]
fn month_end_maturity_pins_coupon_dates() {
    let (settlement, maturity) = (date(2020, 2, 15), date(2020, 4, 30));
    assert_eq!(couppcd(settlement, maturity, 4, 1, SYS), Ok(date(2020, 1, 31)));
    assert_eq!(coupncd(settlement, maturity, 4, 1, SYS), Ok(maturity));
    assert_eq!(coupnum(settlement, maturity, 4, 1, SYS), Ok(1));
    assert_eq!(coupdaybs(settlement, maturity, 4, 1, SYS), Ok(15.0));
    assert_eq!(coupdaysnc(settlement, maturity, 4, 1, SYS), Ok(75.0));
}

#[test]
fn coupon_functions_reject_bad_arguments() {
    let (settlement, maturity) = (date(2024, 4, 1), date(2025, 1, 1));
    assert_eq!(coupnum(settlement, maturity, 3, 0, SYS), Err(ExcelError::Num));
    assert_eq!(coupnum(settlement, maturity, 2, 5, SYS), Err(ExcelError::Num));
    assert_eq!(coupnum(maturity, maturity, 2, 0, SYS), Err(ExcelError::Num));
    assert_eq!(coupdays(maturity, settlement, 2, 0, SYS), Err(ExcelError::Num));
}

#[test]
fn price_and_yield_match_reference_values() {
    let settlement = date(2008, 2, 15);
    assert_close(
        price(settlement, date(2017, 11, 15), 0.0575, 0.065, 100.0, 2, 0, SYS),
        94.634_361_6,
        1e-6,
    );
    assert_close(
        yield_rate(settlement, date(2016, 11, 15), 0.0575, 95.04287, 100.0, 2, 0, SYS),
        0.065,
        1e-6,
    );
}

#[test]
fn yield_inverts_price() {
    let (settlement, maturity) = (date(2021, 3, 10), date(2031, 6, 30));
    for basis in 0..=4 {
        let pr = price(settlement, maturity, 0.04, 0.0525, 100.0, 4, basis, SYS).expect("price");
        assert_close(
            yield_rate(settlement, maturity, 0.04, pr, 100.0, 4, basis, SYS),
            0.0525,
            1e-6,
        );
    }
}

#[test]
fn final_period_uses_simple_discounting() {
    let (settlement, maturity) = (date(2024, 10, 1), date(2025, 1, 1));
    let pr = price(settlement, maturity, 0.06, 0.05, 100.0, 2, 0, SYS).expect("price");
    // 90 of 180 days remain: (100 + 3) / (1 + 0.5 * 0.05 / 2) - 0.5 * 3
    assert_close(Ok(pr), 103.0 / 1.0125 - 1.5, 1e-9);
    assert_close(yield_rate(settlement, maturity, 0.06, pr, 100.0, 2, 0, SYS), 0.05, 1e-9);
}

#[test]
fn price_rejects_negative_inputs() {
    let (settlement, maturity) = (date(2008, 2, 15), date(2017, 11, 15));
    assert_eq!(
        price(settlement, maturity, -0.01, 0.065, 100.0, 2, 0, SYS),
        Err(ExcelError::Num)
    );
    assert_eq!(
        price(settlement, maturity, 0.0575, 0.065, 0.0, 2, 0, SYS),
        Err(ExcelError::Num)
    );
    assert_eq!(
        yield_rate(settlement, maturity, 0.0575, 0.0, 100.0, 2, 0, SYS),
        Err(ExcelError::Num)
    );
}

#[test]
fn macaulay_and_modified_duration() {
    let (settlement, maturity) = (date(2008, 1, 1), date(2016, 1, 1));
    let macaulay = 5.993_774_955;
    assert_close(duration(settlement, maturity, 0.08, 0.09, 2, 1, SYS), macaulay, 1e-6);
    assert_close(
        mduration(settlement, maturity, 0.08, 0.09, 2, 1, SYS),
        macaulay / 1.045,
        1e-6,
    );
    assert_eq!(
        duration(settlement, maturity, 0.08, 0.09, 3, 1, SYS),
        Err(ExcelError::Num)
    );
}

#[test]
fn accrued_interest_at_maturity() {
    let (issue, settlement) = (date(2020, 1, 1), date(2020, 7, 1));
    assert_close(accrintm(issue, settlement, 0.1, 1000.0, 0, SYS), 50.0, 1e-9);
    assert_close(accrintm(issue, settlement, 0.1, 1000.0, 1, SYS), 100.0 * 182.0 / 366.0, 1e-9);
    assert_close(accrintm(issue, settlement, 0.0, 1000.0, 0, SYS), 0.0, 0.0);
    assert_eq!(accrintm(issue, issue, 0.1, 1000.0, 0, SYS), Err(ExcelError::Num));
    assert_eq!(accrintm(issue, settlement, 0.1, 1000.0, 5, SYS), Err(ExcelError::Num));
}

#[test]
fn accrued_interest_on_periodic_coupons() {
    let (issue, first) = (date(2020, 2, 15), date(2020, 5, 15));

    // After the first coupon, accrual restarts at the last coupon date.
    let after = date(2020, 8, 15);
    assert_close(accrint(issue, first, after, 0.1, 1000.0, 2, 0, false, SYS), 25.0, 1e-9);
    assert_close(accrint(issue, first, after, 0.1, 1000.0, 2, 0, true, SYS), 25.0, 1e-9);

    // Before it, `calc_method` picks the starting point.
    let before = date(2020, 4, 15);
    assert_close(
        accrint(issue, first, before, 0.1, 1000.0, 2, 0, false, SYS),
        50.0 * 60.0 / 180.0,
        1e-9,
    );
    assert_close(
        accrint(issue, first, before, 0.1, 1000.0, 2, 0, true, SYS),
        50.0 * 150.0 / 180.0,
        1e-9,
    );

    let (issue, first, settlement) = (date(2020, 1, 1), date(2020, 7, 1), date(2020, 3, 1));
    assert_eq!(
        accrint(issue, first, settlement, 0.1, 1000.0, 3, 0, false, SYS),
        Err(ExcelError::Num)
    );
}

#[test]
fn accrint_pins_month_end_first_interest() {
    // First coupon on 30 April: later coupons land on 31 July, 31 October, ...
    let value = accrint(
        date(2020, 1, 15),
        date(2020, 4, 30),
        date(2020, 8, 15),
        0.12,
        1000.0,
        4,
        1,
        false,
        SYS,
    );
    let expected = 30.0 * 15.0 / 92.0;
    assert_close(value, expected, 1e-9);
}
