use proptest::prelude::*;
use xlchart_financial::{fv, nper, pmt, pv, rate, PaymentTiming};

proptest! {
    #[test]
    fn annuity_functions_agree(
        r in 0.001f64..0.05,
        n in 1u32..360,
        principal in 100.0f64..1_000_000.0,
        begin in any::<bool>(),
    ) {
        let timing = if begin { PaymentTiming::Begin } else { PaymentTiming::End };
        let n = f64::from(n);
        let payment = pmt(r, n, principal, 0.0, timing).unwrap();

        let present = pv(r, n, payment, 0.0, timing).unwrap();
        prop_assert!((present - principal).abs() <= principal * 1e-8);

        let future = fv(r, n, payment, principal, timing).unwrap();
        prop_assert!(future.abs() <= principal * 1e-6);

        let periods = nper(r, payment, principal, 0.0, timing).unwrap();
        prop_assert!((periods - n).abs() <= 1e-6);
    }

    #[test]
    fn rate_recovers_the_payment_rate(r in 0.002f64..0.05, n in 12u32..360) {
        let n = f64::from(n);
        let payment = pmt(r, n, 10_000.0, 0.0, PaymentTiming::End).unwrap();
        let solved = rate(n, payment, 10_000.0, 0.0, PaymentTiming::End, Some(r * 1.5)).unwrap();
        prop_assert!((solved - r).abs() <= 1e-6);
    }
}

#[test]
fn type_argument_mapping() {
    assert_eq!(PaymentTiming::from_type(0.0), PaymentTiming::End);
    assert_eq!(PaymentTiming::from_type(2.5), PaymentTiming::Begin);
    assert!(PaymentTiming::from_strict_type(2.0).is_err());
}
