//! Excel-compatible financial functions.
//!
//! Every function is a pure computation over date serials and numbers and reports failures as
//! the spreadsheet error value Excel would show:
//!
//! * bad basis, frequency or date order gives `#NUM!`
//! * a zero divisor gives `#DIV/0!`
//!
//! ```
//! use xlchart_financial::{coupnum, ymd_to_serial, ExcelDate, ExcelDateSystem};
//!
//! let system = ExcelDateSystem::EXCEL_1900;
//! let settlement = ymd_to_serial(ExcelDate::new(2024, 4, 1), system).unwrap();
//! let maturity = ymd_to_serial(ExcelDate::new(2025, 1, 1), system).unwrap();
//! assert_eq!(coupnum(settlement, maturity, 2, 0, system), Ok(2));
//! ```

mod bonds;
mod coupons;
mod date;
mod depreciation;
mod error;
mod iterative;
mod securities;
mod time_value;

pub use bonds::{accrint, accrintm, duration, mduration, price, yield_rate};
pub use coupons::{coupdaybs, coupdays, coupdaysnc, coupncd, coupnum, couppcd, Frequency};
pub use date::{
    days360, days_in_month, edate, eomonth, serial_to_ymd, yearfrac, ymd_to_serial, Basis,
    ExcelDate, ExcelDateSystem,
};
pub use depreciation::{amordegrc, amorlinc, db, ddb, sln, syd, vdb};
pub use error::{ExcelError, ExcelResult};
pub use securities::{
    disc, intrate, pricedisc, pricemat, received, tbilleq, tbillprice, tbillyield, yielddisc,
    yieldmat,
};
pub use time_value::{
    cumipmt, cumprinc, fv, ipmt, nper, pduration, pmt, ppmt, pv, rate, PaymentTiming,
};
