//! Workbook packages that carry chart parts.
//!
//! [`ChartPackage`] keeps every part of an OPC (ZIP) container in memory. Charts are loaded into
//! and saved from [`xlchart_charts::ChartDocument`], and [`ChartPackage::add_chart`] wires a new
//! chart onto a sheet through its drawing part, relationships and content types.
//!
//! ```no_run
//! use xlchart_charts::{ChartDocument, ChartType};
//! use xlchart_package::{ChartAnchor, ChartPackage};
//!
//! # fn main() -> Result<(), xlchart_package::PackageError> {
//! let mut pkg = ChartPackage::new_workbook(&["Sheet1"])?;
//! let chart = ChartDocument::new(ChartType::ColumnClustered)?;
//! let part = pkg.add_chart("Sheet1", &chart, ChartAnchor::default())?;
//! assert_eq!(part, "xl/charts/chart1.xml");
//! let bytes = pkg.write_to_bytes()?;
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

pub mod charts;
pub mod content_types;
pub mod drawing;
pub mod error;
mod package;
pub mod relationships;
mod workbook;
mod zip_util;

pub use charts::{classify_chart_part, ChartPart, ChartPartKind};
pub use drawing::{AnchorPoint, ChartAnchor, ChartRef};
pub use error::PackageError;
pub use package::{ChartPackage, PackageLimits};
pub use relationships::Relationship;
pub use workbook::SheetEntry;
