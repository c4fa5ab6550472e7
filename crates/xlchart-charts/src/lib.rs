//! Typed object model over OOXML chart parts (`xl/charts/chartN.xml`).
//!
//! [`ChartDocument`] owns the XML tree. Everything else is a borrowed view addressed by path:
//! chart groups, series, axes, legend, titles, data labels, data points, trendlines and error
//! bars. Reading a property never modifies the document; writing one creates the missing
//! elements in schema order and validates the value first, so a rejected write leaves the
//! document untouched.
//!
//! ```no_run
//! use xlchart_charts::{BarDirection, ChartDocument, ChartType, DataSource};
//!
//! # fn main() -> Result<(), xlchart_charts::ChartError> {
//! let mut chart = ChartDocument::new(ChartType::ColumnClustered)?;
//! let mut groups = chart.groups_mut();
//! let mut group = groups.get_mut(0).expect("template has one group");
//! group.set_direction(BarDirection::Bar)?;
//! group
//!     .series_mut()
//!     .add(DataSource::from("Sheet1!$B$2:$B$5"), Some(DataSource::from("Sheet1!$A$2:$A$5")))?;
//! assert_eq!(chart.chart_type(), Some(ChartType::BarClustered));
//! # Ok(())
//! # }
//! ```

pub mod axes;
pub mod cells;
pub mod chart_type;
pub mod data_source;
pub mod document;
pub mod enums;
pub mod error;
pub mod error_bars;
pub mod groups;
pub mod labels;
pub mod legend;
pub mod marker;
pub mod points;
pub mod property;
pub mod schema;
pub mod series;
pub mod snapshot;
pub mod template;
pub mod title;
pub mod trendlines;
pub mod view3d;

pub use axes::{Axes, Axis};
pub use cells::{CellRange, CellRef, CellSource, CellValue, InMemoryCells};
pub use chart_type::{Capabilities, ChartFamily, ChartType};
pub use data_source::DataSource;
pub use document::ChartDocument;
pub use enums::*;
pub use error::ChartError;
pub use error_bars::{ErrorBar, ErrorBars};
pub use groups::{ChartGroup, ChartGroups};
pub use labels::{DataLabel, DataLabelOverrides, DataLabels};
pub use legend::{Legend, LegendEntries, LegendEntry};
pub use marker::Marker;
pub use points::{DataPoint, DataPoints};
pub use series::{Series, SeriesCollection};
pub use snapshot::{AxisSummary, ChartSummary, GroupSummary, SeriesSummary};
pub use template::{AxisIdAllocator, AxisKind, NewChartOptions, FIRST_AXIS_ID};
pub use title::Title;
pub use trendlines::{Trendline, Trendlines};
pub use view3d::View3D;
