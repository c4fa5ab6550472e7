use thiserror::Error;
use xlchart_dom::DomError;

use crate::chart_type::ChartType;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("{property} must be between {min} and {max} (got {value})")]
    OutOfRange {
        property: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{collection} already contains index {index}")]
    DuplicateIndex {
        collection: &'static str,
        index: u32,
    },
    #[error("{feature} is not supported by {chart_type:?} charts")]
    Unsupported {
        feature: &'static str,
        chart_type: ChartType,
    },
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("invalid cell address `{0}`")]
    InvalidAddress(String),
    #[error("expected a c:chartSpace root, found `{0}`")]
    NotAChart(String),
    #[error("{0} no longer exists in the chart")]
    Detached(String),
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl ChartError {
    pub(crate) fn out_of_range(property: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            property,
            value,
            min,
            max,
        }
    }
}
