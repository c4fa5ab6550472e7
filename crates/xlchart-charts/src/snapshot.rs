//! Serializable structure summary of a chart, for diffing and inspection.

use serde::{Deserialize, Serialize};

use crate::chart_type::{ChartFamily, ChartType};
use crate::data_source::DataSource;
use crate::document::ChartDocument;
use crate::enums::{AxisPosition, LegendPosition};
use crate::template::AxisKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSummary {
    pub chart_type: Option<ChartType>,
    pub title: Option<String>,
    pub legend: Option<LegendPosition>,
    pub groups: Vec<GroupSummary>,
    pub axes: Vec<AxisSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub family: Option<ChartFamily>,
    pub chart_type: Option<ChartType>,
    pub axis_ids: Vec<u32>,
    pub series: Vec<SeriesSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub idx: Option<u32>,
    pub order: Option<u32>,
    pub name: Option<String>,
    pub values: Option<DataSource>,
    pub categories: Option<DataSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisSummary {
    pub id: Option<u32>,
    pub kind: Option<AxisKind>,
    pub position: AxisPosition,
    pub deleted: bool,
    pub cross_axis: Option<u32>,
}

impl ChartSummary {
    pub fn of(chart: &ChartDocument) -> Self {
        let title = chart.title();
        let title = title.text().or_else(|| title.reference());
        let legend = chart.legend();
        let legend = legend.exists().then(|| legend.position());

        let groups = chart
            .groups()
            .iter()
            .map(|group| GroupSummary {
                family: group.family(),
                chart_type: group.chart_type(),
                axis_ids: group.axis_ids(),
                series: group
                    .series()
                    .iter()
                    .map(|series| SeriesSummary {
                        idx: series.idx(),
                        order: series.order(),
                        name: series.name(),
                        values: series.values(),
                        categories: series.categories(),
                    })
                    .collect(),
            })
            .collect();

        let axes = chart
            .axes()
            .iter()
            .map(|axis| AxisSummary {
                id: axis.id(),
                kind: axis.kind(),
                position: axis.position(),
                deleted: axis.deleted(),
                cross_axis: axis.cross_axis(),
            })
            .collect();

        Self {
            chart_type: chart.chart_type(),
            title,
            legend,
            groups,
            axes,
        }
    }
}
