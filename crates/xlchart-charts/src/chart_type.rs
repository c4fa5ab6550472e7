//! Chart subtypes, their group elements and what each subtype supports.

use serde::{Deserialize, Serialize};
use xlchart_dom::{Ns, XmlElement};

use crate::enums::{BarDirection, BarGrouping, BarShape, Grouping, OfPieType, RadarStyle, ScatterStyle, XmlEnum};

/// One `c:*Chart` element kind inside `c:plotArea`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartFamily {
    Area,
    Area3D,
    Line,
    Line3D,
    Stock,
    Radar,
    Scatter,
    Pie,
    Pie3D,
    Doughnut,
    Bar,
    Bar3D,
    OfPie,
    Surface,
    Surface3D,
    Bubble,
}

impl ChartFamily {
    pub const ALL: [ChartFamily; 16] = [
        ChartFamily::Area,
        ChartFamily::Area3D,
        ChartFamily::Line,
        ChartFamily::Line3D,
        ChartFamily::Stock,
        ChartFamily::Radar,
        ChartFamily::Scatter,
        ChartFamily::Pie,
        ChartFamily::Pie3D,
        ChartFamily::Doughnut,
        ChartFamily::Bar,
        ChartFamily::Bar3D,
        ChartFamily::OfPie,
        ChartFamily::Surface,
        ChartFamily::Surface3D,
        ChartFamily::Bubble,
    ];

    pub const fn element_name(self) -> &'static str {
        match self {
            ChartFamily::Area => "areaChart",
            ChartFamily::Area3D => "area3DChart",
            ChartFamily::Line => "lineChart",
            ChartFamily::Line3D => "line3DChart",
            ChartFamily::Stock => "stockChart",
            ChartFamily::Radar => "radarChart",
            ChartFamily::Scatter => "scatterChart",
            ChartFamily::Pie => "pieChart",
            ChartFamily::Pie3D => "pie3DChart",
            ChartFamily::Doughnut => "doughnutChart",
            ChartFamily::Bar => "barChart",
            ChartFamily::Bar3D => "bar3DChart",
            ChartFamily::OfPie => "ofPieChart",
            ChartFamily::Surface => "surfaceChart",
            ChartFamily::Surface3D => "surface3DChart",
            ChartFamily::Bubble => "bubbleChart",
        }
    }

    pub fn from_element_name(name: &str) -> Option<ChartFamily> {
        ChartFamily::ALL.into_iter().find(|f| f.element_name() == name)
    }

    /// Scatter and bubble series plot `xVal`/`yVal` instead of `cat`/`val`.
    pub const fn uses_xy_values(self) -> bool {
        matches!(self, ChartFamily::Scatter | ChartFamily::Bubble)
    }

    pub const fn has_axes(self) -> bool {
        !matches!(
            self,
            ChartFamily::Pie | ChartFamily::Pie3D | ChartFamily::Doughnut | ChartFamily::OfPie
        )
    }

    pub const fn has_markers(self) -> bool {
        matches!(
            self,
            ChartFamily::Line | ChartFamily::Stock | ChartFamily::Scatter | ChartFamily::Radar
        )
    }
}

/// The chart subtypes offered when creating a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Area,
    AreaStacked,
    AreaStacked100,
    Area3D,
    AreaStacked3D,
    AreaStacked1003D,
    BarClustered,
    BarStacked,
    BarStacked100,
    BarClustered3D,
    BarStacked3D,
    BarStacked1003D,
    ColumnClustered,
    ColumnStacked,
    ColumnStacked100,
    ColumnClustered3D,
    ColumnStacked3D,
    ColumnStacked1003D,
    Column3D,
    ConeBarClustered,
    ConeBarStacked,
    ConeBarStacked100,
    ConeCol,
    ConeColClustered,
    ConeColStacked,
    ConeColStacked100,
    CylinderBarClustered,
    CylinderBarStacked,
    CylinderBarStacked100,
    CylinderCol,
    CylinderColClustered,
    CylinderColStacked,
    CylinderColStacked100,
    PyramidBarClustered,
    PyramidBarStacked,
    PyramidBarStacked100,
    PyramidCol,
    PyramidColClustered,
    PyramidColStacked,
    PyramidColStacked100,
    Line,
    LineStacked,
    LineStacked100,
    LineMarkers,
    LineMarkersStacked,
    LineMarkersStacked100,
    Line3D,
    Pie,
    PieExploded,
    Pie3D,
    PieExploded3D,
    PieOfPie,
    BarOfPie,
    Doughnut,
    DoughnutExploded,
    XYScatter,
    XYScatterLines,
    XYScatterLinesNoMarkers,
    XYScatterSmooth,
    XYScatterSmoothNoMarkers,
    Radar,
    RadarMarkers,
    RadarFilled,
    Bubble,
    Bubble3DEffect,
    Surface,
    SurfaceWireframe,
    SurfaceTopView,
    SurfaceTopViewWireframe,
    StockHLC,
    StockOHLC,
    StockVHLC,
    StockVOHLC,
}

/// Feature flags derived from a subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub is_3d: bool,
    pub is_stacked: bool,
    pub is_percent_stacked: bool,
    pub is_pie_like: bool,
    pub has_axes: bool,
    pub has_markers: bool,
    pub has_trendlines: bool,
    pub has_error_bars: bool,
    pub has_data_label_position: bool,
    pub has_shape: bool,
}

/// Bar subtype components.
struct BarParts {
    direction: BarDirection,
    grouping: BarGrouping,
    shape: Option<BarShape>,
}

impl ChartType {
    pub const fn family(self) -> ChartFamily {
        use ChartType::*;
        match self {
            Area | AreaStacked | AreaStacked100 => ChartFamily::Area,
            Area3D | AreaStacked3D | AreaStacked1003D => ChartFamily::Area3D,
            BarClustered | BarStacked | BarStacked100 | ColumnClustered | ColumnStacked
            | ColumnStacked100 => ChartFamily::Bar,
            BarClustered3D | BarStacked3D | BarStacked1003D | ColumnClustered3D
            | ColumnStacked3D | ColumnStacked1003D | Column3D | ConeBarClustered
            | ConeBarStacked | ConeBarStacked100 | ConeCol | ConeColClustered | ConeColStacked
            | ConeColStacked100 | CylinderBarClustered | CylinderBarStacked
            | CylinderBarStacked100 | CylinderCol | CylinderColClustered | CylinderColStacked
            | CylinderColStacked100 | PyramidBarClustered | PyramidBarStacked
            | PyramidBarStacked100 | PyramidCol | PyramidColClustered | PyramidColStacked
            | PyramidColStacked100 => ChartFamily::Bar3D,
            Line | LineStacked | LineStacked100 | LineMarkers | LineMarkersStacked
            | LineMarkersStacked100 => ChartFamily::Line,
            Line3D => ChartFamily::Line3D,
            Pie | PieExploded => ChartFamily::Pie,
            Pie3D | PieExploded3D => ChartFamily::Pie3D,
            PieOfPie | BarOfPie => ChartFamily::OfPie,
            Doughnut | DoughnutExploded => ChartFamily::Doughnut,
            XYScatter | XYScatterLines | XYScatterLinesNoMarkers | XYScatterSmooth
            | XYScatterSmoothNoMarkers => ChartFamily::Scatter,
            Radar | RadarMarkers | RadarFilled => ChartFamily::Radar,
            Bubble | Bubble3DEffect => ChartFamily::Bubble,
            Surface | SurfaceWireframe => ChartFamily::Surface3D,
            SurfaceTopView | SurfaceTopViewWireframe => ChartFamily::Surface,
            StockHLC | StockOHLC | StockVHLC | StockVOHLC => ChartFamily::Stock,
        }
    }

    pub fn is_3d(self) -> bool {
        matches!(
            self.family(),
            ChartFamily::Area3D
                | ChartFamily::Bar3D
                | ChartFamily::Line3D
                | ChartFamily::Pie3D
                | ChartFamily::Surface3D
        )
    }

    pub fn is_stacked(self) -> bool {
        use ChartType::*;
        matches!(
            self,
            AreaStacked
                | AreaStacked3D
                | BarStacked
                | BarStacked3D
                | ColumnStacked
                | ColumnStacked3D
                | ConeBarStacked
                | ConeColStacked
                | CylinderBarStacked
                | CylinderColStacked
                | PyramidBarStacked
                | PyramidColStacked
                | LineStacked
                | LineMarkersStacked
        )
    }

    pub fn is_percent_stacked(self) -> bool {
        use ChartType::*;
        matches!(
            self,
            AreaStacked100
                | AreaStacked1003D
                | BarStacked100
                | BarStacked1003D
                | ColumnStacked100
                | ColumnStacked1003D
                | ConeBarStacked100
                | ConeColStacked100
                | CylinderBarStacked100
                | CylinderColStacked100
                | PyramidBarStacked100
                | PyramidColStacked100
                | LineStacked100
                | LineMarkersStacked100
        )
    }

    pub fn is_pie_like(self) -> bool {
        !self.family().has_axes()
    }

    pub fn capabilities(self) -> Capabilities {
        let family = self.family();
        let is_3d = self.is_3d();
        let is_stacked = self.is_stacked();
        let is_percent_stacked = self.is_percent_stacked();
        let is_pie_like = self.is_pie_like();
        let trend_family = matches!(
            family,
            ChartFamily::Area
                | ChartFamily::Bar
                | ChartFamily::Line
                | ChartFamily::Stock
                | ChartFamily::Scatter
                | ChartFamily::Bubble
        );
        let has_trendlines = trend_family && !is_3d && !is_stacked && !is_percent_stacked;
        Capabilities {
            is_3d,
            is_stacked,
            is_percent_stacked,
            is_pie_like,
            has_axes: family.has_axes(),
            has_markers: family.has_markers(),
            has_trendlines,
            has_error_bars: trend_family && !is_3d,
            has_data_label_position: !(is_3d
                && !matches!(family, ChartFamily::Pie3D | ChartFamily::Line3D))
                && family != ChartFamily::Doughnut,
            has_shape: family == ChartFamily::Bar3D,
        }
    }

    fn bar_parts(self) -> Option<BarParts> {
        use ChartType::*;
        let (direction, grouping, shape) = match self {
            BarClustered => (BarDirection::Bar, BarGrouping::Clustered, None),
            BarStacked => (BarDirection::Bar, BarGrouping::Stacked, None),
            BarStacked100 => (BarDirection::Bar, BarGrouping::PercentStacked, None),
            ColumnClustered => (BarDirection::Column, BarGrouping::Clustered, None),
            ColumnStacked => (BarDirection::Column, BarGrouping::Stacked, None),
            ColumnStacked100 => (BarDirection::Column, BarGrouping::PercentStacked, None),
            BarClustered3D => (BarDirection::Bar, BarGrouping::Clustered, Some(BarShape::Box)),
            BarStacked3D => (BarDirection::Bar, BarGrouping::Stacked, Some(BarShape::Box)),
            BarStacked1003D => (BarDirection::Bar, BarGrouping::PercentStacked, Some(BarShape::Box)),
            ColumnClustered3D => (BarDirection::Column, BarGrouping::Clustered, Some(BarShape::Box)),
            ColumnStacked3D => (BarDirection::Column, BarGrouping::Stacked, Some(BarShape::Box)),
            ColumnStacked1003D => (BarDirection::Column, BarGrouping::PercentStacked, Some(BarShape::Box)),
            Column3D => (BarDirection::Column, BarGrouping::Standard, Some(BarShape::Box)),
            ConeBarClustered => (BarDirection::Bar, BarGrouping::Clustered, Some(BarShape::Cone)),
            ConeBarStacked => (BarDirection::Bar, BarGrouping::Stacked, Some(BarShape::Cone)),
            ConeBarStacked100 => (BarDirection::Bar, BarGrouping::PercentStacked, Some(BarShape::Cone)),
            ConeCol => (BarDirection::Column, BarGrouping::Standard, Some(BarShape::Cone)),
            ConeColClustered => (BarDirection::Column, BarGrouping::Clustered, Some(BarShape::Cone)),
            ConeColStacked => (BarDirection::Column, BarGrouping::Stacked, Some(BarShape::Cone)),
            ConeColStacked100 => (BarDirection::Column, BarGrouping::PercentStacked, Some(BarShape::Cone)),
            CylinderBarClustered => (BarDirection::Bar, BarGrouping::Clustered, Some(BarShape::Cylinder)),
            CylinderBarStacked => (BarDirection::Bar, BarGrouping::Stacked, Some(BarShape::Cylinder)),
            CylinderBarStacked100 => (BarDirection::Bar, BarGrouping::PercentStacked, Some(BarShape::Cylinder)),
            CylinderCol => (BarDirection::Column, BarGrouping::Standard, Some(BarShape::Cylinder)),
            CylinderColClustered => (BarDirection::Column, BarGrouping::Clustered, Some(BarShape::Cylinder)),
            CylinderColStacked => (BarDirection::Column, BarGrouping::Stacked, Some(BarShape::Cylinder)),
            CylinderColStacked100 => (BarDirection::Column, BarGrouping::PercentStacked, Some(BarShape::Cylinder)),
            PyramidBarClustered => (BarDirection::Bar, BarGrouping::Clustered, Some(BarShape::Pyramid)),
            PyramidBarStacked => (BarDirection::Bar, BarGrouping::Stacked, Some(BarShape::Pyramid)),
            PyramidBarStacked100 => (BarDirection::Bar, BarGrouping::PercentStacked, Some(BarShape::Pyramid)),
            PyramidCol => (BarDirection::Column, BarGrouping::Standard, Some(BarShape::Pyramid)),
            PyramidColClustered => (BarDirection::Column, BarGrouping::Clustered, Some(BarShape::Pyramid)),
            PyramidColStacked => (BarDirection::Column, BarGrouping::Stacked, Some(BarShape::Pyramid)),
            PyramidColStacked100 => (BarDirection::Column, BarGrouping::PercentStacked, Some(BarShape::Pyramid)),
            _ => return None,
        };
        Some(BarParts {
            direction,
            grouping,
            shape,
        })
    }

    pub fn bar_direction(self) -> Option<BarDirection> {
        self.bar_parts().map(|p| p.direction)
    }

    pub fn bar_grouping(self) -> Option<BarGrouping> {
        self.bar_parts().map(|p| p.grouping)
    }

    pub fn bar_shape(self) -> Option<BarShape> {
        self.bar_parts().and_then(|p| p.shape)
    }

    pub fn grouping(self) -> Option<Grouping> {
        use ChartType::*;
        match self {
            Area | Area3D | Line | LineMarkers | Line3D => Some(Grouping::Standard),
            AreaStacked | AreaStacked3D | LineStacked | LineMarkersStacked => Some(Grouping::Stacked),
            AreaStacked100 | AreaStacked1003D | LineStacked100 | LineMarkersStacked100 => {
                Some(Grouping::PercentStacked)
            }
            _ => None,
        }
    }

    pub fn scatter_style(self) -> Option<ScatterStyle> {
        use ChartType::*;
        match self {
            XYScatter => Some(ScatterStyle::Marker),
            XYScatterLines => Some(ScatterStyle::LineMarker),
            XYScatterLinesNoMarkers => Some(ScatterStyle::Line),
            XYScatterSmooth => Some(ScatterStyle::SmoothMarker),
            XYScatterSmoothNoMarkers => Some(ScatterStyle::Smooth),
            _ => None,
        }
    }

    pub fn radar_style(self) -> Option<RadarStyle> {
        match self {
            ChartType::Radar => Some(RadarStyle::Standard),
            ChartType::RadarMarkers => Some(RadarStyle::Marker),
            ChartType::RadarFilled => Some(RadarStyle::Filled),
            _ => None,
        }
    }

    /// Whether new series should show markers.
    pub fn shows_markers(self) -> bool {
        use ChartType::*;
        matches!(
            self,
            LineMarkers
                | LineMarkersStacked
                | LineMarkersStacked100
                | XYScatter
                | XYScatterLines
                | XYScatterSmooth
                | RadarMarkers
        )
    }

    /// Number of axes a new group of this subtype references. 3D subtypes without clustering or
    /// stacking use a series axis as the third dimension.
    pub fn axis_count(self) -> usize {
        use ChartType::*;
        match self {
            _ if self.is_pie_like() => 0,
            Line3D | Area3D | Column3D | ConeCol | CylinderCol | PyramidCol | Surface
            | SurfaceWireframe | SurfaceTopView | SurfaceTopViewWireframe => 3,
            _ => 2,
        }
    }

    pub fn is_exploded(self) -> bool {
        matches!(
            self,
            ChartType::PieExploded | ChartType::PieExploded3D | ChartType::DoughnutExploded
        )
    }

    fn from_bar_parts(three_d: bool, direction: BarDirection, grouping: BarGrouping, shape: BarShape) -> ChartType {
        use ChartType::*;
        let bar = direction == BarDirection::Bar;
        if !three_d {
            return match (bar, grouping) {
                (true, BarGrouping::Stacked) => BarStacked,
                (true, BarGrouping::PercentStacked) => BarStacked100,
                (true, _) => BarClustered,
                (false, BarGrouping::Stacked) => ColumnStacked,
                (false, BarGrouping::PercentStacked) => ColumnStacked100,
                (false, _) => ColumnClustered,
            };
        }
        let (clustered, stacked, stacked100, standard) = match (shape, bar) {
            (BarShape::Cone | BarShape::ConeToMax, true) => {
                (ConeBarClustered, ConeBarStacked, ConeBarStacked100, ConeBarClustered)
            }
            (BarShape::Cone | BarShape::ConeToMax, false) => {
                (ConeColClustered, ConeColStacked, ConeColStacked100, ConeCol)
            }
            (BarShape::Cylinder, true) => (
                CylinderBarClustered,
                CylinderBarStacked,
                CylinderBarStacked100,
                CylinderBarClustered,
            ),
            (BarShape::Cylinder, false) => (
                CylinderColClustered,
                CylinderColStacked,
                CylinderColStacked100,
                CylinderCol,
            ),
            (BarShape::Pyramid | BarShape::PyramidToMax, true) => (
                PyramidBarClustered,
                PyramidBarStacked,
                PyramidBarStacked100,
                PyramidBarClustered,
            ),
            (BarShape::Pyramid | BarShape::PyramidToMax, false) => (
                PyramidColClustered,
                PyramidColStacked,
                PyramidColStacked100,
                PyramidCol,
            ),
            (BarShape::Box, true) => (BarClustered3D, BarStacked3D, BarStacked1003D, BarClustered3D),
            (BarShape::Box, false) => (ColumnClustered3D, ColumnStacked3D, ColumnStacked1003D, Column3D),
        };
        match grouping {
            BarGrouping::Clustered => clustered,
            BarGrouping::Stacked => stacked,
            BarGrouping::PercentStacked => stacked100,
            BarGrouping::Standard => standard,
        }
    }

    /// Classifies a group element (`c:barChart`, `c:lineChart`, ...) by its current content.
    pub fn classify(group: &XmlElement) -> Option<ChartType> {
        let family = ChartFamily::from_element_name(&group.name.local)?;
        let val = |local: &str| group.child(Ns::Chart, local).and_then(|el| el.attr("val"));
        let flag = |local: &str| {
            group
                .child(Ns::Chart, local)
                .map(|el| el.attr("val").map_or(true, |v| v == "1" || v == "true"))
        };
        let series: Vec<&XmlElement> = group
            .child_elements()
            .filter(|el| el.name.is(Ns::Chart, "ser"))
            .collect();
        let all_series = |pred: &dyn Fn(&XmlElement) -> bool| {
            !series.is_empty() && series.iter().all(|s| pred(s))
        };
        let no_symbol = |s: &XmlElement| {
            s.child(Ns::Chart, "marker")
                .and_then(|m| m.child(Ns::Chart, "symbol"))
                .and_then(|sym| sym.attr("val"))
                == Some("none")
        };
        let exploded = series.iter().any(|s| {
            s.child(Ns::Chart, "explosion")
                .and_then(|e| e.attr("val"))
                .and_then(|v| v.parse::<u32>().ok())
                .is_some_and(|v| v > 0)
        });

        use ChartType::*;
        let chart_type = match family {
            ChartFamily::Bar | ChartFamily::Bar3D => {
                let direction = val("barDir").map_or(BarDirection::Column, |v| {
                    BarDirection::parse_or(v, BarDirection::Column)
                });
                let grouping = val("grouping").map_or(BarGrouping::Clustered, |v| {
                    BarGrouping::parse_or(v, BarGrouping::Clustered)
                });
                let shape = val("shape").map_or(BarShape::Box, |v| BarShape::parse_or(v, BarShape::Box));
                ChartType::from_bar_parts(family == ChartFamily::Bar3D, direction, grouping, shape)
            }
            ChartFamily::Area | ChartFamily::Area3D => {
                let grouping = val("grouping").map_or(Grouping::Standard, |v| {
                    Grouping::parse_or(v, Grouping::Standard)
                });
                match (family == ChartFamily::Area3D, grouping) {
                    (false, Grouping::Standard) => Area,
                    (false, Grouping::Stacked) => AreaStacked,
                    (false, Grouping::PercentStacked) => AreaStacked100,
                    (true, Grouping::Standard) => Area3D,
                    (true, Grouping::Stacked) => AreaStacked3D,
                    (true, Grouping::PercentStacked) => AreaStacked1003D,
                }
            }
            ChartFamily::Line => {
                let grouping = val("grouping").map_or(Grouping::Standard, |v| {
                    Grouping::parse_or(v, Grouping::Standard)
                });
                let markers = flag("marker") != Some(false) && !all_series(&no_symbol);
                match (markers, grouping) {
                    (false, Grouping::Standard) => Line,
                    (false, Grouping::Stacked) => LineStacked,
                    (false, Grouping::PercentStacked) => LineStacked100,
                    (true, Grouping::Standard) => LineMarkers,
                    (true, Grouping::Stacked) => LineMarkersStacked,
                    (true, Grouping::PercentStacked) => LineMarkersStacked100,
                }
            }
            ChartFamily::Line3D => Line3D,
            ChartFamily::Pie => {
                if exploded {
                    PieExploded
                } else {
                    Pie
                }
            }
            ChartFamily::Pie3D => {
                if exploded {
                    PieExploded3D
                } else {
                    Pie3D
                }
            }
            ChartFamily::Doughnut => {
                if exploded {
                    DoughnutExploded
                } else {
                    Doughnut
                }
            }
            ChartFamily::OfPie => match val("ofPieType").map(|v| OfPieType::parse_or(v, OfPieType::Pie)) {
                Some(OfPieType::Bar) => BarOfPie,
                _ => PieOfPie,
            },
            ChartFamily::Scatter => {
                let style = val("scatterStyle").map_or(ScatterStyle::Marker, |v| {
                    ScatterStyle::parse_or(v, ScatterStyle::Marker)
                });
                let no_line = |s: &XmlElement| {
                    s.child(Ns::Chart, "spPr")
                        .and_then(|sp| sp.child(Ns::Drawing, "ln"))
                        .is_some_and(|ln| ln.child(Ns::Drawing, "noFill").is_some())
                };
                match style {
                    ScatterStyle::Smooth => XYScatterSmoothNoMarkers,
                    ScatterStyle::SmoothMarker if all_series(&no_symbol) => XYScatterSmoothNoMarkers,
                    ScatterStyle::SmoothMarker => XYScatterSmooth,
                    ScatterStyle::Line => XYScatterLinesNoMarkers,
                    ScatterStyle::LineMarker if all_series(&no_line) => XYScatter,
                    ScatterStyle::LineMarker if all_series(&no_symbol) => XYScatterLinesNoMarkers,
                    ScatterStyle::LineMarker => XYScatterLines,
                    ScatterStyle::Marker | ScatterStyle::None => XYScatter,
                }
            }
            ChartFamily::Radar => {
                match val("radarStyle").map_or(RadarStyle::Standard, |v| {
                    RadarStyle::parse_or(v, RadarStyle::Standard)
                }) {
                    RadarStyle::Filled => RadarFilled,
                    RadarStyle::Marker => RadarMarkers,
                    RadarStyle::Standard => Radar,
                }
            }
            ChartFamily::Bubble => {
                if flag("bubble3D") == Some(true) {
                    Bubble3DEffect
                } else {
                    Bubble
                }
            }
            ChartFamily::Surface => {
                if flag("wireframe") == Some(true) {
                    SurfaceTopViewWireframe
                } else {
                    SurfaceTopView
                }
            }
            ChartFamily::Surface3D => {
                if flag("wireframe") == Some(true) {
                    SurfaceWireframe
                } else {
                    Surface
                }
            }
            ChartFamily::Stock => {
                if series.len() >= 4 {
                    StockOHLC
                } else {
                    StockHLC
                }
            }
        };
        Some(chart_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(xml: &str) -> XmlElement {
        XmlElement::parse_fragment(xml)
            .expect("fragment")
            .into_iter()
            .next()
            .expect("element")
    }

    #[test]
    fn bar_direction_and_grouping_select_subtype() {
        let col = group(r#"<c:barChart><c:barDir val="col"/><c:grouping val="clustered"/></c:barChart>"#);
        assert_eq!(ChartType::classify(&col), Some(ChartType::ColumnClustered));
        let bar = group(r#"<c:barChart><c:barDir val="bar"/><c:grouping val="percentStacked"/></c:barChart>"#);
        assert_eq!(ChartType::classify(&bar), Some(ChartType::BarStacked100));
    }

    #[test]
    fn bar3d_shape_and_standard_grouping() {
        let cone = group(r#"<c:bar3DChart><c:barDir val="col"/><c:grouping val="standard"/><c:shape val="cone"/></c:bar3DChart>"#);
        assert_eq!(ChartType::classify(&cone), Some(ChartType::ConeCol));
        let boxed = group(r#"<c:bar3DChart><c:barDir val="col"/><c:grouping val="standard"/></c:bar3DChart>"#);
        assert_eq!(ChartType::classify(&boxed), Some(ChartType::Column3D));
    }

    #[test]
    fn line_markers_follow_series_symbols() {
        let plain = group(
            r#"<c:lineChart><c:grouping val="standard"/><c:ser><c:marker><c:symbol val="none"/></c:marker></c:ser><c:marker val="1"/></c:lineChart>"#,
        );
        assert_eq!(ChartType::classify(&plain), Some(ChartType::Line));
        let markers = group(r#"<c:lineChart><c:grouping val="stacked"/><c:ser/><c:marker val="1"/></c:lineChart>"#);
        assert_eq!(ChartType::classify(&markers), Some(ChartType::LineMarkersStacked));
    }

    #[test]
    fn subtype_components_classify_back() {
        for chart_type in [
            ChartType::ColumnClustered,
            ChartType::BarStacked3D,
            ChartType::CylinderCol,
            ChartType::PyramidBarStacked100,
        ] {
            let xml = format!(
                r#"<c:{el}><c:barDir val="{dir}"/><c:grouping val="{grouping}"/>{shape}</c:{el}>"#,
                el = chart_type.family().element_name(),
                dir = chart_type.bar_direction().expect("dir").as_xml(),
                grouping = chart_type.bar_grouping().expect("grouping").as_xml(),
                shape = chart_type
                    .bar_shape()
                    .map(|s| format!(r#"<c:shape val="{}"/>"#, s.as_xml()))
                    .unwrap_or_default(),
            );
            assert_eq!(ChartType::classify(&group(&xml)), Some(chart_type));
        }
    }

    #[test]
    fn capability_rules() {
        let col3d = ChartType::ColumnClustered3D.capabilities();
        assert!(col3d.is_3d && !col3d.has_trendlines && !col3d.has_data_label_position);
        assert!(ChartType::Pie3D.capabilities().has_data_label_position);
        assert!(ChartType::Line3D.capabilities().has_data_label_position);
        assert!(!ChartType::Doughnut.capabilities().has_data_label_position);
        assert!(!ChartType::ColumnStacked.capabilities().has_trendlines);
        assert!(!ChartType::Pie.capabilities().has_trendlines);
        assert!(ChartType::XYScatter.capabilities().has_trendlines);
        assert!(!ChartType::Pie.capabilities().has_axes);
    }
}
