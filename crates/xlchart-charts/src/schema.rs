//! Child orders for the chart elements this crate creates (`dml-chart.xsd`).
//!
//! Series and axis content models share a common prefix; the per-family tails are merged onto it
//! with [`ChildOrder::merge`] so a typo in one table shows up as a merge conflict in the tests.

use std::sync::OnceLock;

use xlchart_dom::{ChildOrder, SchemaRegistry, Slot};

use crate::chart_type::ChartFamily;

const CHART_SPACE: &[Slot] = &[
    &["date1904"],
    &["lang"],
    &["roundedCorners"],
    &["AlternateContent"],
    &["style"],
    &["clrMapOvr"],
    &["pivotSource"],
    &["protection"],
    &["chart"],
    &["spPr"],
    &["txPr"],
    &["externalData"],
    &["printSettings"],
    &["userShapes"],
    &["extLst"],
];

const CHART: &[Slot] = &[
    &["title"],
    &["autoTitleDeleted"],
    &["pivotFmts"],
    &["view3D"],
    &["floor"],
    &["sideWall"],
    &["backWall"],
    &["plotArea"],
    &["legend"],
    &["plotVisOnly"],
    &["dispBlanksAs"],
    &["showDLblsOverMax"],
    &["extLst"],
];

const GROUP_ELEMENTS: Slot = &[
    "areaChart",
    "area3DChart",
    "lineChart",
    "line3DChart",
    "stockChart",
    "radarChart",
    "scatterChart",
    "pieChart",
    "pie3DChart",
    "doughnutChart",
    "barChart",
    "bar3DChart",
    "ofPieChart",
    "surfaceChart",
    "surface3DChart",
    "bubbleChart",
];

const AXIS_ELEMENTS: Slot = &["valAx", "catAx", "dateAx", "serAx"];

const PLOT_AREA: &[Slot] = &[
    &["layout"],
    GROUP_ELEMENTS,
    AXIS_ELEMENTS,
    &["dTable"],
    &["spPr"],
    &["extLst"],
];

const TITLE: &[Slot] = &[
    &["tx"],
    &["layout"],
    &["overlay"],
    &["spPr"],
    &["txPr"],
    &["extLst"],
];

/// `c:tx` is `strRef | rich` in titles and `strRef | v` in series; the union keeps one rank.
const TX: &[Slot] = &[&["strRef", "rich", "v"]];

const RICH: &[Slot] = &[&["bodyPr"], &["lstStyle"], &["p"]];
const PARAGRAPH: &[Slot] = &[&["pPr"], &["r", "br", "fld"], &["endParaRPr"]];
const RUN: &[Slot] = &[&["rPr"], &["t"]];

const LEGEND: &[Slot] = &[
    &["legendPos"],
    &["legendEntry"],
    &["layout"],
    &["overlay"],
    &["spPr"],
    &["txPr"],
    &["extLst"],
];

const LEGEND_ENTRY: &[Slot] = &[&["idx"], &["delete", "txPr"], &["extLst"]];

const VIEW_3D: &[Slot] = &[
    &["rotX"],
    &["hPercent"],
    &["rotY"],
    &["depthPercent"],
    &["rAngAx"],
    &["perspective"],
    &["extLst"],
];

const BAR: &[Slot] = &[
    &["barDir"],
    &["grouping"],
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["gapWidth"],
    &["overlap"],
    &["serLines"],
    &["axId"],
    &["extLst"],
];

const BAR_3D: &[Slot] = &[
    &["barDir"],
    &["grouping"],
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["gapWidth"],
    &["gapDepth"],
    &["shape"],
    &["axId"],
    &["extLst"],
];

const LINE: &[Slot] = &[
    &["grouping"],
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["dropLines"],
    &["hiLowLines"],
    &["upDownBars"],
    &["marker"],
    &["smooth"],
    &["axId"],
    &["extLst"],
];

const LINE_3D: &[Slot] = &[
    &["grouping"],
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["dropLines"],
    &["gapDepth"],
    &["axId"],
    &["extLst"],
];

const AREA: &[Slot] = &[
    &["grouping"],
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["dropLines"],
    &["axId"],
    &["extLst"],
];

const AREA_3D: &[Slot] = &[
    &["grouping"],
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["dropLines"],
    &["gapDepth"],
    &["axId"],
    &["extLst"],
];

const PIE: &[Slot] = &[&["varyColors"], &["ser"], &["dLbls"], &["firstSliceAng"], &["extLst"]];
const PIE_3D: &[Slot] = &[&["varyColors"], &["ser"], &["dLbls"], &["extLst"]];
const DOUGHNUT: &[Slot] = &[
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["firstSliceAng"],
    &["holeSize"],
    &["extLst"],
];

const OF_PIE: &[Slot] = &[
    &["ofPieType"],
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["gapWidth"],
    &["splitType"],
    &["splitPos"],
    &["custSplit"],
    &["secondPieSize"],
    &["serLines"],
    &["extLst"],
];

const SCATTER: &[Slot] = &[
    &["scatterStyle"],
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["axId"],
    &["extLst"],
];

const RADAR: &[Slot] = &[
    &["radarStyle"],
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["axId"],
    &["extLst"],
];

const BUBBLE: &[Slot] = &[
    &["varyColors"],
    &["ser"],
    &["dLbls"],
    &["bubble3D"],
    &["bubbleScale"],
    &["showNegBubbles"],
    &["sizeRepresents"],
    &["axId"],
    &["extLst"],
];

const STOCK: &[Slot] = &[
    &["ser"],
    &["dLbls"],
    &["dropLines"],
    &["hiLowLines"],
    &["upDownBars"],
    &["axId"],
    &["extLst"],
];

const SURFACE: &[Slot] = &[&["wireframe"], &["ser"], &["bandFmts"], &["axId"], &["extLst"]];

const SER_BASE: &[Slot] = &[&["idx"], &["order"], &["tx"], &["spPr"]];

const SER_BAR: &[Slot] = &[
    &["spPr"],
    &["invertIfNegative"],
    &["pictureOptions"],
    &["dPt"],
    &["dLbls"],
    &["trendline"],
    &["errBars"],
    &["cat"],
    &["val"],
    &["shape"],
    &["extLst"],
];

const SER_LINE: &[Slot] = &[
    &["spPr"],
    &["marker"],
    &["dPt"],
    &["dLbls"],
    &["trendline"],
    &["errBars"],
    &["cat"],
    &["val"],
    &["smooth"],
    &["extLst"],
];

const SER_AREA: &[Slot] = &[
    &["spPr"],
    &["pictureOptions"],
    &["dPt"],
    &["dLbls"],
    &["trendline"],
    &["errBars"],
    &["cat"],
    &["val"],
    &["extLst"],
];

const SER_PIE: &[Slot] = &[
    &["spPr"],
    &["explosion"],
    &["dPt"],
    &["dLbls"],
    &["cat"],
    &["val"],
    &["extLst"],
];

const SER_SCATTER: &[Slot] = &[
    &["spPr"],
    &["marker"],
    &["dPt"],
    &["dLbls"],
    &["trendline"],
    &["errBars"],
    &["xVal"],
    &["yVal"],
    &["smooth"],
    &["extLst"],
];

const SER_RADAR: &[Slot] = &[
    &["spPr"],
    &["marker"],
    &["dPt"],
    &["dLbls"],
    &["cat"],
    &["val"],
    &["extLst"],
];

const SER_BUBBLE: &[Slot] = &[
    &["spPr"],
    &["invertIfNegative"],
    &["dPt"],
    &["dLbls"],
    &["trendline"],
    &["errBars"],
    &["xVal"],
    &["yVal"],
    &["bubbleSize"],
    &["bubble3D"],
    &["extLst"],
];

const SER_SURFACE: &[Slot] = &[&["spPr"], &["cat"], &["val"], &["extLst"]];

const DATA_POINT: &[Slot] = &[
    &["idx"],
    &["invertIfNegative"],
    &["marker"],
    &["bubble3D"],
    &["explosion"],
    &["spPr"],
    &["pictureOptions"],
    &["extLst"],
];

const MARKER: &[Slot] = &[&["symbol"], &["size"], &["spPr"], &["extLst"]];

const DATA_LABELS: &[Slot] = &[
    &["dLbl"],
    &["delete"],
    &["numFmt"],
    &["spPr"],
    &["txPr"],
    &["dLblPos"],
    &["showLegendKey"],
    &["showVal"],
    &["showCatName"],
    &["showSerName"],
    &["showPercent"],
    &["showBubbleSize"],
    &["separator"],
    &["showLeaderLines"],
    &["leaderLines"],
    &["extLst"],
];

const DATA_LABEL: &[Slot] = &[
    &["idx"],
    &["delete"],
    &["layout"],
    &["tx"],
    &["numFmt"],
    &["spPr"],
    &["txPr"],
    &["dLblPos"],
    &["showLegendKey"],
    &["showVal"],
    &["showCatName"],
    &["showSerName"],
    &["showPercent"],
    &["showBubbleSize"],
    &["separator"],
    &["extLst"],
];

const TRENDLINE: &[Slot] = &[
    &["name"],
    &["spPr"],
    &["trendlineType"],
    &["order"],
    &["period"],
    &["forward"],
    &["backward"],
    &["intercept"],
    &["dispRSqr"],
    &["dispEq"],
    &["trendlineLbl"],
    &["extLst"],
];

const ERROR_BARS: &[Slot] = &[
    &["errDir"],
    &["errBarType"],
    &["errValType"],
    &["noEndCap"],
    &["plus"],
    &["minus"],
    &["val"],
    &["spPr"],
    &["extLst"],
];

/// `cat`/`xVal` (`CT_AxDataSource`) and `val`/`yVal`/`bubbleSize`/`plus`/`minus` (`CT_NumDataSource`).
const DATA_SOURCE: &[Slot] = &[&["multiLvlStrRef", "numRef", "numLit", "strRef", "strLit"]];
const REFERENCE: &[Slot] = &[&["f"], &["numCache", "strCache", "multiLvlStrCache"], &["extLst"]];
const NUMBER_DATA: &[Slot] = &[&["formatCode"], &["ptCount"], &["pt"], &["extLst"]];
const STRING_DATA: &[Slot] = &[&["ptCount"], &["pt"], &["extLst"]];

const SCALING: &[Slot] = &[&["logBase"], &["orientation"], &["max"], &["min"], &["extLst"]];

const AXIS_BASE: &[Slot] = &[
    &["axId"],
    &["scaling"],
    &["delete"],
    &["axPos"],
    &["majorGridlines"],
    &["minorGridlines"],
    &["title"],
    &["numFmt"],
    &["majorTickMark"],
    &["minorTickMark"],
    &["tickLblPos"],
    &["spPr"],
    &["txPr"],
    &["crossAx"],
    &["crosses", "crossesAt"],
];

const CAT_AX: &[Slot] = &[
    &["crosses", "crossesAt"],
    &["auto"],
    &["lblAlgn"],
    &["lblOffset"],
    &["tickLblSkip"],
    &["tickMarkSkip"],
    &["noMultiLvlLbl"],
    &["extLst"],
];

const VAL_AX: &[Slot] = &[
    &["crosses", "crossesAt"],
    &["crossBetween"],
    &["majorUnit"],
    &["minorUnit"],
    &["dispUnits"],
    &["extLst"],
];

const DATE_AX: &[Slot] = &[
    &["crosses", "crossesAt"],
    &["auto"],
    &["lblOffset"],
    &["baseTimeUnit"],
    &["majorUnit"],
    &["majorTimeUnit"],
    &["minorUnit"],
    &["minorTimeUnit"],
    &["extLst"],
];

const SER_AX: &[Slot] = &[
    &["crosses", "crossesAt"],
    &["tickLblSkip"],
    &["tickMarkSkip"],
    &["extLst"],
];

const DISPLAY_UNITS: &[Slot] = &[&["custUnit", "builtInUnit"], &["dispUnitsLbl"], &["extLst"]];

fn series_tail(family: ChartFamily) -> &'static [Slot] {
    match family {
        ChartFamily::Bar | ChartFamily::Bar3D => SER_BAR,
        ChartFamily::Line | ChartFamily::Line3D | ChartFamily::Stock => SER_LINE,
        ChartFamily::Area | ChartFamily::Area3D => SER_AREA,
        ChartFamily::Pie | ChartFamily::Pie3D | ChartFamily::Doughnut | ChartFamily::OfPie => SER_PIE,
        ChartFamily::Scatter => SER_SCATTER,
        ChartFamily::Radar => SER_RADAR,
        ChartFamily::Bubble => SER_BUBBLE,
        ChartFamily::Surface | ChartFamily::Surface3D => SER_SURFACE,
    }
}

fn group_order(family: ChartFamily) -> &'static [Slot] {
    match family {
        ChartFamily::Area => AREA,
        ChartFamily::Area3D => AREA_3D,
        ChartFamily::Line => LINE,
        ChartFamily::Line3D => LINE_3D,
        ChartFamily::Stock => STOCK,
        ChartFamily::Radar => RADAR,
        ChartFamily::Scatter => SCATTER,
        ChartFamily::Pie => PIE,
        ChartFamily::Pie3D => PIE_3D,
        ChartFamily::Doughnut => DOUGHNUT,
        ChartFamily::Bar => BAR,
        ChartFamily::Bar3D => BAR_3D,
        ChartFamily::OfPie => OF_PIE,
        ChartFamily::Surface | ChartFamily::Surface3D => SURFACE,
        ChartFamily::Bubble => BUBBLE,
    }
}

fn build() -> Result<SchemaRegistry, xlchart_dom::OrderError> {
    let mut registry = SchemaRegistry::new();
    let simple: &[(&'static str, &[Slot])] = &[
        ("chartSpace", CHART_SPACE),
        ("chart", CHART),
        ("plotArea", PLOT_AREA),
        ("title", TITLE),
        ("tx", TX),
        ("rich", RICH),
        ("txPr", RICH),
        ("p", PARAGRAPH),
        ("r", RUN),
        ("legend", LEGEND),
        ("legendEntry", LEGEND_ENTRY),
        ("view3D", VIEW_3D),
        ("dPt", DATA_POINT),
        ("marker", MARKER),
        ("dLbls", DATA_LABELS),
        ("dLbl", DATA_LABEL),
        ("trendline", TRENDLINE),
        ("errBars", ERROR_BARS),
        ("cat", DATA_SOURCE),
        ("val", DATA_SOURCE),
        ("xVal", DATA_SOURCE),
        ("yVal", DATA_SOURCE),
        ("bubbleSize", DATA_SOURCE),
        ("plus", DATA_SOURCE),
        ("minus", DATA_SOURCE),
        ("numRef", REFERENCE),
        ("strRef", REFERENCE),
        ("multiLvlStrRef", REFERENCE),
        ("numCache", NUMBER_DATA),
        ("numLit", NUMBER_DATA),
        ("strCache", STRING_DATA),
        ("strLit", STRING_DATA),
        ("scaling", SCALING),
        ("dispUnits", DISPLAY_UNITS),
    ];
    for (parent, order) in simple {
        registry.register(*parent, ChildOrder::new(order));
    }

    for family in ChartFamily::ALL {
        let element = family.element_name();
        registry.register(element, ChildOrder::new(group_order(family)));
        registry.register_in(
            "ser",
            Some(element),
            ChildOrder::merge(&[SER_BASE, series_tail(family)])?,
        );
    }
    // Fallback when a series is addressed without its group.
    registry.register("ser", ChildOrder::merge(&[SER_BASE, SER_BAR])?);

    registry.register("catAx", ChildOrder::merge(&[AXIS_BASE, CAT_AX])?);
    registry.register("valAx", ChildOrder::merge(&[AXIS_BASE, VAL_AX])?);
    registry.register("dateAx", ChildOrder::merge(&[AXIS_BASE, DATE_AX])?);
    registry.register("serAx", ChildOrder::merge(&[AXIS_BASE, SER_AX])?);
    Ok(registry)
}

/// Process-wide registry shared by every chart document.
pub fn registry() -> &'static SchemaRegistry {
    static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| match build() {
        Ok(registry) => registry,
        Err(err) => {
            // The tables are static; a conflict is caught by `tables_merge_cleanly`.
            log::error!("chart schema tables do not merge: {err}");
            SchemaRegistry::new()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tables_merge_cleanly() {
        build().expect("schema tables merge");
    }

    #[test]
    fn series_order_depends_on_family() {
        let registry = registry();
        let bar = registry.order_for("ser", Some("barChart")).expect("bar");
        let scatter = registry.order_for("ser", Some("scatterChart")).expect("scatter");
        assert!(bar.rank("invertIfNegative") < bar.rank("cat"));
        assert!(scatter.rank("xVal") < scatter.rank("yVal"));
        assert_eq!(scatter.rank("cat"), None);
        assert_eq!(
            registry
                .order_for("ser", Some("pieChart"))
                .expect("pie")
                .names()
                .collect::<Vec<_>>(),
            vec!["idx", "order", "tx", "spPr", "explosion", "dPt", "dLbls", "cat", "val", "extLst"]
        );
    }

    #[test]
    fn axis_tails_follow_crosses() {
        let val = registry().order_for("valAx", None).expect("valAx");
        assert!(val.rank("crossAx") < val.rank("crossesAt"));
        assert_eq!(val.rank("crosses"), val.rank("crossesAt"));
        assert!(val.rank("crossesAt") < val.rank("crossBetween"));
    }
}
