//! `val` attribute enumerations.
//!
//! Each enumeration carries its own token table: the schema is not consistent about casing
//! (`col`, `percentStacked`, `b`, `stdDev`, `cust`), so tokens are listed explicitly rather than
//! derived from variant names.

use serde::{Deserialize, Serialize};

pub trait XmlEnum: Copy + Sized + 'static {
    const NAME: &'static str;
    const ALL: &'static [Self];

    fn as_xml(self) -> &'static str;

    /// Exact token match, then a case-insensitive one for writers that ignore casing.
    fn from_xml(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_xml() == token)
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_xml().eq_ignore_ascii_case(token))
            })
    }

    /// Parses a token, falling back to `default` (with a warning) when it is not recognized.
    fn parse_or(token: &str, default: Self) -> Self {
        Self::from_xml(token).unwrap_or_else(|| {
            log::warn!(
                "unknown {} value `{token}`; using `{}`",
                Self::NAME,
                default.as_xml()
            );
            default
        })
    }
}

macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $($variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum $name {
            $($variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl XmlEnum for $name {
            const NAME: &'static str = stringify!($name);
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_xml(self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl $crate::property::ValCodec for $name {
            fn decode(raw: &str) -> Option<Self> {
                <Self as XmlEnum>::from_xml(raw)
            }

            fn encode(&self) -> String {
                self.as_xml().to_string()
            }
        }
    };
}

xml_enum! {
    BarDirection default Column {
        Bar => "bar",
        Column => "col",
    }
}

xml_enum! {
    /// `c:grouping` inside bar groups.
    BarGrouping default Clustered {
        Clustered => "clustered",
        Stacked => "stacked",
        PercentStacked => "percentStacked",
        Standard => "standard",
    }
}

xml_enum! {
    /// `c:grouping` inside line and area groups.
    Grouping default Standard {
        Standard => "standard",
        Stacked => "stacked",
        PercentStacked => "percentStacked",
    }
}

xml_enum! {
    BarShape default Box {
        Box => "box",
        Cone => "cone",
        ConeToMax => "coneToMax",
        Cylinder => "cylinder",
        Pyramid => "pyramid",
        PyramidToMax => "pyramidToMax",
    }
}

xml_enum! {
    ScatterStyle default Marker {
        None => "none",
        Line => "line",
        LineMarker => "lineMarker",
        Marker => "marker",
        Smooth => "smooth",
        SmoothMarker => "smoothMarker",
    }
}

xml_enum! {
    RadarStyle default Standard {
        Standard => "standard",
        Marker => "marker",
        Filled => "filled",
    }
}

xml_enum! {
    OfPieType default Pie {
        Pie => "pie",
        Bar => "bar",
    }
}

xml_enum! {
    SplitType default Auto {
        Auto => "auto",
        Custom => "cust",
        Percent => "percent",
        Position => "pos",
        Value => "val",
    }
}

xml_enum! {
    SizeRepresents default Area {
        Area => "area",
        Width => "w",
    }
}

xml_enum! {
    LegendPosition default Right {
        Bottom => "b",
        TopRight => "tr",
        Left => "l",
        Right => "r",
        Top => "t",
    }
}

xml_enum! {
    AxisPosition default Bottom {
        Bottom => "b",
        Left => "l",
        Right => "r",
        Top => "t",
    }
}

xml_enum! {
    /// Absent tick marks render as `cross`, not `none`.
    TickMark default Cross {
        Cross => "cross",
        In => "in",
        None => "none",
        Out => "out",
    }
}

xml_enum! {
    TickLabelPosition default NextTo {
        High => "high",
        Low => "low",
        NextTo => "nextTo",
        None => "none",
    }
}

xml_enum! {
    Crosses default AutoZero {
        AutoZero => "autoZero",
        Max => "max",
        Min => "min",
    }
}

xml_enum! {
    CrossBetween default Between {
        Between => "between",
        MidCategory => "midCat",
    }
}

xml_enum! {
    AxisOrientation default MinMax {
        MinMax => "minMax",
        MaxMin => "maxMin",
    }
}

xml_enum! {
    DataLabelPosition default BestFit {
        BestFit => "bestFit",
        Bottom => "b",
        Center => "ctr",
        InBase => "inBase",
        InEnd => "inEnd",
        Left => "l",
        OutEnd => "outEnd",
        Right => "r",
        Top => "t",
    }
}

xml_enum! {
    MarkerStyle default Auto {
        Auto => "auto",
        Circle => "circle",
        Dash => "dash",
        Diamond => "diamond",
        Dot => "dot",
        None => "none",
        Picture => "picture",
        Plus => "plus",
        Square => "square",
        Star => "star",
        Triangle => "triangle",
        X => "x",
    }
}

xml_enum! {
    TrendlineType default Linear {
        Exponential => "exp",
        Linear => "linear",
        Logarithmic => "log",
        MovingAverage => "movingAvg",
        Polynomial => "poly",
        Power => "power",
    }
}

xml_enum! {
    ErrorBarDirection default Y {
        X => "x",
        Y => "y",
    }
}

xml_enum! {
    ErrorBarType default Both {
        Both => "both",
        Minus => "minus",
        Plus => "plus",
    }
}

xml_enum! {
    ErrorValueType default FixedValue {
        Custom => "cust",
        FixedValue => "fixedVal",
        Percentage => "percentage",
        StandardDeviation => "stdDev",
        StandardError => "stdErr",
    }
}

xml_enum! {
    DisplayBlanksAs default Zero {
        Gap => "gap",
        Span => "span",
        Zero => "zero",
    }
}

xml_enum! {
    TimeUnit default Days {
        Days => "days",
        Months => "months",
        Years => "years",
    }
}

xml_enum! {
    LabelAlignment default Center {
        Center => "ctr",
        Left => "l",
        Right => "r",
    }
}

xml_enum! {
    BuiltInUnit default Thousands {
        Hundreds => "hundreds",
        Thousands => "thousands",
        TenThousands => "tenThousands",
        HundredThousands => "hundredThousands",
        Millions => "millions",
        TenMillions => "tenMillions",
        HundredMillions => "hundredMillions",
        Billions => "billions",
        Trillions => "trillions",
    }
}
