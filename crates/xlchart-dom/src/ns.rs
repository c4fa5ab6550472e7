//! Namespaces used by chart parts and the drawing parts that anchor them.

pub const NS_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_CHART_EX: &str = "http://schemas.microsoft.com/office/drawing/2014/chartex";
pub const NS_C14: &str = "http://schemas.microsoft.com/office/drawing/2007/8/2/chart";
pub const NS_MARKUP_COMPAT: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
pub const NS_SPREADSHEET_DRAWING: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing";

/// A namespace with a fixed, conventional prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ns {
    Chart,
    Drawing,
    Relationships,
    ChartEx,
    C14,
    MarkupCompat,
    SpreadsheetDrawing,
}

impl Ns {
    pub const ALL: [Ns; 7] = [
        Ns::Chart,
        Ns::Drawing,
        Ns::Relationships,
        Ns::ChartEx,
        Ns::C14,
        Ns::MarkupCompat,
        Ns::SpreadsheetDrawing,
    ];

    pub const fn uri(self) -> &'static str {
        match self {
            Ns::Chart => NS_CHART,
            Ns::Drawing => NS_DRAWING,
            Ns::Relationships => NS_RELATIONSHIPS,
            Ns::ChartEx => NS_CHART_EX,
            Ns::C14 => NS_C14,
            Ns::MarkupCompat => NS_MARKUP_COMPAT,
            Ns::SpreadsheetDrawing => NS_SPREADSHEET_DRAWING,
        }
    }

    pub const fn prefix(self) -> &'static str {
        match self {
            Ns::Chart => "c",
            Ns::Drawing => "a",
            Ns::Relationships => "r",
            Ns::ChartEx => "cx",
            Ns::C14 => "c14",
            Ns::MarkupCompat => "mc",
            Ns::SpreadsheetDrawing => "xdr",
        }
    }

    pub fn from_uri(uri: &str) -> Option<Ns> {
        Ns::ALL.into_iter().find(|ns| ns.uri() == uri)
    }

    pub fn from_prefix(prefix: &str) -> Option<Ns> {
        Ns::ALL.into_iter().find(|ns| ns.prefix() == prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_and_uris_are_unique() {
        for (i, a) in Ns::ALL.iter().enumerate() {
            for b in &Ns::ALL[i + 1..] {
                assert_ne!(a.uri(), b.uri());
                assert_ne!(a.prefix(), b.prefix());
            }
            assert_eq!(Ns::from_uri(a.uri()), Some(*a));
            assert_eq!(Ns::from_prefix(a.prefix()), Some(*a));
        }
    }
}
