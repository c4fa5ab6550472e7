//! Worksheet cell lookups used to build series caches.
//!
//! Charts never own cell data; they ask a [`CellSource`] for the values behind a reference such
//! as `'Sales 2024'!$B$2:$B$13` and snapshot them into `c:numCache` / `c:strCache`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChartError;

const MAX_ROWS: u32 = 1_048_576;
const MAX_COLS: u32 = 16_384;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Error literal such as `#N/A`.
    Error(String),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    /// Display text as a chart cache stores it.
    pub fn to_cache_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) | CellValue::Error(s) => Some(s.clone()),
            CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }
}

/// 0-indexed cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parses `B7` or `$B$7`.
    pub fn from_a1(a1: &str) -> Option<Self> {
        let bytes = a1.trim().as_bytes();
        let mut i = usize::from(bytes.first() == Some(&b'$'));
        let col_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        let letters = &bytes[col_start..i];
        if letters.is_empty() || letters.len() > 3 {
            return None;
        }
        if bytes.get(i) == Some(&b'$') {
            i += 1;
        }
        let digits = &bytes[i..];
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }

        let col = letters.iter().fold(0u32, |acc, b| {
            acc * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1
        }) - 1;
        let row: u32 = std::str::from_utf8(digits).ok()?.parse().ok()?;
        if row == 0 || row > MAX_ROWS || col >= MAX_COLS {
            return None;
        }
        Some(Self::new(row - 1, col))
    }

    pub fn to_a1(self) -> String {
        let mut n = self.col + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        format!("{}{}", String::from_utf8_lossy(&letters), self.row + 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// An inclusive, normalized rectangle on an optional sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub sheet: Option<String>,
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    pub fn new(sheet: Option<String>, a: CellRef, b: CellRef) -> Self {
        Self {
            sheet,
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Parses `Sheet1!$A$1:$A$5`, `'My Sheet'!B2` or `A1:C3`. A leading `=` is ignored.
    pub fn parse(reference: &str) -> Result<Self, ChartError> {
        let invalid = || ChartError::InvalidAddress(reference.to_string());
        let s = reference.trim();
        let s = s.strip_prefix('=').unwrap_or(s);

        let (sheet, cells) = match s.rfind('!') {
            Some(bang) => (Some(parse_sheet_name(&s[..bang]).ok_or_else(invalid)?), &s[bang + 1..]),
            None => (None, s),
        };
        let (a, b) = match cells.split_once(':') {
            Some((a, b)) => (a, b),
            None => (cells, cells),
        };
        let a = CellRef::from_a1(a).ok_or_else(invalid)?;
        let b = CellRef::from_a1(b).ok_or_else(invalid)?;
        Ok(Self::new(sheet, a, b))
    }

    pub fn width(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    pub fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start.row..=self.end.row)
            .flat_map(move |row| (self.start.col..=self.end.col).map(move |col| CellRef::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                write!(f, "{sheet}!")?;
            } else {
                write!(f, "'{}'!", sheet.replace('\'', "''"))?;
            }
        }
        write!(f, "${}", col_letters(self.start))?;
        write!(f, "${}", self.start.row + 1)?;
        if self.start != self.end {
            write!(f, ":${}${}", col_letters(self.end), self.end.row + 1)?;
        }
        Ok(())
    }
}

fn col_letters(cell: CellRef) -> String {
    let a1 = cell.to_a1();
    a1.trim_end_matches(|c: char| c.is_ascii_digit()).to_string()
}

fn parse_sheet_name(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.strip_prefix('\'') {
        Some(rest) => {
            let inner = rest.strip_suffix('\'')?;
            Some(inner.replace("''", "'"))
        }
        None => Some(raw.to_string()),
    }
}

/// Read access to worksheet values.
pub trait CellSource {
    fn cell_value(&self, sheet: Option<&str>, cell: CellRef) -> CellValue;

    fn range_values(&self, range: &CellRange) -> Vec<CellValue> {
        range
            .cells()
            .map(|cell| self.cell_value(range.sheet.as_deref(), cell))
            .collect()
    }
}

/// A [`CellSource`] backed by a map, keyed by sheet name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCells {
    default_sheet: String,
    cells: HashMap<(String, CellRef), CellValue>,
}

impl InMemoryCells {
    /// `default_sheet` answers references that carry no sheet name.
    pub fn new(default_sheet: impl Into<String>) -> Self {
        Self {
            default_sheet: default_sheet.into(),
            cells: HashMap::new(),
        }
    }

    pub fn set(&mut self, sheet: &str, a1: &str, value: CellValue) -> Result<(), ChartError> {
        let cell = CellRef::from_a1(a1).ok_or_else(|| ChartError::InvalidAddress(a1.to_string()))?;
        self.cells.insert((sheet.to_string(), cell), value);
        Ok(())
    }

    /// Writes `values` down a column starting at `a1`.
    pub fn set_column(
        &mut self,
        sheet: &str,
        a1: &str,
        values: impl IntoIterator<Item = CellValue>,
    ) -> Result<(), ChartError> {
        let start = CellRef::from_a1(a1).ok_or_else(|| ChartError::InvalidAddress(a1.to_string()))?;
        for (offset, value) in values.into_iter().enumerate() {
            let cell = CellRef::new(start.row + offset as u32, start.col);
            self.cells.insert((sheet.to_string(), cell), value);
        }
        Ok(())
    }
}

impl CellSource for InMemoryCells {
    fn cell_value(&self, sheet: Option<&str>, cell: CellRef) -> CellValue {
        let sheet = sheet.unwrap_or(&self.default_sheet);
        self.cells
            .get(&(sheet.to_string(), cell))
            .cloned()
            .unwrap_or_default()
    }
}
