use thiserror::Error;

/// Spreadsheet error values a financial function can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ExcelError {
    #[error("#NUM!")]
    Num,
    #[error("#DIV/0!")]
    Div0,
    #[error("#VALUE!")]
    Value,
}

impl ExcelError {
    /// The literal Excel displays in the cell.
    pub fn as_code(self) -> &'static str {
        match self {
            ExcelError::Num => "#NUM!",
            ExcelError::Div0 => "#DIV/0!",
            ExcelError::Value => "#VALUE!",
        }
    }
}

pub type ExcelResult<T> = Result<T, ExcelError>;

/// Maps non-finite results to `#NUM!`.
pub(crate) fn finite(value: f64) -> ExcelResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExcelError::Num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_cell_literal() {
        assert_eq!(ExcelError::Num.to_string(), "#NUM!");
        assert_eq!(ExcelError::Div0.as_code(), "#DIV/0!");
        assert_eq!(finite(f64::NAN), Err(ExcelError::Num));
        assert_eq!(finite(1.5), Ok(1.5));
    }
}
