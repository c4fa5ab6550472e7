use thiserror::Error;
use xlchart_charts::ChartError;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml error: {0}")]
    RoXml(#[from] roxmltree::Error),
    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("{part} is not valid UTF-8: {source}")]
    Utf8 {
        part: String,
        #[source]
        source: std::str::Utf8Error,
    },
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("missing package part: {0}")]
    MissingPart(String),
    #[error("workbook has no sheet named `{0}`")]
    MissingSheet(String),
    #[error("part already exists: {0}")]
    DuplicatePart(String),
    #[error("invalid package: {0}")]
    Invalid(String),
    #[error("package part is too large to load safely: {part} is {size} bytes (max {max} bytes)")]
    PartTooLarge { part: String, size: u64, max: u64 },
    #[error("package is too large to load safely: {total} bytes uncompressed (max {max})")]
    PackageTooLarge { total: u64, max: u64 },
}

pub type Result<T, E = PackageError> = std::result::Result<T, E>;

pub(crate) fn utf8<'a>(part: &str, bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|source| PackageError::Utf8 {
        part: part.to_string(),
        source,
    })
}
