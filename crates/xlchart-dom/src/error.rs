use thiserror::Error;

/// Failure to combine partial child orders into one canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("child `{name}` is declared in two different choice groups")]
    InconsistentSlot { name: &'static str },
    #[error("partial child orders disagree on the relative order of {names:?}")]
    Conflict { names: Vec<&'static str> },
}

#[derive(Debug, Error)]
pub enum DomError {
    #[error("xml parse error: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("xml is not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("cannot create `{step}` under `{parent}`: only {existing} matching siblings exist")]
    MissingSibling {
        parent: String,
        step: String,
        existing: usize,
    },
    #[error("node not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Order(#[from] OrderError),
}
