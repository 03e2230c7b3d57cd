use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Missing financial data: {0}")]
    MissingData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
