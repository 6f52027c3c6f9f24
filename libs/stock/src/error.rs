use thiserror::Error;

#[derive(Debug, Error)]
pub enum StockError {
    /// The provider has no instrument for this symbol
    #[error("ticker {0} not found")]
    TickerNotFound(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error {code}: {description}")]
    Api { code: String, description: String },

    #[error("missing data: {0}")]
    MissingData(String),

    #[error("render error: {0}")]
    Render(String),
}

impl From<charming::EchartsError> for StockError {
    fn from(e: charming::EchartsError) -> Self {
        StockError::Render(e.to_string())
    }
}
