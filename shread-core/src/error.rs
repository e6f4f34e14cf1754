/// Error types for the live data path
use thiserror::Error;

/// Errors raised while fetching or parsing a live AWDB response.
///
/// These never reach the plot assembler: [`crate::observation::ObservationSource`]
/// implementations log them and hand back an empty frame.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("Bad response status: {0}")]
    BadStatus(u16),

    /// Response body was empty or carried no data rows
    #[error("Empty response for {0}")]
    EmptyResponse(String),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// A row carried an unparseable timestamp
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// Every attempt failed
    #[error("All {attempts} attempts failed for {site}")]
    RetriesExhausted { site: String, attempts: u32 },
}

/// Type alias for Results using FetchError
pub type Result<T> = std::result::Result<T, FetchError>;
