use thiserror::Error;

/// Failure taxonomy for one extraction call.
///
/// `DriverInit` and `ElementNotFound` abort the call and reach the HTTP
/// boundary as a single message. Navigation and element errors inside the
/// login sequence never surface here; they are reduced to a `Rejected`
/// outcome. Extraction errors are used internally and reduced to an empty
/// record set before the boundary sees them.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("webdriver session could not be started: {0}")]
    DriverInit(String),

    #[error("required element not found: {0}")]
    ElementNotFound(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("result table not found: {0}")]
    TableNotFound(String),

    #[error("table extraction failed: {0}")]
    Extraction(String),

    #[error("session already closed")]
    SessionClosed,
}
