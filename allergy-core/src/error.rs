/// Errors surfaced to callers of the advisor.
///
/// Upstream details are kept as `source` (for logging) and never appear in
/// the displayed message.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("City not found or weather service unavailable. Please try again.")]
    WeatherUnavailable,

    #[error("Query history is unavailable right now.")]
    PersistenceFailure(#[source] anyhow::Error),

    #[error("The assistant could not answer right now. Please try again later.")]
    GenerationUnavailable(#[source] anyhow::Error),
}

impl AdvisorError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
