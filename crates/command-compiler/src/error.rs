use thiserror::Error;

pub type Result<T, E = ProviderError> = core::result::Result<T, E>;

/// Failure reported by a language model provider
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("no credentials configured for provider: {0}")]
    MissingCredentials(String),
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("provider returned an empty completion")]
    EmptyResponse,
}
