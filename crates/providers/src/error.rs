use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The provider API returned an error: {0}")]
    Api(String),

    #[error("Failed to deserialize the provider response: {0}")]
    Deserialization(String),

    #[error("Credential {0} is not configured")]
    MissingCredentials(&'static str),
}
