/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum SkillError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },
    /// Response decoding or protocol-shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// Guard for a retry loop that consumed every attempt without a result.
    #[error("retries exhausted after {attempts} attempts")]
    RetryExhausted { attempts: u32 },
    /// The call was interrupted by client shutdown or task abort.
    #[error("operation cancelled")]
    Cancelled,
    /// Builder or retry-configuration validation failure.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The background runtime could not be started.
    #[error("background runtime error: {0}")]
    Runtime(std::io::Error),
}
