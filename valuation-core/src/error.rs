use thiserror::Error;

/// Failures a single provider lookup can produce.
///
/// Every variant is recoverable at the resolver boundary: the resolver logs
/// the failure and moves on to the next provider, so none of these ever
/// reach the caller of `resolve`.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure: connect error, timeout, or a broken body.
    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The payload could not be normalized: unparseable JSON or a record
    /// missing its required value fields.
    #[error("malformed provider response: {0}")]
    Malformed(String),

    /// The provider explicitly reported no records for the address.
    #[error("no records found for address")]
    NoRecords,
}
