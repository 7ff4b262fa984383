use thiserror::Error;

/// Failure kinds surfaced by the service layer.
///
/// The variants stay distinct so callers can tell local misconfiguration
/// (`Config`) apart from an outage on the model or price API side.
#[derive(Debug, Error)]
pub enum Error {
    /// The hosted model call failed: transport, quota, bad request, blocked reply.
    #[error("{0}")]
    Upstream(String),

    /// The model replied, but the cleaned text was not a JSON object.
    #[error("model reply was not valid JSON: {0}")]
    Parse(String),

    /// A required credential or setting is missing or malformed.
    #[error("{0}")]
    Config(String),

    /// The price API answered with a non-success status.
    #[error("HTTP error fetching mandi prices ({status}): {body}")]
    UpstreamHttp { status: u16, body: String },

    /// The price API could not be reached or returned an unreadable body.
    #[error("error fetching mandi prices: {0}")]
    UpstreamTransport(String),

    /// Caller-supplied input was rejected before any upstream call.
    #[error("{0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
