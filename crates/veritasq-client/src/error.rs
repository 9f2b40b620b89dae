use veritasq_core::ReplyError;

/// Errors surfaced by the validation client.
///
/// Everything here is fatal for the call that produced it; the one
/// recovered-locally condition (a malformed dataframe shape) never reaches
/// this type because normalization in `veritasq-core` is total.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A provider failed to establish a session.
    #[error("provider '{provider}' failed to connect: {source}")]
    Connect {
        /// Which provider was attempting the connection.
        provider: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<ClientError>,
    },

    /// Transport-level failure (DNS, TLS, timeout, bad status on probe).
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The upload endpoint answered but not with a stored file path.
    #[error("upload rejected: {0}")]
    Upload(String),

    /// A call endpoint answered with a non-success status.
    #[error("endpoint {endpoint} returned {status}: {body}")]
    Endpoint {
        /// Which endpoint was addressed.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The event stream ended without delivering a result payload.
    #[error("event stream for {endpoint} ended without a result: {reason}")]
    Stream {
        /// Which endpoint was addressed.
        endpoint: String,
        /// What the stream contained instead.
        reason: String,
    },

    /// The reply arrived but its tuple shape was malformed.
    #[error("malformed reply: {0}")]
    MalformedReply(#[from] ReplyError),

    /// The invocation strategy or provider list was empty.
    #[error("no endpoint or provider configured")]
    NoEndpoint,
}
