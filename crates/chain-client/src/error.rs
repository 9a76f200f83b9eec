use thiserror::Error;

/// Chain access errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The node did not answer within the configured deadline.
    #[error("rpc timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered with an error, or the transport failed.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The node answered with something that does not parse.
    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),
}

/// Result alias for chain operations.
pub type ClientResult<T> = Result<T, ClientError>;
