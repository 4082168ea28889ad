use crate::http::parser::ParseError;

/// Errors that can end a single session.
///
/// Every variant is local to one connection: the listener logs it and the
/// session is torn down. Nothing here is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A read, write, handshake or shutdown operation on the transport failed.
    #[error("{op} failed: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A transport operation did not complete within its deadline.
    #[error("{op} timed out")]
    Timeout { op: &'static str },

    /// The peer sent something that is not valid HTTP or not a valid upgrade.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The request exceeded the configured body ceiling.
    #[error("request body exceeds the limit of {limit} bytes")]
    ResourceLimit { limit: usize },

    /// Token verification failed during the websocket handshake.
    #[error("unauthorized: {0}")]
    Auth(String),
}

impl Error {
    pub fn transport(op: &'static str, source: std::io::Error) -> Self {
        Error::Transport { op, source }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::BodyTooLarge { limit } => Error::ResourceLimit { limit },
            other => Error::Protocol(format!("HTTP parse error: {:?}", other)),
        }
    }
}
