use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The underlying transport failed to deliver the batch.
    Transport,
    /// The request did not complete within the advised timeout.
    Timeout,
    /// The server never replied to the message we sent.
    NoReply,
    /// Operation requires a handshake first.
    NoClientId,
    /// The server does not offer the long-polling transport.
    UnsupportedConnection,
    /// The server refused a request on the given channel.
    Rejected { channel: Box<str>, reason: Box<str> },
    /// The server advised us not to reconnect.
    Disconnected,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => f.write_str("Failed to reach the CometD server."),
            Self::Timeout => f.write_str("The CometD server took too long to respond."),
            Self::NoReply => f.write_str("The CometD server did not reply to our request."),
            Self::NoClientId => f.write_str("Not connected to the CometD server."),
            Self::UnsupportedConnection => f.write_str("The CometD server does not support long-polling."),
            Self::Rejected { channel, reason } => write!(f, "Request on `{channel}` was rejected: {reason}."),
            Self::Disconnected => f.write_str("The CometD server closed the connection."),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
