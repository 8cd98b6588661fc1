use crate::http::FetchError;
use core::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No game is hosted under this PIN.
    InvalidPin,
    ConnectionRefused,
    /// The reservation challenge could not be solved.
    Challenge,
    /// The host reported an error. Always fatal.
    Host(Box<str>),
    /// The session ended or could not be continued.
    Lost,
    Fetch,
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        log::error!("game server request failed: {err}");
        Self::Fetch
    }
}

impl From<cometd::Error> for Error {
    fn from(err: cometd::Error) -> Self {
        log::error!("game session failed: {err}");
        Self::Lost
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin => f.write_str("No game exists with this PIN."),
            Self::ConnectionRefused => f.write_str("The game server refused the connection."),
            Self::Challenge => f.write_str("Failed to solve the session challenge."),
            Self::Host(description) => write!(f, "The game host reported an error: {description}"),
            Self::Lost => f.write_str("Lost connection to the game."),
            Self::Fetch => f.write_str("Something went wrong while talking to the game server."),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
