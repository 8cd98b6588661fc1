use crate::http::FetchError;
use core::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    NotFound,
    AuthRequired,
    InvalidCredentials,
    InvalidUuid,
    Fetch,
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        log::error!("quiz index request failed: {err}");
        Self::Fetch
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "No matching quiz found. It may be private.",
            Self::AuthRequired => "The quiz index requires an authenticated account.",
            Self::InvalidCredentials => "Invalid email or password.",
            Self::InvalidUuid => "Invalid quiz ID.",
            Self::Fetch => "Something went wrong while talking to the quiz index.",
        })
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
