use crate::{creator, session};
use core::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    Creator(creator::Error),
    Session(session::Error),
    /// Standard input could not be read.
    Prompt,
}

impl From<creator::Error> for Error {
    fn from(err: creator::Error) -> Self {
        Self::Creator(err)
    }
}

impl From<session::Error> for Error {
    fn from(err: session::Error) -> Self {
        Self::Session(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        log::error!("prompt failed: {err}");
        Self::Prompt
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creator(err) => Display::fmt(err, f),
            Self::Session(err) => Display::fmt(err, f),
            Self::Prompt => f.write_str("Failed to read from standard input."),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Creator(err) => Some(err),
            Self::Session(err) => Some(err),
            Self::Prompt => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
