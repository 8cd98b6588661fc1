use std::fmt::{self, Display};

#[derive(Debug)]
pub enum FetchError {
    Client(hyper_util::client::legacy::Error),
    Hyper(hyper::Error),
    Http(http::Error),
    Json(serde_json::Error),
}

impl From<hyper_util::client::legacy::Error> for FetchError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Client(err)
    }
}

impl From<hyper::Error> for FetchError {
    fn from(err: hyper::Error) -> Self {
        Self::Hyper(err)
    }
}

impl From<http::Error> for FetchError {
    fn from(err: http::Error) -> Self {
        Self::Http(err)
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(err) => write!(f, "request failed: {err}"),
            Self::Hyper(err) => write!(f, "failed to read response body: {err}"),
            Self::Http(err) => write!(f, "malformed request: {err}"),
            Self::Json(err) => write!(f, "unexpected JSON: {err}"),
        }
    }
}

impl std::error::Error for FetchError {}
