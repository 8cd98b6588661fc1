use crate::http::Fetcher;
use cometd::{message::Message, Error, Result, Transport};
use http::StatusCode;
use hyper::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, Method, Uri,
};
use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
};

/// CometD long-polling over HTTPS. Each batch is one POST to the session endpoint.
pub struct LongPolling {
    fetcher: Fetcher,
    uri: Uri,
    /// The server pins the long-poll to a browser cookie.
    cookies: Mutex<BTreeMap<Box<str>, Box<str>>>,
}

impl LongPolling {
    pub fn new(fetcher: Fetcher, uri: Uri) -> Self {
        Self { fetcher, uri, cookies: Mutex::default() }
    }

    fn cookie_header(&self) -> Option<String> {
        let jar = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        cookie_header(&jar)
    }

    fn store_cookies(&self, headers: &HeaderMap) {
        let mut jar = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        merge_cookies(&mut jar, headers.get_all(SET_COOKIE).iter().filter_map(|value| value.to_str().ok()));
    }

    async fn post(&self, batch: Vec<Message>) -> Result<Vec<Message>> {
        let mut builder = Fetcher::request(Method::POST, self.uri.clone());
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(COOKIE, cookie);
        }

        let req = Fetcher::json(builder, &batch).map_err(|err| {
            log::error!("cannot encode CometD batch: {err}");
            Error::Transport
        })?;
        let res = self.fetcher.send(req).await.map_err(|err| {
            log::warn!("CometD request failed: {err}");
            Error::Transport
        })?;

        self.store_cookies(res.headers());
        if res.status() != StatusCode::OK {
            log::warn!("CometD server responded with {}", res.status());
            return Err(Error::Transport);
        }

        Fetcher::parse(&res).map_err(|err| {
            log::warn!("malformed CometD reply: {err}");
            Error::Transport
        })
    }
}

impl Transport for LongPolling {
    fn send(&self, batch: Vec<Message>) -> impl core::future::Future<Output = Result<Vec<Message>>> + Send {
        self.post(batch)
    }
}

/// Records `name=value` pairs from `Set-Cookie` headers. Attributes are ignored.
fn merge_cookies<'a>(jar: &mut BTreeMap<Box<str>, Box<str>>, headers: impl Iterator<Item = &'a str>) {
    for header in headers {
        let pair = header.split(';').next().unwrap_or_default();
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        jar.insert(name.into(), value.trim().into());
    }
}

fn cookie_header(jar: &BTreeMap<Box<str>, Box<str>>) -> Option<String> {
    if jar.is_empty() {
        return None;
    }
    let pairs: Vec<_> = jar.iter().map(|(name, value)| format!("{name}={value}")).collect();
    Some(pairs.join("; "))
}
