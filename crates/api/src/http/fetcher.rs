use super::FetchError;
use http::request;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::Bytes,
    header::{ACCEPT, CONTENT_TYPE},
    Method, Request, Response, Uri,
};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::{de::DeserializeOwned, Serialize};

pub const APPLICATION_JSON: &str = "application/json";

type Body = Full<Bytes>;

/// HTTPS-only client shared by the quiz index and the game server.
#[derive(Clone)]
pub struct Fetcher {
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

impl Fetcher {
    pub fn new() -> std::io::Result<Self> {
        let https = hyper_rustls::HttpsConnectorBuilder::new().with_native_roots()?.https_only().enable_http1().build();
        let client = Client::builder(TokioExecutor::new()).build(https);
        Ok(Self { client })
    }

    /// Starts a request that accepts JSON.
    pub fn request(method: Method, uri: Uri) -> request::Builder {
        Request::builder().method(method).uri(uri).header(ACCEPT, APPLICATION_JSON)
    }

    pub fn empty(builder: request::Builder) -> Result<Request<Body>, FetchError> {
        Ok(builder.body(Body::default())?)
    }

    pub fn json<T>(builder: request::Builder, value: &T) -> Result<Request<Body>, FetchError>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec(value)?;
        Ok(builder.header(CONTENT_TYPE, APPLICATION_JSON).body(Body::from(bytes))?)
    }

    /// Sends the request and buffers the whole response body.
    pub async fn send(&self, req: Request<Body>) -> Result<Response<Bytes>, FetchError> {
        log::debug!("{} {}", req.method(), req.uri());
        let (parts, body) = self.client.request(req).await?.into_parts();
        let bytes = body.collect().await?.to_bytes();
        log::debug!("{} ({} bytes)", parts.status, bytes.len());
        Ok(Response::from_parts(parts, bytes))
    }

    pub fn parse<T: DeserializeOwned>(res: &Response<Bytes>) -> Result<T, FetchError> {
        Ok(serde_json::from_slice(res.body())?)
    }
}
