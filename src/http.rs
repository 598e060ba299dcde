use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{Error, Result};

/// Raw outcome of an HTTP GET. Status checking is left to the caller, since
/// the sync layer distinguishes dataset from manifest failures.
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Narrow HTTP GET capability consumed by the sync layer, so it can be
/// exercised against fakes.
pub trait HttpFetch {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

pub struct ReqwestFetch {
    client: Client,
}

impl ReqwestFetch {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("circle-scraper/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        ReqwestFetch { client }
    }
}

impl Default for ReqwestFetch {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetch for ReqwestFetch {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| Error::RemoteFetch {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .map_err(|source| Error::RemoteFetch {
                url: url.to_string(),
                source,
            })?
            .to_vec();
        Ok(HttpResponse { status, body })
    }
}
