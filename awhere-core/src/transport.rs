//! Blocking HTTP seam between the client and the network.

use reqwest::{
    blocking::Client,
    header::{AUTHORIZATION, CONTENT_TYPE},
};

use crate::error::Result;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One blocking round trip per call. Transport errors are returned as-is.
pub trait Transport {
    /// POST a form-encoded `body` with the given `Authorization` header value.
    fn post_form(&self, url: &str, authorization: &str, body: &str) -> Result<HttpResponse>;

    /// GET `url` with query parameters and the given `Authorization` header value.
    fn get(
        &self,
        url: &str,
        authorization: &str,
        query: &[(&'static str, String)],
    ) -> Result<HttpResponse>;
}

/// `reqwest` blocking client with transport defaults (no custom timeout).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: Client::builder().build()?,
        })
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, url: &str, authorization: &str, body: &str) -> Result<HttpResponse> {
        let res = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(AUTHORIZATION, authorization)
            .body(body.to_owned())
            .send()?;

        let status = res.status().as_u16();
        Ok(HttpResponse::new(status, res.text()?))
    }

    fn get(
        &self,
        url: &str,
        authorization: &str,
        query: &[(&'static str, String)],
    ) -> Result<HttpResponse> {
        let res = self
            .http
            .get(url)
            .query(query)
            .header(AUTHORIZATION, authorization)
            .send()?;

        let status = res.status().as_u16();
        Ok(HttpResponse::new(status, res.text()?))
    }
}
