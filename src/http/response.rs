//! Buffered response.

use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::HttpHeaders;
use crate::Result;

#[derive(Clone, Debug)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HttpHeaders,
    body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: Bytes::new(),
        }
    }

    pub fn from_parts(status: StatusCode, headers: HttpHeaders, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Buffer a `reqwest` response.
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = HttpHeaders::from(response.headers().clone());
        let body = response.bytes().await?;
        Ok(Self::from_parts(status, headers, body))
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        self.headers.add(name, value)?;
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// 3xx other than `304 Not Modified`.
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection() && self.status != StatusCode::NOT_MODIFIED
    }

    /// Non-empty `Location` header.
    pub fn location(&self) -> Option<String> {
        self.headers
            .value("location")
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
