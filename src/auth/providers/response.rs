//! Token endpoint response shapes shared by the AAD and IMDS credentials.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::AccessToken;
use crate::http::HttpResponse;
use crate::{Error, Result};

/// AAD v1 and IMDS send numeric fields as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum NumberOrString {
    Number(i64),
    Text(String),
}

impl NumberOrString {
    fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<NumberOrString>,
    #[serde(default)]
    expires_on: Option<NumberOrString>,
}

impl TokenResponse {
    pub(super) fn into_access_token(self) -> Result<AccessToken> {
        if self.access_token.is_empty() {
            return Err(Error::auth("token endpoint returned an empty access_token"));
        }

        let expires_at = self
            .expires_on
            .as_ref()
            .and_then(NumberOrString::as_i64)
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

        let token = AccessToken::new(self.access_token);
        Ok(match (expires_at, self.expires_in.as_ref().and_then(NumberOrString::as_i64)) {
            (Some(at), _) => token.with_expiry(at),
            (None, Some(secs)) => token.expires_in(secs).ok_or_else(|| {
                Error::auth(format!("token endpoint returned out-of-range expires_in: {}", secs))
            })?,
            (None, None) => token,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Parse a token endpoint reply, mapping non-2xx statuses to [`Error::TokenRequest`].
pub(super) fn parse_token_response(response: &HttpResponse) -> Result<AccessToken> {
    let status = response.status();
    if !status.is_success() {
        let body: ErrorResponse = response.json().unwrap_or_default();
        let message = body
            .error_description
            .or(body.error)
            .unwrap_or_else(|| response.text());
        return Err(Error::TokenRequest {
            status: status.as_u16(),
            message,
        });
    }

    let parsed: TokenResponse = response.json()?;
    parsed.into_access_token()
}
