use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Client address plus user agent, or `None` when the request carries neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFingerprint(pub Option<String>);

impl ClientFingerprint {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let client = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());

        match (client, agent) {
            (None, None) => Self(None),
            (client, agent) => Self(Some(format!(
                "{}|{}",
                client.unwrap_or("-"),
                agent.unwrap_or("-")
            ))),
        }
    }
}

impl<S> FromRequestParts<S> for ClientFingerprint
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
