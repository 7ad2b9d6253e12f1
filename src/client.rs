use async_trait::async_trait;
use http::{header::CONTENT_TYPE, Method, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};

use crate::{cache::FetchCache, config::Config, error::ApiError};

// Characters that may not appear raw inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Encodes an opaque id for use as one path segment.
pub fn seg(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub idempotency_key: Option<String>,
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// One round trip to the backend. `Ok(None)` is an empty (204) body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ApiError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().gzip(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let res = builder.send().await?;
        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = res.json::<Value>().await.ok();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, body.as_ref()),
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = res.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

/// Picks the human-readable message out of a backend error body.
pub fn error_message(status: StatusCode, body: Option<&Value>) -> String {
    body.and_then(|b| {
        ["error", "detail", "message"]
            .iter()
            .find_map(|k| b.get(*k).and_then(Value::as_str))
    })
    .map(str::to_owned)
    .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Typed JSON client over a [`Transport`], with the shared GET cache.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cache: FetchCache,
}

impl ApiClient {
    pub fn new<T: Transport + 'static>(transport: T, cache_ttl: Duration) -> Self {
        Self {
            transport: Arc::new(transport),
            cache: FetchCache::new(cache_ttl),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(cfg.api_base_url.clone(), cfg.api_token.clone())?;
        Ok(Self::new(transport, cfg.cache_ttl))
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    /// Cached read. Serves a fresh-enough entry without a round trip.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        if let Some(hit) = self.cache.get(path).await {
            tracing::debug!(path, "cache hit");
            return Ok(serde_json::from_value(hit)?);
        }
        self.fetch(path).await
    }

    /// Uncached read. The response replaces whatever the cache held.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self
            .send(Method::GET, path, None, None)
            .await?
            .ok_or_else(|| ApiError::EmptyBody(path.to_owned()))?;
        self.cache.insert(path, value.clone()).await;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.write_expecting(Method::POST, path, body, None).await
    }

    /// POST carrying an `Idempotency-Key`, so a replay of the same logical
    /// create can be recognised by the server.
    pub async fn post_idempotent<T, B>(&self, path: &str, body: &B, key: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.write_expecting(Method::POST, path, body, Some(key)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, Some(body), None).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None, None).await?;
        Ok(())
    }

    pub async fn invalidate(&self, pattern: &str) {
        let dropped = self.cache.invalidate(pattern).await;
        tracing::debug!(pattern, dropped, "cache invalidated");
    }

    pub async fn invalidate_all<S: AsRef<str>>(&self, patterns: &[S]) {
        for p in patterns {
            self.invalidate(p.as_ref()).await;
        }
    }

    async fn write_expecting<T, B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        key: Option<&str>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        let value = self
            .send(method, path, Some(body), key)
            .await?
            .ok_or_else(|| ApiError::EmptyBody(path.to_owned()))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        key: Option<&str>,
    ) -> Result<Option<Value>, ApiError> {
        let request = ApiRequest {
            method,
            path: path.to_owned(),
            body,
            idempotency_key: key.map(str::to_owned),
        };
        tracing::debug!(request = %request, "sending");
        match self.transport.execute(request).await {
            Err(ApiError::Unauthorized) => {
                tracing::warn!(path, "session expired, dropping cached reads");
                self.cache.clear().await;
                Err(ApiError::Unauthorized)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seg_escapes_slashes_and_spaces() {
        assert_eq!(seg("abc-123"), "abc-123");
        assert_eq!(seg("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn error_message_prefers_known_fields() {
        let s = StatusCode::UNPROCESSABLE_ENTITY;
        assert_eq!(error_message(s, Some(&json!({"detail": "bad score"}))), "bad score");
        assert_eq!(error_message(s, Some(&json!({"error": "nope", "detail": "x"}))), "nope");
        assert_eq!(error_message(s, Some(&json!({"detail": [1, 2]}))), "HTTP 422");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, None), "HTTP 502");
    }
}
