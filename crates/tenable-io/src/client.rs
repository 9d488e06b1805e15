use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, RequestBuilder};
use rollover_core::ServiceError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_HOST: &str = "cloud.tenable.com";
pub const DEFAULT_PORT: u16 = 443;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub access_key: String,
    pub secret_key: String,
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API endpoint {0}: {1}")]
    Endpoint(String, url::ParseError),
    #[error("API keys contain characters that cannot be sent in a header")]
    Keys,
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

pub struct TenableIo {
    pub(crate) http: Client,
    pub(crate) base: Url,
}

impl std::fmt::Debug for TenableIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenableIo").field("base", &self.base.as_str()).finish_non_exhaustive()
    }
}

impl TenableIo {
    pub fn open(settings: &ClientSettings) -> Result<Self, ClientError> {
        let base = base_url(&settings.host, settings.port)?;
        Self::with_base(settings, base)
    }

    /// Client against an explicit base URL; `settings.host` and `settings.port` are ignored.
    pub(crate) fn with_base(settings: &ClientSettings, base: Url) -> Result<Self, ClientError> {
        let mut keys = HeaderValue::from_str(&api_keys_header(&settings.access_key, &settings.secret_key))
            .map_err(|_| ClientError::Keys)?;
        keys.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("X-ApiKeys", keys);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(settings.timeout_ms))
            .user_agent(format!("rolloverscan/{}", rollover_core::version()))
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()?;
        Ok(TenableIo { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|e| ServiceError::Transport(format!("bad request path {path}: {e}")))
    }

    /// Sends a request and decodes a JSON body.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ServiceError> {
        let resp = checked(req).await?;
        let bytes = resp.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    /// Sends a request whose response body is irrelevant.
    pub(crate) async fn execute(&self, req: RequestBuilder) -> Result<(), ServiceError> {
        checked(req).await.map(drop)
    }
}

async fn checked(req: RequestBuilder) -> Result<reqwest::Response, ServiceError> {
    let resp = req.send().await.map_err(transport)?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ServiceError::Status { status: status.as_u16(), body })
}

fn transport(e: reqwest::Error) -> ServiceError {
    ServiceError::Transport(e.to_string())
}

fn base_url(host: &str, port: u16) -> Result<Url, ClientError> {
    let raw = format!("https://{}:{}/", host.trim().trim_end_matches('/'), port);
    Url::parse(&raw).map_err(|e| ClientError::Endpoint(raw.clone(), e))
}

pub(crate) fn api_keys_header(access_key: &str, secret_key: &str) -> String {
    format!("accessKey={};secretKey={}", access_key, secret_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ClientSettings {
        ClientSettings {
            access_key: "abc".into(),
            secret_key: "def".into(),
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            timeout_ms: 1000,
        }
    }

    #[test]
    fn header_carries_both_keys() {
        assert_eq!(api_keys_header("abc", "def"), "accessKey=abc;secretKey=def");
    }

    #[test]
    fn default_port_is_elided_from_base_url() {
        let c = TenableIo::open(&settings()).unwrap();
        assert_eq!(c.base_url().as_str(), "https://cloud.tenable.com/");
        assert_eq!(c.url("scans/42/copy").unwrap().as_str(), "https://cloud.tenable.com/scans/42/copy");
    }

    #[test]
    fn custom_host_and_port_are_used() {
        let c = TenableIo::open(&ClientSettings { host: "tio.example.internal/".into(), port: 8443, ..settings() }).unwrap();
        assert_eq!(c.url("scans").unwrap().as_str(), "https://tio.example.internal:8443/scans");
    }

    #[test]
    fn keys_with_newlines_are_rejected() {
        let err = TenableIo::open(&ClientSettings { access_key: "a\nb".into(), ..settings() }).unwrap_err();
        assert!(matches!(err, ClientError::Keys));
    }

    #[test]
    fn empty_host_is_an_endpoint_error() {
        let err = TenableIo::open(&ClientSettings { host: "  ".into(), ..settings() }).unwrap_err();
        assert!(matches!(err, ClientError::Endpoint(_, _)));
    }
}
