//! HTTP transport for the DigitalOcean API.
//!
//! Service bindings never talk to `reqwest` directly. They build requests
//! and execute them through the [`Transport`] trait, which [`Client`]
//! implements on top of a pooled `reqwest::Client`. Each call is sent
//! exactly once; dropping the returned future cancels the request.

use crate::config::DigitalOceanConfig;
use crate::error::{Error, ErrorResponse, Result};
use crate::response::Response;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use validator::Validate;

const USER_AGENT: &str = concat!("digitalocean-rust/", env!("CARGO_PKG_VERSION"));
const MEDIA_TYPE: &str = "application/json";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 30;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// HTTP client configuration.
///
/// Configures HTTP client behavior including timeouts and connection pooling.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable request/response logging
    pub enable_logging: bool,

    /// Enable response compression
    pub enable_compression: bool,
}

impl HttpConfig {
    /// Create a new HTTP configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_logging: true,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Request construction and execution used by every service binding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Build a request for `path`, resolved against the API base URL.
    ///
    /// `body`, when present, is sent as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve to a valid URL or the
    /// request cannot be assembled.
    fn new_request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Request>;

    /// Send a request once and read its JSON body.
    ///
    /// An empty body decodes as `Value::Null`.
    ///
    /// # Errors
    ///
    /// Non-2xx responses become [`Error::Api`] and unparseable bodies become
    /// [`Error::Decode`]; both carry the [`Response`] metadata. Connection
    /// failures and timeouts carry none.
    async fn execute(&self, request: Request) -> Result<(Value, Response)>;
}

/// Typed decoding on top of any [`Transport`].
#[async_trait]
pub trait TransportExt: Transport {
    /// Execute a request and decode its JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Propagates transport errors unchanged; a body that does not match
    /// `T` becomes [`Error::Decode`] carrying the response metadata.
    async fn execute_json<T>(&self, request: Request) -> Result<(T, Response)>
    where
        T: DeserializeOwned + Send;
}

#[async_trait]
impl<X> TransportExt for X
where
    X: Transport + ?Sized,
{
    async fn execute_json<T>(&self, request: Request) -> Result<(T, Response)>
    where
        T: DeserializeOwned + Send,
    {
        let (body, response) = self.execute(request).await?;
        match serde_json::from_value::<T>(body) {
            Ok(decoded) => Ok((decoded, response)),
            Err(err) => Err(Error::Decode {
                message: err.to_string(),
                response: Box::new(response),
            }),
        }
    }
}

/// Builder for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    config: DigitalOceanConfig,
    http_config: Option<HttpConfig>,
    headers: Vec<(String, String)>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Create a builder from a [`DigitalOceanConfig`].
    #[must_use]
    pub fn new(config: DigitalOceanConfig) -> Self {
        Self {
            config,
            http_config: None,
            headers: Vec::new(),
            http: None,
        }
    }

    /// Override the HTTP client configuration.
    ///
    /// Its timeout replaces the request timeout of the
    /// [`DigitalOceanConfig`].
    #[must_use]
    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = Some(http_config);
        self
    }

    /// Configure the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.config = self.config.with_token(token);
        self
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.api_url = base_url.into();
        self
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.with_user_agent(user_agent);
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Use a caller-supplied `reqwest::Client` instead of building one.
    ///
    /// Timeout and pool settings from [`HttpConfig`] are ignored in that case.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Finalise the builder and create the [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, a default header is
    /// malformed, or the HTTP client cannot be built.
    pub fn build(self) -> Result<Client> {
        self.config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        let base_url = self.config.parse_api_url()?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| Error::ConfigError(format!("Invalid header name `{name}`: {err}")))?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                Error::ConfigError(format!("Invalid value for header `{name}`: {err}"))
            })?;
            headers.insert(name, value);
        }

        let http_config = self
            .http_config
            .unwrap_or_else(|| HttpConfig::new().with_timeout(self.config.timeout()));

        let http = match self.http {
            Some(http) => http,
            None => reqwest::ClientBuilder::new()
                .timeout(http_config.timeout)
                .pool_idle_timeout(http_config.pool_idle_timeout)
                .pool_max_idle_per_host(http_config.pool_max_idle_per_host)
                .gzip(http_config.enable_compression)
                .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT))
                .build()
                .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?,
        };

        let user_agent = self
            .config
            .user_agent
            .clone()
            .unwrap_or_else(|| USER_AGENT.to_string());

        Ok(Client {
            http,
            base_url,
            token: self.config.token.clone().map(SecretString::from),
            user_agent,
            headers,
            log_requests: http_config.enable_logging,
        })
    }
}

/// Asynchronous client for the DigitalOcean API.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    user_agent: String,
    headers: HeaderMap,
    log_requests: bool,
}

impl Client {
    /// Create a client for the public API authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(DigitalOceanConfig::default())
            .with_token(token)
            .build()
    }

    /// Construct a client directly from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &DigitalOceanConfig) -> Result<Self> {
        ClientBuilder::new(config.clone()).build()
    }

    /// Start a builder pre-populated with the provided configuration.
    #[must_use]
    pub fn builder(config: DigitalOceanConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return the user agent sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid API path `{path}`: {err}")))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for Client {
    fn new_request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Request> {
        let url = self.build_url(path)?;

        let mut request = self
            .http
            .request(method, url)
            .headers(self.headers.clone())
            .header(ACCEPT, MEDIA_TYPE)
            .header(reqwest::header::USER_AGENT, &self.user_agent);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        if let Some(payload) = body {
            let bytes = serde_json::to_vec(&payload)?;
            request = request.header(CONTENT_TYPE, MEDIA_TYPE).body(bytes);
        }

        request.build().map_err(Error::from)
    }

    async fn execute(&self, request: Request) -> Result<(Value, Response)> {
        let method = request.method().clone();
        let url = request.url().clone();

        if self.log_requests {
            debug!(method = %method, url = %url, "Sending DigitalOcean API request");
        }

        let http_response = self.http.execute(request).await?;
        let status = http_response.status();
        let headers = http_response.headers().clone();
        let response = Response::new(method, url, status, headers);

        let bytes = http_response.bytes().await?;

        if !status.is_success() {
            let error = ErrorResponse::from_body(response, &bytes);
            if self.log_requests {
                warn!(
                    status = %status,
                    request_id = error.request_id.as_deref().unwrap_or_default(),
                    "DigitalOcean API request failed"
                );
            }
            return Err(Error::Api(Box::new(error)));
        }

        if bytes.is_empty() {
            return Ok((Value::Null, response));
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => {
                let response = response.with_body_metadata(&body);
                Ok((body, response))
            }
            Err(err) => Err(Error::Decode {
                message: err.to_string(),
                response: Box::new(response),
            }),
        }
    }
}
