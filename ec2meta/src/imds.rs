use std::{fmt, time::Duration};

use reqwest::{redirect, StatusCode, Url};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Root of the link-local instance metadata service
pub const DEFAULT_ENDPOINT: &str = "http://169.254.169.254";

/// Six hours, the longest session IMDSv2 will issue
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(21600);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const TOKEN_PATH: &str = "/latest/api/token";
const METADATA_PATH: &str = "/latest/meta-data";
const TOKEN_TTL_HEADER: &str = "X-aws-ec2-metadata-token-ttl-seconds";
const TOKEN_HEADER: &str = "X-aws-ec2-metadata-token";

/// Settings used to construct a [`Client`]
#[derive(Clone, Debug)]
pub struct Config {
  /// Scheme and authority of the metadata service (i.e. - http://169.254.169.254)
  pub endpoint: String,
  /// Lifetime requested for the session token
  pub token_ttl: Duration,
  /// Applies to each request individually, from connect through reading the body
  pub timeout: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      endpoint: DEFAULT_ENDPOINT.to_string(),
      token_ttl: DEFAULT_TOKEN_TTL,
      timeout: DEFAULT_TIMEOUT,
    }
  }
}

/// IMDSv2 session token
///
/// Opaque to this crate; the value is kept out of `Debug` output so it does not end up in logs
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Token(** redacted **)")
  }
}

/// Status and body of a metadata read
#[derive(Debug)]
pub struct Response {
  pub status: StatusCode,
  pub body: String,
}

/// Client for the EC2 instance metadata service
#[derive(Clone, Debug)]
pub struct Client {
  endpoint: String,
  token_ttl: Duration,
  inner: reqwest::Client,
}

impl Client {
  pub fn new(config: Config) -> Result<Self> {
    let endpoint = config.endpoint.trim_end_matches('/').to_string();
    let url = Url::parse(&endpoint).map_err(|e| Error::Endpoint {
      endpoint: config.endpoint.clone(),
      reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
      return Err(Error::Endpoint {
        endpoint: config.endpoint,
        reason: format!("unsupported scheme {}", url.scheme()),
      });
    }

    // Proxies are never appropriate for a link-local address; redirects are reported as-is
    let inner = reqwest::Client::builder()
      .timeout(config.timeout)
      .no_proxy()
      .redirect(redirect::Policy::none())
      .build()?;

    Ok(Self {
      endpoint,
      token_ttl: config.token_ttl,
      inner,
    })
  }

  /// Request a session token from the token endpoint
  ///
  /// The raw response body is the token
  pub async fn get_token(&self) -> Result<Token> {
    let url = format!("{}{TOKEN_PATH}", self.endpoint);
    debug!("PUT {url}");

    let response = self
      .inner
      .put(&url)
      .header(TOKEN_TTL_HEADER, self.token_ttl.as_secs().to_string())
      .send()
      .await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(Error::Token { status, body });
    }

    info!("Acquired session token valid for {}s", self.token_ttl.as_secs());
    Ok(Token(body))
  }

  /// Read `<endpoint>/latest/meta-data/<path>`
  ///
  /// Any status is returned to the caller; only transport failures are errors.
  /// The path is interpolated as given, without percent-encoding.
  pub async fn get(&self, token: &Token, path: &str) -> Result<Response> {
    let url = format!("{}{METADATA_PATH}/{path}", self.endpoint);
    debug!("GET {url}");

    let response = self.inner.get(&url).header(TOKEN_HEADER, token.as_str()).send().await?;
    let status = response.status();
    let body = response.text().await?;
    debug!("GET {url} returned {status}");

    Ok(Response { status, body })
  }
}
