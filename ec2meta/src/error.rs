use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures that abort a query
///
/// A key that is not served by the metadata service is not an error; see [`crate::Metadata::KeyNotFound`]
#[derive(Debug, Error)]
pub enum Error {
  /// The configured endpoint cannot be used as the root of request URLs
  #[error("invalid metadata endpoint {endpoint}: {reason}")]
  Endpoint { endpoint: String, reason: String },

  /// Timeout, refused connection, DNS failure, or a response that could not be read
  #[error("unable to reach the instance metadata service: {0}")]
  Transport(#[from] reqwest::Error),

  /// The token endpoint answered with a non-success status
  #[error("failed to acquire session token ({status}): {body}")]
  Token { status: StatusCode, body: String },

  /// The top-level listing answered with a status other than 200
  #[error("failed to list metadata keys ({status}): {body}")]
  Index { status: StatusCode, body: String },
}

impl Error {
  /// Whether the failure was caused by a request exceeding its timeout
  #[cfg(test)]
  pub(crate) fn is_timeout(&self) -> bool {
    matches!(self, Error::Transport(err) if err.is_timeout())
  }
}
