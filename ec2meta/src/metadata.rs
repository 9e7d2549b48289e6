use reqwest::StatusCode;
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
  error::{Error, Result},
  imds::{Client, Token},
};

pub const KEY_NOT_FOUND: &str = "Key not found or not available";

/// Result of a metadata query
///
/// Serializes to a flat JSON object: either key -> value, or a single `error` field
#[derive(Clone, Debug, PartialEq)]
pub enum Metadata {
  /// Values keyed by metadata key, in the order they were requested
  Values(Map<String, Value>),
  /// The single requested key was not served with a 200
  KeyNotFound,
}

impl Metadata {
  /// Value of `key`, if it was retrieved
  #[cfg(test)]
  pub(crate) fn get(&self, key: &str) -> Option<&str> {
    match self {
      Metadata::Values(values) => values.get(key).and_then(Value::as_str),
      Metadata::KeyNotFound => None,
    }
  }

  #[cfg(test)]
  pub(crate) fn keys(&self) -> Vec<&str> {
    match self {
      Metadata::Values(values) => values.keys().map(String::as_str).collect(),
      Metadata::KeyNotFound => Vec::new(),
    }
  }
}

impl Serialize for Metadata {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match self {
      Metadata::Values(values) => values.serialize(serializer),
      Metadata::KeyNotFound => {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("error", KEY_NOT_FOUND)?;
        map.end()
      }
    }
  }
}

/// Retrieve a single key when one is given, otherwise every top-level key
pub async fn get_metadata(client: &Client, token: &Token, key: Option<&str>) -> Result<Metadata> {
  match key {
    Some(key) => get_key(client, token, key).await,
    None => get_all(client, token).await,
  }
}

/// Retrieve the value of one key
///
/// Anything other than a 200 is reported as [`Metadata::KeyNotFound`] rather than an error
pub async fn get_key(client: &Client, token: &Token, key: &str) -> Result<Metadata> {
  let response = client.get(token, key).await?;
  if response.status != StatusCode::OK {
    info!("Key {key} not available ({})", response.status);
    return Ok(Metadata::KeyNotFound);
  }

  let mut values = Map::new();
  values.insert(key.to_string(), Value::String(response.body));

  Ok(Metadata::Values(values))
}

/// Retrieve the top-level listing and then the value of each listed key, one at a time
///
/// Keys ending in `/` are sub-trees; their value is the raw listing and they are not descended into
pub async fn get_all(client: &Client, token: &Token) -> Result<Metadata> {
  let index = client.get(token, "").await?;
  if index.status != StatusCode::OK {
    return Err(Error::Index {
      status: index.status,
      body: index.body,
    });
  }

  let keys = parse_index(&index.body);
  info!("Retrieving {} top-level keys", keys.len());

  let mut values = Map::new();
  for key in keys {
    let response = client.get(token, key).await?;
    if response.status != StatusCode::OK {
      warn!("Key {key} returned {}; keeping response body as its value", response.status);
    }
    values.insert(key.to_string(), Value::String(response.body));
  }

  Ok(Metadata::Values(values))
}

/// Split the newline-separated listing into keys
///
/// Surrounding whitespace of the whole body is ignored; an empty listing has no keys
pub fn parse_index(body: &str) -> Vec<&str> {
  let body = body.trim();
  if body.is_empty() {
    return Vec::new();
  }

  body.split('\n').collect()
}
