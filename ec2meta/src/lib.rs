pub mod cli;
pub mod error;
pub mod imds;
pub mod metadata;

pub use cli::Cli;
pub use error::{Error, Result};
pub use metadata::Metadata;
use serde::{ser::SerializeMap, Serialize, Serializer};

/// Exit status used when the query could not be completed
pub const FAILURE_EXIT_CODE: i32 = 2;

/// What a single invocation produced
///
/// Both variants render as one JSON object, so stdout carries the same shape on every path
#[derive(Debug)]
pub enum Outcome {
  /// Retrieved values, or a key that is not available
  Metadata(Metadata),
  /// The query was aborted; nothing retrieved before the failure is kept
  Failed(Error),
}

impl Outcome {
  pub fn exit_code(&self) -> i32 {
    match self {
      Outcome::Metadata(_) => 0,
      Outcome::Failed(_) => FAILURE_EXIT_CODE,
    }
  }

  /// Pretty-printed JSON with 2-space indentation
  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }
}

impl From<Result<Metadata>> for Outcome {
  fn from(result: Result<Metadata>) -> Self {
    match result {
      Ok(metadata) => Outcome::Metadata(metadata),
      Err(err) => Outcome::Failed(err),
    }
  }
}

impl Serialize for Outcome {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match self {
      Outcome::Metadata(metadata) => metadata.serialize(serializer),
      Outcome::Failed(err) => {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("error", &err.to_string())?;
        map.end()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use reqwest::StatusCode;
  use serde_json::{Map, Value};

  use super::*;

  #[test]
  fn it_renders_values() {
    let mut values = Map::new();
    values.insert("instance-id".to_string(), Value::String("i-abc123".to_string()));
    values.insert("hostname".to_string(), Value::String("ip-10-0-0-1".to_string()));
    let outcome = Outcome::Metadata(Metadata::Values(values));

    assert_eq!(outcome.exit_code(), 0);
    insta::assert_snapshot!(outcome.to_json().unwrap(), @r###"
    {
      "instance-id": "i-abc123",
      "hostname": "ip-10-0-0-1"
    }
    "###);
  }

  #[test]
  fn it_renders_key_not_found_as_success() {
    let outcome = Outcome::Metadata(Metadata::KeyNotFound);

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
      outcome.to_json().unwrap(),
      "{\n  \"error\": \"Key not found or not available\"\n}"
    );
  }

  #[test]
  fn it_renders_failure() {
    let outcome = Outcome::Failed(Error::Token {
      status: StatusCode::UNAUTHORIZED,
      body: "Unauthorized".to_string(),
    });

    assert_eq!(outcome.exit_code(), FAILURE_EXIT_CODE);
    let rendered: Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
    let object = rendered.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert_eq!(
      object["error"],
      "failed to acquire session token (401 Unauthorized): Unauthorized"
    );
  }

  #[test]
  fn it_renders_empty_mapping() {
    let outcome = Outcome::Metadata(Metadata::Values(Map::new()));
    assert_eq!(outcome.to_json().unwrap(), "{}");
  }
}
