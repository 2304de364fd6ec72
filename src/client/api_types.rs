//! Serde types matching backend response shapes.
//!
//! Kept separate from domain types so deserialization tolerance
//! (`#[serde(default)]` everywhere) never leaks into application code.

use serde::Deserialize;

/// Paged list response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListEnvelope<T> {
  #[serde(default)]
  pub items: Vec<T>,
  #[serde(default)]
  pub offset: u64,
  #[serde(default)]
  pub total: u64,
}

/// Error payload some backends attach to non-success responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
  pub message: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn envelope_tolerates_missing_fields() {
    let envelope: ListEnvelope<String> = serde_json::from_str(r#"{"items": ["a"]}"#).unwrap();
    assert_eq!(envelope.items, vec!["a".to_string()]);
    assert_eq!(envelope.offset, 0);
    assert_eq!(envelope.total, 0);
  }
}
