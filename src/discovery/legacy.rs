//! Bare-list response shape kept for older consumers.
//!
//! Deprecated: new callers should consume [`DiscoveryReport`] directly. This
//! adapter only reshapes a finished report and never triggers discovery.

use serde::Serialize;

use super::report::{DiscoveryReport, Status};
use crate::youtube::types::ChannelRecord;

const PLACEHOLDER_NAME: &str = "Scanning for emerging channels...";
const PLACEHOLDER_STATUS: &str = "Analyzing recent Shorts data";
const PLACEHOLDER_NOTE: &str = "This may take a few minutes to find channels matching your criteria";

/// One element of the legacy list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LegacyItem {
  Channel(ChannelRecord),
  Placeholder {
    name: String,
    status: String,
    note: String,
  },
  Error {
    name: String,
    error: bool,
  },
}

/// The legacy route's response: a JSON array, never an envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LegacyResponse(pub Vec<LegacyItem>);

impl LegacyResponse {
  /// Reshape a report into the legacy list.
  ///
  /// Channels come through as-is. An empty result becomes a single
  /// placeholder item and an error becomes a single `API Error` item.
  pub fn from_report(report: &DiscoveryReport) -> Self {
    if report.status == Status::Error {
      return Self(vec![LegacyItem::Error {
        name: format!("API Error: {}", report.message),
        error: true,
      }]);
    }

    if report.channels.is_empty() {
      return Self(vec![LegacyItem::Placeholder {
        name: PLACEHOLDER_NAME.to_string(),
        status: PLACEHOLDER_STATUS.to_string(),
        note: PLACEHOLDER_NOTE.to_string(),
      }]);
    }

    Self(
      report
        .channels
        .iter()
        .cloned()
        .map(LegacyItem::Channel)
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::discovery::report::Performance;

  fn emerging(id: &str) -> ChannelRecord {
    let mut c = ChannelRecord::new(id, format!("channel {}", id));
    c.is_emerging = true;
    c
  }

  #[test]
  fn test_channels_pass_through_as_bare_list() {
    let report =
      DiscoveryReport::from_channels(vec![emerging("UC1"), emerging("UC2")], Performance::default());
    let legacy = LegacyResponse::from_report(&report);

    assert_eq!(legacy.0.len(), 2);
    let value = serde_json::to_value(&legacy).unwrap();
    assert!(value.is_array());
    assert_eq!(value[0]["channel_id"], "UC1");
    assert_eq!(value[1]["is_emerging"], true);
  }

  #[test]
  fn test_no_results_becomes_placeholder() {
    let report = DiscoveryReport::from_channels(Vec::new(), Performance::default());
    let value = serde_json::to_value(LegacyResponse::from_report(&report)).unwrap();

    assert_eq!(value.as_array().map(Vec::len), Some(1));
    assert_eq!(value[0]["name"], "Scanning for emerging channels...");
    assert_eq!(value[0]["status"], "Analyzing recent Shorts data");
    assert!(value[0]["note"].is_string());
  }

  #[test]
  fn test_error_becomes_api_error_item() {
    let report = DiscoveryReport::failed("quota exceeded", Performance::default());
    let legacy = LegacyResponse::from_report(&report);

    assert_eq!(
      legacy.0,
      [LegacyItem::Error {
        name: "API Error: quota exceeded".to_string(),
        error: true,
      }]
    );
    let value = serde_json::to_value(&legacy).unwrap();
    assert_eq!(value[0]["error"], true);
  }

  #[test]
  fn test_unconfigured_is_reported_as_error_item() {
    let legacy = LegacyResponse::from_report(&DiscoveryReport::unconfigured());
    assert!(matches!(
      &legacy.0[0],
      LegacyItem::Error { name, .. } if name.contains("not configured")
    ));
  }
}
