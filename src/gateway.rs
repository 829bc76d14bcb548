//! The persistence boundary.
//!
//! The engine never talks to a backend directly; it drives this trait and
//! reconciles the responses into the region model. The backend is the sole
//! authority for identity and canonical timestamps, so every successful
//! create/update answer is merged back over the local region ("the response
//! is the source of truth", never a hand-patched echo of the request).
//!
//! Implementations decide transport, authentication, and timeouts. The engine
//! makes exactly one attempt per operation and surfaces failures unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::region::{QType, Region, ServerRefs};

/// A region as the backend reports it.
///
/// Field names follow the backend's snake_case wire form. `content` is the
/// stored JSON payload string, exactly as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRegion {
    /// Server-assigned identity
    pub id: u64,
    /// Geometry, canonicalized by the server
    pub x: f32,
    /// Geometry, canonicalized by the server
    pub y: f32,
    /// Geometry, canonicalized by the server
    pub w: f32,
    /// Geometry, canonicalized by the server
    pub h: f32,
    /// Save order
    #[serde(default)]
    pub order_index: i64,
    /// Question number as stored
    #[serde(default)]
    pub question_number: String,
    /// Marks as stored
    #[serde(default)]
    pub marks: String,
    /// Classification as stored
    #[serde(default)]
    pub qtype: QType,
    /// Parent question number as stored
    #[serde(default)]
    pub parent_number: String,
    /// Header text as stored
    #[serde(default)]
    pub header_label: String,
    /// Case study name as stored
    #[serde(default)]
    pub case_study_label: String,
    /// Content rollup as stored
    #[serde(default)]
    pub content_type: String,
    /// Stored JSON payload, `{"items":[...]}` or empty
    #[serde(default)]
    pub content: String,
    /// Canonical creation timestamp
    pub created_at: DateTime<Utc>,
    /// Operation handles for this region
    #[serde(default)]
    pub refs: Option<ServerRefs>,
}

/// A machine-proposed grouping of blocks with proposed metadata.
///
/// Not a region until accepted; its rectangle is derived from the referenced
/// blocks' layout, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionCandidate {
    /// Ids of the blocks the suggestion groups, in document order
    pub block_ids: Vec<u64>,
    /// Proposed question number
    #[serde(default)]
    pub question_number: String,
    /// Proposed marks
    #[serde(default)]
    pub marks: String,
    /// Proposed classification
    #[serde(default)]
    pub qtype: QType,
    /// Proposed parent question number
    #[serde(default)]
    pub parent_number: String,
    /// Proposed header text
    #[serde(default)]
    pub header_label: String,
    /// Proposed case study name
    #[serde(default)]
    pub case_study_label: String,
}

/// Create/update/delete/fetch operations against the backend.
///
/// One logical operator session drives this sequentially; calls are issued
/// one at a time and the engine suspends at each until it resolves.
pub trait PersistenceGateway {
    /// Persist a new region. The response assigns identity and refs.
    fn create_region(&mut self, region: &Region) -> Result<ServerRegion>;

    /// Update an existing region through its update ref.
    fn update_region(&mut self, update_ref: &str, region: &Region) -> Result<ServerRegion>;

    /// Delete a region through its delete ref.
    fn delete_region(&mut self, delete_ref: &str) -> Result<()>;

    /// Fetch one region's current server state through its fetch ref.
    ///
    /// Used to refresh stale client state before a snapshot or content view.
    fn fetch_region(&mut self, fetch_ref: &str) -> Result<ServerRegion>;

    /// Fetch one batch of machine-generated suggestions.
    fn fetch_suggestions(&mut self, api_ref: &str) -> Result<Vec<SuggestionCandidate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_region_parses_backend_payload() {
        let json = r#"{
            "id": 17,
            "x": 10.0, "y": 20.0, "w": 300.0, "h": 80.0,
            "order_index": 2,
            "question_number": "1",
            "marks": "10",
            "qtype": "question",
            "parent_number": "",
            "header_label": "",
            "case_study_label": "",
            "content_type": "text",
            "content": "{\"items\":[{\"type\":\"text\",\"text\":\"Q1\"}]}",
            "created_at": "2025-03-14T09:26:53Z"
        }"#;
        let sr: ServerRegion = serde_json::from_str(json).unwrap();
        assert_eq!(sr.id, 17);
        assert_eq!(sr.qtype, QType::Question);
        assert_eq!(sr.content_type, "text");
        assert!(sr.refs.is_none());
    }

    #[test]
    fn test_suggestion_candidate_defaults() {
        let json = r#"{"block_ids": [4, 5], "question_number": "2", "qtype": "question"}"#;
        let c: SuggestionCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.block_ids, vec![4, 5]);
        assert_eq!(c.marks, "");
        assert_eq!(c.qtype, QType::Question);
        assert_eq!(c.parent_number, "");
    }
}
