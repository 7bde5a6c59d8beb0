// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Session persistence.
//!
//! One [`SessionRecord`] per session id: the last submitted text and the
//! profile the analysis service returned for it. A new submission replaces
//! the record wholesale; no history is kept.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use traitscope_core::{ProfileDocument, SessionId};

/// Errors for session persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record for session {session_id}: {reason}")]
    Corrupt { session_id: String, reason: String },
}

/// Stored state of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: SessionId,
    /// Raw text last submitted for analysis.
    pub content: String,
    /// Profile as returned by the analysis service.
    pub response: ProfileDocument,
    /// Time of the last write.
    pub created: DateTime<Utc>,
}

impl SessionRecord {
    /// New record stamped with the current time.
    pub fn new(session_id: SessionId, content: String, response: ProfileDocument) -> Self {
        Self {
            session_id,
            content,
            response,
            created: Utc::now(),
        }
    }
}

/// Key-value persistence keyed by session id.
pub trait SessionStore: Send + Sync {
    /// Fetch the record for `id`, `None` if nothing was stored yet.
    fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Insert or overwrite the record for `record.session_id`.
    fn put(&self, record: SessionRecord) -> Result<(), StoreError>;

    /// Remove the record. Returns whether one existed.
    fn delete(&self, id: &SessionId) -> Result<bool, StoreError>;

    /// Number of stored sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Backend name for logs and health output.
    fn backend(&self) -> &'static str;
}


#[cfg(test)]
mod tests {
    use super::test_support::record;
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(record("s1", "hello")).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["content"], "hello");
        assert_eq!(json["response"]["tree"]["id"], "r");
        assert!(json["created"].is_string());
    }

    #[test]
    fn test_record_round_trips() {
        let original = record("s1", "hello");
        let raw = serde_json::to_string(&original).unwrap();
        let parsed: SessionRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, original);
    }
}
