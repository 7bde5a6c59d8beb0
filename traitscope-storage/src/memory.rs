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

use dashmap::DashMap;
use tracing::debug;
use traitscope_core::SessionId;

use crate::{SessionRecord, SessionStore, StoreError};

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: DashMap<SessionId, SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    fn put(&self, record: SessionRecord) -> Result<(), StoreError> {
        debug!(session_id = %record.session_id, "Storing session in memory");
        self.records.insert(record.session_id.clone(), record);
        Ok(())
    }

    fn delete(&self, id: &SessionId) -> Result<bool, StoreError> {
        Ok(self.records.remove(id).is_some())
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
