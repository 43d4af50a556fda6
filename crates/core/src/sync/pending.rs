//! Pending operation set owned by one queue

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use listsync_domain::{
    LogicalTimestamp, OperationId, OperationMetadata, OperationPayload, PendingOperation, UserId,
};

/// Ordered buffer of unacknowledged operations plus the logical clock that
/// stamps them.
///
/// Entries stay in submission order, which is also logical-timestamp order.
#[derive(Debug, Default)]
pub struct PendingSet {
    entries: Vec<PendingOperation>,
    last_issued: LogicalTimestamp,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp `payload` with fresh metadata and append it.
    pub fn stamp(
        &mut self,
        payload: OperationPayload,
        user_id: &UserId,
        created_at: DateTime<Utc>,
    ) -> &PendingOperation {
        self.last_issued = self.last_issued.next();
        let metadata = OperationMetadata {
            operation_id: OperationId::generate(),
            handler_id: payload.handler_id().to_string(),
            user_id: user_id.clone(),
            operation_class: payload.operation_class(),
            created_at,
            logical_timestamp: self.last_issued,
        };
        let index = self.entries.len();
        self.entries.push(PendingOperation { metadata, payload });
        &self.entries[index]
    }

    /// Ordered copy of everything pending, used as the next batch.
    pub fn snapshot(&self) -> Vec<PendingOperation> {
        self.entries.clone()
    }

    /// Drop every entry whose identifier was acknowledged.
    ///
    /// Unknown identifiers are ignored. Returns how many entries were removed.
    pub fn acknowledge(&mut self, acknowledged: &[OperationId]) -> usize {
        if acknowledged.is_empty() {
            return 0;
        }
        let acked: HashSet<&OperationId> = acknowledged.iter().collect();
        let before = self.entries.len();
        self.entries.retain(|entry| !acked.contains(entry.id()));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently issued logical timestamp.
    pub const fn last_issued(&self) -> LogicalTimestamp {
        self.last_issued
    }

    /// Discard everything; the logical clock keeps counting.
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }
}
