use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::units::{UnitKey, UnitStore};

/// Maximum number of records kept in the history log.
pub const HISTORY_CAPACITY: usize = 50;

/// A completed generation. `id` is the creation time in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: i64,
    #[serde(alias = "copywriting")]
    pub input_text: String,
    #[serde(alias = "subtitles")]
    pub output_text: String,
}

impl HistoryRecord {
    pub fn new(id: i64, input_text: impl Into<String>, output_text: impl Into<String>) -> Self {
        Self {
            id,
            input_text: input_text.into(),
            output_text: output_text.into(),
        }
    }

    #[must_use]
    pub fn created_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.id) * 1_000_000).ok()
    }

    #[must_use]
    pub fn created_at_rfc3339(&self) -> Option<String> {
        self.created_at()?.format(&Rfc3339).ok()
    }
}

/// Newest-first list of at most [`HISTORY_CAPACITY`] records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    records: Vec<HistoryRecord>,
}

impl HistoryLog {
    fn from_records(mut records: Vec<HistoryRecord>) -> Self {
        records.truncate(HISTORY_CAPACITY);
        Self { records }
    }

    fn with_front(&self, record: HistoryRecord) -> Self {
        let mut records = Vec::with_capacity(HISTORY_CAPACITY);
        records.push(record);
        records.extend(
            self.records
                .iter()
                .take(HISTORY_CAPACITY - 1)
                .cloned(),
        );
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn front(&self) -> Option<&HistoryRecord> {
        self.records.first()
    }

    #[must_use]
    pub fn find(&self, id: i64) -> Option<&HistoryRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Id for a record created at `now_ms`, strictly greater than the
    /// current front record's id.
    #[must_use]
    pub fn next_id(&self, now_ms: i64) -> i64 {
        match self.front() {
            Some(front) if front.id >= now_ms => front.id.saturating_add(1),
            _ => now_ms,
        }
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryRecord;
    type IntoIter = std::slice::Iter<'a, HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Where the in-memory log came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrigin {
    /// No history unit was stored.
    Absent,
    /// The stored unit could not be read or parsed and was ignored.
    Discarded,
    /// Loaded from, or last written to, the history unit.
    Persisted,
    /// Explicitly cleared.
    Cleared,
}

pub struct HistoryStore {
    units: Arc<dyn UnitStore>,
    log: HistoryLog,
    origin: HistoryOrigin,
}

impl HistoryStore {
    /// Open the store and load the persisted log.
    pub fn open(units: Arc<dyn UnitStore>) -> Self {
        let mut store = Self {
            units,
            log: HistoryLog::default(),
            origin: HistoryOrigin::Absent,
        };
        store.load();
        store
    }

    /// Re-read the history unit. Missing or unreadable data yields an empty log.
    pub fn load(&mut self) -> &HistoryLog {
        let (log, origin) = match self.units.read(UnitKey::History) {
            Ok(None) => (HistoryLog::default(), HistoryOrigin::Absent),
            Ok(Some(contents)) => match serde_json::from_str::<Vec<HistoryRecord>>(&contents) {
                Ok(records) => {
                    if records.len() > HISTORY_CAPACITY {
                        tracing::debug!(
                            stored = records.len(),
                            "truncating stored history to capacity"
                        );
                    }
                    (HistoryLog::from_records(records), HistoryOrigin::Persisted)
                }
                Err(error) => {
                    tracing::warn!(%error, "ignoring malformed history unit");
                    (HistoryLog::default(), HistoryOrigin::Discarded)
                }
            },
            Err(error) => {
                tracing::warn!(%error, "ignoring unreadable history unit");
                (HistoryLog::default(), HistoryOrigin::Discarded)
            }
        };

        self.log = log;
        self.origin = origin;
        &self.log
    }

    #[must_use]
    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    #[must_use]
    pub fn origin(&self) -> HistoryOrigin {
        self.origin
    }

    /// Prepend `record`, drop anything past capacity and persist.
    ///
    /// The in-memory log is only replaced once the write succeeded.
    pub fn commit(&mut self, record: HistoryRecord) -> Result<&HistoryLog, StoreError> {
        let next = self.log.with_front(record);
        let contents = serde_json::to_string(next.records())
            .map_err(|source| StoreError::json_serialize(UnitKey::History.as_str(), source))?;
        self.units.write(UnitKey::History, &contents)?;

        self.log = next;
        self.origin = HistoryOrigin::Persisted;
        Ok(&self.log)
    }

    /// Build a record stamped with the current time and commit it.
    pub fn record(
        &mut self,
        input_text: impl Into<String>,
        output_text: impl Into<String>,
    ) -> Result<HistoryRecord, StoreError> {
        let record = HistoryRecord::new(
            self.log.next_id(now_millis()),
            input_text,
            output_text,
        );
        self.commit(record.clone())?;
        Ok(record)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.units.remove(UnitKey::History)?;
        self.log = HistoryLog::default();
        self.origin = HistoryOrigin::Cleared;
        Ok(())
    }
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}
