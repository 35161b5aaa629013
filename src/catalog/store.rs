use super::record::{ObjectRecord, RecordPatch};

/// Keyed, order-preserving projection of all records for the current
/// stream session. Order is the delivery order from the backend.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<ObjectRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire contents, as on `catalog_metadata`.
    pub fn replace_all(&mut self, records: Vec<ObjectRecord>) {
        self.records = records;
    }

    /// Merge-or-create, as on `object_data` (streaming-append mode).
    pub fn upsert(&mut self, patch: RecordPatch) {
        match self.position(&patch.name) {
            Some(i) => self.records[i].merge(patch),
            None => self.records.push(ObjectRecord::from_patch(patch)),
        }
    }

    /// Merge only if the name is already known, as on `object_details`.
    /// A late event referencing a truncated record is a silent no-op.
    pub fn merge_existing(&mut self, patch: RecordPatch) -> bool {
        match self.position(&patch.name) {
            Some(i) => {
                self.records[i].merge(patch);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ObjectRecord> {
        self.position(name).map(|i| &self.records[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ObjectRecord> {
        self.position(name).map(move |i| &mut self.records[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn all(&self) -> &[ObjectRecord] {
        &self.records
    }

    pub fn first_name(&self) -> Option<String> {
        self.records.first().map(|r| r.name.clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|r| r.name == name)
    }
}
