use std::collections::BTreeMap;

use super::ThoughtRecord;

/// Append-only thought history with a branch index.
///
/// `append` is the only mutator. A record carrying a branch id is indexed
/// under that branch in insertion order; records are never removed,
/// renumbered or edited once stored.
#[derive(Debug, Default)]
pub struct ThoughtStore {
    history: Vec<ThoughtRecord>,
    branches: BTreeMap<String, Vec<usize>>,
}

impl ThoughtStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the history and, if it names one, to its branch.
    pub fn append(&mut self, record: ThoughtRecord) -> &ThoughtRecord {
        let index = self.history.len();
        if let Some(branch_id) = &record.branch_id {
            self.branches
                .entry(branch_id.clone())
                .or_default()
                .push(index);
        }
        self.history.push(record);
        &self.history[index]
    }

    /// All records in submission order.
    pub fn history(&self) -> &[ThoughtRecord] {
        &self.history
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Most recently appended record.
    pub fn latest(&self) -> Option<&ThoughtRecord> {
        self.history.last()
    }

    /// Records of one branch in submission order. Empty for unknown ids.
    pub fn branch(&self, branch_id: &str) -> Vec<&ThoughtRecord> {
        self.branches
            .get(branch_id)
            .map(|indices| indices.iter().map(|&i| &self.history[i]).collect())
            .unwrap_or_default()
    }

    /// Known branch ids, sorted.
    pub fn branch_ids(&self) -> Vec<&str> {
        self.branches.keys().map(String::as_str).collect()
    }
}
