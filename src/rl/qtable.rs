//! Sparse Q-value store keyed by canonical observation keys

use std::collections::HashMap;

/// Sparse mapping from canonical key to four action-values
///
/// Rows are materialized lazily with `q_init` on first access. The table
/// only ever grows; nothing is deleted. Each table belongs to exactly one
/// agent instance.
#[derive(Debug, Clone)]
pub struct QTable {
    entries: HashMap<u64, [f64; 4]>,
    q_init: f64,
}

impl QTable {
    /// Create an empty table with the given default row value
    pub fn new(q_init: f64) -> Self {
        Self {
            entries: HashMap::new(),
            q_init,
        }
    }

    /// Rebuild a table from saved entries
    pub fn from_entries(entries: Vec<(u64, [f64; 4])>, q_init: f64) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            q_init,
        }
    }

    /// Get-or-create the row for a key
    pub fn row(&mut self, key: u64) -> &mut [f64; 4] {
        let q_init = self.q_init;
        self.entries.entry(key).or_insert([q_init; 4])
    }

    /// Read a row without materializing it
    pub fn get(&self, key: u64) -> Option<&[f64; 4]> {
        self.entries.get(&key)
    }

    /// Max action-value of a row; the default for unseen keys
    pub fn best_value(&self, key: u64) -> f64 {
        match self.entries.get(&key) {
            Some(row) => row.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            None => self.q_init,
        }
    }

    /// Number of distinct states seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot all entries, sorted by key for stable output
    pub fn to_entries(&self) -> Vec<(u64, [f64; 4])> {
        let mut entries: Vec<_> = self.entries.iter().map(|(&k, &v)| (k, v)).collect();
        entries.sort_by_key(|&(k, _)| k);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_default_row() {
        let mut table = QTable::new(1.0);
        assert!(table.is_empty());

        let row = table.row(42);
        assert_eq!(*row, [1.0; 4]);
        assert_eq!(table.len(), 1);

        // Second access returns the same row, not a fresh default
        table.row(42)[2] = 7.5;
        assert_eq!(table.row(42)[2], 7.5);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_best_value() {
        let mut table = QTable::new(1.0);
        table.row(1).copy_from_slice(&[-2.0, 0.5, 3.0, 1.0]);

        assert_eq!(table.best_value(1), 3.0);
        // Unseen key answers with the default
        assert_eq!(table.best_value(99), 1.0);
        assert!(table.get(99).is_none());
    }

    #[test]
    fn test_entries_round_trip() {
        let mut table = QTable::new(0.0);
        table.row(3)[0] = 1.0;
        table.row(1)[1] = 2.0;
        table.row(2)[2] = 3.0;

        let entries = table.to_entries();
        let keys: Vec<u64> = entries.iter().map(|&(k, _)| k).collect();
        assert_eq!(keys, vec![1, 2, 3]);

        let rebuilt = QTable::from_entries(entries, 0.0);
        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt.get(3).unwrap()[0], 1.0);
    }
}
