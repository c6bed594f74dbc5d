//! Fuzzy value store: external id → (ground-truth label, fuzzy score).
//!
//! File format: `key,label,score` per line. Records keep file order; a
//! repeated key replaces the earlier value but keeps its position.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use hashbrown::HashMap;

use crate::idmap::strip_line_end;
use crate::model::FuzzyRecord;
use crate::{Error, Result};

/// Insertion-ordered map of `FuzzyRecord`s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuzzyValueStore {
    entries: Vec<(String, FuzzyRecord)>,
    index: HashMap<String, usize>,
}

impl FuzzyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Parse from any line source. `source` names the input in errors.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> Result<Self> {
        let mut store = Self::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = strip_line_end(&line);
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            let [key, label, score] = fields.as_slice() else {
                return Err(Error::MalformedRecord {
                    input: source.to_string(),
                    line: i + 1,
                    message: format!("expected 3 fields (id,label,score), got {}", fields.len()),
                });
            };
            if store.insert(*key, FuzzyRecord::new(*label, *score)).is_some() {
                tracing::debug!(key = %key, line = i + 1, "duplicate fuzzy key replaced");
            }
        }
        tracing::info!(records = store.len(), "fuzzy values loaded");
        Ok(store)
    }

    /// Insert or replace. Returns the replaced record.
    pub fn insert(&mut self, key: impl Into<String>, record: FuzzyRecord) -> Option<FuzzyRecord> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, record)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, record));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FuzzyRecord> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Records in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FuzzyRecord)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_preserves_file_order() {
        let store = FuzzyValueStore::from_reader(Cursor::new("30,1,99.5\n10,0,12\n20,1,100\n"), "fuz").unwrap();
        let keys: Vec<_> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["30", "10", "20"]);
        assert_eq!(store.get("10"), Some(&FuzzyRecord::new("0", "12")));
    }

    #[test]
    fn test_duplicate_keeps_position() {
        let store = FuzzyValueStore::from_reader(Cursor::new("a,0,1\nb,0,2\na,1,3\n"), "fuz").unwrap();
        let rows: Vec<_> = store.iter().map(|(k, r)| (k, r.fuzzy_score.as_str())).collect();
        assert_eq!(rows, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_wrong_field_count() {
        let err = FuzzyValueStore::from_reader(Cursor::new("a,0,1\nb,0\n"), "fuz").unwrap_err();
        match err {
            Error::MalformedRecord { input, line, .. } => {
                assert_eq!(input, "fuz");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(FuzzyValueStore::from_reader(Cursor::new("a,0,1,extra\n"), "fuz").is_err());
    }

    #[test]
    fn test_values_kept_verbatim() {
        let store = FuzzyValueStore::from_reader(Cursor::new("x,true, 99.90\n"), "fuz").unwrap();
        let r = store.get("x").unwrap();
        assert_eq!(r.ground_truth_label, "true");
        assert_eq!(r.fuzzy_score, " 99.90");
    }
}
