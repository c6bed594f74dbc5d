//! Identifier map: graph-local node id → external ("real-world") id.
//!
//! File format: one record per line, comma-separated; the first field is the
//! graph-local id and the last field the external id. Middle fields are
//! ignored. Blank lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use hashbrown::HashMap;

use crate::{Error, Result};

/// Immutable graph-local → external id lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMap {
    map: HashMap<String, String>,
}

impl IdentifierMap {
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Parse from any line source. `source` names the input in errors.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> Result<Self> {
        let mut map = HashMap::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = strip_line_end(&line);
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 2 {
                return Err(Error::MalformedRecord {
                    input: source.to_string(),
                    line: i + 1,
                    message: format!("expected at least 2 fields, got {}", fields.len()),
                });
            }
            let key = fields[0].to_string();
            let value = fields[fields.len() - 1].to_string();
            if let Some(previous) = map.insert(key.clone(), value) {
                tracing::warn!(key = %key, %previous, line = i + 1, "duplicate graph id, later mapping wins");
            }
        }
        tracing::info!(entries = map.len(), "identifier map loaded");
        Ok(Self { map })
    }

    /// External id for a graph-local id.
    pub fn get(&self, graph_id: &str) -> Option<&str> {
        self.map.get(graph_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for IdentifierMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Drop a trailing `\r` left behind by CRLF files.
pub(crate) fn strip_line_end(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
