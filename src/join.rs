//! # Influence join
//!
//! Left join of the fuzzy value store against the shell assignment, through
//! the identifier map:
//!
//! ```text
//! ShellAssignment (graph ids) ──IdentifierMap──▶ external id → shell
//!                                                      │
//! FuzzyValueStore (external ids, file order) ──────────┴──▶ JoinedRow per fuzzy key
//! ```
//!
//! Rows are anchored on the fuzzy keys, never on graph keys. A fuzzy key
//! with no shell gets `JoinPolicy::default_shell`.

use std::io::{BufRead, Write};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::fuzzy::FuzzyValueStore;
use crate::idmap::{strip_line_end, IdentifierMap};
use crate::kshell::ShellAssignment;
use crate::model::JoinedRow;
use crate::{Error, Result};

/// Column header of the joined CSV.
pub const CSV_HEADER: [&str; 4] = ["id", "is_true_positive", "fuzzy_value", "k-shell"];

/// Missing-key policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPolicy {
    /// Shell index written for fuzzy keys no shell reached.
    pub default_shell: u32,
}

/// Rows plus what the join had to drop or default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinOutcome {
    pub rows: Vec<JoinedRow>,
    /// Graph ids with a shell but no entry in the identifier map.
    pub unmapped_graph_ids: Vec<String>,
    /// Rows that received the default shell.
    pub defaulted_rows: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InfluenceJoiner {
    policy: JoinPolicy,
}

impl InfluenceJoiner {
    pub fn new(policy: JoinPolicy) -> Self {
        Self { policy }
    }

    pub fn join(
        &self,
        fuzzy: &FuzzyValueStore,
        shells: &ShellAssignment,
        ids: &IdentifierMap,
    ) -> JoinOutcome {
        let mut by_external: HashMap<&str, u32> = HashMap::with_capacity(shells.len());
        let mut unmapped_graph_ids = Vec::new();

        for (key, shell) in shells.iter() {
            match ids.get(key.as_str()) {
                // Several graph ids may share one external id: highest shell wins.
                Some(external) => {
                    by_external
                        .entry(external)
                        .and_modify(|s| *s = (*s).max(shell))
                        .or_insert(shell);
                }
                None => {
                    tracing::debug!(graph_id = %key, shell, "graph id missing from identifier map");
                    unmapped_graph_ids.push(key.to_string());
                }
            }
        }
        if !unmapped_graph_ids.is_empty() {
            tracing::warn!(
                count = unmapped_graph_ids.len(),
                "graph ids dropped from the join: not in identifier map"
            );
        }

        let mut defaulted_rows = 0;
        let rows: Vec<JoinedRow> = fuzzy.iter()
            .map(|(id, record)| {
                let shell_index = match by_external.get(id) {
                    Some(&s) => s,
                    None => {
                        defaulted_rows += 1;
                        tracing::debug!(id, default = self.policy.default_shell, "no shell for fuzzy key");
                        self.policy.default_shell
                    }
                };
                JoinedRow {
                    id: id.to_string(),
                    ground_truth_label: record.ground_truth_label.clone(),
                    fuzzy_score: record.fuzzy_score.clone(),
                    shell_index,
                }
            })
            .collect();

        tracing::info!(rows = rows.len(), defaulted_rows, "influence join done");
        JoinOutcome { rows, unmapped_graph_ids, defaulted_rows }
    }
}

// ============================================================================
// CSV
// ============================================================================

/// Write header plus one line per row. Fields are not quoted.
pub fn write_csv<W: Write>(rows: &[JoinedRow], writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER.join(","))?;
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{}",
            row.id, row.ground_truth_label, row.fuzzy_score, row.shell_index
        )?;
    }
    Ok(())
}

/// Read a joined CSV back. The header line is optional.
pub fn read_csv<R: BufRead>(reader: R, source: &str) -> Result<Vec<JoinedRow>> {
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = strip_line_end(&line);
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.first() == Some(&CSV_HEADER[0]) {
            continue;
        }
        let malformed = |message: String| Error::MalformedRecord {
            input: source.to_string(),
            line: i + 1,
            message,
        };
        let [id, label, score, shell] = fields.as_slice() else {
            return Err(malformed(format!("expected 4 fields, got {}", fields.len())));
        };
        let shell_index = shell.trim().parse::<u32>()
            .map_err(|e| malformed(format!("bad k-shell '{shell}': {e}")))?;
        rows.push(JoinedRow {
            id: id.to_string(),
            ground_truth_label: label.to_string(),
            fuzzy_score: score.to_string(),
            shell_index,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kshell::KShellEngine;
    use crate::model::{FuzzyRecord, UnGraph};
    use std::io::Cursor;

    fn square_with_isolated() -> ShellAssignment {
        let mut g = UnGraph::new();
        let n: Vec<_> = ["0", "1", "2", "3"].iter().map(|k| g.add_node(*k)).collect();
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            g.add_edge(n[a], n[b]).unwrap();
        }
        g.add_node("4");
        KShellEngine::default().decompose(&g)
    }

    fn fuzzy(keys: &[&str]) -> FuzzyValueStore {
        let mut store = FuzzyValueStore::new();
        for (i, k) in keys.iter().enumerate() {
            store.insert(*k, FuzzyRecord::new("1", format!("{}", 90 + i)));
        }
        store
    }

    #[test]
    fn test_rows_follow_fuzzy_keys() {
        let ids: IdentifierMap = vec![("0", "100"), ("1", "101"), ("2", "102"), ("3", "103")]
            .into_iter().collect();
        let out = InfluenceJoiner::default().join(&fuzzy(&["103", "999", "100"]), &square_with_isolated(), &ids);

        let summary: Vec<_> = out.rows.iter().map(|r| (r.id.as_str(), r.shell_index)).collect();
        assert_eq!(summary, vec![("103", 2), ("999", 0), ("100", 2)]);
        assert_eq!(out.defaulted_rows, 1);
    }

    #[test]
    fn test_unmapped_graph_ids_reported() {
        let ids: IdentifierMap = vec![("0", "100")].into_iter().collect();
        let out = InfluenceJoiner::default().join(&fuzzy(&["100"]), &square_with_isolated(), &ids);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.unmapped_graph_ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_configurable_default() {
        let out = InfluenceJoiner::new(JoinPolicy { default_shell: 7 })
            .join(&fuzzy(&["x"]), &ShellAssignment::default(), &IdentifierMap::default());
        assert_eq!(out.rows[0].shell_index, 7);
    }

    #[test]
    fn test_shared_external_id_takes_max() {
        let ids: IdentifierMap = vec![("0", "same"), ("4", "same")].into_iter().collect();
        let mut g = UnGraph::new();
        let a = g.add_node("0");
        let b = g.add_node("4");
        g.add_edge(a, b).unwrap();
        let c = g.add_node("c");
        let d = g.add_node("d");
        g.add_edge(a, c).unwrap();
        g.add_edge(c, d).unwrap();
        g.add_edge(d, a).unwrap();
        let shells = KShellEngine::default().decompose(&g);
        assert_eq!(shells.get("4"), Some(1));
        assert_eq!(shells.get("0"), Some(2));

        let out = InfluenceJoiner::default().join(&fuzzy(&["same"]), &shells, &ids);
        assert_eq!(out.rows[0].shell_index, 2);
    }

    #[test]
    fn test_csv_write_and_read() {
        let rows = vec![
            JoinedRow { id: "7".into(), ground_truth_label: "1".into(), fuzzy_score: "99.9".into(), shell_index: 3 },
            JoinedRow { id: "8".into(), ground_truth_label: "0".into(), fuzzy_score: "10".into(), shell_index: 0 },
        ];
        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "id,is_true_positive,fuzzy_value,k-shell\n7,1,99.9,3\n8,0,10,0\n");

        let back = read_csv(Cursor::new(text), "joined").unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_read_csv_bad_shell() {
        let err = read_csv(Cursor::new("id,a,b,c\n1,1,5,x\n"), "joined").unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: 2, .. }));
    }
}
