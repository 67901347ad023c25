// SPDX-License-Identifier: Apache-2.0

//! Expected input/output tuples the device is checked against.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::static_config::StaticConfig;
use crate::PecheckError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Row {
    pub operand_a: u64,
    pub operand_b: u64,
    pub expected: u64,
}

impl Row {
    pub const fn new(operand_a: u64, operand_b: u64, expected: u64) -> Self {
        Row {
            operand_a,
            operand_b,
            expected,
        }
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.operand_a, self.operand_b, self.expected)
    }
}

/// Op code 19 (and) over all operand pairs in `{0,1,2,3}`.
pub const AND_TRUTH_TABLE: [Row; 16] = [
    Row::new(0, 0, 0),
    Row::new(0, 1, 0),
    Row::new(0, 2, 0),
    Row::new(0, 3, 0),
    Row::new(1, 0, 0),
    Row::new(1, 1, 1),
    Row::new(1, 2, 0),
    Row::new(1, 3, 1),
    Row::new(2, 0, 0),
    Row::new(2, 1, 0),
    Row::new(2, 2, 2),
    Row::new(2, 3, 2),
    Row::new(3, 0, 0),
    Row::new(3, 1, 1),
    Row::new(3, 2, 2),
    Row::new(3, 3, 3),
];

pub const AND_TABLE_DOMAIN: u64 = 4;

pub fn and_truth_table() -> TruthTable {
    TruthTable::new(AND_TRUTH_TABLE.to_vec())
}

/// Which operand pairs of a `domain x domain` square a table exercises.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    pub missing: Vec<(u64, u64)>,
    pub duplicated: Vec<(u64, u64)>,
    pub out_of_domain: Vec<Row>,
}

impl Coverage {
    /// True when every pair appears exactly once and nothing lies outside.
    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.duplicated.is_empty() && self.out_of_domain.is_empty()
    }
}

/// On-disk form of a truth table, optionally carrying the configuration it
/// was generated for.
#[derive(Debug, Serialize, Deserialize)]
struct VectorFile {
    rows: Vec<(u64, u64, u64)>,
    config: Option<StaticConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TruthTable {
    rows: Vec<Row>,
}

impl TruthTable {
    pub fn new(rows: Vec<Row>) -> Self {
        TruthTable { rows }
    }

    /// Enumerates every `(a, b)` in `0..domain` squared, row-major, using
    /// `oracle` for the expected value.
    pub fn complete(domain: u64, oracle: impl Fn(u64, u64) -> u64) -> Self {
        let mut rows = Vec::new();
        for a in 0..domain {
            for b in 0..domain {
                rows.push(Row::new(a, b, oracle(a, b)));
            }
        }
        TruthTable { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn coverage(&self, domain: u64) -> Coverage {
        let mut counts: HashMap<(u64, u64), usize> = HashMap::new();
        let mut coverage = Coverage::default();
        for row in self.rows.iter() {
            if row.operand_a >= domain || row.operand_b >= domain {
                coverage.out_of_domain.push(*row);
                continue;
            }
            *counts.entry((row.operand_a, row.operand_b)).or_insert(0) += 1;
        }
        for a in 0..domain {
            for b in 0..domain {
                match counts.get(&(a, b)) {
                    None => coverage.missing.push((a, b)),
                    Some(&n) if n > 1 => coverage.duplicated.push((a, b)),
                    Some(_) => {}
                }
            }
        }
        coverage
    }

    /// Parses a vector file, returning the table and the configuration it
    /// names, if any.
    pub fn from_toml_str(text: &str) -> Result<(TruthTable, Option<StaticConfig>), PecheckError> {
        let file: VectorFile =
            toml::from_str(text).map_err(|e| PecheckError::VectorFile(e.to_string()))?;
        let rows = file
            .rows
            .into_iter()
            .map(|(a, b, expected)| Row::new(a, b, expected))
            .collect();
        Ok((TruthTable { rows }, file.config))
    }

    pub fn load(path: &Path) -> Result<(TruthTable, Option<StaticConfig>), PecheckError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PecheckError::VectorFile(format!("could not read {}: {}", path.display(), e))
        })?;
        log::info!("TruthTable::load; path: {}", path.display());
        TruthTable::from_toml_str(&text)
    }

    pub fn to_toml_string(&self, config: Option<&StaticConfig>) -> Result<String, PecheckError> {
        let file = VectorFile {
            rows: self
                .rows
                .iter()
                .map(|r| (r.operand_a, r.operand_b, r.expected))
                .collect(),
            config: config.copied(),
        };
        toml::to_string(&file).map_err(|e| PecheckError::VectorFile(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_and_table_is_its_own_oracle() {
        let generated = TruthTable::complete(AND_TABLE_DOMAIN, |a, b| a & b);
        assert_eq!(generated, and_truth_table());
    }

    #[test]
    fn test_and_table_covers_domain_exactly() {
        assert!(and_truth_table().coverage(AND_TABLE_DOMAIN).is_exact());
    }

    #[test]
    fn test_coverage_reports_gaps_and_duplicates() {
        let table = TruthTable::new(vec![
            Row::new(0, 0, 0),
            Row::new(0, 0, 0),
            Row::new(1, 1, 1),
            Row::new(5, 0, 0),
        ]);
        let coverage = table.coverage(2);
        assert_eq!(coverage.missing, vec![(0, 1), (1, 0)]);
        assert_eq!(coverage.duplicated, vec![(0, 0)]);
        assert_eq!(coverage.out_of_domain, vec![Row::new(5, 0, 0)]);
        assert!(!coverage.is_exact());
    }

    #[test]
    fn test_empty_table_misses_everything() {
        let coverage = TruthTable::default().coverage(2);
        assert_eq!(coverage.missing.len(), 4);
    }

    #[test]
    fn test_vector_file_round_trip() {
        let config = StaticConfig {
            operation_selector: 19,
            ..StaticConfig::default()
        };
        let text = and_truth_table().to_toml_string(Some(&config)).unwrap();
        let (table, parsed_config) = TruthTable::from_toml_str(&text).unwrap();
        assert_eq!(table, and_truth_table());
        assert_eq!(parsed_config, Some(config));
    }

    #[test]
    fn test_vector_file_without_config() {
        let (table, config) = TruthTable::from_toml_str("rows = [[1, 2, 3], [4, 5, 6]]").unwrap();
        assert_eq!(table.rows(), &[Row::new(1, 2, 3), Row::new(4, 5, 6)]);
        assert_eq!(config, None);
    }

    #[test]
    fn test_vector_file_rejects_short_rows() {
        let e = TruthTable::from_toml_str("rows = [[1, 2]]").unwrap_err();
        assert!(matches!(e, PecheckError::VectorFile(_)));
    }

    #[test]
    fn test_row_display() {
        assert_eq!(Row::new(2, 3, 2).to_string(), "2, 3, 2");
    }
}
