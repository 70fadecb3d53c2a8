use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::ParseFloatError;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use thiserror::Error;

// lines starting with this are skipped
const COMMENT_FLAG: &str = "#";
const RECORD_FIELD_COUNT: usize = 3;

/// An Error that is thrown when a table line does not
/// split into exactly three whitespace separated fields.
#[derive(Error, Debug)]
#[error("expected {RECORD_FIELD_COUNT} fields, found {found}")]
pub struct FieldCountError {
    pub found: usize,
}

/// An Error that is thrown when the third field of
/// a table line can't be read as a floating point number.
#[derive(Error, Debug)]
#[error("failed to parse token \"{token}\" as a probability")]
pub struct ProbabilityParseError {
    pub token: String,
    #[source]
    source: ParseFloatError,
}

/// A single `(from, to, probability)` triple of a probability table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRecord<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub probability: f64,
}

/// A two level mapping of `from -> to -> probability`.
///
/// This is the shape of both the transition table (source state to destination
/// state) and the emission table (state to output symbol). Rows and the entries
/// within them keep the order in which they were first seen. No validation is
/// done on the probabilities: rows don't need to sum to one, and values outside
/// of [0, 1] are stored as given.
#[derive(Default, Clone, Debug)]
pub struct ProbabilityTable {
    rows: IndexMap<String, IndexMap<String, f64>>,
}

impl ProbabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from in-memory `(from, to, probability)` triples.
    pub fn from_records<A, B, I>(records: I) -> Self
    where
        A: AsRef<str>,
        B: AsRef<str>,
        I: IntoIterator<Item = (A, B, f64)>,
    {
        let mut table = Self::new();
        records
            .into_iter()
            .for_each(|(from, to, probability)| table.insert(from.as_ref(), to.as_ref(), probability));
        table
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path).with_context(|| {
            format!(
                "failed to open probability table: {}",
                path.as_ref().to_string_lossy()
            )
        })?;

        parse_table(BufReader::new(file), &path.as_ref().to_string_lossy())
    }

    /// Insert a probability. A repeated `(from, to)` pair
    /// overwrites the value but keeps its original position.
    pub fn insert(&mut self, from: &str, to: &str, probability: f64) {
        match self.rows.get_mut(from) {
            Some(row) => {
                row.insert(to.to_string(), probability);
            }
            None => {
                let mut row = IndexMap::new();
                row.insert(to.to_string(), probability);
                self.rows.insert(from.to_string(), row);
            }
        }
    }

    pub fn get(&self, from: &str, to: &str) -> Option<f64> {
        self.rows.get(from)?.get(to).copied()
    }

    pub fn row(&self, from: &str) -> Option<&IndexMap<String, f64>> {
        self.rows.get(from)
    }

    /// The outer keys of the table, in first-appearance order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(|k| k.as_str())
    }

    pub fn records(&self) -> impl Iterator<Item = TableRecord<'_>> {
        self.rows.iter().flat_map(|(from, row)| {
            row.iter().map(move |(to, &probability)| TableRecord {
                from,
                to,
                probability,
            })
        })
    }

    /// The number of rows (distinct outer keys).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_records(&self) -> usize {
        self.rows.values().map(|row| row.len()).sum()
    }
}

/// Parse a probability table from a reader.
///
/// Every line that isn't blank and doesn't start with `#` must hold exactly three
/// whitespace separated fields: `from to probability`. The `source` string is
/// only used to describe where a parse failure happened.
pub fn parse_table<R: BufRead>(reader: R, source: &str) -> Result<ProbabilityTable> {
    let mut table = ProbabilityTable::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line_number = line_idx + 1;
        let line =
            line.with_context(|| format!("failed to read line {line_number} of: {source}"))?;

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_FLAG) {
            continue;
        }

        let error_context = || {
            format!(
                "failed to parse probability table: {}\n         on line: {}\n",
                source, line_number
            )
        };

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() != RECORD_FIELD_COUNT {
            return Err(FieldCountError {
                found: tokens.len(),
            })
            .with_context(error_context);
        }

        let probability = get_token_as_f64(&tokens, 2).with_context(error_context)?;
        table.insert(tokens[0], tokens[1], probability);
    }

    log::debug!(
        "parsed {} records in {} rows from: {}",
        table.num_records(),
        table.len(),
        source
    );

    Ok(table)
}

fn get_token_as_f64(tokens: &[&str], idx: usize) -> Result<f64, ProbabilityParseError> {
    tokens[idx]
        .parse::<f64>()
        .map_err(|source| ProbabilityParseError {
            token: tokens[idx].to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    const CAT_TRANS: &str = "\
# transitions for a cat
Happy Happy 0.6
Happy Grumpy 0.4

Grumpy Happy 0.3
Grumpy Grumpy 0.7
";

    #[test]
    fn test_parse_table_skips_comments_and_blank_lines() -> anyhow::Result<()> {
        let table = parse_table(CAT_TRANS.as_bytes(), "cat.trans")?;

        check!(table.len() == 2);
        check!(table.num_records() == 4);
        check!(table.keys().collect::<Vec<_>>() == vec!["Happy", "Grumpy"]);
        check!(table.get("Happy", "Grumpy") == Some(0.4));
        check!(table.get("Grumpy", "Grumpy") == Some(0.7));
        check!(table.get("Grumpy", "Sleepy") == None);
        Ok(())
    }

    #[test]
    fn test_parse_table_keeps_values_as_given() -> anyhow::Result<()> {
        let text = "a b 1.5\na c -0.25\na b 2e-3\n   # indented comment\n";
        let table = parse_table(text.as_bytes(), "odd.trans")?;

        // the repeated pair overwrites, but stays in the first position
        let records: Vec<TableRecord> = table.records().collect();
        check!(
            records
                == vec![
                    TableRecord { from: "a", to: "b", probability: 2e-3 },
                    TableRecord { from: "a", to: "c", probability: -0.25 },
                ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_table_wrong_field_count() {
        let text = "Happy Happy 0.6\nHappy Grumpy\n";
        let result = parse_table(text.as_bytes(), "bad.trans");

        let_assert!(Err(err) = result);
        let_assert!(Some(field_err) = err.downcast_ref::<FieldCountError>());
        check!(field_err.found == 2);
        check!(format!("{err:?}").contains("on line: 2"));
        check!(format!("{err:?}").contains("bad.trans"));
    }

    #[test]
    fn test_parse_table_non_numeric_probability() {
        let text = "Happy meow lots\n";
        let result = parse_table(text.as_bytes(), "bad.emit");

        let_assert!(Err(err) = result);
        let_assert!(Some(parse_err) = err.downcast_ref::<ProbabilityParseError>());
        check!(parse_err.token == "lots");
    }

    #[test]
    fn test_from_records_round_trip() {
        let table = ProbabilityTable::from_records([
            ("Happy", "meow", 0.8),
            ("Happy", "purr", 0.2),
            ("Grumpy", "meow", 0.3),
        ]);

        check!(table.get("Happy", "purr") == Some(0.2));
        check!(table.row("Grumpy").map(|r| r.len()) == Some(1));
        check!(table.row("Hungry").is_none());
    }
}
