//! Quote-aware CSV splitting into a header + rows table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{IngestError, Result};
use crate::header::normalize_header;

/// Parsed DRP sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrpTable {
    /// Header cells as written (trimmed).
    pub headers: Vec<String>,
    pub rows: Vec<DrpRow>,
}

/// One non-empty data row, keyed by normalized header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrpRow {
    /// 1-based data row number.
    pub number: usize,
    pub values: BTreeMap<String, String>,
}

impl DrpRow {
    /// Value under a header, compared after normalization. Empty cells count
    /// as absent.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.values
            .get(&normalize_header(header))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// First non-empty value among `headers`, in order.
    pub fn first_of(&self, headers: &[&str]) -> Option<&str> {
        headers.iter().find_map(|h| self.get(h))
    }
}

impl DrpTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Splits a CSV line into trimmed fields.
///
/// A `"` toggles quoting; `""` inside quotes is a literal quote; commas inside
/// quotes do not split.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Splits text into records on line breaks outside quotes, dropping blank
/// records. Quoted cells may span lines (exported code cells do).
pub fn split_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in text.chars() {
        match c {
            '"' => {
                // A doubled quote toggles twice and leaves the state unchanged.
                in_quotes = !in_quotes;
                current.push(c);
            }
            '\n' if !in_quotes => {
                records.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    records.push(current);

    records
        .into_iter()
        .map(|mut r| {
            if r.ends_with('\r') {
                r.pop();
            }
            r
        })
        .filter(|r| !r.trim().is_empty())
        .collect()
}

/// Parse a DRP CSV into a table.
///
/// Rows whose cells are all empty are dropped. Fails with
/// [`IngestError::EmptyInput`] when there is no header or no data row.
pub fn parse_table(text: &str) -> Result<DrpTable> {
    let records = split_records(text);
    let Some((header_line, data)) = records.split_first() else {
        return Err(IngestError::EmptyInput {
            reason: "no lines",
        });
    };

    let headers = parse_csv_line(header_line);
    let keys: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let rows: Vec<DrpRow> = data
        .iter()
        .map(|line| parse_csv_line(line))
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .enumerate()
        .map(|(index, cells)| {
            let mut values = BTreeMap::new();
            for (i, key) in keys.iter().enumerate() {
                // First occurrence wins for duplicated headers.
                values
                    .entry(key.clone())
                    .or_insert_with(|| cells.get(i).cloned().unwrap_or_default());
            }
            DrpRow {
                number: index + 1,
                values,
            }
        })
        .collect();

    if rows.is_empty() {
        return Err(IngestError::EmptyInput {
            reason: "no data rows",
        });
    }
    Ok(DrpTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_line_simple() {
        assert_eq!(parse_csv_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_csv_line_quoted() {
        assert_eq!(parse_csv_line("\"hello, world\",b,c"), vec!["hello, world", "b", "c"]);
    }

    #[test]
    fn test_parse_csv_line_escaped_quotes() {
        assert_eq!(
            parse_csv_line("\"he said \"\"hello\"\"\",b"),
            vec!["he said \"hello\"", "b"]
        );
    }

    #[test]
    fn test_parse_csv_line_trailing_empty() {
        assert_eq!(parse_csv_line("  a  ,  b  ,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_split_records_keeps_quoted_newlines() {
        let records = split_records("h1,h2\r\n\"line one\nline two\",x\n\n  \nlast,row\n");
        assert_eq!(records, vec!["h1,h2", "\"line one\nline two\",x", "last,row"]);
    }

    #[test]
    fn test_parse_table_drops_empty_rows() {
        let table = parse_table("Check Name,Description\n,\nA,first\n , \nB,second").unwrap();
        assert_eq!(table.headers, vec!["Check Name", "Description"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].number, 1);
        assert_eq!(table.rows[0].get("check_name"), Some("A"));
        assert_eq!(table.rows[1].first_of(&["Rule", "Description"]), Some("second"));
    }

    #[test]
    fn test_short_rows_pad_with_empty() {
        let table = parse_table("Name,Description,Domain\nA,desc").unwrap();
        assert_eq!(table.rows[0].get("Domain"), None);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_table(" \n\n"), Err(IngestError::EmptyInput { .. })));
        assert!(matches!(
            parse_table("Name,Description\n,\n"),
            Err(IngestError::EmptyInput { reason: "no data rows" })
        ));
    }
}
