use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::apriori::TransactionSet;
use crate::error::Result;

/// Reads one transaction per line of delimited text.
///
/// A line holding a single cell (optionally double-quoted) is split on commas;
/// a line with several cells uses each cell as one item. Items are trimmed,
/// empty items are dropped and lines left without items are skipped.
pub fn read_transactions<R: BufRead>(reader: R) -> Result<Vec<Vec<String>>> {
    let mut transactions = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let cells = split_cells(&line);

        let items: Vec<String> = match cells.as_slice() {
            [] => Vec::new(),
            [cell] => cell
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect(),
            _ => cells
                .iter()
                .map(|cell| cell.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect(),
        };

        if items.is_empty() {
            debug!(line = line_no + 1, "skipping row without items");
            continue;
        }
        transactions.push(items);
    }

    Ok(transactions)
}

pub fn load_transactions(path: impl AsRef<Path>) -> Result<TransactionSet> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let rows = read_transactions(BufReader::new(file))?;
    debug!(path = %path.display(), rows = rows.len(), "transactions loaded");
    TransactionSet::from_tokens(rows)
}

/// Splits a line on commas outside double quotes. A quote opens a quoted section only as
/// the first character of a cell; elsewhere it is a literal character. `""` inside quotes
/// is a literal quote.
fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Vec::new();
    }

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut cell_started = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' if in_quotes => in_quotes = false,
            '"' if !cell_started => {
                in_quotes = true;
                cell_started = true;
            }
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut cell));
                cell_started = false;
            }
            _ => {
                cell.push(c);
                cell_started = true;
            }
        }
    }
    cells.push(cell);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MiningError;
    use std::io::{Cursor, Write};

    #[test]
    fn multi_column_rows() {
        let rows = read_transactions(Cursor::new("milk, bread ,eggs\nbeer,,\n")).unwrap();
        assert_eq!(rows, vec![vec!["milk", "bread", "eggs"], vec!["beer"]]);
    }

    #[test]
    fn quoted_single_cell_is_split() {
        let rows = read_transactions(Cursor::new("\"milk, bread\"\n\"beer\"\n")).unwrap();
        assert_eq!(rows, vec![vec!["milk", "bread"], vec!["beer"]]);
    }

    #[test]
    fn blank_and_empty_rows_are_skipped() {
        let rows = read_transactions(Cursor::new("\n   \n,,\n\"\"\napple\r\n")).unwrap();
        assert_eq!(rows, vec![vec!["apple"]]);
    }

    #[test]
    fn escaped_quotes_stay_in_items() {
        let rows = read_transactions(Cursor::new("\"12\"\" pipe\",wrench\n")).unwrap();
        assert_eq!(rows, vec![vec!["12\" pipe", "wrench"]]);
    }

    #[test]
    fn quote_inside_unquoted_cell_is_literal() {
        let rows = read_transactions(Cursor::new("12\" pipe,wrench\n")).unwrap();
        assert_eq!(rows, vec![vec!["12\" pipe", "wrench"]]);

        let rows = read_transactions(Cursor::new("bolt,3/4\" nut,\"washer, flat\"\n")).unwrap();
        assert_eq!(rows, vec![vec!["bolt", "3/4\" nut", "washer, flat"]]);
    }

    #[test]
    fn loads_file_into_transaction_set() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "A,B").unwrap();
        writeln!(file, "A,B,C").unwrap();
        writeln!(file, "A").unwrap();
        writeln!(file, "B,C").unwrap();

        let tx = load_transactions(file.path()).unwrap();
        assert_eq!(tx.len(), 4);
        assert_eq!(tx.items().len(), 3);
    }

    #[test]
    fn file_without_items_is_an_empty_dataset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file).unwrap();
        writeln!(file, ",,").unwrap();

        assert!(matches!(
            load_transactions(file.path()),
            Err(MiningError::EmptyDataset)
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_transactions("/definitely/not/here.csv"),
            Err(MiningError::Io(_))
        ));
    }
}
