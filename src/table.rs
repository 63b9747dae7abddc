//! Loading of plain-text numeric tables.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default field separator of table files.
pub const DEFAULT_DELIMITER: u8 = b',';

#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to read table {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: failed to parse {token:?} as a number")]
    Parse { line: u64, token: String },
    #[error("line {line}: expected {expected} columns, found {found}")]
    Ragged { line: u64, expected: u64, found: u64 },
    #[error(transparent)]
    Csv(csv::Error),
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        if let csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } = err.kind()
        {
            return TableError::Ragged {
                line: pos.as_ref().map_or(0, |pos| pos.line()),
                expected: *expected_len,
                found: *len,
            };
        }

        TableError::Csv(err)
    }
}

/// A dense table of floating point values stored row by row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: usize,
    data: Vec<f64>,
}

fn reader_builder(delimiter: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(false);
    builder
}

impl Table {
    /// Parses a comma separated table. Lines starting with `#` and blank lines are skipped.
    pub fn parse(source: &str) -> Result<Self, TableError> {
        Self::parse_with_delimiter(source, DEFAULT_DELIMITER)
    }

    /// Parses a table whose fields are separated by `delimiter`.
    pub fn parse_with_delimiter(source: &str, delimiter: u8) -> Result<Self, TableError> {
        Self::from_reader(reader_builder(delimiter).from_reader(source.as_bytes()))
    }

    /// Reads and parses a comma separated table from disk.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        Self::load_with_delimiter(path, DEFAULT_DELIMITER)
    }

    pub fn load_with_delimiter(path: &Path, delimiter: u8) -> Result<Self, TableError> {
        let file = std::fs::File::open(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(reader_builder(delimiter).from_reader(file))
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, TableError> {
        let mut columns = 0;
        let mut data = Vec::new();

        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |pos| pos.line());

            let values: Vec<f64> = record.deserialize(None).map_err(|err| {
                let field = match err.kind() {
                    csv::ErrorKind::Deserialize { err, .. } => err.field(),
                    _ => None,
                };
                TableError::Parse {
                    line,
                    token: field
                        .and_then(|field| record.get(field as usize))
                        .unwrap_or_default()
                        .to_string(),
                }
            })?;

            columns = values.len();
            data.extend(values);
        }

        Ok(Self { columns, data })
    }

    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.data.len() / self.columns
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Values of a single row, `None` if `index` is out of range.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.rows() {
            return None;
        }

        Some(&self.data[index * self.columns..(index + 1) * self.columns])
    }

    /// Values of a single column, `None` if `index` is out of range.
    pub fn column(&self, index: usize) -> Option<impl Iterator<Item = f64> + '_> {
        if index >= self.columns {
            return None;
        }

        Some(self.data.iter().skip(index).step_by(self.columns).copied())
    }

    /// All values in row major order.
    pub fn values(&self) -> &[f64] {
        &self.data
    }
}

/// Source of numeric tables, resolved by path.
pub trait TableSource {
    fn load(&self, path: &Path) -> Result<Table, TableError>;
}

/// Loads tables from the filesystem, resolving relative paths against a root directory.
#[derive(Debug, Clone)]
pub struct FsTables {
    root: PathBuf,
    delimiter: u8,
}

impl FsTables {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Uses `delimiter` as field separator instead of a comma.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TableSource for FsTables {
    fn load(&self, path: &Path) -> Result<Table, TableError> {
        if path.is_absolute() {
            Table::load_with_delimiter(path, self.delimiter)
        } else {
            Table::load_with_delimiter(&self.root.join(path), self.delimiter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing() {
        let table = Table::parse("# r, Pi\n0.0, 1.0\n0.5,2.0\n\n1.0,\t3.0\n").unwrap();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.columns(), 2);
        assert_eq!(table.row(1), Some(&[0.5, 2.0][..]));
        assert_eq!(
            table.column(1).unwrap().collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0]
        );

        let single = Table::parse("1e-3\n2e-3\n").unwrap();
        assert_eq!(single.columns(), 1);
        assert_eq!(single.values(), &[1e-3, 2e-3]);

        let tabs = Table::parse_with_delimiter("1\t2\n3\t4\n", b'\t').unwrap();
        assert_eq!(tabs.values(), &[1.0, 2.0, 3.0, 4.0]);

        assert!(Table::parse("").unwrap().is_empty());
    }

    #[test]
    fn out_of_range_access() {
        let table = Table::parse("1,2\n3,4\n").unwrap();
        assert_eq!(table.row(1), Some(&[3.0, 4.0][..]));
        assert!(table.row(2).is_none());
        assert!(table.column(2).is_none());

        let empty = Table::default();
        assert!(empty.row(0).is_none());
        assert!(empty.column(0).is_none());
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            Table::parse("1.0,2.0\n3.0,abc\n"),
            Err(TableError::Parse { line: 2, ref token }) if token == "abc"
        ));
        assert!(matches!(
            Table::parse("1.0,2.0\n3.0\n"),
            Err(TableError::Ragged {
                line: 2,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn filesystem() {
        let root = std::env::temp_dir().join(format!("sfcollapse-table-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("table.csv"), "1,2\n3,4\n").unwrap();
        std::fs::write(root.join("table.txt"), "1 2\n3 4\n").unwrap();

        let tables = FsTables::new(&root);
        let table = tables.load(Path::new("table.csv")).unwrap();
        assert_eq!(table.values(), &[1.0, 2.0, 3.0, 4.0]);

        let spaced = FsTables::new(&root).with_delimiter(b' ');
        let table = spaced.load(Path::new("table.txt")).unwrap();
        assert_eq!(table.values(), &[1.0, 2.0, 3.0, 4.0]);

        assert!(matches!(
            tables.load(Path::new("missing.csv")),
            Err(TableError::Io { .. })
        ));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
