//! Tabular data loading and saving
//!
//! CSV is the only on-disk format: header row required, comma-separated by
//! default. Files are read fully into memory; there is no streaming path.

use crate::error::{Result, TreinoError};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Load a CSV file into a DataFrame with default options.
///
/// Fails with a [`TreinoError::DataError`] if the file is missing or
/// malformed.
pub fn load_data(path: &str) -> Result<DataFrame> {
    DataLoader::new().load_csv(path)
}

/// Write a DataFrame to a CSV file, overwriting any existing file.
///
/// Column headers are written; no row index column is added.
pub fn save_data(df: &mut DataFrame, path: &str) -> Result<()> {
    let mut file = File::create(path).map_err(|e| TreinoError::DataError(e.to_string()))?;

    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(|e| TreinoError::DataError(e.to_string()))
}

/// CSV loader with configurable dialect options
pub struct DataLoader {
    delimiter: u8,
    has_header: bool,
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            infer_schema_length: Some(100),
        }
    }

    /// Set the field delimiter (comma by default)
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Toggle the header row (on by default)
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Number of rows used for schema inference
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = Some(n);
        self
    }

    /// Load a CSV file into a DataFrame
    pub fn load_csv(&self, path: &str) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| TreinoError::DataError(e.to_string()))?;

        let parse_opts = CsvParseOptions::default().with_separator(self.delimiter);

        let reader = CsvReadOptions::default()
            .with_has_header(self.has_header)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| TreinoError::DataError(e.to_string()))
    }

    /// Read row/column counts and header names without a full parse
    pub fn file_info(&self, path: &str) -> Result<FileInfo> {
        let metadata =
            std::fs::metadata(path).map_err(|e| TreinoError::DataError(e.to_string()))?;
        let file_size = metadata.len();

        let file = File::open(path).map_err(|e| TreinoError::DataError(e.to_string()))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header = lines
            .next()
            .transpose()
            .map_err(|e| TreinoError::DataError(e.to_string()))?
            .unwrap_or_default();

        let sep = self.delimiter as char;
        let columns: Vec<String> = header.split(sep).map(|s| s.trim().to_string()).collect();
        let n_cols = columns.len();
        let n_rows = lines.count();

        Ok(FileInfo {
            path: path.to_string(),
            file_size,
            n_rows,
            n_cols,
            columns,
        })
    }
}

/// Summary of a CSV file's shape
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub file_size: u64,
    pub n_rows: usize,
    pub n_cols: usize,
    pub columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "a,b,c").unwrap();
        writeln!(file, "1,2,3").unwrap();
        writeln!(file, "4,5,6").unwrap();
        writeln!(file, "7,8,9").unwrap();
        file
    }

    #[test]
    fn test_load_data() {
        let file = create_test_csv();
        let df = load_data(file.path().to_str().unwrap()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_data("/nonexistent/path/data.csv");
        assert!(matches!(result, Err(TreinoError::DataError(_))));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut df = DataFrame::new(vec![
            Column::new("a".into(), &[1, 2, 3]),
            Column::new("b".into(), &[4, 5, 6]),
        ])
        .unwrap();

        let file = NamedTempFile::new().unwrap();
        save_data(&mut df, file.path().to_str().unwrap()).unwrap();

        let reloaded = load_data(file.path().to_str().unwrap()).unwrap();
        assert_eq!(reloaded.height(), 3);
        assert_eq!(reloaded.width(), 2);
        assert_eq!(
            reloaded
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_file_info() {
        let file = create_test_csv();
        let loader = DataLoader::new();
        let info = loader.file_info(file.path().to_str().unwrap()).unwrap();

        assert_eq!(info.n_rows, 3);
        assert_eq!(info.n_cols, 3);
        assert_eq!(info.columns, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(file, "x\ty").unwrap();
        writeln!(file, "1\t2").unwrap();

        let loader = DataLoader::new().with_delimiter(b'\t');
        let df = loader.load_csv(file.path().to_str().unwrap()).unwrap();
        assert_eq!(df.width(), 2);
        assert_eq!(df.height(), 1);
    }
}
