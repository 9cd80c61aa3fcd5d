//! Header-normalized CSV access shared by the results and registration
//! loaders. Every lookup failure carries the file, row and column it came
//! from.

use crate::errors::InputError;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// `cpu time`, `CPU-Time` and `cpu_time` all name the same column.
pub fn normalize_header(h: &str) -> String {
    h.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

pub struct Table {
    file: String,
    index: HashMap<String, usize>,
    rows: Vec<csv::StringRecord>,
}

impl Table {
    pub fn read_path(path: &Path) -> Result<Self, InputError> {
        let file = path.display().to_string();
        let reader = std::fs::File::open(path).map_err(|e| InputError::csv(&file, e.into()))?;
        Self::from_reader(&file, reader)
    }

    pub fn from_reader<R: Read>(file: &str, reader: R) -> Result<Self, InputError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().map_err(|e| InputError::csv(file, e))?.clone();
        let mut index = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            // first occurrence wins for repeated headers
            index.entry(normalize_header(h)).or_insert(i);
        }

        let mut rows = Vec::new();
        for rec in rdr.records() {
            rows.push(rec.map_err(|e| InputError::csv(file, e))?);
        }

        Ok(Self {
            file: file.to_string(),
            index,
            rows,
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn column(&self, column: &str) -> Option<Column> {
        self.index.get(column).map(|&idx| Column {
            idx,
            name: column.to_string(),
        })
    }

    /// The first of `candidates` present in the header.
    pub fn first_of(&self, candidates: &[&str]) -> Option<Column> {
        candidates.iter().find_map(|c| self.column(c))
    }

    pub fn require(&self, column: &str) -> Result<Column, InputError> {
        self.column(column).ok_or_else(|| InputError::MissingColumn {
            file: self.file.clone(),
            column: column.to_string(),
        })
    }

    pub fn require_any(&self, candidates: &[&str]) -> Result<Column, InputError> {
        self.first_of(candidates)
            .ok_or_else(|| InputError::MissingColumn {
                file: self.file.clone(),
                column: candidates.join("|"),
            })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(move |(i, rec)| Row {
            file: &self.file,
            number: i + 1,
            rec,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    idx: usize,
    name: String,
}

pub struct Row<'a> {
    file: &'a str,
    number: usize,
    rec: &'a csv::StringRecord,
}

impl<'a> Row<'a> {
    /// 1-based data row number (header excluded).
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn get(&self, col: &Column) -> &'a str {
        self.rec.get(col.idx).unwrap_or("")
    }

    pub fn get_opt(&self, col: Option<&Column>) -> Option<&'a str> {
        col.map(|c| self.get(c)).filter(|v| !v.is_empty())
    }

    pub fn invalid(&self, col: &Column, expected: &str) -> InputError {
        InputError::InvalidValue {
            file: self.file.to_string(),
            row: self.number,
            column: col.name.clone(),
            value: self.get(col).to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn parse_f64(&self, col: &Column) -> Result<f64, InputError> {
        self.get(col)
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(col, "a number"))
    }

    pub fn parse_bool(&self, col: &Column) -> Result<bool, InputError> {
        match self.get(col).to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Ok(true),
            "false" | "0" | "no" | "n" => Ok(false),
            _ => Err(self.invalid(col, "a boolean (yes/no/true/false/1/0)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_normalization() {
        assert_eq!(normalize_header(" CPU time "), "cpu_time");
        assert_eq!(normalize_header("wrong-answers"), "wrong_answers");
        assert_eq!(normalize_header("model_validator_status"), "model_validator_status");
    }

    #[test]
    fn test_lookup_and_row_context() {
        let data = "Benchmark,CPU time\nQF_LIA/a.smt2,abc\n";
        let t = Table::from_reader("results.csv", data.as_bytes()).unwrap();
        assert_eq!(t.len(), 1);
        let cpu = t.require("cpu_time").unwrap();
        let row = t.rows().next().unwrap();
        let err = row.parse_f64(&cpu).unwrap_err().to_string();
        assert!(err.contains("row 1"), "{err}");
        assert!(err.contains("cpu_time"), "{err}");

        let missing = t.require("wallclock_time").unwrap_err().to_string();
        assert!(missing.contains("missing required column 'wallclock_time'"));
    }
}
