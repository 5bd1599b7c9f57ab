//! Flat operation records for import and export.
//!
//! One [`Row`] per operation. CSV files carry a header row, JSON files an
//! array of objects and YAML files a sequence of mappings.

use std::{fs, path::Path};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, Kind, Money, Operation, ResultEngine};

/// Date layout used by every format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// `1` for income, `-1` for expense.
    #[serde(rename = "type")]
    pub kind: i32,
    pub amount: Money,
    pub date: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl Row {
    #[must_use]
    pub fn from_operation(operation: &Operation, category: &str) -> Self {
        Self {
            kind: operation.kind.into(),
            amount: operation.amount,
            date: operation.date,
            category: category.to_string(),
            description: operation.description.clone(),
        }
    }

    pub fn kind(&self) -> ResultEngine<Kind> {
        Kind::try_from(self.kind)
    }
}

/// CSV cells are all text; parsed into a [`Row`] one by one so a bad cell
/// only drops its own record.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    kind: String,
    amount: String,
    date: String,
    category: String,
    #[serde(default)]
    description: String,
}

impl From<&Row> for CsvRecord {
    fn from(row: &Row) -> Self {
        Self {
            kind: row.kind.to_string(),
            amount: row.amount.to_string(),
            date: row.date.format(DATE_FORMAT).to_string(),
            category: row.category.clone(),
            description: row.description.clone(),
        }
    }
}

impl TryFrom<CsvRecord> for Row {
    type Error = EngineError;

    fn try_from(record: CsvRecord) -> Result<Self, Self::Error> {
        let kind = record
            .kind
            .trim()
            .parse::<i32>()
            .map_err(|_| EngineError::InvalidKind(format!("type '{}'", record.kind)))?;
        let date = NaiveDate::parse_from_str(record.date.trim(), DATE_FORMAT)
            .map_err(|_| EngineError::InvalidDate(format!("date '{}'", record.date)))?;
        Ok(Self {
            kind,
            amount: record.amount.parse()?,
            date,
            category: record.category,
            description: record.description,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Yaml,
}

impl Format {
    /// Picks the format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn encode(self, rows: &[Row]) -> ResultEngine<Vec<u8>> {
        match self {
            Self::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                for row in rows {
                    writer
                        .serialize(CsvRecord::from(row))
                        .map_err(|err| EngineError::Export(err.to_string()))?;
                }
                if rows.is_empty() {
                    writer
                        .write_record(["type", "amount", "date", "category", "description"])
                        .map_err(|err| EngineError::Export(err.to_string()))?;
                }
                writer
                    .into_inner()
                    .map_err(|err| EngineError::Export(err.to_string()))
            }
            Self::Json => {
                serde_json::to_vec_pretty(rows).map_err(|err| EngineError::Export(err.to_string()))
            }
            Self::Yaml => serde_yaml::to_string(rows)
                .map(String::into_bytes)
                .map_err(|err| EngineError::Export(err.to_string())),
        }
    }

    /// Parses encoded rows.
    ///
    /// CSV records that cannot be parsed are skipped with a warning; JSON
    /// and YAML input must be well formed as a whole.
    pub fn decode(self, bytes: &[u8]) -> ResultEngine<Vec<Row>> {
        match self {
            Self::Csv => {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(true)
                    .flexible(true)
                    .trim(csv::Trim::Headers)
                    .from_reader(bytes);
                let mut rows = Vec::new();
                for (index, record) in reader.deserialize::<CsvRecord>().enumerate() {
                    // header is line 1
                    let line = index + 2;
                    match record.map_err(|err| EngineError::Import(err.to_string())) {
                        Ok(record) => match Row::try_from(record) {
                            Ok(row) => rows.push(row),
                            Err(err) => {
                                tracing::warn!(line, error = %err, "skipping csv record");
                            }
                        },
                        Err(err) => {
                            tracing::warn!(line, error = %err, "skipping csv record");
                        }
                    }
                }
                Ok(rows)
            }
            Self::Json => {
                serde_json::from_slice(bytes).map_err(|err| EngineError::Import(err.to_string()))
            }
            Self::Yaml => {
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Vec::new());
                }
                serde_yaml::from_slice(bytes).map_err(|err| EngineError::Import(err.to_string()))
            }
        }
    }
}

/// Encodes `rows` and writes them to `path`, creating parent directories.
pub fn write_rows(path: &Path, format: Format, rows: &[Row]) -> ResultEngine<()> {
    let bytes = format.encode(rows)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_rows(path: &Path, format: Format) -> ResultEngine<Vec<Row>> {
    let bytes = fs::read(path)?;
    format.decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: i32, cents: i64, day: u32, category: &str) -> Row {
        Row {
            kind,
            amount: Money::from_cents(cents),
            date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
            category: category.to_string(),
            description: format!("note {day}"),
        }
    }

    #[test]
    fn csv_has_header_and_fixed_amounts() {
        let bytes = Format::Csv
            .encode(&[row(-1, 1250, 2, "Food"), row(1, 100000, 3, "Salary")])
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("type,amount,date,category,description"));
        assert_eq!(lines.next(), Some("-1,12.50,2024-04-02,Food,note 2"));
        assert_eq!(lines.next(), Some("1,1000.00,2024-04-03,Salary,note 3"));
    }

    #[test]
    fn empty_csv_still_has_header() {
        let bytes = Format::Csv.encode(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap().trim_end(),
            "type,amount,date,category,description"
        );
        assert!(Format::Csv.decode(b"").unwrap().is_empty());
    }

    #[test]
    fn csv_skips_malformed_records() {
        let input = "type,amount,date,category,description\n\
                     -1,12.5,2024-04-02,Food,lunch\n\
                     x,1.00,2024-04-02,Food,bad type\n\
                     1,abc,2024-04-02,Salary,bad amount\n\
                     1,3.00,02/04/2024,Salary,bad date\n\
                     1,3.00\n\
                     1,99.999,2024-04-05,Salary,\n";
        let rows = Format::Csv.decode(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, Money::from_cents(1250));
        assert_eq!(rows[0].description, "lunch");
        assert_eq!(rows[1].amount, Money::from_cents(10000));
        assert_eq!(rows[1].description, "");
    }

    #[test]
    fn json_uses_type_key_and_string_amounts() {
        let bytes = Format::Json.encode(&[row(1, 5, 9, "Gift")]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value[0]["type"], 1);
        assert_eq!(value[0]["amount"], "0.05");
        assert_eq!(value[0]["date"], "2024-04-09");
        assert!(Format::Json.decode(b"[{\"type\": 1}]").is_err());
    }

    #[test]
    fn yaml_reads_back_and_rejects_garbage() {
        let rows = vec![row(-1, 700, 1, "Taxi"), row(1, 99, 30, "Refund")];
        let bytes = Format::Yaml.encode(&rows).unwrap();
        assert_eq!(Format::Yaml.decode(&bytes).unwrap(), rows);
        assert!(Format::Yaml.decode(b"- type: [oops").is_err());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("out/ops.CSV")), Some(Format::Csv));
        assert_eq!(Format::from_path(Path::new("ops.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("ops.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("ops.txt")), None);
        assert_eq!(Format::from_path(Path::new("ops")), None);
    }

    #[test]
    fn row_kind_must_be_a_sign() {
        assert_eq!(row(1, 1, 1, "a").kind().unwrap(), Kind::Income);
        assert!(row(0, 1, 1, "a").kind().is_err());
    }
}
