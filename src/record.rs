use chrono::{DateTime, NaiveDate, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

/// Which record date the range filter compares against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    /// Date the service request was received.
    Received,
    /// Date the repair was completed.
    Repaired,
}

impl DateField {
    pub fn label(self) -> &'static str {
        match self { DateField::Received => "received_at", DateField::Repaired => "repaired_at" }
    }
}

/// Header names of the columns the analysis reads.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnMap {
    pub receipt_id: String,
    pub repair_result: String,
    pub address1: String,
    pub model_code: String,
    pub serial_number: String,
    pub received_at: String,
    pub repaired_at: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            receipt_id: "receipt_id".to_string(),
            repair_result: "repair_result".to_string(),
            address1: "address1".to_string(),
            model_code: "model_code".to_string(),
            serial_number: "serial_number".to_string(),
            received_at: "received_at".to_string(),
            repaired_at: "repaired_at".to_string(),
        }
    }
}

impl ColumnMap {
    /// Required header names in canonical order.
    pub fn required(&self) -> [&str; 7] {
        [
            &self.receipt_id,
            &self.repair_result,
            &self.address1,
            &self.model_code,
            &self.serial_number,
            &self.received_at,
            &self.repaired_at,
        ]
    }
}

/// Triple identifying the same physical unit at the same location.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    pub address1: String,
    pub model_code: String,
    pub serial_number: String,
}

/// One repair-service entry.
///
/// The named fields are copies of the required cells; `fields` keeps every
/// source cell in source column order so exports can reproduce the row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub receipt_id: String,
    pub repair_result: String,
    pub address1: String,
    pub model_code: String,
    pub serial_number: String,
    pub received_at: String,
    pub repaired_at: String,
    pub fields: Vec<String>,
}

impl Record {
    /// Builds a record laid out in the default column order.
    pub fn new(receipt_id: &str, repair_result: &str, address1: &str, model_code: &str, serial_number: &str, received_at: &str, repaired_at: &str) -> Self {
        let fields = [receipt_id, repair_result, address1, model_code, serial_number, received_at, repaired_at]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self {
            receipt_id: receipt_id.to_string(),
            repair_result: repair_result.to_string(),
            address1: address1.to_string(),
            model_code: model_code.to_string(),
            serial_number: serial_number.to_string(),
            received_at: received_at.to_string(),
            repaired_at: repaired_at.to_string(),
            fields,
        }
    }

    pub fn date_text(&self, field: DateField) -> &str {
        match field { DateField::Received => &self.received_at, DateField::Repaired => &self.repaired_at }
    }

    pub fn key_ref(&self) -> (&str, &str, &str) {
        (&self.address1, &self.model_code, &self.serial_number)
    }

    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey { address1: self.address1.clone(), model_code: self.model_code.clone(), serial_number: self.serial_number.clone() }
    }
}

/// Ordered records plus the source column names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Wraps records built with [`Record::new`] under the default headers.
    pub fn from_records(records: Vec<Record>) -> Self {
        let columns = ColumnMap::default().required().iter().map(|s| s.to_string()).collect();
        Self { columns, records }
    }

    /// Builds a set from a header row and raw rows, resolving required
    /// columns through `map`. Rows shorter than the header are padded.
    pub fn from_table(source_name: &str, columns: Vec<String>, rows: Vec<Vec<String>>, map: &ColumnMap) -> Result<Self, AnalysisError> {
        let mut idx = [0usize; 7];
        for (slot, name) in idx.iter_mut().zip(map.required()) {
            *slot = columns.iter().position(|c| c.trim() == name).ok_or_else(|| AnalysisError::Schema {
                column: name.to_string(),
                source_name: source_name.to_string(),
            })?;
        }
        let mut records = Vec::with_capacity(rows.len());
        for (n, mut cells) in rows.into_iter().enumerate() {
            if cells.len() > columns.len() {
                return Err(AnalysisError::RaggedRow { source_name: source_name.to_string(), row: n as u64 + 2, found: cells.len(), expected: columns.len() });
            }
            cells.resize(columns.len(), String::new());
            let cell = |i: usize| cells[idx[i]].clone();
            records.push(Record {
                receipt_id: cell(0),
                repair_result: cell(1),
                address1: cell(2),
                model_code: cell(3),
                serial_number: cell(4),
                received_at: cell(5),
                repaired_at: cell(6),
                fields: cells.clone(),
            });
        }
        Ok(Self { columns, records })
    }

    /// Same columns, new records.
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self { columns: self.columns.clone(), records }
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// Reduces a date or date-time cell to its calendar date.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() { return None; }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) { return Some(dt.date_naive()); }
    let (date_part, time_part) = match s.find(['T', ' ']) {
        Some(pos) => (&s[..pos], Some(s[pos + 1..].trim())),
        None => (s, None),
    };
    if let Some(t) = time_part
        && !TIME_FORMATS.iter().any(|f| NaiveTime::parse_from_str(t, f).is_ok()) { return None; }
    DATE_FORMATS.iter().find_map(|f| NaiveDate::parse_from_str(date_part, f).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

    #[test]
    fn parses_plain_and_timestamped_dates() {
        assert_eq!(parse_calendar_date("2024-03-05"), Some(d(2024, 3, 5)));
        assert_eq!(parse_calendar_date("2024/03/05"), Some(d(2024, 3, 5)));
        assert_eq!(parse_calendar_date("2024.03.05"), Some(d(2024, 3, 5)));
        assert_eq!(parse_calendar_date("20240305"), Some(d(2024, 3, 5)));
        assert_eq!(parse_calendar_date("2024-03-05 17:42:10"), Some(d(2024, 3, 5)));
        assert_eq!(parse_calendar_date("2024-03-05T08:00"), Some(d(2024, 3, 5)));
        assert_eq!(parse_calendar_date("2024-03-05T23:30:00+09:00"), Some(d(2024, 3, 5)));
    }

    #[test]
    fn rejects_garbage_and_blank() {
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("   "), None);
        assert_eq!(parse_calendar_date("pending"), None);
        assert_eq!(parse_calendar_date("2024-02-30"), None);
        assert_eq!(parse_calendar_date("2024-03-05 later"), None);
    }

    #[test]
    fn from_table_reports_missing_column() {
        let cols: Vec<String> = ["receipt_id", "repair_result", "address1", "model_code", "received_at", "repaired_at"].iter().map(|s| s.to_string()).collect();
        let err = RecordSet::from_table("in.csv", cols, vec![], &ColumnMap::default()).unwrap_err();
        match err {
            AnalysisError::Schema { column, source_name } => {
                assert_eq!(column, "serial_number");
                assert_eq!(source_name, "in.csv");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn from_table_keeps_extra_columns_in_order() {
        let cols: Vec<String> = ["note", "serial_number", "model_code", "address1", "repair_result", "receipt_id", "repaired_at", "received_at"].iter().map(|s| s.to_string()).collect();
        let rows = vec![vec!["n1", "S1", "X1", "Seoul-A", "DONE", "R1", "2024-01-02", "2024-01-01"].into_iter().map(String::from).collect()];
        let set = RecordSet::from_table("in.csv", cols.clone(), rows, &ColumnMap::default()).unwrap();
        let r = &set.records[0];
        assert_eq!(set.columns, cols);
        assert_eq!(r.receipt_id, "R1");
        assert_eq!(r.serial_number, "S1");
        assert_eq!(r.received_at, "2024-01-01");
        assert_eq!(r.fields[0], "n1");
    }

    #[test]
    fn from_table_pads_short_rows_and_rejects_long_ones() {
        let cols: Vec<String> = ColumnMap::default().required().iter().map(|s| s.to_string()).collect();
        let short = vec![vec!["R1".to_string(), "DONE".to_string()]];
        let set = RecordSet::from_table("a.csv", cols.clone(), short, &ColumnMap::default()).unwrap();
        assert_eq!(set.records[0].fields.len(), 7);
        assert_eq!(set.records[0].repaired_at, "");
        let long = vec![vec![String::new(); 8]];
        assert!(matches!(RecordSet::from_table("a.csv", cols, long, &ColumnMap::default()), Err(AnalysisError::RaggedRow { row: 2, .. })));
    }

    #[test]
    fn renamed_columns_resolve() {
        let map = ColumnMap { serial_number: "Serial No.".to_string(), ..ColumnMap::default() };
        let cols: Vec<String> = map.required().iter().map(|s| s.to_string()).collect();
        let rows = vec![vec!["R1", "DONE", "A", "M", "SN9", "2024-01-01", ""].into_iter().map(String::from).collect()];
        let set = RecordSet::from_table("b.csv", cols, rows, &map).unwrap();
        assert_eq!(set.records[0].serial_number, "SN9");
    }
}
