use std::io::Write;

use crate::pipeline::{DUPLICATE_COUNT_COLUMN, GROUP_ID_COLUMN};
use crate::report::AnalysisReport;

pub fn write_csv(path: &str, rep: &AnalysisReport) -> Result<(), std::io::Error> {
    write_delimited(path, rep, b',')
}

pub fn write_tsv(path: &str, rep: &AnalysisReport) -> Result<(), std::io::Error> {
    write_delimited(path, rep, b'\t')
}

fn write_delimited(path: &str, rep: &AnalysisReport, delimiter: u8) -> Result<(), std::io::Error> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    wtr.write_record(rep.table.header())?;
    for row in &rep.table.rows {
        wtr.write_record(row.cells())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Object keys for NDJSON rows. Source columns that repeat a key already
/// taken get a numeric suffix (`group_id_2`, `memo_2`).
fn ndjson_keys(columns: &[String]) -> Vec<String> {
    let mut taken: Vec<String> = vec![DUPLICATE_COUNT_COLUMN.to_string(), GROUP_ID_COLUMN.to_string()];
    for col in columns {
        let mut key = col.clone();
        let mut n = 2;
        while taken.contains(&key) {
            key = format!("{}_{}", col, n);
            n += 1;
        }
        if key != *col { log::warn!("NDJSON: column '{}' written as '{}'", col, key); }
        taken.push(key);
    }
    taken.split_off(2)
}

/// One JSON object per output row: `duplicate_count`, `group_id`, then the
/// source columns in file order.
pub fn write_ndjson(path: &str, rep: &AnalysisReport) -> Result<(), std::io::Error> {
    let keys = ndjson_keys(&rep.table.columns);
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for row in &rep.table.rows {
        let mut obj = serde_json::Map::new();
        obj.insert(DUPLICATE_COUNT_COLUMN.to_string(), serde_json::json!(row.duplicate_count));
        obj.insert(GROUP_ID_COLUMN.to_string(), serde_json::json!(row.group_id));
        for (key, val) in keys.iter().zip(&row.record.fields) {
            obj.insert(key.clone(), serde_json::Value::String(val.clone()));
        }
        writeln!(file, "{}", serde_json::Value::Object(obj))?;
    }
    file.flush()
}

pub fn write_json(path: &str, rep: &AnalysisReport) -> Result<(), std::io::Error> {
    let data = serde_json::to_vec_pretty(rep)?;
    std::fs::write(path, data)
}
