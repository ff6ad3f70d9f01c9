use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::record::{parse_calendar_date, DateField, Record, RecordSet};
use crate::rules::ExclusionRules;

/// What to do with a record whose chosen date is blank or unparsable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    #[default]
    Exclude,
    Reject,
}

/// What to do when the start date is after the end date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    #[default]
    Empty,
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub date_field: DateField,
    pub min_duplicates: usize,
    pub date_policy: DatePolicy,
    pub range_policy: RangePolicy,
    pub rules: ExclusionRules,
}

impl AnalysisParams {
    pub fn new(start: NaiveDate, end: NaiveDate, date_field: DateField, min_duplicates: usize) -> Self {
        Self { start, end, date_field, min_duplicates, date_policy: DatePolicy::default(), range_policy: RangePolicy::default(), rules: ExclusionRules::default() }
    }
}

/// A record tagged with the rank of its identity key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupedRecord {
    pub group_id: usize,
    pub record: Record,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupedRecords {
    pub columns: Vec<String>,
    pub rows: Vec<GroupedRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub duplicate_count: usize,
    pub group_id: usize,
    pub record: Record,
}

impl AnnotatedRecord {
    /// Output cells: `duplicate_count, group_id, <source cells>`.
    pub fn cells(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.record.fields.len() + 2);
        out.push(self.duplicate_count.to_string());
        out.push(self.group_id.to_string());
        out.extend(self.record.fields.iter().cloned());
        out
    }
}

/// Final table of repeat-repair rows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedTable {
    pub columns: Vec<String>,
    pub rows: Vec<AnnotatedRecord>,
}

pub const DUPLICATE_COUNT_COLUMN: &str = "duplicate_count";
pub const GROUP_ID_COLUMN: &str = "group_id";

impl AnnotatedTable {
    pub fn header(&self) -> Vec<String> {
        let mut h = vec![DUPLICATE_COUNT_COLUMN.to_string(), GROUP_ID_COLUMN.to_string()];
        h.extend(self.columns.iter().cloned());
        h
    }

    pub fn group_count(&self) -> usize {
        self.rows.iter().map(|r| r.group_id).max().unwrap_or(0)
    }
}

/// Record counts after each stage of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub input: usize,
    pub after_preprocess: usize,
    pub after_date_filter: usize,
    pub duplicate_records: usize,
    pub duplicate_groups: usize,
    pub output_records: usize,
    pub output_groups: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub table: AnnotatedTable,
    pub counts: StageCounts,
}

/// Drops repeated receipts (first wins), excluded repair results and
/// head-office intake records. Survivors keep input order.
pub fn preprocess(set: &RecordSet, rules: &ExclusionRules) -> RecordSet {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(set.len());
    for r in &set.records {
        if !seen.insert(&r.receipt_id) {
            log::trace!("drop {}: repeated receipt", r.receipt_id);
            continue;
        }
        if rules.is_excluded_result(&r.repair_result) {
            log::trace!("drop {}: repair result {}", r.receipt_id, r.repair_result);
            continue;
        }
        if rules.is_head_office(&r.address1) {
            log::trace!("drop {}: head office intake", r.receipt_id);
            continue;
        }
        out.push(r.clone());
    }
    set.with_records(out)
}

/// Keeps records whose chosen date lies in `[start, end]`.
pub fn filter_date_range(set: &RecordSet, start: NaiveDate, end: NaiveDate, field: DateField, policy: DatePolicy) -> Result<RecordSet, AnalysisError> {
    if start > end {
        log::debug!("empty date range {} > {}", start, end);
        return Ok(set.with_records(Vec::new()));
    }
    let mut out = Vec::new();
    for r in &set.records {
        let text = r.date_text(field);
        let Some(date) = parse_calendar_date(text) else {
            if policy == DatePolicy::Reject {
                return Err(AnalysisError::DataFormat { receipt_id: r.receipt_id.clone(), field: field.label(), value: text.to_string() });
            }
            log::trace!("drop {}: {} '{}' is not a date", r.receipt_id, field.label(), text);
            continue;
        };
        if start <= date && date <= end { out.push(r.clone()); }
    }
    Ok(set.with_records(out))
}

/// Keeps records whose identity key occurs at least twice, sorted by
/// `(address1, model_code, receipt_id)` and numbered by first appearance
/// of each key in that order.
pub fn group_duplicates(set: &RecordSet) -> GroupedRecords {
    let mut sizes: HashMap<(&str, &str, &str), usize> = HashMap::new();
    for r in &set.records { *sizes.entry(r.key_ref()).or_insert(0) += 1; }
    let mut dups: Vec<&Record> = set.records.iter().filter(|r| sizes[&r.key_ref()] >= 2).collect();
    dups.sort_by(|a, b| (&a.address1, &a.model_code, &a.receipt_id).cmp(&(&b.address1, &b.model_code, &b.receipt_id)));
    let mut ranks: HashMap<(&str, &str, &str), usize> = HashMap::new();
    let rows = dups
        .into_iter()
        .map(|r| {
            let next = ranks.len() + 1;
            let group_id = *ranks.entry(r.key_ref()).or_insert(next);
            GroupedRecord { group_id, record: r.clone() }
        })
        .collect();
    GroupedRecords { columns: set.columns.clone(), rows }
}

/// Attaches group sizes and keeps rows whose group has at least
/// `min_duplicates` members. Surviving groups are renumbered `1..K` in
/// their existing order.
pub fn annotate(grouped: &GroupedRecords, min_duplicates: usize) -> AnnotatedTable {
    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for g in &grouped.rows { *sizes.entry(g.group_id).or_insert(0) += 1; }
    let mut renumber: HashMap<usize, usize> = HashMap::new();
    let mut rows = Vec::new();
    for g in &grouped.rows {
        let size = sizes[&g.group_id];
        if size < min_duplicates { continue; }
        let next = renumber.len() + 1;
        let group_id = *renumber.entry(g.group_id).or_insert(next);
        rows.push(AnnotatedRecord { duplicate_count: size, group_id, record: g.record.clone() });
    }
    AnnotatedTable { columns: grouped.columns.clone(), rows }
}

/// Runs the four stages in order.
pub fn analyze(set: &RecordSet, params: &AnalysisParams) -> Result<Analysis, AnalysisError> {
    if params.range_policy == RangePolicy::Reject && params.start > params.end {
        return Err(AnalysisError::InvalidRange { start: params.start, end: params.end });
    }
    let pre = preprocess(set, &params.rules);
    log::debug!("preprocess: {} -> {} records", set.len(), pre.len());
    let ranged = filter_date_range(&pre, params.start, params.end, params.date_field, params.date_policy)?;
    log::debug!("date filter ({} {}..={}): {} -> {} records", params.date_field.label(), params.start, params.end, pre.len(), ranged.len());
    let grouped = group_duplicates(&ranged);
    let duplicate_groups = grouped.rows.iter().map(|g| g.group_id).max().unwrap_or(0);
    log::debug!("grouping: {} records in {} groups", grouped.rows.len(), duplicate_groups);
    let table = annotate(&grouped, params.min_duplicates);
    log::debug!("threshold {}: {} records kept", params.min_duplicates, table.rows.len());
    let counts = StageCounts {
        input: set.len(),
        after_preprocess: pre.len(),
        after_date_filter: ranged.len(),
        duplicate_records: grouped.rows.len(),
        duplicate_groups,
        output_records: table.rows.len(),
        output_groups: table.group_count(),
    };
    Ok(Analysis { table, counts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::HEAD_OFFICE_ADDRESS;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

    fn rec(id: &str, addr: &str, model: &str, serial: &str, received: &str) -> Record {
        Record::new(id, "COMPLETED", addr, model, serial, received, received)
    }

    fn params(min: usize) -> AnalysisParams { AnalysisParams::new(d(2024, 1, 1), d(2024, 12, 31), DateField::Received, min) }

    fn ids(t: &AnnotatedTable) -> Vec<&str> { t.rows.iter().map(|r| r.record.receipt_id.as_str()).collect() }

    fn scenario_b() -> RecordSet {
        RecordSet::from_records(vec![
            rec("R3", "Seoul-A", "X1", "S001", "2024-02-01"),
            rec("R1", "Seoul-A", "X1", "S001", "2024-02-02"),
            rec("R9", "Busan-B", "Y2", "S777", "2024-02-03"),
            rec("R2", "Seoul-A", "X1", "S001", "2024-02-04"),
        ])
    }

    #[test]
    fn scenario_a_pair_shares_group() {
        let set = RecordSet::from_records(vec![rec("R1", "Seoul-A", "X1", "S001", "2024-03-01"), rec("R2", "Seoul-A", "X1", "S001", "2024-03-09")]);
        let out = analyze(&set, &params(2)).unwrap().table;
        assert_eq!(ids(&out), vec!["R1", "R2"]);
        assert!(out.rows.iter().all(|r| r.duplicate_count == 2 && r.group_id == 1));
    }

    #[test]
    fn scenario_b_singleton_key_dropped() {
        let out = analyze(&scenario_b(), &params(2)).unwrap();
        assert_eq!(ids(&out.table), vec!["R1", "R2", "R3"]);
        assert!(out.table.rows.iter().all(|r| r.duplicate_count == 3 && r.group_id == 1));
        assert_eq!(out.counts.duplicate_groups, 1);
        assert_eq!(out.counts.output_groups, 1);
    }

    #[test]
    fn scenario_c_threshold() {
        assert_eq!(analyze(&scenario_b(), &params(3)).unwrap().table.rows.len(), 3);
        assert!(analyze(&scenario_b(), &params(4)).unwrap().table.rows.is_empty());
    }

    #[test]
    fn scenario_d_cancelled_record_breaks_pair() {
        let mut cancelled = rec("R2", "Seoul-A", "X1", "S001", "2024-03-09");
        cancelled.repair_result = "CANCELLED".to_string();
        let set = RecordSet::from_records(vec![rec("R1", "Seoul-A", "X1", "S001", "2024-03-01"), cancelled]);
        let out = analyze(&set, &params(2)).unwrap();
        assert_eq!(out.counts.after_preprocess, 1);
        assert!(out.table.rows.is_empty());
    }

    #[test]
    fn scenario_e_reversed_range_is_empty() {
        let mut p = params(2);
        p.start = d(2024, 12, 31);
        p.end = d(2024, 1, 1);
        let out = analyze(&scenario_b(), &p).unwrap();
        assert!(out.table.rows.is_empty());
        assert_eq!(out.counts.after_date_filter, 0);
    }

    #[test]
    fn reversed_range_rejected_under_strict_policy() {
        let mut p = params(2);
        p.start = d(2024, 12, 31);
        p.end = d(2024, 1, 1);
        p.range_policy = RangePolicy::Reject;
        assert!(matches!(analyze(&scenario_b(), &p), Err(AnalysisError::InvalidRange { .. })));
    }

    #[test]
    fn preprocess_keeps_first_receipt_and_drops_head_office() {
        let later = rec("R1", "Seoul-A", "X1", "S999", "2024-03-02");
        let mut sold = rec("R4", "Seoul-A", "X1", "S001", "2024-03-02");
        sold.repair_result = "MATERIAL_SOLD".to_string();
        let set = RecordSet::from_records(vec![
            rec("R1", "Seoul-A", "X1", "S001", "2024-03-01"),
            later,
            rec("R2", HEAD_OFFICE_ADDRESS, "X1", "S001", "2024-03-01"),
            sold,
            rec("R3", "Seoul-A", "X1", "S002", "2024-03-05"),
        ]);
        let out = preprocess(&set, &ExclusionRules::default());
        let kept: Vec<_> = out.records.iter().map(|r| (r.receipt_id.as_str(), r.serial_number.as_str())).collect();
        assert_eq!(kept, vec![("R1", "S001"), ("R3", "S002")]);
        let unique: HashSet<_> = out.records.iter().map(|r| &r.receipt_id).collect();
        assert_eq!(unique.len(), out.len());
    }

    #[test]
    fn repeated_receipt_is_deduplicated_before_exclusion() {
        let mut first = rec("R1", "Seoul-A", "X1", "S001", "2024-03-01");
        first.repair_result = "CANCELLED".to_string();
        let set = RecordSet::from_records(vec![first, rec("R1", "Seoul-A", "X1", "S001", "2024-03-02")]);
        assert!(preprocess(&set, &ExclusionRules::default()).is_empty());
    }

    #[test]
    fn date_filter_is_inclusive_on_calendar_dates() {
        let set = RecordSet::from_records(vec![
            rec("R1", "A", "M", "S", "2024-01-01 00:00:00"),
            rec("R2", "A", "M", "S", "2024-01-31 23:59:59"),
            rec("R3", "A", "M", "S", "2024-02-01"),
            rec("R4", "A", "M", "S", "2023-12-31 23:59"),
        ]);
        let out = filter_date_range(&set, d(2024, 1, 1), d(2024, 1, 31), DateField::Received, DatePolicy::Exclude).unwrap();
        let kept: Vec<_> = out.records.iter().map(|r| r.receipt_id.as_str()).collect();
        assert_eq!(kept, vec!["R1", "R2"]);
    }

    #[test]
    fn date_filter_uses_selected_field() {
        let set = RecordSet::from_records(vec![Record::new("R1", "COMPLETED", "A", "M", "S", "2024-01-15", "2024-02-15")]);
        let by_received = filter_date_range(&set, d(2024, 2, 1), d(2024, 2, 28), DateField::Received, DatePolicy::Exclude).unwrap();
        let by_repaired = filter_date_range(&set, d(2024, 2, 1), d(2024, 2, 28), DateField::Repaired, DatePolicy::Exclude).unwrap();
        assert!(by_received.is_empty());
        assert_eq!(by_repaired.len(), 1);
    }

    #[test]
    fn missing_or_bad_dates_excluded_or_rejected() {
        let set = RecordSet::from_records(vec![
            rec("R1", "A", "M", "S", ""),
            rec("R2", "A", "M", "S", "n/a"),
            rec("R3", "A", "M", "S", "2024-05-05"),
        ]);
        let out = filter_date_range(&set, d(2024, 1, 1), d(2024, 12, 31), DateField::Received, DatePolicy::Exclude).unwrap();
        assert_eq!(out.len(), 1);
        let err = filter_date_range(&set, d(2024, 1, 1), d(2024, 12, 31), DateField::Received, DatePolicy::Reject).unwrap_err();
        match err {
            AnalysisError::DataFormat { receipt_id, field, value } => {
                assert_eq!(receipt_id, "R1");
                assert_eq!(field, "received_at");
                assert_eq!(value, "");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn group_ids_follow_first_appearance_in_sorted_order() {
        let set = RecordSet::from_records(vec![
            rec("R4", "Seoul-A", "X1", "S002", "2024-03-01"),
            rec("R1", "Seoul-A", "X1", "S001", "2024-03-01"),
            rec("R2", "Seoul-A", "X1", "S002", "2024-03-01"),
            rec("R3", "Seoul-A", "X1", "S001", "2024-03-01"),
            rec("R0", "Busan-B", "Z9", "S500", "2024-03-01"),
            rec("R5", "Busan-B", "Z9", "S500", "2024-03-01"),
        ]);
        let grouped = group_duplicates(&set);
        let got: Vec<_> = grouped.rows.iter().map(|g| (g.record.receipt_id.as_str(), g.group_id)).collect();
        assert_eq!(got, vec![("R0", 1), ("R5", 1), ("R1", 2), ("R2", 3), ("R3", 2), ("R4", 3)]);
    }

    #[test]
    fn threshold_renumbers_surviving_groups_densely() {
        let mut records = vec![
            rec("R1", "A", "M", "S1", "2024-03-01"),
            rec("R2", "A", "M", "S1", "2024-03-01"),
        ];
        for i in 3..6 { records.push(rec(&format!("R{i}"), "B", "M", "S2", "2024-03-01")); }
        let out = analyze(&RecordSet::from_records(records), &params(3)).unwrap();
        assert_eq!(ids(&out.table), vec!["R3", "R4", "R5"]);
        assert!(out.table.rows.iter().all(|r| r.group_id == 1));
        assert_eq!(out.counts.duplicate_groups, 2);
        assert_eq!(out.counts.output_groups, 1);
    }

    #[test]
    fn output_invariants_hold() {
        let mut records = Vec::new();
        let addrs = ["Daegu", "Seoul-A", "Busan-B"];
        for i in 0..40 {
            let addr = addrs[i % 3];
            let serial = format!("S{}", i % 7);
            let day = 1 + (i % 28) as u32;
            records.push(rec(&format!("R{:03}", 40 - i), addr, if i % 2 == 0 { "X1" } else { "Y2" }, &serial, &format!("2024-04-{day:02}")));
        }
        records.push(rec("R001", "Daegu", "X1", "S0", "2024-04-01"));
        let set = RecordSet::from_records(records);
        let p = params(2);
        let first = analyze(&set, &p).unwrap();
        assert_eq!(first, analyze(&set, &p).unwrap());
        let survivors = filter_date_range(&preprocess(&set, &p.rules), p.start, p.end, p.date_field, p.date_policy).unwrap();
        for row in &first.table.rows {
            let n = survivors.records.iter().filter(|r| r.key_ref() == row.record.key_ref()).count();
            assert_eq!(row.duplicate_count, n);
            assert!(row.duplicate_count >= p.min_duplicates);
        }
        let mut group_ids: Vec<usize> = first.table.rows.iter().map(|r| r.group_id).collect();
        group_ids.sort_unstable();
        group_ids.dedup();
        let keys: HashSet<_> = first.table.rows.iter().map(|r| r.record.identity_key()).collect();
        assert_eq!(group_ids, (1..=keys.len()).collect::<Vec<_>>());
        let sort_keys: Vec<_> = first.table.rows.iter().map(|r| (&r.record.address1, &r.record.model_code, &r.record.receipt_id)).collect();
        assert!(sort_keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn annotated_cells_lead_with_count_and_group() {
        let out = analyze(&scenario_b(), &params(2)).unwrap().table;
        assert_eq!(&out.header()[..3], &["duplicate_count", "group_id", "receipt_id"]);
        assert_eq!(&out.rows[0].cells()[..3], &["3", "1", "R1"]);
    }
}
