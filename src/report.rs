use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::{Analysis, AnalysisParams, AnnotatedTable, StageCounts};
use crate::record::{parse_calendar_date, DateField, IdentityKey};

/// One repeat-repair group as listed in summaries.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupSummary {
    pub group_id: usize,
    pub size: usize,
    pub key: IdentityKey,
    pub receipt_ids: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub date_field: DateField,
    pub min_duplicates: usize,
    pub counts: StageCounts,
    pub groups: Vec<GroupSummary>,
    pub table: AnnotatedTable,
}

impl AnalysisReport {
    pub fn new(analysis: Analysis, params: &AnalysisParams, sources: Vec<String>) -> Self {
        let groups = summarize_groups(&analysis.table, params.date_field);
        Self {
            generated_at: Utc::now(),
            sources,
            start: params.start,
            end: params.end,
            date_field: params.date_field,
            min_duplicates: params.min_duplicates,
            counts: analysis.counts,
            groups,
            table: analysis.table,
        }
    }

    /// Groups ordered by size, largest first; ties keep group order.
    pub fn largest_groups(&self, top: usize) -> Vec<&GroupSummary> {
        let mut v: Vec<&GroupSummary> = self.groups.iter().collect();
        v.sort_by(|a, b| b.size.cmp(&a.size));
        v.truncate(top);
        v
    }
}

/// Collapses annotated rows into one summary per group id.
pub fn summarize_groups(table: &AnnotatedTable, field: DateField) -> Vec<GroupSummary> {
    let mut out: Vec<GroupSummary> = Vec::new();
    for row in &table.rows {
        let date = parse_calendar_date(row.record.date_text(field));
        let idx = match out.iter().position(|g| g.group_id == row.group_id) {
            Some(i) => i,
            None => {
                out.push(GroupSummary { group_id: row.group_id, size: row.duplicate_count, key: row.record.identity_key(), receipt_ids: vec![], first_date: None, last_date: None });
                out.len() - 1
            }
        };
        let g = &mut out[idx];
        g.receipt_ids.push(row.record.receipt_id.clone());
        if let Some(d) = date {
            g.first_date = Some(g.first_date.map_or(d, |f| f.min(d)));
            g.last_date = Some(g.last_date.map_or(d, |l| l.max(d)));
        }
    }
    out.sort_by_key(|g| g.group_id);
    out
}
