use crate::report::AnalysisReport;

fn md_cell(s: &str) -> String { s.replace('|', "\\|").replace('\n', " ") }

pub fn render_markdown(rep: &AnalysisReport, top: usize) -> String {
    let mut s = String::new();
    s.push_str("# Repeat-Repair Report\n\n");
    s.push_str(&format!("Window: {} → {} ({})\n\n", rep.start, rep.end, rep.date_field.label()));
    if !rep.sources.is_empty() { s.push_str(&format!("Sources: {}\n\n", rep.sources.join(", "))); }
    s.push_str(&format!("Minimum duplicates: {}\n\n", rep.min_duplicates));

    s.push_str("## Summary\n");
    s.push_str(&format!("- Input records: {}\n", rep.counts.input));
    s.push_str(&format!("- After preprocessing: {}\n", rep.counts.after_preprocess));
    s.push_str(&format!("- In date window: {}\n", rep.counts.after_date_filter));
    s.push_str(&format!("- Repeat groups: {} ({} records)\n", rep.counts.output_groups, rep.counts.output_records));
    s.push('\n');

    s.push_str("## Largest Groups\n");
    let largest = rep.largest_groups(top);
    if largest.is_empty() { s.push_str("None\n\n"); } else {
        for g in largest {
            let span = match (g.first_date, g.last_date) { (Some(f), Some(l)) => format!(", {} → {}", f, l), _ => String::new() };
            s.push_str(&format!("- #{} {} / {} / {}: {} receipts{}\n", g.group_id, md_cell(&g.key.address1), md_cell(&g.key.model_code), md_cell(&g.key.serial_number), g.size, span));
        }
        s.push('\n');
    }

    if !rep.table.rows.is_empty() {
        s.push_str("## Records\n\n");
        let header = rep.table.header();
        s.push_str(&format!("| {} |\n", header.iter().map(|h| md_cell(h)).collect::<Vec<_>>().join(" | ")));
        s.push_str(&format!("|{}\n", "---|".repeat(header.len())));
        for row in &rep.table.rows {
            s.push_str(&format!("| {} |\n", row.cells().iter().map(|c| md_cell(c)).collect::<Vec<_>>().join(" | ")));
        }
    }
    s
}
