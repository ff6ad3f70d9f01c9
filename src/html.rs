use crate::report::AnalysisReport;

const DARK_VARS: &str = ":root{--bg:#0a0e13;--fg:#ffffff;--muted:#c0c4cc;--card:#0d131a;--border:#243041;--accent:#3b82f6;--hot:#3a3410;--hot-fg:#fff7c2;--stripe:#0b0f14;--head:#0c1118}";
const LIGHT_VARS: &str = ":root{--bg:#f7fafc;--fg:#111827;--muted:#6b7280;--card:#ffffff;--border:#e5e7eb;--accent:#2563eb;--hot:#ffffcc;--hot-fg:#111827;--stripe:#fbfdff;--head:#f3f4f6}";
const BASE_CSS: &str = "body{margin:0;background:var(--bg);color:var(--fg);font-family:Segoe UI,system-ui,-apple-system,Arial,sans-serif} .container{max-width:1400px;margin:0 auto;padding:24px} .title{font-size:20px;font-weight:600} .sub{color:var(--muted);font-size:13px} .grid{display:grid;grid-template-columns:repeat(4,minmax(0,1fr));gap:12px;margin-top:16px} .card{background:var(--card);border:1px solid var(--border);border-radius:10px;padding:14px} .label{color:var(--muted);font-size:12px} .value{font-size:22px;font-weight:700} .section{margin-top:18px} .section h3{margin:0 0 10px 0;font-size:16px} .table{width:100%;border-collapse:separate;border-spacing:0;background:var(--card);border:1px solid var(--border);border-radius:10px;overflow:hidden;font-size:13px} .table th{position:sticky;top:0;background:var(--head);text-align:left;padding:8px;border-bottom:1px solid var(--border)} .table td{padding:8px;border-bottom:1px solid var(--border);vertical-align:top} .table tr:nth-child(odd) td{background:var(--stripe)} .table tr.hot td{background:var(--hot);color:var(--hot-fg)} .table tr.group-start td{border-top:2px solid var(--accent)} .pill{display:inline-block;padding:4px 10px;border-radius:999px;border:1px solid var(--border);font-size:12px;margin:4px 6px 0 0} .footer{margin-top:22px;color:var(--muted);font-size:12px} @media (max-width:900px){.grid{grid-template-columns:repeat(2,minmax(0,1fr))}}";

/// Static report page. Rows whose `duplicate_count` exceeds `highlight_above`
/// get the `hot` class.
pub fn render_html(rep: &AnalysisReport, theme: crate::Theme, highlight_above: usize, top: usize) -> String {
    let mut s = String::new();
    s.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>Repeat-Repair Report</title><style>");
    match theme {
        crate::Theme::Dark => s.push_str(DARK_VARS),
        crate::Theme::Light => s.push_str(LIGHT_VARS),
    }
    s.push_str(BASE_CSS);
    s.push_str("</style></head><body><div class=\"container\">");
    s.push_str("<div class=\"title\">Repeat-Repair Report</div>");
    s.push_str(&format!("<div class=\"sub\">{} → {} · {} · minimum {} receipts</div>", rep.start, rep.end, rep.date_field.label(), rep.min_duplicates));
    if !rep.sources.is_empty() {
        s.push_str("<div>");
        for src in &rep.sources { s.push_str(&format!("<span class=\"pill\">{}</span>", html_escape(src))); }
        s.push_str("</div>");
    }
    s.push_str("<div class=\"grid\">");
    for (label, v) in [("Input Records", rep.counts.input), ("After Preprocessing", rep.counts.after_preprocess), ("In Window", rep.counts.after_date_filter), ("Repeat Groups", rep.counts.output_groups)] {
        s.push_str(&format!("<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>", label, v));
    }
    s.push_str("</div>");
    let largest = rep.largest_groups(top);
    if !largest.is_empty() {
        s.push_str("<div class=\"section\"><h3>Largest Groups</h3><table class=\"table\"><thead><tr><th>Group</th><th>Receipts</th><th>Address</th><th>Model</th><th>Serial</th><th>First</th><th>Last</th></tr></thead><tbody>");
        for g in largest {
            let first = g.first_date.map(|d| d.to_string()).unwrap_or_default();
            let last = g.last_date.map(|d| d.to_string()).unwrap_or_default();
            s.push_str(&format!("<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>", g.group_id, g.size, html_escape(&g.key.address1), html_escape(&g.key.model_code), html_escape(&g.key.serial_number), first, last));
        }
        s.push_str("</tbody></table></div>");
    }
    s.push_str("<div class=\"section\"><h3>Records</h3>");
    if rep.table.rows.is_empty() {
        s.push_str("<div class=\"card sub\">No repeat repairs in this window.</div>");
    } else {
        s.push_str("<table class=\"table\"><thead><tr>");
        for h in rep.table.header() { s.push_str(&format!("<th>{}</th>", html_escape(&h))); }
        s.push_str("</tr></thead><tbody>");
        let mut prev_group = 0;
        for row in &rep.table.rows {
            let mut classes: Vec<&str> = Vec::new();
            if row.duplicate_count > highlight_above { classes.push("hot"); }
            if prev_group != 0 && row.group_id != prev_group { classes.push("group-start"); }
            prev_group = row.group_id;
            if classes.is_empty() { s.push_str("<tr>"); } else { s.push_str(&format!("<tr class=\"{}\">", classes.join(" "))); }
            for c in row.cells() { s.push_str(&format!("<td>{}</td>", html_escape(&c))); }
            s.push_str("</tr>");
        }
        s.push_str("</tbody></table>");
    }
    s.push_str("</div>");
    s.push_str(&format!("<div class=\"footer\">Generated by refail at {}</div></div></body></html>", rep.generated_at.format("%Y-%m-%d %H:%M UTC")));
    s
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}
