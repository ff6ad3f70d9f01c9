use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use anyhow::Context;
use chrono::{Local, Months, NaiveDate};
use clap::{Parser, ValueEnum, ColorChoice, ArgAction, CommandFactory};
use clap_complete::Shell;
use comfy_table::{Table, ContentArrangement, Cell};
use serde::{Deserialize, Serialize};
use is_terminal::IsTerminal;
mod errors;
mod export;
mod html;
mod loader;
mod markdown;
mod pipeline;
mod record;
mod report;
mod rules;

use crate::pipeline::{AnalysisParams, DatePolicy, RangePolicy};
use crate::record::{ColumnMap, DateField};
use crate::report::AnalysisReport;

static ENABLE_COLOR: OnceLock<bool> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFmt { Text, Json }

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TextFormat { Lines, Table }

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Theme { Dark, Light }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LogLevel { Error, Warn, Info, Debug, Trace }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LogFormat { Text, Json }

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Delimiter { Comma, Tab }

impl Delimiter {
    fn byte(self) -> u8 { match self { Delimiter::Comma => b',', Delimiter::Tab => b'\t' } }
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    record::parse_calendar_date(s).ok_or_else(|| format!("'{}' is not a date (expected YYYY-MM-DD)", s))
}

#[derive(Parser, Debug)]
#[command(
    name = "refail",
    about = "Repeat-repair (re-failure) analysis for product service records",
    long_about = "Finds units repaired more than once at the same location: drops cancelled and head-office receipts, keeps a date window, groups receipts by address, model and serial number, and reports every group with at least N receipts.",
    after_long_help = "Examples:\n  refail -i receipts.csv\n  refail -i receipts.csv --since 2024-01-01 --until 2024-03-31 --date-field repaired -d 3\n  refail -i exports/ --input-glob '2024-*.csv' --text-format table\n  refail -i receipts.tsv --csv-path repeats.csv --html repeats.html\n  refail -i receipts.csv --export-dir out --no-open",
    color = ColorChoice::Auto
)]
struct Args {
    /// Record file (CSV/TSV) or a directory of them
    #[arg(long, short = 'i')]
    input: Option<String>,
    /// Glob selecting files when --input is a directory
    #[arg(long, short = 'g')]
    input_glob: Option<String>,
    #[arg(long, default_value_t = false)]
    recursive: bool,
    #[arg(long, value_enum)]
    delimiter: Option<Delimiter>,
    /// First day of the window (inclusive); default three months before today
    #[arg(long, value_parser = parse_date_arg)]
    since: Option<NaiveDate>,
    /// Last day of the window (inclusive); default today
    #[arg(long, value_parser = parse_date_arg)]
    until: Option<NaiveDate>,
    #[arg(long, value_enum, default_value = "received")]
    date_field: DateField,
    /// Minimum receipts per unit to report
    #[arg(long, short = 'd', default_value_t = 2, value_parser = clap::value_parser!(u32).range(2..=100))]
    min_duplicates: u32,
    /// Fail on blank or unparsable dates instead of skipping the record
    #[arg(long, default_value_t = false)]
    strict_dates: bool,
    /// Fail when --since is after --until instead of reporting nothing
    #[arg(long, default_value_t = false)]
    strict_range: bool,
    /// Path to JSON rules registry (default ./rules.json)
    #[arg(long)]
    rules: Option<String>,
    #[arg(long, short = 'o', value_enum, default_value = "text")]
    output: OutputFmt,
    #[arg(long, value_enum, default_value = "lines")]
    text_format: TextFormat,
    /// Highlight rows whose duplicate_count is above this value
    #[arg(long, default_value_t = 2)]
    highlight_above: usize,
    /// Number of groups listed in the summary
    #[arg(long, short = 'n', default_value_t = 20)]
    top: usize,
    #[arg(long)]
    cell_width: Option<usize>,
    #[arg(long, default_value_t = false)]
    no_truncate: bool,
    #[arg(long, default_value_t = false)]
    no_header: bool,
    #[arg(long, default_value_t = false)]
    summary_only: bool,
    #[arg(long, value_enum, default_value = "dark")]
    theme: Theme,
    #[arg(long)]
    html: Option<String>,
    #[arg(long, short = 'j')]
    json_path: Option<String>,
    #[arg(long)]
    csv_path: Option<String>,
    #[arg(long)]
    tsv_path: Option<String>,
    #[arg(long)]
    ndjson_path: Option<String>,
    #[arg(long)]
    md_path: Option<String>,
    #[arg(long, help = "Export a bundled set of outputs to this directory")]
    export_dir: Option<String>,
    #[arg(long, default_value_t = false)]
    no_open: bool,
    #[arg(long, default_value_t = false)]
    fail_on_duplicates: bool,
    #[arg(long, default_value_t = false)]
    progress: bool,
    #[arg(long, short = 'C', default_value_t = false)]
    no_color: bool,
    #[arg(long, default_value_t = false)]
    force_color: bool,
    #[arg(long)]
    log_level: Option<LogLevel>,
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
    #[arg(long)]
    log_path: Option<String>,
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
    #[arg(short = 'q', long, default_value_t = false)]
    quiet: bool,
    #[arg(long, value_enum)]
    completions: Option<Shell>,
    #[arg(long)]
    completions_out: Option<String>,
    /// Config file (TOML, or YAML by extension); default ./refail.toml
    #[arg(long)]
    config: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input: None,
            input_glob: None,
            recursive: false,
            delimiter: None,
            since: None,
            until: None,
            date_field: DateField::Received,
            min_duplicates: 2,
            strict_dates: false,
            strict_range: false,
            rules: None,
            output: OutputFmt::Text,
            text_format: TextFormat::Lines,
            highlight_above: 2,
            top: 20,
            cell_width: None,
            no_truncate: false,
            no_header: false,
            summary_only: false,
            theme: Theme::Dark,
            html: None,
            json_path: None,
            csv_path: None,
            tsv_path: None,
            ndjson_path: None,
            md_path: None,
            export_dir: None,
            no_open: false,
            fail_on_duplicates: false,
            progress: false,
            no_color: false,
            force_color: false,
            log_level: None,
            log_format: None,
            log_path: None,
            verbose: 0,
            quiet: false,
            completions: None,
            completions_out: None,
            config: None,
        }
    }
}

#[derive(Deserialize, Default)]
struct AppConfig {
    input: Option<String>,
    input_glob: Option<String>,
    recursive: Option<bool>,
    delimiter: Option<Delimiter>,
    since: Option<String>,
    until: Option<String>,
    date_field: Option<DateField>,
    min_duplicates: Option<u32>,
    strict_dates: Option<bool>,
    strict_range: Option<bool>,
    rules: Option<String>,
    output: Option<OutputFmt>,
    text_format: Option<TextFormat>,
    highlight_above: Option<usize>,
    top: Option<usize>,
    cell_width: Option<usize>,
    no_truncate: Option<bool>,
    theme: Option<Theme>,
    html: Option<String>,
    json_path: Option<String>,
    csv_path: Option<String>,
    tsv_path: Option<String>,
    ndjson_path: Option<String>,
    md_path: Option<String>,
    export_dir: Option<String>,
    fail_on_duplicates: Option<bool>,
    progress: Option<bool>,
    force_color: Option<bool>,
    log_format: Option<LogFormat>,
    log_path: Option<String>,
    columns: Option<ColumnMap>,
}

fn main() {
    let mut args = Args::parse();
    if let Some(sh) = args.completions {
        let mut cmd = Args::command();
        if let Some(path) = args.completions_out.as_ref() {
            if let Ok(mut f) = std::fs::File::create(path) { clap_complete::generate(sh, &mut cmd, "refail", &mut f); } else { clap_complete::generate(sh, &mut cmd, "refail", &mut std::io::stdout()); }
        } else {
            clap_complete::generate(sh, &mut cmd, "refail", &mut std::io::stdout());
        }
        return;
    }
    let cfg = match args.config.as_ref() {
        Some(p) => load_config(p, true),
        None => load_config("refail.toml", false),
    };
    let columns = match cfg {
        Some(mut c) => { let cols = c.columns.take(); apply_config(&mut args, c); cols.unwrap_or_default() }
        None => ColumnMap::default(),
    };
    init_logging(&args);
    let term = std::env::var("TERM").unwrap_or_default();
    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    let color_default = std::io::stdout().is_terminal() && !no_color_env && term != "dumb";
    let enable_color = if args.force_color { true } else { color_default && !args.no_color };
    let _ = ENABLE_COLOR.set(enable_color);
    match run(&args, &columns) {
        Ok(found) => { if args.fail_on_duplicates && found { std::process::exit(1); } }
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("{}", paint(&format!("error: {:#}", e), "1;31"));
            std::process::exit(2);
        }
    }
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if let Some(lvl) = args.log_level {
        let f = match lvl { LogLevel::Error => log::LevelFilter::Error, LogLevel::Warn => log::LevelFilter::Warn, LogLevel::Info => log::LevelFilter::Info, LogLevel::Debug => log::LevelFilter::Debug, LogLevel::Trace => log::LevelFilter::Trace };
        builder.filter_level(f);
    } else if args.verbose > 0 {
        let f = if args.verbose >= 3 { log::LevelFilter::Trace } else if args.verbose == 2 { log::LevelFilter::Debug } else { log::LevelFilter::Info };
        builder.filter_level(f);
    }
    if let Some(fmt) = args.log_format {
        match fmt {
            LogFormat::Json => {
                builder.format(|buf, record| {
                    use std::io::Write;
                    let ts = chrono::Local::now().to_rfc3339();
                    let obj = serde_json::json!({
                        "ts": ts,
                        "level": record.level().to_string(),
                        "target": record.target(),
                        "msg": record.args().to_string(),
                    });
                    writeln!(buf, "{}", obj)
                });
            }
            LogFormat::Text => {
                builder.format(|buf, record| {
                    use std::io::Write;
                    let ts = chrono::Local::now().format("%H:%M:%S");
                    writeln!(buf, "[{:<5} {}] {}", record.level(), ts, record.args())
                });
            }
        }
    }
    if let Some(path) = args.log_path.as_ref() {
        match std::fs::File::create(path) {
            Ok(f) => { builder.target(env_logger::Target::Pipe(Box::new(f))); }
            Err(e) => { eprintln!("Failed to open log file {}: {}", path, e); }
        }
    }
    builder.init();
}

fn read_config(path: &str) -> Result<AppConfig, String> {
    let s = std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))?;
    let is_yaml = Path::new(path).extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml")).unwrap_or(false);
    let parsed = if is_yaml { serde_yaml::from_str::<AppConfig>(&s).map_err(|e| e.to_string()) } else { toml::from_str::<AppConfig>(&s).map_err(|e| e.to_string()) };
    parsed.map_err(|e| format!("cannot parse {}: {}", path, e))
}

/// Runs before the logger exists, so problems go to stderr. A missing
/// default config is silent; a missing `--config` file is not.
fn load_config(path: &str, explicit: bool) -> Option<AppConfig> {
    if !explicit && !Path::new(path).exists() { return None; }
    match read_config(path) {
        Ok(cfg) => Some(cfg),
        Err(e) => { eprintln!("Ignoring config: {}", e); None }
    }
}

fn apply_config(args: &mut Args, cfg: AppConfig) {
    if args.input.is_none() && let Some(v) = cfg.input { args.input = Some(v); }
    if args.input_glob.is_none() && let Some(v) = cfg.input_glob { args.input_glob = Some(v); }
    if let Some(v) = cfg.recursive { args.recursive |= v; }
    if args.delimiter.is_none() && let Some(v) = cfg.delimiter { args.delimiter = Some(v); }
    if args.since.is_none() && let Some(v) = cfg.since.as_deref().and_then(record::parse_calendar_date) { args.since = Some(v); }
    if args.until.is_none() && let Some(v) = cfg.until.as_deref().and_then(record::parse_calendar_date) { args.until = Some(v); }
    if args.date_field == DateField::Received && let Some(v) = cfg.date_field { args.date_field = v; }
    if args.min_duplicates == 2 && let Some(v) = cfg.min_duplicates { args.min_duplicates = v.clamp(2, 100); }
    if let Some(v) = cfg.strict_dates { args.strict_dates |= v; }
    if let Some(v) = cfg.strict_range { args.strict_range |= v; }
    if args.rules.is_none() && let Some(v) = cfg.rules { args.rules = Some(v); }
    if args.output == OutputFmt::Text && let Some(v) = cfg.output { args.output = v; }
    if args.text_format == TextFormat::Lines && let Some(v) = cfg.text_format { args.text_format = v; }
    if args.highlight_above == 2 && let Some(v) = cfg.highlight_above { args.highlight_above = v; }
    if args.top == 20 && let Some(v) = cfg.top { args.top = v; }
    if args.cell_width.is_none() && let Some(v) = cfg.cell_width { args.cell_width = Some(v); }
    if let Some(v) = cfg.no_truncate { args.no_truncate |= v; }
    if args.theme == Theme::Dark && let Some(v) = cfg.theme { args.theme = v; }
    if args.html.is_none() && let Some(v) = cfg.html { args.html = Some(v); }
    if args.json_path.is_none() && let Some(v) = cfg.json_path { args.json_path = Some(v); }
    if args.csv_path.is_none() && let Some(v) = cfg.csv_path { args.csv_path = Some(v); }
    if args.tsv_path.is_none() && let Some(v) = cfg.tsv_path { args.tsv_path = Some(v); }
    if args.ndjson_path.is_none() && let Some(v) = cfg.ndjson_path { args.ndjson_path = Some(v); }
    if args.md_path.is_none() && let Some(v) = cfg.md_path { args.md_path = Some(v); }
    if args.export_dir.is_none() && let Some(v) = cfg.export_dir { args.export_dir = Some(v); }
    if let Some(v) = cfg.fail_on_duplicates { args.fail_on_duplicates |= v; }
    if let Some(v) = cfg.progress { args.progress |= v; }
    if let Some(v) = cfg.force_color { args.force_color |= v; }
    if args.log_format.is_none() && let Some(v) = cfg.log_format { args.log_format = Some(v); }
    if args.log_path.is_none() && let Some(v) = cfg.log_path { args.log_path = Some(v); }
}

/// Analysis window: explicit dates, else the three months up to `today`.
fn compute_window(args: &Args, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let until = args.until.unwrap_or(today);
    let since = args.since.unwrap_or_else(|| today.checked_sub_months(Months::new(3)).unwrap_or(today));
    (since, until)
}

fn build_params(args: &Args, rules: crate::rules::ExclusionRules, today: NaiveDate) -> AnalysisParams {
    let (start, end) = compute_window(args, today);
    let mut params = AnalysisParams::new(start, end, args.date_field, args.min_duplicates as usize);
    params.date_policy = if args.strict_dates { DatePolicy::Reject } else { DatePolicy::Exclude };
    params.range_policy = if args.strict_range { RangePolicy::Reject } else { RangePolicy::Empty };
    params.rules = rules;
    params
}

/// Returns whether any repeat group was reported.
fn run(args: &Args, columns: &ColumnMap) -> anyhow::Result<bool> {
    let input = args.input.as_deref().context("no input given; pass --input PATH or set `input` in the config file")?;
    let rules_cfg = crate::rules::load_rules(args.rules.as_deref());
    let params = build_params(args, crate::rules::ExclusionRules::from_config(rules_cfg.as_ref()), Local::now().date_naive());
    let opts = loader::LoadOptions { delimiter: args.delimiter.map(Delimiter::byte), glob: args.input_glob.clone(), recursive: args.recursive, progress: args.progress };
    let records = loader::load_path(Path::new(input), &opts, columns).with_context(|| format!("failed to load records from {}", input))?;
    log::info!("{} records loaded; window {} ..= {} on {}", records.len(), params.start, params.end, params.date_field.label());
    let analysis = pipeline::analyze(&records, &params).context("analysis failed")?;
    let found = !analysis.table.rows.is_empty();
    let summary = AnalysisReport::new(analysis, &params, vec![input.to_string()]);
    match args.output {
        OutputFmt::Text => {
            let width = args.cell_width.unwrap_or(32);
            match args.text_format {
                TextFormat::Lines => print_text(&summary, args, width),
                TextFormat::Table => print_text_table(&summary, args, width),
            }
        }
        OutputFmt::Json => {
            if let Some(p) = args.json_path.as_ref() {
                match export::write_json(p, &summary) {
                    Ok(_) => { if !args.quiet { println!("{}", paint(&format!("JSON written: {}", p), "1;36")); } }
                    Err(e) => log::error!("JSON write failed for {}: {}", p, e),
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
    }
    write_exports(args, &summary);
    Ok(found)
}

fn announce(args: &Args, what: &str, path: &str, res: Result<(), std::io::Error>) {
    match res {
        Ok(_) => { if !args.quiet { println!("{}", paint(&format!("{} written: {}", what, path), "1;36")); } }
        Err(e) => log::error!("{} write failed for {}: {}", what, path, e),
    }
}

fn write_exports(args: &Args, summary: &AnalysisReport) {
    if let Some(p) = args.html.as_ref() {
        let html = crate::html::render_html(summary, args.theme, args.highlight_above, args.top);
        let res = std::fs::write(p, html);
        let ok = res.is_ok();
        announce(args, "HTML", p, res);
        if ok && !args.no_open { open_file_default(PathBuf::from(p)); }
    }
    if args.output != OutputFmt::Json && let Some(p) = args.json_path.as_ref() { announce(args, "JSON", p, export::write_json(p, summary)); }
    if let Some(p) = args.csv_path.as_ref() { announce(args, "CSV", p, export::write_csv(p, summary)); }
    if let Some(p) = args.tsv_path.as_ref() { announce(args, "TSV", p, export::write_tsv(p, summary)); }
    if let Some(p) = args.ndjson_path.as_ref() { announce(args, "NDJSON", p, export::write_ndjson(p, summary)); }
    if let Some(p) = args.md_path.as_ref() { announce(args, "Markdown", p, std::fs::write(p, crate::markdown::render_markdown(summary, args.top))); }
    if let Some(dir) = args.export_dir.as_ref() {
        if let Err(e) = std::fs::create_dir_all(dir) { log::error!("Cannot create export directory {}: {}", dir, e); return; }
        let ts = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let base = PathBuf::from(dir);
        let path_of = |name: String| base.join(name).to_string_lossy().into_owned();
        let html_path = path_of(format!("report-{}.html", ts));
        let res = std::fs::write(&html_path, crate::html::render_html(summary, args.theme, args.highlight_above, args.top));
        let ok = res.is_ok();
        announce(args, "HTML", &html_path, res);
        if ok && !args.no_open { open_file_default(PathBuf::from(&html_path)); }
        let json_path = path_of(format!("report-{}.json", ts));
        announce(args, "JSON", &json_path, export::write_json(&json_path, summary));
        let md_path = path_of(format!("report-{}.md", ts));
        announce(args, "Markdown", &md_path, std::fs::write(&md_path, crate::markdown::render_markdown(summary, args.top)));
        let csv_path = path_of(format!("repeats-{}.csv", ts));
        announce(args, "CSV", &csv_path, export::write_csv(&csv_path, summary));
        let tsv_path = path_of(format!("repeats-{}.tsv", ts));
        announce(args, "TSV", &tsv_path, export::write_tsv(&tsv_path, summary));
        let ndjson_path = path_of(format!("repeats-{}.ndjson", ts));
        announce(args, "NDJSON", &ndjson_path, export::write_ndjson(&ndjson_path, summary));
    }
}

fn print_summary(rep: &AnalysisReport, args: &Args) {
    if args.no_header { return; }
    println!("{}", paint(&format!("Window: {} to {} ({})", rep.start, rep.end, rep.date_field.label()), "1;36"));
    println!("{} {} → {} after preprocessing → {} in window", paint("Records:", "1"), rep.counts.input, rep.counts.after_preprocess, rep.counts.after_date_filter);
    if rep.counts.output_groups == 0 {
        println!("{}", paint(&format!("Status: no unit repaired {} or more times.", rep.min_duplicates), "1;32"));
        return;
    }
    println!("{}", paint(&format!("Status: {} units with {} or more repairs ({} receipts).", rep.counts.output_groups, rep.min_duplicates, rep.counts.output_records), "1;33"));
    println!("{}", paint("Largest Groups:", "1"));
    for g in rep.largest_groups(args.top) {
        let span = match (g.first_date, g.last_date) { (Some(f), Some(l)) => format!("  {} → {}", f, l), _ => String::new() };
        println!("• #{} {} / {} / {} ({}){}", g.group_id, g.key.address1, g.key.model_code, g.key.serial_number, g.size, span);
    }
}

fn print_text(rep: &AnalysisReport, args: &Args, width: usize) {
    print_summary(rep, args);
    if args.summary_only { return; }
    let cut = |s: &str| if args.no_truncate { s.to_string() } else { truncate(s, width) };
    for g in &rep.groups {
        let head = format!("#{} {} / {} / {} ({} receipts)", g.group_id, cut(&g.key.address1), cut(&g.key.model_code), cut(&g.key.serial_number), g.size);
        println!("{}", if g.size > args.highlight_above { paint(&head, "1;33") } else { paint(&head, "1") });
        for row in rep.table.rows.iter().filter(|r| r.group_id == g.group_id) {
            let r = &row.record;
            println!("  {:<14} {:<16} received {:<10} repaired {:<10}", cut(&r.receipt_id), cut(&r.repair_result), cut(&r.received_at), cut(&r.repaired_at));
        }
    }
}

fn print_text_table(rep: &AnalysisReport, args: &Args, width: usize) {
    print_summary(rep, args);
    if args.summary_only || rep.table.rows.is_empty() { return; }
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(rep.table.header().iter().map(|h| paint(h, "1")).collect::<Vec<_>>());
    for row in &rep.table.rows {
        let mut cells: Vec<Cell> = Vec::new();
        for (i, c) in row.cells().into_iter().enumerate() {
            let text = if args.no_truncate { c } else { truncate(&c, width) };
            let hot = i == 0 && row.duplicate_count > args.highlight_above;
            cells.push(Cell::new(if hot { paint(&text, "30;103") } else { text }));
        }
        table.add_row(cells);
    }
    println!("{}", table);
}

fn truncate(s: &str, n: usize) -> String {
    let mut out: String = s.chars().take(n).collect();
    if s.chars().count() > n { out.push_str("..."); }
    out
}

fn paint(s: &str, code: &str) -> String {
    if *ENABLE_COLOR.get().unwrap_or(&false) { format!("\x1b[{}m{}\x1b[0m", code, s) } else { s.to_string() }
}

#[cfg(target_os = "windows")]
fn open_file_default(p: PathBuf) {
    let s = p.to_string_lossy().into_owned();
    let _ = std::process::Command::new("cmd").args(["/C", "start", "", &s]).spawn().map_err(|e| log::error!("Failed to open file {}: {}", s, e));
}

#[cfg(target_os = "macos")]
fn open_file_default(p: PathBuf) {
    let s = p.to_string_lossy().into_owned();
    let _ = std::process::Command::new("open").arg(&s).spawn().map_err(|e| log::error!("Failed to open file {}: {}", s, e));
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_file_default(p: PathBuf) {
    let s = p.to_string_lossy().into_owned();
    let _ = std::process::Command::new("xdg-open").arg(&s).spawn().map_err(|e| log::error!("Failed to open file {}: {}", s, e));
}
