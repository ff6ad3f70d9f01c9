use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSetBuilder};
use walkdir::WalkDir;

use crate::errors::AnalysisError;
use crate::record::{ColumnMap, RecordSet};

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Field delimiter; inferred from the file extension when unset.
    pub delimiter: Option<u8>,
    /// Glob applied to files when the input is a directory.
    pub glob: Option<String>,
    pub recursive: bool,
    pub progress: bool,
}

fn delimiter_for(path: &Path, opt: Option<u8>) -> u8 {
    if let Some(d) = opt { return d; }
    match path.extension().and_then(|e| e.to_str()).map(|s| s.to_ascii_lowercase()) {
        Some(ext) if ext == "tsv" || ext == "tab" => b'\t',
        _ => b',',
    }
}

fn is_table_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).map(|s| ["csv", "tsv", "tab"].iter().any(|x| s.eq_ignore_ascii_case(x))).unwrap_or(false)
}

/// Reads a header row and all data rows from one delimited file.
pub fn read_table(path: &Path, delimiter: u8) -> Result<(Vec<String>, Vec<Vec<String>>), AnalysisError> {
    let mut rdr = csv::ReaderBuilder::new().delimiter(delimiter).flexible(true).from_path(path)?;
    let header: Vec<String> = rdr.headers()?.iter().map(|h| h.trim_start_matches('\u{feff}').trim().to_string()).collect();
    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        rows.push(rec.iter().map(|c| c.to_string()).collect());
    }
    Ok((header, rows))
}

/// Lists the table files under `root`, sorted by path.
pub fn collect_files(root: &Path, glob: Option<&str>, recursive: bool) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut set_opt = None;
    if let Some(g) = glob {
        let mut gs = GlobSetBuilder::new();
        gs.add(GlobBuilder::new(g).case_insensitive(true).build()?);
        set_opt = Some(gs.build()?);
    }
    let wd = if recursive { WalkDir::new(root) } else { WalkDir::new(root).max_depth(1) };
    let mut out = Vec::new();
    for de in wd.follow_links(false).into_iter().filter_map(Result::ok) {
        let p = de.path();
        if !p.is_file() { continue; }
        let matched = match &set_opt {
            Some(set) => set.is_match(p) || p.file_name().map(|n| set.is_match(n)).unwrap_or(false),
            None => is_table_file(p),
        };
        if matched { out.push(p.to_path_buf()); }
    }
    out.sort();
    Ok(out)
}

/// Lays `rows` read under `header` out in `columns` order, matching by name.
fn align_rows(columns: &[String], header: &[String], rows: Vec<Vec<String>>, source_name: &str) -> Vec<Vec<String>> {
    if header == columns { return rows; }
    for h in header { if !columns.contains(h) { log::warn!("{}: column '{}' not present in the first file, ignored", source_name, h); } }
    let pos: Vec<Option<usize>> = columns.iter().map(|c| header.iter().position(|h| h == c)).collect();
    rows.into_iter()
        .map(|row| pos.iter().map(|p| p.and_then(|i| row.get(i).cloned()).unwrap_or_default()).collect())
        .collect()
}

/// Loads a file, or every table file in a directory, into one record set.
/// Files after the first are aligned to the first file's columns by name.
pub fn load_path(path: &Path, opts: &LoadOptions, map: &ColumnMap) -> Result<RecordSet, AnalysisError> {
    if path.is_file() {
        let (header, rows) = read_table(path, delimiter_for(path, opts.delimiter))?;
        log::info!("Loaded {} rows from {}", rows.len(), path.to_string_lossy());
        return RecordSet::from_table(&path.to_string_lossy(), header, rows, map);
    }
    if !path.is_dir() {
        return Err(AnalysisError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, format!("input not found: {}", path.to_string_lossy()))));
    }
    let files = collect_files(path, opts.glob.as_deref(), opts.recursive)?;
    if files.is_empty() { log::warn!("No table files found under {}", path.to_string_lossy()); }
    let pb = if opts.progress { Some(indicatif::ProgressBar::new_spinner()) } else { None };
    let mut merged: Option<RecordSet> = None;
    for f in &files {
        let name = f.to_string_lossy().into_owned();
        if let Some(ref pb) = pb { pb.tick(); pb.set_message(format!("Reading {}", name)); }
        let (header, rows) = read_table(f, delimiter_for(f, opts.delimiter))?;
        log::info!("Loaded {} rows from {}", rows.len(), name);
        let part = match &merged {
            None => RecordSet::from_table(&name, header, rows, map)?,
            Some(m) => {
                // Required columns must exist in every file, not just the first.
                RecordSet::from_table(&name, header.clone(), vec![], map)?;
                let aligned = align_rows(&m.columns, &header, rows, &name);
                RecordSet::from_table(&name, m.columns.clone(), aligned, map)?
            }
        };
        match merged.as_mut() {
            None => merged = Some(part),
            Some(m) => m.records.extend(part.records),
        }
    }
    if let Some(pb) = pb { pb.finish_and_clear(); }
    match merged {
        Some(m) => Ok(m),
        None => Ok(RecordSet { columns: map.required().iter().map(|s| s.to_string()).collect(), records: vec![] }),
    }
}
