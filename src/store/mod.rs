// src/store/mod.rs
//
// Persists the accumulated datasets. Every file is written under a temporary
// name in its destination directory and renamed into place once complete.

pub mod csv_out;
pub mod parquet_out;
pub mod table;

pub use table::{
    apply_filters, load_table, parse_filter, parse_filters, save_table, DataTable, Filters,
};

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::accumulate::{Accumulator, ErrorTracker};
use crate::config::Config;
use crate::schema::{bio_columns, result_columns};
use crate::AthleteId;

pub const BIOS_CSV: &str = "bios.csv";
pub const RESULTS_CSV: &str = "results.csv";
pub const BIOS_PARQUET: &str = "bios.parquet";
pub const RESULTS_PARQUET: &str = "results.parquet";
pub const ERRORS_JSON: &str = "errors.json";

#[derive(Debug, Clone)]
pub struct Store {
    out_dir: PathBuf,
    errors_path: PathBuf,
    parquet: bool,
}

/// What a flush wrote.
#[derive(Debug, Clone, Default)]
pub struct FlushReport {
    pub bio_rows: usize,
    pub result_rows: usize,
    pub error_ids: usize,
    pub files: Vec<PathBuf>,
}

impl Store {
    pub fn new(out_dir: impl Into<PathBuf>, errors_path: impl Into<PathBuf>, parquet: bool) -> Self {
        Self {
            out_dir: out_dir.into(),
            errors_path: errors_path.into(),
            parquet,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.out_dir, &cfg.errors_file, cfg.parquet)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// `errors.json` sits next to the id list.
    pub fn errors_json_path(&self) -> PathBuf {
        match self.errors_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.join(ERRORS_JSON),
            _ => PathBuf::from(ERRORS_JSON),
        }
    }

    /// Write every output file. Empty datasets still produce files with headers.
    pub fn flush_all(&self, acc: &Accumulator, errors: &ErrorTracker) -> Result<FlushReport> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating output directory {:?}", self.out_dir))?;
        let mut report = FlushReport {
            bio_rows: acc.bios().len(),
            result_rows: acc.results().len(),
            error_ids: errors.len(),
            files: Vec::new(),
        };

        let bio_cols = bio_columns(acc.bios());
        let res_cols = result_columns();

        let bios_path = self.out_dir.join(BIOS_CSV);
        write_atomic(&bios_path, |w| csv_out::write_records(w, &bio_cols, acc.bios()))?;
        report.files.push(bios_path);

        let results_path = self.out_dir.join(RESULTS_CSV);
        write_atomic(&results_path, |w| {
            csv_out::write_records(w, &res_cols, acc.results())
        })?;
        report.files.push(results_path);

        if self.parquet {
            let p = self.out_dir.join(BIOS_PARQUET);
            write_atomic(&p, |w| parquet_out::write_records(w, &bio_cols, acc.bios()))?;
            report.files.push(p);

            let p = self.out_dir.join(RESULTS_PARQUET);
            write_atomic(&p, |w| {
                parquet_out::write_records(w, &res_cols, acc.results())
            })?;
            report.files.push(p);
        }

        if let Some(parent) = self.errors_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {:?}", parent))?;
        }
        write_atomic(&self.errors_path, |w| {
            w.write_all(format_error_list(&errors.ids()).as_bytes())?;
            Ok(())
        })?;
        report.files.push(self.errors_path.clone());

        let json_path = self.errors_json_path();
        write_atomic(&json_path, |w| {
            serde_json::to_writer_pretty(&mut *w, errors.all()).context("serializing errors")?;
            w.write_all(b"\n")?;
            Ok(())
        })?;
        report.files.push(json_path);

        info!(
            bios = report.bio_rows,
            results = report.result_rows,
            errors = report.error_ids,
            out_dir = %self.out_dir.display(),
            "Flushed output"
        );
        Ok(report)
    }
}

/// `[3, 17, 42]`; `[]` when nothing failed.
pub fn format_error_list(ids: &[AthleteId]) -> String {
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}

/// Write through a buffered temp file next to `path`, then rename over it.
pub(crate) fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file_name = path
        .file_name()
        .with_context(|| format!("{:?} has no file name", path))?
        .to_string_lossy();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let file =
        File::create(&tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    let written = fill_and_sync(file, fill, &tmp_path).and_then(|()| {
        fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))
    });
    if let Err(e) = written {
        if let Err(rm) = fs::remove_file(&tmp_path) {
            warn!(path = %tmp_path.display(), error = %rm, "could not remove temp file");
        }
        return Err(e);
    }
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

fn fill_and_sync<F>(file: File, fill: F, tmp_path: &Path) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut writer = BufWriter::new(file);
    fill(&mut writer).with_context(|| format!("writing {:?}", tmp_path))?;
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .and_then(|f| f.sync_all())
        .with_context(|| format!("flushing {:?}", tmp_path))
}
