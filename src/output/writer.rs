use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::error::SyncError;
use crate::output::table::EventTable;

/// Whether a guarded write touched the filesystem. `SkippedExisting` means
/// the file was left byte-for-byte (and mtime-for-mtime) untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    SkippedExisting,
}

fn guarded_write(path: &Path, contents: &str, overwrite: bool) -> Result<WriteOutcome, SyncError> {
    if !overwrite && path.exists() {
        return Ok(WriteOutcome::SkippedExisting);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::io("create output directory", e))?;
    }
    fs::write(path, contents).map_err(|e| SyncError::io("write output file", e))?;
    Ok(WriteOutcome::Written)
}

pub fn write_table(
    path: &Path,
    table: &EventTable,
    overwrite: bool,
) -> Result<WriteOutcome, SyncError> {
    guarded_write(path, &table.to_tsv(), overwrite)
}

pub fn write_sidecar(
    path: &Path,
    sidecar: &serde_json::Value,
    overwrite: bool,
) -> Result<WriteOutcome, SyncError> {
    let rendered = serde_json::to_string_pretty(sidecar)
        .map_err(|e| SyncError::json("render sidecar", e))?;
    guarded_write(path, &rendered, overwrite)
}

#[derive(Debug, Serialize)]
struct ConversionLogDocument<'a> {
    generated_at: String,
    entries: &'a BTreeMap<String, String>,
}

/// Input → output path map for a conversion, merged into any log already
/// at the destination root so repeated invocations accumulate.
#[derive(Debug)]
pub struct ConversionLog {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ConversionLog {
    pub fn load_or_new(dest_root: &Path) -> Self {
        let path = dest_root.join("conversion_log_events.json");
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
            .and_then(|value| {
                value.get("entries").and_then(|entries| {
                    serde_json::from_value::<BTreeMap<String, String>>(entries.clone()).ok()
                })
            })
            .unwrap_or_default();
        Self { path, entries }
    }

    pub fn record(&mut self, input: &Path, output: &Path) {
        self.entries
            .insert(input.display().to_string(), output.display().to_string());
    }

    pub fn save(&self) -> Result<(), SyncError> {
        let document = ConversionLogDocument {
            generated_at: Utc::now().to_rfc3339(),
            entries: &self.entries,
        };
        let rendered = serde_json::to_string_pretty(&document)
            .map_err(|e| SyncError::json("render conversion log", e))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::io("create log directory", e))?;
        }
        fs::write(&self.path, rendered).map_err(|e| SyncError::io("write conversion log", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlignedRow, AlignedTimeline, ClockDomain, ReferenceSource};

    fn table() -> EventTable {
        EventTable::from_probe(&AlignedTimeline {
            domain: ClockDomain::Bioelectric,
            source: ReferenceSource::AnnotationMarkers,
            rows: vec![AlignedRow {
                onset_s: 1.0,
                duration_s: 2.0,
                offset_s: 3.0,
                trial: 1,
                item: "att".to_string(),
                response: "4".to_string(),
                response_time_s: 0.5,
            }],
        })
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("eegsync_writer_{name}"))
    }

    #[test]
    fn overwrite_false_skips_existing_files() {
        let path = scratch_path("skip.tsv");
        let _ = fs::remove_file(&path);

        assert_eq!(
            write_table(&path, &table(), false).expect("first write"),
            WriteOutcome::Written
        );
        let first_mtime = fs::metadata(&path).expect("metadata").modified().expect("mtime");

        assert_eq!(
            write_table(&path, &table(), false).expect("second write"),
            WriteOutcome::SkippedExisting
        );
        let second_mtime = fs::metadata(&path).expect("metadata").modified().expect("mtime");
        assert_eq!(first_mtime, second_mtime);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn overwrite_true_replaces_existing_files() {
        let path = scratch_path("replace.tsv");
        fs::write(&path, "stale").expect("seed file");
        assert_eq!(
            write_table(&path, &table(), true).expect("overwrite"),
            WriteOutcome::Written
        );
        assert!(fs::read_to_string(&path).expect("read").starts_with("onset\t"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn conversion_log_merges_across_loads() {
        let root = scratch_path("log_root");
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).expect("mkdir");

        let mut log = ConversionLog::load_or_new(&root);
        log.record(Path::new("/raw/a.csv"), Path::new("/out/a.tsv"));
        log.save().expect("save");

        let mut log = ConversionLog::load_or_new(&root);
        log.record(Path::new("/raw/b.csv"), Path::new("/out/b.tsv"));
        log.save().expect("save");

        let text =
            fs::read_to_string(root.join("conversion_log_events.json")).expect("read log");
        assert!(text.contains("a.csv"));
        assert!(text.contains("b.csv"));

        let _ = fs::remove_dir_all(&root);
    }
}
