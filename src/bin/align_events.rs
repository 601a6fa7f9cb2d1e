use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use eegsync_rs::output::{task_meta, writer};
use eegsync_rs::{
    CptCapture, Diagnostic, EventAlignerBuilder, EventTable, MarkerStream, RawMarker, RunId,
    SyncConfig, WideLog,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TaskChoice {
    /// Experience-sampling probes: one row per trial, item-metric columns.
    Probe,
    /// Gradual-onset continuous performance: response matrix + script start.
    Cpt,
}

impl TaskChoice {
    fn task_entity(self) -> &'static str {
        match self {
            Self::Probe => "ExperienceSampling",
            Self::Cpt => "GradCPT",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "align_events")]
#[command(about = "Align one run's behavioral events to EEG and scanner clocks")]
struct Args {
    /// Behavioral log (delimited text; .tsv is tab-separated, otherwise comma).
    #[arg(long, env = "EEGSYNC_BEHAV")]
    behav: PathBuf,
    /// Marker table: one `sample_index<TAB>code` line per annotation.
    #[arg(long, env = "EEGSYNC_MARKERS")]
    markers: Option<PathBuf>,
    #[arg(long, env = "EEGSYNC_SAMPLING_RATE_HZ", default_value_t = 5000.0)]
    sampling_rate_hz: f64,
    #[arg(long)]
    subject: String,
    #[arg(long, default_value = "")]
    session: String,
    #[arg(long, default_value = "001")]
    run: String,
    #[arg(long, value_enum, default_value_t = TaskChoice::Probe)]
    task: TaskChoice,
    /// Script-embedded start timestamp (seconds in the script's clock).
    #[arg(long)]
    script_start: Option<f64>,
    #[arg(long, env = "EEGSYNC_OUT")]
    out: PathBuf,
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("align_events: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let run_id = RunId::new(
        args.subject.clone(),
        args.session.clone(),
        args.run.clone(),
    );

    let markers = match args.markers.as_ref() {
        Some(path) => Some(load_marker_stream(path, args.sampling_rate_hz)?),
        None => None,
    };

    let behav_text = fs::read_to_string(&args.behav)
        .map_err(|e| format!("cannot read {}: {e}", args.behav.display()))?;
    let delimiter = delimiter_for(&args.behav);

    let aligner = EventAlignerBuilder::new(SyncConfig::default()).build();

    let (tables, sidecar, diagnostics) = match args.task {
        TaskChoice::Probe => {
            let log = WideLog::from_delimited(&behav_text, delimiter)
                .map_err(|e| format!("{}: {e}", args.behav.display()))?;
            let out = aligner
                .align_probe_run(&run_id, &log, markers.as_ref(), args.script_start)
                .map_err(|e| format!("run {}: {e}", args.run))?;
            let tables = vec![
                ("eeg", EventTable::from_probe(&out.bioelectric)),
                ("func", EventTable::from_probe(&out.scanner)),
            ];
            (tables, task_meta::probe_sidecar(), out.diagnostics)
        }
        TaskChoice::Cpt => {
            let script_start = args
                .script_start
                .ok_or("--script-start is required for the continuous task")?;
            let capture = CptCapture::from_delimited(&behav_text, delimiter, script_start)
                .map_err(|e| format!("{}: {e}", args.behav.display()))?;
            let out = aligner
                .align_cpt_run(&run_id, &capture, markers.as_ref())
                .map_err(|e| format!("run {}: {e}", args.run))?;
            let tables = vec![
                ("eeg", EventTable::from_cpt(&out.bioelectric)),
                ("func", EventTable::from_cpt(&out.scanner)),
            ];
            (tables, task_meta::cpt_sidecar(), out.diagnostics)
        }
    };

    for diagnostic in &diagnostics {
        report_degradation(diagnostic);
    }

    write_outputs(&args, &run_id, &tables, &sidecar)
}

fn write_outputs(
    args: &Args,
    run_id: &RunId,
    tables: &[(&'static str, EventTable)],
    sidecar: &Value,
) -> Result<(), String> {
    let mut log = writer::ConversionLog::load_or_new(&args.out);
    let progress = ProgressBar::new((tables.len() * 2) as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .map_err(|e| format!("progress template: {e}"))?,
    );

    for (datatype, table) in tables {
        let stem = output_stem(args, run_id, datatype);
        let tsv_path = stem.with_extension("tsv");
        let json_path = stem.with_extension("json");

        progress.set_message(format!("{datatype} events"));
        writer::write_table(&tsv_path, table, args.overwrite).map_err(|e| e.to_string())?;
        log.record(&args.behav, &tsv_path);
        progress.inc(1);

        writer::write_sidecar(&json_path, sidecar, args.overwrite).map_err(|e| e.to_string())?;
        progress.inc(1);
    }
    progress.finish_with_message("done");

    log.save().map_err(|e| e.to_string())
}

fn output_stem(args: &Args, run_id: &RunId, datatype: &str) -> PathBuf {
    let subject = format!("sub-{}", run_id.subject);
    let mut dir = args.out.join(&subject);
    let mut name = subject;
    if !run_id.session.is_empty() {
        let session = format!("ses-{}", run_id.session);
        dir = dir.join(&session);
        name.push('_');
        name.push_str(&session);
    }
    dir = dir.join(datatype);
    name.push_str(&format!(
        "_task-{}_run-{}_events",
        args.task.task_entity(),
        run_id.run
    ));
    dir.join(name)
}

fn delimiter_for(path: &Path) -> char {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("tsv") => '\t',
        _ => ',',
    }
}

fn load_marker_stream(path: &Path, sampling_rate_hz: f64) -> Result<MarkerStream, String> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut raw = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        let (sample, code) = trimmed
            .split_once('\t')
            .ok_or_else(|| format!("{}:{}: expected `sample<TAB>code`", path.display(), line_no + 1))?;
        let sample: u64 = match sample.trim().parse() {
            Ok(value) => value,
            // Tolerate a header line.
            Err(_) if line_no == 0 => continue,
            Err(e) => {
                return Err(format!(
                    "{}:{}: bad sample index: {e}",
                    path.display(),
                    line_no + 1
                ))
            }
        };
        raw.push(RawMarker::new(sample, code));
    }
    MarkerStream::from_raw(raw, sampling_rate_hz, &SyncConfig::default())
        .map_err(|e| format!("{}: {e}", path.display()))
}

fn report_degradation(diagnostic: &Diagnostic) {
    tracing::warn!(
        subject = %diagnostic.subject,
        session = %diagnostic.session,
        run = %diagnostic.run,
        domain = ?diagnostic.domain,
        candidates = ?diagnostic.candidate_labels,
        "domain degraded: {}",
        diagnostic.reason
    );
}
