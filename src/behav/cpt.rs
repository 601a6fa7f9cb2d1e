use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::markers::extractor::MarkerStream;
use crate::markers::label::select_item_code;
use crate::types::{ClockDomain, ReferenceSource};

/// One trial of the continuous-performance task as captured by the script:
/// the raw script-clock timestamp plus the recorded response fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CptTrial {
    pub cue: f64,
    pub timestamp_s: f64,
    pub stimulus_coherence: f64,
    pub response_time_s: f64,
    pub response: f64,
}

/// Full capture for one run: per-trial rows and the script-embedded start
/// time the scanner path anchors on.
#[derive(Debug, Clone)]
pub struct CptCapture {
    pub trials: Vec<CptTrial>,
    pub script_start_s: f64,
}

impl CptCapture {
    pub fn new(trials: Vec<CptTrial>, script_start_s: f64) -> Result<Self, SyncError> {
        if trials.is_empty() {
            return Err(SyncError::schema("continuous task capture has no trials"));
        }
        Ok(Self {
            trials,
            script_start_s,
        })
    }

    /// Reads a delimited export of the capture matrix. Expected columns:
    /// `cue`, `timestamp`, `stimulus_coherence`, `response_time`, `response`.
    pub fn from_delimited(
        text: &str,
        delimiter: char,
        script_start_s: f64,
    ) -> Result<Self, SyncError> {
        let log = crate::behav::wide::WideLog::from_delimited(text, delimiter)?;
        let column = |name: &str| {
            log.column_index(name)
                .ok_or_else(|| SyncError::schema(format!("missing column {name:?}")))
        };
        let cue = column("cue")?;
        let timestamp = column("timestamp")?;
        let coherence = column("stimulus_coherence")?;
        let response_time = column("response_time")?;
        let response = column("response")?;

        let mut trials = Vec::with_capacity(log.n_rows());
        for row in 0..log.n_rows() {
            let cell = |idx: usize, name: &str| {
                crate::behav::wide::parse_cell_f64(
                    log.cell(row, idx),
                    &format!("{name}, trial {}", row + 1),
                )
            };
            trials.push(CptTrial {
                cue: cell(cue, "cue")?,
                timestamp_s: cell(timestamp, "timestamp")?,
                stimulus_coherence: cell(coherence, "stimulus_coherence")?,
                response_time_s: cell(response_time, "response_time")?,
                response: cell(response, "response")?,
            });
        }
        Self::new(trials, script_start_s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CptRow {
    pub onset_s: f64,
    pub duration_s: f64,
    pub cue: f64,
    pub timestamp_s: f64,
    pub stimulus_coherence: f64,
    pub response_time_s: f64,
    pub response: f64,
}

#[derive(Debug, Clone)]
pub struct CptTimeline {
    pub domain: ClockDomain,
    pub source: ReferenceSource,
    pub rows: Vec<CptRow>,
}

/// Scanner-domain projection: onsets relative to the script-embedded start
/// time. Durations are successive onset differences, NaN on the last trial.
pub fn project_cpt_scanner(capture: &CptCapture) -> CptTimeline {
    let onsets: Vec<f64> = capture
        .trials
        .iter()
        .map(|trial| trial.timestamp_s - capture.script_start_s)
        .collect();
    CptTimeline {
        domain: ClockDomain::Scanner,
        source: ReferenceSource::ScriptClock,
        rows: rows_with_onsets(capture, &onsets),
    }
}

/// Bioelectric-domain projection: the task-onset marker plus the nominal
/// warm-up delay gives the first stimulus time; every script timestamp is
/// shifted so the first trial lands there.
pub fn project_cpt_bioelectric(
    capture: &CptCapture,
    stream: &MarkerStream,
    config: &SyncConfig,
) -> Result<CptTimeline, SyncError> {
    let code = select_item_code(stream)?;
    let task_onset_s = stream.occurrence_times(code)[0];
    let first_stimulus_s = task_onset_s + config.stimulus_warmup_delay_s;
    let shift = capture.trials[0].timestamp_s - first_stimulus_s;

    let onsets: Vec<f64> = capture
        .trials
        .iter()
        .map(|trial| trial.timestamp_s - shift)
        .collect();
    Ok(CptTimeline {
        domain: ClockDomain::Bioelectric,
        source: ReferenceSource::AnnotationMarkers,
        rows: rows_with_onsets(capture, &onsets),
    })
}

/// NaN-filled bioelectric timeline for the degraded path; row count and
/// response fields are preserved.
pub fn degraded_cpt_bioelectric(capture: &CptCapture) -> CptTimeline {
    let onsets = vec![f64::NAN; capture.trials.len()];
    CptTimeline {
        domain: ClockDomain::Bioelectric,
        source: ReferenceSource::AnnotationMarkers,
        rows: rows_with_onsets(capture, &onsets),
    }
}

fn rows_with_onsets(capture: &CptCapture, onsets: &[f64]) -> Vec<CptRow> {
    capture
        .trials
        .iter()
        .enumerate()
        .map(|(idx, trial)| {
            let duration = if idx + 1 < onsets.len() {
                onsets[idx + 1] - onsets[idx]
            } else {
                f64::NAN
            };
            CptRow {
                onset_s: onsets[idx],
                duration_s: duration,
                cue: trial.cue,
                timestamp_s: trial.timestamp_s,
                stimulus_coherence: trial.stimulus_coherence,
                response_time_s: trial.response_time_s,
                response: trial.response,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::extractor::RawMarker;

    fn capture() -> CptCapture {
        let trials = (0..3)
            .map(|idx| CptTrial {
                cue: 2.0,
                timestamp_s: 100.0 + idx as f64 * 0.8,
                stimulus_coherence: 0.5,
                response_time_s: 0.4,
                response: 1.0,
            })
            .collect();
        CptCapture::new(trials, 95.0).expect("valid capture")
    }

    #[test]
    fn scanner_onsets_are_relative_to_script_start() {
        let timeline = project_cpt_scanner(&capture());
        assert_eq!(timeline.rows[0].onset_s, 5.0);
        assert!((timeline.rows[0].duration_s - 0.8).abs() < 1e-9);
        assert!(timeline.rows[2].duration_s.is_nan());
        assert_eq!(timeline.source, ReferenceSource::ScriptClock);
    }

    #[test]
    fn bioelectric_onsets_anchor_on_task_marker_plus_delay() {
        let stream = MarkerStream::from_raw(
            vec![RawMarker::new(10_000, "Stimulus/S  1")],
            1000.0,
            &SyncConfig::default(),
        )
        .expect("valid stream");
        let timeline = project_cpt_bioelectric(&capture(), &stream, &SyncConfig::default())
            .expect("projected");
        // Task onset 10 s + 20 s warm-up = first stimulus at 30 s.
        assert!((timeline.rows[0].onset_s - 30.0).abs() < 1e-9);
        assert!((timeline.rows[1].onset_s - 30.8).abs() < 1e-9);
    }

    #[test]
    fn degraded_timeline_keeps_rows_and_responses() {
        let timeline = degraded_cpt_bioelectric(&capture());
        assert_eq!(timeline.rows.len(), 3);
        assert!(timeline.rows.iter().all(|row| row.onset_s.is_nan()));
        assert_eq!(timeline.rows[1].response, 1.0);
    }
}
