use serde::Serialize;

/// Identifiers for one unit of work, constructed once by the discovery
/// layer and passed by value. The core never re-derives these from paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunId {
    pub subject: String,
    pub session: String,
    pub run: String,
}

impl RunId {
    pub fn new(
        subject: impl Into<String>,
        session: impl Into<String>,
        run: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            session: session.into(),
            run: run.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockDomain {
    Bioelectric,
    Scanner,
}

/// Semantic kind of a marker, assigned once at ingestion so downstream
/// logic matches on kind instead of re-parsing description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    CalibrationPulse,
    AcquisitionStart,
    ItemOnset,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEvent {
    pub sample_index: u64,
    pub code: String,
    pub kind: MarkerKind,
}

/// One (trial, item) observation in the behavioral script's own clock.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    /// 1-based trial number; trials form a contiguous range.
    pub trial: u32,
    pub item: String,
    pub onset_native_s: f64,
    pub offset_native_s: f64,
    pub duration_s: f64,
    pub response: String,
    pub response_time_s: f64,
}

/// Long-format behavioral table for one run, sorted by (trial, native
/// onset). That ordering is the canonical within-trial item order.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    records: Vec<TrialRecord>,
    n_trials: u32,
}

impl ProbeSequence {
    /// Validates the trial/item invariants: contiguous 1-based trials and an
    /// identical item set on every trial.
    pub fn new(records: Vec<TrialRecord>) -> Result<Self, crate::error::SyncError> {
        use std::collections::BTreeSet;

        if records.is_empty() {
            return Err(crate::error::SyncError::schema("no trial records"));
        }

        let n_trials = records.iter().map(|r| r.trial).max().unwrap_or(0);
        let mut per_trial: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); n_trials as usize];
        for record in &records {
            if record.trial == 0 || record.trial > n_trials {
                return Err(crate::error::SyncError::schema(format!(
                    "trial {} outside contiguous range 1..={n_trials}",
                    record.trial
                )));
            }
            let items = &mut per_trial[(record.trial - 1) as usize];
            if !items.insert(record.item.as_str()) {
                return Err(crate::error::SyncError::schema(format!(
                    "duplicate (trial {}, item {:?}) pair",
                    record.trial, record.item
                )));
            }
        }
        for (idx, items) in per_trial.iter().enumerate() {
            if items.is_empty() {
                return Err(crate::error::SyncError::schema(format!(
                    "trial {} has no records",
                    idx + 1
                )));
            }
            if items != &per_trial[0] {
                return Err(crate::error::SyncError::schema(format!(
                    "trial {} has a different item set than trial 1",
                    idx + 1
                )));
            }
        }

        Ok(Self { records, n_trials })
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn n_trials(&self) -> u32 {
        self.n_trials
    }

    /// Native onset of the first trial's first item (the shift anchor).
    pub fn first_onset_native_s(&self) -> f64 {
        self.records[0].onset_native_s
    }
}

/// How a clock reference was obtained. Script-clock surrogates are
/// lower-confidence and must stay visible on the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    AnnotationMarkers,
    ScriptClock,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockReference {
    pub domain: ClockDomain,
    /// Reference event's timestamp in the domain's own seconds-since-start;
    /// NaN when the domain could not be resolved.
    pub reference_time_s: f64,
    pub source: ReferenceSource,
}

impl ClockReference {
    pub fn unresolved(domain: ClockDomain) -> Self {
        Self {
            domain,
            reference_time_s: f64::NAN,
            source: ReferenceSource::AnnotationMarkers,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.reference_time_s.is_finite()
    }
}

/// One output row, reprojected onto a target clock domain.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub onset_s: f64,
    pub duration_s: f64,
    pub offset_s: f64,
    pub trial: u32,
    pub item: String,
    pub response: String,
    pub response_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct AlignedTimeline {
    pub domain: ClockDomain,
    pub source: ReferenceSource,
    pub rows: Vec<AlignedRow>,
}

impl AlignedTimeline {
    pub fn is_degraded(&self) -> bool {
        self.rows.iter().all(|row| row.onset_s.is_nan())
    }
}

/// Structured record of one domain's degradation, surfaced to the caller
/// alongside the NaN-filled table.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub subject: String,
    pub session: String,
    pub run: String,
    pub domain: ClockDomain,
    pub reason: String,
    pub candidate_labels: Vec<String>,
}

impl Diagnostic {
    pub fn new(
        run_id: &RunId,
        domain: ClockDomain,
        reason: impl Into<String>,
        candidate_labels: Vec<String>,
    ) -> Self {
        Self {
            subject: run_id.subject.clone(),
            session: run_id.session.clone(),
            run: run_id.run.clone(),
            domain,
            reason: reason.into(),
            candidate_labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(trial: u32, item: &str, onset: f64) -> TrialRecord {
        TrialRecord {
            trial,
            item: item.to_string(),
            onset_native_s: onset,
            offset_native_s: onset + 1.0,
            duration_s: 1.0,
            response: "3".to_string(),
            response_time_s: 0.5,
        }
    }

    #[test]
    fn probe_sequence_accepts_uniform_trials() {
        let seq = ProbeSequence::new(vec![
            record(1, "att", 1.0),
            record(1, "aff", 2.0),
            record(2, "att", 10.0),
            record(2, "aff", 11.0),
        ])
        .expect("uniform trials");
        assert_eq!(seq.n_trials(), 2);
        assert_eq!(seq.first_onset_native_s(), 1.0);
    }

    #[test]
    fn probe_sequence_rejects_duplicate_pairs() {
        let err = ProbeSequence::new(vec![record(1, "att", 1.0), record(1, "att", 2.0)])
            .expect_err("duplicate pair");
        assert!(matches!(err, crate::error::SyncError::Schema { .. }));
    }

    #[test]
    fn probe_sequence_rejects_uneven_item_sets() {
        let err = ProbeSequence::new(vec![
            record(1, "att", 1.0),
            record(1, "aff", 2.0),
            record(2, "att", 10.0),
        ])
        .expect_err("uneven items");
        assert!(matches!(err, crate::error::SyncError::Schema { .. }));
    }

    #[test]
    fn probe_sequence_rejects_gap_in_trial_numbers() {
        let err = ProbeSequence::new(vec![record(1, "att", 1.0), record(3, "att", 10.0)])
            .expect_err("gap in trials");
        assert!(matches!(err, crate::error::SyncError::Schema { .. }));
    }
}
