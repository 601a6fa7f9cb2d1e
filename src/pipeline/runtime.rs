use crate::behav::cpt::{
    degraded_cpt_bioelectric, project_cpt_bioelectric, project_cpt_scanner, CptCapture,
    CptTimeline,
};
use crate::behav::wide::WideLog;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::markers::extractor::MarkerStream;
use crate::markers::reference::script_clock_reference;
use crate::pipeline::traits::{LogReshaper, ReferenceResolver, TimelineProjector};
use crate::types::{
    AlignedTimeline, ClockDomain, ClockReference, Diagnostic, ProbeSequence, RunId,
};

/// Per-domain output for one probe-task run. Degraded domains carry
/// NaN-filled tables; `diagnostics` says which and why.
#[derive(Debug)]
pub struct RunAlignment {
    pub bioelectric: AlignedTimeline,
    pub scanner: AlignedTimeline,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct CptRunAlignment {
    pub bioelectric: CptTimeline,
    pub scanner: CptTimeline,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct EventAligner {
    config: SyncConfig,
    reshaper: Box<dyn LogReshaper>,
    resolver: Box<dyn ReferenceResolver>,
    projector: Box<dyn TimelineProjector>,
}

pub(crate) struct EventAlignerParts {
    pub config: SyncConfig,
    pub reshaper: Box<dyn LogReshaper>,
    pub resolver: Box<dyn ReferenceResolver>,
    pub projector: Box<dyn TimelineProjector>,
}

impl EventAligner {
    pub(crate) fn from_parts(parts: EventAlignerParts) -> Self {
        Self {
            config: parts.config,
            reshaper: parts.reshaper,
            resolver: parts.resolver,
            projector: parts.projector,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Aligns one probe-task run against both clock domains.
    ///
    /// Schema and stream errors abort the unit; marker-resolution failures
    /// degrade the affected domain(s) and keep going. `script_start_s` is
    /// the script-embedded start timestamp, used as a surrogate scanner
    /// reference only when the stream has no candidate markers at all.
    pub fn align_probe_run(
        &self,
        run: &RunId,
        log: &WideLog,
        markers: Option<&MarkerStream>,
        script_start_s: Option<f64>,
    ) -> Result<RunAlignment, SyncError> {
        let sequence = self.reshaper.reshape(log)?;
        let mut diagnostics = Vec::new();

        let (bio_ref, scan_ref) = match markers {
            Some(stream) => match self.resolver.resolve(stream, &self.config) {
                Ok(refs) => {
                    if !refs.scanner.is_resolved() {
                        diagnostics.push(Diagnostic::new(
                            run,
                            ClockDomain::Scanner,
                            format!(
                                "acquisition-start pulse {:?} absent from annotation stream",
                                self.config.acquisition_start_code
                            ),
                            Vec::new(),
                        ));
                    }
                    (refs.bioelectric, refs.scanner)
                }
                Err(err) if err.is_marker_resolution() => {
                    self.degraded_references(run, &sequence, &err, script_start_s, &mut diagnostics)
                }
                Err(err) => return Err(err),
            },
            None => {
                let err = SyncError::NoCandidate {
                    candidates: Vec::new(),
                };
                self.degraded_references(run, &sequence, &err, script_start_s, &mut diagnostics)
            }
        };

        Ok(RunAlignment {
            bioelectric: self.projector.project(&sequence, &bio_ref),
            scanner: self.projector.project(&sequence, &scan_ref),
            diagnostics,
        })
    }

    /// Aligns one continuous-performance run. The scanner domain anchors on
    /// the script-embedded start time and never degrades; the bioelectric
    /// domain needs a resolvable task-onset marker.
    pub fn align_cpt_run(
        &self,
        run: &RunId,
        capture: &CptCapture,
        markers: Option<&MarkerStream>,
    ) -> Result<CptRunAlignment, SyncError> {
        let scanner = project_cpt_scanner(capture);
        let mut diagnostics = Vec::new();

        let bioelectric = match markers {
            Some(stream) => match project_cpt_bioelectric(capture, stream, &self.config) {
                Ok(timeline) => timeline,
                Err(err) if err.is_marker_resolution() => {
                    diagnostics.push(Diagnostic::new(
                        run,
                        ClockDomain::Bioelectric,
                        err.to_string(),
                        err.candidate_labels(),
                    ));
                    degraded_cpt_bioelectric(capture)
                }
                Err(err) => return Err(err),
            },
            None => {
                diagnostics.push(Diagnostic::new(
                    run,
                    ClockDomain::Bioelectric,
                    "no annotation stream provided",
                    Vec::new(),
                ));
                degraded_cpt_bioelectric(capture)
            }
        };

        Ok(CptRunAlignment {
            bioelectric,
            scanner,
            diagnostics,
        })
    }

    fn degraded_references(
        &self,
        run: &RunId,
        sequence: &ProbeSequence,
        err: &SyncError,
        script_start_s: Option<f64>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (ClockReference, ClockReference) {
        let reason = err.to_string();
        let candidates = err.candidate_labels();

        diagnostics.push(Diagnostic::new(
            run,
            ClockDomain::Bioelectric,
            reason.clone(),
            candidates.clone(),
        ));
        let bio_ref = ClockReference::unresolved(ClockDomain::Bioelectric);

        // The script-clock surrogate covers streams with no candidate
        // markers; ambiguity stays visible as a degraded domain instead.
        let total_absence = matches!(err, SyncError::NoCandidate { .. });
        let scan_ref = match script_start_s {
            Some(start_s) if total_absence => {
                tracing::warn!(
                    subject = %run.subject,
                    session = %run.session,
                    run = %run.run,
                    "falling back to script-embedded start time for scanner reference"
                );
                script_clock_reference(
                    sequence.first_onset_native_s(),
                    start_s,
                    self.config.stimulus_warmup_delay_s,
                )
            }
            _ => {
                diagnostics.push(Diagnostic::new(
                    run,
                    ClockDomain::Scanner,
                    reason,
                    candidates,
                ));
                ClockReference::unresolved(ClockDomain::Scanner)
            }
        };

        (bio_ref, scan_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::extractor::RawMarker;
    use crate::pipeline::builder::EventAlignerBuilder;
    use crate::types::ReferenceSource;

    const RATE: f64 = 5000.0;

    fn at(seconds: f64, code: &str) -> RawMarker {
        RawMarker::new((seconds * RATE) as u64, code)
    }

    fn probe_log() -> WideLog {
        WideLog::from_delimited(
            "att_onset,att_offset,att_RT,att_response\n30.0,32.0,1.0,4\n45.0,47.0,0.9,2\n",
            ',',
        )
        .expect("valid log")
    }

    fn run_id() -> RunId {
        RunId::new("001", "001", "001")
    }

    fn aligner() -> EventAligner {
        EventAlignerBuilder::new(SyncConfig::default()).build()
    }

    #[test]
    fn full_marker_stream_resolves_both_domains() {
        let stream = MarkerStream::from_raw(
            vec![
                at(1.0, "Response/T  1"),
                at(2.0, "Stimulus/S  1"),
                at(3.0, "Stimulus/S  1"),
            ],
            RATE,
            &SyncConfig::default(),
        )
        .expect("valid stream");
        let out = aligner()
            .align_probe_run(&run_id(), &probe_log(), Some(&stream), None)
            .expect("aligned");
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.bioelectric.rows[0].onset_s, 2.0);
        assert_eq!(out.scanner.rows[0].onset_s, 1.0);
    }

    #[test]
    fn ambiguous_labels_degrade_both_domains() {
        let stream = MarkerStream::from_raw(
            vec![
                at(1.0, "Response/T  1"),
                at(2.0, "Stimulus/S  1"),
                at(3.0, "Stimulus/S  1"),
                at(4.0, "Stimulus/S  2"),
                at(5.0, "Stimulus/S  2"),
            ],
            RATE,
            &SyncConfig::default(),
        )
        .expect("valid stream");
        let out = aligner()
            .align_probe_run(&run_id(), &probe_log(), Some(&stream), Some(10.0))
            .expect("aligned");
        assert!(out.bioelectric.is_degraded());
        assert!(out.scanner.is_degraded());
        assert_eq!(out.diagnostics.len(), 2);
        assert_eq!(out.diagnostics[0].candidate_labels.len(), 2);
    }

    #[test]
    fn marker_free_stream_falls_back_to_script_clock() {
        let stream = MarkerStream::from_raw(
            vec![at(1.0, "New Segment/")],
            RATE,
            &SyncConfig::default(),
        )
        .expect("valid stream");
        let out = aligner()
            .align_probe_run(&run_id(), &probe_log(), Some(&stream), Some(5.0))
            .expect("aligned");
        assert!(out.bioelectric.is_degraded());
        assert_eq!(out.scanner.source, ReferenceSource::ScriptClock);
        // first onset 30, start 5, warm-up 20 -> reference 5; shift 25.
        assert_eq!(out.scanner.rows[0].onset_s, 5.0);
        // Only the bioelectric domain is reported degraded.
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].domain, ClockDomain::Bioelectric);
    }

    #[test]
    fn schema_errors_abort_the_run() {
        let log = WideLog::from_delimited("att_onset,att_RT,att_response\n1.0,0.5,4\n", ',')
            .expect("constructible");
        let err = aligner()
            .align_probe_run(&run_id(), &log, None, None)
            .expect_err("schema failure");
        assert!(matches!(err, SyncError::Schema { .. }));
    }
}
