use std::cmp::Ordering;

use crate::types::{AlignedRow, AlignedTimeline, ClockReference, ProbeSequence};

/// Reprojects a probe sequence onto one clock domain.
///
/// A single scalar shift maps the behavioral script's clock onto the
/// domain: the first trial's first item lands on the domain's reference
/// time and everything else keeps its native spacing. An unresolved
/// reference still yields a full table with every onset/offset NaN, rows
/// ordered by trial alone since an onset sort is impossible.
pub fn project(sequence: &ProbeSequence, reference: &ClockReference) -> AlignedTimeline {
    let mut rows: Vec<AlignedRow> = if reference.is_resolved() {
        let shift = sequence.first_onset_native_s() - reference.reference_time_s;
        sequence
            .records()
            .iter()
            .map(|record| {
                let onset = record.onset_native_s - shift;
                AlignedRow {
                    onset_s: onset,
                    duration_s: record.duration_s,
                    offset_s: onset + record.duration_s,
                    trial: record.trial,
                    item: record.item.clone(),
                    response: record.response.clone(),
                    response_time_s: record.response_time_s,
                }
            })
            .collect()
    } else {
        sequence
            .records()
            .iter()
            .map(|record| AlignedRow {
                onset_s: f64::NAN,
                duration_s: record.duration_s,
                offset_s: f64::NAN,
                trial: record.trial,
                item: record.item.clone(),
                response: record.response.clone(),
                response_time_s: record.response_time_s,
            })
            .collect()
    };

    if reference.is_resolved() {
        rows.sort_by(|a, b| {
            a.trial.cmp(&b.trial).then_with(|| {
                a.onset_s
                    .partial_cmp(&b.onset_s)
                    .unwrap_or(Ordering::Equal)
            })
        });
    } else {
        rows.sort_by_key(|row| row.trial);
    }

    AlignedTimeline {
        domain: reference.domain,
        source: reference.source,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClockDomain, ReferenceSource, TrialRecord};

    fn sequence() -> ProbeSequence {
        let record = |trial: u32, item: &str, onset: f64| TrialRecord {
            trial,
            item: item.to_string(),
            onset_native_s: onset,
            offset_native_s: onset + 2.0,
            duration_s: 2.0,
            response: "1".to_string(),
            response_time_s: 0.5,
        };
        ProbeSequence::new(vec![
            record(1, "aff", 30.0),
            record(1, "att", 33.0),
            record(2, "aff", 60.0),
            record(2, "att", 63.0),
        ])
        .expect("valid sequence")
    }

    fn resolved(time_s: f64) -> ClockReference {
        ClockReference {
            domain: ClockDomain::Bioelectric,
            reference_time_s: time_s,
            source: ReferenceSource::AnnotationMarkers,
        }
    }

    #[test]
    fn first_item_lands_on_the_reference() {
        let timeline = project(&sequence(), &resolved(12.0));
        assert_eq!(timeline.rows[0].onset_s, 12.0);
        assert_eq!(timeline.rows[0].offset_s, 14.0);
        // Native spacing is preserved.
        assert_eq!(timeline.rows[1].onset_s, 15.0);
        assert_eq!(timeline.rows[2].onset_s, 42.0);
    }

    #[test]
    fn unresolved_reference_yields_nan_rows_in_trial_order() {
        let timeline = project(&sequence(), &ClockReference::unresolved(ClockDomain::Scanner));
        assert_eq!(timeline.rows.len(), 4);
        assert!(timeline.rows.iter().all(|row| row.onset_s.is_nan()));
        assert!(timeline.rows.iter().all(|row| row.offset_s.is_nan()));
        assert!(timeline.is_degraded());
        let trials: Vec<u32> = timeline.rows.iter().map(|row| row.trial).collect();
        assert_eq!(trials, vec![1, 1, 2, 2]);
        // Behavioral content survives degradation.
        assert_eq!(timeline.rows[0].response, "1");
    }

    #[test]
    fn shift_between_two_domains_is_constant() {
        let bio = project(&sequence(), &resolved(12.0));
        let scan = project(
            &sequence(),
            &ClockReference {
                domain: ClockDomain::Scanner,
                reference_time_s: 4.5,
                source: ReferenceSource::AnnotationMarkers,
            },
        );
        for (a, b) in bio.rows.iter().zip(scan.rows.iter()) {
            assert!(((a.onset_s - b.onset_s) - 7.5).abs() < 1e-9);
        }
    }
}
