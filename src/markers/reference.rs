use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::markers::extractor::MarkerStream;
use crate::markers::label::{first_trial_onset, select_item_code};
use crate::types::{ClockDomain, ClockReference, ReferenceSource};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainReferences {
    pub bioelectric: ClockReference,
    pub scanner: ClockReference,
}

/// Resolves both clock references from the bioelectric annotation stream.
///
/// The bioelectric reference is the first real item onset. The scanner
/// records no item-level markers, so its reference is expressed through the
/// bioelectric stream: first item onset minus acquisition-start pulse. A
/// missing pulse degrades only the scanner domain.
pub fn resolve_marker_references(
    stream: &MarkerStream,
    config: &SyncConfig,
) -> Result<DomainReferences, SyncError> {
    let code = select_item_code(stream)?;
    let first_item = first_trial_onset(stream, code, config.first_trial_max_gap_s)?;

    let bioelectric = ClockReference {
        domain: ClockDomain::Bioelectric,
        reference_time_s: first_item.time_s,
        source: ReferenceSource::AnnotationMarkers,
    };

    let scanner = match stream.acquisition_start_time() {
        Some(pulse_s) => ClockReference {
            domain: ClockDomain::Scanner,
            reference_time_s: first_item.time_s - pulse_s,
            source: ReferenceSource::AnnotationMarkers,
        },
        None => {
            tracing::warn!(
                code = %config.acquisition_start_code,
                "acquisition-start pulse absent from annotation stream; scanner reference unresolved"
            );
            ClockReference::unresolved(ClockDomain::Scanner)
        }
    };

    Ok(DomainReferences {
        bioelectric,
        scanner,
    })
}

/// Surrogate scanner reference from the script-embedded start timestamp,
/// used when the annotation stream carries no usable markers. The scanner
/// nominally starts `warmup_delay_s` after the script clock's start field.
pub fn script_clock_reference(
    first_onset_native_s: f64,
    script_start_s: f64,
    warmup_delay_s: f64,
) -> ClockReference {
    ClockReference {
        domain: ClockDomain::Scanner,
        reference_time_s: first_onset_native_s - script_start_s - warmup_delay_s,
        source: ReferenceSource::ScriptClock,
    }
}
