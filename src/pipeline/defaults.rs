use crate::behav::reshape;
use crate::behav::wide::WideLog;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::markers::extractor::MarkerStream;
use crate::markers::reference::{resolve_marker_references, DomainReferences};
use crate::pipeline::traits::{LogReshaper, ReferenceResolver, TimelineProjector};
use crate::timeline;
use crate::types::{AlignedTimeline, ClockReference, ProbeSequence};

pub struct SchemaReshaper;

impl LogReshaper for SchemaReshaper {
    fn reshape(&self, log: &WideLog) -> Result<ProbeSequence, SyncError> {
        reshape::reshape(log)
    }
}

pub struct MarkerReferenceResolver;

impl ReferenceResolver for MarkerReferenceResolver {
    fn resolve(
        &self,
        stream: &MarkerStream,
        config: &SyncConfig,
    ) -> Result<DomainReferences, SyncError> {
        resolve_marker_references(stream, config)
    }
}

pub struct ShiftProjector;

impl TimelineProjector for ShiftProjector {
    fn project(&self, sequence: &ProbeSequence, reference: &ClockReference) -> AlignedTimeline {
        timeline::project(sequence, reference)
    }
}
