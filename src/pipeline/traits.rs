use crate::behav::wide::WideLog;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::markers::extractor::MarkerStream;
use crate::markers::reference::DomainReferences;
use crate::types::{AlignedTimeline, ClockReference, ProbeSequence};

pub trait LogReshaper: Send + Sync {
    fn reshape(&self, log: &WideLog) -> Result<ProbeSequence, SyncError>;
}

pub trait ReferenceResolver: Send + Sync {
    fn resolve(
        &self,
        stream: &MarkerStream,
        config: &SyncConfig,
    ) -> Result<DomainReferences, SyncError>;
}

pub trait TimelineProjector: Send + Sync {
    fn project(&self, sequence: &ProbeSequence, reference: &ClockReference) -> AlignedTimeline;
}
