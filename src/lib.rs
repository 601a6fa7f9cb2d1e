pub mod behav;
pub mod config;
pub mod error;
pub mod markers;
pub mod output;
pub mod pipeline;
pub mod timeline;
pub mod types;

pub use behav::cpt::{CptCapture, CptTimeline, CptTrial};
pub use behav::wide::WideLog;
pub use config::SyncConfig;
pub use error::SyncError;
pub use markers::extractor::{MarkerStream, RawMarker};
pub use output::table::EventTable;
pub use output::writer::{ConversionLog, WriteOutcome};
pub use pipeline::builder::EventAlignerBuilder;
pub use pipeline::runtime::{CptRunAlignment, EventAligner, RunAlignment};
pub use pipeline::traits::{LogReshaper, ReferenceResolver, TimelineProjector};
pub use types::{
    AlignedRow, AlignedTimeline, ClockDomain, ClockReference, Diagnostic, MarkerEvent, MarkerKind,
    ProbeSequence, ReferenceSource, RunId, TrialRecord,
};
