use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("malformed marker stream: {message}")]
    MalformedStream { message: String },
    #[error("behavioral log schema error: {message}")]
    Schema { message: String },
    #[error("no item-onset candidate among marker codes {candidates:?}")]
    NoCandidate { candidates: Vec<String> },
    #[error("multiple recurring item-onset codes, refusing to guess: {candidates:?}")]
    AmbiguousLabel { candidates: Vec<String> },
    #[error("cannot identify first trial onset: gaps {gaps_s:?}s never fall below {threshold_s}s")]
    FirstEventAmbiguous { gaps_s: Vec<f64>, threshold_s: f64 },
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl SyncError {
    pub(crate) fn malformed_stream(message: impl Into<String>) -> Self {
        Self::MalformedStream {
            message: message.into(),
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    /// True for failures the degradation handler converts into NaN output
    /// for the affected clock domain instead of aborting the run.
    pub fn is_marker_resolution(&self) -> bool {
        matches!(
            self,
            Self::NoCandidate { .. }
                | Self::AmbiguousLabel { .. }
                | Self::FirstEventAmbiguous { .. }
        )
    }

    /// Candidate labels carried by the failure, for diagnostics.
    pub fn candidate_labels(&self) -> Vec<String> {
        match self {
            Self::NoCandidate { candidates } | Self::AmbiguousLabel { candidates } => {
                candidates.clone()
            }
            _ => Vec::new(),
        }
    }
}
