use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::types::{MarkerEvent, MarkerKind};

/// Marker as delivered by the recording reader: a sample index into the
/// bioelectric signal and the recorder's free-text code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMarker {
    pub sample_index: u64,
    pub code: String,
}

impl RawMarker {
    pub fn new(sample_index: u64, code: impl Into<String>) -> Self {
        Self {
            sample_index,
            code: code.into(),
        }
    }
}

/// Typed annotation stream for one recording. Events are classified once
/// here; nothing downstream matches on description text again.
#[derive(Debug, Clone)]
pub struct MarkerStream {
    events: Vec<MarkerEvent>,
    sampling_rate_hz: f64,
}

impl MarkerStream {
    pub fn from_raw(
        raw: Vec<RawMarker>,
        sampling_rate_hz: f64,
        config: &SyncConfig,
    ) -> Result<Self, SyncError> {
        if raw.is_empty() {
            return Err(SyncError::malformed_stream("annotation stream is empty"));
        }
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(SyncError::malformed_stream(format!(
                "non-positive sampling rate: {sampling_rate_hz}"
            )));
        }

        let mut events: Vec<MarkerEvent> = raw
            .into_iter()
            .map(|marker| {
                let kind = classify(&marker.code, config);
                MarkerEvent {
                    sample_index: marker.sample_index,
                    code: marker.code,
                    kind,
                }
            })
            .collect();
        events.sort_by_key(|event| event.sample_index);

        Ok(Self {
            events,
            sampling_rate_hz,
        })
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    pub fn events(&self) -> &[MarkerEvent] {
        &self.events
    }

    pub fn time_seconds(&self, sample_index: u64) -> f64 {
        sample_index as f64 / self.sampling_rate_hz
    }

    /// Distinct item-onset codes in first-appearance order.
    pub fn item_onset_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::new();
        for event in &self.events {
            if event.kind == MarkerKind::ItemOnset && !codes.contains(&event.code.as_str()) {
                codes.push(event.code.as_str());
            }
        }
        codes
    }

    /// Occurrence times of one code, in seconds, stream order.
    pub fn occurrence_times(&self, code: &str) -> Vec<f64> {
        self.events
            .iter()
            .filter(|event| event.code == code)
            .map(|event| self.time_seconds(event.sample_index))
            .collect()
    }

    /// Time of the first acquisition-start pulse, if the recorder saw one.
    pub fn acquisition_start_time(&self) -> Option<f64> {
        self.events
            .iter()
            .find(|event| event.kind == MarkerKind::AcquisitionStart)
            .map(|event| self.time_seconds(event.sample_index))
    }
}

fn classify(code: &str, config: &SyncConfig) -> MarkerKind {
    // Calibration codes also carry the content prefix, so they are ruled
    // out before the prefix test.
    if code.contains(&config.acquisition_start_code) {
        MarkerKind::AcquisitionStart
    } else if code.contains(&config.calibration_code) {
        MarkerKind::CalibrationPulse
    } else if code.contains(&config.item_code_prefix) {
        MarkerKind::ItemOnset
    } else {
        MarkerKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(raw: Vec<RawMarker>, rate: f64) -> Result<MarkerStream, SyncError> {
        MarkerStream::from_raw(raw, rate, &SyncConfig::default())
    }

    #[test]
    fn empty_stream_is_malformed() {
        let err = stream(vec![], 5000.0).expect_err("empty stream");
        assert!(matches!(err, SyncError::MalformedStream { .. }));
    }

    #[test]
    fn non_positive_rate_is_malformed() {
        let raw = vec![RawMarker::new(100, "Stimulus/S  1")];
        assert!(matches!(
            stream(raw.clone(), 0.0),
            Err(SyncError::MalformedStream { .. })
        ));
        assert!(matches!(
            stream(raw, -1.0),
            Err(SyncError::MalformedStream { .. })
        ));
    }

    #[test]
    fn classification_happens_at_ingestion() {
        let s = stream(
            vec![
                RawMarker::new(100, "Response/T  1"),
                RawMarker::new(200, "Stimulus/S255"),
                RawMarker::new(300, "Stimulus/S  1"),
                RawMarker::new(400, "New Segment/"),
            ],
            1000.0,
        )
        .expect("valid stream");

        let kinds: Vec<MarkerKind> = s.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MarkerKind::AcquisitionStart,
                MarkerKind::CalibrationPulse,
                MarkerKind::ItemOnset,
                MarkerKind::Unknown,
            ]
        );
    }

    #[test]
    fn sample_index_to_seconds() {
        let s = stream(vec![RawMarker::new(5000, "Response/T  1")], 5000.0).expect("valid");
        assert_eq!(s.time_seconds(5000), 1.0);
        assert_eq!(s.acquisition_start_time(), Some(1.0));
    }

    #[test]
    fn events_are_ordered_by_sample_index() {
        let s = stream(
            vec![
                RawMarker::new(900, "Stimulus/S  1"),
                RawMarker::new(100, "Stimulus/S  1"),
            ],
            1000.0,
        )
        .expect("valid");
        assert_eq!(s.occurrence_times("Stimulus/S  1"), vec![0.1, 0.9]);
    }
}
