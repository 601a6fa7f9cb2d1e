use crate::error::SyncError;
use crate::markers::extractor::MarkerStream;

/// Occurrences examined when picking the first real trial onset; later
/// occurrences can only be ordinary trials.
const FIRST_ONSET_LOOKAHEAD: usize = 3;

/// The item-onset code actually used on every trial, as opposed to spurious
/// one-off markers sharing the content prefix.
///
/// A single candidate wins outright. With several, only codes recurring
/// more than once stay in play (the true marker fires on every trial); if
/// more than one survives, the ambiguity is surfaced rather than guessed.
pub fn select_item_code<'a>(stream: &'a MarkerStream) -> Result<&'a str, SyncError> {
    let candidates = stream.item_onset_codes();
    match candidates.len() {
        0 => Err(SyncError::NoCandidate {
            candidates: Vec::new(),
        }),
        1 => Ok(candidates[0]),
        _ => {
            let recurring: Vec<&str> = candidates
                .iter()
                .copied()
                .filter(|code| stream.occurrence_times(code).len() > 1)
                .collect();
            match recurring.len() {
                1 => Ok(recurring[0]),
                0 => Err(SyncError::NoCandidate {
                    candidates: candidates.iter().map(|c| c.to_string()).collect(),
                }),
                _ => Err(SyncError::AmbiguousLabel {
                    candidates: recurring.iter().map(|c| c.to_string()).collect(),
                }),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstOnset {
    pub time_s: f64,
    /// Which occurrence of the code was accepted (0 or 1).
    pub occurrence: usize,
}

/// Picks which occurrence of `code` is the first real trial onset.
///
/// The first occurrence can be a calibration or fixation firing; a genuine
/// trial is followed by the next one within `max_gap_s`. If neither the
/// first nor the second occurrence passes the gap test, the stream is too
/// ambiguous to anchor on.
pub fn first_trial_onset(
    stream: &MarkerStream,
    code: &str,
    max_gap_s: f64,
) -> Result<FirstOnset, SyncError> {
    let times: Vec<f64> = stream
        .occurrence_times(code)
        .into_iter()
        .take(FIRST_ONSET_LOOKAHEAD)
        .collect();
    let gaps: Vec<f64> = times.windows(2).map(|pair| pair[1] - pair[0]).collect();

    if gaps.is_empty() {
        return Err(SyncError::FirstEventAmbiguous {
            gaps_s: gaps,
            threshold_s: max_gap_s,
        });
    }
    if gaps[0] < max_gap_s {
        return Ok(FirstOnset {
            time_s: times[0],
            occurrence: 0,
        });
    }
    if gaps.len() > 1 && gaps[1] < max_gap_s {
        return Ok(FirstOnset {
            time_s: times[1],
            occurrence: 1,
        });
    }
    Err(SyncError::FirstEventAmbiguous {
        gaps_s: gaps,
        threshold_s: max_gap_s,
    })
}
