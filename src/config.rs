/// Alignment parameters that were buried literals in earlier pipelines.
/// All durations are seconds; marker codes are matched as substrings of
/// the recorder's free-text annotation descriptions.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Code embedded by the scanner trigger line on acquisition start.
    pub acquisition_start_code: String,
    /// Reserved high-value calibration code, excluded from item candidates.
    pub calibration_code: String,
    /// Prefix shared by stimulus/content markers.
    pub item_code_prefix: String,
    /// A first-occurrence gap below this is a genuine inter-trial interval;
    /// calibration and fixation intervals run longer.
    pub first_trial_max_gap_s: f64,
    /// Nominal delay between task onset and the first stimulus, used for the
    /// continuous task and for the script-clock surrogate reference.
    pub stimulus_warmup_delay_s: f64,
}

impl SyncConfig {
    pub const DEFAULT_FIRST_TRIAL_MAX_GAP_S: f64 = 12.5;
    pub const DEFAULT_STIMULUS_WARMUP_DELAY_S: f64 = 20.0;
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            acquisition_start_code: "T  1".to_string(),
            calibration_code: "S255".to_string(),
            item_code_prefix: "Stimulus".to_string(),
            first_trial_max_gap_s: Self::DEFAULT_FIRST_TRIAL_MAX_GAP_S,
            stimulus_warmup_delay_s: Self::DEFAULT_STIMULUS_WARMUP_DELAY_S,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_config_default() {
        let config = SyncConfig::default();
        assert_eq!(config.acquisition_start_code, "T  1");
        assert_eq!(config.calibration_code, "S255");
        assert_eq!(config.item_code_prefix, "Stimulus");
        assert_eq!(config.first_trial_max_gap_s, 12.5);
        assert_eq!(config.stimulus_warmup_delay_s, 20.0);
    }
}
