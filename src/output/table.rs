use std::fmt::Write as _;

use crate::behav::cpt::CptTimeline;
use crate::types::AlignedTimeline;

pub const PROBE_COLUMNS: [&str; 7] = [
    "onset",
    "duration",
    "offset",
    "trial",
    "item",
    "response",
    "response_time",
];

pub const CPT_COLUMNS: [&str; 7] = [
    "onset",
    "duration",
    "cue",
    "timestamp",
    "stimulus_coherence",
    "response_time",
    "response",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Num(f64),
    Int(i64),
    Text(String),
}

/// Delimited event table ready for a writer. Row order is whatever the
/// projector produced; nothing here re-sorts.
#[derive(Debug, Clone)]
pub struct EventTable {
    columns: &'static [&'static str],
    rows: Vec<Vec<Cell>>,
}

impl EventTable {
    pub fn from_probe(timeline: &AlignedTimeline) -> Self {
        let rows = timeline
            .rows
            .iter()
            .map(|row| {
                vec![
                    Cell::Num(row.onset_s),
                    Cell::Num(row.duration_s),
                    Cell::Num(row.offset_s),
                    Cell::Int(row.trial as i64),
                    Cell::Text(row.item.clone()),
                    Cell::Text(row.response.clone()),
                    Cell::Num(row.response_time_s),
                ]
            })
            .collect();
        Self {
            columns: &PROBE_COLUMNS,
            rows,
        }
    }

    pub fn from_cpt(timeline: &CptTimeline) -> Self {
        let rows = timeline
            .rows
            .iter()
            .map(|row| {
                vec![
                    Cell::Num(row.onset_s),
                    Cell::Num(row.duration_s),
                    Cell::Num(row.cue),
                    Cell::Num(row.timestamp_s),
                    Cell::Num(row.stimulus_coherence),
                    Cell::Num(row.response_time_s),
                    Cell::Num(row.response),
                ]
            })
            .collect();
        Self {
            columns: &CPT_COLUMNS,
            rows,
        }
    }

    pub fn columns(&self) -> &[&'static str] {
        self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Tab-separated rendering with a header line; NaN renders as `n/a`.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.columns.join("\t"));
        out.push('\n');
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                if idx > 0 {
                    out.push('\t');
                }
                match cell {
                    Cell::Num(value) if value.is_nan() => out.push_str("n/a"),
                    Cell::Num(value) => {
                        let _ = write!(out, "{value}");
                    }
                    Cell::Int(value) => {
                        let _ = write!(out, "{value}");
                    }
                    Cell::Text(value) if value.is_empty() => out.push_str("n/a"),
                    Cell::Text(value) => out.push_str(value),
                }
            }
            out.push('\n');
        }
        out
    }
}
