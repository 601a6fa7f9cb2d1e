use std::cmp::Ordering;
use std::collections::HashSet;

use crate::behav::wide::{parse_cell_f64, WideLog};
use crate::error::SyncError;
use crate::types::{ProbeSequence, TrialRecord};

/// Declared unpack plan for one wide log: the item set and, per item, the
/// exact column carrying each metric. Looking columns up by full name
/// keeps items containing the separator character from misparsing.
#[derive(Debug, Clone)]
pub struct ItemSchema {
    items: Vec<ItemColumns>,
}

#[derive(Debug, Clone)]
struct ItemColumns {
    item: String,
    onset: usize,
    offset: usize,
    response_time: usize,
    response: usize,
}

impl ItemSchema {
    /// Items are declared by their response column: either `<item>_response`
    /// or a bare `<item>` column (the capture scripts emit bare names for
    /// the response metric only).
    pub fn from_log(log: &WideLog) -> Result<Self, SyncError> {
        let mut seen = HashSet::new();
        for column in log.columns() {
            if !seen.insert(column.as_str()) {
                return Err(SyncError::schema(format!("duplicate column {column:?}")));
            }
        }

        let mut items = Vec::new();
        for column in log.columns() {
            let item = match column.rsplit_once('_') {
                Some((item, "response")) => item.to_string(),
                Some(_) => continue,
                None => column.clone(),
            };
            let response = log
                .column_index(&format!("{item}_response"))
                .or_else(|| log.column_index(&item))
                .ok_or_else(|| SyncError::schema(format!("no response column for {item:?}")))?;
            items.push(ItemColumns {
                onset: require_column(log, &item, "onset")?,
                offset: require_column(log, &item, "offset")?,
                response_time: require_column(log, &item, "RT")?,
                response,
                item,
            });
        }

        if items.is_empty() {
            return Err(SyncError::schema(
                "no items declared: expected `<item>_response` or bare item columns",
            ));
        }
        Ok(Self { items })
    }

    pub fn item_names(&self) -> Vec<&str> {
        self.items.iter().map(|entry| entry.item.as_str()).collect()
    }
}

fn require_column(log: &WideLog, item: &str, metric: &str) -> Result<usize, SyncError> {
    let name = format!("{item}_{metric}");
    log.column_index(&name)
        .ok_or_else(|| SyncError::schema(format!("missing column {name:?}")))
}

/// Wide → long unpack. Trial ids are 1-based row positions; `duration =
/// offset − onset`; output is sorted by (trial, native onset), the order
/// downstream treats as the canonical within-trial item order.
pub fn reshape(log: &WideLog) -> Result<ProbeSequence, SyncError> {
    let schema = ItemSchema::from_log(log)?;

    let mut records = Vec::with_capacity(log.n_rows() * schema.items.len());
    for row in 0..log.n_rows() {
        let trial = (row + 1) as u32;
        for entry in &schema.items {
            let onset = parse_cell_f64(
                log.cell(row, entry.onset),
                &format!("{}_onset, trial {trial}", entry.item),
            )?;
            let offset = parse_cell_f64(
                log.cell(row, entry.offset),
                &format!("{}_offset, trial {trial}", entry.item),
            )?;
            let response_time = parse_cell_f64(
                log.cell(row, entry.response_time),
                &format!("{}_RT, trial {trial}", entry.item),
            )?;
            records.push(TrialRecord {
                trial,
                item: entry.item.clone(),
                onset_native_s: onset,
                offset_native_s: offset,
                duration_s: offset - onset,
                response: log.cell(row, entry.response).to_string(),
                response_time_s: response_time,
            });
        }
    }

    records.sort_by(|a, b| {
        a.trial.cmp(&b.trial).then_with(|| {
            a.onset_native_s
                .partial_cmp(&b.onset_native_s)
                .unwrap_or(Ordering::Equal)
        })
    });

    ProbeSequence::new(records)
}
