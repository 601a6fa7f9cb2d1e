use crate::error::SyncError;

/// Wide-format behavioral log: one row per trial, one column per
/// item×metric. Cells stay raw strings until the reshaper interprets them.
#[derive(Debug, Clone)]
pub struct WideLog {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl WideLog {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, SyncError> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SyncError::schema(format!(
                    "row {} has {} cells, header has {} columns",
                    idx + 1,
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parses delimited text with a header line. Quoting is not handled;
    /// the capture scripts never emit quoted cells.
    pub fn from_delimited(text: &str, delimiter: char) -> Result<Self, SyncError> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| SyncError::schema("behavioral log is empty"))?;
        let columns: Vec<String> = header
            .split(delimiter)
            .map(|name| name.trim().to_string())
            .collect();
        let rows: Vec<Vec<String>> = lines
            .map(|line| {
                line.split(delimiter)
                    .map(|cell| cell.trim().to_string())
                    .collect()
            })
            .collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }
}

/// Missing cells come through as empty or `n/a`; both read as NaN, the way
/// the capture scripts leave unanswered probes blank.
pub(crate) fn parse_cell_f64(raw: &str, context: &str) -> Result<f64, SyncError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") || trimmed.eq_ignore_ascii_case("nan")
    {
        return Ok(f64::NAN);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| SyncError::schema(format!("non-numeric value {raw:?} in {context}")))
}
