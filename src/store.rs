//! The tabular store the ledger persists into, seen through a narrow gateway
//! trait so the reconciliation core runs identically against a remote
//! spreadsheet or an in-memory grid.

use crate::error::Result;

/// A point-in-time read of the store: the header row plus every data row.
///
/// Taken once at session start and reused across upserts without re-reading;
/// see [`crate::reconcile`] for the consequences of that choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetSnapshot {
    pub fn empty() -> Self {
        SheetSnapshot::default()
    }

    /// Index of a named column in the header row, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}

/// Gateway to the persisted tabular store.
///
/// Row indices are 0-based over data rows; the header row is not addressable.
/// All calls are synchronous and complete before the evaluation cycle
/// continues. The trait offers no locking or optimistic-concurrency tokens:
/// two sessions writing the same sheet can race, which is accepted for a
/// single-user tool.
pub trait SheetStore {
    /// Read the full sheet: header row plus all data rows.
    fn read_all(&self) -> Result<SheetSnapshot>;

    /// Append a new data row after the last existing one.
    fn append_row(&mut self, values: &[String]) -> Result<()>;

    /// Overwrite one data row in place, starting at the first column.
    fn update_row(&mut self, data_index: usize, values: &[String]) -> Result<()>;

    /// Physically remove one data row, shifting later rows up.
    fn delete_data_row(&mut self, data_index: usize) -> Result<()>;

    /// Overwrite a single cell of one data row.
    fn set_cell(&mut self, data_index: usize, col_index: usize, value: &str) -> Result<()>;
}

/// Plain in-memory sheet. Backs the test suite and offline use; it is also
/// the reference semantics the remote client is expected to match.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MemorySheet {
    /// A sheet with no header row at all (a freshly created, never-written
    /// worksheet).
    pub fn new() -> Self {
        MemorySheet::default()
    }

    pub fn with_headers(headers: &[&str]) -> Self {
        MemorySheet {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Seed a data row directly, bypassing the gateway. Test setup helper.
    pub fn push_raw_row(&mut self, values: &[&str]) {
        self.rows.push(values.iter().map(|v| v.to_string()).collect());
    }
}

impl SheetStore for MemorySheet {
    fn read_all(&self) -> Result<SheetSnapshot> {
        Ok(SheetSnapshot {
            headers: self.headers.clone(),
            rows: self.rows.clone(),
        })
    }

    fn append_row(&mut self, values: &[String]) -> Result<()> {
        self.rows.push(values.to_vec());
        Ok(())
    }

    fn update_row(&mut self, data_index: usize, values: &[String]) -> Result<()> {
        if let Some(row) = self.rows.get_mut(data_index) {
            for (col, value) in values.iter().enumerate() {
                if col < row.len() {
                    row[col] = value.clone();
                } else {
                    row.push(value.clone());
                }
            }
        }
        Ok(())
    }

    fn delete_data_row(&mut self, data_index: usize) -> Result<()> {
        if data_index < self.rows.len() {
            self.rows.remove(data_index);
        }
        Ok(())
    }

    fn set_cell(&mut self, data_index: usize, col_index: usize, value: &str) -> Result<()> {
        if let Some(row) = self.rows.get_mut(data_index) {
            while row.len() <= col_index {
                row.push(String::new());
            }
            row[col_index] = value.to_string();
        }
        Ok(())
    }
}
