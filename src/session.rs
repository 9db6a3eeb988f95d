//! Session-scoped ledger state: the active row list, the one-time store
//! snapshot, and the per-cycle operations a front end drives.

use crate::calculator::{effective_assistance, grand_total, subtotal};
use crate::error::{LedgerError, Result};
use crate::reconcile::{
    archive_all, delete_row_by_id, load_active_rows, upsert_row, DeleteOutcome, UpsertOutcome,
};
use crate::schema::{LedgerRow, Surgery, MAX_CARTRIDGES};
use crate::store::{SheetSnapshot, SheetStore};
use chrono::NaiveDate;
use log::{debug, info, warn};

/// One row's worth of user input, as collected by the entry form each
/// evaluation cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowInput {
    pub cartridges: u8,
    pub helped_by_me: Surgery,
    pub helped_me: Surgery,
    pub co_payment: bool,
}

impl RowInput {
    fn validate(&self) -> Result<()> {
        if self.cartridges > MAX_CARTRIDGES {
            return Err(LedgerError::CartridgeCountOutOfRange(self.cartridges));
        }
        Ok(())
    }
}

/// All mutable state for one interactive session.
///
/// Owned exclusively by the session; nothing here is shared across sessions
/// or persisted on drop. The snapshot is taken once at [`LedgerSession::start`]
/// and reused by every upsert until the session ends.
pub struct LedgerSession {
    rows: Vec<LedgerRow>,
    snapshot: SheetSnapshot,
    /// Index marked by the UI for removal on the next cycle.
    pending_removal: Option<usize>,
    /// Ids created this session, so the UI can highlight them. Transient.
    newly_added: Vec<String>,
}

impl LedgerSession {
    /// Open a session: take the one-time snapshot and load the active set.
    ///
    /// A store that cannot be read degrades to an empty snapshot and an empty
    /// ledger rather than failing the session.
    pub fn start(store: &dyn SheetStore) -> Self {
        let snapshot = match store.read_all() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("could not snapshot ledger sheet: {}", err);
                SheetSnapshot::empty()
            }
        };

        let rows = load_active_rows(store);
        info!(
            "ledger session started with {} active rows ({} snapshot rows)",
            rows.len(),
            snapshot.rows.len()
        );

        LedgerSession {
            rows,
            snapshot,
            pending_removal: None,
            newly_added: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The snapshot every upsert in this session matches against.
    pub fn snapshot(&self) -> &SheetSnapshot {
        &self.snapshot
    }

    /// Ids added during this session, in creation order.
    pub fn newly_added(&self) -> &[String] {
        &self.newly_added
    }

    /// Append a fresh row dated today. Returns its index.
    pub fn add_row(&mut self) -> usize {
        self.add_row_on(chrono::Local::now().date_naive())
    }

    /// Append a fresh row with an explicit creation date. Returns its index.
    pub fn add_row_on(&mut self, date: NaiveDate) -> usize {
        let row = LedgerRow::new(date);
        debug!("added ledger row {}", row.id);
        self.newly_added.push(row.id.clone());
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Run one evaluation cycle for one row: enforce the assistance
    /// exclusivity, recompute the subtotal, update memory, and persist via
    /// upsert against the session snapshot. Returns the new subtotal.
    pub fn apply_input(
        &mut self,
        store: &mut dyn SheetStore,
        index: usize,
        input: RowInput,
    ) -> Result<i64> {
        input.validate()?;
        let row = self
            .rows
            .get_mut(index)
            .ok_or(LedgerError::RowIndexOutOfRange(index))?;

        let (helped_by_me, helped_me) =
            effective_assistance(input.helped_by_me, input.helped_me);

        row.cartridges = input.cartridges;
        row.helped_by_me = helped_by_me;
        row.helped_me = helped_me;
        row.co_payment = input.co_payment;
        row.subtotal = subtotal(input.cartridges, helped_by_me, helped_me, input.co_payment);
        row.saved = true;
        row.archived = false;

        let row = self.rows[index].clone();
        match upsert_row(store, &self.snapshot, &row)? {
            UpsertOutcome::Updated(position) => {
                debug!("row {} updated in place at data row {}", row.id, position)
            }
            UpsertOutcome::Appended => debug!("row {} appended to sheet", row.id),
        }

        Ok(row.subtotal)
    }

    /// Mark a row for removal on the next cycle. The UI sets this from a
    /// per-row button; [`Self::remove_pending`] consumes it.
    pub fn mark_for_removal(&mut self, index: usize) {
        self.pending_removal = Some(index);
    }

    pub fn pending_removal(&self) -> Option<usize> {
        self.pending_removal
    }

    /// Consume the pending-removal marker, if any, and hard-delete that row.
    /// An out-of-range marker is cleared without effect.
    pub fn remove_pending(&mut self, store: &mut dyn SheetStore) -> Result<Option<LedgerRow>> {
        let Some(index) = self.pending_removal.take() else {
            return Ok(None);
        };
        if index >= self.rows.len() {
            return Ok(None);
        }
        self.remove_row(store, index).map(Some)
    }

    /// Hard-delete one row: remove it from the store (live read, by id) and
    /// from the in-memory ledger. Returns the removed row.
    pub fn remove_row(&mut self, store: &mut dyn SheetStore, index: usize) -> Result<LedgerRow> {
        let id = self
            .rows
            .get(index)
            .map(|row| row.id.clone())
            .ok_or(LedgerError::RowIndexOutOfRange(index))?;

        match delete_row_by_id(store, &id)? {
            DeleteOutcome::Deleted(position) => {
                debug!("row {} deleted from data row {}", id, position)
            }
            DeleteOutcome::NotFound => debug!("row {} had no persisted record", id),
        }

        Ok(self.rows.remove(index))
    }

    /// Archive every persisted row and clear the in-memory ledger and all
    /// transient markers. The store keeps the rows as history. Returns how
    /// many rows were newly flagged.
    pub fn reset_all(&mut self, store: &mut dyn SheetStore) -> Result<usize> {
        let flagged = archive_all(store)?;
        info!(
            "ledger reset: {} rows archived, {} in-memory rows dropped",
            flagged,
            self.rows.len()
        );

        self.rows.clear();
        self.pending_removal = None;
        self.newly_added.clear();
        Ok(flagged)
    }

    /// Sum of all active rows' subtotals, recomputed on every call.
    pub fn grand_total(&self) -> i64 {
        grand_total(&self.rows)
    }
}
