//! Reconciliation between the in-memory ledger and the persisted store:
//! upsert-by-identifier, delete-by-identifier, bulk archival, and the
//! active-set loader.
//!
//! Read discipline is deliberately asymmetric. [`upsert_row`] matches against
//! a caller-supplied snapshot taken once at session start, while
//! [`delete_row_by_id`] and [`archive_all`] re-read the store so a row
//! appended after the snapshot cannot cause the wrong position to be touched.
//! Do not "fix" one side to match the other without a product decision.

use crate::error::Result;
use crate::schema::{columns, LedgerRow, ARCHIVED_SENTINEL, CANONICAL_HEADERS};
use crate::store::{SheetSnapshot, SheetStore};
use log::{debug, warn};

/// What an upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// An existing record with the same id was overwritten at this data-row
    /// position.
    Updated(usize),
    /// No record matched; the row was appended at the end.
    Appended,
}

/// What a delete did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The first record with the matching id was removed from this position.
    Deleted(usize),
    /// The store was empty, had no id column, or held no matching record.
    NotFound,
}

/// Insert-or-update one row, keyed by its identifier.
///
/// The match runs against `snapshot`, not the live store. When the snapshot
/// has no id column the store degrades to append-only. On a match the record
/// is overwritten in place with cells ordered to the snapshot's header row
/// (absent fields as empty string); first match wins. Otherwise the row is
/// appended in canonical column order.
///
/// Because the snapshot is never refreshed, a row appended earlier in the
/// same session is invisible here: upserting it again appends a second record
/// with the same id. Known hazard, kept for compatibility with the data
/// already in the field.
pub fn upsert_row(
    store: &mut dyn SheetStore,
    snapshot: &SheetSnapshot,
    row: &LedgerRow,
) -> Result<UpsertOutcome> {
    let Some(id_idx) = snapshot.column_index(columns::ID) else {
        debug!("sheet has no id column; appending row {} blind", row.id);
        store.append_row(&row.canonical_cells())?;
        return Ok(UpsertOutcome::Appended);
    };

    for (position, cells) in snapshot.rows.iter().enumerate() {
        if cells.get(id_idx).is_some_and(|cell| *cell == row.id) {
            store.update_row(position, &row.to_cells(&snapshot.headers))?;
            return Ok(UpsertOutcome::Updated(position));
        }
    }

    store.append_row(&row.canonical_cells())?;
    Ok(UpsertOutcome::Appended)
}

/// Hard-delete the first record whose id matches.
///
/// Reads the store fresh, so rows appended after the session snapshot are
/// still found at their true positions. No-op when the store is empty, lacks
/// an id column, or holds no match.
pub fn delete_row_by_id(store: &mut dyn SheetStore, id: &str) -> Result<DeleteOutcome> {
    let sheet = store.read_all()?;
    if sheet.is_empty() {
        return Ok(DeleteOutcome::NotFound);
    }

    let Some(id_idx) = sheet.column_index(columns::ID) else {
        debug!("sheet has no id column; nothing to delete");
        return Ok(DeleteOutcome::NotFound);
    };

    for (position, cells) in sheet.rows.iter().enumerate() {
        if cells.get(id_idx).is_some_and(|cell| cell == id) {
            store.delete_data_row(position)?;
            return Ok(DeleteOutcome::Deleted(position));
        }
    }

    Ok(DeleteOutcome::NotFound)
}

/// Flag every live record as archived, in place.
///
/// Reads fresh, then flips the archive cell of each row not already flagged.
/// Rows are never removed — only hidden from future active-set loads. Rows
/// too short to carry the archive cell are left alone. No-op when the id or
/// archive columns are absent. Returns how many rows were flagged.
pub fn archive_all(store: &mut dyn SheetStore) -> Result<usize> {
    let sheet = store.read_all()?;
    let (Some(_), Some(archived_idx)) = (
        sheet.column_index(columns::ID),
        sheet.column_index(columns::ARCHIVED),
    ) else {
        debug!("sheet lacks id or archive columns; nothing to archive");
        return Ok(0);
    };

    let mut flagged = 0;
    for (position, cells) in sheet.rows.iter().enumerate() {
        if let Some(cell) = cells.get(archived_idx) {
            if !cell.trim().eq_ignore_ascii_case("true") {
                store.set_cell(position, archived_idx, ARCHIVED_SENTINEL)?;
                flagged += 1;
            }
        }
    }

    debug!("archived {} ledger rows", flagged);
    Ok(flagged)
}

/// Load the active (non-archived) ledger, preserving store order.
///
/// Fails soft: an unreachable store or a header row missing any expected
/// column yields an empty active set, and individual records that cannot be
/// parsed are skipped. Both degradations are logged rather than raised so a
/// session always starts.
pub fn load_active_rows(store: &dyn SheetStore) -> Vec<LedgerRow> {
    let sheet = match store.read_all() {
        Ok(sheet) => sheet,
        Err(err) => {
            warn!("could not read ledger sheet, starting empty: {}", err);
            return Vec::new();
        }
    };

    for column in CANONICAL_HEADERS {
        if sheet.column_index(column).is_none() {
            warn!(
                "ledger sheet is missing column '{}', starting empty",
                column
            );
            return Vec::new();
        }
    }

    let mut active = Vec::new();
    for (position, cells) in sheet.rows.iter().enumerate() {
        match LedgerRow::from_record(&sheet.headers, cells) {
            Ok(row) if row.archived => {}
            Ok(row) => active.push(row),
            Err(err) => {
                // Sheet row numbers are 1-based and include the header.
                warn!("skipping malformed ledger row {}: {}", position + 2, err);
            }
        }
    }

    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Surgery;
    use crate::store::MemorySheet;
    use chrono::NaiveDate;

    fn ledger_sheet() -> MemorySheet {
        MemorySheet::with_headers(&CANONICAL_HEADERS)
    }

    fn sample_row(id: &str, subtotal: i64) -> LedgerRow {
        let mut row = LedgerRow::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        row.id = id.to_string();
        row.subtotal = subtotal;
        row.saved = true;
        row
    }

    #[test]
    fn test_upsert_appends_when_id_unknown() {
        let mut sheet = ledger_sheet();
        let snapshot = sheet.read_all().unwrap();
        let row = sample_row("r1", 7_000);

        let outcome = upsert_row(&mut sheet, &snapshot, &row).unwrap();

        assert_eq!(outcome, UpsertOutcome::Appended);
        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(sheet.rows()[0][0], "r1");
    }

    #[test]
    fn test_upsert_overwrites_matching_id_without_duplicating() {
        let mut sheet = ledger_sheet();
        let mut row = sample_row("r1", 1_000);
        sheet.append_row(&row.canonical_cells()).unwrap();
        sheet
            .append_row(&sample_row("r2", 2_000).canonical_cells())
            .unwrap();

        let snapshot = sheet.read_all().unwrap();
        row.cartridges = 4;
        row.helped_by_me = Surgery::Manga;
        row.subtotal = 8_000;

        let outcome = upsert_row(&mut sheet, &snapshot, &row).unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated(0));
        assert_eq!(sheet.rows().len(), 2);
        assert_eq!(sheet.rows()[0][1], "4");
        assert_eq!(sheet.rows()[0][2], "Manga");
        assert_eq!(sheet.rows()[0][6], "8000");
        // The other row is untouched.
        assert_eq!(sheet.rows()[1][0], "r2");
        assert_eq!(sheet.rows()[1][6], "2000");
    }

    #[test]
    fn test_upsert_writes_cells_in_live_header_order() {
        let mut sheet = MemorySheet::with_headers(&["total", "id", "historico"]);
        sheet.push_raw_row(&["0", "r1", "False"]);

        let snapshot = sheet.read_all().unwrap();
        let row = sample_row("r1", 9_000);
        upsert_row(&mut sheet, &snapshot, &row).unwrap();

        assert_eq!(sheet.rows()[0], vec!["9000", "r1", "False"]);
    }

    #[test]
    fn test_upsert_degrades_to_append_without_id_column() {
        let mut sheet = MemorySheet::with_headers(&["nombre", "monto"]);
        let snapshot = sheet.read_all().unwrap();

        let outcome = upsert_row(&mut sheet, &snapshot, &sample_row("r1", 0)).unwrap();
        assert_eq!(outcome, UpsertOutcome::Appended);
        // Appends carry the full canonical record even when the sheet's own
        // header disagrees.
        assert_eq!(sheet.rows()[0].len(), CANONICAL_HEADERS.len());
    }

    #[test]
    fn test_stale_snapshot_appends_duplicate_ids() {
        // The documented hazard: the snapshot is taken once, so a row
        // appended mid-session is invisible to its own next upsert.
        let mut sheet = ledger_sheet();
        let snapshot = sheet.read_all().unwrap();
        let row = sample_row("r1", 1_000);

        assert_eq!(
            upsert_row(&mut sheet, &snapshot, &row).unwrap(),
            UpsertOutcome::Appended
        );
        assert_eq!(
            upsert_row(&mut sheet, &snapshot, &row).unwrap(),
            UpsertOutcome::Appended
        );

        let ids: Vec<&str> = sheet.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["r1", "r1"]);

        // A refreshed snapshot finds the first copy again.
        let fresh = sheet.read_all().unwrap();
        assert_eq!(
            upsert_row(&mut sheet, &fresh, &row).unwrap(),
            UpsertOutcome::Updated(0)
        );
        assert_eq!(sheet.rows().len(), 2);
    }

    #[test]
    fn test_delete_removes_first_match_only() {
        let mut sheet = ledger_sheet();
        sheet.append_row(&sample_row("r1", 1).canonical_cells()).unwrap();
        sheet.append_row(&sample_row("r2", 2).canonical_cells()).unwrap();
        sheet.append_row(&sample_row("r2", 3).canonical_cells()).unwrap();

        let outcome = delete_row_by_id(&mut sheet, "r2").unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted(1));
        assert_eq!(sheet.rows().len(), 2);
        assert_eq!(sheet.rows()[0][0], "r1");
        assert_eq!(sheet.rows()[1][0], "r2");
        assert_eq!(sheet.rows()[1][6], "3");
    }

    #[test]
    fn test_delete_sees_rows_appended_after_snapshot() {
        let mut sheet = ledger_sheet();
        let _stale = sheet.read_all().unwrap();
        sheet.append_row(&sample_row("late", 5).canonical_cells()).unwrap();

        assert_eq!(
            delete_row_by_id(&mut sheet, "late").unwrap(),
            DeleteOutcome::Deleted(0)
        );
        assert!(sheet.rows().is_empty());
    }

    #[test]
    fn test_delete_noops() {
        let mut empty = MemorySheet::new();
        assert_eq!(
            delete_row_by_id(&mut empty, "r1").unwrap(),
            DeleteOutcome::NotFound
        );

        let mut no_id = MemorySheet::with_headers(&["nombre"]);
        no_id.push_raw_row(&["r1"]);
        assert_eq!(
            delete_row_by_id(&mut no_id, "r1").unwrap(),
            DeleteOutcome::NotFound
        );
        assert_eq!(no_id.rows().len(), 1);

        let mut no_match = ledger_sheet();
        no_match
            .append_row(&sample_row("r1", 0).canonical_cells())
            .unwrap();
        assert_eq!(
            delete_row_by_id(&mut no_match, "r9").unwrap(),
            DeleteOutcome::NotFound
        );
        assert_eq!(no_match.rows().len(), 1);
    }

    #[test]
    fn test_archive_all_flags_only_unarchived_rows() {
        let mut sheet = ledger_sheet();
        sheet.append_row(&sample_row("r1", 0).canonical_cells()).unwrap();
        sheet.append_row(&sample_row("r2", 0).canonical_cells()).unwrap();
        // Already archived, in drifted casing.
        let mut archived = sample_row("r3", 0);
        archived.archived = true;
        let mut cells = archived.canonical_cells();
        cells[8] = "true".to_string();
        sheet.append_row(&cells).unwrap();

        let flagged = archive_all(&mut sheet).unwrap();

        assert_eq!(flagged, 2);
        for row in sheet.rows() {
            assert!(row[8].eq_ignore_ascii_case("true"));
        }
        // Rows are hidden, never removed.
        assert_eq!(sheet.rows().len(), 3);
    }

    #[test]
    fn test_archive_all_skips_short_rows_and_missing_columns() {
        let mut sheet = ledger_sheet();
        sheet.push_raw_row(&["r1", "0", "No cirugía"]);
        assert_eq!(archive_all(&mut sheet).unwrap(), 0);

        let mut no_archive_col = MemorySheet::with_headers(&["id", "total"]);
        no_archive_col.push_raw_row(&["r1", "0"]);
        assert_eq!(archive_all(&mut no_archive_col).unwrap(), 0);
    }

    #[test]
    fn test_load_active_rows_filters_archived_casings() {
        let mut sheet = ledger_sheet();
        sheet.append_row(&sample_row("keep", 1).canonical_cells()).unwrap();
        for (id, casing) in [("a", "TRUE"), ("b", "true"), ("c", "True")] {
            let mut cells = sample_row(id, 0).canonical_cells();
            cells[8] = casing.to_string();
            sheet.append_row(&cells).unwrap();
        }

        let active = load_active_rows(&sheet);

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "keep");
    }

    #[test]
    fn test_load_active_rows_skips_malformed_records() {
        let mut sheet = ledger_sheet();
        sheet.append_row(&sample_row("good", 1).canonical_cells()).unwrap();
        let mut bad = sample_row("bad", 1).canonical_cells();
        bad[5] = "no es fecha".to_string();
        sheet.append_row(&bad).unwrap();

        let active = load_active_rows(&sheet);

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "good");
    }

    #[test]
    fn test_load_active_rows_requires_full_header() {
        let mut sheet = MemorySheet::with_headers(&["id", "total"]);
        sheet.push_raw_row(&["r1", "100"]);

        assert!(load_active_rows(&sheet).is_empty());
    }

    #[test]
    fn test_archive_then_load_yields_empty_set() {
        let mut sheet = ledger_sheet();
        sheet.append_row(&sample_row("r1", 1).canonical_cells()).unwrap();
        sheet.append_row(&sample_row("r2", 2).canonical_cells()).unwrap();

        archive_all(&mut sheet).unwrap();

        assert!(load_active_rows(&sheet).is_empty());
        assert_eq!(sheet.rows().len(), 2);
    }
}
