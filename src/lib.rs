//! # Cartridge Ledger
//!
//! A library for tracking a shared surgical-cartridge cost ledger backed by a
//! remote spreadsheet. A front end adds rows, feeds back edited field values,
//! and this crate computes subtotals and a running grand total while keeping
//! each row reconciled with the spreadsheet by its identifier.
//!
//! ## Core Concepts
//!
//! - **Ledger Row**: one entry — cartridges used, who helped whom with which
//!   surgery, a co-payment flag, and a fixed creation date and identifier
//! - **Active Set**: the non-archived rows loaded from the store at session
//!   start, in store order
//! - **Upsert**: insert-or-update keyed by identifier, matched against a
//!   snapshot of the store taken once per session
//! - **Archive**: a bulk soft delete — rows stay in the store as history but
//!   disappear from future sessions
//!
//! ## Example
//!
//! ```rust,ignore
//! use cartridge_ledger::*;
//!
//! let mut sheet = MemorySheet::with_headers(&CANONICAL_HEADERS);
//! let mut session = LedgerSession::start(&sheet);
//!
//! let row = session.add_row();
//! session.apply_input(&mut sheet, row, RowInput {
//!     cartridges: 3,
//!     helped_by_me: Surgery::Manga,
//!     helped_me: Surgery::NoSurgery,
//!     co_payment: false,
//! })?;
//!
//! assert_eq!(session.grand_total(), 7_000);
//! ```
//!
//! The store is abstracted behind [`SheetStore`]; [`MemorySheet`] serves
//! tests and offline use, and the `sheets` feature adds a Google Sheets
//! client.

pub mod calculator;
pub mod error;
pub mod reconcile;
pub mod schema;
pub mod session;
pub mod store;

#[cfg(feature = "sheets")]
pub mod sheets;

pub use calculator::{
    effective_assistance, grand_total, subtotal, CARTRIDGE_PRICE, CO_PAYMENT_ADJUSTMENT,
};
pub use error::{LedgerError, Result};
pub use reconcile::{
    archive_all, delete_row_by_id, load_active_rows, upsert_row, DeleteOutcome, UpsertOutcome,
};
pub use schema::{
    columns, format_flag, parse_flag, LedgerRow, Surgery, ARCHIVED_SENTINEL, CANONICAL_HEADERS,
    MAX_CARTRIDGES,
};
pub use session::{LedgerSession, RowInput};
pub use store::{MemorySheet, SheetSnapshot, SheetStore};

#[cfg(feature = "sheets")]
pub use sheets::{SheetsClient, SheetsConfig};
