use crate::error::{LedgerError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Column names as they appear in the spreadsheet header row.
///
/// The persisted store predates this crate and uses Spanish headers; they are
/// kept verbatim so existing sheets keep working.
pub mod columns {
    pub const ID: &str = "id";
    pub const CARTRIDGES: &str = "cartuchos";
    pub const HELPED_BY_ME: &str = "yo_ayude";
    pub const HELPED_ME: &str = "me_ayudaron";
    pub const CO_PAYMENT: &str = "cct";
    pub const DATE: &str = "fecha";
    pub const SUBTOTAL: &str = "total";
    pub const SAVED: &str = "guardado";
    pub const ARCHIVED: &str = "historico";
}

/// Canonical column order. Appends always use this order; positional updates
/// follow whatever order the live sheet header declares.
pub const CANONICAL_HEADERS: [&str; 9] = [
    columns::ID,
    columns::CARTRIDGES,
    columns::HELPED_BY_ME,
    columns::HELPED_ME,
    columns::CO_PAYMENT,
    columns::DATE,
    columns::SUBTOTAL,
    columns::SAVED,
    columns::ARCHIVED,
];

/// Upper bound on the cartridge count selector.
pub const MAX_CARTRIDGES: u8 = 10;

/// Cell value written when a row is archived. Reads are case-insensitive.
pub const ARCHIVED_SENTINEL: &str = "TRUE";

/// The fixed surgery vocabulary.
///
/// `NoSurgery` is the sentinel meaning "no assistance in this direction".
/// Labels are the exact strings stored in the sheet (including the missing
/// accent in "Biparticion", which matches years of existing data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surgery {
    #[serde(rename = "No cirugía")]
    NoSurgery,
    #[serde(rename = "Manga")]
    Manga,
    #[serde(rename = "Manga con Biparticion")]
    MangaConBiparticion,
    #[serde(rename = "Minibypass")]
    Minibypass,
    #[serde(rename = "Bypass en Y de Roux")]
    BypassEnYDeRoux,
}

impl Surgery {
    /// Every vocabulary entry in dropdown order, sentinel first.
    pub const ALL: [Surgery; 5] = [
        Surgery::NoSurgery,
        Surgery::Manga,
        Surgery::MangaConBiparticion,
        Surgery::Minibypass,
        Surgery::BypassEnYDeRoux,
    ];

    /// The label stored in the sheet and shown in dropdowns.
    pub fn label(&self) -> &'static str {
        match self {
            Surgery::NoSurgery => "No cirugía",
            Surgery::Manga => "Manga",
            Surgery::MangaConBiparticion => "Manga con Biparticion",
            Surgery::Minibypass => "Minibypass",
            Surgery::BypassEnYDeRoux => "Bypass en Y de Roux",
        }
    }

    /// Fixed price table. The sentinel costs nothing.
    pub fn price(&self) -> i64 {
        match self {
            Surgery::NoSurgery => 0,
            Surgery::Manga => 4_000,
            Surgery::MangaConBiparticion => 6_000,
            Surgery::Minibypass => 6_000,
            Surgery::BypassEnYDeRoux => 6_000,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Surgery::NoSurgery)
    }
}

impl Default for Surgery {
    fn default() -> Self {
        Surgery::NoSurgery
    }
}

impl fmt::Display for Surgery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Surgery {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Surgery::ALL
            .into_iter()
            .find(|surgery| surgery.label() == trimmed)
            .ok_or_else(|| LedgerError::UnknownSurgery(trimmed.to_string()))
    }
}

/// Parse a stored boolean cell. Sheets round-trip booleans through several
/// spellings ("True", "TRUE", "true") depending on who last wrote them.
pub fn parse_flag(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case("true")
}

/// Serialize a boolean the way the sheet has always stored it.
pub fn format_flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// One ledger entry.
///
/// `id` is the sole join key against the persisted store: generated once at
/// creation and immutable afterwards, including across archival. `date` is
/// likewise fixed at creation. Everything else is rewritten on every
/// evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub id: String,

    #[serde(rename = "cartuchos")]
    pub cartridges: u8,

    #[serde(rename = "yo_ayude")]
    pub helped_by_me: Surgery,

    #[serde(rename = "me_ayudaron")]
    pub helped_me: Surgery,

    #[serde(rename = "cct")]
    pub co_payment: bool,

    #[serde(rename = "fecha")]
    pub date: NaiveDate,

    #[serde(rename = "total")]
    pub subtotal: i64,

    #[serde(rename = "guardado")]
    pub saved: bool,

    #[serde(rename = "historico")]
    pub archived: bool,
}

impl LedgerRow {
    /// Create a fresh row with a new identifier and default field values.
    pub fn new(date: NaiveDate) -> Self {
        LedgerRow {
            id: Uuid::new_v4().to_string(),
            cartridges: 0,
            helped_by_me: Surgery::NoSurgery,
            helped_me: Surgery::NoSurgery,
            co_payment: false,
            date,
            subtotal: 0,
            saved: false,
            archived: false,
        }
    }

    /// Cell value for a named column, or `None` for columns this row does not
    /// carry (written as empty string by positional updates).
    pub fn field(&self, column: &str) -> Option<String> {
        match column {
            columns::ID => Some(self.id.clone()),
            columns::CARTRIDGES => Some(self.cartridges.to_string()),
            columns::HELPED_BY_ME => Some(self.helped_by_me.label().to_string()),
            columns::HELPED_ME => Some(self.helped_me.label().to_string()),
            columns::CO_PAYMENT => Some(format_flag(self.co_payment).to_string()),
            columns::DATE => Some(self.date.format("%Y-%m-%d").to_string()),
            columns::SUBTOTAL => Some(self.subtotal.to_string()),
            columns::SAVED => Some(format_flag(self.saved).to_string()),
            columns::ARCHIVED => Some(format_flag(self.archived).to_string()),
            _ => None,
        }
    }

    /// Cells ordered to match the given header row, absent fields as empty
    /// string. Used for positional overwrites.
    pub fn to_cells(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|header| self.field(header).unwrap_or_default())
            .collect()
    }

    /// Cells in canonical column order. Used for appends, which do not
    /// consult the live header.
    pub fn canonical_cells(&self) -> Vec<String> {
        CANONICAL_HEADERS
            .iter()
            .map(|header| self.field(header).unwrap_or_default())
            .collect()
    }

    /// Parse a stored record back into a typed row.
    ///
    /// Tolerant where stored data drifts: booleans accept any casing, an
    /// empty cartridge or subtotal cell reads as zero. A date that does not
    /// parse is an error — the caller decides whether to skip the record.
    pub fn from_record(headers: &[String], cells: &[String]) -> Result<Self> {
        let cell = |column: &str| -> String {
            headers
                .iter()
                .position(|h| h == column)
                .and_then(|idx| cells.get(idx))
                .cloned()
                .unwrap_or_default()
        };

        let id = cell(columns::ID);

        let cartridges_cell = cell(columns::CARTRIDGES);
        let cartridges = if cartridges_cell.trim().is_empty() {
            0
        } else {
            cartridges_cell
                .trim()
                .parse::<u8>()
                .map_err(|_| LedgerError::InvalidNumber {
                    column: columns::CARTRIDGES.to_string(),
                    value: cartridges_cell.clone(),
                })?
        };

        let helped_by_me = parse_surgery_cell(&cell(columns::HELPED_BY_ME));
        let helped_me = parse_surgery_cell(&cell(columns::HELPED_ME));

        let date_cell = cell(columns::DATE);
        let date =
            NaiveDate::parse_from_str(date_cell.trim(), "%Y-%m-%d").map_err(|_| {
                LedgerError::InvalidDate {
                    value: date_cell.clone(),
                }
            })?;

        let subtotal_cell = cell(columns::SUBTOTAL);
        let subtotal = subtotal_cell.trim().parse::<i64>().unwrap_or(0);

        Ok(LedgerRow {
            id,
            cartridges,
            helped_by_me,
            helped_me,
            co_payment: parse_flag(&cell(columns::CO_PAYMENT)),
            date,
            subtotal,
            saved: parse_flag(&cell(columns::SAVED)),
            archived: parse_flag(&cell(columns::ARCHIVED)),
        })
    }
}

/// Surgery cells degrade to the sentinel instead of failing the whole record;
/// an edited sheet with a typo'd surgery should not hide the row entirely.
fn parse_surgery_cell(cell: &str) -> Surgery {
    match cell.parse::<Surgery>() {
        Ok(surgery) => surgery,
        Err(_) => {
            if !cell.trim().is_empty() {
                log::warn!("unknown surgery '{}' read as '{}'", cell, Surgery::NoSurgery);
            }
            Surgery::NoSurgery
        }
    }
}
