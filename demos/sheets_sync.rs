//! Drives the ledger against a real Google Sheet.
//!
//! Expects `LEDGER_SPREADSHEET_ID`, `LEDGER_WORKSHEET`, and `LEDGER_TOKEN`
//! (an OAuth bearer token with spreadsheet scope) in the environment.

use anyhow::{Context, Result};
use cartridge_ledger::{LedgerSession, RowInput, SheetsClient, SheetsConfig, Surgery};

fn main() -> Result<()> {
    env_logger::init();

    let config = SheetsConfig {
        spreadsheet_id: std::env::var("LEDGER_SPREADSHEET_ID")
            .context("LEDGER_SPREADSHEET_ID is not set")?,
        worksheet: std::env::var("LEDGER_WORKSHEET").unwrap_or_else(|_| "Tracker".to_string()),
        token: std::env::var("LEDGER_TOKEN").context("LEDGER_TOKEN is not set")?,
    };
    let mut store = SheetsClient::new(config);

    let mut session = LedgerSession::start(&store);
    println!(
        "Loaded {} active rows, total ${}",
        session.len(),
        session.grand_total()
    );

    let index = session.add_row();
    session.apply_input(
        &mut store,
        index,
        RowInput {
            cartridges: 1,
            helped_by_me: Surgery::Manga,
            helped_me: Surgery::NoSurgery,
            co_payment: false,
        },
    )?;
    println!("Appended one row; total is now ${}", session.grand_total());

    Ok(())
}
