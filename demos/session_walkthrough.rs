use anyhow::Result;
use cartridge_ledger::{
    LedgerSession, MemorySheet, RowInput, SheetStore, Surgery, CANONICAL_HEADERS,
};

fn main() -> Result<()> {
    env_logger::init();

    let mut sheet = MemorySheet::with_headers(&CANONICAL_HEADERS);
    let mut session = LedgerSession::start(&sheet);

    // I helped with a Manga and used three cartridges of my own.
    let helping = session.add_row();
    let earned = session.apply_input(
        &mut sheet,
        helping,
        RowInput {
            cartridges: 3,
            helped_by_me: Surgery::Manga,
            helped_me: Surgery::NoSurgery,
            co_payment: false,
        },
    )?;
    println!("Helping with a Manga: {:+}", earned);

    // A colleague covered a bypass for me, co-payment included.
    let helped = session.add_row();
    let owed = session.apply_input(
        &mut sheet,
        helped,
        RowInput {
            cartridges: 0,
            helped_by_me: Surgery::NoSurgery,
            helped_me: Surgery::BypassEnYDeRoux,
            co_payment: true,
        },
    )?;
    println!("Helped with a Bypass en Y de Roux: {:+}", owed);

    println!("Running total: ${}", session.grand_total());

    // Reopening the ledger later sees both rows.
    let resumed = LedgerSession::start(&sheet);
    println!(
        "Resumed session: {} rows, total ${}",
        resumed.len(),
        resumed.grand_total()
    );

    // Month-end reset: everything becomes history, nothing is lost.
    let mut resumed = resumed;
    let archived = resumed.reset_all(&mut sheet)?;
    println!(
        "Reset: {} rows archived, {} still stored",
        archived,
        sheet.read_all()?.rows.len()
    );

    Ok(())
}
