//! Pure subtotal and grand-total arithmetic. No store access, no state.

use crate::schema::{LedgerRow, Surgery};

/// Price of a single cartridge.
pub const CARTRIDGE_PRICE: i64 = 1_000;

/// Adjustment applied when the co-payment (CCT) flag is set on an assisted
/// surgery: added when I helped, subtracted when I was helped.
pub const CO_PAYMENT_ADJUSTMENT: i64 = 1_000;

/// Enforce mutual exclusivity between the two assistance directions.
///
/// "They helped me" is only honored when "I helped them" is the sentinel; the
/// outgoing direction wins when both are set. Only this one direction is
/// enforced, matching how the entry form constrains its dropdowns.
pub fn effective_assistance(helped_by_me: Surgery, helped_me: Surgery) -> (Surgery, Surgery) {
    if !helped_by_me.is_none() {
        (helped_by_me, Surgery::NoSurgery)
    } else {
        (helped_by_me, helped_me)
    }
}

/// Subtotal for one row.
///
/// Cartridges always cost. Helping someone earns the surgery price (plus the
/// co-payment adjustment when flagged); being helped owes it (minus the
/// adjustment). The `helped_me` branch is never reached when `helped_by_me`
/// names a real surgery.
pub fn subtotal(cartridges: u8, helped_by_me: Surgery, helped_me: Surgery, co_payment: bool) -> i64 {
    let mut amount = i64::from(cartridges) * CARTRIDGE_PRICE;

    if !helped_by_me.is_none() {
        amount += helped_by_me.price();
        if co_payment {
            amount += CO_PAYMENT_ADJUSTMENT;
        }
    } else if !helped_me.is_none() {
        amount -= helped_me.price();
        if co_payment {
            amount -= CO_PAYMENT_ADJUSTMENT;
        }
    }

    amount
}

/// Grand total over the active ledger. Recomputed from scratch every cycle;
/// there is no incremental maintenance to drift out of sync.
pub fn grand_total<'a>(rows: impl IntoIterator<Item = &'a LedgerRow>) -> i64 {
    rows.into_iter().map(|row| row.subtotal).sum()
}
