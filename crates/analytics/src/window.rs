use core_types::{DateWindow, Table};

/// Returns the records dated inside `window`, both bounds included.
///
/// The input table is left untouched; an empty result is a valid table.
pub fn select(table: &Table, window: &DateWindow) -> Table {
    let subset = table.filtered(|record| window.contains(record.transaction_date));
    tracing::debug!(
        window = %window,
        matched = subset.len(),
        scanned = table.len(),
        "Selected window."
    );
    subset
}
