//! Derived-column calculations over period tables.
//!
//! Every function here is total: malformed input is absorbed by
//! [`coerce_numeric`], nothing returns an error, and nothing touches I/O.

use crate::domain::{Entry, EntryField, RawEntry};

/// Parses a user-typed cell, substituting 0 for anything that is not a finite
/// number (blank text, garbage, `NaN`, infinities).
pub fn coerce_numeric(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        Ok(_) | Err(_) => {
            if !text.trim().is_empty() {
                tracing::trace!(cell = text, "non-numeric cell coerced to 0");
            }
            0.0
        }
    }
}

/// Coerces an optional cell; a missing cell is 0.
pub fn coerce_cell(cell: Option<&str>) -> f64 {
    cell.map(coerce_numeric).unwrap_or(0.0)
}

/// Converts a grid row into a typed entry. Derived columns are left at 0.
pub fn coerce_entry(raw: &RawEntry) -> Entry {
    let mut entry = Entry::new(raw.name.clone());
    for field in EntryField::ALL {
        entry.set_field(field, coerce_cell(raw.cell(field)));
    }
    entry
}

/// Recomputes the derived columns of a single entry in place.
///
/// A step that overflows to an infinity (or `NaN`) is stored as 0 and the
/// later steps continue from that 0, the same policy [`coerce_numeric`]
/// applies to input cells.
pub fn derive_entry(entry: &mut Entry) {
    let consumed_units = finite_or_zero(entry.new_reading - entry.previous_reading);
    let sales_amount = finite_or_zero(consumed_units * entry.rate);
    let balance = finite_or_zero(sales_amount - entry.amount_paid);
    entry.set_derived(consumed_units, sales_amount, balance);
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        tracing::trace!(%value, "derived value overflowed, stored as 0");
        0.0
    }
}

/// Returns the table with derived columns recomputed from raw columns.
///
/// Row count and order are preserved and raw columns pass through untouched,
/// so applying this to its own output is a no-op.
pub fn compute_derived(table: &[Entry]) -> Vec<Entry> {
    table
        .iter()
        .cloned()
        .map(|mut entry| {
            derive_entry(&mut entry);
            entry
        })
        .collect()
}

/// Same as [`compute_derived`] in place.
pub fn compute_derived_in_place(table: &mut [Entry]) {
    table.iter_mut().for_each(derive_entry);
}

/// Coerces grid rows and derives their computed columns.
pub fn derive_from_raw(rows: &[RawEntry]) -> Vec<Entry> {
    rows.iter()
        .map(|raw| {
            let mut entry = coerce_entry(raw);
            derive_entry(&mut entry);
            entry
        })
        .collect()
}

/// Total sales across the table; 0 for an empty table.
pub fn aggregate(table: &[Entry]) -> f64 {
    table.iter().map(Entry::sales_amount).sum()
}
