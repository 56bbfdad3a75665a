use crate::core::engine::{aggregate, compute_derived};
use crate::domain::{Entry, PeriodTable};

/// Column totals for one period, computed from freshly derived rows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeriodTotals {
    pub rows: usize,
    pub consumed_units: f64,
    pub sales: f64,
    pub paid: f64,
    pub outstanding: f64,
}

/// Side-by-side aggregate of two periods.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodComparison {
    pub left: String,
    pub right: String,
    pub left_total: f64,
    pub right_total: f64,
    /// `right_total - left_total`.
    pub difference: f64,
}

pub struct SummaryService;

impl SummaryService {
    pub fn totals(table: &PeriodTable) -> PeriodTotals {
        let rows = compute_derived(&table.entries);
        PeriodTotals {
            rows: rows.len(),
            consumed_units: rows.iter().map(Entry::consumed_units).sum(),
            sales: aggregate(&rows),
            paid: rows.iter().map(|row| row.amount_paid).sum(),
            outstanding: rows.iter().map(Entry::balance).sum(),
        }
    }

    pub fn total_sales(table: &PeriodTable) -> f64 {
        aggregate(&compute_derived(&table.entries))
    }

    pub fn compare(left: &PeriodTable, right: &PeriodTable) -> PeriodComparison {
        let left_total = Self::total_sales(left);
        let right_total = Self::total_sales(right);
        PeriodComparison {
            left: left.identifier.clone(),
            right: right.identifier.clone(),
            left_total,
            right_total,
            difference: right_total - left_total,
        }
    }
}
