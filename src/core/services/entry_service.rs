use crate::core::engine::{coerce_numeric, derive_entry};
use crate::domain::{Entry, EntryField, PeriodTable};

use super::{ServiceError, ServiceResult};

/// Row-level edits on a period table. Every edit leaves the touched row with
/// fresh derived columns.
pub struct EntryService;

impl EntryService {
    /// Appends a zeroed row for `name` using `rate` as its starting rate.
    pub fn add<'a>(
        table: &'a mut PeriodTable,
        name: &str,
        rate: f64,
    ) -> ServiceResult<&'a Entry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Entity name must not be blank".into()));
        }
        if Self::find(table, name).is_some() {
            return Err(ServiceError::Invalid(format!(
                "Entity `{}` already exists",
                name
            )));
        }
        let mut entry = Entry::new(name).with_rate(rate);
        derive_entry(&mut entry);
        table.push(entry);
        Ok(&table.entries[table.entries.len() - 1])
    }

    pub fn remove(table: &mut PeriodTable, name: &str) -> ServiceResult<Entry> {
        table.remove(name).ok_or_else(|| not_found(name))
    }

    /// Stores a user-typed cell. Text that is not a number becomes 0.
    pub fn set_field<'a>(
        table: &'a mut PeriodTable,
        name: &str,
        field: EntryField,
        raw: &str,
    ) -> ServiceResult<&'a Entry> {
        let idx = Self::require(table, name)?;
        let entry = &mut table.entries[idx];
        entry.set_field(field, coerce_numeric(raw));
        derive_entry(entry);
        Ok(&*entry)
    }

    /// Adds `amount` to what the entity has already paid this period.
    pub fn record_payment<'a>(
        table: &'a mut PeriodTable,
        name: &str,
        amount: f64,
    ) -> ServiceResult<&'a Entry> {
        if !amount.is_finite() {
            return Err(ServiceError::Invalid("Payment must be a number".into()));
        }
        let idx = Self::require(table, name)?;
        let entry = &mut table.entries[idx];
        entry.amount_paid += amount;
        derive_entry(entry);
        Ok(&*entry)
    }

    /// Case-insensitive lookup by trimmed name.
    pub fn find(table: &PeriodTable, name: &str) -> Option<usize> {
        table.position(name)
    }

    fn require(table: &PeriodTable, name: &str) -> ServiceResult<usize> {
        Self::find(table, name).ok_or_else(|| not_found(name))
    }
}

fn not_found(name: &str) -> ServiceError {
    ServiceError::Invalid(format!("Entity `{}` not found", name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PeriodTable {
        let mut table = PeriodTable::new("Acme_May");
        EntryService::add(&mut table, "North", 2.0).unwrap();
        EntryService::add(&mut table, "South", 1.5).unwrap();
        table
    }

    #[test]
    fn add_rejects_blank_and_duplicate_names() {
        let mut table = table();
        assert!(EntryService::add(&mut table, "   ", 1.0).is_err());
        let err = EntryService::add(&mut table, " north ", 1.0).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn set_field_coerces_and_recomputes() {
        let mut table = table();
        EntryService::set_field(&mut table, "North", EntryField::PreviousReading, "100").unwrap();
        EntryService::set_field(&mut table, "north", EntryField::NewReading, "150").unwrap();
        let row = EntryService::set_field(&mut table, "North", EntryField::AmountPaid, "80")
            .unwrap()
            .clone();
        assert_eq!(row.sales_amount(), 100.0);
        assert_eq!(row.balance(), 20.0);

        let row = EntryService::set_field(&mut table, "North", EntryField::Rate, "free").unwrap();
        assert_eq!(row.rate, 0.0);
        assert_eq!(row.balance(), -80.0);
    }

    #[test]
    fn record_payment_accumulates() {
        let mut table = table();
        EntryService::record_payment(&mut table, "South", 12.5).unwrap();
        let row = EntryService::record_payment(&mut table, "South", 7.5).unwrap();
        assert_eq!(row.amount_paid, 20.0);
        assert_eq!(row.balance(), -20.0);
        assert!(EntryService::record_payment(&mut table, "South", f64::NAN).is_err());
    }

    #[test]
    fn edits_on_unknown_entity_fail() {
        let mut table = table();
        assert!(EntryService::remove(&mut table, "West").is_err());
        assert!(EntryService::set_field(&mut table, "West", EntryField::Rate, "1").is_err());
        let removed = EntryService::remove(&mut table, "NORTH").unwrap();
        assert_eq!(removed.name, "North");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn service_and_table_resolve_the_same_row() {
        let table = table();
        for name in ["south", " SOUTH ", "South"] {
            assert_eq!(EntryService::find(&table, name), table.position(name));
            assert_eq!(table.entry(name).map(|e| e.name.as_str()), Some("South"));
        }
    }
}
