pub mod csv_backend;

use crate::{
    domain::{PeriodKey, PeriodTable},
    errors::{LedgerError, Result},
};

/// Persistence of whole period tables, one snapshot per key.
///
/// There is no locking: two writers saving the same key race and the last
/// rename wins.
pub trait PeriodStore: Send + Sync {
    /// Keys of every stored period, in directory order.
    fn list(&self) -> Result<Vec<PeriodKey>>;
    fn exists(&self, key: &PeriodKey) -> bool;
    /// Reads a snapshot back. Derived columns are returned as stored.
    fn load(&self, key: &PeriodKey) -> Result<PeriodTable>;
    /// Replaces the snapshot for `key` with `table`.
    fn save(&self, key: &PeriodKey, table: &PeriodTable) -> Result<()>;

    fn key_for(&self, parts: &[&str]) -> Result<PeriodKey> {
        key_for(parts)
    }
}

/// Encodes identifier labels into a store key, rejecting blank identifiers.
pub fn key_for(parts: &[&str]) -> Result<PeriodKey> {
    PeriodKey::from_parts(parts).ok_or(LedgerError::InvalidIdentifier)
}

pub use csv_backend::{read_table, write_table, CsvStore, HEADER};
