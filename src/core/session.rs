use crate::core::engine::{aggregate, compute_derived, compute_derived_in_place};
use crate::core::services::{
    EntryService, PeriodComparison, PeriodTotals, ServiceError, ServiceResult, SummaryService,
};
use crate::domain::{Entry, EntryField, PeriodKey, PeriodTable};
use crate::storage::PeriodStore;

/// Derived rows plus the aggregate, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodView {
    pub key: PeriodKey,
    pub rows: Vec<Entry>,
    pub total_sales: f64,
}

/// State of one operator session: the open period and its unsaved edits.
///
/// The engine and the store never see this object; it only hands them
/// explicit tables and keys.
pub struct PeriodSession {
    current: Option<PeriodTable>,
    current_key: Option<PeriodKey>,
    dirty: bool,
    default_rate: f64,
    store: Box<dyn PeriodStore>,
}

impl PeriodSession {
    pub fn new(store: Box<dyn PeriodStore>) -> Self {
        Self {
            current: None,
            current_key: None,
            dirty: false,
            default_rate: 0.0,
            store,
        }
    }

    pub fn with_default_rate(mut self, rate: f64) -> Self {
        self.default_rate = rate;
        self
    }

    pub fn set_default_rate(&mut self, rate: f64) {
        self.default_rate = rate;
    }

    pub fn store(&self) -> &dyn PeriodStore {
        self.store.as_ref()
    }

    /// Begins a new empty period. Nothing is written until [`save`](Self::save),
    /// so an existing snapshot under the same key survives until then.
    pub fn start(&mut self, parts: &[&str]) -> ServiceResult<PeriodKey> {
        let key = self.store.key_for(parts)?;
        tracing::info!(key = %key, "period started");
        self.current = Some(PeriodTable::new(key.stem()));
        self.current_key = Some(key.clone());
        self.dirty = true;
        Ok(key)
    }

    /// Loads a stored period and refreshes its derived columns for display.
    pub fn open(&mut self, key: &PeriodKey) -> ServiceResult<&PeriodTable> {
        let mut table = self.store.load(key)?;
        compute_derived_in_place(&mut table.entries);
        tracing::info!(key = %key, rows = table.len(), "period opened");
        self.current_key = Some(key.clone());
        self.dirty = false;
        Ok(&*self.current.insert(table))
    }

    pub fn close(&mut self) {
        self.current = None;
        self.current_key = None;
        self.dirty = false;
    }

    pub fn current(&self) -> ServiceResult<&PeriodTable> {
        self.current.as_ref().ok_or(ServiceError::NoPeriodOpen)
    }

    pub fn current_key(&self) -> Option<&PeriodKey> {
        self.current_key.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn add_entity(&mut self, name: &str) -> ServiceResult<Entry> {
        let rate = self.default_rate;
        let entry = EntryService::add(self.table_mut()?, name, rate)?.clone();
        self.dirty = true;
        Ok(entry)
    }

    pub fn remove_entity(&mut self, name: &str) -> ServiceResult<Entry> {
        let entry = EntryService::remove(self.table_mut()?, name)?;
        self.dirty = true;
        Ok(entry)
    }

    pub fn set_field(&mut self, name: &str, field: EntryField, raw: &str) -> ServiceResult<Entry> {
        let entry = EntryService::set_field(self.table_mut()?, name, field, raw)?.clone();
        self.dirty = true;
        Ok(entry)
    }

    pub fn record_payment(&mut self, name: &str, amount: f64) -> ServiceResult<Entry> {
        let entry = EntryService::record_payment(self.table_mut()?, name, amount)?.clone();
        self.dirty = true;
        Ok(entry)
    }

    pub fn view(&self) -> ServiceResult<PeriodView> {
        let table = self.current()?;
        let key = self.current_key.clone().ok_or(ServiceError::NoPeriodOpen)?;
        let rows = compute_derived(&table.entries);
        let total_sales = aggregate(&rows);
        Ok(PeriodView {
            key,
            rows,
            total_sales,
        })
    }

    pub fn totals(&self) -> ServiceResult<PeriodTotals> {
        Ok(SummaryService::totals(self.current()?))
    }

    /// Writes the open period over its stored snapshot.
    pub fn save(&mut self) -> ServiceResult<PeriodKey> {
        let key = self.current_key.clone().ok_or(ServiceError::NoPeriodOpen)?;
        let table = self.current.as_mut().ok_or(ServiceError::NoPeriodOpen)?;
        compute_derived_in_place(&mut table.entries);
        self.store.save(&key, table)?;
        tracing::info!(key = %key, rows = table.len(), "period saved");
        self.dirty = false;
        Ok(key)
    }

    /// Saves the open period under a new identifier and keeps editing it there.
    /// On a failed write the session stays on its previous key.
    pub fn save_as(&mut self, parts: &[&str]) -> ServiceResult<PeriodKey> {
        let key = self.store.key_for(parts)?;
        let mut renamed = self.current()?.clone();
        renamed.identifier = key.stem().to_string();
        compute_derived_in_place(&mut renamed.entries);
        self.store.save(&key, &renamed)?;
        tracing::info!(key = %key, rows = renamed.len(), "period saved under new key");
        self.current = Some(renamed);
        self.current_key = Some(key.clone());
        self.dirty = false;
        Ok(key)
    }

    /// Compares two stored periods by total sales.
    pub fn compare(&self, left: &PeriodKey, right: &PeriodKey) -> ServiceResult<PeriodComparison> {
        let left = self.store.load(left)?;
        let right = self.store.load(right)?;
        Ok(SummaryService::compare(&left, &right))
    }

    /// Stored period keys, sorted by name.
    pub fn list(&self) -> ServiceResult<Vec<PeriodKey>> {
        let mut keys = self.store.list()?;
        keys.sort();
        Ok(keys)
    }

    fn table_mut(&mut self) -> ServiceResult<&mut PeriodTable> {
        self.current.as_mut().ok_or(ServiceError::NoPeriodOpen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LedgerError;
    use crate::storage::CsvStore;
    use tempfile::{tempdir, TempDir};

    fn session() -> (PeriodSession, TempDir) {
        let temp = tempdir().unwrap();
        let store = CsvStore::open(temp.path().join("periods")).unwrap();
        (PeriodSession::new(Box::new(store)).with_default_rate(2.0), temp)
    }

    #[test]
    fn edits_require_an_open_period() {
        let (mut session, _guard) = session();
        assert!(matches!(
            session.add_entity("North"),
            Err(ServiceError::NoPeriodOpen)
        ));
        assert!(matches!(session.save(), Err(ServiceError::NoPeriodOpen)));
        assert!(matches!(session.view(), Err(ServiceError::NoPeriodOpen)));
    }

    #[test]
    fn blank_identifier_never_reaches_the_store() {
        let (mut session, _guard) = session();
        let err = session.start(&["  ", ""]).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Ledger(LedgerError::InvalidIdentifier)
        ));
        assert!(session.list().unwrap().is_empty());
    }

    #[test]
    fn start_edit_save_and_reopen() {
        let (mut session, _guard) = session();
        let key = session.start(&["Acme", "May", "2024"]).unwrap();
        assert_eq!(key.file_name(), "Acme_May_2024.csv");
        session.add_entity("North").unwrap();
        session
            .set_field("North", EntryField::PreviousReading, "100")
            .unwrap();
        session.set_field("North", EntryField::NewReading, "150").unwrap();
        session.record_payment("North", 80.0).unwrap();
        assert!(session.is_dirty());

        session.save().unwrap();
        assert!(!session.is_dirty());
        session.close();

        let table = session.open(&key).unwrap();
        assert_eq!(table.entries[0].rate, 2.0);
        assert_eq!(table.entries[0].balance(), 20.0);
        let view = session.view().unwrap();
        assert_eq!(view.total_sales, 100.0);
    }

    #[test]
    fn open_missing_period_is_not_found() {
        let (mut session, _guard) = session();
        let key = PeriodKey::parse("Ghost_June").unwrap();
        assert!(matches!(
            session.open(&key),
            Err(ServiceError::Ledger(LedgerError::NotFound(_)))
        ));
        assert!(session.current().is_err());
    }

    #[test]
    fn save_as_moves_the_session_to_the_new_key() {
        let (mut session, _guard) = session();
        session.start(&["Acme", "May"]).unwrap();
        session.add_entity("North").unwrap();
        let copy = session.save_as(&["Acme", "June"]).unwrap();
        assert_eq!(session.current_key(), Some(&copy));
        assert_eq!(session.current().unwrap().identifier, "Acme_June");
        let keys: Vec<_> = session.list().unwrap().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["Acme_June"]);
    }

    #[test]
    fn failed_save_as_keeps_the_original_key() {
        let (mut session, guard) = session();
        let may = session.start(&["Acme", "May"]).unwrap();
        session.add_entity("North").unwrap();
        session.save().unwrap();
        session.add_entity("South").unwrap();

        std::fs::create_dir_all(guard.path().join("periods").join("Acme_June.csv.tmp")).unwrap();
        assert!(session.save_as(&["Acme", "June"]).is_err());

        assert_eq!(session.current_key(), Some(&may));
        assert_eq!(session.current().unwrap().identifier, "Acme_May");
        assert!(session.is_dirty());
        let keys: Vec<_> = session.list().unwrap().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["Acme_May"]);
    }

    #[test]
    fn compare_loads_both_periods() {
        let (mut session, _guard) = session();
        let march = session.start(&["Acme", "March"]).unwrap();
        session.add_entity("Main").unwrap();
        session.set_field("Main", EntryField::NewReading, "250").unwrap();
        session.save().unwrap();

        let april = session.start(&["Acme", "April"]).unwrap();
        session.add_entity("Main").unwrap();
        session.set_field("Main", EntryField::NewReading, "310").unwrap();
        session.save().unwrap();

        let comparison = session.compare(&march, &april).unwrap();
        assert_eq!(comparison.left_total, 500.0);
        assert_eq!(comparison.right_total, 620.0);
        assert_eq!(comparison.difference, 120.0);
    }
}
