pub mod entry_service;
pub mod summary_service;

pub use entry_service::EntryService;
pub use summary_service::{PeriodComparison, PeriodTotals, SummaryService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("No period open. Use `period new` or `period open` first.")]
    NoPeriodOpen,
    #[error("{0}")]
    Invalid(String),
}
