//! Plain data types shared by the engine, the store, and the shell.

pub mod common;
pub mod entry;
pub mod period;

pub use common::{Displayable, NamedEntity};
pub use entry::{Entry, EntryField, RawEntry, UnknownField};
pub use period::{PeriodKey, PeriodTable, PERIOD_EXTENSION};
