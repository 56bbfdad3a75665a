//! Flat CSV store: one `<key>.csv` per period inside a single directory.
//!
//! Header: `name,previous_reading,new_reading,rate,amount_paid,consumed_units,sales_amount,balance`

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        engine::{coerce_cell, compute_derived},
        utils::{ensure_dir, tmp_path},
    },
    domain::{Entry, PeriodKey, PeriodTable},
    errors::{LedgerError, Result},
};

use super::PeriodStore;

pub const HEADER: [&str; 8] = [
    "name",
    "previous_reading",
    "new_reading",
    "rate",
    "amount_paid",
    "consumed_units",
    "sales_amount",
    "balance",
];

#[derive(Deserialize)]
struct CsvRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    previous_reading: Option<String>,
    #[serde(default)]
    new_reading: Option<String>,
    #[serde(default)]
    rate: Option<String>,
    #[serde(default)]
    amount_paid: Option<String>,
    #[serde(default)]
    consumed_units: Option<String>,
    #[serde(default)]
    sales_amount: Option<String>,
    #[serde(default)]
    balance: Option<String>,
}

impl CsvRow {
    fn into_entry(self) -> Entry {
        let mut entry = Entry::new(self.name.unwrap_or_default())
            .with_readings(
                coerce_cell(self.previous_reading.as_deref()),
                coerce_cell(self.new_reading.as_deref()),
            )
            .with_rate(coerce_cell(self.rate.as_deref()))
            .with_payment(coerce_cell(self.amount_paid.as_deref()));
        entry.set_derived(
            coerce_cell(self.consumed_units.as_deref()),
            coerce_cell(self.sales_amount.as_deref()),
            coerce_cell(self.balance.as_deref()),
        );
        entry
    }
}

#[derive(Serialize)]
struct CsvOutRow<'a> {
    name: &'a str,
    previous_reading: String,
    new_reading: String,
    rate: String,
    amount_paid: String,
    consumed_units: String,
    sales_amount: String,
    balance: String,
}

impl<'a> From<&'a Entry> for CsvOutRow<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            name: &entry.name,
            previous_reading: entry.previous_reading.to_string(),
            new_reading: entry.new_reading.to_string(),
            rate: entry.rate.to_string(),
            amount_paid: entry.amount_paid.to_string(),
            consumed_units: entry.consumed_units().to_string(),
            sales_amount: entry.sales_amount().to_string(),
            balance: entry.balance().to_string(),
        }
    }
}

/// Parses period rows from CSV text. Unknown columns are ignored and missing
/// or malformed numeric cells read as 0. Names are kept byte for byte.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<Entry>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    let mut entries = Vec::new();
    for record in rdr.deserialize::<CsvRow>() {
        entries.push(record?.into_entry());
    }
    Ok(entries)
}

/// Writes the header followed by one row per entry, exactly as given.
pub fn write_table<W: Write>(writer: W, entries: &[Entry]) -> Result<()> {
    let mut wrt = WriterBuilder::new().has_headers(false).from_writer(writer);
    wrt.write_record(HEADER)?;
    for entry in entries {
        wrt.serialize(CsvOutRow::from(entry))?;
    }
    wrt.flush()?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    /// Opens the store at `root`, creating the directory when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        tracing::debug!(root = %root.display(), "period store ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn period_path(&self, key: &PeriodKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

impl PeriodStore for CsvStore {
    fn list(&self) -> Result<Vec<PeriodKey>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(key) = PeriodKey::from_file_name(name) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn exists(&self, key: &PeriodKey) -> bool {
        self.period_path(key).is_file()
    }

    fn load(&self, key: &PeriodKey) -> Result<PeriodTable> {
        let path = self.period_path(key);
        if !path.is_file() {
            return Err(LedgerError::NotFound(key.to_string()));
        }
        let file = File::open(&path)?;
        let entries = read_table(BufReader::new(file))?;
        tracing::debug!(key = %key, rows = entries.len(), "period loaded");
        Ok(PeriodTable::with_entries(key.stem(), entries))
    }

    fn save(&self, key: &PeriodKey, table: &PeriodTable) -> Result<()> {
        let path = self.period_path(key);
        let tmp = tmp_path(&path);
        let entries = compute_derived(&table.entries);
        let written = write_snapshot(&tmp, &entries)
            .and_then(|()| fs::rename(&tmp, &path).map_err(LedgerError::from));
        if let Err(err) = written {
            if tmp.is_file() {
                let _ = fs::remove_file(&tmp);
            }
            tracing::warn!(key = %key, error = %err, "period save failed");
            return Err(err);
        }
        tracing::debug!(key = %key, rows = entries.len(), "period saved");
        Ok(())
    }
}

fn write_snapshot(tmp: &Path, entries: &[Entry]) -> Result<()> {
    let mut file = BufWriter::new(File::create(tmp)?);
    write_table(&mut file, entries)?;
    file.flush()?;
    Ok(())
}
