use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::common::{Displayable, NamedEntity};

/// One meter or account reading for a period.
///
/// The raw fields are public and freely editable. The derived fields can only
/// be set by the engine (or the store when it reads a snapshot back), so a
/// caller can never make them disagree with the raw values by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub previous_reading: f64,
    pub new_reading: f64,
    pub rate: f64,
    pub amount_paid: f64,
    #[serde(default)]
    consumed_units: f64,
    #[serde(default)]
    sales_amount: f64,
    #[serde(default)]
    balance: f64,
}

impl Entry {
    /// Creates a zeroed entry for the named entity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            previous_reading: 0.0,
            new_reading: 0.0,
            rate: 0.0,
            amount_paid: 0.0,
            consumed_units: 0.0,
            sales_amount: 0.0,
            balance: 0.0,
        }
    }

    pub fn with_readings(mut self, previous: f64, new: f64) -> Self {
        self.previous_reading = previous;
        self.new_reading = new;
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_payment(mut self, amount_paid: f64) -> Self {
        self.amount_paid = amount_paid;
        self
    }

    pub fn consumed_units(&self) -> f64 {
        self.consumed_units
    }

    pub fn sales_amount(&self) -> f64 {
        self.sales_amount
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub(crate) fn set_derived(&mut self, consumed_units: f64, sales_amount: f64, balance: f64) {
        self.consumed_units = consumed_units;
        self.sales_amount = sales_amount;
        self.balance = balance;
    }

    /// Compares only the operator-entered columns.
    pub fn raw_eq(&self, other: &Entry) -> bool {
        self.name == other.name
            && self.previous_reading == other.previous_reading
            && self.new_reading == other.new_reading
            && self.rate == other.rate
            && self.amount_paid == other.amount_paid
    }

    pub fn field(&self, field: EntryField) -> f64 {
        match field {
            EntryField::PreviousReading => self.previous_reading,
            EntryField::NewReading => self.new_reading,
            EntryField::Rate => self.rate,
            EntryField::AmountPaid => self.amount_paid,
        }
    }

    pub fn set_field(&mut self, field: EntryField, value: f64) {
        match field {
            EntryField::PreviousReading => self.previous_reading = value,
            EntryField::NewReading => self.new_reading = value,
            EntryField::Rate => self.rate = value,
            EntryField::AmountPaid => self.amount_paid = value,
        }
    }
}

impl NamedEntity for Entry {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Entry {
    fn display_label(&self) -> String {
        format!(
            "{} ({} -> {} @ {})",
            self.name, self.previous_reading, self.new_reading, self.rate
        )
    }
}

/// An entry exactly as typed into the grid, before numeric coercion.
///
/// `None` and blank cells both mean "not entered".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub name: String,
    #[serde(default)]
    pub previous_reading: Option<String>,
    #[serde(default)]
    pub new_reading: Option<String>,
    #[serde(default)]
    pub rate: Option<String>,
    #[serde(default)]
    pub amount_paid: Option<String>,
}

impl RawEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn cell(&self, field: EntryField) -> Option<&str> {
        match field {
            EntryField::PreviousReading => self.previous_reading.as_deref(),
            EntryField::NewReading => self.new_reading.as_deref(),
            EntryField::Rate => self.rate.as_deref(),
            EntryField::AmountPaid => self.amount_paid.as_deref(),
        }
    }

    pub fn with_cell(mut self, field: EntryField, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match field {
            EntryField::PreviousReading => self.previous_reading = text,
            EntryField::NewReading => self.new_reading = text,
            EntryField::Rate => self.rate = text,
            EntryField::AmountPaid => self.amount_paid = text,
        }
        self
    }
}

/// The editable numeric columns of an [`Entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryField {
    PreviousReading,
    NewReading,
    Rate,
    AmountPaid,
}

impl EntryField {
    pub const ALL: [EntryField; 4] = [
        EntryField::PreviousReading,
        EntryField::NewReading,
        EntryField::Rate,
        EntryField::AmountPaid,
    ];

    /// Column name used in persisted files.
    pub fn column(self) -> &'static str {
        match self {
            EntryField::PreviousReading => "previous_reading",
            EntryField::NewReading => "new_reading",
            EntryField::Rate => "rate",
            EntryField::AmountPaid => "amount_paid",
        }
    }
}

impl fmt::Display for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entry field `{0}` (expected previous, new, rate, or paid)")]
pub struct UnknownField(pub String);

impl FromStr for EntryField {
    type Err = UnknownField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "previous" | "prev" | "previous_reading" => Ok(EntryField::PreviousReading),
            "new" | "current" | "new_reading" => Ok(EntryField::NewReading),
            "rate" => Ok(EntryField::Rate),
            "paid" | "payment" | "amount_paid" => Ok(EntryField::AmountPaid),
            other => Err(UnknownField(other.to_string())),
        }
    }
}
