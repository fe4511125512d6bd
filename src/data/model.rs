use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Label stored for an organism/drug pair that has no recorded result.
pub const UNKNOWN_SENSITIVITY: &str = "未知";

// ---------------------------------------------------------------------------
// SensitivityClass – broad reading of a label
// ---------------------------------------------------------------------------

/// Coarse interpretation of a sensitivity label, used for colouring and
/// summary counts. The label itself is always kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SensitivityClass {
    Susceptible,
    Intermediate,
    Resistant,
    Unknown,
    /// Any label outside the usual vocabulary (footnote marks, free text).
    Other,
}

impl SensitivityClass {
    /// Classify a raw label. Matrices transcribed from printed guides use
    /// `+` / `±` / `0` in place of `S` / `I` / `R`.
    pub fn classify(label: &str) -> Self {
        match label.trim() {
            "" | UNKNOWN_SENSITIVITY => SensitivityClass::Unknown,
            "S" | "s" | "+" => SensitivityClass::Susceptible,
            "I" | "i" | "±" | "+/-" => SensitivityClass::Intermediate,
            "R" | "r" | "0" => SensitivityClass::Resistant,
            _ => SensitivityClass::Other,
        }
    }
}

impl fmt::Display for SensitivityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensitivityClass::Susceptible => "susceptible",
            SensitivityClass::Intermediate => "intermediate",
            SensitivityClass::Resistant => "resistant",
            SensitivityClass::Unknown => "unknown",
            SensitivityClass::Other => "other",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// EntityKind – what a lookup is about
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organism,
    Drug,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Organism => f.write_str("organism"),
            EntityKind::Drug => f.write_str("drug"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the susceptibility matrix
// ---------------------------------------------------------------------------

/// One organism and its results against every drug column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Name as written in the source; may span several lines, typically a
    /// common name followed by the Latin binomial.
    pub organism_name: String,
    /// drug name → sensitivity label, in source column order.
    pub sensitivities: IndexMap<String, String>,
}

impl Record {
    pub fn new<I, K, V>(organism_name: impl Into<String>, sensitivities: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            organism_name: organism_name.into(),
            sensitivities: sensitivities
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Label for `drug`, if this organism has a cell for it.
    pub fn sensitivity(&self, drug: &str) -> Option<&str> {
        self.sensitivities.get(drug).map(String::as_str)
    }

    /// Organism name on a single line, for table headers and logs.
    pub fn display_name(&self) -> String {
        single_line(&self.organism_name)
    }
}

/// Collapse embedded line breaks into single spaces.
pub fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded matrix
// ---------------------------------------------------------------------------

/// All records in source order plus the drug columns the source declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Record>,
    declared_drugs: Vec<String>,
}

impl Dataset {
    /// Build a dataset. Duplicate declared drug columns keep their first
    /// position.
    pub fn new(records: Vec<Record>, declared_drugs: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let declared_drugs = declared_drugs
            .into_iter()
            .filter(|d| seen.insert(d.clone()))
            .collect();
        Self {
            records,
            declared_drugs,
        }
    }

    /// Dataset whose drug order is purely first-seen across the records.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(records, Vec::new())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Drug columns in the order the source listed them.
    pub fn declared_drugs(&self) -> &[String] {
        &self.declared_drugs
    }

    /// Record by 1-based id.
    pub fn record(&self, id: usize) -> Option<&Record> {
        id.checked_sub(1).and_then(|i| self.records.get(i))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Result payloads
// ---------------------------------------------------------------------------

/// One organism's result for a given drug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrugResult {
    pub organism_name: String,
    pub sensitivity: String,
}

impl DrugResult {
    pub fn new(organism_name: impl Into<String>, sensitivity: impl Into<String>) -> Self {
        Self {
            organism_name: organism_name.into(),
            sensitivity: sensitivity.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub organism_count: usize,
    pub drug_count: usize,
    pub record_count: usize,
}
