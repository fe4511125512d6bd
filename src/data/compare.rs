use std::collections::HashSet;

use serde::Serialize;

use super::error::QueryError;
use super::model::{EntityKind, Record, UNKNOWN_SENSITIVITY};
use super::query::require_name;
use super::snapshot::Snapshot;

/// Fewest names a comparison accepts.
pub const MIN_COMPARE: usize = 2;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Drugs × organisms table. `sensitivities` in each row line up with
/// `organisms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganismComparison {
    /// Resolved organism names, in input order.
    pub organisms: Vec<String>,
    pub rows: Vec<DrugRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrugRow {
    pub drug: String,
    pub sensitivities: Vec<String>,
}

/// Organisms × drugs table. `sensitivities` in each row line up with
/// `drugs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrugComparison {
    pub drugs: Vec<String>,
    pub rows: Vec<OrganismRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganismRow {
    pub organism: String,
    pub sensitivities: Vec<String>,
}

fn require_count<S>(names: &[S], kind: EntityKind) -> Result<(), QueryError> {
    if names.len() < MIN_COMPARE {
        return Err(QueryError::InvalidInput(format!(
            "at least {MIN_COMPARE} {kind} names are required, got {}",
            names.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Multi-entity comparisons
// ---------------------------------------------------------------------------

impl Snapshot {
    /// Cross-tabulate several organisms against every drug any of them has.
    ///
    /// Each name is resolved like [`Snapshot::find_organism`]; the first name
    /// that does not resolve fails the whole comparison. Rows follow the
    /// drug vocabulary order.
    pub fn compare_organisms<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<OrganismComparison, QueryError> {
        require_count(names, EntityKind::Organism)?;

        let resolved: Vec<&Record> = names
            .iter()
            .map(|n| self.resolve_organism(n.as_ref()))
            .collect::<Result<_, _>>()?;

        let union: HashSet<&str> = resolved
            .iter()
            .flat_map(|r| r.sensitivities.keys().map(String::as_str))
            .collect();

        let rows = self
            .index()
            .drugs()
            .filter(|drug| union.contains(drug))
            .map(|drug| DrugRow {
                drug: drug.to_string(),
                sensitivities: resolved
                    .iter()
                    .map(|r| r.sensitivity(drug).unwrap_or(UNKNOWN_SENSITIVITY).to_string())
                    .collect(),
            })
            .collect();

        Ok(OrganismComparison {
            organisms: resolved.iter().map(|r| r.organism_name.clone()).collect(),
            rows,
        })
    }

    /// Cross-tabulate several drugs (exact names) against every organism
    /// with a result for any of them. Rows follow dataset order; unknown
    /// drug names contribute no organisms.
    pub fn compare_drugs<S: AsRef<str>>(&self, names: &[S]) -> Result<DrugComparison, QueryError> {
        require_count(names, EntityKind::Drug)?;

        let mut drugs: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            drugs.push(require_name(name.as_ref(), EntityKind::Drug)?);
        }

        let union: HashSet<&str> = drugs
            .iter()
            .filter_map(|d| self.index().get(d))
            .flatten()
            .map(|r| r.organism_name.as_str())
            .collect();

        let rows = self
            .dataset()
            .records()
            .iter()
            .filter(|r| union.contains(r.organism_name.as_str()))
            .map(|record| OrganismRow {
                organism: record.organism_name.clone(),
                sensitivities: drugs
                    .iter()
                    .map(|d| self.sensitivity_of(record, d).to_string())
                    .collect(),
            })
            .collect();

        Ok(DrugComparison {
            drugs: drugs.iter().map(|d| d.to_string()).collect(),
            rows,
        })
    }

    /// Index lookup first, then the record itself, else unknown.
    ///
    /// The index is keyed by organism name, so records sharing a name all
    /// read the first such record's label for `drug`.
    fn sensitivity_of<'a>(&'a self, record: &'a Record, drug: &str) -> &'a str {
        let indexed = self.index().get(drug).and_then(|results| {
            results
                .iter()
                .find(|r| r.organism_name == record.organism_name)
                .map(|r| r.sensitivity.as_str())
        });
        if let Some(label) = indexed {
            return label;
        }
        match record.sensitivity(drug) {
            Some(label) => {
                log::debug!("{drug:?} for {:?} served from record", record.display_name());
                label
            }
            None => UNKNOWN_SENSITIVITY,
        }
    }
}
