use std::collections::HashSet;

use serde::Serialize;

use super::error::QueryError;
use super::index::scan_drug;
use super::model::{DrugResult, EntityKind, Record, Stats};
use super::resolve;
use super::snapshot::Snapshot;

/// Result of a positional lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Organism { id: usize, record: Record },
    Drug { id: usize, name: String },
}

/// Trimmed, non-empty name or `InvalidInput`.
pub(crate) fn require_name(name: &str, kind: EntityKind) -> Result<&str, QueryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(QueryError::InvalidInput(format!("a {kind} name is required")));
    }
    Ok(name)
}

// ---------------------------------------------------------------------------
// Single-entity lookups
// ---------------------------------------------------------------------------

impl Snapshot {
    /// Resolve free text to the first matching record.
    pub(crate) fn resolve_organism(&self, name: &str) -> Result<&Record, QueryError> {
        let query = require_name(name, EntityKind::Organism)?;
        let records = self.dataset().records();
        resolve::resolve(query, records.iter().map(|r| r.organism_name.as_str()))
            .map(|pos| &records[pos])
            .ok_or_else(|| QueryError::not_found(EntityKind::Organism, query))
    }

    /// Organism record best matching `name`.
    pub fn find_organism(&self, name: &str) -> Result<Record, QueryError> {
        self.resolve_organism(name).cloned()
    }

    /// Every organism's result for `drug` (exact name), in dataset order.
    ///
    /// A drug in the vocabulary with no results yields an empty list.
    pub fn find_drug(&self, name: &str) -> Result<Vec<DrugResult>, QueryError> {
        let drug = require_name(name, EntityKind::Drug)?;
        if let Some(results) = self.index().get(drug) {
            return Ok(results.to_vec());
        }

        let results = scan_drug(self.dataset(), drug);
        if results.is_empty() {
            return Err(QueryError::not_found(EntityKind::Drug, drug));
        }
        log::debug!("drug {drug:?} missing from index, served by scan");
        Ok(results)
    }

    /// 1-based lookup into the organism list or the drug vocabulary.
    pub fn get_by_id(&self, kind: EntityKind, id: usize) -> Result<Entity, QueryError> {
        let found = match kind {
            EntityKind::Organism => self.dataset().record(id).map(|record| Entity::Organism {
                id,
                record: record.clone(),
            }),
            EntityKind::Drug => self.index().drug(id).map(|name| Entity::Drug {
                id,
                name: name.to_string(),
            }),
        };
        found.ok_or_else(|| QueryError::not_found(kind, format!("#{id}")))
    }

    pub fn stats(&self) -> Stats {
        let records = self.dataset().records();
        let distinct: HashSet<&str> = records.iter().map(|r| r.organism_name.as_str()).collect();
        Stats {
            organism_count: distinct.len(),
            drug_count: self.index().len(),
            record_count: records.len(),
        }
    }

    /// Organism names in dataset order.
    pub fn organisms(&self) -> Vec<&str> {
        self.dataset()
            .records()
            .iter()
            .map(|r| r.organism_name.as_str())
            .collect()
    }

    /// The drug vocabulary in canonical order.
    pub fn drugs(&self) -> Vec<&str> {
        self.index().drugs().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Dataset;

    fn snapshot() -> Snapshot {
        Snapshot::new(Dataset::from_records(vec![
            Record::new("Escherichia coli", [("Ampicillin", "R"), ("Gentamicin", "S")]),
            Record::new("Staphylococcus aureus", [("Ampicillin", "S")]),
        ]))
    }

    #[test]
    fn find_organism_by_partial_name() {
        let snap = snapshot();
        let rec = snap.find_organism("  aureus ").unwrap();
        assert_eq!(rec.organism_name, "Staphylococcus aureus");
        assert_eq!(rec.sensitivity("Ampicillin"), Some("S"));
    }

    #[test]
    fn every_organism_finds_itself() {
        let snap = snapshot();
        for rec in snap.dataset().records() {
            assert_eq!(&snap.find_organism(&rec.organism_name).unwrap(), rec);
        }
    }

    #[test]
    fn find_organism_failures() {
        let snap = snapshot();
        assert!(matches!(
            snap.find_organism("Candida"),
            Err(QueryError::NotFound { kind: EntityKind::Organism, ref name }) if name == "Candida"
        ));
        assert!(matches!(snap.find_organism("   "), Err(QueryError::InvalidInput(_))));
    }

    #[test]
    fn find_drug_in_dataset_order() {
        let snap = snapshot();
        assert_eq!(
            snap.find_drug("Ampicillin").unwrap(),
            vec![
                DrugResult::new("Escherichia coli", "R"),
                DrugResult::new("Staphylococcus aureus", "S"),
            ]
        );
        assert!(matches!(
            snap.find_drug("ampicillin"),
            Err(QueryError::NotFound { kind: EntityKind::Drug, .. })
        ));
    }

    #[test]
    fn get_by_id_is_one_based_and_unclamped() {
        let snap = snapshot();
        match snap.get_by_id(EntityKind::Organism, 2).unwrap() {
            Entity::Organism { id, record } => {
                assert_eq!(id, 2);
                assert_eq!(record.organism_name, "Staphylococcus aureus");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            snap.get_by_id(EntityKind::Drug, 2).unwrap(),
            Entity::Drug {
                id: 2,
                name: "Gentamicin".into()
            }
        );
        assert!(snap.get_by_id(EntityKind::Organism, 0).is_err());
        assert!(snap.get_by_id(EntityKind::Organism, 3).is_err());
        assert!(snap.get_by_id(EntityKind::Drug, 3).is_err());
    }

    #[test]
    fn stats_counts() {
        let stats = snapshot().stats();
        assert_eq!(
            stats,
            Stats {
                organism_count: 2,
                drug_count: 2,
                record_count: 2,
            }
        );
    }

    #[test]
    fn listings_follow_canonical_order() {
        let snap = snapshot();
        assert_eq!(snap.organisms(), ["Escherichia coli", "Staphylococcus aureus"]);
        assert_eq!(snap.drugs(), ["Ampicillin", "Gentamicin"]);
    }
}
