use indexmap::IndexMap;

use super::model::{Dataset, DrugResult};

// ---------------------------------------------------------------------------
// DrugIndex – drug → per-organism results
// ---------------------------------------------------------------------------

/// Reverse view of a [`Dataset`]: every drug with its results in dataset
/// organism order. The key order is the global drug vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugIndex {
    by_drug: IndexMap<String, Vec<DrugResult>>,
}

impl DrugIndex {
    /// Build the index from a dataset.
    ///
    /// Vocabulary order: the declared drug columns first, then any further
    /// drug keys in first-seen order across the records.
    pub fn build(dataset: &Dataset) -> Self {
        let mut by_drug: IndexMap<String, Vec<DrugResult>> = dataset
            .declared_drugs()
            .iter()
            .map(|d| (d.clone(), Vec::new()))
            .collect();

        for record in dataset.records() {
            for (drug, label) in &record.sensitivities {
                by_drug
                    .entry(drug.clone())
                    .or_default()
                    .push(DrugResult::new(record.organism_name.clone(), label.clone()));
            }
        }

        log::debug!(
            "indexed {} drugs over {} organisms",
            by_drug.len(),
            dataset.len()
        );
        DrugIndex { by_drug }
    }

    /// Results for an exact drug name.
    pub fn get(&self, drug: &str) -> Option<&[DrugResult]> {
        self.by_drug.get(drug).map(Vec::as_slice)
    }

    pub fn contains(&self, drug: &str) -> bool {
        self.by_drug.contains_key(drug)
    }

    /// Drug by 1-based position in the vocabulary.
    pub fn drug(&self, id: usize) -> Option<&str> {
        let i = id.checked_sub(1)?;
        self.by_drug.get_index(i).map(|(name, _)| name.as_str())
    }

    /// The drug vocabulary in canonical order.
    pub fn drugs(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_drug.keys().map(String::as_str)
    }

    /// Number of distinct drugs.
    pub fn len(&self) -> usize {
        self.by_drug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_drug.is_empty()
    }
}

/// Linear scan of the dataset for one drug, in organism order.
pub fn scan_drug(dataset: &Dataset, drug: &str) -> Vec<DrugResult> {
    dataset
        .records()
        .iter()
        .filter_map(|r| {
            r.sensitivity(drug)
                .map(|label| DrugResult::new(r.organism_name.clone(), label))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                Record::new("Escherichia coli", [("Gentamicin", "S"), ("Ampicillin", "R")]),
                Record::new("Staphylococcus aureus", [("Vancomycin", "S"), ("Ampicillin", "S")]),
            ],
            vec!["Ampicillin".into()],
        )
    }

    #[test]
    fn vocabulary_is_declared_then_first_seen() {
        let index = DrugIndex::build(&sample());
        let drugs: Vec<&str> = index.drugs().collect();
        assert_eq!(drugs, ["Ampicillin", "Gentamicin", "Vancomycin"]);
        assert_eq!(index.drug(1), Some("Ampicillin"));
        assert_eq!(index.drug(3), Some("Vancomycin"));
        assert_eq!(index.drug(0), None);
        assert_eq!(index.drug(4), None);
    }

    #[test]
    fn entries_follow_dataset_order() {
        let index = DrugIndex::build(&sample());
        assert_eq!(
            index.get("Ampicillin").unwrap(),
            [
                DrugResult::new("Escherichia coli", "R"),
                DrugResult::new("Staphylococcus aureus", "S"),
            ]
        );
    }

    #[test]
    fn index_agrees_with_scan_for_every_drug() {
        let ds = sample();
        let index = DrugIndex::build(&ds);
        for drug in index.drugs() {
            assert_eq!(index.get(drug).unwrap(), scan_drug(&ds, drug).as_slice());
        }
    }

    #[test]
    fn declared_drug_without_results_is_still_indexed() {
        let ds = Dataset::new(
            vec![Record::new("Escherichia coli", [("Ampicillin", "R")])],
            vec!["Colistin".into()],
        );
        let index = DrugIndex::build(&ds);
        assert!(index.contains("Colistin"));
        assert_eq!(index.get("Colistin"), Some(&[][..]));
        assert_eq!(index.len(), 2);
    }
}
