use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};

use antibiogram::data::compare::{DrugComparison, OrganismComparison};
use antibiogram::data::model::{DrugResult, Record, SensitivityClass, single_line};
use antibiogram::data::snapshot::Snapshot;
use antibiogram::data::store::MatrixStore;
use antibiogram::QueryError;

use crate::color::SensitivityColors;

// ---------------------------------------------------------------------------
// Query modes and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Organism,
    Drug,
    CompareOrganisms,
    CompareDrugs,
}

impl QueryMode {
    pub const ALL: [QueryMode; 4] = [
        QueryMode::Organism,
        QueryMode::Drug,
        QueryMode::CompareOrganisms,
        QueryMode::CompareDrugs,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QueryMode::Organism => "Organism",
            QueryMode::Drug => "Drug",
            QueryMode::CompareOrganisms => "Compare organisms",
            QueryMode::CompareDrugs => "Compare drugs",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, QueryMode::CompareOrganisms | QueryMode::CompareDrugs)
    }

    /// Whether names picked from the side lists should be drugs.
    pub fn wants_drugs(self) -> bool {
        matches!(self, QueryMode::Drug | QueryMode::CompareDrugs)
    }

    fn min_inputs(self) -> usize {
        if self.is_comparison() {
            2
        } else {
            1
        }
    }
}

/// The result currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryView {
    Organism(Record),
    Drug {
        drug: String,
        results: Vec<DrugResult>,
    },
    OrganismComparison(OrganismComparison),
    DrugComparison(DrugComparison),
}

/// A rendered table: header cells and rows of label cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl QueryView {
    pub fn title(&self) -> String {
        match self {
            QueryView::Organism(rec) => rec.display_name(),
            QueryView::Drug { drug, results } => format!("{drug} ({} organisms)", results.len()),
            QueryView::OrganismComparison(cmp) => format!(
                "{} organisms across {} drugs",
                cmp.organisms.len(),
                cmp.rows.len()
            ),
            QueryView::DrugComparison(cmp) => format!(
                "{} drugs across {} organisms",
                cmp.drugs.len(),
                cmp.rows.len()
            ),
        }
    }

    /// Flatten into a table. The first column is the row key; every other
    /// cell is a sensitivity label.
    pub fn table(&self) -> Table {
        match self {
            QueryView::Organism(rec) => Table {
                header: vec!["Drug".into(), "Sensitivity".into()],
                rows: rec
                    .sensitivities
                    .iter()
                    .map(|(d, s)| vec![d.clone(), s.clone()])
                    .collect(),
            },
            QueryView::Drug { results, .. } => Table {
                header: vec!["Organism".into(), "Sensitivity".into()],
                rows: results
                    .iter()
                    .map(|r| vec![single_line(&r.organism_name), r.sensitivity.clone()])
                    .collect(),
            },
            QueryView::OrganismComparison(cmp) => Table {
                header: std::iter::once("Drug".to_string())
                    .chain(cmp.organisms.iter().map(|o| single_line(o)))
                    .collect(),
                rows: cmp
                    .rows
                    .iter()
                    .map(|r| std::iter::once(r.drug.clone()).chain(r.sensitivities.iter().cloned()).collect())
                    .collect(),
            },
            QueryView::DrugComparison(cmp) => Table {
                header: std::iter::once("Organism".to_string())
                    .chain(cmp.drugs.iter().cloned())
                    .collect(),
                rows: cmp
                    .rows
                    .iter()
                    .map(|r| {
                        std::iter::once(single_line(&r.organism))
                            .chain(r.sensitivities.iter().cloned())
                            .collect()
                    })
                    .collect(),
            },
        }
    }

    /// Per-class organism counts for a single-drug view, in class order.
    pub fn class_counts(&self) -> Option<Vec<(SensitivityClass, usize)>> {
        let QueryView::Drug { results, .. } = self else {
            return None;
        };
        let mut counts = std::collections::BTreeMap::new();
        for r in results {
            *counts.entry(SensitivityClass::classify(&r.sensitivity)).or_insert(0) += 1;
        }
        Some(counts.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Shared dataset handle.
    pub store: MatrixStore,

    pub mode: QueryMode,

    /// One text field per name; comparisons keep at least two.
    pub inputs: Vec<String>,

    /// Substring filter applied to the side lists.
    pub list_filter: String,

    /// Result of the last successful query.
    pub view: Option<QueryView>,

    /// Colours for the labels of the loaded dataset.
    pub colors: SensitivityColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(store: MatrixStore) -> Self {
        let mut state = Self {
            store,
            mode: QueryMode::Organism,
            inputs: vec![String::new()],
            list_filter: String::new(),
            view: None,
            colors: SensitivityColors::default(),
            status_message: None,
        };
        match state.store.current() {
            Some(snapshot) => state.rebuild_colors(&snapshot),
            None => {
                state.status_message = Some(format!(
                    "No dataset loaded ({})",
                    state.store.source().display()
                ))
            }
        }
        state
    }

    /// Switch mode, keeping typed names where possible.
    pub fn set_mode(&mut self, mode: QueryMode) {
        if self.mode.wants_drugs() != mode.wants_drugs() {
            self.inputs.iter_mut().for_each(String::clear);
        }
        self.mode = mode;
        if !mode.is_comparison() {
            self.inputs.truncate(1);
        }
        while self.inputs.len() < mode.min_inputs() {
            self.inputs.push(String::new());
        }
    }

    pub fn add_input(&mut self) {
        if self.mode.is_comparison() {
            self.inputs.push(String::new());
        }
    }

    pub fn remove_input(&mut self, i: usize) {
        if self.inputs.len() > self.mode.min_inputs() && i < self.inputs.len() {
            self.inputs.remove(i);
        }
    }

    /// Put a name picked from a side list into the first empty field, or
    /// the last field when all are filled.
    pub fn pick(&mut self, name: &str) {
        let name = single_line(name);
        match self.inputs.iter_mut().find(|s| s.trim().is_empty()) {
            Some(slot) => *slot = name,
            None => {
                if let Some(last) = self.inputs.last_mut() {
                    *last = name;
                }
            }
        }
    }

    /// Run the query for the current mode and inputs.
    pub fn run_query(&mut self) {
        match self.execute() {
            Ok(view) => {
                self.view = Some(view);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Query failed ({}): {e}", e.reason());
                self.status_message = Some(e.to_string());
            }
        }
    }

    fn execute(&self) -> Result<QueryView, QueryError> {
        let snapshot = self.store.snapshot()?;
        let first = self.inputs.first().map(String::as_str).unwrap_or("");
        let view = match self.mode {
            QueryMode::Organism => QueryView::Organism(snapshot.find_organism(first)?),
            QueryMode::Drug => QueryView::Drug {
                drug: first.trim().to_string(),
                results: snapshot.find_drug(first)?,
            },
            QueryMode::CompareOrganisms => {
                QueryView::OrganismComparison(snapshot.compare_organisms(&self.filled_inputs())?)
            }
            QueryMode::CompareDrugs => {
                QueryView::DrugComparison(snapshot.compare_drugs(&self.filled_inputs())?)
            }
        };
        Ok(view)
    }

    /// Non-blank inputs; blank trailing fields do not count as names.
    fn filled_inputs(&self) -> Vec<&str> {
        self.inputs
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Load a new source file chosen by the user.
    pub fn open_path(&mut self, path: &Path) {
        match self.store.load_from(path) {
            Ok(snapshot) => self.on_loaded(&snapshot),
            Err(e) => {
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Re-read the configured source.
    pub fn reload(&mut self) {
        match self.store.load() {
            Ok(snapshot) => self.on_loaded(&snapshot),
            Err(e) => {
                self.status_message = Some(format!("Reload failed, keeping previous data: {e}"));
            }
        }
    }

    fn on_loaded(&mut self, snapshot: &Snapshot) {
        self.rebuild_colors(snapshot);
        self.view = None;
        self.status_message = None;
    }

    fn rebuild_colors(&mut self, snapshot: &Snapshot) {
        let labels: BTreeSet<String> = snapshot
            .dataset()
            .records()
            .iter()
            .flat_map(|r| r.sensitivities.values().cloned())
            .collect();
        self.colors = SensitivityColors::new(&labels);
    }

    /// One-line summary for the top bar.
    pub fn stats_line(&self) -> Option<String> {
        let snapshot = self.store.current()?;
        let stats = snapshot.stats();
        Some(format!(
            "{} organisms, {} drugs, {} records",
            stats.organism_count, stats.drug_count, stats.record_count
        ))
    }

    /// Write the current result table as CSV.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let Some(view) = &self.view else {
            bail!("Nothing to export: run a query first");
        };
        let table = view.table();
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(&table.header).context("writing CSV header")?;
        for row in &table.rows {
            writer.write_record(row).context("writing CSV row")?;
        }
        writer.flush().context("flushing CSV")?;
        log::info!("Exported {} rows to {}", table.rows.len(), path.display());
        Ok(())
    }
}
