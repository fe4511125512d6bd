use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde_json::{json, Map, Value as JsonValue};

use antibiogram::data::index::DrugIndex;
use antibiogram::data::model::{Dataset, Record, UNKNOWN_SENSITIVITY};

const DRUGS: [&str; 8] = [
    "Penicillin G",
    "Ampicillin",
    "Oxacillin",
    "Ceftriaxone",
    "Meropenem",
    "Gentamicin",
    "Ciprofloxacin",
    "Vancomycin",
];

/// organism → one cell per drug; `None` is a blank spreadsheet cell.
const MATRIX: [(&str, [Option<&str>; 8]); 8] = [
    (
        "化脓性链球菌\nStreptococcus pyogenes",
        [Some("+"), Some("+"), Some("+"), Some("+"), Some("+"), Some("0"), Some("±"), Some("+")],
    ),
    (
        "肺炎链球菌\nStreptococcus pneumoniae",
        [Some("+"), Some("+"), Some("+"), Some("+"), Some("+"), Some("0"), Some("±"), Some("+")],
    ),
    (
        "金黄色葡萄球菌(MSSA)\nStaphylococcus aureus",
        [Some("0"), Some("0"), Some("+"), Some("+"), Some("+"), Some("+"), Some("±"), Some("+")],
    ),
    (
        "耐甲氧西林金黄色葡萄球菌\nMRSA",
        [Some("0"), Some("0"), Some("0"), Some("0"), Some("0"), Some("±"), Some("0"), Some("+")],
    ),
    (
        "粪肠球菌\nEnterococcus faecalis",
        [Some("+"), Some("+"), Some("0"), Some("0"), Some("±"), None, Some("±"), Some("+")],
    ),
    (
        "大肠埃希菌\nEscherichia coli",
        [Some("0"), Some("±"), Some("0"), Some("+"), Some("+"), Some("+"), Some("+"), Some("0")],
    ),
    (
        "肺炎克雷伯菌\nKlebsiella pneumoniae",
        [Some("0"), Some("0"), Some("0"), Some("+"), Some("+"), Some("+"), Some("+"), Some("0")],
    ),
    (
        "铜绿假单胞菌\nPseudomonas aeruginosa",
        [Some("0"), Some("0"), Some("0"), Some("0"), Some("+"), Some("+"), Some("+"), None],
    ),
];

fn dataset() -> Dataset {
    let records = MATRIX
        .iter()
        .map(|(organism, cells)| {
            Record::new(
                *organism,
                DRUGS
                    .iter()
                    .zip(cells)
                    .map(|(drug, cell)| (*drug, cell.unwrap_or(UNKNOWN_SENSITIVITY))),
            )
        })
        .collect();
    Dataset::new(records, DRUGS.iter().map(|d| d.to_string()).collect())
}

/// The document layout the spreadsheet converter produces.
fn write_json(dataset: &Dataset, path: &Path) -> Result<()> {
    let index = DrugIndex::build(dataset);
    let drug_indexed: Map<String, JsonValue> = index
        .drugs()
        .map(|drug| {
            let results = index.get(drug).unwrap_or_default();
            let entries: Vec<JsonValue> = results
                .iter()
                .map(|r| json!({ "bacteria": r.organism_name, "sensitivity": r.sensitivity }))
                .collect();
            (drug.to_string(), JsonValue::Array(entries))
        })
        .collect();

    let doc = json!({
        "bacteria_list": dataset.records().iter().map(|r| &r.organism_name).collect::<Vec<_>>(),
        "drug_list": dataset.declared_drugs(),
        "data": dataset
            .records()
            .iter()
            .map(|r| json!({ "bacteria": r.organism_name, "antibiotics": r.sensitivities }))
            .collect::<Vec<_>>(),
        "drug_indexed": drug_indexed,
    });

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &doc).context("writing JSON")?;
    Ok(())
}

/// Raw matrix; blank cells stay blank.
fn write_csv(path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer
        .write_record(std::iter::once("organism").chain(DRUGS))
        .context("writing CSV header")?;
    for (organism, cells) in &MATRIX {
        writer
            .write_record(std::iter::once(*organism).chain(cells.iter().map(|c| c.unwrap_or(""))))
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Same matrix as Parquet; blank cells become nulls.
fn write_parquet(path: &Path) -> Result<RecordBatch> {
    let mut fields = vec![Field::new("organism", DataType::Utf8, false)];
    fields.extend(DRUGS.iter().map(|d| Field::new(*d, DataType::Utf8, true)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
        MATRIX.iter().map(|(o, _)| *o).collect::<Vec<_>>(),
    ))];
    for col in 0..DRUGS.len() {
        let cells: Vec<Option<&str>> = MATRIX.iter().map(|(_, cells)| cells[col]).collect();
        columns.push(Arc::new(StringArray::from(cells)));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(batch)
}

fn main() -> Result<()> {
    env_logger::init();

    let dataset = dataset();
    write_json(&dataset, Path::new("sample_data.json"))?;
    write_csv(Path::new("sample_data.csv"))?;
    let batch = write_parquet(Path::new("sample_data.parquet"))?;

    log::debug!("{}", pretty_format_batches(&[batch]).context("formatting batch")?);
    println!(
        "Wrote {} organisms × {} drugs to sample_data.{{json,csv,parquet}}",
        dataset.len(),
        DRUGS.len()
    );
    Ok(())
}
