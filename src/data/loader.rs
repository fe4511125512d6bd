use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::DataType;
use indexmap::IndexMap;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{Dataset, Record, UNKNOWN_SENSITIVITY};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a susceptibility matrix from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – document produced by the spreadsheet converter (see [`load_json`])
/// * `.csv`     – raw matrix, organism column first, one column per drug
/// * `.parquet` – same layout as the CSV matrix
///
/// Missing cells become [`UNKNOWN_SENSITIVITY`]. Single-shot: no retries.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => {
            return Err(LoadError::UnsupportedFormat {
                extension: other.to_string(),
            })
        }
    };

    if dataset.is_empty() {
        return Err(LoadError::EmptyMatrix {
            path: path.to_path_buf(),
        });
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsonDocument {
    #[serde(default)]
    drug_list: Vec<JsonValue>,
    data: Vec<JsonRecord>,
}

#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(default)]
    bacteria: JsonValue,
    #[serde(default)]
    antibiotics: IndexMap<String, JsonValue>,
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "bacteria_list": ["大肠埃希菌\nEscherichia coli", ...],
///   "drug_list": ["Ampicillin", "Gentamicin", ...],
///   "data": [
///     { "bacteria": "大肠埃希菌\nEscherichia coli",
///       "antibiotics": { "Ampicillin": "R", "Gentamicin": "S" } },
///     ...
///   ],
///   "drug_indexed": { ... }
/// }
/// ```
///
/// Only `data` is required. `drug_indexed` is ignored; the index is rebuilt
/// from `data` on every load.
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    parse_json(&text).map_err(|e| LoadError::parse(path, e))
}

fn parse_json(text: &str) -> Result<Dataset, serde_json::Error> {
    let text = null_non_finite(text);
    let doc: JsonDocument = serde_json::from_str(&text)?;

    let declared: Vec<String> = doc
        .drug_list
        .iter()
        .filter_map(json_to_name)
        .collect();

    let mut records = Vec::with_capacity(doc.data.len());
    for rec in doc.data {
        // Blank spreadsheet rows carry a NaN (now null) name.
        let Some(organism_name) = json_to_name(&rec.bacteria) else {
            continue;
        };

        let mut sensitivities: IndexMap<String, String> = rec
            .antibiotics
            .iter()
            .map(|(drug, cell)| (drug.clone(), json_to_label(cell)))
            .collect();
        for drug in &declared {
            if !sensitivities.contains_key(drug) {
                sensitivities.insert(drug.clone(), UNKNOWN_SENSITIVITY.to_string());
            }
        }

        records.push(Record {
            organism_name,
            sensitivities,
        });
    }

    Ok(Dataset::new(records, declared))
}

/// Python's `json.dump` writes missing floats as bare `NaN` / `Infinity` /
/// `-Infinity`, which are not JSON. Rewrite those tokens outside string
/// literals to `null`.
fn null_non_finite(text: &str) -> Cow<'_, str> {
    if !text.contains("NaN") && !text.contains("Infinity") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = ["NaN", "Infinity", "-Infinity"]
            .into_iter()
            .find(|t| rest.starts_with(t))
        {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    Cow::Owned(out)
}

fn json_to_name(val: &JsonValue) -> Option<String> {
    let name = match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => return None,
        other => other.to_string(),
    };
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

fn json_to_label(val: &JsonValue) -> String {
    match val {
        JsonValue::Null => UNKNOWN_SENSITIVITY.to_string(),
        JsonValue::String(s) => normalize_label(s),
        other => normalize_label(&other.to_string()),
    }
}

fn normalize_label(raw: &str) -> String {
    let label = raw.trim();
    if label.is_empty() {
        UNKNOWN_SENSITIVITY.to_string()
    } else {
        label.to_string()
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row, first column the organism, one column per drug.
/// Quoted organism cells may contain line breaks. Rows shorter than the
/// header are padded with the unknown label.
fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    parse_csv(file).map_err(|e| LoadError::parse(path, e))
}

fn parse_csv<R: std::io::Read>(input: R) -> Result<Dataset, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();

    // Column index → drug name; duplicate headers keep the first column.
    let mut seen = HashSet::new();
    let drug_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, h)| (i, h.trim().to_string()))
        .filter(|(_, h)| !h.is_empty() && seen.insert(h.clone()))
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let organism_name = row.get(0).unwrap_or("");
        if organism_name.trim().is_empty() {
            continue;
        }

        let sensitivities = drug_columns
            .iter()
            .map(|(idx, drug)| (drug.clone(), normalize_label(row.get(*idx).unwrap_or(""))))
            .collect();

        records.push(Record {
            organism_name: organism_name.to_string(),
            sensitivities,
        });
    }

    let declared = drug_columns.into_iter().map(|(_, d)| d).collect();
    Ok(Dataset::new(records, declared))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet matrix.
///
/// Expected schema:
/// - column 0: organism name (Utf8 / LargeUtf8)
/// - every other column: one drug, cells rendered as text (nulls → unknown)
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| LoadError::parse(path, format!("reading parquet metadata: {e}")))?;

    let declared: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .skip(1)
        .map(|f| f.name().clone())
        .collect();

    let reader = builder
        .build()
        .map_err(|e| LoadError::parse(path, format!("building parquet reader: {e}")))?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| LoadError::parse(path, format!("reading parquet record batch: {e}")))?;
        if batch.num_columns() == 0 {
            continue;
        }
        let name_col = batch.column(0);
        let drug_cols: Vec<&ArrayRef> = batch.columns().iter().skip(1).collect();

        for row in 0..batch.num_rows() {
            let Some(organism_name) = cell_text(name_col, row)
                .map_err(|e| LoadError::parse(path, format!("row {row}, organism: {e}")))?
                .filter(|n| !n.trim().is_empty())
            else {
                continue;
            };

            let mut sensitivities = IndexMap::with_capacity(drug_cols.len());
            for (drug, col) in declared.iter().zip(&drug_cols) {
                let label = cell_text(col, row)
                    .map_err(|e| LoadError::parse(path, format!("row {row}, {drug}: {e}")))?
                    .map(|s| normalize_label(&s))
                    .unwrap_or_else(|| UNKNOWN_SENSITIVITY.to_string());
                sensitivities.insert(drug.clone(), label);
            }

            records.push(Record {
                organism_name,
                sensitivities,
            });
        }
    }

    Ok(Dataset::new(records, declared))
}

// -- Arrow helpers --

/// Render one cell as text; `None` for nulls.
fn cell_text(col: &ArrayRef, row: usize) -> Result<Option<String>, arrow::error::ArrowError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        _ => arrow::util::display::array_value_to_string(col.as_ref(), row)?,
    };
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::tempdir;

    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn json_fills_declared_drugs_and_nulls_with_unknown() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "matrix.json",
            r#"{
                "bacteria_list": ["大肠埃希菌\nEscherichia coli", "金黄色葡萄球菌\nStaphylococcus aureus"],
                "drug_list": ["Ampicillin", "Gentamicin"],
                "data": [
                    {"bacteria": "大肠埃希菌\nEscherichia coli",
                     "antibiotics": {"Ampicillin": "R", "Gentamicin": " S "}},
                    {"bacteria": "金黄色葡萄球菌\nStaphylococcus aureus",
                     "antibiotics": {"Ampicillin": null}}
                ],
                "drug_indexed": {"Ampicillin": []}
            }"#,
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.declared_drugs(), ["Ampicillin", "Gentamicin"]);
        assert_eq!(ds.records()[0].sensitivity("Gentamicin"), Some("S"));
        assert_eq!(
            ds.records()[1].sensitivity("Ampicillin"),
            Some(UNKNOWN_SENSITIVITY)
        );
        assert_eq!(
            ds.records()[1].sensitivity("Gentamicin"),
            Some(UNKNOWN_SENSITIVITY)
        );
        assert_eq!(ds.records()[0].organism_name, "大肠埃希菌\nEscherichia coli");
    }

    #[test]
    fn json_skips_rows_without_a_name() {
        let ds = parse_json(
            r#"{"data": [
                {"bacteria": null, "antibiotics": {"A": "S"}},
                {"bacteria": "  ", "antibiotics": {"A": "S"}},
                {"bacteria": "Kept", "antibiotics": {"A": 1}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].sensitivity("A"), Some("1"));
    }

    #[test]
    fn json_from_python_with_nan_rows_loads() {
        let ds = parse_json(
            r#"{"bacteria_list": ["Escherichia coli", NaN],
                "drug_list": ["Ampicillin", "Gentamicin"],
                "data": [
                    {"bacteria": "Escherichia coli",
                     "antibiotics": {"Ampicillin": "R", "Gentamicin": -Infinity}},
                    {"bacteria": NaN, "antibiotics": {"Ampicillin": "未知", "Gentamicin": NaN}}
                ]}"#,
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].organism_name, "Escherichia coli");
        assert_eq!(
            ds.records()[0].sensitivity("Gentamicin"),
            Some(UNKNOWN_SENSITIVITY)
        );
    }

    #[test]
    fn nan_inside_strings_is_kept() {
        assert_eq!(
            null_non_finite(r#"{"a": "NaN \"Infinity\"", "b": NaN}"#),
            r#"{"a": "NaN \"Infinity\"", "b": null}"#
        );
        assert!(matches!(null_non_finite(r#"{"a": 1}"#), Cow::Borrowed(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "bad.json", "{ \"data\": [ ");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn csv_matrix_with_empty_cells() {
        let dir = tempdir().unwrap();
        let path = write(
            dir.path(),
            "matrix.csv",
            "organism,Ampicillin,Gentamicin,Ampicillin\n\
             \"大肠埃希菌\nEscherichia coli\",R,S,X\n\
             ,S,S,S\n\
             Staphylococcus aureus,S\n",
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.declared_drugs(), ["Ampicillin", "Gentamicin"]);
        let coli = &ds.records()[0];
        assert_eq!(coli.organism_name, "大肠埃希菌\nEscherichia coli");
        assert_eq!(coli.sensitivity("Ampicillin"), Some("R"));
        let aureus = &ds.records()[1];
        assert_eq!(aureus.sensitivity("Gentamicin"), Some(UNKNOWN_SENSITIVITY));
    }

    #[test]
    fn parquet_matrix_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("organism", DataType::Utf8, true),
            Field::new("Ampicillin", DataType::Utf8, true),
            Field::new("Score", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Escherichia coli"), None, Some("Klebsiella")])),
                Arc::new(StringArray::from(vec![Some("R"), Some("S"), None])),
                Arc::new(Int64Array::from(vec![Some(3), Some(4), None])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.declared_drugs(), ["Ampicillin", "Score"]);
        assert_eq!(ds.records()[0].sensitivity("Score"), Some("3"));
        assert_eq!(
            ds.records()[1].sensitivity("Ampicillin"),
            Some(UNKNOWN_SENSITIVITY)
        );
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }), "{err:?}");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("matrix.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { ref extension } if extension == "xlsx"));
    }

    #[test]
    fn header_only_source_is_empty() {
        let dir = tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", "organism,Ampicillin\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::EmptyMatrix { .. }), "{err:?}");
    }
}
