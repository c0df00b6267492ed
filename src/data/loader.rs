use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{VideoRecord, VideoTable};

/// Column names the dashboard reads. Anything else in the file is ignored.
pub const TITLE_COLUMN: &str = "title";
pub const CATEGORY_COLUMN: &str = "category";
pub const VIEWS_COLUMN: &str = "views";
pub const LIKES_COLUMN: &str = "likes";

const REQUIRED_COLUMNS: [&str; 4] = [TITLE_COLUMN, CATEGORY_COLUMN, VIEWS_COLUMN, LIKES_COLUMN];

/// Cell contents treated as missing, matching the usual dataframe CSV defaults.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a video table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, comma separated (the Kaggle export)
/// * `.parquet` – same columns, any integer/float/string physical types
///
/// Rows missing `views`, `likes` or `category` (after numeric coercion) are
/// dropped; a missing `title` is kept.
pub fn load_file(path: &Path) -> Result<VideoTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} videos in {} categories from {}",
        table.len(),
        table.categories().len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Cleaning helpers
// ---------------------------------------------------------------------------

fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.contains(&s)
}

/// Coerce a raw cell to a number; anything unparsable becomes missing.
pub(crate) fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if is_missing_token(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn clean_text(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !is_missing_token(s))
}

/// Build a record, or `None` when a required value is missing.
fn clean_row(
    title: Option<String>,
    category: Option<String>,
    views: Option<f64>,
    likes: Option<f64>,
) -> Option<VideoRecord> {
    Some(VideoRecord {
        title,
        category: category?,
        views: views?,
        likes: likes?,
    })
}

fn finish(records: Vec<VideoRecord>, total_rows: usize) -> VideoTable {
    let dropped = total_rows - records.len();
    if dropped > 0 {
        log::debug!("Dropped {dropped} of {total_rows} rows with missing views, likes or category");
    }
    VideoTable::from_records(records)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Raw CSV row before coercion. Empty cells arrive as `None`.
#[derive(Debug, Deserialize)]
struct RawVideoRow {
    title: Option<String>,
    category: Option<String>,
    views: Option<String>,
    likes: Option<String>,
}

fn load_csv(path: &Path) -> Result<VideoTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("CSV missing '{column}' column");
        }
    }

    let mut records = Vec::new();
    let mut total_rows = 0usize;

    for (row_no, result) in reader.deserialize::<RawVideoRow>().enumerate() {
        let raw = result.with_context(|| format!("CSV row {row_no}"))?;
        total_rows += 1;

        let row = clean_row(
            clean_text(raw.title),
            clean_text(raw.category),
            raw.views.as_deref().and_then(coerce_numeric),
            raw.likes.as_deref().and_then(coerce_numeric),
        );
        records.extend(row);
    }

    Ok(finish(records, total_rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same four columns.
///
/// Text columns go through the CSV cleaning rules. Numeric columns stored as
/// text are coerced cell by cell like CSV cells; native integer and float
/// columns are cast to `Float64`. Dictionary-encoded categories from Pandas
/// or Polars are cast to plain strings first.
fn load_parquet(path: &Path) -> Result<VideoTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut total_rows = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        total_rows += batch.num_rows();

        let titles = text_column(&batch, TITLE_COLUMN)?;
        let categories = text_column(&batch, CATEGORY_COLUMN)?;
        let views = numeric_column(&batch, VIEWS_COLUMN)?;
        let likes = numeric_column(&batch, LIKES_COLUMN)?;

        let rows = titles.into_iter().zip(categories).zip(views).zip(likes);
        for (((title, category), views), likes) in rows {
            records.extend(clean_row(title, category, views, likes));
        }
    }

    Ok(finish(records, total_rows))
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn cast_to(array: &ArrayRef, name: &str, to: &DataType) -> Result<ArrayRef> {
    arrow::compute::cast(array, to).with_context(|| format!("casting '{name}' column to {to:?}"))
}

fn is_textual(data_type: &DataType) -> bool {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => true,
        DataType::Dictionary(_, values) => is_textual(values),
        _ => false,
    }
}

fn text_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<String>>> {
    let array = cast_to(column(batch, name)?, name, &DataType::Utf8)?;
    Ok(array
        .as_string::<i32>()
        .iter()
        .map(|cell| clean_text(cell.map(str::to_string)))
        .collect())
}

fn numeric_column(batch: &RecordBatch, name: &str) -> Result<Vec<Option<f64>>> {
    let array = column(batch, name)?;
    if is_textual(array.data_type()) {
        let text = cast_to(array, name, &DataType::Utf8)?;
        return Ok(text
            .as_string::<i32>()
            .iter()
            .map(|cell| cell.and_then(coerce_numeric))
            .collect());
    }
    let numbers = cast_to(array, name, &DataType::Float64)?;
    Ok(numbers
        .as_primitive::<Float64Type>()
        .iter()
        .map(|cell| cell.filter(|v| v.is_finite()))
        .collect())
}
