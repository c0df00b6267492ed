//! Write a synthetic `youtube_data.csv` (or `.parquet`) with the columns the
//! dashboard reads, for working offline.
//!
//! A handful of rows carry missing or non-numeric values so the loader's
//! cleaning rules have something to drop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// (category, typical likes per view)
const CATEGORIES: &[(&str, f64)] = &[
    ("Music", 0.045),
    ("Gaming", 0.060),
    ("Education", 0.035),
    ("Entertainment", 0.040),
    ("News", 0.015),
    ("Sports", 0.025),
    ("Comedy", 0.055),
    ("Science & Technology", 0.030),
];

const TOPICS: &[&str] = &[
    "Official Video",
    "Live Session",
    "Full Tutorial",
    "Highlights",
    "Reaction",
    "Behind the Scenes",
    "Review",
    "Top 10 Moments",
    "Explained in 5 Minutes",
    "Challenge",
];

const CHANNELS: &[&str] = &["Canal Alfa", "Beta Studio", "Gamma TV", "Delta Clips", "Epsilon"];

#[derive(Debug, Parser)]
#[command(about = "Generate a synthetic YouTube videos dataset")]
struct Args {
    /// Number of rows to write.
    #[arg(long, default_value_t = 500)]
    rows: usize,

    /// Seed for the generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output path; a .parquet extension writes Parquet instead of CSV.
    #[arg(long, default_value = "youtube_data.csv")]
    output: PathBuf,
}

#[derive(Debug, Clone)]
struct SampleVideo {
    title: Option<String>,
    category: Option<String>,
    views: Option<u64>,
    likes: Option<u64>,
    channel: String,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    title: Option<&'a str>,
    category: Option<&'a str>,
    views: String,
    likes: String,
    channel: &'a str,
}

fn generate(rows: usize, rng: &mut StdRng) -> Vec<SampleVideo> {
    (0..rows)
        .map(|i| {
            let (category, like_rate) = CATEGORIES[rng.random_range(0..CATEGORIES.len())];
            let topic = TOPICS[rng.random_range(0..TOPICS.len())];
            let channel = CHANNELS[rng.random_range(0..CHANNELS.len())];

            // Log-uniform views between 1k and ~50M.
            let views = 10f64.powf(rng.random_range(3.0..7.7)).round() as u64;
            let likes = (views as f64 * like_rate * rng.random_range(0.6..1.4)).round() as u64;

            // A small title pool per category so some titles repeat.
            let title = format!("{category} {topic} #{}", rng.random_range(1..=40));

            let mut video = SampleVideo {
                title: Some(title),
                category: Some(category.to_string()),
                views: Some(views),
                likes: Some(likes),
                channel: channel.to_string(),
            };
            match i % 97 {
                13 => video.views = None,
                29 => video.likes = None,
                51 => video.category = None,
                77 => video.title = None,
                _ => {}
            }
            video
        })
        .collect()
}

/// Missing numbers alternate between an NA token and text that fails coercion.
fn numeric_cell(value: Option<u64>, row: usize) -> String {
    match value {
        Some(v) => v.to_string(),
        None if row % 2 == 0 => "N/A".to_string(),
        None => "muitos".to_string(),
    }
}

fn write_csv(path: &Path, videos: &[SampleVideo]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for (row, video) in videos.iter().enumerate() {
        writer
            .serialize(CsvRow {
                title: video.title.as_deref(),
                category: video.category.as_deref(),
                views: numeric_cell(video.views, row),
                likes: numeric_cell(video.likes, row),
                channel: &video.channel,
            })
            .with_context(|| format!("writing row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, videos: &[SampleVideo]) -> Result<()> {
    let to_i64 = |v: Option<u64>| v.and_then(|x| i64::try_from(x).ok());

    let schema = Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, true),
        Field::new("category", DataType::Utf8, true),
        Field::new("views", DataType::Int64, true),
        Field::new("likes", DataType::Int64, true),
        Field::new("channel", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                videos.iter().map(|v| v.title.as_deref()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                videos.iter().map(|v| v.category.as_deref()).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                videos.iter().map(|v| to_i64(v.views)).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                videos.iter().map(|v| to_i64(v.likes)).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                videos.iter().map(|v| v.channel.as_str()).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let videos = generate(args.rows, &mut rng);

    let is_parquet = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(&args.output, &videos)?;
    } else {
        write_csv(&args.output, &videos)?;
    }

    println!("Wrote {} videos to {}", videos.len(), args.output.display());
    Ok(())
}
