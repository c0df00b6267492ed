/// Data layer: acquisition, loading, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///   Kaggle handle ──► ┌──────────┐
///   (owner/slug)      │  source   │  download + unzip → dataset directory
///                     └──────────┘
///                          │  locate youtube_data.csv
///                          ▼
///                     ┌──────────┐
///                     │  loader   │  parse .csv / .parquet → VideoTable
///                     └──────────┘
///                          │
///                          ▼
///                     ┌──────────┐
///                     │  cache    │  process-wide memo (first success wins)
///                     └──────────┘
///                          │
///                          ▼
///                     ┌──────────┐      ┌───────────┐
///                     │  filter   │ ──► │ aggregate  │  metrics, rankings
///                     └──────────┘      └───────────┘
/// ```
pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod source;

use std::fmt;

use thiserror::Error;

/// The step of the load pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Acquire,
    Locate,
    Parse,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStage::Acquire => write!(f, "dataset acquisition"),
            LoadStage::Locate => write!(f, "dataset file lookup"),
            LoadStage::Parse => write!(f, "dataset parsing"),
        }
    }
}

/// The single error kind of the data layer: the dataset could not be made
/// available. `detail` carries the full context chain for display.
#[derive(Debug, Error)]
#[error("data unavailable: {stage} failed: {detail:#}")]
pub struct DataUnavailable {
    pub stage: LoadStage,
    pub detail: anyhow::Error,
}

impl DataUnavailable {
    pub fn new(stage: LoadStage, detail: anyhow::Error) -> Self {
        DataUnavailable { stage, detail }
    }

    /// Each message of the context chain, outermost first.
    pub fn chain(&self) -> Vec<String> {
        self.detail.chain().map(|cause| cause.to_string()).collect()
    }
}
