use std::path::PathBuf;

use clap::Parser;

use crate::data::source::{DEFAULT_DATASET, DEFAULT_FILE_NAME};

/// Interactive YouTube trends dashboard.
///
/// Every flag can also be set through the environment.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Config {
    /// Kaggle dataset handle (`owner/dataset-name`).
    #[arg(long, env = "YOUTUBE_TRENDS_DATASET", default_value = DEFAULT_DATASET)]
    pub dataset: String,

    /// File to load from inside the downloaded dataset.
    #[arg(long, env = "YOUTUBE_TRENDS_FILE", default_value = DEFAULT_FILE_NAME)]
    pub file: String,

    /// Load this local .csv/.parquet file instead of downloading.
    #[arg(long, env = "YOUTUBE_TRENDS_CSV")]
    pub csv: Option<PathBuf>,

    /// Where downloaded datasets are kept (defaults to the OS cache dir).
    #[arg(long, env = "YOUTUBE_TRENDS_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Download again even if a cached copy exists.
    #[arg(long)]
    pub force_download: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_kaggle_dataset() {
        let config = Config::try_parse_from(["youtube-trends"]).unwrap();
        assert_eq!(config.dataset, DEFAULT_DATASET);
        assert_eq!(config.file, "youtube_data.csv");
        assert!(!config.force_download);
    }

    #[test]
    fn local_file_flag_is_parsed() {
        let config =
            Config::try_parse_from(["youtube-trends", "--csv", "data/videos.csv", "--force-download"])
                .unwrap();
        assert_eq!(config.csv, Some(PathBuf::from("data/videos.csv")));
        assert!(config.force_download);
    }
}
