//! Dataset acquisition: resolve a Kaggle handle to a local directory.
//!
//! Downloads land under `<cache_root>/datasets/<owner>/<slug>` and are reused
//! once a `.complete` marker exists, the same layout Kaggle's own client uses.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use base64::Engine;
use directories::ProjectDirs;
use serde::Deserialize;

use super::model::VideoTable;
use super::{DataUnavailable, LoadStage, loader};
use crate::config::Config;

pub const DEFAULT_DATASET: &str = "cyberevil545/youtube-videos-data-for-ml-and-trend-analysis";
pub const DEFAULT_FILE_NAME: &str = "youtube_data.csv";

const KAGGLE_API: &str = "https://www.kaggle.com/api/v1";
const COMPLETE_MARKER: &str = ".complete";
const ARCHIVE_NAME: &str = "download.zip";
const MAX_ARCHIVE_BYTES: usize = 1024 * 1024 * 1024;
const MAX_ZIP_ENTRIES: usize = 10_000;
const MAX_EXTRACTED_BYTES: usize = 2 * 1024 * 1024 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Run the whole load pipeline for `config`: acquire, locate, parse.
///
/// Each stage's failure is reported as [`DataUnavailable`] tagged with the
/// stage, carrying the full context chain.
pub fn load_dataset(config: &Config) -> Result<VideoTable, DataUnavailable> {
    let path = match &config.csv {
        Some(path) => {
            log::info!("Using local dataset file {}", path.display());
            if !path.is_file() {
                return Err(DataUnavailable::new(
                    LoadStage::Locate,
                    anyhow::anyhow!("{} does not exist", path.display()),
                ));
            }
            path.clone()
        }
        None => {
            let dir = acquire(config).map_err(|e| DataUnavailable::new(LoadStage::Acquire, e))?;
            locate_file(&dir, &config.file)
                .map_err(|e| DataUnavailable::new(LoadStage::Locate, e))?
        }
    };

    loader::load_file(&path).map_err(|e| DataUnavailable::new(LoadStage::Parse, e))
}

fn acquire(config: &Config) -> Result<PathBuf> {
    let handle: DatasetHandle = config.dataset.parse()?;
    let cache_root = match &config.cache_dir {
        Some(dir) => dir.clone(),
        None => default_cache_root()?,
    };
    dataset_download(&handle, &cache_root, &config.file, config.force_download)
}

fn default_cache_root() -> Result<PathBuf> {
    ProjectDirs::from("", "", "youtube-trends")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .context("no cache directory available; pass --cache-dir")
}

// ---------------------------------------------------------------------------
// Dataset handle
// ---------------------------------------------------------------------------

/// A Kaggle dataset identifier, `owner/slug`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetHandle {
    pub owner: String,
    pub slug: String,
}

impl FromStr for DatasetHandle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let valid_part = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
                && part != "."
                && part != ".."
        };
        match s.trim().split_once('/') {
            Some((owner, slug)) if valid_part(owner) && valid_part(slug) => Ok(DatasetHandle {
                owner: owner.to_string(),
                slug: slug.to_string(),
            }),
            _ => bail!("invalid dataset handle '{s}', expected 'owner/dataset-name'"),
        }
    }
}

impl fmt::Display for DatasetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.slug)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Kaggle API credentials, as stored in `kaggle.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KaggleCredentials {
    pub username: String,
    pub key: String,
}

impl KaggleCredentials {
    /// `KAGGLE_USERNAME`/`KAGGLE_KEY`, then `kaggle.json` in
    /// `KAGGLE_CONFIG_DIR` or `~/.kaggle`.
    pub fn discover() -> Result<Option<Self>> {
        if let (Ok(username), Ok(key)) = (
            std::env::var("KAGGLE_USERNAME"),
            std::env::var("KAGGLE_KEY"),
        ) {
            return Ok(Some(KaggleCredentials { username, key }));
        }
        let config_dir = std::env::var_os("KAGGLE_CONFIG_DIR")
            .map(PathBuf::from)
            .or_else(|| directories::BaseDirs::new().map(|d| d.home_dir().join(".kaggle")));
        match config_dir.map(|dir| dir.join("kaggle.json")) {
            Some(path) if path.is_file() => Self::from_file(&path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    fn authorization_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.key);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .build()
    })
}

/// Directory a handle is stored in below `cache_root`.
pub fn dataset_dir(handle: &DatasetHandle, cache_root: &Path) -> PathBuf {
    cache_root
        .join("datasets")
        .join(&handle.owner)
        .join(&handle.slug)
}

/// Make sure the dataset is on disk and return its directory.
///
/// `file_name` is only used when the download is a bare file rather than a
/// zip archive.
pub fn dataset_download(
    handle: &DatasetHandle,
    cache_root: &Path,
    file_name: &str,
    force: bool,
) -> Result<PathBuf> {
    let dir = dataset_dir(handle, cache_root);
    let marker = dir.join(COMPLETE_MARKER);
    if marker.is_file() && !force {
        log::info!("Using cached dataset {handle} at {}", dir.display());
        return Ok(dir);
    }

    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let archive = dir.join(ARCHIVE_NAME);
    let url = format!("{KAGGLE_API}/datasets/download/{}/{}", handle.owner, handle.slug);
    log::info!("Downloading dataset {handle} from {url}");

    let mut request = agent().get(&url).set("User-Agent", "youtube-trends");
    match KaggleCredentials::discover()? {
        Some(credentials) => {
            request = request.set("Authorization", &credentials.authorization_header());
        }
        None => log::warn!("No Kaggle credentials found, trying an anonymous download"),
    }
    let response = request
        .call()
        .with_context(|| format!("downloading {handle}"))?;
    {
        let mut file =
            File::create(&archive).with_context(|| format!("creating {}", archive.display()))?;
        copy_limited(response.into_reader(), &mut file, MAX_ARCHIVE_BYTES)
            .with_context(|| format!("saving {handle}"))?;
    }

    if is_zip(&archive)? {
        unzip_to_dir(&archive, &dir)?;
        fs::remove_file(&archive).with_context(|| format!("removing {}", archive.display()))?;
    } else {
        // Single-file datasets are served as-is.
        let target = dir.join(file_name);
        fs::rename(&archive, &target)
            .with_context(|| format!("moving download to {}", target.display()))?;
    }

    fs::write(&marker, b"").with_context(|| format!("writing {}", marker.display()))?;
    log::info!("Dataset {handle} ready at {}", dir.display());
    Ok(dir)
}

/// Stream `reader` into `writer`, failing once more than `max_bytes` arrive.
fn copy_limited(reader: impl Read, writer: &mut impl Write, max_bytes: usize) -> io::Result<u64> {
    let mut limited = reader.take(max_bytes as u64 + 1);
    let copied = io::copy(&mut limited, writer)?;
    if copied > max_bytes as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("more than {max_bytes} bytes"),
        ));
    }
    Ok(copied)
}

fn is_zip(path: &Path) -> Result<bool> {
    let mut magic = [0u8; 4];
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let read = file.read(&mut magic)?;
    Ok(read == 4 && magic == *b"PK\x03\x04")
}

/// Extract a zip archive into `dest_dir`, skipping entries whose names would
/// escape it.
pub fn unzip_to_dir(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    unzip_limited(zip_path, dest_dir, MAX_EXTRACTED_BYTES)
}

/// As [`unzip_to_dir`], failing once the extracted entries total more than
/// `max_bytes`.
fn unzip_limited(zip_path: &Path, dest_dir: &Path, max_bytes: usize) -> Result<()> {
    let file = File::open(zip_path).with_context(|| format!("opening {}", zip_path.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("reading zip archive")?;
    if archive.len() > MAX_ZIP_ENTRIES {
        bail!(
            "archive has {} entries, limit is {MAX_ZIP_ENTRIES}",
            archive.len()
        );
    }
    let mut remaining = max_bytes;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).context("reading zip entry")?;
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe archive entry '{}'", entry.name());
            continue;
        };
        let outpath = dest_dir.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }
        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile =
            File::create(&outpath).with_context(|| format!("creating {}", outpath.display()))?;
        let written = copy_limited(&mut entry, &mut outfile, remaining)
            .with_context(|| format!("extracting {}", outpath.display()))?;
        remaining -= written as usize;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// File location
// ---------------------------------------------------------------------------

/// Find `file_name` in `dir`: directly first, then anywhere below it.
pub fn locate_file(dir: &Path, file_name: &str) -> Result<PathBuf> {
    let direct = dir.join(file_name);
    if direct.is_file() {
        return Ok(direct);
    }
    find_below(dir, file_name)?.with_context(|| {
        format!("{file_name} not found in dataset directory {}", dir.display())
    })
}

fn find_below(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if let Some(found) = find_below(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().is_some_and(|name| name == file_name) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    fn offline_config(csv: Option<PathBuf>, cache_dir: &Path) -> Config {
        Config {
            dataset: DEFAULT_DATASET.to_string(),
            file: DEFAULT_FILE_NAME.to_string(),
            csv,
            cache_dir: Some(cache_dir.to_path_buf()),
            force_download: false,
        }
    }

    #[test]
    fn handle_parses_owner_and_slug() {
        let handle: DatasetHandle = DEFAULT_DATASET.parse().unwrap();
        assert_eq!(handle.owner, "cyberevil545");
        assert_eq!(handle.slug, "youtube-videos-data-for-ml-and-trend-analysis");
        assert_eq!(handle.to_string(), DEFAULT_DATASET);
    }

    #[test]
    fn malformed_handles_are_rejected() {
        for bad in ["", "noslash", "/slug", "owner/", "a/b/c", "../x", "owner/.."] {
            assert!(bad.parse::<DatasetHandle>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn credentials_read_from_kaggle_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kaggle.json");
        fs::write(&path, r#"{"username":"ana","key":"s3cret"}"#).unwrap();

        let creds = KaggleCredentials::from_file(&path).unwrap();
        assert_eq!(creds.username, "ana");
        assert_eq!(creds.authorization_header(), "Basic YW5hOnMzY3JldA==");
    }

    #[test]
    fn unzip_extracts_nested_files() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("a.zip");
        write_zip(
            &zip_path,
            &[("youtube_data.csv", b"title\n"), ("extra/readme.txt", b"hi")],
        );

        let out = dir.path().join("out");
        unzip_to_dir(&zip_path, &out).unwrap();
        assert!(out.join("youtube_data.csv").is_file());
        assert!(out.join("extra/readme.txt").is_file());
    }

    #[test]
    fn unzip_skips_entries_escaping_the_target() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("evil.zip");
        write_zip(&zip_path, &[("../escaped.csv", b"x"), ("ok.csv", b"y")]);

        let out = dir.path().join("out");
        unzip_to_dir(&zip_path, &out).unwrap();
        assert!(!dir.path().join("escaped.csv").exists());
        assert!(out.join("ok.csv").is_file());
    }

    #[test]
    fn unzip_stops_past_the_size_limit() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("big.zip");
        write_zip(&zip_path, &[("a.csv", b"12345"), ("b.csv", b"67890")]);

        let err = unzip_limited(&zip_path, &dir.path().join("small"), 8).unwrap_err();
        assert!(format!("{err:#}").contains("more than"));

        unzip_limited(&zip_path, &dir.path().join("fits"), 10).unwrap();
        assert!(dir.path().join("fits/b.csv").is_file());
    }

    #[test]
    fn locate_prefers_direct_then_searches_below() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("v1/data")).unwrap();
        fs::write(dir.path().join("v1/data/youtube_data.csv"), b"").unwrap();

        let nested = locate_file(dir.path(), DEFAULT_FILE_NAME).unwrap();
        assert!(nested.ends_with("v1/data/youtube_data.csv"));

        fs::write(dir.path().join("youtube_data.csv"), b"").unwrap();
        let direct = locate_file(dir.path(), DEFAULT_FILE_NAME).unwrap();
        assert_eq!(direct, dir.path().join("youtube_data.csv"));
    }

    #[test]
    fn locate_reports_missing_file() {
        let dir = tempdir().unwrap();
        let err = locate_file(dir.path(), DEFAULT_FILE_NAME).unwrap_err();
        assert!(err.to_string().contains("youtube_data.csv not found"));
    }

    #[test]
    fn cached_download_is_reused_without_network() {
        let cache = tempdir().unwrap();
        let handle: DatasetHandle = DEFAULT_DATASET.parse().unwrap();
        let dir = dataset_dir(&handle, cache.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(COMPLETE_MARKER), b"").unwrap();
        fs::write(
            dir.join(DEFAULT_FILE_NAME),
            "title,category,views,likes\nA,Music,100,10\nB,News,200,20\n",
        )
        .unwrap();

        let table = load_dataset(&offline_config(None, cache.path())).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn cached_dataset_without_file_fails_at_locate_stage() {
        let cache = tempdir().unwrap();
        let handle: DatasetHandle = DEFAULT_DATASET.parse().unwrap();
        let dir = dataset_dir(&handle, cache.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(COMPLETE_MARKER), b"").unwrap();

        let err = load_dataset(&offline_config(None, cache.path())).unwrap_err();
        assert_eq!(err.stage, LoadStage::Locate);
    }

    #[test]
    fn local_csv_skips_acquisition() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("mine.csv");
        fs::write(&csv, "title,category,views,likes\nA,Music,1,oops\n").unwrap();

        let table = load_dataset(&offline_config(Some(csv), dir.path())).unwrap();
        assert!(table.is_empty(), "non-numeric likes drops the only row");

        let missing = dir.path().join("missing.csv");
        let err = load_dataset(&offline_config(Some(missing), dir.path())).unwrap_err();
        assert_eq!(err.stage, LoadStage::Locate);
    }

    #[test]
    fn invalid_handle_fails_at_acquire_stage() {
        let dir = tempdir().unwrap();
        let mut config = offline_config(None, dir.path());
        config.dataset = "not a handle".to_string();
        let err = load_dataset(&config).unwrap_err();
        assert_eq!(err.stage, LoadStage::Acquire);
    }

    #[test]
    fn bad_file_fails_at_parse_stage() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("broken.csv");
        fs::write(&csv, "title,category\nA,Music\n").unwrap();
        let err = load_dataset(&offline_config(Some(csv), dir.path())).unwrap_err();
        assert_eq!(err.stage, LoadStage::Parse);
    }
}
