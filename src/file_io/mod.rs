// file_io/mod.rs
use crate::errors::Result;
use bzip2::read::BzDecoder;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Box<dyn Read>> {
    let file = File::open(&path)?;
    match path.as_ref().extension().and_then(|s| s.to_str()) {
        Some("bz2") => Ok(Box::new(BzDecoder::new(file))),
        _ => Ok(Box::new(file)),
    }
}

/// Reads a saved search response from a file (optionally `.bz2`).
pub fn load_payload<P: AsRef<Path>>(path: P) -> Result<Value> {
    let reader = BufReader::new(open_file(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_payload_from_stdin() -> Result<Value> {
    Ok(serde_json::from_reader(io::stdin().lock())?)
}

/// `coveo_export_<ISO8601 with ':' and '.' replaced by '-'>.csv`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    format!("coveo_export_{}.csv", stamp.replace([':', '.'], "-"))
}

/// Writes the finished document into `dir` under a timestamped name.
pub fn save_csv(dir: &Path, contents: &str, now: DateTime<Utc>) -> Result<PathBuf> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(export_file_name(now));
    fs::write(&path, contents)?;
    Ok(path)
}
