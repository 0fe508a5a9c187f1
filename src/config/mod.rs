// config/mod.rs
use anyhow::{Context, Result};
use clap::{App, Arg, ArgGroup, ArgMatches};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COUNT: &str = "500";
pub const DEFAULT_TIMEOUT_SECS: &str = "60";

/// Where the search response for this run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSource {
    File(PathBuf),
    Stdin,
    Replay { request: PathBuf, count: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub source: ExportSource,
    pub output_dir: PathBuf,
    pub to_stdout: bool,
    pub timeout: Duration,
    pub verbose: bool,
}

fn is_number(v: String) -> std::result::Result<(), String> {
    v.parse::<u32>()
        .map(|_| ())
        .map_err(|e| format!("'{v}' is not a valid number: {e}"))
}

pub fn build_cli() -> App<'static, 'static> {
    App::new("coveo_export")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Exports search results with ranking diagnostics to CSV")
        .arg(
            Arg::with_name("input")
                .long("input")
                .short("i")
                .value_name("FILE")
                .takes_value(true)
                .help("Saved search response JSON ('-' for stdin, .bz2 accepted)"),
        )
        .arg(
            Arg::with_name("request")
                .long("request")
                .short("r")
                .value_name("FILE")
                .takes_value(true)
                .help("Captured search request JSON to replay with debug info"),
        )
        .group(
            ArgGroup::with_name("source")
                .args(&["input", "request"])
                .required(true),
        )
        .arg(
            Arg::with_name("count")
                .long("count")
                .short("n")
                .value_name("N")
                .takes_value(true)
                .default_value(DEFAULT_COUNT)
                .validator(is_number)
                .help("Number of results to request when replaying"),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .value_name("SECS")
                .takes_value(true)
                .default_value(DEFAULT_TIMEOUT_SECS)
                .validator(is_number)
                .help("HTTP timeout in seconds when replaying"),
        )
        .arg(
            Arg::with_name("output-dir")
                .long("output-dir")
                .short("o")
                .value_name("DIR")
                .takes_value(true)
                .default_value(".")
                .help("Directory the export file is written to"),
        )
        .arg(
            Arg::with_name("stdout")
                .long("stdout")
                .help("Print the CSV instead of saving a file"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .help("Enable debug logging"),
        )
}

impl ExportConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let count = parse_u32(matches, "count", DEFAULT_COUNT)?;
        let timeout = parse_u32(matches, "timeout", DEFAULT_TIMEOUT_SECS)?;

        let source = match (matches.value_of("input"), matches.value_of("request")) {
            (Some("-"), _) => ExportSource::Stdin,
            (Some(path), _) => ExportSource::File(PathBuf::from(path)),
            (None, Some(path)) => ExportSource::Replay {
                request: PathBuf::from(path),
                count,
            },
            (None, None) => anyhow::bail!("either --input or --request is required"),
        };

        Ok(Self {
            source,
            output_dir: PathBuf::from(matches.value_of("output-dir").unwrap_or(".")),
            to_stdout: matches.is_present("stdout"),
            timeout: Duration::from_secs(u64::from(timeout)),
            verbose: matches.is_present("verbose"),
        })
    }
}

fn parse_u32(matches: &ArgMatches, name: &str, default: &str) -> Result<u32> {
    let raw = matches.value_of(name).unwrap_or(default);
    raw.parse::<u32>()
        .with_context(|| format!("invalid --{name} value '{raw}'"))
}
