mod config;
mod errors;
mod fetch;
mod file_io;
mod handler;
mod parser;
mod table;
mod headers {
    pub mod registry;
    pub use registry::HeaderRegistry;
}

use anyhow::{Context, Result};
use chrono::Utc;
use config::{ExportConfig, ExportSource};
use file_io::{load_payload, load_payload_from_stdin, save_csv};
use handler::export_payload;
use headers::HeaderRegistry;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let matches = config::build_cli().get_matches();
    let config = ExportConfig::from_matches(&matches)?;
    init_tracing(config.verbose);

    tracing::info!(source = ?config.source, "starting export");
    let payload = match &config.source {
        ExportSource::File(path) => load_payload(path)
            .with_context(|| format!("failed to read search response {}", path.display()))?,
        ExportSource::Stdin => {
            load_payload_from_stdin().context("failed to read search response from stdin")?
        }
        ExportSource::Replay { request, count } => {
            let captured = fetch::load_captured_request(request)
                .with_context(|| format!("failed to load captured request {}", request.display()))?;
            fetch::fetch_results(&captured, *count, config.timeout)
                .context("search request failed")?
        }
    };

    // One registry per run so columns never carry over between exports.
    let mut registry = HeaderRegistry::new();
    let table = export_payload(payload, &mut registry).context("export failed")?;
    let csv = table.to_csv_string().context("failed to render CSV")?;
    tracing::debug!(columns = table.columns().len(), rows = table.rows().len(), "table assembled");

    if config.to_stdout {
        println!("{csv}");
        return Ok(());
    }

    let path = save_csv(&config.output_dir, &csv, Utc::now())
        .with_context(|| format!("failed to write export into {}", config.output_dir.display()))?;
    tracing::info!(path = %path.display(), rows = table.rows().len(), "export written");
    println!("✅ Wrote {} rows to '{}'", table.rows().len(), path.display());

    Ok(())
}
