mod di;

use crate::di::create_app_module;
use anyhow::Context;
use clap::{Parser, Subcommand};
use inspection_application::{InspectionRequest, InspectionService, Operation};
use inspection_domain::ConfigurationError;
use shaku::HasComponent;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pq-inspect")]
#[command(about = "Inspect the footer metadata of a parquet file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Column to order the output by (position, records, num_rg, ratio, size, name)
    #[arg(long, global = true)]
    sort_key: Option<String>,

    /// Flip the natural order of the sort key
    #[arg(long, global = true)]
    reverse: bool,

    /// Ignore column chunks smaller than this many uncompressed bytes
    #[arg(long, global = true, allow_negative_numbers = true)]
    min_size: Option<i64>,

    /// Emit chart data instead of a table (types, ratios-by-column)
    #[arg(long, global = true)]
    html: bool,

    /// Fold sunburst columns at or below this many bytes into "Other"
    #[arg(long, global = true, default_value_t = 0)]
    group_under: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// File level summary of the footer
    Overall { file: PathBuf },
    /// Row groups bucketed by record count
    RowGroups { file: PathBuf },
    /// Compression codecs in use
    Schemes { file: PathBuf },
    /// Compressed size per column
    Sizes { file: PathBuf },
    /// Compressed size per physical type
    Types { file: PathBuf },
    /// Column chunk with the best compression ratio
    MostCompressed { file: PathBuf },
    /// Row groups bucketed by compression ratio
    Ratios { file: PathBuf },
    /// Compression ratio of every column chunk
    RatiosByColumn { file: PathBuf },
    /// Per row group statistics bounds of one column
    Minmax { file: PathBuf, column: String },
}

impl Cli {
    fn into_request(self) -> Result<InspectionRequest, ConfigurationError> {
        let (file, operation) = match self.command {
            Command::Overall { file } => (file, Operation::Overall),
            Command::RowGroups { file } => (file, Operation::RowGroups),
            Command::Schemes { file } => (file, Operation::Schemes),
            Command::Sizes { file } => (file, Operation::Sizes),
            Command::Types { file } => (file, Operation::Types),
            Command::MostCompressed { file } => (file, Operation::MostCompressed),
            Command::Ratios { file } => (file, Operation::Ratios),
            Command::RatiosByColumn { file } => (file, Operation::RatiosByColumn),
            Command::Minmax { file, column } => (file, Operation::MinMax { column }),
        };

        let mut request = InspectionRequest::new(file, operation)
            .with_sort(self.sort_key.as_deref(), self.reverse)?
            .with_html(self.html)?;
        if let Some(min_size) = self.min_size {
            request = request.with_min_size(min_size)?;
        }

        Ok(request)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let group_under = cli.group_under;
    let request = cli.into_request().context("Invalid command line")?;
    debug!("Resolved request: {:?}", request);

    let module = create_app_module(group_under);
    let service: Arc<dyn InspectionService> = module.resolve();

    let report = service
        .inspect(&request)
        .with_context(|| format!("Failed to inspect {}", request.path().display()))?;
    println!("{}", report);

    Ok(())
}
