use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pulse_analyzer::{AnalysisConfig, AnalysisPipeline};
use pulse_domain::{ExportFormat, JsonExporter, ReportExporter};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Yaml => ExportFormat::Yaml,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate the tempo and beat grid of an audio file", long_about = None)]
struct Cli {
    /// Path to the audio file to analyse
    input: PathBuf,
    /// YAML or JSON file overriding analysis tunables
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Report peaks as sample indices instead of milliseconds
    #[arg(long)]
    samples: bool,
    /// Keep peaks detected by more than one threshold pass
    #[arg(long)]
    keep_duplicates: bool,
    /// Skip the low-pass filter
    #[arg(long)]
    no_filter: bool,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if cli.samples {
        config.peaks.convert_to_milliseconds = false;
    }
    if cli.keep_duplicates {
        config.peaks.remove_duplicates = false;
    }
    if cli.no_filter {
        config.filter.enabled = false;
    }

    let pipeline = AnalysisPipeline::new(config)?;
    let report = pipeline.analyze_file(&cli.input)?;
    let bytes = JsonExporter.export(&report, cli.format.into())?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
