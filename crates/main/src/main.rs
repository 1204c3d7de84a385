use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use esg_report::encoding::to_base64;
use esg_report::materiality::{self, FinancialMateriality};
use esg_report::{AssemblerConfig, ImageSource, OrganizationDetails, ReportAssembler, ReportSpec};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Shapes materiality data and assembles ESG report PDFs.
///
/// Assembler settings are read from `ESG_REPORT_*` environment variables; log verbosity from
/// `RUST_LOG`.
#[derive(Parser)]
#[command(author, version, about = "ESG materiality report tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON array of materiality rows into sorted chart points.
    Transform {
        /// JSON file holding the rows.
        #[arg(short, long)]
        input: PathBuf,
        /// Write the points here instead of standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the report PDF from a cover, an optional chart and a back cover.
    Assemble(AssembleArgs),
}

#[derive(Args)]
struct AssembleArgs {
    /// Cover image: URL, data URI or file path.
    #[arg(long)]
    cover: String,
    /// Back cover image: URL, data URI or file path.
    #[arg(long = "back-cover")]
    back_cover: String,
    /// Rendered materiality chart: URL, data URI or file path.
    #[arg(long)]
    chart: Option<String>,
    #[arg(long)]
    organization: Option<String>,
    #[arg(long)]
    industry: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    founded: Option<String>,
    /// Document title; overrides ESG_REPORT_TITLE.
    #[arg(long)]
    title: Option<String>,
    /// Destination file.
    #[arg(short, long, default_value = "report.pdf")]
    output: PathBuf,
    /// Write the PDF base64 encoded instead of binary.
    #[arg(long)]
    base64: bool,
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Transform { input, output } => run_transform(input, output),
        Commands::Assemble(args) => run_assemble(args).await,
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run_transform(input: PathBuf, output: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let raw = fs::read_to_string(&input)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let points = materiality::transform_value(&value);

    let categorised = points
        .iter()
        .filter(|point| FinancialMateriality::from_label(&point.materialidad).is_some())
        .count();
    info!(
        "Transformed {} rows ({} with a known financial materiality)",
        points.len(),
        categorised
    );

    let json = serde_json::to_string_pretty(&points)?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

async fn run_assemble(args: AssembleArgs) -> Result<(), Box<dyn Error>> {
    let mut config = AssemblerConfig::from_env();
    if let Some(title) = args.title {
        config = config.with_title(title);
    }

    let spec = ReportSpec::new(
        ImageSource::parse(&args.cover),
        ImageSource::parse(&args.back_cover),
    )
    .with_chart(args.chart.as_deref().map(ImageSource::parse))
    .with_organization(OrganizationDetails {
        name: args.organization,
        industry: args.industry,
        country: args.country,
        founded: args.founded,
    });

    let assembler = ReportAssembler::from_config(config)?;
    let bytes = assembler.assemble(&spec).await?;

    if args.base64 {
        fs::write(&args.output, to_base64(&bytes))?;
    } else {
        fs::write(&args.output, &bytes)?;
    }
    info!("Wrote {}", args.output.display());
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
