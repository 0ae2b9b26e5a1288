use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::Parser;
use tabled::settings::Style;
use tabled::Table;

use kpi_report::{ReportRequest, SummaryClient, DEFAULT_BASE_URL};

/// The campaigns offered by default; narrow with `--campaign` or extend
/// with `--extra-campaign`.
const DEFAULT_CAMPAIGNS: [&str; 14] = [
    "SG",
    "SG/NEW",
    "SG5TO10/NEW",
    "SG1TO5",
    "SG4/SG7",
    "SG1TO5/SG5",
    "SG5TO10",
    "SG4/NEW",
    "SG5/NEW",
    "SG4",
    "SG5",
    "SG_GST",
    "SG3",
    "SG6",
];

/// Fetches weekly campaign KPI metrics and writes a PDF report.
#[derive(Parser)]
#[command(
    name = "kpi-report",
    version,
    about = "Weekly campaign KPI report generator"
)]
struct Cli {
    /// First day of the reporting period (YYYY-MM-DD, inclusive).
    #[arg(long, value_name = "DATE")]
    start_date: NaiveDate,

    /// Last day of the reporting period (YYYY-MM-DD, inclusive).
    #[arg(long, value_name = "DATE")]
    end_date: NaiveDate,

    /// Campaign to report on; repeat for several. Defaults to the full
    /// predefined list.
    #[arg(long = "campaign", value_name = "NAME")]
    campaigns: Vec<String>,

    /// Additional campaign appended after the selection; repeat for several.
    #[arg(long = "extra-campaign", value_name = "NAME")]
    extra_campaigns: Vec<String>,

    /// Bearer token for the summary service.
    #[arg(long, env = "KPI_API_TOKEN", hide_env_values = true)]
    token: String,

    /// Base URL of the summary service deployment.
    #[arg(long, env = "KPI_API_BASE", default_value = DEFAULT_BASE_URL)]
    api_base: String,

    /// Where to write the PDF. Defaults to the suggested file name in the
    /// working directory.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the report rows as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Add one outline entry per campaign section.
    #[cfg(feature = "bookmarks")]
    #[arg(long)]
    bookmarks: bool,

    /// Increase logging verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut campaigns: Vec<String> = if cli.campaigns.is_empty() {
        DEFAULT_CAMPAIGNS
            .iter()
            .map(|name| (*name).to_owned())
            .collect()
    } else {
        cli.campaigns.clone()
    };
    campaigns.extend(cli.extra_campaigns.iter().cloned());

    let request = ReportRequest::new(campaigns, cli.start_date, cli.end_date);
    let source = SummaryClient::new(cli.api_base.clone(), cli.token.clone())?;
    let report = generate(&cli, &source, &request)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.rows)?);
    } else {
        println!("{}", Table::new(&report.rows).with(Style::markdown()));
    }

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&report.file_name));
    fs::write(&output, &report.bytes)?;
    println!("Wrote {} ({} bytes)", output.display(), report.bytes.len());

    Ok(())
}

#[cfg(feature = "bookmarks")]
fn generate(
    cli: &Cli,
    source: &SummaryClient,
    request: &ReportRequest,
) -> kpi_report::Result<kpi_report::RenderedReport> {
    use kpi_report::{DocumentBuilder, PdfRenderer, ReportDocument};

    struct BookmarkedRenderer(PdfRenderer);

    impl DocumentBuilder for BookmarkedRenderer {
        fn build(&self, document: &ReportDocument) -> kpi_report::Result<Vec<u8>> {
            self.0.render_with_bookmarks(document)
        }
    }

    if cli.bookmarks {
        kpi_report::generate_with(source, &BookmarkedRenderer(PdfRenderer::new()), request)
    } else {
        kpi_report::generate(source, request)
    }
}

#[cfg(not(feature = "bookmarks"))]
fn generate(
    _cli: &Cli,
    source: &SummaryClient,
    request: &ReportRequest,
) -> kpi_report::Result<kpi_report::RenderedReport> {
    kpi_report::generate(source, request)
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
