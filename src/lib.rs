//! Weekly campaign KPI reporting: fetch, normalize, render.
//!
//! The pipeline has three stages, each usable on its own:
//!
//! 1. [`client`] fetches raw per-campaign metrics from the summary service
//!    over a single synchronous HTTPS request.
//! 2. [`metrics`] ceiling-rounds the raw values into integer report rows
//!    and appends the aggregate Total row.
//! 3. [`model`] and [`builder`] turn the rows into a paginated PDF report
//!    with one section per row.
//!
//! [`generate`] wires the stages together; [`generate_with`] swaps the PDF
//! backend for any [`DocumentBuilder`], which tests use to run the pipeline
//! without fonts installed.

pub mod builder;
pub mod client;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod metrics;
pub mod model;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::{DocumentBuilder, PdfRenderer, RenderedPdf};
pub use client::{MetricRecord, MetricsSource, ReportRequest, SummaryClient, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use metrics::{normalize, Metric, ReportRow, TOTAL_LABEL};
pub use model::ReportDocument;

/// A finished report: preview rows, document bytes and the suggested file
/// name.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Normalized rows in presentation order, the Total row last.
    pub rows: Vec<ReportRow>,
    /// Complete PDF file contents.
    pub bytes: Vec<u8>,
    /// Suggested name for the written file, derived from the date range.
    pub file_name: String,
}

/// Runs the full pipeline with the default PDF renderer.
pub fn generate(source: &dyn MetricsSource, request: &ReportRequest) -> Result<RenderedReport> {
    generate_with(source, &PdfRenderer::new(), request)
}

/// Runs the full pipeline with a caller-chosen document builder.
pub fn generate_with(
    source: &dyn MetricsSource,
    builder: &dyn DocumentBuilder,
    request: &ReportRequest,
) -> Result<RenderedReport> {
    let records = source.fetch(request)?;
    let rows = metrics::normalize(request.campaigns(), &records);
    let document = ReportDocument::new(&rows, request.start_date(), request.end_date());
    let bytes = builder.build(&document)?;

    Ok(RenderedReport {
        rows,
        bytes,
        file_name: document.file_name().to_owned(),
    })
}
