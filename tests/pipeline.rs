//! End-to-end pipeline tests over in-memory fakes, no network and no fonts.

use std::collections::HashMap;

use chrono::NaiveDate;
use kpi_report::client::MetricRecord;
use kpi_report::model::{ReportDocument, SectionBody};
use kpi_report::{
    generate_with, DocumentBuilder, Error, MetricsSource, ReportRequest, TOTAL_LABEL,
};

/// Serves a canned response map, or a canned error.
struct FakeSource {
    response: Result<HashMap<String, MetricRecord>, fn() -> Error>,
}

impl FakeSource {
    fn returning(records: HashMap<String, MetricRecord>) -> Self {
        Self {
            response: Ok(records),
        }
    }

    fn failing(error: fn() -> Error) -> Self {
        Self {
            response: Err(error),
        }
    }
}

impl MetricsSource for FakeSource {
    fn fetch(&self, _request: &ReportRequest) -> kpi_report::Result<HashMap<String, MetricRecord>> {
        match &self.response {
            Ok(records) => Ok(records.clone()),
            Err(make) => Err(make()),
        }
    }
}

/// Captures the document's section outline instead of producing a PDF.
struct OutlineBuilder;

impl DocumentBuilder for OutlineBuilder {
    fn build(&self, document: &ReportDocument) -> kpi_report::Result<Vec<u8>> {
        let mut outline = format!("{}\n", document.title());
        for section in document.sections() {
            let kind = match section.body() {
                SectionBody::Notice(text) => format!("notice: {}", text),
                SectionBody::Metrics { chart, table } => {
                    format!("chart {} bars, table {} rows", chart.bars().len(), table.rows().len())
                }
            };
            outline.push_str(&format!("{} [{}]\n", section.heading(), kind));
        }
        Ok(outline.into_bytes())
    }
}

fn august_week() -> ReportRequest {
    ReportRequest::new(
        vec!["SG".to_owned()],
        NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
        NaiveDate::from_ymd_opt(2024, 8, 11).unwrap(),
    )
}

fn sg_records() -> HashMap<String, MetricRecord> {
    // The wire shape the summary service actually sends, misspelling
    // included.
    let body = r#"{
        "SG": {
            "calls": 100, "machines": 10, "connects": 50, "leads": 5,
            "callsToConnectsRatio": 2, "answeredPercentage": 50,
            "categoryPercetnages": {"VOICEMAIL": 12.4}
        }
    }"#;
    serde_json::from_str(body).unwrap()
}

#[test]
fn single_campaign_report_end_to_end() {
    let source = FakeSource::returning(sg_records());
    let report = generate_with(&source, &OutlineBuilder, &august_week()).unwrap();

    assert_eq!(report.rows.len(), 2);

    let sg = &report.rows[0];
    assert_eq!(sg.campaign, "SG");
    assert_eq!(sg.calls, 100);
    assert_eq!(sg.machines, 10);
    assert_eq!(sg.connects, 50);
    assert_eq!(sg.leads, 5);
    assert_eq!(sg.calls_to_connects_ratio, 2);
    assert_eq!(sg.answered_percentage, 50);
    assert_eq!(sg.voicemail, 13);
    assert_eq!(sg.not_interested, 0);
    assert_eq!(sg.callback, 0);

    // A single campaign means the Total row mirrors it.
    let total = &report.rows[1];
    assert_eq!(total.campaign, TOTAL_LABEL);
    assert_eq!(total.calls, 100);
    assert_eq!(total.voicemail, 13);

    assert_eq!(report.file_name, "KPI_Report_From_2024-08-05_to_2024-08-11.pdf");

    let outline = String::from_utf8(report.bytes).unwrap();
    assert!(outline.starts_with("Campaign KPI Report from 2024-08-05 to 2024-08-11"));
    assert_eq!(outline.matches("chart 13 bars, table 14 rows").count(), 2);
    assert!(!outline.contains("notice"));
}

#[test]
fn unreported_campaign_renders_as_a_notice() {
    let request = ReportRequest::new(
        vec!["SG".to_owned(), "QUIET".to_owned()],
        NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
        NaiveDate::from_ymd_opt(2024, 8, 11).unwrap(),
    );
    let source = FakeSource::returning(sg_records());
    let report = generate_with(&source, &OutlineBuilder, &request).unwrap();

    assert_eq!(report.rows[1].campaign, "QUIET");
    assert_eq!(report.rows[1].calls, 0);

    let outline = String::from_utf8(report.bytes).unwrap();
    assert!(outline.contains("notice: No calls recorded for campaign: QUIET"));
}

#[test]
fn remote_failure_yields_no_document() {
    let source = FakeSource::failing(|| Error::Remote { status: 500 });
    let err = generate_with(&source, &OutlineBuilder, &august_week()).unwrap_err();

    assert!(matches!(err, Error::Remote { status: 500 }));
    assert!(err.to_string().contains("500"));
}

#[test]
fn parse_failure_yields_no_document() {
    let source = FakeSource::failing(|| {
        Error::Parse(serde_json::from_str::<serde_json::Value>("<html>").unwrap_err())
    });
    let err = generate_with(&source, &OutlineBuilder, &august_week()).unwrap_err();

    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn total_section_is_rendered_last() {
    let body = r#"{
        "SG": {"calls": 10},
        "SG4": {"calls": 20}
    }"#;
    let records: HashMap<String, MetricRecord> = serde_json::from_str(body).unwrap();
    let request = ReportRequest::new(
        vec!["SG".to_owned(), "SG4".to_owned()],
        NaiveDate::from_ymd_opt(2024, 8, 5).unwrap(),
        NaiveDate::from_ymd_opt(2024, 8, 11).unwrap(),
    );
    let report = generate_with(&FakeSource::returning(records), &OutlineBuilder, &request).unwrap();

    assert_eq!(report.rows[2].campaign, TOTAL_LABEL);
    assert_eq!(report.rows[2].calls, 30);

    let outline = String::from_utf8(report.bytes).unwrap();
    let last_line = outline.lines().last().unwrap();
    assert!(last_line.starts_with("Total Report for All Campaigns"));
}
