//! Renderer-independent model of the report document.
//!
//! [`ReportDocument`] captures everything the rendered PDF will contain:
//! title, section order, chart data, table cells and the suggested file
//! name. Building it is pure, so content rules are testable without fonts
//! or a PDF backend.

use chrono::NaiveDate;
use log::warn;

use crate::metrics::{Metric, ReportRow};

const TOTAL_HEADING: &str = "Total Report for All Campaigns";
const TOTAL_CHART_TITLE: &str = "Total Call Outcomes for All Campaigns";

/// Complete, ordered content of one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    title: String,
    file_name: String,
    sections: Vec<CampaignSection>,
}

impl ReportDocument {
    /// Builds the document model for the given rows and inclusive date range.
    ///
    /// The last row is treated as the aggregate row, which
    /// [`crate::metrics::normalize`] guarantees.
    pub fn new(rows: &[ReportRow], start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let sections = rows
            .iter()
            .enumerate()
            .map(|(index, row)| CampaignSection::new(row, index + 1 == rows.len()))
            .collect();

        Self {
            title: format!("Campaign KPI Report from {start_date} to {end_date}"),
            file_name: format!("KPI_Report_From_{start_date}_to_{end_date}.pdf"),
            sections,
        }
    }

    /// Document title naming the inclusive date range.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Suggested name for the rendered file.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Sections in presentation order, the aggregate last.
    pub fn sections(&self) -> &[CampaignSection] {
        &self.sections
    }
}

/// One campaign's part of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignSection {
    heading: String,
    aggregate: bool,
    body: SectionBody,
}

/// Body of a section: either the zero-calls notice or the chart-and-table
/// pair.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// The row recorded no calls; there is nothing to chart or tabulate.
    Notice(String),
    /// Regular section content.
    Metrics {
        chart: ChartSpec,
        table: MetricsTable,
    },
}

impl CampaignSection {
    fn new(row: &ReportRow, aggregate: bool) -> Self {
        let heading = if aggregate {
            TOTAL_HEADING.to_owned()
        } else {
            format!("Campaign: {}", row.campaign)
        };

        let body = if row.calls == 0 {
            warn!("no calls recorded for campaign {}", row.campaign);
            SectionBody::Notice(format!(
                "No calls recorded for campaign: {}",
                row.campaign
            ))
        } else {
            SectionBody::Metrics {
                chart: ChartSpec::new(row, aggregate),
                table: MetricsTable::new(row),
            }
        };

        Self {
            heading,
            aggregate,
            body,
        }
    }

    /// Section heading as printed in the document.
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Whether this is the aggregate section.
    pub fn is_aggregate(&self) -> bool {
        self.aggregate
    }

    /// Section content.
    pub fn body(&self) -> &SectionBody {
        &self.body
    }
}

/// Data behind one bar chart: a title plus the thirteen bars in fixed
/// metric order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    title: String,
    aggregate: bool,
    bars: Vec<ChartBar>,
}

/// A single bar: metric label and its percentage of total calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    label: &'static str,
    percentage: f64,
}

impl ChartSpec {
    fn new(row: &ReportRow, aggregate: bool) -> Self {
        let title = if aggregate {
            TOTAL_CHART_TITLE.to_owned()
        } else {
            format!("Call Outcomes for {}", row.campaign)
        };

        let bars = Metric::ALL
            .iter()
            .map(|&metric| ChartBar {
                label: metric.label(),
                percentage: share_of_calls(row.metric(metric), row.calls),
            })
            .collect();

        Self {
            title,
            aggregate,
            bars,
        }
    }

    /// Chart title naming the campaign (or all campaigns).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the chart belongs to the aggregate section.
    pub fn is_aggregate(&self) -> bool {
        self.aggregate
    }

    /// Bars in presentation order.
    pub fn bars(&self) -> &[ChartBar] {
        &self.bars
    }
}

impl ChartBar {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Percentage of total calls. Values are raw shares; they are not
    /// normalized to sum to 100.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }
}

/// The three-column metrics table of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    rows: Vec<TableRow>,
}

/// One display row: label, rounded value and the formatted percentage cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    label: &'static str,
    value: u64,
    percentage: String,
}

impl MetricsTable {
    fn new(row: &ReportRow) -> Self {
        let mut rows = vec![TableRow {
            label: "Calls",
            value: row.calls,
            percentage: "100%".to_owned(),
        }];

        for &metric in Metric::ALL.iter() {
            let percentage = if metric.is_share_of_calls() {
                format!("{:.2}%", share_of_calls(row.metric(metric), row.calls))
            } else {
                "-".to_owned()
            };
            rows.push(TableRow {
                label: metric.label(),
                value: row.metric(metric),
                percentage,
            });
        }

        Self { rows }
    }

    /// Display rows: Calls first, then the thirteen metrics in order.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }
}

impl TableRow {
    /// Metric label of this row.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Rounded integer value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Formatted percentage cell: `100%` for Calls, two decimals for
    /// counts, `-` for the ratio-like metrics.
    pub fn percentage(&self) -> &str {
        &self.percentage
    }
}

fn share_of_calls(value: u64, calls: u64) -> f64 {
    value as f64 / calls as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TOTAL_LABEL;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }

    fn row(campaign: &str, calls: u64) -> ReportRow {
        ReportRow {
            campaign: campaign.to_owned(),
            calls,
            machines: 10,
            connects: 50,
            leads: 5,
            calls_to_connects_ratio: 2,
            answered_percentage: 50,
            not_interested: 0,
            do_not_call: 0,
            wrong_number: 0,
            dead_call: 0,
            voicemail: 13,
            not_available: 0,
            spanish_speaker: 0,
            callback: 0,
        }
    }

    #[test]
    fn title_and_file_name_carry_the_date_range() {
        let document = ReportDocument::new(&[], date(5), date(11));

        assert_eq!(
            document.title(),
            "Campaign KPI Report from 2024-08-05 to 2024-08-11"
        );
        assert_eq!(
            document.file_name(),
            "KPI_Report_From_2024-08-05_to_2024-08-11.pdf"
        );
    }

    #[test]
    fn one_section_per_row_with_aggregate_last() {
        let rows = vec![row("SG", 100), row(TOTAL_LABEL, 100)];
        let document = ReportDocument::new(&rows, date(5), date(11));

        assert_eq!(document.sections().len(), 2);
        assert_eq!(document.sections()[0].heading(), "Campaign: SG");
        assert!(!document.sections()[0].is_aggregate());
        assert_eq!(
            document.sections()[1].heading(),
            "Total Report for All Campaigns"
        );
        assert!(document.sections()[1].is_aggregate());
    }

    #[test]
    fn zero_calls_renders_a_notice_without_chart_or_table() {
        let rows = vec![row("QUIET", 0), row(TOTAL_LABEL, 0)];
        let document = ReportDocument::new(&rows, date(5), date(11));

        match document.sections()[0].body() {
            SectionBody::Notice(text) => {
                assert_eq!(text, "No calls recorded for campaign: QUIET");
            }
            SectionBody::Metrics { .. } => panic!("zero-calls section must not chart"),
        }
        // The rule applies to the aggregate section too.
        assert!(matches!(
            document.sections()[1].body(),
            SectionBody::Notice(_)
        ));
    }

    #[test]
    fn chart_bars_are_raw_shares_in_fixed_order() {
        let rows = vec![row("SG", 100)];
        let document = ReportDocument::new(&rows, date(5), date(11));

        let SectionBody::Metrics { chart, .. } = document.sections()[0].body() else {
            panic!("expected chart content");
        };

        assert_eq!(chart.title(), "Call Outcomes for SG");
        assert_eq!(chart.bars().len(), 13);
        assert_eq!(chart.bars()[0].label(), "Machines");
        assert_eq!(chart.bars()[0].percentage(), 10.0);
        assert_eq!(chart.bars()[9].label(), "Voicemail");
        assert_eq!(chart.bars()[9].percentage(), 13.0);

        // Shares are not normalized; they do not need to sum to 100.
        let sum: f64 = chart.bars().iter().map(ChartBar::percentage).sum();
        assert!((sum - 130.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_chart_is_titled_for_all_campaigns() {
        let rows = vec![row("SG", 100), row(TOTAL_LABEL, 100)];
        let document = ReportDocument::new(&rows, date(5), date(11));

        let SectionBody::Metrics { chart, .. } = document.sections()[1].body() else {
            panic!("expected chart content");
        };
        assert_eq!(chart.title(), "Total Call Outcomes for All Campaigns");
        assert!(chart.is_aggregate());
    }

    #[test]
    fn table_formats_percentages_with_two_decimals() {
        let mut sg = row("SG", 3);
        sg.machines = 1;
        let document = ReportDocument::new(&[sg], date(5), date(11));

        let SectionBody::Metrics { table, .. } = document.sections()[0].body() else {
            panic!("expected table content");
        };

        let machines = &table.rows()[1];
        assert_eq!(machines.label(), "Machines");
        assert_eq!(machines.value(), 1);
        assert_eq!(machines.percentage(), "33.33%");
    }

    #[test]
    fn calls_row_is_first_and_reads_one_hundred_percent() {
        let document = ReportDocument::new(&[row("SG", 100)], date(5), date(11));

        let SectionBody::Metrics { table, .. } = document.sections()[0].body() else {
            panic!("expected table content");
        };

        assert_eq!(table.rows().len(), 14);
        assert_eq!(table.rows()[0].label(), "Calls");
        assert_eq!(table.rows()[0].value(), 100);
        assert_eq!(table.rows()[0].percentage(), "100%");
    }

    #[test]
    fn ratio_like_rows_always_show_a_dash() {
        let document = ReportDocument::new(&[row("SG", 100)], date(5), date(11));

        let SectionBody::Metrics { table, .. } = document.sections()[0].body() else {
            panic!("expected table content");
        };

        let by_label = |label: &str| {
            table
                .rows()
                .iter()
                .find(|row| row.label() == label)
                .unwrap()
        };
        assert_eq!(by_label("Calls to Connects Ratio").percentage(), "-");
        assert_eq!(by_label("Answered Percentage").percentage(), "-");
        assert_eq!(by_label("Voicemail").percentage(), "13.00%");
    }
}
