//! Normalized report rows derived from raw service metrics.

use std::collections::HashMap;

use log::warn;
use serde::Serialize;
use tabled::Tabled;

use crate::client::MetricRecord;

/// Campaign name carried by the synthetic aggregate row.
pub const TOTAL_LABEL: &str = "Total";

/// The thirteen chartable metrics, in presentation order.
///
/// Charts and tables always present the metrics in exactly this order;
/// `Calls` is handled separately because the other values are read against
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Machines,
    Connects,
    Leads,
    CallsToConnectsRatio,
    AnsweredPercentage,
    NotInterested,
    DoNotCall,
    WrongNumber,
    DeadCall,
    Voicemail,
    NotAvailable,
    SpanishSpeaker,
    Callback,
}

impl Metric {
    /// All metrics in presentation order.
    pub const ALL: [Metric; 13] = [
        Metric::Machines,
        Metric::Connects,
        Metric::Leads,
        Metric::CallsToConnectsRatio,
        Metric::AnsweredPercentage,
        Metric::NotInterested,
        Metric::DoNotCall,
        Metric::WrongNumber,
        Metric::DeadCall,
        Metric::Voicemail,
        Metric::NotAvailable,
        Metric::SpanishSpeaker,
        Metric::Callback,
    ];

    /// Display label used in charts, tables and serialized rows.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Machines => "Machines",
            Metric::Connects => "Connects",
            Metric::Leads => "Leads",
            Metric::CallsToConnectsRatio => "Calls to Connects Ratio",
            Metric::AnsweredPercentage => "Answered Percentage",
            Metric::NotInterested => "Not Interested",
            Metric::DoNotCall => "Do Not Call",
            Metric::WrongNumber => "Wrong Number",
            Metric::DeadCall => "Dead Call",
            Metric::Voicemail => "Voicemail",
            Metric::NotAvailable => "Not Available",
            Metric::SpanishSpeaker => "Spanish Speaker",
            Metric::Callback => "Callback",
        }
    }

    /// Whether the metric counts calls, making its share of total calls
    /// meaningful. The two ratio-like fields are excluded; their table cells
    /// show `-` instead of a percentage.
    pub fn is_share_of_calls(self) -> bool {
        !matches!(
            self,
            Metric::CallsToConnectsRatio | Metric::AnsweredPercentage
        )
    }
}

/// One campaign's ceiling-rounded metrics.
///
/// Column names match the report tables, so both the console preview and
/// JSON output read the same as the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ReportRow {
    #[serde(rename = "Campaign")]
    #[tabled(rename = "Campaign")]
    pub campaign: String,
    #[serde(rename = "Calls")]
    #[tabled(rename = "Calls")]
    pub calls: u64,
    #[serde(rename = "Machines")]
    #[tabled(rename = "Machines")]
    pub machines: u64,
    #[serde(rename = "Connects")]
    #[tabled(rename = "Connects")]
    pub connects: u64,
    #[serde(rename = "Leads")]
    #[tabled(rename = "Leads")]
    pub leads: u64,
    #[serde(rename = "Calls to Connects Ratio")]
    #[tabled(rename = "Calls to Connects Ratio")]
    pub calls_to_connects_ratio: u64,
    #[serde(rename = "Answered Percentage")]
    #[tabled(rename = "Answered Percentage")]
    pub answered_percentage: u64,
    #[serde(rename = "Not Interested")]
    #[tabled(rename = "Not Interested")]
    pub not_interested: u64,
    #[serde(rename = "Do Not Call")]
    #[tabled(rename = "Do Not Call")]
    pub do_not_call: u64,
    #[serde(rename = "Wrong Number")]
    #[tabled(rename = "Wrong Number")]
    pub wrong_number: u64,
    #[serde(rename = "Dead Call")]
    #[tabled(rename = "Dead Call")]
    pub dead_call: u64,
    #[serde(rename = "Voicemail")]
    #[tabled(rename = "Voicemail")]
    pub voicemail: u64,
    #[serde(rename = "Not Available")]
    #[tabled(rename = "Not Available")]
    pub not_available: u64,
    #[serde(rename = "Spanish Speaker")]
    #[tabled(rename = "Spanish Speaker")]
    pub spanish_speaker: u64,
    #[serde(rename = "Callback")]
    #[tabled(rename = "Callback")]
    pub callback: u64,
}

impl ReportRow {
    fn from_record(campaign: &str, record: &MetricRecord) -> Self {
        Self {
            campaign: campaign.to_owned(),
            calls: rounded(record.calls),
            machines: rounded(record.machines),
            connects: rounded(record.connects),
            leads: rounded(record.leads),
            calls_to_connects_ratio: rounded(record.calls_to_connects_ratio),
            answered_percentage: rounded(record.answered_percentage),
            not_interested: rounded(record.category("NOT INTERESTED")),
            do_not_call: rounded(record.category("DO NOT CALL")),
            wrong_number: rounded(record.category("WRONG NUMBER")),
            dead_call: rounded(record.category("DEAD CALL")),
            voicemail: rounded(record.category("VOICEMAIL")),
            not_available: rounded(record.category("NOT AVAILABLE")),
            spanish_speaker: rounded(record.category("SPANISH SPEAKER")),
            callback: rounded(record.category("CALLBACK")),
        }
    }

    /// Reads one of the thirteen chartable metrics.
    pub fn metric(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Machines => self.machines,
            Metric::Connects => self.connects,
            Metric::Leads => self.leads,
            Metric::CallsToConnectsRatio => self.calls_to_connects_ratio,
            Metric::AnsweredPercentage => self.answered_percentage,
            Metric::NotInterested => self.not_interested,
            Metric::DoNotCall => self.do_not_call,
            Metric::WrongNumber => self.wrong_number,
            Metric::DeadCall => self.dead_call,
            Metric::Voicemail => self.voicemail,
            Metric::NotAvailable => self.not_available,
            Metric::SpanishSpeaker => self.spanish_speaker,
            Metric::Callback => self.callback,
        }
    }
}

/// Ceiling-rounds one raw value. Downstream consumers expect these exact
/// integers, so the policy must not drift towards nearest-value rounding.
fn rounded(value: f64) -> u64 {
    value.ceil() as u64
}

/// Builds one row per selected campaign, in selection order, with the
/// aggregate [`TOTAL_LABEL`] row appended last.
///
/// A campaign the service did not report on yields an all-zero row; the
/// renderer turns it into a zero-calls notice rather than dropping the
/// campaign silently.
pub fn normalize(
    selection: &[String],
    records: &HashMap<String, MetricRecord>,
) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = selection
        .iter()
        .map(|campaign| match records.get(campaign) {
            Some(record) => ReportRow::from_record(campaign, record),
            None => {
                warn!("summary service returned no metrics for campaign {campaign}");
                ReportRow::from_record(campaign, &MetricRecord::default())
            }
        })
        .collect();

    rows.push(total_row(&rows));
    rows
}

/// Field-wise sum of already-rounded rows. Totals are never re-rounded.
fn total_row(rows: &[ReportRow]) -> ReportRow {
    let mut total = ReportRow {
        campaign: TOTAL_LABEL.to_owned(),
        calls: 0,
        machines: 0,
        connects: 0,
        leads: 0,
        calls_to_connects_ratio: 0,
        answered_percentage: 0,
        not_interested: 0,
        do_not_call: 0,
        wrong_number: 0,
        dead_call: 0,
        voicemail: 0,
        not_available: 0,
        spanish_speaker: 0,
        callback: 0,
    };

    for row in rows {
        total.calls += row.calls;
        total.machines += row.machines;
        total.connects += row.connects;
        total.leads += row.leads;
        total.calls_to_connects_ratio += row.calls_to_connects_ratio;
        total.answered_percentage += row.answered_percentage;
        total.not_interested += row.not_interested;
        total.do_not_call += row.do_not_call;
        total.wrong_number += row.wrong_number;
        total.dead_call += row.dead_call;
        total.voicemail += row.voicemail;
        total.not_available += row.not_available;
        total.spanish_speaker += row.spanish_speaker;
        total.callback += row.callback;
    }

    total
}
