//! Synchronous client for the weekly campaign summary service.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Base URL of the production summary deployment.
pub const DEFAULT_BASE_URL: &str = "https://res-summary-app.azurewebsites.net";

const SUMMARY_PATH: &str = "/api/alerting/client-weekly-summary";

/// Immutable description of one report run: which campaigns, which week.
///
/// Campaign order is significant; report rows are produced in exactly this
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    campaigns: Vec<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl ReportRequest {
    /// Creates a request for the given campaigns over an inclusive date range.
    pub fn new(campaigns: Vec<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            campaigns,
            start_date,
            end_date,
        }
    }

    /// Selected campaigns in presentation order.
    pub fn campaigns(&self) -> &[String] {
        &self.campaigns
    }

    /// First day covered by the report.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day covered by the report.
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}

/// Raw per-campaign metrics as returned by the summary service.
///
/// Every field may be absent on the wire; absent values read as zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    #[serde(default)]
    pub calls: f64,
    #[serde(default)]
    pub machines: f64,
    #[serde(default)]
    pub connects: f64,
    #[serde(default)]
    pub leads: f64,
    #[serde(default)]
    pub calls_to_connects_ratio: f64,
    #[serde(default)]
    pub answered_percentage: f64,
    /// Disposition label to percentage value. The deployed service misspells
    /// this key; it must be matched as sent.
    #[serde(rename = "categoryPercetnages", default)]
    pub category_percentages: HashMap<String, f64>,
}

impl MetricRecord {
    /// Looks up one disposition category, reading absent labels as zero.
    pub fn category(&self, label: &str) -> f64 {
        self.category_percentages
            .get(label)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Source of raw campaign metrics.
///
/// [`SummaryClient`] is the production implementation; tests substitute
/// in-memory fakes so the pipeline runs without a network.
pub trait MetricsSource {
    /// Fetches the raw metrics for every campaign in the request.
    fn fetch(&self, request: &ReportRequest) -> Result<HashMap<String, MetricRecord>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SummaryRequestBody<'a> {
    campaign_names: &'a [String],
    start_date: NaiveDate,
    end_date: NaiveDate,
}

/// HTTPS implementation of [`MetricsSource`].
///
/// Issues exactly one POST per fetch. There is no retry, no caching and no
/// request timeout, so a hanging service blocks the whole run.
pub struct SummaryClient {
    http: Client,
    base_url: String,
    token: String,
}

impl SummaryClient {
    /// Creates a client for the given deployment.
    ///
    /// The bearer token is supplied by the caller; this crate never acquires
    /// or refreshes credentials.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        Ok(Self {
            http: Client::builder().timeout(None).build()?,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }
}

impl MetricsSource for SummaryClient {
    fn fetch(&self, request: &ReportRequest) -> Result<HashMap<String, MetricRecord>> {
        let body = SummaryRequestBody {
            campaign_names: request.campaigns(),
            start_date: request.start_date(),
            end_date: request.end_date(),
        };

        info!(
            "requesting weekly summary for {} campaigns ({} to {})",
            request.campaigns().len(),
            request.start_date(),
            request.end_date()
        );

        let response = self
            .http
            .post(format!("{}{}", self.base_url, SUMMARY_PATH))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        debug!("summary service answered {} ({} bytes)", status, text.len());

        decode_summary(status, &text)
    }
}

/// Maps one service reply to records: 200 parses the JSON campaign map,
/// anything else is a remote failure carrying the status code.
fn decode_summary(status: StatusCode, body: &str) -> Result<HashMap<String, MetricRecord>> {
    if status != StatusCode::OK {
        return Err(Error::Remote {
            status: status.as_u16(),
        });
    }
    Ok(serde_json::from_str(body)?)
}
