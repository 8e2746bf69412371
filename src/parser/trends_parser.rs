// Google Trends JSON parsing
use crate::model::FetchError;
use crate::utils::{parse_unix_timestamp, strip_json_prefix};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

pub const TIMESERIES_WIDGET: &str = "TIMESERIES";

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    request: Value,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: MultilineBody,
}

#[derive(Debug, Deserialize)]
struct MultilineBody {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelineEntry>,
}

#[derive(Debug, Deserialize)]
struct TimelineEntry {
    time: String,
    #[serde(default)]
    value: Vec<f64>,
    #[serde(rename = "isPartial", default)]
    is_partial: bool,
}

/// Token and request payload needed to query the interest-over-time widget.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeseriesWidget {
    pub token: String,
    pub request: Value,
}

/// One raw observation before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub is_partial: bool,
}

pub struct TrendsParser;

impl TrendsParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_explore(&self, body: &str) -> Result<TimeseriesWidget, FetchError> {
        let explore: ExploreResponse = serde_json::from_str(strip_json_prefix(body))
            .map_err(|e| FetchError::InvalidResponse(format!("explore: {}", e)))?;

        explore
            .widgets
            .into_iter()
            .find(|w| w.id == TIMESERIES_WIDGET)
            .map(|w| TimeseriesWidget {
                token: w.token,
                request: w.request,
            })
            .ok_or_else(|| FetchError::MissingWidget(TIMESERIES_WIDGET.to_string()))
    }

    pub fn parse_timeline(&self, body: &str) -> Result<Vec<RawPoint>, FetchError> {
        let multiline: MultilineResponse = serde_json::from_str(strip_json_prefix(body))
            .map_err(|e| FetchError::InvalidResponse(format!("multiline: {}", e)))?;

        multiline
            .default
            .timeline_data
            .into_iter()
            .map(|entry| {
                let timestamp = parse_unix_timestamp(&entry.time).ok_or_else(|| {
                    FetchError::InvalidResponse(format!("bad timestamp `{}`", entry.time))
                })?;
                let value = entry.value.first().copied().ok_or_else(|| {
                    FetchError::InvalidResponse(format!("no value at {}", entry.time))
                })?;
                Ok(RawPoint {
                    timestamp,
                    value,
                    is_partial: entry.is_partial,
                })
            })
            .collect()
    }
}

impl Default for TrendsParser {
    fn default() -> Self {
        Self::new()
    }
}
