// Core structs: Series, Descriptor, ResultTable
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Timestamp-indexed interest values for a single keyword.
///
/// Timestamps are strictly increasing and every value is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    name: String,
    points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<SeriesPoint>) -> Result<Self, AnalysisError> {
        if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(AnalysisError::InvalidSeries(format!(
                "non-finite value {} at {}",
                p.value, p.timestamp
            )));
        }
        if let Some(w) = points.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(AnalysisError::InvalidSeries(format!(
                "timestamps not strictly increasing: {} followed by {}",
                w[0].timestamp, w[1].timestamp
            )));
        }
        Ok(Self {
            name: name.into(),
            points,
        })
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn index(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DescriptorKind {
    MovingAverage { window: usize },
    Differential,
    Autocorrelation { lag: usize },
    Maximum,
    Minimum,
}

impl DescriptorKind {
    pub fn name(&self) -> &'static str {
        match self {
            DescriptorKind::MovingAverage { .. } => "Moving Average",
            DescriptorKind::Differential => "Differential",
            DescriptorKind::Autocorrelation { .. } => "Autocorrelation",
            DescriptorKind::Maximum => "Maximum",
            DescriptorKind::Minimum => "Minimum",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A derived series aligned index-for-index with its input. Undefined points are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptor {
    pub kind: DescriptorKind,
    pub values: Vec<f64>,
}

impl Descriptor {
    pub fn new(kind: DescriptorKind, values: Vec<f64>) -> Self {
        Self { kind, values }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `i`, `None` when out of range or undefined.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().filter(|v| !v.is_nan())
    }

    /// Equality that treats two NaNs in the same position as equal.
    pub fn same_values(&self, other: &Descriptor) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

/// All descriptors of one analysis run, sharing the input series' index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    series_name: String,
    index: Vec<DateTime<Utc>>,
    columns: Vec<Descriptor>,
}

impl ResultTable {
    pub fn from_parts(
        series_name: impl Into<String>,
        index: Vec<DateTime<Utc>>,
        columns: Vec<Descriptor>,
    ) -> Result<Self, AnalysisError> {
        if let Some(d) = columns.iter().find(|d| d.len() != index.len()) {
            return Err(AnalysisError::Misaligned {
                descriptor: d.name().to_string(),
                expected: index.len(),
                actual: d.len(),
            });
        }
        Ok(Self {
            series_name: series_name.into(),
            index,
            columns,
        })
    }

    pub fn series_name(&self) -> &str {
        &self.series_name
    }

    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    pub fn columns(&self) -> &[Descriptor] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&Descriptor> {
        self.columns.iter().find(|d| d.name() == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|d| d.name()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid parameter `{parameter}`: {reason}")]
    InvalidParameter { parameter: &'static str, reason: String },

    #[error("invalid series: {0}")]
    InvalidSeries(String),

    #[error("descriptor `{descriptor}` has {actual} points, index has {expected}")]
    Misaligned {
        descriptor: String,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("rate limited by the trends service")]
    RateLimited,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("explore response has no `{0}` widget")]
    MissingWidget(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct TrendsRequest {
    pub keyword: String,
    pub timeframe: String,
    pub geo: String,
    pub language: String,
    pub tz_offset_minutes: i32,
}
