use crate::fetcher::traits::TrendsSource;
use crate::model::{FetchError, Series, TrendsRequest};
use crate::normalizer::normalize_points;
use crate::parser::{TimeseriesWidget, TrendsParser};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

const EXPLORE_URL: &str = "https://trends.google.com/trends/api/explore";
const MULTILINE_URL: &str = "https://trends.google.com/trends/api/widgetdata/multiline";

/// Interest-over-time client for a single keyword.
pub struct GoogleTrendsClient {
    pub client: Client,
    pub request: TrendsRequest,
    pub drop_partial: bool,
    parser: TrendsParser,
}

impl GoogleTrendsClient {
    pub fn new(client: Client, request: TrendsRequest, drop_partial: bool) -> Self {
        Self {
            client,
            request,
            drop_partial,
            parser: TrendsParser::new(),
        }
    }

    /// Shared HTTP client; one per process is enough for every keyword.
    pub fn build_http_client(timeout: Duration) -> Result<Client, FetchError> {
        Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) TrendWatch/0.1")
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(FetchError::from)
    }

    fn explore_payload(&self) -> String {
        json!({
            "comparisonItem": [{
                "keyword": self.request.keyword,
                "time": self.request.timeframe,
                "geo": self.request.geo,
            }],
            "category": 0,
            "property": "",
        })
        .to_string()
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let response = self.client.get(url).query(query).send().await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(FetchError::RateLimited),
            status if !status.is_success() => return Err(FetchError::Status(status.as_u16())),
            _ => {}
        }

        Ok(response.text().await?)
    }

    async fn fetch_widget(&self) -> Result<TimeseriesWidget, FetchError> {
        let query = [
            ("hl", self.request.language.clone()),
            ("tz", self.request.tz_offset_minutes.to_string()),
            ("req", self.explore_payload()),
        ];
        let body = self.get_text(EXPLORE_URL, &query).await?;
        self.parser.parse_explore(&body)
    }
}

#[async_trait::async_trait]
impl TrendsSource for GoogleTrendsClient {
    fn name(&self) -> &str {
        &self.request.keyword
    }

    async fn fetch(&self) -> Result<Series, FetchError> {
        let widget = self.fetch_widget().await?;

        let query = [
            ("hl", self.request.language.clone()),
            ("tz", self.request.tz_offset_minutes.to_string()),
            ("req", widget.request.to_string()),
            ("token", widget.token),
        ];
        let body = self.get_text(MULTILINE_URL, &query).await?;
        let raw = self.parser.parse_timeline(&body)?;

        let series = normalize_points(&self.request.keyword, raw, self.drop_partial)
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;
        if series.is_empty() {
            warn!("No data fetched for keyword '{}'", self.request.keyword);
        } else {
            info!("Fetched {} points for '{}'", series.len(), self.request.keyword);
        }
        Ok(series)
    }
}
