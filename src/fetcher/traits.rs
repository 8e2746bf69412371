use crate::model::{FetchError, Series};

/// Upstream provider of a search-interest series.
///
/// `fetch` is a single blocking attempt with no retry. No data is an empty
/// series, not an error.
#[async_trait::async_trait]
pub trait TrendsSource: Send + Sync {
    /// Name of the series this source produces (usually the keyword).
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Series, FetchError>;
}
