// Analyzer module: numeric kernels and the per-series descriptor engine.

pub mod statistics;
pub mod trend_analysis;

// Re-export the analyzer for ease of use.
pub use trend_analysis::{AnalysisParams, ResultStream, TrendAnalyzer, DEFAULT_LAG, DEFAULT_WINDOW};
