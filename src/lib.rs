//! Periodic search-interest monitoring: fetch a trends series, derive trend,
//! momentum, extrema and persistence descriptors, publish them on a fixed cadence.

pub mod analyzer;
pub mod config;
pub mod fetcher;
pub mod model;
pub mod monitor;
pub mod normalizer;
pub mod parser;
pub mod sink;
pub mod utils;
