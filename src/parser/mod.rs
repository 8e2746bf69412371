// Response parsing for the trends API.

pub mod trends_parser;

pub use trends_parser::{RawPoint, TimeseriesWidget, TrendsParser};
