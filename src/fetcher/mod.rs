// Data retrieval: the source boundary and its Google Trends implementation.

pub mod google_trends;
pub mod traits;

pub use google_trends::GoogleTrendsClient;
pub use traits::TrendsSource;
