use crate::model::{AnalysisError, Series, SeriesPoint};
use crate::parser::RawPoint;
use tracing::debug;

/// Turns raw timeline points into a valid [`Series`]: orders by timestamp, keeps the
/// last observation for a repeated timestamp, and drops non-finite values.
/// With `drop_partial`, buckets flagged as still being collected are removed.
pub fn normalize_points(
    name: &str,
    mut raw: Vec<RawPoint>,
    drop_partial: bool,
) -> Result<Series, AnalysisError> {
    let received = raw.len();
    raw.sort_by_key(|p| p.timestamp);

    let mut points: Vec<SeriesPoint> = Vec::with_capacity(raw.len());
    for p in raw {
        if !p.value.is_finite() || (drop_partial && p.is_partial) {
            continue;
        }
        let point = SeriesPoint {
            timestamp: p.timestamp,
            value: p.value,
        };
        if let Some(last) = points.last_mut() {
            if last.timestamp == point.timestamp {
                *last = point;
                continue;
            }
        }
        points.push(point);
    }

    if points.len() != received {
        debug!("Normalized '{}': {} raw points -> {}", name, received, points.len());
    }
    Series::new(name, points)
}
