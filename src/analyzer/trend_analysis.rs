use crate::analyzer::statistics::{Extremum, first_difference, local_extrema, pearson_correlation, rolling_mean};
use crate::model::{AnalysisError, Descriptor, DescriptorKind, ResultTable, Series};
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_WINDOW: usize = 3;
pub const DEFAULT_LAG: usize = 1;

/// Parameters used by [`TrendAnalyzer::generate_results`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisParams {
    pub window: usize,
    pub lag: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            lag: DEFAULT_LAG,
        }
    }
}

/// Computes the descriptor set over one series.
///
/// Every computed descriptor is cached on the instance, so asking for the same
/// descriptor twice (e.g. `find_extrema` for both the Maximum and the Minimum
/// column) computes it once. The cache lives and dies with the analyzer.
pub struct TrendAnalyzer {
    series: Series,
    values: Vec<f64>,
    params: AnalysisParams,
    cache: HashMap<DescriptorKind, Descriptor>,
    autocorrelations: HashMap<usize, f64>,
}

impl TrendAnalyzer {
    pub fn new(series: Series) -> Self {
        Self::with_params(series, AnalysisParams::default())
    }

    pub fn with_params(series: Series, params: AnalysisParams) -> Self {
        let values = series.values();
        Self {
            series,
            values,
            params,
            cache: HashMap::new(),
            autocorrelations: HashMap::new(),
        }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn params(&self) -> AnalysisParams {
        self.params
    }

    /// Trailing mean over `window` points; the first `window - 1` values are NaN.
    /// A window longer than the series yields an all-NaN descriptor.
    pub fn moving_average(&mut self, window: usize) -> Result<Descriptor, AnalysisError> {
        if window == 0 {
            return Err(AnalysisError::InvalidParameter {
                parameter: "window",
                reason: "must be a positive integer".into(),
            });
        }
        let kind = DescriptorKind::MovingAverage { window };
        if let Some(cached) = self.cache.get(&kind) {
            return Ok(cached.clone());
        }

        let mut out = vec![f64::NAN; self.values.len()];
        for (i, mean) in rolling_mean(&self.values, window).into_iter().enumerate() {
            out[i + window - 1] = mean;
        }
        let descriptor = Descriptor::new(kind, out);
        self.cache.insert(kind, descriptor.clone());
        debug!("Function moving_average(window={}) completed for '{}'", window, self.series.name());
        Ok(descriptor)
    }

    /// First discrete difference; the first value is NaN.
    pub fn differential(&mut self) -> Descriptor {
        let kind = DescriptorKind::Differential;
        if let Some(cached) = self.cache.get(&kind) {
            return cached.clone();
        }

        let mut out = Vec::with_capacity(self.values.len());
        if !self.values.is_empty() {
            out.push(f64::NAN);
            out.extend(first_difference(&self.values));
        }
        let descriptor = Descriptor::new(kind, out);
        self.cache.insert(kind, descriptor.clone());
        debug!("Function differential completed for '{}'", self.series.name());
        descriptor
    }

    /// Pearson correlation of the series with itself shifted by `lag`, over the overlap only.
    /// NaN when fewer than two points overlap or either side is constant.
    pub fn autocorrelation(&mut self, lag: usize) -> Result<f64, AnalysisError> {
        if lag >= self.values.len() {
            return Err(AnalysisError::InvalidParameter {
                parameter: "lag",
                reason: format!("{} is out of range for a series of length {}", lag, self.values.len()),
            });
        }
        if let Some(&cached) = self.autocorrelations.get(&lag) {
            return Ok(cached);
        }

        let n = self.values.len();
        let leading = &self.values[..n - lag];
        let lagged = &self.values[lag..];
        let r = pearson_correlation(leading, lagged).unwrap_or(f64::NAN);
        self.autocorrelations.insert(lag, r);
        debug!("Function autocorrelation(lag={}) completed for '{}': {}", lag, self.series.name(), r);
        Ok(r)
    }

    /// Strict local maxima and minima. Values are kept at extremum indices, NaN elsewhere.
    pub fn find_extrema(&mut self) -> (Descriptor, Descriptor) {
        if let (Some(max), Some(min)) = (
            self.cache.get(&DescriptorKind::Maximum),
            self.cache.get(&DescriptorKind::Minimum),
        ) {
            return (max.clone(), min.clone());
        }

        let mut maximum = vec![f64::NAN; self.values.len()];
        let mut minimum = vec![f64::NAN; self.values.len()];
        for (i, extremum) in local_extrema(&self.values) {
            match extremum {
                Extremum::Maximum => maximum[i] = self.values[i],
                Extremum::Minimum => minimum[i] = self.values[i],
            }
        }

        let maximum = Descriptor::new(DescriptorKind::Maximum, maximum);
        let minimum = Descriptor::new(DescriptorKind::Minimum, minimum);
        self.cache.insert(DescriptorKind::Maximum, maximum.clone());
        self.cache.insert(DescriptorKind::Minimum, minimum.clone());
        debug!("Function find_extrema completed for '{}'", self.series.name());
        (maximum, minimum)
    }

    /// Lazily yields `(name, descriptor)` in the fixed order
    /// Moving Average, Differential, Autocorrelation, Maximum, Minimum.
    ///
    /// An empty series yields nothing. Every call starts a fresh sequence.
    pub fn generate_results(&mut self) -> ResultStream<'_> {
        ResultStream {
            analyzer: self,
            position: 0,
        }
    }

    /// Drains [`generate_results`](Self::generate_results) into a table.
    pub fn collect_results(&mut self) -> Result<ResultTable, AnalysisError> {
        let columns = self
            .generate_results()
            .map(|item| item.map(|(_, descriptor)| descriptor))
            .collect::<Result<Vec<_>, _>>()?;
        let table = ResultTable::from_parts(self.series.name(), self.series.index(), columns)?;
        debug!(
            "Function collect_results completed for '{}': {} rows",
            self.series.name(),
            table.len()
        );
        Ok(table)
    }

    fn compute_step(&mut self, position: usize) -> Option<Result<Descriptor, AnalysisError>> {
        let step = match position {
            0 => self.moving_average(self.params.window),
            1 => Ok(self.differential()),
            2 => {
                // a series no longer than the lag has no overlap: undefined, not an error
                let r = if self.params.lag >= self.values.len() {
                    Ok(f64::NAN)
                } else {
                    self.autocorrelation(self.params.lag)
                };
                r.map(|r| {
                    Descriptor::new(
                        DescriptorKind::Autocorrelation { lag: self.params.lag },
                        vec![r; self.values.len()],
                    )
                })
            }
            3 => Ok(self.find_extrema().0),
            4 => Ok(self.find_extrema().1),
            _ => return None,
        };
        Some(step)
    }
}

/// Finite sequence returned by [`TrendAnalyzer::generate_results`].
pub struct ResultStream<'a> {
    analyzer: &'a mut TrendAnalyzer,
    position: usize,
}

impl Iterator for ResultStream<'_> {
    type Item = Result<(&'static str, Descriptor), AnalysisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.analyzer.values.is_empty() {
            return None;
        }
        let step = self.analyzer.compute_step(self.position)?;
        self.position += 1;
        Some(step.map(|descriptor| (descriptor.name(), descriptor)))
    }
}
