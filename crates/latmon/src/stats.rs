//! Mean and standard deviation over latency samples.

/// Arithmetic mean of `values`.
///
/// Callers must guard against empty input; the aggregation layer substitutes
/// a `-1.0` sentinel instead of calling this on an empty set.
pub fn average(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by N, not N-1) of `values` around
/// a precomputed `mean`.
///
/// Same empty-input contract as [`average`].
pub fn std_deviation(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
