/// The `percentile` (0 to 100) of ascending `sorted` values, interpolating
/// linearly between the two nearest ranks.
///
/// ### Example
/// ```rust
/// use ptmap::analysis::percentile;
///
/// assert_eq!(percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0), Some(3.0));
/// assert_eq!(percentile(&[0.0, 10.0], 85.0), Some(8.5));
/// assert_eq!(percentile(&[], 50.0), None);
/// ```
pub fn percentile(sorted: &[f64], percentile: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (percentile.clamp(0.0, 100.0) / 100.0) * last as f64;

    let (lower, upper) = (rank.floor() as usize, rank.ceil() as usize);
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
