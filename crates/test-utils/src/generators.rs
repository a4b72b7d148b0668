//! Swath sample generators for synthetic SMAP L2 data.
//!
//! These generators create predictable, verifiable sample patterns so tests
//! can check exactly which grid cell each sample landed in.

/// Creates row and column indices placing sample `i` at cell `(i, i)`.
///
/// # Example
///
/// ```
/// use test_utils::diagonal_indices;
///
/// let (rows, cols) = diagonal_indices(3);
/// assert_eq!(rows, [0, 1, 2]);
/// assert_eq!(rows, cols);
/// ```
pub fn diagonal_indices(n: usize) -> (Vec<u16>, Vec<u16>) {
    let rows: Vec<u16> = (0..n as u16).collect();
    (rows.clone(), rows)
}

/// Creates indices filling a grid `width` columns wide in row-major order.
///
/// Sample `i` lands at row `i / width`, column `i % width`.
pub fn raster_indices(n: usize, width: usize) -> (Vec<u16>, Vec<u16>) {
    let rows = (0..n).map(|i| (i / width) as u16).collect();
    let cols = (0..n).map(|i| (i % width) as u16).collect();
    (rows, cols)
}

/// Creates sample values `0.1, 0.2, 0.3, ...`.
///
/// Each value is `(i + 1) / 10`, so a value found in the output identifies
/// the sample it came from.
pub fn create_test_samples(n: usize) -> Vec<f32> {
    (0..n).map(|i| (i + 1) as f32 / 10.0).collect()
}

/// Creates test samples with NaN at the given positions.
///
/// Useful for checking that missing samples leave their cell at the fill value.
pub fn create_samples_with_nans(n: usize, nan_positions: &[usize]) -> Vec<f32> {
    let mut data = create_test_samples(n);
    for &i in nan_positions {
        if i < data.len() {
            data[i] = f32::NAN;
        }
    }
    data
}

/// Creates a row-major (n, 3) land cover array.
///
/// Component `k` of sample `i` is `i * 10 + k`.
pub fn create_landcover_samples(n: usize) -> Vec<u8> {
    (0..n)
        .flat_map(|i| (0..3).map(move |k| (i * 10 + k) as u8))
        .collect()
}

/// Creates ISO 8601 time strings, one per sample, with an empty string at
/// each position in `missing`.
pub fn create_time_strings(n: usize, missing: &[usize]) -> Vec<String> {
    (0..n)
        .map(|i| {
            if missing.contains(&i) {
                String::new()
            } else {
                format!("2015-04-01T00:{:02}:00.000Z", i % 60)
            }
        })
        .collect()
}
