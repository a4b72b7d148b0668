//! Shared test utilities for the SMAP L2 gridder workspace.
//!
//! - Synthetic SMAP L2 input trees ([`fixtures`])
//! - Swath sample generators ([`generators`])
//! - Lookup of real granules by collection short name ([`granules`])
//!
//! ```ignore
//! use test_utils::{require_granule, short_names, smap_input};
//! ```

pub mod fixtures;
pub mod generators;
pub mod granules;

pub use fixtures::*;
pub use generators::*;
pub use granules::*;

/// Path of a real granule of the given collection, or return from the test.
///
/// ```ignore
/// #[test]
/// fn test_real_granule() {
///     let path = test_utils::require_granule!("SPL2SMP_E");
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! require_granule {
    ($short_name:expr) => {{
        match $crate::find_granule($short_name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: no {} granule found. Place one in testdata/granules/{}/ or set {}.",
                    $short_name, $short_name, $crate::GRANULE_DIR_ENV
                );
                return;
            }
        }
    }};
}

/// Assert two numbers are within `epsilon` of each other.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-9999.0_f32, -9999.0_f64, 0.0);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(36032.22, 36000.0, 1.0);
    }

    #[test]
    fn test_require_granule_skips_unknown_collection() {
        let mut reached = false;
        (|| {
            let _path = require_granule!("NOT_A_COLLECTION");
            reached = true;
        })();
        assert!(!reached);
    }
}
