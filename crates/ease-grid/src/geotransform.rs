//! GDAL-style affine geotransform for cell-center registered grids.
//!
//! The six coefficients follow GDAL ordering:
//!
//! ```text
//! GT(0) x of the upper-left corner of the upper-left cell
//! GT(1) cell width
//! GT(2) row rotation (zero for every supported grid)
//! GT(3) y of the upper-left corner of the upper-left cell
//! GT(4) column rotation (zero for every supported grid)
//! GT(5) cell height (negative for north-up grids)
//! ```

use crate::error::{GridError, GridResult};
use crate::gpd::GridDefinition;

/// A 6-element affine transform from (column, row) to projected (x, y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geotransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub top_left_y: f64,
    pub column_rotation: f64,
    pub pixel_height: f64,
}

impl Geotransform {
    pub fn new(
        top_left_x: f64,
        pixel_width: f64,
        row_rotation: f64,
        top_left_y: f64,
        column_rotation: f64,
        pixel_height: f64,
    ) -> Self {
        Self {
            top_left_x,
            pixel_width,
            row_rotation,
            top_left_y,
            column_rotation,
            pixel_height,
        }
    }

    /// Build the transform for a grid definition.
    ///
    /// Only cell-center registered grids are accepted.
    pub fn from_definition(definition: &GridDefinition) -> GridResult<Self> {
        validate_gpd_style(definition)?;
        Ok(Self::new(
            definition.origin_x,
            definition.cell_size,
            0.0,
            definition.origin_y,
            0.0,
            -definition.cell_size,
        ))
    }

    /// Projected coordinate of the center of cell (col, row).
    pub fn cell_to_xy(&self, col: usize, row: usize) -> (f64, f64) {
        // The transform addresses cell corners, shift to the cell center.
        let adj_col = col as f64 + 0.5;
        let adj_row = row as f64 + 0.5;

        let x = self.top_left_x + adj_col * self.pixel_width + adj_row * self.row_rotation;
        let y = self.top_left_y + adj_col * self.column_rotation + adj_row * self.pixel_height;
        (x, y)
    }
}

/// Reject grids that are not registered at the cell center.
pub fn validate_gpd_style(definition: &GridDefinition) -> GridResult<()> {
    if !definition.is_cell_center_registered() {
        return Err(GridError::NonStandardGpd(format!(
            "grid {} has origin column {} and origin row {}, expected -0.5",
            definition.name, definition.origin_column, definition.origin_row
        )));
    }
    Ok(())
}

/// Compute the x and y dimension coordinates of a grid.
///
/// x values run along the first row and y values down the first column, so
/// this costs O(width + height) rather than materializing every cell.
pub fn compute_dims(definition: &GridDefinition) -> GridResult<(Vec<f64>, Vec<f64>)> {
    let geotransform = Geotransform::from_definition(definition)?;

    let x_values = (0..definition.width as usize)
        .map(|col| geotransform.cell_to_xy(col, 0).0)
        .collect();
    let y_values = (0..definition.height as usize)
        .map(|row| geotransform.cell_to_xy(0, row).1)
        .collect();

    Ok((x_values, y_values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpd::GridParameters;
    use test_utils::assert_approx_eq;

    fn sample_definition() -> GridDefinition {
        GridDefinition {
            name: "sample".to_string(),
            origin_x: -5000.0,
            origin_y: -5000.0,
            cell_size: 1000.0,
            width: 10,
            height: 10,
            origin_column: -0.5,
            origin_row: -0.5,
            crs_identifier: "EPSG:6933".to_string(),
            parameters: GridParameters::new(),
        }
    }

    #[test]
    fn test_cell_to_xy() {
        let gt = Geotransform::new(-2000.0, 1000.0, 0.0, 0.0, 0.0, -1000.0);
        let (x, y) = gt.cell_to_xy(0, 0);
        assert_approx_eq!(x, -1500.0, 1e-9);
        assert_approx_eq!(y, -500.0, 1e-9);

        let (x, y) = gt.cell_to_xy(1, 1);
        assert_approx_eq!(x, -500.0, 1e-9);
        assert_approx_eq!(y, -1500.0, 1e-9);
    }

    #[test]
    fn test_cell_to_xy_applies_rotation_terms() {
        let gt = Geotransform::new(0.0, 10.0, 2.0, 0.0, 3.0, -10.0);
        let (x, y) = gt.cell_to_xy(1, 2);
        // adj_col = 1.5, adj_row = 2.5
        assert_approx_eq!(x, 1.5 * 10.0 + 2.5 * 2.0, 1e-12);
        assert_approx_eq!(y, 1.5 * 3.0 - 2.5 * 10.0, 1e-12);
    }

    #[test]
    fn test_from_definition() {
        let gt = Geotransform::from_definition(&sample_definition()).unwrap();
        assert_eq!(gt.top_left_x, -5000.0);
        assert_eq!(gt.top_left_y, -5000.0);
        assert_eq!(gt.row_rotation, 0.0);
        assert_eq!(gt.column_rotation, 0.0);
        assert_eq!(gt.pixel_width, 1000.0);
        assert_eq!(gt.pixel_height, -1000.0);
    }

    #[test]
    fn test_validate_gpd_style() {
        assert!(validate_gpd_style(&sample_definition()).is_ok());

        let mut invalid = sample_definition();
        invalid.origin_column = 0.0;
        assert!(matches!(
            validate_gpd_style(&invalid),
            Err(GridError::NonStandardGpd(_))
        ));

        let mut invalid = sample_definition();
        invalid.origin_row = 0.5;
        assert!(Geotransform::from_definition(&invalid).is_err());
    }

    #[test]
    fn test_compute_dims_counts_and_monotonicity() {
        let mut def = sample_definition();
        def.width = 7;
        def.height = 3;
        let (x, y) = compute_dims(&def).unwrap();
        assert_eq!(x.len(), 7);
        assert_eq!(y.len(), 3);
        assert!(x.windows(2).all(|w| w[1] > w[0]));
        assert!(y.windows(2).all(|w| w[1] < w[0]));
        assert_approx_eq!(x[0], -4500.0, 1e-9);
        assert_approx_eq!(y[0], -5500.0, 1e-9);
    }

    #[test]
    fn test_compute_dims_rejects_corner_registration() {
        let mut def = sample_definition();
        def.origin_column = 0.0;
        def.origin_row = 0.0;
        assert!(compute_dims(&def).is_err());
    }
}
