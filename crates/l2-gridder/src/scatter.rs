//! 1D to 2D scatter onto an EASE-Grid 2.0 grid.
//!
//! Each sample `i` of a swath variable lands in cell `(rows[i], cols[i])` of
//! a dense `(y-dim, x-dim)` array that starts out filled with the variable's
//! fill value. Invalid samples (NaN, declared sentinels, empty strings) and
//! samples indexed outside the grid are skipped. When two samples share a
//! cell the later one wins.

use tracing::{debug, warn};

use ease_grid::{compute_dims, CfValue, CrsRecord, GridName, GridStore};
use netcdf_tree::{
    ArrayData, AttrValue, Compression, DataType, Dimension, Encoding, Scalar, Variable,
};

use crate::error::{GridderError, Result};
use crate::fill::{resolve_fill_value, valid_mask};

/// Name of the row dimension and coordinate variable.
pub const Y_DIM: &str = "y-dim";
/// Name of the column dimension and coordinate variable.
pub const X_DIM: &str = "x-dim";
/// Name of the grid-mapping variable written beside gridded variables.
pub const CRS_VARIABLE: &str = "crs";
/// Deflate level applied to gridded numeric variables.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 6;

/// Per-run scatter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScatterOptions {
    /// Deflate level (1-9) for numeric output.
    pub compression_level: i32,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Target grid of one data group: shape, dimension coordinates and CRS.
#[derive(Debug, Clone)]
pub struct TargetGrid {
    pub name: GridName,
    pub width: usize,
    pub height: usize,
    /// Cell-center x of every column, increasing.
    pub x_coords: Vec<f64>,
    /// Cell-center y of every row, decreasing.
    pub y_coords: Vec<f64>,
    pub crs: CrsRecord,
}

impl TargetGrid {
    /// Resolve a named grid from `store`.
    pub fn from_store(store: &GridStore, name: GridName) -> Result<Self> {
        let entry = store.entry(name.as_str())?;
        let definition = entry.definition()?;
        let (x_coords, y_coords) = compute_dims(&definition)?;
        let crs = CrsRecord::from_epsg(entry.epsg())?;

        debug!(
            grid = %name,
            width = definition.width,
            height = definition.height,
            crs = %entry.epsg(),
            "Resolved target grid"
        );
        Ok(Self {
            name,
            width: definition.width as usize,
            height: definition.height as usize,
            x_coords,
            y_coords,
            crs,
        })
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scalar grid-mapping variable carrying the CF CRS attributes.
    ///
    /// Only the attributes are meaningful. A NetCDF scalar always stores one
    /// element, so the empty placeholder is written as a single zero byte.
    pub fn crs_variable(&self) -> Variable {
        let attrs = self
            .crs
            .attributes()
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    CfValue::Text(text) => AttrValue::from(text.as_str()),
                    CfValue::Number(number) => AttrValue::from(*number),
                };
                (name.clone(), value)
            })
            .collect();
        Variable {
            name: CRS_VARIABLE.to_string(),
            dims: Vec::new(),
            data: ArrayData::U8(vec![0]),
            attrs,
            encoding: Encoding::default(),
        }
    }

    /// Column coordinate variable.
    pub fn x_variable(&self) -> Variable {
        Variable::from_vec(X_DIM, X_DIM, self.x_coords.clone())
            .with_attr("standard_name", "projection_x_coordinate")
            .with_attr("long_name", "x coordinate of projection")
            .with_attr("units", "m")
    }

    /// Row coordinate variable.
    pub fn y_variable(&self) -> Variable {
        Variable::from_vec(Y_DIM, Y_DIM, self.y_coords.clone())
            .with_attr("standard_name", "projection_y_coordinate")
            .with_attr("long_name", "y coordinate of projection")
            .with_attr("units", "m")
    }

    fn dimensions(&self) -> Vec<Dimension> {
        vec![
            Dimension::new(Y_DIM, self.height),
            Dimension::new(X_DIM, self.width),
        ]
    }
}

/// Grid row and column of every sample in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIndexArrays {
    pub rows: Vec<u32>,
    pub cols: Vec<u32>,
}

impl SourceIndexArrays {
    /// Index arrays of equal length.
    pub fn new(rows: Vec<u32>, cols: Vec<u32>) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(GridderError::invalid_shape("column index", vec![cols.len()]));
        }
        Ok(Self { rows, cols })
    }

    /// Read the indices from the row and column variables of a group.
    ///
    /// Values that are negative, NaN or not whole numbers cannot address a
    /// cell and are mapped past the end of any grid.
    pub fn from_variables(rows: &Variable, cols: &Variable) -> Result<Self> {
        Self::new(index_values(rows)?, index_values(cols)?)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn index_values(variable: &Variable) -> Result<Vec<u32>> {
    if variable.rank() != 1 {
        return Err(GridderError::invalid_shape(&variable.name, variable.shape()));
    }
    let values = variable.data.to_f64_vec().ok_or_else(|| {
        netcdf_tree::TreeError::unsupported_type(&variable.name, variable.data.dtype())
    })?;
    Ok(values.into_iter().map(to_index).collect())
}

fn to_index(value: f64) -> u32 {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < u32::MAX as f64 {
        value as u32
    } else {
        u32::MAX
    }
}

/// Grid a 1D variable onto `grid`.
///
/// The result has dimensions (`y-dim`, `x-dim`), the source attributes plus
/// `grid_mapping = "crs"`, and an encoding holding the resolved fill value,
/// the source `coordinates` and deflate compression for numeric types.
pub fn scatter_to_grid(
    variable: &Variable,
    indices: &SourceIndexArrays,
    grid: &TargetGrid,
    options: &ScatterOptions,
) -> Result<Variable> {
    if variable.rank() != 1 || variable.data.len() != indices.len() {
        return Err(GridderError::invalid_shape(&variable.name, variable.shape()));
    }

    let dtype = variable.data.dtype();
    let fill = match resolve_fill_value(variable) {
        // Text cells start empty whatever sentinel the source declares.
        Some(fill) if dtype == DataType::Str && !matches!(fill, Scalar::Str(_)) => None,
        Some(fill) => Some(fill.cast(dtype).ok_or_else(|| {
            GridderError::unrepresentable_fill(&variable.name, &fill, dtype)
        })?),
        None => None,
    };
    let mut gridded = ArrayData::full(dtype, grid.len(), fill.as_ref())?;

    let mask = valid_mask(variable);
    let mut placements = Vec::with_capacity(indices.len());
    let mut out_of_range = 0usize;
    for (sample, valid) in mask.iter().enumerate() {
        if !*valid {
            continue;
        }
        let row = indices.rows[sample] as usize;
        let col = indices.cols[sample] as usize;
        if row < grid.height && col < grid.width {
            placements.push((sample, row * grid.width + col));
        } else {
            out_of_range += 1;
        }
    }
    if out_of_range > 0 {
        warn!(
            variable = %variable.name,
            grid = %grid.name,
            dropped = out_of_range,
            "Dropped samples indexed outside the grid"
        );
    }
    variable.data.scatter_into(&mut gridded, &placements)?;

    let mut output = Variable::new(&variable.name, grid.dimensions(), gridded)?;
    output.attrs = variable.attrs.clone();
    output.attrs.shift_remove("_FillValue");
    output
        .attrs
        .insert("grid_mapping".to_string(), AttrValue::from(CRS_VARIABLE));
    output.encoding = Encoding {
        fill_value: fill.filter(|f| !matches!(f, Scalar::Str(_))),
        dtype: Some(variable.storage_dtype()),
        coordinates: variable.encoding.coordinates.clone(),
        compression: variable
            .storage_dtype()
            .is_compressible()
            .then(|| Compression::deflate(options.compression_level)),
    };

    debug!(
        variable = %variable.name,
        placed = placements.len(),
        samples = indices.len(),
        "Gridded variable"
    );
    Ok(output)
}
