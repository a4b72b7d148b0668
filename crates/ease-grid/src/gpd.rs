//! Grid parameter definition (`.gpd`) files.
//!
//! NSIDC describes each EASE-Grid 2.0 grid with a small line-oriented text
//! file of `key: value ; comment` entries. The parser here is schema-free;
//! [`GridDefinition::from_parameters`] pulls out and checks the keys the
//! gridder actually needs.

use indexmap::IndexMap;
use std::fmt;
use std::path::Path;

use crate::error::{GridError, GridResult};

/// Key holding the x coordinate of the upper-left corner (meters).
pub const MAP_ORIGIN_X: &str = "Map Origin X";
/// Key holding the y coordinate of the upper-left corner (meters).
pub const MAP_ORIGIN_Y: &str = "Map Origin Y";
/// Key holding the cell size (meters).
pub const UNITS_PER_CELL: &str = "Grid Map Units per Cell";
/// Key holding the number of columns.
pub const GRID_WIDTH: &str = "Grid Width";
/// Key holding the number of rows.
pub const GRID_HEIGHT: &str = "Grid Height";
/// Key holding the column registration offset.
pub const ORIGIN_COLUMN: &str = "Grid Map Origin Column";
/// Key holding the row registration offset.
pub const ORIGIN_ROW: &str = "Grid Map Origin Row";

const COMMENT_MARKER: char = ';';

/// A single parsed value from a `.gpd` file.
#[derive(Debug, Clone, PartialEq)]
pub enum GpdValue {
    Float(f64),
    Integer(i64),
    Text(String),
}

impl GpdValue {
    /// Numeric view of the value; integers widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GpdValue::Float(v) => Some(*v),
            GpdValue::Integer(v) => Some(*v as f64),
            GpdValue::Text(_) => None,
        }
    }

    /// Integer view of the value. Floats are only accepted when integral.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            GpdValue::Integer(v) => u32::try_from(*v).ok(),
            GpdValue::Float(v) if v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64 => {
                Some(*v as u32)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GpdValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for GpdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpdValue::Float(v) => write!(f, "{}", v),
            GpdValue::Integer(v) => write!(f, "{}", v),
            GpdValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Parsed parameters in file order.
pub type GridParameters = IndexMap<String, GpdValue>;

/// Convert a raw `.gpd` value to its natural type.
///
/// Values containing a `.` are parsed as f64, everything else as an integer.
/// Anything that fails to parse is kept as text.
pub fn convert_value(value: &str) -> GpdValue {
    let value = value.trim();
    let parsed = if value.contains('.') {
        value.parse::<f64>().ok().map(GpdValue::Float)
    } else {
        value.parse::<i64>().ok().map(GpdValue::Integer)
    };
    parsed.unwrap_or_else(|| GpdValue::Text(value.to_string()))
}

/// Parse the contents of a grid parameter definition file.
pub fn parse_grid_parameters(source: &str) -> GridParameters {
    let mut params = GridParameters::new();

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        // Trailing comments only apply to the value side.
        let value = value.split(COMMENT_MARKER).next().unwrap_or("").trim();

        if !key.is_empty() && !value.is_empty() {
            params.insert(key.to_string(), convert_value(value));
        }
    }

    params
}

/// Read and parse a grid parameter definition file from disk.
pub fn parse_grid_parameter_file(path: impl AsRef<Path>) -> GridResult<GridParameters> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| GridError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_grid_parameters(&source))
}

/// Geometry of a named target grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinition {
    /// Grid name, e.g. `M09km`.
    pub name: String,
    /// x coordinate of the upper-left corner of the upper-left cell (meters).
    pub origin_x: f64,
    /// y coordinate of the upper-left corner of the upper-left cell (meters).
    pub origin_y: f64,
    /// Cell edge length (meters).
    pub cell_size: f64,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Column registration offset, -0.5 for cell-center grids.
    pub origin_column: f64,
    /// Row registration offset, -0.5 for cell-center grids.
    pub origin_row: f64,
    /// EPSG identifier of the grid's CRS, e.g. `EPSG:6933`.
    pub crs_identifier: String,
    /// Every parameter from the source file, including the ones above.
    pub parameters: GridParameters,
}

impl GridDefinition {
    /// Build a definition from parsed parameters.
    ///
    /// Fails if a required key is missing or not numeric. The cell-center
    /// convention is checked separately by [`crate::validate_gpd_style`].
    pub fn from_parameters(
        name: &str,
        parameters: GridParameters,
        crs_identifier: &str,
    ) -> GridResult<Self> {
        let float = |key: &str| -> GridResult<f64> {
            let value = parameters
                .get(key)
                .ok_or_else(|| GridError::missing_parameter(name, key))?;
            value
                .as_f64()
                .ok_or_else(|| GridError::invalid_parameter(name, key, value))
        };
        let count = |key: &str| -> GridResult<u32> {
            let value = parameters
                .get(key)
                .ok_or_else(|| GridError::missing_parameter(name, key))?;
            value
                .as_u32()
                .ok_or_else(|| GridError::invalid_parameter(name, key, value))
        };

        Ok(Self {
            name: name.to_string(),
            origin_x: float(MAP_ORIGIN_X)?,
            origin_y: float(MAP_ORIGIN_Y)?,
            cell_size: float(UNITS_PER_CELL)?,
            width: count(GRID_WIDTH)?,
            height: count(GRID_HEIGHT)?,
            origin_column: float(ORIGIN_COLUMN)?,
            origin_row: float(ORIGIN_ROW)?,
            crs_identifier: crs_identifier.to_string(),
            parameters,
        })
    }

    /// Parse `.gpd` source text straight into a definition.
    pub fn from_gpd_source(name: &str, source: &str, crs_identifier: &str) -> GridResult<Self> {
        Self::from_parameters(name, parse_grid_parameters(source), crs_identifier)
    }

    /// True when cells are addressed by their centers.
    pub fn is_cell_center_registered(&self) -> bool {
        self.origin_column == -0.5 && self.origin_row == -0.5
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
    ; Example gpd for parsing
    Map Origin X: -7000.0  ; pinned location for Map Origin X
    Map Origin Y: 0.0
    Grid Map Units per Cell: 1000.0
    Grid Width: 14
    Grid Height: 7
    Grid Map Origin Column: -0.5
    Grid Map Origin Row: -0.5
    Something That Exists But Is Not Used: Has A Value
    ";

    #[test]
    fn test_convert_value() {
        assert_eq!(convert_value(" 123 "), GpdValue::Integer(123));
        assert_eq!(convert_value(" 123.45 "), GpdValue::Float(123.45));
        assert_eq!(convert_value("abc "), GpdValue::Text("abc".to_string()));
    }

    #[test]
    fn test_convert_value_degrades_to_text() {
        assert_eq!(
            convert_value("Cylindrical Equal Area (EASE-Grid 2.0)"),
            GpdValue::Text("Cylindrical Equal Area (EASE-Grid 2.0)".to_string())
        );
        assert_eq!(convert_value("1e5"), GpdValue::Text("1e5".to_string()));
    }

    #[test]
    fn test_parse_grid_parameters() {
        let params = parse_grid_parameters(SAMPLE);
        assert_eq!(params["Map Origin X"], GpdValue::Float(-7000.0));
        assert_eq!(params["Map Origin Y"], GpdValue::Float(0.0));
        assert_eq!(params["Grid Map Units per Cell"], GpdValue::Float(1000.0));
        assert_eq!(params["Grid Width"], GpdValue::Integer(14));
        assert_eq!(
            params["Something That Exists But Is Not Used"],
            GpdValue::Text("Has A Value".to_string())
        );
        // File order is kept
        assert_eq!(params.get_index(0).map(|(k, _)| k.as_str()), Some("Map Origin X"));
    }

    #[test]
    fn test_parse_skips_lines_without_values() {
        let params = parse_grid_parameters("no separator here\nEmpty Value:   ; only a comment\n: orphan");
        assert!(params.is_empty());
    }

    #[test]
    fn test_definition_from_parameters() {
        let def = GridDefinition::from_gpd_source("sample", SAMPLE, "EPSG:6933").unwrap();
        assert_eq!(def.width, 14);
        assert_eq!(def.height, 7);
        assert_eq!(def.cell_size, 1000.0);
        assert_eq!(def.crs_identifier, "EPSG:6933");
        assert!(def.is_cell_center_registered());
        assert_eq!(def.len(), 98);
    }

    #[test]
    fn test_definition_missing_key() {
        let err = GridDefinition::from_gpd_source("broken", "Map Origin X: 1.0", "EPSG:6933")
            .unwrap_err();
        assert!(matches!(err, GridError::MissingParameter { ref key, .. } if key == "Map Origin Y"));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_definition_rejects_text_width() {
        let source = SAMPLE.replace("Grid Width: 14", "Grid Width: wide");
        let err = GridDefinition::from_gpd_source("sample", &source, "EPSG:6933").unwrap_err();
        assert!(matches!(err, GridError::InvalidParameter { ref key, .. } if key == "Grid Width"));
    }

    #[test]
    fn test_parse_grid_parameter_file_missing() {
        let err = parse_grid_parameter_file("/nonexistent/EASE2_X.gpd").unwrap_err();
        assert!(matches!(err, GridError::Io { .. }));
    }
}
