//! Registry of the named EASE-Grid 2.0 grids.
//!
//! The `.gpd` files under `reference/` are compiled into the crate, so the
//! bundled store never touches the filesystem. A store can also be loaded
//! from a directory holding files with the same names, which is how updated
//! grid definitions are tried out without a rebuild.

use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::crs::{CrsRecord, EpsgCode};
use crate::error::{GridError, GridResult};
use crate::geotransform::validate_gpd_style;
use crate::gpd::{parse_grid_parameter_file, GridDefinition};

static BUNDLED: Lazy<GridStore> = Lazy::new(|| GridStore {
    entries: GridName::ALL
        .iter()
        .map(|name| GridEntry {
            name: *name,
            source: Cow::Borrowed(name.bundled_source()),
        })
        .collect(),
});

/// Named target grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridName {
    /// Global 3 km
    M03km,
    /// Global 9 km
    M09km,
    /// Global 36 km
    M36km,
    /// Northern hemisphere 9 km
    N09km,
}

impl GridName {
    pub const ALL: [GridName; 4] = [
        GridName::M03km,
        GridName::M09km,
        GridName::M36km,
        GridName::N09km,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GridName::M03km => "M03km",
            GridName::M09km => "M09km",
            GridName::M36km => "M36km",
            GridName::N09km => "N09km",
        }
    }

    /// File name of the grid's parameter definition.
    pub fn gpd_file(&self) -> &'static str {
        match self {
            GridName::M03km => "EASE2_M03km.gpd",
            GridName::M09km => "EASE2_M09km.gpd",
            GridName::M36km => "EASE2_M36km.gpd",
            GridName::N09km => "EASE2_N09km.gpd",
        }
    }

    /// CRS the grid is defined in.
    pub fn epsg(&self) -> EpsgCode {
        match self {
            GridName::N09km => EpsgCode::Epsg6931,
            _ => EpsgCode::Epsg6933,
        }
    }

    fn bundled_source(&self) -> &'static str {
        match self {
            GridName::M03km => include_str!("../reference/EASE2_M03km.gpd"),
            GridName::M09km => include_str!("../reference/EASE2_M09km.gpd"),
            GridName::M36km => include_str!("../reference/EASE2_M36km.gpd"),
            GridName::N09km => include_str!("../reference/EASE2_N09km.gpd"),
        }
    }
}

impl FromStr for GridName {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GridName::ALL
            .iter()
            .find(|name| name.as_str() == s)
            .copied()
            .ok_or_else(|| GridError::UnknownGrid(s.to_string()))
    }
}

impl fmt::Display for GridName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grid: its name and the text of its parameter definition.
#[derive(Debug, Clone)]
pub struct GridEntry {
    pub name: GridName,
    pub source: Cow<'static, str>,
}

impl GridEntry {
    pub fn epsg(&self) -> EpsgCode {
        self.name.epsg()
    }

    /// Parse the entry into a validated, cell-center registered definition.
    pub fn definition(&self) -> GridResult<GridDefinition> {
        let definition = GridDefinition::from_gpd_source(
            self.name.as_str(),
            &self.source,
            &self.epsg().to_string(),
        )?;
        validate_gpd_style(&definition)?;
        Ok(definition)
    }
}

/// Lookup table from grid name to parameter definition and CRS.
#[derive(Debug, Clone)]
pub struct GridStore {
    entries: Vec<GridEntry>,
}

impl GridStore {
    /// The grids compiled into the crate.
    pub fn bundled() -> &'static GridStore {
        &BUNDLED
    }

    /// Load every known grid from `<dir>/<gpd_file>`.
    pub fn from_directory(dir: impl AsRef<Path>) -> GridResult<Self> {
        let dir = dir.as_ref();
        let mut entries = Vec::with_capacity(GridName::ALL.len());
        for name in GridName::ALL {
            let path = dir.join(name.gpd_file());
            let source = std::fs::read_to_string(&path)
                .map_err(|source| GridError::Io { path: path.clone(), source })?;
            debug!(grid = %name, path = %path.display(), "Loaded grid parameter file");
            entries.push(GridEntry {
                name,
                source: Cow::Owned(source),
            });
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[GridEntry] {
        &self.entries
    }

    /// Find a grid by name, e.g. `M09km`.
    pub fn entry(&self, name: &str) -> GridResult<&GridEntry> {
        let name: GridName = name.parse()?;
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| GridError::UnknownGrid(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_ok()
    }

    /// Validated geometry of a named grid.
    pub fn definition(&self, name: &str) -> GridResult<GridDefinition> {
        self.entry(name)?.definition()
    }

    /// CF grid-mapping record for a named grid's CRS.
    pub fn crs(&self, name: &str) -> GridResult<CrsRecord> {
        CrsRecord::from_epsg(self.entry(name)?.epsg())
    }

    /// Parameters of a grid straight from a `.gpd` file on disk.
    pub fn definition_from_file(
        name: GridName,
        path: impl AsRef<Path>,
    ) -> GridResult<GridDefinition> {
        let parameters = parse_grid_parameter_file(path)?;
        let definition =
            GridDefinition::from_parameters(name.as_str(), parameters, &name.epsg().to_string())?;
        validate_gpd_style(&definition)?;
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_name_round_trip() {
        for name in GridName::ALL {
            assert_eq!(name.as_str().parse::<GridName>().unwrap(), name);
        }
        assert!(matches!(
            "M01km".parse::<GridName>(),
            Err(GridError::UnknownGrid(_))
        ));
    }

    #[test]
    fn test_bundled_dimensions() {
        let store = GridStore::bundled();
        let cases = [
            ("M03km", 11568, 4872),
            ("M09km", 3856, 1624),
            ("M36km", 964, 406),
            ("N09km", 2000, 2000),
        ];
        for (name, width, height) in cases {
            let def = store.definition(name).unwrap();
            assert_eq!((def.width, def.height), (width, height), "{}", name);
            assert!(def.is_cell_center_registered());
        }
    }

    #[test]
    fn test_crs_assignment() {
        let store = GridStore::bundled();
        assert_eq!(store.definition("M09km").unwrap().crs_identifier, "EPSG:6933");
        assert_eq!(store.definition("N09km").unwrap().crs_identifier, "EPSG:6931");
        assert!(store
            .crs("N09km")
            .unwrap()
            .projected_crs_name()
            .ends_with("North"));
    }

    #[test]
    fn test_unknown_grid() {
        let store = GridStore::bundled();
        assert!(!store.contains("EASE2_M09km"));
        assert!(matches!(
            store.definition("nope"),
            Err(GridError::UnknownGrid(_))
        ));
    }

    #[test]
    fn test_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in GridName::ALL {
            let source = name
                .bundled_source()
                .replace("Grid Width:                     ", "Grid Width: ");
            std::fs::write(dir.path().join(name.gpd_file()), source).unwrap();
        }
        let store = GridStore::from_directory(dir.path()).unwrap();
        assert_eq!(store.entries().len(), 4);
        assert_eq!(store.definition("M36km").unwrap().width, 964);
    }

    #[test]
    fn test_from_directory_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GridStore::from_directory(dir.path()).unwrap_err();
        assert!(matches!(err, GridError::Io { .. }));
    }

    #[test]
    fn test_non_standard_gpd_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corner.gpd");
        let source = GridName::M36km
            .bundled_source()
            .replace("Grid Map Origin Column:         -0.5", "Grid Map Origin Column: 0.0");
        std::fs::write(&path, source).unwrap();
        let err = GridStore::definition_from_file(GridName::M36km, &path).unwrap_err();
        assert!(matches!(err, GridError::NonStandardGpd(_)));
    }
}
