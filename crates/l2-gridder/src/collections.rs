//! Collection registry.
//!
//! SMAP L2 files are not fully self describing: every griddable variable is
//! tied to a row and a column index variable, but where those live and which
//! grid they index differs per product and per group. This registry holds
//! that table, keyed by collection short name and then by group name.
//!
//! The default table is `collections.yaml`, compiled into the crate. An
//! alternate table can be loaded from any YAML file with the same layout.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use ease_grid::{EpsgCode, GridName, GridStore};
use netcdf_tree::GroupPath;

use crate::error::{GridderError, Result};

const BUILTIN_YAML: &str = include_str!("../collections.yaml");

static BUILTIN: Lazy<std::result::Result<CollectionRegistry, String>> =
    Lazy::new(|| CollectionRegistry::from_yaml_str(BUILTIN_YAML).map_err(|e| e.to_string()));

/// Placement of one data group on its target grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionGroupConfig {
    /// Row index variable, relative to the file root.
    pub row_path: GroupPath,
    /// Column index variable, relative to the file root.
    pub col_path: GroupPath,
    pub grid_name: GridName,
    pub crs_id: EpsgCode,
    /// Variables that are dropped before gridding.
    pub excluded_variables: BTreeSet<String>,
    /// (N, 3) variables split into three 1D variables before gridding.
    pub flattened_variables: BTreeSet<String>,
}

/// Everything the registry knows about one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionConfig {
    pub short_name: String,
    /// Top-level groups copied to the output unchanged.
    pub metadata_groups: Vec<String>,
    pub data_groups: IndexMap<String, CollectionGroupConfig>,
}

/// Immutable lookup table from (short name, group) to grid placement.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRegistry {
    collections: IndexMap<String, CollectionConfig>,
}

// YAML file structures

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlRegistryFile {
    collections: IndexMap<String, YamlCollection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlCollection {
    #[serde(default = "default_metadata_groups")]
    metadata_groups: Vec<String>,
    data_groups: IndexMap<String, YamlDataGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlDataGroup {
    row: String,
    col: String,
    grid: String,
    #[serde(default)]
    excluded_science_variables: Vec<String>,
    #[serde(default)]
    flattened_variables: Vec<String>,
}

fn default_metadata_groups() -> Vec<String> {
    vec!["Metadata".to_string()]
}

impl CollectionRegistry {
    /// The registry compiled into the crate.
    pub fn builtin() -> Result<&'static CollectionRegistry> {
        BUILTIN
            .as_ref()
            .map_err(|msg| GridderError::Registry(msg.clone()))
    }

    /// Parse a registry, checking every grid against the bundled grid store.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_yaml_str_with_store(yaml, GridStore::bundled())
    }

    /// Parse a registry, checking every grid against `store`.
    pub fn from_yaml_str_with_store(yaml: &str, store: &GridStore) -> Result<Self> {
        let file: YamlRegistryFile =
            serde_yaml::from_str(yaml).map_err(|e| GridderError::Registry(e.to_string()))?;

        let mut collections = IndexMap::with_capacity(file.collections.len());
        for (short_name, collection) in file.collections {
            let mut data_groups = IndexMap::with_capacity(collection.data_groups.len());
            for (group_name, group) in collection.data_groups {
                let config = convert_group(&short_name, &group_name, group, store)?;
                data_groups.insert(group_name, config);
            }
            collections.insert(
                short_name.clone(),
                CollectionConfig {
                    short_name,
                    metadata_groups: collection.metadata_groups,
                    data_groups,
                },
            );
        }

        debug!(collections = collections.len(), "Loaded collection registry");
        Ok(Self { collections })
    }

    /// Load a registry from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| GridderError::io(path, e))?;
        Self::from_yaml_str(&contents)
    }

    /// Short names of every known collection.
    pub fn short_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn lookup_collection(&self, short_name: &str) -> Result<&CollectionConfig> {
        self.collections.get(short_name).ok_or_else(|| {
            GridderError::invalid_collection(format!(
                "No collection information for {}",
                short_name
            ))
        })
    }

    pub fn lookup_group(&self, short_name: &str, group: &str) -> Result<&CollectionGroupConfig> {
        self.lookup_collection(short_name)?
            .data_groups
            .get(group)
            .ok_or_else(|| {
                GridderError::invalid_collection(format!(
                    "No group named {} in {}",
                    group, short_name
                ))
            })
    }

    /// Top-level groups of the collection that hold only metadata.
    pub fn metadata_groups(&self, short_name: &str) -> Result<&[String]> {
        Ok(&self.lookup_collection(short_name)?.metadata_groups)
    }

    /// Variables of a group that are never gridded. Empty if none are configured.
    pub fn excluded_variables(&self, short_name: &str, group: &str) -> Result<&BTreeSet<String>> {
        Ok(&self.lookup_group(short_name, group)?.excluded_variables)
    }

    /// Configured flatten candidates that are actually present in the group.
    pub fn flattened_variables<'a>(
        &self,
        short_name: &str,
        group: &str,
        present: impl IntoIterator<Item = &'a str>,
    ) -> Result<BTreeSet<String>> {
        let candidates = &self.lookup_group(short_name, group)?.flattened_variables;
        Ok(present
            .into_iter()
            .filter(|name| candidates.contains(*name))
            .map(str::to_string)
            .collect())
    }
}

fn convert_group(
    short_name: &str,
    group_name: &str,
    group: YamlDataGroup,
    store: &GridStore,
) -> Result<CollectionGroupConfig> {
    let entry = store.entry(&group.grid)?;

    let row_path = GroupPath::parse(&group.row);
    let col_path = GroupPath::parse(&group.col);
    if row_path.is_root() || col_path.is_root() {
        return Err(GridderError::Registry(format!(
            "{}/{} needs both a row and a column index path",
            short_name, group_name
        )));
    }

    Ok(CollectionGroupConfig {
        row_path,
        col_path,
        grid_name: entry.name,
        crs_id: entry.epsg(),
        excluded_variables: group.excluded_science_variables.into_iter().collect(),
        flattened_variables: group.flattened_variables.into_iter().collect(),
    })
}
