//! File-level orchestration.
//!
//! ```text
//! input tree
//!     │
//!     ├─► shortName from Metadata/DatasetIdentification
//!     │
//!     ├─► root attributes + metadata groups ──────────────► sink
//!     │
//!     └─► each data group (sorted by name)
//!              │
//!              ├─► registry lookup: index paths, grid, exclusions
//!              ├─► drop excluded, split (N, 3) variables
//!              ├─► crs, x-dim, y-dim ─────────────────────► sink
//!              └─► scatter one variable ──────────────────► sink
//!                        (repeat per variable)
//! ```
//!
//! Gridded variables reach the sink one at a time and are dropped once
//! written, so at most one full-grid array is held per group.

use indexmap::IndexMap;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use ease_grid::GridStore;
use netcdf_tree::{
    read_tree, Attributes, DataTree, Group, GroupPath, Scalar, TreeError, TreeWriter, Variable,
};

use crate::collections::CollectionRegistry;
use crate::error::{GridderError, Result};
use crate::flatten::{select_flatten_candidates, split_component_variable};
use crate::scatter::{scatter_to_grid, ScatterOptions, SourceIndexArrays, TargetGrid};

/// Location of the collection short name in every SMAP L2 file.
pub const DATASET_IDENTIFICATION: &str = "Metadata/DatasetIdentification";
/// Attribute (or scalar string variable) holding the collection short name.
pub const SHORT_NAME: &str = "shortName";

/// Destination for the output tree.
///
/// Metadata groups arrive whole through `append_group`. Gridded groups are
/// opened with `begin_group`, filled by `append_variable` and closed by
/// `end_group`.
pub trait TreeSink {
    fn write_root_attributes(&mut self, attrs: &Attributes) -> Result<()>;

    fn append_group(&mut self, group: &Group) -> Result<()>;

    fn begin_group(&mut self, name: &str, attrs: &Attributes) -> Result<()>;

    fn append_variable(&mut self, group: &str, variable: &Variable) -> Result<()>;

    fn end_group(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }
}

impl TreeSink for TreeWriter {
    fn write_root_attributes(&mut self, attrs: &Attributes) -> Result<()> {
        Ok(TreeWriter::write_root_attributes(self, attrs)?)
    }

    fn append_group(&mut self, group: &Group) -> Result<()> {
        Ok(TreeWriter::append_group(self, group)?)
    }

    fn begin_group(&mut self, name: &str, attrs: &Attributes) -> Result<()> {
        Ok(TreeWriter::begin_group(self, name, attrs)?)
    }

    fn append_variable(&mut self, group: &str, variable: &Variable) -> Result<()> {
        Ok(TreeWriter::append_variable(self, group, variable)?)
    }

    fn end_group(&mut self, name: &str) -> Result<()> {
        Ok(TreeWriter::end_group(self, name)?)
    }
}

/// In-memory sink, used to inspect output without touching the disk.
impl TreeSink for DataTree {
    fn write_root_attributes(&mut self, attrs: &Attributes) -> Result<()> {
        self.root
            .attrs
            .extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    fn append_group(&mut self, group: &Group) -> Result<()> {
        self.root.add_group(group.clone());
        Ok(())
    }

    fn begin_group(&mut self, name: &str, attrs: &Attributes) -> Result<()> {
        let mut group = Group::new(name);
        group.attrs = attrs.clone();
        self.root.add_group(group);
        Ok(())
    }

    fn append_variable(&mut self, group: &str, variable: &Variable) -> Result<()> {
        self.root
            .groups
            .get_mut(group)
            .ok_or_else(|| TreeError::MissingGroup(format!("/{}", group)))?
            .add_variable(variable.clone());
        Ok(())
    }
}

/// Regrids SMAP L2 trees with a given registry and grid store.
#[derive(Debug, Clone)]
pub struct Gridder<'a> {
    registry: &'a CollectionRegistry,
    store: &'a GridStore,
    options: ScatterOptions,
}

impl Gridder<'static> {
    /// Gridder backed by the compiled-in registry and grids.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(CollectionRegistry::builtin()?, GridStore::bundled()))
    }
}

impl<'a> Gridder<'a> {
    pub fn new(registry: &'a CollectionRegistry, store: &'a GridStore) -> Self {
        Self {
            registry,
            store,
            options: ScatterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScatterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &CollectionRegistry {
        self.registry
    }

    /// Regrid `input` into `sink`.
    #[instrument(skip(self, input, sink))]
    pub fn process_input<S: TreeSink>(&self, input: &DataTree, sink: &mut S) -> Result<()> {
        let short_name = collection_short_name(input)?;
        let collection = self.registry.lookup_collection(&short_name)?;
        info!(short_name = %short_name, "Processing collection");

        sink.write_root_attributes(&input.root.attrs)?;

        for name in &collection.metadata_groups {
            match input.root.group(name) {
                Some(group) => {
                    sink.append_group(group)?;
                    debug!(group = %name, "Copied metadata group");
                }
                None => warn!(group = %name, "Metadata group not present in input"),
            }
        }

        let mut data_groups: Vec<&Group> = input
            .root
            .groups
            .values()
            .filter(|g| !collection.metadata_groups.contains(&g.name))
            .collect();
        data_groups.sort_by(|a, b| a.name.cmp(&b.name));

        for group in data_groups {
            self.grid_group(input, &short_name, group, sink)?;
        }
        Ok(())
    }

    /// Read `input`, regrid it and write `output`.
    ///
    /// A partially written output file is removed before the error is
    /// returned.
    #[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
    pub fn transform_file(&self, input: &Path, output: &Path) -> Result<()> {
        let tree = read_tree(input)?;
        let mut writer = TreeWriter::create(output)?;

        let result = self
            .process_input(&tree, &mut writer)
            .and_then(|_| writer.finish().map_err(GridderError::from));
        if let Err(e) = result {
            if let Err(remove_err) = std::fs::remove_file(output) {
                warn!(error = %remove_err, "Failed to remove partial output");
            }
            return Err(e);
        }

        info!("Wrote gridded output");
        Ok(())
    }

    fn grid_group<S: TreeSink>(
        &self,
        input: &DataTree,
        short_name: &str,
        group: &Group,
        sink: &mut S,
    ) -> Result<()> {
        let config = self.registry.lookup_group(short_name, &group.name)?;
        let grid = TargetGrid::from_store(self.store, config.grid_name)?;

        let rows = input
            .root
            .find_variable(&config.row_path)
            .ok_or_else(|| GridderError::missing_variable(&config.row_path))?;
        let cols = input
            .root
            .find_variable(&config.col_path)
            .ok_or_else(|| GridderError::missing_variable(&config.col_path))?;
        let indices = SourceIndexArrays::from_variables(rows, cols)?;

        let mut variables: IndexMap<String, Variable> = group
            .variables
            .iter()
            .filter(|(name, _)| !config.excluded_variables.contains(name.as_str()))
            .map(|(name, variable)| (name.clone(), variable.clone()))
            .collect();

        let (_, flatten) = select_flatten_candidates(
            self.registry,
            short_name,
            &group.name,
            variables.keys().map(String::as_str),
        )?;
        for name in &flatten {
            split_component_variable(&mut variables, name)?;
        }
        if !group.groups.is_empty() {
            warn!(
                group = %group.name,
                children = group.groups.len(),
                "Nested groups in a data group are not gridded"
            );
        }

        sink.begin_group(&group.name, &group.attrs)?;
        for variable in [grid.crs_variable(), grid.x_variable(), grid.y_variable()] {
            sink.append_variable(&group.name, &variable)?;
        }
        for variable in variables.values() {
            let gridded = scatter_to_grid(variable, &indices, &grid, &self.options)?;
            sink.append_variable(&group.name, &gridded)?;
        }
        sink.end_group(&group.name)?;

        info!(
            group = %group.name,
            grid = %grid.name,
            variables = variables.len(),
            excluded = group.variables.len() + 2 * flatten.len() - variables.len(),
            "Gridded group"
        );
        Ok(())
    }
}

/// Collection short name declared in the input metadata.
///
/// SMAP files carry it as an attribute of `Metadata/DatasetIdentification`;
/// some conversions store it as a scalar string variable of the same group.
pub fn collection_short_name(input: &DataTree) -> Result<String> {
    let path = GroupPath::parse(DATASET_IDENTIFICATION);
    let missing = || GridderError::MissingMetadata(format!("{}/{}", path, SHORT_NAME));

    let group = input.root.find_group(&path).ok_or_else(missing)?;
    if let Some(name) = group.attrs.get(SHORT_NAME).and_then(|v| v.as_str()) {
        return Ok(name.trim().to_string());
    }
    match group.variable(SHORT_NAME).and_then(|v| v.data.get(0)) {
        Some(Scalar::Str(name)) => Ok(name.trim().to_string()),
        _ => Err(missing()),
    }
}

/// Regrid `input` into `sink` with the compiled-in registry and grids.
pub fn process_input<S: TreeSink>(input: &DataTree, sink: &mut S) -> Result<()> {
    Gridder::builtin()?.process_input(input, sink)
}

/// Regrid the file at `input` into a new file at `output`.
pub fn transform_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    Gridder::builtin()?.transform_file(input.as_ref(), output.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcdf_tree::AttrValue;
    use test_utils::{diagonal_indices, float_variable, groups, index_group, short_names, smap_input};

    /// Records every sink call and the largest array handed over at once.
    #[derive(Default)]
    struct CountingSink {
        calls: Vec<String>,
        largest: usize,
    }

    impl TreeSink for CountingSink {
        fn write_root_attributes(&mut self, _attrs: &Attributes) -> Result<()> {
            self.calls.push("root".to_string());
            Ok(())
        }

        fn append_group(&mut self, group: &Group) -> Result<()> {
            self.calls.push(format!("group {}", group.name));
            Ok(())
        }

        fn begin_group(&mut self, name: &str, _attrs: &Attributes) -> Result<()> {
            self.calls.push(format!("begin {}", name));
            Ok(())
        }

        fn append_variable(&mut self, group: &str, variable: &Variable) -> Result<()> {
            self.calls.push(format!("{}/{}", group, variable.name));
            self.largest = self.largest.max(variable.data.len());
            Ok(())
        }

        fn end_group(&mut self, name: &str) -> Result<()> {
            self.calls.push(format!("end {}", name));
            Ok(())
        }
    }

    fn identification(group: Group) -> DataTree {
        let mut tree = DataTree::new();
        tree.root
            .add_group(Group::new("Metadata").with_group(group));
        tree
    }

    #[test]
    fn test_short_name_from_attribute() {
        let tree = identification(
            Group::new("DatasetIdentification").with_attr("shortName", "SPL2SMP_E"),
        );
        assert_eq!(collection_short_name(&tree).unwrap(), "SPL2SMP_E");
    }

    #[test]
    fn test_short_name_from_variable() {
        let mut variable = Variable::from_vec("shortName", "one", vec!["SPL2SMAP"]);
        variable.dims.clear();
        let tree = identification(Group::new("DatasetIdentification").with_variable(variable));
        assert_eq!(collection_short_name(&tree).unwrap(), "SPL2SMAP");
    }

    #[test]
    fn test_short_name_missing() {
        let tree = identification(Group::new("DatasetIdentification"));
        assert!(matches!(
            collection_short_name(&tree),
            Err(GridderError::MissingMetadata(_))
        ));
        assert!(matches!(
            collection_short_name(&DataTree::new()),
            Err(GridderError::MissingMetadata(_))
        ));
    }

    #[test]
    fn test_unknown_collection_aborts() {
        let tree = identification(
            Group::new("DatasetIdentification").with_attr("shortName", "SPL3SMP"),
        );
        let mut sink = DataTree::new();
        let err = process_input(&tree, &mut sink).unwrap_err();
        assert_eq!(err.to_string(), "No collection information for SPL3SMP");
    }

    #[test]
    fn test_memory_sink_collects_groups() {
        let mut sink = DataTree::new();
        let mut attrs = Attributes::new();
        attrs.insert("title".to_string(), AttrValue::from("SMAP"));
        TreeSink::write_root_attributes(&mut sink, &attrs).unwrap();
        TreeSink::append_group(&mut sink, &Group::new("Metadata")).unwrap();

        assert_eq!(sink.root.attrs["title"].as_str(), Some("SMAP"));
        assert_eq!(sink.top_level_groups().collect::<Vec<_>>(), ["Metadata"]);
    }

    #[test]
    fn test_variables_reach_sink_one_at_a_time() {
        let (rows, cols) = diagonal_indices(3);
        let group = index_group(groups::SOIL_MOISTURE, rows, cols, "")
            .with_variable(float_variable("soil_moisture", vec![0.1, 0.2, 0.3]))
            .with_variable(float_variable("vegetation_opacity", vec![0.4, 0.5, 0.6]));
        let input = smap_input(short_names::SPL2SMP, vec![group]);

        let mut sink = CountingSink::default();
        process_input(&input, &mut sink).unwrap();

        let data = |name: &str| format!("Soil_Moisture_Retrieval_Data/{}", name);
        let expected = vec![
            "root".to_string(),
            "group Metadata".to_string(),
            "begin Soil_Moisture_Retrieval_Data".to_string(),
            data("crs"),
            data("x-dim"),
            data("y-dim"),
            data("EASE_row_index"),
            data("EASE_column_index"),
            data("soil_moisture"),
            data("vegetation_opacity"),
            "end Soil_Moisture_Retrieval_Data".to_string(),
        ];
        assert_eq!(sink.calls, expected);
        // One M36km raster per call.
        assert_eq!(sink.largest, 406 * 964);
    }
}
