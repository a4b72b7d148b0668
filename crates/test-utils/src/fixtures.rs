//! Synthetic SMAP L2 input trees.
//!
//! The trees mirror the layout of real SMAP L2 granules: a `Metadata` group
//! holding `DatasetIdentification.shortName`, and data groups with
//! `EASE_row_index`/`EASE_column_index` beside the science variables.

use netcdf_tree::{
    write_tree, ArrayData, DataTree, Dimension, Encoding, Group, Scalar, Variable,
};
use std::path::{Path, PathBuf};

use crate::generators::{
    create_landcover_samples, create_samples_with_nans, create_time_strings, diagonal_indices,
};

/// Collection short names.
pub mod short_names {
    pub const SPL2SMP_E: &str = "SPL2SMP_E";
    pub const SPL2SMP: &str = "SPL2SMP";
    pub const SPL2SMAP: &str = "SPL2SMAP";
    pub const SPL2SMA: &str = "SPL2SMA";
}

/// Group names used by the SMAP L2 products.
pub mod groups {
    pub const METADATA: &str = "Metadata";
    pub const DATASET_IDENTIFICATION: &str = "DatasetIdentification";
    pub const SOIL_MOISTURE: &str = "Soil_Moisture_Retrieval_Data";
    pub const SOIL_MOISTURE_POLAR: &str = "Soil_Moisture_Retrieval_Data_Polar";
    pub const SOIL_MOISTURE_3KM: &str = "Soil_Moisture_Retrieval_Data_3km";
}

/// Fill value SMAP uses for unsigned 16-bit index variables.
pub const INDEX_FILL: u16 = 65534;

/// Fill value SMAP uses for float variables.
pub const FLOAT_FILL: f32 = -9999.0;

/// Swath dimension name in HDF5 files without dimension scales.
pub const SWATH_DIM: &str = "phony_dim_0";

/// A `Metadata` group declaring `short_name`.
pub fn metadata_group(short_name: &str) -> Group {
    Group::new(groups::METADATA)
        .with_attr("Conventions", "CF-1.6")
        .with_group(
            Group::new(groups::DATASET_IDENTIFICATION)
                .with_attr("shortName", short_name)
                .with_attr("VersionID", "006"),
        )
}

/// A 1D variable along the swath dimension.
pub fn swath_variable(name: &str, data: impl Into<ArrayData>) -> Variable {
    Variable::from_vec(name, SWATH_DIM, data)
}

/// A float32 swath variable with SMAP's -9999 fill value.
pub fn float_variable(name: &str, data: Vec<f32>) -> Variable {
    swath_variable(name, data).with_encoding(Encoding {
        fill_value: Some(Scalar::F32(FLOAT_FILL)),
        ..Default::default()
    })
}

/// A data group holding only the row and column index variables.
///
/// `suffix` is appended to the index variable names, e.g. `_3km`.
pub fn index_group(name: &str, rows: Vec<u16>, cols: Vec<u16>, suffix: &str) -> Group {
    let index = |var_name: String, long_name: &str, data: Vec<u16>| {
        swath_variable(&var_name, data)
            .with_attr("long_name", long_name)
            .with_encoding(Encoding {
                fill_value: Some(Scalar::U16(INDEX_FILL)),
                ..Default::default()
            })
    };
    Group::new(name)
        .with_variable(index(
            format!("EASE_row_index{}", suffix),
            "The row index of the EASE grid cell",
            rows,
        ))
        .with_variable(index(
            format!("EASE_column_index{}", suffix),
            "The column index of the EASE grid cell",
            cols,
        ))
}

/// A full SMAP L2 tree: metadata plus the given data groups.
pub fn smap_input(short_name: &str, data_groups: Vec<Group>) -> DataTree {
    let mut tree = DataTree::new();
    tree.root
        .attrs
        .insert("history".to_string(), "synthetic SMAP L2 granule".into());
    tree.root.add_group(metadata_group(short_name));
    for group in data_groups {
        tree.root.add_group(group);
    }
    tree
}

/// A data group with five samples on the diagonal.
///
/// Holds `albedo` (NaN at sample 4), `landcover_class` (5, 3) and
/// `tb_time_utc` (empty at sample 4), plus the index variables.
pub fn diagonal_group(name: &str) -> Group {
    let (rows, cols) = diagonal_indices(5);
    let landcover = Variable::new(
        "landcover_class",
        vec![Dimension::new(SWATH_DIM, 5), Dimension::new("phony_dim_1", 3)],
        ArrayData::U8(create_landcover_samples(5)),
    )
    .expect("landcover shape")
    .with_attr("long_name", "Land cover class");

    index_group(name, rows, cols, "")
        .with_variable(
            float_variable("albedo", create_samples_with_nans(5, &[4]))
                .with_attr("units", "1")
                .with_attr("valid_min", Scalar::F32(0.0))
                .with_attr("valid_max", Scalar::F32(1.0)),
        )
        .with_variable(landcover)
        .with_variable(swath_variable("tb_time_utc", create_time_strings(5, &[4])))
}

/// SPL2SMP_E input with a global and a polar group on the diagonal.
pub fn spl2smp_e_input() -> DataTree {
    smap_input(
        short_names::SPL2SMP_E,
        vec![
            diagonal_group(groups::SOIL_MOISTURE),
            diagonal_group(groups::SOIL_MOISTURE_POLAR),
        ],
    )
}

/// Write `tree` as `name` inside `dir` and return the path.
pub fn write_input(tree: &DataTree, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    write_tree(&path, tree).expect("Failed to write synthetic input");
    path
}
