//! Split (N, 3) variables into three 1D variables before gridding.
//!
//! Variables such as `landcover_class` store three components per sample.
//! The scatter only maps 1D samples, so each component becomes its own
//! variable `name_1`, `name_2`, `name_3`.

use indexmap::IndexMap;
use netcdf_tree::Variable;

use crate::collections::CollectionRegistry;
use crate::error::{GridderError, Result};

/// Number of components in a flattened variable.
pub const COMPONENTS: usize = 3;

/// Replace `variables[name]` with its three column variables.
///
/// Each component keeps the first dimension, the attributes and the encoding
/// of the source. Fails unless the source has shape (N, 3).
pub fn split_component_variable(
    variables: &mut IndexMap<String, Variable>,
    name: &str,
) -> Result<()> {
    let source = variables
        .get(name)
        .ok_or_else(|| GridderError::missing_variable(name))?;
    let shape = source.shape();
    if shape.len() != 2 || shape[1] != COMPONENTS {
        return Err(GridderError::invalid_shape(name, shape));
    }

    let components: Vec<Variable> = (0..COMPONENTS)
        .map(|column| Variable {
            name: format!("{}_{}", name, column + 1),
            dims: vec![source.dims[0].clone()],
            data: source.data.column(COMPONENTS, column),
            attrs: source.attrs.clone(),
            encoding: source.encoding.clone(),
        })
        .collect();

    variables.shift_remove(name);
    for component in components {
        variables.insert(component.name.clone(), component);
    }
    Ok(())
}

/// Partition a group's variable names into (normal, flatten) sets.
///
/// Only names present in `names` can appear in either output, and the
/// input order is kept.
pub fn select_flatten_candidates<'a>(
    registry: &CollectionRegistry,
    short_name: &str,
    group: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(Vec<String>, Vec<String>)> {
    let names: Vec<&str> = names.into_iter().collect();
    let flatten = registry.flattened_variables(short_name, group, names.iter().copied())?;

    let (flattened, normal): (Vec<&str>, Vec<&str>) =
        names.into_iter().partition(|name| flatten.contains(*name));
    Ok((
        normal.into_iter().map(str::to_string).collect(),
        flattened.into_iter().map(str::to_string).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcdf_tree::{ArrayData, Dimension, Encoding, Scalar};

    fn landcover() -> Variable {
        Variable::new(
            "landcover_class",
            vec![Dimension::new("phony_dim_0", 2), Dimension::new("phony_dim_1", 3)],
            ArrayData::U8(vec![10, 11, 12, 20, 21, 22]),
        )
        .unwrap()
        .with_attr("long_name", "Land cover class")
        .with_encoding(Encoding {
            fill_value: Some(Scalar::U8(254)),
            ..Default::default()
        })
    }

    fn group_variables() -> IndexMap<String, Variable> {
        let mut variables = IndexMap::new();
        variables.insert(
            "albedo".to_string(),
            Variable::from_vec("albedo", "phony_dim_0", vec![0.1_f32, 0.2]),
        );
        variables.insert("landcover_class".to_string(), landcover());
        variables
    }

    #[test]
    fn test_split_columns() {
        let mut variables = group_variables();
        split_component_variable(&mut variables, "landcover_class").unwrap();

        assert!(!variables.contains_key("landcover_class"));
        let names: Vec<&str> = variables.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            ["albedo", "landcover_class_1", "landcover_class_2", "landcover_class_3"]
        );

        assert_eq!(variables["landcover_class_1"].data, ArrayData::U8(vec![10, 20]));
        assert_eq!(variables["landcover_class_2"].data, ArrayData::U8(vec![11, 21]));
        assert_eq!(variables["landcover_class_3"].data, ArrayData::U8(vec![12, 22]));

        let first = &variables["landcover_class_1"];
        assert_eq!(first.dims, [Dimension::new("phony_dim_0", 2)]);
        assert_eq!(first.attrs["long_name"].as_str(), Some("Land cover class"));
        assert_eq!(first.encoding.fill_value, Some(Scalar::U8(254)));
    }

    #[test]
    fn test_split_rejects_wrong_shape() {
        let mut variables = group_variables();
        let err = split_component_variable(&mut variables, "albedo").unwrap_err();
        assert!(matches!(err, GridderError::InvalidVariableShape { ref shape, .. } if shape == &[2]));
        assert!(variables.contains_key("albedo"));

        let mut variables = IndexMap::new();
        variables.insert(
            "pairs".to_string(),
            Variable::new(
                "pairs",
                vec![Dimension::new("n", 3), Dimension::new("m", 2)],
                ArrayData::F32(vec![0.0; 6]),
            )
            .unwrap(),
        );
        let err = split_component_variable(&mut variables, "pairs").unwrap_err();
        assert!(matches!(err, GridderError::InvalidVariableShape { .. }));
    }

    #[test]
    fn test_split_missing_variable() {
        let mut variables = group_variables();
        let err = split_component_variable(&mut variables, "nope").unwrap_err();
        assert!(matches!(err, GridderError::MissingVariable { .. }));
    }

    #[test]
    fn test_select_flatten_candidates() {
        let registry = CollectionRegistry::builtin().unwrap();
        let names = ["albedo", "landcover_class_fraction", "landcover_class", "soil_moisture"];
        let (normal, flatten) = select_flatten_candidates(
            registry,
            "SPL2SMP_E",
            "Soil_Moisture_Retrieval_Data",
            names,
        )
        .unwrap();
        assert_eq!(normal, ["albedo", "soil_moisture"]);
        assert_eq!(flatten, ["landcover_class_fraction", "landcover_class"]);

        let err = select_flatten_candidates(registry, "SPL2SMP_E", "Radar_Data", names).unwrap_err();
        assert!(matches!(err, GridderError::InvalidCollection(_)));
    }
}
