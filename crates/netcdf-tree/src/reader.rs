//! Load a NetCDF-4 file into a [`DataTree`].
//!
//! The whole file is read into memory. `_FillValue` and `coordinates` are
//! moved from the attribute map into the variable [`Encoding`]; every other
//! attribute is kept as-is.

use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::{AttributeValue, Extents};
use std::path::Path;
use std::sync::Once;
use tracing::{debug, warn};

use crate::error::{TreeError, TreeResult};
use crate::model::{
    ArrayData, AttrValue, Attributes, DataTree, Dimension, Encoding, Group, Scalar, Variable,
};

/// Silence HDF5's automatic error printing to stderr.
///
/// libhdf5 reports handled errors (for example probing for an attribute that
/// does not exist) as `HDF5-DIAG` noise on stderr. This disables the handler
/// once per process; call it before the first NetCDF access.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 accepts null handlers to disable printing.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Read a complete NetCDF-4/HDF5 file.
pub fn read_tree(path: impl AsRef<Path>) -> TreeResult<DataTree> {
    silence_hdf5_errors();

    let path = path.as_ref();
    let file = netcdf::open(path).map_err(|e| TreeError::open(path, e))?;

    let mut root = Group::new("");
    root.attrs = read_attributes(file.attributes());
    for var in file.variables() {
        if let Some(variable) = read_variable(&var)? {
            root.add_variable(variable);
        }
    }
    for group in file.groups()? {
        root.add_group(read_group(&group)?);
    }

    debug!(
        path = %path.display(),
        groups = root.groups.len(),
        variables = root.variables.len(),
        "Read NetCDF tree"
    );
    Ok(DataTree { root })
}

fn read_group(nc_group: &netcdf::Group<'_>) -> TreeResult<Group> {
    let mut group = Group::new(nc_group.name());
    group.attrs = read_attributes(nc_group.attributes());

    for var in nc_group.variables() {
        if let Some(variable) = read_variable(&var)? {
            group.add_variable(variable);
        }
    }
    for child in nc_group.groups() {
        group.add_group(read_group(&child)?);
    }
    Ok(group)
}

fn read_attributes<'a>(attributes: impl Iterator<Item = netcdf::Attribute<'a>>) -> Attributes {
    let mut attrs = Attributes::new();
    for attr in attributes {
        let name = attr.name().to_string();
        match attr.value() {
            Ok(value) => {
                attrs.insert(name, convert_attribute(value));
            }
            Err(e) => warn!(attribute = %name, error = %e, "Skipping unreadable attribute"),
        }
    }
    attrs
}

/// Convert a libnetcdf attribute value into the tree model.
#[allow(unreachable_patterns)]
pub(crate) fn convert_attribute(value: AttributeValue) -> AttrValue {
    match value {
        AttributeValue::Schar(v) => Scalar::I8(v).into(),
        AttributeValue::Uchar(v) => Scalar::U8(v).into(),
        AttributeValue::Short(v) => Scalar::I16(v).into(),
        AttributeValue::Ushort(v) => Scalar::U16(v).into(),
        AttributeValue::Int(v) => Scalar::I32(v).into(),
        AttributeValue::Uint(v) => Scalar::U32(v).into(),
        AttributeValue::Longlong(v) => Scalar::I64(v).into(),
        AttributeValue::Ulonglong(v) => Scalar::U64(v).into(),
        AttributeValue::Float(v) => Scalar::F32(v).into(),
        AttributeValue::Double(v) => Scalar::F64(v).into(),
        AttributeValue::Str(v) => Scalar::Str(v).into(),
        AttributeValue::Schars(v) => ArrayData::I8(v).into(),
        AttributeValue::Uchars(v) => ArrayData::U8(v).into(),
        AttributeValue::Shorts(v) => ArrayData::I16(v).into(),
        AttributeValue::Ushorts(v) => ArrayData::U16(v).into(),
        AttributeValue::Ints(v) => ArrayData::I32(v).into(),
        AttributeValue::Uints(v) => ArrayData::U32(v).into(),
        AttributeValue::Longlongs(v) => ArrayData::I64(v).into(),
        AttributeValue::Ulonglongs(v) => ArrayData::U64(v).into(),
        AttributeValue::Floats(v) => ArrayData::F32(v).into(),
        AttributeValue::Doubles(v) => ArrayData::F64(v).into(),
        AttributeValue::Strs(v) => ArrayData::Str(v).into(),
        other => Scalar::Str(format!("{:?}", other)).into(),
    }
}

/// Read one variable, or `None` if its type cannot be represented.
fn read_variable(var: &netcdf::Variable<'_>) -> TreeResult<Option<Variable>> {
    let name = var.name();
    let dims: Vec<Dimension> = var
        .dimensions()
        .iter()
        .map(|d| Dimension::new(d.name(), d.len()))
        .collect();

    let data = match var.vartype() {
        NcVariableType::Int(IntType::I8) => ArrayData::I8(var.get_values::<i8, _>(..)?),
        NcVariableType::Int(IntType::U8) => ArrayData::U8(var.get_values::<u8, _>(..)?),
        NcVariableType::Int(IntType::I16) => ArrayData::I16(var.get_values::<i16, _>(..)?),
        NcVariableType::Int(IntType::U16) => ArrayData::U16(var.get_values::<u16, _>(..)?),
        NcVariableType::Int(IntType::I32) => ArrayData::I32(var.get_values::<i32, _>(..)?),
        NcVariableType::Int(IntType::U32) => ArrayData::U32(var.get_values::<u32, _>(..)?),
        NcVariableType::Int(IntType::I64) => ArrayData::I64(var.get_values::<i64, _>(..)?),
        NcVariableType::Int(IntType::U64) => ArrayData::U64(var.get_values::<u64, _>(..)?),
        NcVariableType::Float(FloatType::F32) => ArrayData::F32(var.get_values::<f32, _>(..)?),
        NcVariableType::Float(FloatType::F64) => ArrayData::F64(var.get_values::<f64, _>(..)?),
        NcVariableType::String => match read_strings(var, &dims)? {
            Some(values) => ArrayData::Str(values),
            None => return Ok(None),
        },
        other => {
            warn!(variable = %name, dtype = ?other, "Skipping variable with unsupported type");
            return Ok(None);
        }
    };

    let mut attrs = read_attributes(var.attributes());
    let mut encoding = Encoding {
        dtype: Some(data.dtype()),
        ..Default::default()
    };
    if let Some(AttrValue::Scalar(fill)) = attrs.shift_remove("_FillValue") {
        encoding.fill_value = fill.cast(data.dtype()).or(Some(fill));
    }
    if let Some(AttrValue::Scalar(Scalar::Str(coordinates))) = attrs.shift_remove("coordinates") {
        encoding.coordinates = Some(coordinates);
    }

    let mut variable = Variable::new(name, dims, data)?;
    variable.attrs = attrs;
    variable.encoding = encoding;
    Ok(Some(variable))
}

fn read_strings(var: &netcdf::Variable<'_>, dims: &[Dimension]) -> TreeResult<Option<Vec<String>>> {
    match dims {
        [] => Ok(Some(vec![var.get_string(..)?])),
        [dim] => {
            let mut values = Vec::with_capacity(dim.len);
            for i in 0..dim.len {
                let extents: Extents = i.into();
                values.push(var.get_string(extents)?);
            }
            Ok(Some(values))
        }
        [rows, cols] => {
            let mut values = Vec::with_capacity(rows.len * cols.len);
            for row in 0..rows.len {
                for col in 0..cols.len {
                    let extents: Extents = [row..row + 1, col..col + 1].into();
                    values.push(var.get_string(extents)?);
                }
            }
            Ok(Some(values))
        }
        _ => {
            warn!(
                variable = %var.name(),
                rank = dims.len(),
                "Skipping string variable with more than two dimensions"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_scalar_attributes() {
        assert_eq!(
            convert_attribute(AttributeValue::Float(-9999.0)),
            AttrValue::Scalar(Scalar::F32(-9999.0))
        );
        assert_eq!(
            convert_attribute(AttributeValue::Str("K".to_string())).as_str(),
            Some("K")
        );
    }

    #[test]
    fn test_convert_array_attributes() {
        assert_eq!(
            convert_attribute(AttributeValue::Shorts(vec![1, 2])),
            AttrValue::Array(ArrayData::I16(vec![1, 2]))
        );
        assert_eq!(
            convert_attribute(AttributeValue::Strs(vec!["a".into(), "b".into()])),
            AttrValue::Array(ArrayData::Str(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_tree("/nonexistent/input.h5").unwrap_err();
        assert!(matches!(err, TreeError::Open { .. }));
    }
}
