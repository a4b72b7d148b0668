//! Append-only NetCDF-4 writer.
//!
//! Output is produced one top-level group at a time, or one variable at a
//! time inside a streamed group, so a caller can release each array after it
//! has been written. Dimensions are declared in the group that uses them.

use indexmap::IndexMap;
use std::collections::HashMap;
use netcdf::{AttributeValue, Extents, NcTypeDescriptor};
use num_traits::NumCast;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::error::{TreeError, TreeResult};
use crate::model::{
    ArrayData, AttrValue, Attributes, DataTree, Dimension, Group, Scalar, Variable,
};
use crate::reader::silence_hdf5_errors;

/// Attribute names that are written from [`crate::Encoding`] instead.
const RESERVED_ATTRIBUTES: [&str; 2] = ["_FillValue", "coordinates"];

/// Single writer for one output file.
pub struct TreeWriter {
    file: netcdf::FileMut,
    path: PathBuf,
    /// Dimensions declared so far in each streamed group.
    streamed: HashMap<String, IndexMap<String, usize>>,
}

impl TreeWriter {
    /// Create (or truncate) a NetCDF-4 file.
    pub fn create(path: impl AsRef<Path>) -> TreeResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref().to_path_buf();
        let file = netcdf::create(&path).map_err(|e| TreeError::open(&path, e))?;
        Ok(Self {
            file,
            path,
            streamed: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write attributes on the root group.
    pub fn write_root_attributes(&mut self, attrs: &Attributes) -> TreeResult<()> {
        for (name, value) in attrs {
            self.file.add_attribute(name, to_attribute_value(value))?;
        }
        Ok(())
    }

    /// Write variables that live directly in the root group.
    pub fn write_root_variables<'a>(
        &mut self,
        variables: impl IntoIterator<Item = &'a Variable>,
    ) -> TreeResult<()> {
        let mut root = self
            .file
            .root_mut()
            .ok_or_else(|| TreeError::MissingGroup("/".to_string()))?;
        let variables: Vec<&Variable> = variables.into_iter().collect();
        declare_dimensions(&mut root, "/", variables.iter().copied())?;
        for variable in variables {
            write_variable(&mut root, variable)?;
        }
        Ok(())
    }

    /// Append a complete top-level group and everything below it.
    #[instrument(skip(self, group), fields(group = %group.name))]
    pub fn append_group(&mut self, group: &Group) -> TreeResult<()> {
        let mut nc_group = self.file.add_group(&group.name)?;
        write_group(&mut nc_group, group, &format!("/{}", group.name))?;
        debug!(variables = group.variables.len(), "Appended group");
        Ok(())
    }

    /// Start a top-level group whose variables arrive one at a time.
    pub fn begin_group(&mut self, name: &str, attrs: &Attributes) -> TreeResult<()> {
        let mut nc_group = self.file.add_group(name)?;
        for (attr, value) in attrs {
            nc_group.add_attribute(attr, to_attribute_value(value))?;
        }
        self.streamed.insert(name.to_string(), IndexMap::new());
        Ok(())
    }

    /// Write one variable into a group opened with [`TreeWriter::begin_group`].
    ///
    /// Dimensions are declared on first use; later variables must use the
    /// same lengths.
    pub fn append_variable(&mut self, group: &str, variable: &Variable) -> TreeResult<()> {
        let path = format!("/{}", group);
        let declared = self
            .streamed
            .get_mut(group)
            .ok_or_else(|| TreeError::MissingGroup(path.clone()))?;
        let mut nc_group = self
            .file
            .group_mut(group)?
            .ok_or_else(|| TreeError::MissingGroup(path.clone()))?;

        let mut new_dims: Vec<&Dimension> = Vec::new();
        for dim in &variable.dims {
            if record_dimension(declared, &path, dim)? {
                new_dims.push(dim);
            }
        }
        for dim in new_dims {
            nc_group.add_dimension(&dim.name, dim.len)?;
        }
        write_variable(&mut nc_group, variable)?;
        debug!(group = %group, variable = %variable.name, "Appended variable");
        Ok(())
    }

    /// Close a streamed group. No more variables can be appended to it.
    pub fn end_group(&mut self, name: &str) -> TreeResult<()> {
        self.streamed
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| TreeError::MissingGroup(format!("/{}", name)))
    }

    /// Flush and close the file.
    pub fn finish(self) -> TreeResult<()> {
        debug!(path = %self.path.display(), "Closing output file");
        drop(self.file);
        Ok(())
    }
}

/// Write a whole tree to `path` in one call.
pub fn write_tree(path: impl AsRef<Path>, tree: &DataTree) -> TreeResult<()> {
    let mut writer = TreeWriter::create(path)?;
    writer.write_root_attributes(&tree.root.attrs)?;
    writer.write_root_variables(tree.root.variables.values())?;
    for group in tree.root.groups.values() {
        writer.append_group(group)?;
    }
    writer.finish()
}

fn write_group(nc_group: &mut netcdf::GroupMut<'_>, group: &Group, path: &str) -> TreeResult<()> {
    for (name, value) in &group.attrs {
        nc_group.add_attribute(name, to_attribute_value(value))?;
    }

    declare_dimensions(nc_group, path, group.variables.values())?;
    for variable in group.variables.values() {
        write_variable(nc_group, variable)?;
    }

    for child in group.groups.values() {
        let mut nc_child = nc_group.add_group(&child.name)?;
        write_group(&mut nc_child, child, &format!("{}/{}", path, child.name))?;
    }
    Ok(())
}

/// Declare every dimension used by `variables` in this group.
fn declare_dimensions<'a>(
    nc_group: &mut netcdf::GroupMut<'_>,
    path: &str,
    variables: impl Iterator<Item = &'a Variable>,
) -> TreeResult<()> {
    let mut dims: IndexMap<String, usize> = IndexMap::new();
    for variable in variables {
        for dim in &variable.dims {
            record_dimension(&mut dims, path, dim)?;
        }
    }
    for (name, len) in dims {
        nc_group.add_dimension(&name, len)?;
    }
    Ok(())
}

/// Note a dimension use in `dims`. True if the name was not seen before.
fn record_dimension(
    dims: &mut IndexMap<String, usize>,
    path: &str,
    dim: &Dimension,
) -> TreeResult<bool> {
    match dims.get(&dim.name) {
        Some(&len) if len != dim.len => Err(TreeError::DimensionConflict {
            group: path.to_string(),
            name: dim.name.clone(),
            first: len,
            second: dim.len,
        }),
        Some(_) => Ok(false),
        None => {
            dims.insert(dim.name.clone(), dim.len);
            Ok(true)
        }
    }
}

fn write_variable(nc_group: &mut netcdf::GroupMut<'_>, variable: &Variable) -> TreeResult<()> {
    match &variable.data {
        ArrayData::I8(values) => write_numeric(nc_group, variable, values),
        ArrayData::U8(values) => write_numeric(nc_group, variable, values),
        ArrayData::I16(values) => write_numeric(nc_group, variable, values),
        ArrayData::U16(values) => write_numeric(nc_group, variable, values),
        ArrayData::I32(values) => write_numeric(nc_group, variable, values),
        ArrayData::U32(values) => write_numeric(nc_group, variable, values),
        ArrayData::I64(values) => write_numeric(nc_group, variable, values),
        ArrayData::U64(values) => write_numeric(nc_group, variable, values),
        ArrayData::F32(values) => write_numeric(nc_group, variable, values),
        ArrayData::F64(values) => write_numeric(nc_group, variable, values),
        ArrayData::Str(values) => write_strings(nc_group, variable, values),
    }
}

fn dimension_names(variable: &Variable) -> Vec<&str> {
    variable.dims.iter().map(|d| d.name.as_str()).collect()
}

fn write_numeric<T>(
    nc_group: &mut netcdf::GroupMut<'_>,
    variable: &Variable,
    values: &[T],
) -> TreeResult<()>
where
    T: NcTypeDescriptor + NumCast + Copy,
{
    let dims = dimension_names(variable);
    let mut nc_var = nc_group.add_variable::<T>(&variable.name, &dims)?;

    // Filters need a chunked layout, which scalars do not have.
    if let Some(compression) = variable.encoding.compression {
        if variable.rank() > 0 {
            nc_var.set_compression(compression.level, compression.shuffle)?;
        }
    }
    if let Some(fill) = variable
        .encoding
        .fill_value
        .as_ref()
        .and_then(Scalar::to_primitive::<T>)
    {
        nc_var.set_fill_value(fill)?;
    }

    write_variable_attributes(&mut nc_var, variable)?;
    nc_var.put_values(values, ..)?;
    Ok(())
}

fn write_strings(
    nc_group: &mut netcdf::GroupMut<'_>,
    variable: &Variable,
    values: &[String],
) -> TreeResult<()> {
    let dims = dimension_names(variable);
    let mut nc_var = nc_group.add_string_variable(&variable.name, &dims)?;
    write_variable_attributes(&mut nc_var, variable)?;

    match variable.shape().as_slice() {
        [] => {
            if let Some(value) = values.first() {
                nc_var.put_string(value, ..)?;
            }
        }
        [_] => {
            for (i, value) in values.iter().enumerate() {
                let extents: Extents = i.into();
                nc_var.put_string(value, extents)?;
            }
        }
        [_, columns] => {
            let columns = *columns;
            for (i, value) in values.iter().enumerate() {
                let (row, col) = (i / columns, i % columns);
                let extents: Extents = [row..row + 1, col..col + 1].into();
                nc_var.put_string(value, extents)?;
            }
        }
        _ => {
            return Err(TreeError::unsupported_type(
                &variable.name,
                "string with more than two dimensions",
            ))
        }
    }
    Ok(())
}

fn write_variable_attributes(
    nc_var: &mut netcdf::VariableMut<'_>,
    variable: &Variable,
) -> TreeResult<()> {
    for (name, value) in &variable.attrs {
        if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
            continue;
        }
        nc_var.put_attribute(name, to_attribute_value(value))?;
    }
    if let Some(coordinates) = &variable.encoding.coordinates {
        nc_var.put_attribute("coordinates", coordinates.as_str())?;
    }
    Ok(())
}

/// Convert a tree attribute into a libnetcdf attribute value.
pub(crate) fn to_attribute_value(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::Scalar(scalar) => match scalar {
            Scalar::I8(v) => AttributeValue::Schar(*v),
            Scalar::U8(v) => AttributeValue::Uchar(*v),
            Scalar::I16(v) => AttributeValue::Short(*v),
            Scalar::U16(v) => AttributeValue::Ushort(*v),
            Scalar::I32(v) => AttributeValue::Int(*v),
            Scalar::U32(v) => AttributeValue::Uint(*v),
            Scalar::I64(v) => AttributeValue::Longlong(*v),
            Scalar::U64(v) => AttributeValue::Ulonglong(*v),
            Scalar::F32(v) => AttributeValue::Float(*v),
            Scalar::F64(v) => AttributeValue::Double(*v),
            Scalar::Str(v) => AttributeValue::Str(v.clone()),
        },
        AttrValue::Array(array) => match array {
            ArrayData::I8(v) => AttributeValue::Schars(v.clone()),
            ArrayData::U8(v) => AttributeValue::Uchars(v.clone()),
            ArrayData::I16(v) => AttributeValue::Shorts(v.clone()),
            ArrayData::U16(v) => AttributeValue::Ushorts(v.clone()),
            ArrayData::I32(v) => AttributeValue::Ints(v.clone()),
            ArrayData::U32(v) => AttributeValue::Uints(v.clone()),
            ArrayData::I64(v) => AttributeValue::Longlongs(v.clone()),
            ArrayData::U64(v) => AttributeValue::Ulonglongs(v.clone()),
            ArrayData::F32(v) => AttributeValue::Floats(v.clone()),
            ArrayData::F64(v) => AttributeValue::Doubles(v.clone()),
            ArrayData::Str(v) => AttributeValue::Strs(v.clone()),
        },
    }
}
