//! In-memory model of a hierarchical dataset.
//!
//! A [`DataTree`] owns a root [`Group`]; groups own their child groups and
//! [`Variable`]s in insertion order. Nodes are addressed with [`GroupPath`]
//! segments rather than slash-joined strings.

use indexmap::IndexMap;
use num_traits::NumCast;
use std::fmt;
use std::str::FromStr;

use crate::error::{TreeError, TreeResult};

/// Fill value used for floating point variables that declare none.
pub const DEFAULT_FLOAT_FILL: f64 = -9999.0;

/// Element type of an array or scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Str,
}

impl DataType {
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }

    pub fn is_integer(&self) -> bool {
        self.is_numeric() && !self.is_float()
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Str)
    }

    /// Whether deflate compression can be applied to this type.
    ///
    /// Variable-length strings cannot be filtered by HDF5.
    pub fn is_compressible(&self) -> bool {
        self.is_numeric()
    }

    /// Fill value for a variable of this type that declares none.
    ///
    /// Floats use -9999.0, integers their maximum value, strings have none.
    pub fn default_fill(&self) -> Option<Scalar> {
        match self {
            DataType::I8 => Some(Scalar::I8(i8::MAX)),
            DataType::U8 => Some(Scalar::U8(u8::MAX)),
            DataType::I16 => Some(Scalar::I16(i16::MAX)),
            DataType::U16 => Some(Scalar::U16(u16::MAX)),
            DataType::I32 => Some(Scalar::I32(i32::MAX)),
            DataType::U32 => Some(Scalar::U32(u32::MAX)),
            DataType::I64 => Some(Scalar::I64(i64::MAX)),
            DataType::U64 => Some(Scalar::U64(u64::MAX)),
            DataType::F32 => Some(Scalar::F32(DEFAULT_FLOAT_FILL as f32)),
            DataType::F64 => Some(Scalar::F64(DEFAULT_FLOAT_FILL)),
            DataType::Str => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::I8 => "int8",
            DataType::U8 => "uint8",
            DataType::I16 => "int16",
            DataType::U16 => "uint16",
            DataType::I32 => "int32",
            DataType::U32 => "uint32",
            DataType::I64 => "int64",
            DataType::U64 => "uint64",
            DataType::F32 => "float32",
            DataType::F64 => "float64",
            DataType::Str => "string",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
}

/// Dispatch on every numeric variant of [`Scalar`], binding the inner value.
macro_rules! scalar_numeric {
    ($scalar:expr, $v:ident => $numeric:expr, $s:ident => $text:expr) => {
        match $scalar {
            Scalar::I8($v) => $numeric,
            Scalar::U8($v) => $numeric,
            Scalar::I16($v) => $numeric,
            Scalar::U16($v) => $numeric,
            Scalar::I32($v) => $numeric,
            Scalar::U32($v) => $numeric,
            Scalar::I64($v) => $numeric,
            Scalar::U64($v) => $numeric,
            Scalar::F32($v) => $numeric,
            Scalar::F64($v) => $numeric,
            Scalar::Str($s) => $text,
        }
    };
}

fn cast_to<T: NumCast + Copy>(value: T, dtype: DataType) -> Option<Scalar> {
    Some(match dtype {
        DataType::I8 => Scalar::I8(NumCast::from(value)?),
        DataType::U8 => Scalar::U8(NumCast::from(value)?),
        DataType::I16 => Scalar::I16(NumCast::from(value)?),
        DataType::U16 => Scalar::U16(NumCast::from(value)?),
        DataType::I32 => Scalar::I32(NumCast::from(value)?),
        DataType::U32 => Scalar::U32(NumCast::from(value)?),
        DataType::I64 => Scalar::I64(NumCast::from(value)?),
        DataType::U64 => Scalar::U64(NumCast::from(value)?),
        DataType::F32 => Scalar::F32(NumCast::from(value)?),
        DataType::F64 => Scalar::F64(NumCast::from(value)?),
        DataType::Str => return None,
    })
}

impl Scalar {
    pub fn dtype(&self) -> DataType {
        match self {
            Scalar::I8(_) => DataType::I8,
            Scalar::U8(_) => DataType::U8,
            Scalar::I16(_) => DataType::I16,
            Scalar::U16(_) => DataType::U16,
            Scalar::I32(_) => DataType::I32,
            Scalar::U32(_) => DataType::U32,
            Scalar::I64(_) => DataType::I64,
            Scalar::U64(_) => DataType::U64,
            Scalar::F32(_) => DataType::F32,
            Scalar::F64(_) => DataType::F64,
            Scalar::Str(_) => DataType::Str,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        scalar_numeric!(self, v => NumCast::from(*v), _s => None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            Scalar::F32(v) => v.is_nan(),
            Scalar::F64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Convert to another element type.
    ///
    /// Returns `None` when the value is not representable, e.g. NaN or an
    /// out-of-range number cast to an integer, or text cast to a number.
    pub fn cast(&self, dtype: DataType) -> Option<Scalar> {
        scalar_numeric!(
            self,
            v => cast_to(*v, dtype),
            s => (dtype == DataType::Str).then(|| Scalar::Str(s.clone()))
        )
    }

    /// The value as a Rust primitive, if numeric and representable.
    pub fn to_primitive<T: NumCast>(&self) -> Option<T> {
        scalar_numeric!(self, v => NumCast::from(*v), _s => None)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        scalar_numeric!(self, v => write!(f, "{}", v), s => f.write_str(s))
    }
}

/// A flat, row-major array of one element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Str(Vec<String>),
}

/// Dispatch on every variant of [`ArrayData`], binding the inner vector.
///
/// The numeric arm is expanded once per numeric variant, so it may use the
/// vector generically; the text arm handles `Vec<String>`.
macro_rules! array_dispatch {
    ($data:expr, $v:ident => $numeric:expr, $s:ident => $text:expr) => {
        match $data {
            ArrayData::I8($v) => $numeric,
            ArrayData::U8($v) => $numeric,
            ArrayData::I16($v) => $numeric,
            ArrayData::U16($v) => $numeric,
            ArrayData::I32($v) => $numeric,
            ArrayData::U32($v) => $numeric,
            ArrayData::I64($v) => $numeric,
            ArrayData::U64($v) => $numeric,
            ArrayData::F32($v) => $numeric,
            ArrayData::F64($v) => $numeric,
            ArrayData::Str($s) => $text,
        }
    };
}

macro_rules! impl_from_vec {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<Vec<$ty>> for ArrayData {
                fn from(values: Vec<$ty>) -> Self {
                    ArrayData::$variant(values)
                }
            }
        )+
    };
}

impl_from_vec!(
    I8 => i8,
    U8 => u8,
    I16 => i16,
    U16 => u16,
    I32 => i32,
    U32 => u32,
    I64 => i64,
    U64 => u64,
    F32 => f32,
    F64 => f64,
    Str => String,
);

impl From<Vec<&str>> for ArrayData {
    fn from(values: Vec<&str>) -> Self {
        ArrayData::Str(values.into_iter().map(str::to_string).collect())
    }
}

fn pick_every<T: Clone>(values: &[T], stride: usize, offset: usize) -> Vec<T> {
    values.iter().skip(offset).step_by(stride).cloned().collect()
}

fn scatter_values<T: Clone>(source: &[T], target: &mut [T], placements: &[(usize, usize)]) {
    for &(from, to) in placements {
        target[to] = source[from].clone();
    }
}

impl ArrayData {
    pub fn dtype(&self) -> DataType {
        match self {
            ArrayData::I8(_) => DataType::I8,
            ArrayData::U8(_) => DataType::U8,
            ArrayData::I16(_) => DataType::I16,
            ArrayData::U16(_) => DataType::U16,
            ArrayData::I32(_) => DataType::I32,
            ArrayData::U32(_) => DataType::U32,
            ArrayData::I64(_) => DataType::I64,
            ArrayData::U64(_) => DataType::U64,
            ArrayData::F32(_) => DataType::F32,
            ArrayData::F64(_) => DataType::F64,
            ArrayData::Str(_) => DataType::Str,
        }
    }

    pub fn len(&self) -> usize {
        array_dispatch!(self, v => v.len(), s => s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An array of `len` copies of `fill`.
    ///
    /// Without a fill numeric arrays start at zero and text arrays at the
    /// empty string. A fill that cannot be cast to `dtype` is an error.
    pub fn full(dtype: DataType, len: usize, fill: Option<&Scalar>) -> TreeResult<ArrayData> {
        let fill = match fill {
            Some(value) => Some(
                value
                    .cast(dtype)
                    .ok_or_else(|| TreeError::unrepresentable_fill(value, dtype))?,
            ),
            None => None,
        };
        let data = match dtype {
            DataType::I8 => ArrayData::I8(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::U8 => ArrayData::U8(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::I16 => ArrayData::I16(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::U16 => ArrayData::U16(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::I32 => ArrayData::I32(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::U32 => ArrayData::U32(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::I64 => ArrayData::I64(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::U64 => ArrayData::U64(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::F32 => ArrayData::F32(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::F64 => ArrayData::F64(vec![fill.and_then(|f| f.to_primitive()).unwrap_or_default(); len]),
            DataType::Str => {
                let text = match fill {
                    Some(Scalar::Str(s)) => s,
                    _ => String::new(),
                };
                ArrayData::Str(vec![text; len])
            }
        };
        Ok(data)
    }

    /// Element `index` as a scalar.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            ArrayData::I8(v) => v.get(index).copied().map(Scalar::I8),
            ArrayData::U8(v) => v.get(index).copied().map(Scalar::U8),
            ArrayData::I16(v) => v.get(index).copied().map(Scalar::I16),
            ArrayData::U16(v) => v.get(index).copied().map(Scalar::U16),
            ArrayData::I32(v) => v.get(index).copied().map(Scalar::I32),
            ArrayData::U32(v) => v.get(index).copied().map(Scalar::U32),
            ArrayData::I64(v) => v.get(index).copied().map(Scalar::I64),
            ArrayData::U64(v) => v.get(index).copied().map(Scalar::U64),
            ArrayData::F32(v) => v.get(index).copied().map(Scalar::F32),
            ArrayData::F64(v) => v.get(index).copied().map(Scalar::F64),
            ArrayData::Str(v) => v.get(index).cloned().map(Scalar::Str),
        }
    }

    /// Every element widened to f64, or `None` for text.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        array_dispatch!(
            self,
            v => Some(v.iter().map(|x| NumCast::from(*x).unwrap_or(f64::NAN)).collect()),
            _s => None
        )
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            ArrayData::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Column `column` of a row-major array with `columns` columns.
    pub fn column(&self, columns: usize, column: usize) -> ArrayData {
        match self {
            ArrayData::I8(v) => ArrayData::I8(pick_every(v, columns, column)),
            ArrayData::U8(v) => ArrayData::U8(pick_every(v, columns, column)),
            ArrayData::I16(v) => ArrayData::I16(pick_every(v, columns, column)),
            ArrayData::U16(v) => ArrayData::U16(pick_every(v, columns, column)),
            ArrayData::I32(v) => ArrayData::I32(pick_every(v, columns, column)),
            ArrayData::U32(v) => ArrayData::U32(pick_every(v, columns, column)),
            ArrayData::I64(v) => ArrayData::I64(pick_every(v, columns, column)),
            ArrayData::U64(v) => ArrayData::U64(pick_every(v, columns, column)),
            ArrayData::F32(v) => ArrayData::F32(pick_every(v, columns, column)),
            ArrayData::F64(v) => ArrayData::F64(pick_every(v, columns, column)),
            ArrayData::Str(v) => ArrayData::Str(pick_every(v, columns, column)),
        }
    }

    /// Copy `self[from]` into `target[to]` for each `(from, to)` pair.
    ///
    /// Later pairs overwrite earlier ones. Both arrays must share an element
    /// type and every index must be in bounds.
    pub fn scatter_into(
        &self,
        target: &mut ArrayData,
        placements: &[(usize, usize)],
    ) -> TreeResult<()> {
        match (self, target) {
            (ArrayData::I8(s), ArrayData::I8(t)) => scatter_values(s, t, placements),
            (ArrayData::U8(s), ArrayData::U8(t)) => scatter_values(s, t, placements),
            (ArrayData::I16(s), ArrayData::I16(t)) => scatter_values(s, t, placements),
            (ArrayData::U16(s), ArrayData::U16(t)) => scatter_values(s, t, placements),
            (ArrayData::I32(s), ArrayData::I32(t)) => scatter_values(s, t, placements),
            (ArrayData::U32(s), ArrayData::U32(t)) => scatter_values(s, t, placements),
            (ArrayData::I64(s), ArrayData::I64(t)) => scatter_values(s, t, placements),
            (ArrayData::U64(s), ArrayData::U64(t)) => scatter_values(s, t, placements),
            (ArrayData::F32(s), ArrayData::F32(t)) => scatter_values(s, t, placements),
            (ArrayData::F64(s), ArrayData::F64(t)) => scatter_values(s, t, placements),
            (ArrayData::Str(s), ArrayData::Str(t)) => scatter_values(s, t, placements),
            (source, target) => {
                return Err(TreeError::unsupported_type(
                    format!("scatter into {}", target.dtype()),
                    source.dtype(),
                ))
            }
        }
        Ok(())
    }
}

/// An attribute value: a single scalar or a 1D array.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Scalar(Scalar),
    Array(ArrayData),
}

impl AttrValue {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            AttrValue::Scalar(s) => Some(s),
            AttrValue::Array(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_f64)
    }
}

impl From<Scalar> for AttrValue {
    fn from(value: Scalar) -> Self {
        AttrValue::Scalar(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Scalar(Scalar::Str(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Scalar(Scalar::F64(value))
    }
}

impl From<ArrayData> for AttrValue {
    fn from(value: ArrayData) -> Self {
        AttrValue::Array(value)
    }
}

/// Ordered attribute map.
pub type Attributes = IndexMap<String, AttrValue>;

/// A named dimension of a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
}

impl Dimension {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
        }
    }
}

/// Deflate settings for a stored variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compression {
    pub level: i32,
    pub shuffle: bool,
}

impl Compression {
    pub fn deflate(level: i32) -> Self {
        Self {
            level,
            shuffle: true,
        }
    }
}

/// How a variable is stored, separate from its CF attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    /// Value written as `_FillValue`.
    pub fill_value: Option<Scalar>,
    /// Element type on disk.
    pub dtype: Option<DataType>,
    /// Value written as the `coordinates` attribute.
    pub coordinates: Option<String>,
    pub compression: Option<Compression>,
}

/// An n-dimensional array with dimensions, attributes and encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub dims: Vec<Dimension>,
    pub data: ArrayData,
    pub attrs: Attributes,
    pub encoding: Encoding,
}

impl Variable {
    /// Create a variable, checking that the data fills the dimensions.
    ///
    /// A variable without dimensions is a scalar and holds one value.
    pub fn new(
        name: impl Into<String>,
        dims: Vec<Dimension>,
        data: ArrayData,
    ) -> TreeResult<Self> {
        let name = name.into();
        let expected: usize = dims.iter().map(|d| d.len).product();
        if expected != data.len() {
            return Err(TreeError::ShapeMismatch {
                name,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            name,
            dims,
            data,
            attrs: Attributes::new(),
            encoding: Encoding::default(),
        })
    }

    /// A one-dimensional variable along `dim`.
    pub fn from_vec(
        name: impl Into<String>,
        dim: impl Into<String>,
        data: impl Into<ArrayData>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            dims: vec![Dimension::new(dim, data.len())],
            data,
            attrs: Attributes::new(),
            encoding: Encoding::default(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.len).collect()
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Element type on disk, falling back to the in-memory type.
    pub fn storage_dtype(&self) -> DataType {
        self.encoding.dtype.unwrap_or_else(|| self.data.dtype())
    }
}

/// A named node holding attributes, child groups and variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub name: String,
    pub attrs: Attributes,
    pub groups: IndexMap<String, Group>,
    pub variables: IndexMap<String, Variable>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.add_group(group);
        self
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.add_variable(variable);
        self
    }

    /// Insert a child group, replacing any group of the same name.
    pub fn add_group(&mut self, group: Group) {
        self.groups.insert(group.name.clone(), group);
    }

    /// Insert a variable, replacing any variable of the same name.
    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Descend through child groups along `path`.
    pub fn find_group(&self, path: &GroupPath) -> Option<&Group> {
        path.segments()
            .iter()
            .try_fold(self, |group, segment| group.group(segment))
    }

    /// Resolve a path whose last segment names a variable.
    pub fn find_variable(&self, path: &GroupPath) -> Option<&Variable> {
        let (parent, name) = path.split_last()?;
        self.find_group(&parent)?.variable(name)
    }
}

/// A whole hierarchical dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTree {
    pub root: Group,
}

impl DataTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, path: &GroupPath) -> TreeResult<&Group> {
        self.root
            .find_group(path)
            .ok_or_else(|| TreeError::MissingGroup(path.to_string()))
    }

    pub fn variable(&self, path: &GroupPath) -> TreeResult<&Variable> {
        self.root
            .find_variable(path)
            .ok_or_else(|| TreeError::MissingVariable(path.to_string()))
    }

    /// Names of the top-level groups, in file order.
    pub fn top_level_groups(&self) -> impl Iterator<Item = &str> {
        self.root.groups.keys().map(String::as_str)
    }
}

/// Location of a group or variable as a list of names below the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupPath {
    segments: Vec<String>,
}

impl GroupPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse `a/b/c`; leading, trailing and repeated slashes are ignored.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// The parent path and the final segment.
    pub fn split_last(&self) -> Option<(GroupPath, &str)> {
        let (last, parent) = self.segments.split_last()?;
        Some((
            GroupPath {
                segments: parent.to_vec(),
            },
            last.as_str(),
        ))
    }
}

impl FromStr for GroupPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}
