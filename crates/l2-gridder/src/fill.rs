//! Fill values and the valid-sample mask.

use netcdf_tree::{ArrayData, DataType, Scalar, Variable};

/// Attributes that may declare a missing-data sentinel, in lookup order.
const FILL_ATTRIBUTES: [&str; 2] = ["_FillValue", "missing_value"];

/// Fill value for the gridded form of `variable`.
///
/// Searched in order: the encoding's fill value, the `_FillValue`
/// attribute, the `missing_value` attribute. If none is declared the type
/// default of the storage type is used.
pub fn resolve_fill_value(variable: &Variable) -> Option<Scalar> {
    if let Some(fill) = &variable.encoding.fill_value {
        return Some(fill.clone());
    }
    FILL_ATTRIBUTES
        .iter()
        .find_map(|name| variable.attrs.get(*name).and_then(|v| v.as_scalar()).cloned())
        .or_else(|| default_fill_value(variable.storage_dtype()))
}

/// Fill value for a variable that declares none.
///
/// `None` for strings, -9999.0 for floats and the type maximum for integers.
pub fn default_fill_value(dtype: DataType) -> Option<Scalar> {
    dtype.default_fill()
}

/// Every numeric missing-data value the variable declares.
///
/// Sentinels are cast to the in-memory element type first so that a float64
/// attribute on a float32 variable compares at float32 precision.
pub fn declared_sentinels(variable: &Variable) -> Vec<f64> {
    let dtype = variable.data.dtype();
    let encoded = variable.encoding.fill_value.as_ref();
    let attributes = FILL_ATTRIBUTES
        .iter()
        .filter_map(|name| variable.attrs.get(*name).and_then(|v| v.as_scalar()));

    let mut sentinels: Vec<f64> = Vec::new();
    for value in encoded.into_iter().chain(attributes) {
        let value = value.cast(dtype).unwrap_or_else(|| value.clone());
        if let Some(v) = value.as_f64().filter(|v| !v.is_nan()) {
            if !sentinels.contains(&v) {
                sentinels.push(v);
            }
        }
    }
    sentinels
}

/// Which samples of `variable` hold real data.
///
/// Numeric samples are invalid when NaN or equal to a declared sentinel;
/// text samples when empty.
pub fn valid_mask(variable: &Variable) -> Vec<bool> {
    match &variable.data {
        ArrayData::Str(values) => values.iter().map(|s| !s.is_empty()).collect(),
        data => {
            let sentinels = declared_sentinels(variable);
            data.to_f64_vec()
                .unwrap_or_default()
                .into_iter()
                .map(|v| !v.is_nan() && !sentinels.contains(&v))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcdf_tree::{AttrValue, Encoding};

    fn floats() -> Variable {
        Variable::from_vec("albedo", "n", vec![0.1_f32, f32::NAN, -9999.0, 0.4])
    }

    #[test]
    fn test_fill_precedence() {
        let with_all = floats()
            .with_attr("_FillValue", Scalar::F32(-2.0))
            .with_attr("missing_value", Scalar::F32(-3.0))
            .with_encoding(Encoding {
                fill_value: Some(Scalar::F32(-1.0)),
                ..Default::default()
            });
        assert_eq!(resolve_fill_value(&with_all), Some(Scalar::F32(-1.0)));

        let attrs_only = floats()
            .with_attr("_FillValue", Scalar::F32(-2.0))
            .with_attr("missing_value", Scalar::F32(-3.0));
        assert_eq!(resolve_fill_value(&attrs_only), Some(Scalar::F32(-2.0)));

        let missing_only = floats().with_attr("missing_value", Scalar::F32(-3.0));
        assert_eq!(resolve_fill_value(&missing_only), Some(Scalar::F32(-3.0)));

        assert_eq!(resolve_fill_value(&floats()), Some(Scalar::F32(-9999.0)));
    }

    #[test]
    fn test_type_defaults() {
        assert_eq!(default_fill_value(DataType::F32), Some(Scalar::F32(-9999.0)));
        assert_eq!(default_fill_value(DataType::F64), Some(Scalar::F64(-9999.0)));
        assert_eq!(default_fill_value(DataType::U16), Some(Scalar::U16(65535)));
        assert_eq!(default_fill_value(DataType::I16), Some(Scalar::I16(32767)));
        assert_eq!(default_fill_value(DataType::Str), None);
    }

    #[test]
    fn test_default_uses_encoded_dtype() {
        let variable = Variable::from_vec("flags", "n", vec![1_u16, 2]).with_encoding(Encoding {
            dtype: Some(DataType::U8),
            ..Default::default()
        });
        assert_eq!(resolve_fill_value(&variable), Some(Scalar::U8(255)));
    }

    #[test]
    fn test_string_has_no_fill() {
        let variable = Variable::from_vec("tb_time_utc", "n", vec!["2015-04-01", ""]);
        assert_eq!(resolve_fill_value(&variable), None);
        assert_eq!(valid_mask(&variable), [true, false]);
    }

    #[test]
    fn test_valid_mask_numeric() {
        assert_eq!(valid_mask(&floats()), [true, false, true, true]);

        let declared = floats().with_attr("_FillValue", AttrValue::from(-9999.0));
        assert_eq!(valid_mask(&declared), [true, false, false, true]);

        let ints = Variable::from_vec("flag", "n", vec![0_u16, 65534, 7])
            .with_encoding(Encoding {
                fill_value: Some(Scalar::U16(65534)),
                ..Default::default()
            });
        assert_eq!(valid_mask(&ints), [true, false, true]);
    }

    #[test]
    fn test_declared_sentinels_deduplicated() {
        let variable = floats()
            .with_attr("_FillValue", Scalar::F32(-9999.0))
            .with_attr("missing_value", Scalar::F64(-9999.0))
            .with_encoding(Encoding {
                fill_value: Some(Scalar::F32(f32::NAN)),
                ..Default::default()
            });
        assert_eq!(declared_sentinels(&variable), [-9999.0]);
    }
}
