//! Coordinate reference systems of the EASE-Grid 2.0 family.
//!
//! Each gridded group carries a scalar `crs` variable whose attributes follow
//! the CF grid-mapping conventions. [`CrsRecord`] derives those attributes
//! from the WKT2 definition of the CRS, plus a PROJ string under `proj`.

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{GridError, GridResult};
use crate::wkt::WktNode;

/// WKT2 (2019) definition of EPSG:6933, WGS 84 / NSIDC EASE-Grid 2.0 Global.
pub const EPSG_6933_WKT: &str = concat!(
    r#"PROJCRS["WGS 84 / NSIDC EASE-Grid 2.0 Global","#,
    r#"BASEGEOGCRS["WGS 84","#,
    r#"ENSEMBLE["World Geodetic System 1984 ensemble","#,
    r#"MEMBER["World Geodetic System 1984 (Transit)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G730)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G873)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G1150)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G1674)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G1762)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G2139)"],"#,
    r#"ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]],"#,
    r#"ENSEMBLEACCURACY[2.0]],"#,
    r#"PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],"#,
    r#"ID["EPSG",4326]],"#,
    r#"CONVERSION["US NSIDC EASE-Grid 2.0 Global","#,
    r#"METHOD["Lambert Cylindrical Equal Area",ID["EPSG",9835]],"#,
    r#"PARAMETER["Latitude of 1st standard parallel",30,ANGLEUNIT["degree",0.0174532925199433],ID["EPSG",8823]],"#,
    r#"PARAMETER["Longitude of natural origin",0,ANGLEUNIT["degree",0.0174532925199433],ID["EPSG",8802]],"#,
    r#"PARAMETER["False easting",0,LENGTHUNIT["metre",1],ID["EPSG",8806]],"#,
    r#"PARAMETER["False northing",0,LENGTHUNIT["metre",1],ID["EPSG",8807]]],"#,
    r#"CS[Cartesian,2],"#,
    r#"AXIS["easting (X)",east,ORDER[1],LENGTHUNIT["metre",1]],"#,
    r#"AXIS["northing (Y)",north,ORDER[2],LENGTHUNIT["metre",1]],"#,
    r#"USAGE[SCOPE["Environmental science - used as basis for EASE grid."],"#,
    r#"AREA["World between 86°S and 86°N."],BBOX[-86,-180,86,180]],"#,
    r#"ID["EPSG",6933]]"#,
);

/// WKT2 (2019) definition of EPSG:6931, WGS 84 / NSIDC EASE-Grid 2.0 North.
pub const EPSG_6931_WKT: &str = concat!(
    r#"PROJCRS["WGS 84 / NSIDC EASE-Grid 2.0 North","#,
    r#"BASEGEOGCRS["WGS 84","#,
    r#"ENSEMBLE["World Geodetic System 1984 ensemble","#,
    r#"MEMBER["World Geodetic System 1984 (Transit)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G730)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G873)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G1150)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G1674)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G1762)"],"#,
    r#"MEMBER["World Geodetic System 1984 (G2139)"],"#,
    r#"ELLIPSOID["WGS 84",6378137,298.257223563,LENGTHUNIT["metre",1]],"#,
    r#"ENSEMBLEACCURACY[2.0]],"#,
    r#"PRIMEM["Greenwich",0,ANGLEUNIT["degree",0.0174532925199433]],"#,
    r#"ID["EPSG",4326]],"#,
    r#"CONVERSION["US NSIDC EASE-Grid 2.0 North","#,
    r#"METHOD["Lambert Azimuthal Equal Area",ID["EPSG",9820]],"#,
    r#"PARAMETER["Latitude of natural origin",90,ANGLEUNIT["degree",0.0174532925199433],ID["EPSG",8801]],"#,
    r#"PARAMETER["Longitude of natural origin",0,ANGLEUNIT["degree",0.0174532925199433],ID["EPSG",8802]],"#,
    r#"PARAMETER["False easting",0,LENGTHUNIT["metre",1],ID["EPSG",8806]],"#,
    r#"PARAMETER["False northing",0,LENGTHUNIT["metre",1],ID["EPSG",8807]]],"#,
    r#"CS[Cartesian,2],"#,
    r#"AXIS["easting (X)",south,MERIDIAN[90,ANGLEUNIT["degree",0.0174532925199433]],ORDER[1],LENGTHUNIT["metre",1]],"#,
    r#"AXIS["northing (Y)",south,MERIDIAN[180,ANGLEUNIT["degree",0.0174532925199433]],ORDER[2],LENGTHUNIT["metre",1]],"#,
    r#"USAGE[SCOPE["Environmental science - used as basis for EASE grid."],"#,
    r#"AREA["Northern hemisphere."],BBOX[0,-180,90,180]],"#,
    r#"ID["EPSG",6931]]"#,
);

// EPSG operation method codes
const METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA: i64 = 9835;
const METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA: i64 = 9820;

// EPSG parameter codes
const PARAM_LATITUDE_OF_NATURAL_ORIGIN: i64 = 8801;
const PARAM_LONGITUDE_OF_NATURAL_ORIGIN: i64 = 8802;
const PARAM_FALSE_EASTING: i64 = 8806;
const PARAM_FALSE_NORTHING: i64 = 8807;
const PARAM_LATITUDE_OF_1ST_STANDARD_PARALLEL: i64 = 8823;

/// Supported EASE-Grid 2.0 coordinate reference systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpsgCode {
    /// EASE-Grid 2.0 Global, Lambert cylindrical equal area
    Epsg6933,
    /// EASE-Grid 2.0 North, Lambert azimuthal equal area
    Epsg6931,
}

impl EpsgCode {
    /// Parse identifiers like `EPSG:6933` (case-insensitive).
    pub fn from_identifier(identifier: &str) -> GridResult<Self> {
        match identifier.trim().to_uppercase().as_str() {
            "EPSG:6933" => Ok(EpsgCode::Epsg6933),
            "EPSG:6931" => Ok(EpsgCode::Epsg6931),
            _ => Err(GridError::UnsupportedCrs(identifier.to_string())),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            EpsgCode::Epsg6933 => 6933,
            EpsgCode::Epsg6931 => 6931,
        }
    }

    pub fn wkt(&self) -> &'static str {
        match self {
            EpsgCode::Epsg6933 => EPSG_6933_WKT,
            EpsgCode::Epsg6931 => EPSG_6931_WKT,
        }
    }
}

impl FromStr for EpsgCode {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s)
    }
}

impl fmt::Display for EpsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.code())
    }
}

/// A CF attribute value: either text or a number.
#[derive(Debug, Clone, PartialEq)]
pub enum CfValue {
    Text(String),
    Number(f64),
}

impl CfValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CfValue::Text(s) => Some(s),
            CfValue::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CfValue::Number(v) => Some(*v),
            CfValue::Text(_) => None,
        }
    }
}

impl From<&str> for CfValue {
    fn from(value: &str) -> Self {
        CfValue::Text(value.to_string())
    }
}

impl From<String> for CfValue {
    fn from(value: String) -> Self {
        CfValue::Text(value)
    }
}

impl From<f64> for CfValue {
    fn from(value: f64) -> Self {
        CfValue::Number(value)
    }
}

/// CF grid-mapping attributes for one CRS.
///
/// Attribute order matches what CF tooling conventionally emits: WKT first,
/// then ellipsoid, prime meridian, datum, names, and projection parameters,
/// with `proj` last.
#[derive(Debug, Clone, PartialEq)]
pub struct CrsRecord {
    attributes: IndexMap<String, CfValue>,
}

impl CrsRecord {
    /// Resolve a supported identifier such as `EPSG:6933`.
    pub fn from_identifier(identifier: &str) -> GridResult<Self> {
        Self::from_epsg(EpsgCode::from_identifier(identifier)?)
    }

    pub fn from_epsg(code: EpsgCode) -> GridResult<Self> {
        Self::from_wkt(code.wkt())
    }

    /// Derive the record from a projected CRS in WKT.
    ///
    /// Only the Lambert cylindrical and azimuthal equal area methods are
    /// understood; anything else is reported as an unsupported CRS.
    pub fn from_wkt(wkt: &str) -> GridResult<Self> {
        let root = WktNode::parse(wkt)?;
        if !["PROJCRS", "PROJECTEDCRS"]
            .iter()
            .any(|k| root.keyword.eq_ignore_ascii_case(k))
        {
            return Err(GridError::UnsupportedCrs(format!(
                "expected a projected CRS, found {}",
                root.keyword
            )));
        }

        let projected_name = root
            .name()
            .ok_or_else(|| GridError::invalid_wkt("projected CRS has no name"))?;
        let base = root
            .child(&["BASEGEOGCRS", "BASEGEODCRS", "GEOGCRS"])
            .ok_or_else(|| GridError::invalid_wkt("missing base geographic CRS"))?;
        let datum = base
            .find(&["ENSEMBLE", "DATUM", "GEODETICDATUM"])
            .and_then(WktNode::name)
            .ok_or_else(|| GridError::invalid_wkt("missing datum"))?;
        let ellipsoid = base
            .find(&["ELLIPSOID", "SPHEROID"])
            .ok_or_else(|| GridError::invalid_wkt("missing ellipsoid"))?;
        let semi_major = ellipsoid
            .number(1)
            .ok_or_else(|| GridError::invalid_wkt("ellipsoid has no semi-major axis"))?;
        let inverse_flattening = ellipsoid
            .number(2)
            .ok_or_else(|| GridError::invalid_wkt("ellipsoid has no inverse flattening"))?;
        let semi_minor = if inverse_flattening == 0.0 {
            semi_major
        } else {
            semi_major * (1.0 - 1.0 / inverse_flattening)
        };
        let primem = base.child(&["PRIMEM", "PRIMEMERIDIAN"]);

        let conversion = root
            .child(&["CONVERSION"])
            .ok_or_else(|| GridError::invalid_wkt("missing conversion"))?;
        let method = conversion
            .child(&["METHOD"])
            .ok_or_else(|| GridError::invalid_wkt("conversion has no method"))?;
        let parameter = |code: i64| -> f64 {
            conversion
                .children("PARAMETER")
                .find(|p| p.epsg_code() == Some(code))
                .and_then(|p| p.number(1))
                .unwrap_or(0.0)
        };

        let mut attributes = IndexMap::new();
        attributes.insert("crs_wkt".to_string(), CfValue::from(wkt));
        attributes.insert("semi_major_axis".to_string(), semi_major.into());
        attributes.insert("semi_minor_axis".to_string(), semi_minor.into());
        attributes.insert(
            "inverse_flattening".to_string(),
            inverse_flattening.into(),
        );
        if let Some(name) = ellipsoid.name() {
            attributes.insert("reference_ellipsoid_name".to_string(), name.into());
        }
        if let Some(primem) = primem {
            attributes.insert(
                "longitude_of_prime_meridian".to_string(),
                primem.number(1).unwrap_or(0.0).into(),
            );
            if let Some(name) = primem.name() {
                attributes.insert("prime_meridian_name".to_string(), name.into());
            }
        }
        if let Some(name) = base.name() {
            attributes.insert("geographic_crs_name".to_string(), name.into());
        }
        attributes.insert("horizontal_datum_name".to_string(), datum.into());
        attributes.insert("projected_crs_name".to_string(), projected_name.into());

        let false_easting = parameter(PARAM_FALSE_EASTING);
        let false_northing = parameter(PARAM_FALSE_NORTHING);
        let central_longitude = parameter(PARAM_LONGITUDE_OF_NATURAL_ORIGIN);

        let proj_prefix = match method.epsg_code() {
            Some(METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA) => {
                let standard_parallel = parameter(PARAM_LATITUDE_OF_1ST_STANDARD_PARALLEL);
                attributes.insert(
                    "grid_mapping_name".to_string(),
                    "lambert_cylindrical_equal_area".into(),
                );
                attributes.insert("standard_parallel".to_string(), standard_parallel.into());
                attributes.insert(
                    "longitude_of_central_meridian".to_string(),
                    central_longitude.into(),
                );
                format!(
                    "+proj=cea +lat_ts={} +lon_0={}",
                    standard_parallel, central_longitude
                )
            }
            Some(METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA) => {
                let origin_latitude = parameter(PARAM_LATITUDE_OF_NATURAL_ORIGIN);
                attributes.insert(
                    "grid_mapping_name".to_string(),
                    "lambert_azimuthal_equal_area".into(),
                );
                attributes.insert(
                    "latitude_of_projection_origin".to_string(),
                    origin_latitude.into(),
                );
                attributes.insert(
                    "longitude_of_projection_origin".to_string(),
                    central_longitude.into(),
                );
                format!(
                    "+proj=laea +lat_0={} +lon_0={}",
                    origin_latitude, central_longitude
                )
            }
            _ => {
                return Err(GridError::UnsupportedCrs(format!(
                    "projection method {}",
                    method.name().unwrap_or("<unnamed>")
                )))
            }
        };
        attributes.insert("false_easting".to_string(), false_easting.into());
        attributes.insert("false_northing".to_string(), false_northing.into());

        let ellipsoid_terms = if datum.contains("World Geodetic System 1984") {
            "+datum=WGS84".to_string()
        } else {
            format!("+a={} +rf={}", semi_major, inverse_flattening)
        };
        let proj = format!(
            "{} +x_0={} +y_0={} {} +units=m +no_defs +type=crs",
            proj_prefix, false_easting, false_northing, ellipsoid_terms
        );
        attributes.insert("proj".to_string(), proj.into());

        Ok(Self { attributes })
    }

    /// All attributes in emission order, `proj` included.
    pub fn attributes(&self) -> &IndexMap<String, CfValue> {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&CfValue> {
        self.attributes.get(name)
    }

    pub fn crs_wkt(&self) -> &str {
        self.text("crs_wkt")
    }

    pub fn proj(&self) -> &str {
        self.text("proj")
    }

    pub fn projected_crs_name(&self) -> &str {
        self.text("projected_crs_name")
    }

    pub fn grid_mapping_name(&self) -> &str {
        self.text("grid_mapping_name")
    }

    fn text(&self, name: &str) -> &str {
        self.attributes
            .get(name)
            .and_then(CfValue::as_str)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_epsg_code_parsing() {
        assert_eq!(EpsgCode::from_identifier("EPSG:6933").unwrap(), EpsgCode::Epsg6933);
        assert_eq!(EpsgCode::from_identifier("epsg:6931").unwrap(), EpsgCode::Epsg6931);
        assert_eq!("EPSG:6933".parse::<EpsgCode>().unwrap(), EpsgCode::Epsg6933);
        assert!(matches!(
            EpsgCode::from_identifier("EPSG:4326"),
            Err(GridError::UnsupportedCrs(_))
        ));
        assert_eq!(EpsgCode::Epsg6931.to_string(), "EPSG:6931");
    }

    #[test]
    fn test_global_record() {
        let record = CrsRecord::from_identifier("EPSG:6933").unwrap();
        assert_eq!(
            record.projected_crs_name(),
            "WGS 84 / NSIDC EASE-Grid 2.0 Global"
        );
        assert_eq!(record.grid_mapping_name(), "lambert_cylindrical_equal_area");
        assert_eq!(
            record.proj(),
            "+proj=cea +lat_ts=30 +lon_0=0 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs +type=crs"
        );
        assert_eq!(record.crs_wkt(), EPSG_6933_WKT);
        assert_eq!(record.get("standard_parallel"), Some(&CfValue::Number(30.0)));
        assert_eq!(
            record.get("longitude_of_central_meridian"),
            Some(&CfValue::Number(0.0))
        );
        assert_eq!(
            record.get("horizontal_datum_name").and_then(CfValue::as_str),
            Some("World Geodetic System 1984 ensemble")
        );
        assert_eq!(
            record.get("geographic_crs_name").and_then(CfValue::as_str),
            Some("WGS 84")
        );
    }

    #[test]
    fn test_north_record() {
        let record = CrsRecord::from_identifier("EPSG:6931").unwrap();
        assert_eq!(
            record.projected_crs_name(),
            "WGS 84 / NSIDC EASE-Grid 2.0 North"
        );
        assert_eq!(record.grid_mapping_name(), "lambert_azimuthal_equal_area");
        assert_eq!(
            record.proj(),
            "+proj=laea +lat_0=90 +lon_0=0 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs +type=crs"
        );
        assert_eq!(
            record.get("latitude_of_projection_origin"),
            Some(&CfValue::Number(90.0))
        );
        assert!(record.get("standard_parallel").is_none());
    }

    #[test]
    fn test_ellipsoid_attributes() {
        let record = CrsRecord::from_epsg(EpsgCode::Epsg6933).unwrap();
        let attr = |name: &str| record.get(name).and_then(CfValue::as_f64).unwrap();
        assert_approx_eq!(attr("semi_major_axis"), 6378137.0, 1e-9);
        assert_approx_eq!(attr("semi_minor_axis"), 6356752.314245179, 1e-6);
        assert_approx_eq!(attr("inverse_flattening"), 298.257223563, 1e-9);
        assert_approx_eq!(attr("longitude_of_prime_meridian"), 0.0, 1e-12);
    }

    #[test]
    fn test_attribute_order() {
        let record = CrsRecord::from_epsg(EpsgCode::Epsg6933).unwrap();
        let names: Vec<&str> = record.attributes().keys().map(String::as_str).collect();
        assert_eq!(names.first(), Some(&"crs_wkt"));
        assert_eq!(names.last(), Some(&"proj"));
        let mapping = names.iter().position(|n| *n == "grid_mapping_name").unwrap();
        let easting = names.iter().position(|n| *n == "false_easting").unwrap();
        assert!(mapping < easting);
    }

    #[test]
    fn test_unsupported_method() {
        let wkt = EPSG_6933_WKT
            .replace("Lambert Cylindrical Equal Area", "Mercator (variant A)")
            .replace("ID[\"EPSG\",9835]", "ID[\"EPSG\",9804]");
        assert!(matches!(
            CrsRecord::from_wkt(&wkt),
            Err(GridError::UnsupportedCrs(_))
        ));
    }

    #[test]
    fn test_geographic_wkt_rejected() {
        let err = CrsRecord::from_wkt(r#"GEOGCRS["WGS 84"]"#).unwrap_err();
        assert!(matches!(err, GridError::UnsupportedCrs(_)));
        assert!(CrsRecord::from_wkt("not wkt").is_err());
    }
}
