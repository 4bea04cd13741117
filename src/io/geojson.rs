//! GeoJSON read/write.
//!
//! Geometry objects are carried as opaque `serde_json::Value`s; only the
//! renderers look inside them (see [`rings`]).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value, json};

use crate::domain::{RegionGeometry, ShadedRegion};
use crate::error::{AppError, ProviderError};

const PROVIDER: &str = "GeoJSON";

/// Extract region geometries from a `FeatureCollection`.
///
/// Every feature must carry `join_key` (string or number). A missing `name_field`
/// falls back to the code so the region is still displayable.
pub fn parse_feature_collection(
    body: &Value,
    join_key: &str,
    name_field: &str,
) -> Result<Vec<RegionGeometry>, ProviderError> {
    let features = body
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::malformed(PROVIDER, "expected a FeatureCollection with `features`"))?;

    let mut out = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let properties = feature.get("properties").and_then(Value::as_object);
        let code = properties
            .and_then(|p| p.get(join_key))
            .and_then(property_to_string)
            .ok_or_else(|| {
                ProviderError::malformed(PROVIDER, format!("feature {idx} has no `{join_key}` property"))
            })?;
        let name = properties
            .and_then(|p| p.get(name_field))
            .and_then(property_to_string)
            .unwrap_or_else(|| code.clone());
        let geometry = feature.get("geometry").cloned().unwrap_or(Value::Null);

        out.push(RegionGeometry { code, name, geometry });
    }
    Ok(out)
}

fn property_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build a `FeatureCollection` from shaded regions.
///
/// `decorate` may add extra properties per feature (fill color, popup, ...).
pub fn to_feature_collection(
    regions: &[ShadedRegion],
    join_key: &str,
    name_field: &str,
    decorate: &dyn Fn(&ShadedRegion, &mut Map<String, Value>),
) -> Value {
    let features: Vec<Value> = regions
        .iter()
        .map(|region| {
            let mut properties = Map::new();
            properties.insert(join_key.to_string(), Value::String(region.code.clone()));
            properties.insert(name_field.to_string(), Value::String(region.name.clone()));
            properties.insert("appreciation".to_string(), json!(region.appreciation));
            decorate(region, &mut properties);
            json!({
                "type": "Feature",
                "properties": properties,
                "geometry": region.geometry,
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write shaded regions as a GeoJSON file.
pub fn write_shaded_geojson(
    path: &Path,
    regions: &[ShadedRegion],
    join_key: &str,
    name_field: &str,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create GeoJSON '{}': {e}", path.display())))?;
    let collection = to_feature_collection(regions, join_key, name_field, &|_, _| {});
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &collection)
        .map_err(|e| AppError::new(2, format!("Failed to write GeoJSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush GeoJSON: {e}")))
}

/// Outer and inner rings of a Polygon / MultiPolygon as `(lon, lat)` lists.
///
/// Other geometry types (and `null`) yield no rings.
pub fn rings(geometry: &Value) -> Vec<Vec<(f64, f64)>> {
    let coordinates = geometry.get("coordinates");
    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => coordinates.map(polygon_rings).unwrap_or_default(),
        Some("MultiPolygon") => coordinates
            .and_then(Value::as_array)
            .map(|polys| polys.iter().flat_map(polygon_rings).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn polygon_rings(polygon: &Value) -> Vec<Vec<(f64, f64)>> {
    let Some(rings) = polygon.as_array() else {
        return Vec::new();
    };
    rings
        .iter()
        .filter_map(Value::as_array)
        .map(|ring| {
            ring.iter()
                .filter_map(|pt| {
                    let pt = pt.as_array()?;
                    Some((pt.first()?.as_f64()?, pt.get(1)?.as_f64()?))
                })
                .collect::<Vec<_>>()
        })
        .filter(|ring| ring.len() >= 3)
        .collect()
}
