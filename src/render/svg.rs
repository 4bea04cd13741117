//! Static SVG choropleth drawn with Plotters.
//!
//! Coordinates are plotted as plain lon/lat (equirectangular). Popups have no
//! static equivalent and are ignored. No text is drawn, so no font backend is
//! needed.

use std::path::PathBuf;

use plotters::prelude::*;
use tracing::debug;

use crate::domain::ShadedRegion;
use crate::error::AppError;
use crate::io::geojson::rings;
use crate::render::{ColorScale, MapRenderer, Rgb};

const OUTLINE: RGBColor = RGBColor(0x44, 0x44, 0x44);

pub struct SvgMapRenderer {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl MapRenderer for SvgMapRenderer {
    fn render(
        &self,
        regions: &[ShadedRegion],
        scale: &ColorScale,
        _popup: &dyn Fn(&ShadedRegion) -> String,
    ) -> Result<(), AppError> {
        let shapes: Vec<(Vec<Vec<(f64, f64)>>, Rgb)> = regions
            .iter()
            .filter_map(|region| {
                let rings = rings(&region.geometry);
                if rings.is_empty() {
                    debug!(code = %region.code, "no polygon rings; region not drawn");
                    return None;
                }
                Some((rings, scale.color(region.appreciation)))
            })
            .collect();

        let Some(bounds) = bounds(&shapes) else {
            return Err(AppError::new(2, "No polygon geometry to draw in SVG map."));
        };

        let root = SVGBackend::new(&self.path, (self.width.max(50), self.height.max(50))).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(bounds.x0..bounds.x1, bounds.y0..bounds.y1)
            .map_err(draw_err)?;

        for (rings, color) in &shapes {
            let fill = RGBColor(color.0, color.1, color.2);
            chart
                .draw_series(rings.iter().map(|ring| Polygon::new(ring.clone(), fill.filled())))
                .map_err(draw_err)?;
            chart
                .draw_series(rings.iter().map(|ring| PathElement::new(ring.clone(), OUTLINE.stroke_width(1))))
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

fn bounds(shapes: &[(Vec<Vec<(f64, f64)>>, Rgb)]) -> Option<Bounds> {
    let mut b = Bounds {
        x0: f64::INFINITY,
        x1: f64::NEG_INFINITY,
        y0: f64::INFINITY,
        y1: f64::NEG_INFINITY,
    };
    for &(x, y) in shapes.iter().flat_map(|(rings, _)| rings.iter().flatten()) {
        b.x0 = b.x0.min(x);
        b.x1 = b.x1.max(x);
        b.y0 = b.y0.min(y);
        b.y1 = b.y1.max(y);
    }
    if !(b.x0.is_finite() && b.x1.is_finite() && b.y0.is_finite() && b.y1.is_finite()) {
        return None;
    }
    // Plotters needs a non-empty range on both axes.
    if b.x1 <= b.x0 {
        b.x0 -= 0.5;
        b.x1 += 0.5;
    }
    if b.y1 <= b.y0 {
        b.y0 -= 0.5;
        b.y1 += 0.5;
    }
    Some(b)
}

fn draw_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::new(2, format!("Failed to draw SVG map: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    use crate::render::{appreciation_scale, popup_text};

    #[test]
    fn writes_svg_with_fill_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg");
        let regions = vec![
            ShadedRegion {
                code: "A".to_string(),
                name: "A".to_string(),
                geometry: json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 0.0]]]}),
                appreciation: Some(1.0),
            },
            ShadedRegion {
                code: "B".to_string(),
                name: "B".to_string(),
                geometry: json!({"type": "MultiPolygon", "coordinates": [[[[3.0, 0.0], [4.0, 0.0], [4.0, 1.0], [3.0, 0.0]]]]}),
                appreciation: None,
            },
            ShadedRegion {
                code: "C".to_string(),
                name: "C".to_string(),
                geometry: Value::Null,
                appreciation: Some(5.0),
            },
        ];

        let renderer = SvgMapRenderer {
            path: path.clone(),
            width: 400,
            height: 200,
        };
        renderer.render(&regions, &appreciation_scale(&regions), &popup_text).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap().to_lowercase();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("polygon"));
        // Neutral gray for the region with no value.
        assert!(svg.contains("#808080"), "neutral fill missing");
    }

    #[test]
    fn no_polygons_is_an_error() {
        let regions = vec![ShadedRegion {
            code: "C".to_string(),
            name: "C".to_string(),
            geometry: Value::Null,
            appreciation: Some(5.0),
        }];
        let renderer = SvgMapRenderer {
            path: PathBuf::from("never-written.svg"),
            width: 400,
            height: 200,
        };
        assert!(renderer.render(&regions, &appreciation_scale(&regions), &popup_text).is_err());
    }

    #[test]
    fn bounds_pad_degenerate_ranges() {
        let shapes = vec![(vec![vec![(1.0, 2.0), (1.0, 2.0), (1.0, 2.0)]], Rgb(0, 0, 0))];
        let b = bounds(&shapes).unwrap();
        assert_eq!((b.x0, b.x1, b.y0, b.y1), (0.5, 1.5, 1.5, 2.5));
    }
}
