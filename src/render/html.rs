//! Interactive Leaflet page.
//!
//! The page is self-contained apart from Leaflet and the OSM tiles, which load
//! from their public CDNs. Region data is embedded as GeoJSON with `fill` and
//! `popup` properties precomputed here, so the page script does no data work.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::domain::ShadedRegion;
use crate::error::AppError;
use crate::io::geojson::to_feature_collection;
use crate::render::{ColorScale, MapRenderer, escape_html};

const LEAFLET_VERSION: &str = "1.9.4";

const PAGE_STYLE: &str = "html, body, #map { height: 100%; margin: 0; }\n\
.legend { background: #fff; padding: 6px 8px; font: 12px sans-serif; line-height: 18px; border-radius: 4px; }\n\
.legend i { display: inline-block; width: 18px; height: 12px; margin-right: 6px; vertical-align: middle; }\n";

const PAGE_SCRIPT: &str = r#"const map = L.map('map').setView([37.8, -96], 4);
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
  maxZoom: 18,
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
const layer = L.geoJSON(regions, {
  style: f => ({ fillColor: f.properties.fill, weight: 1, color: '#444444', fillOpacity: 0.7 }),
  onEachFeature: (f, l) => l.bindPopup(f.properties.popup)
}).addTo(map);
if (layer.getBounds().isValid()) { map.fitBounds(layer.getBounds()); }
const legend = L.control({ position: 'bottomright' });
legend.onAdd = () => {
  const div = L.DomUtil.create('div', 'legend');
  div.innerHTML = legendHtml;
  return div;
};
legend.addTo(map);
"#;

pub struct HtmlMapRenderer {
    pub path: PathBuf,
    pub title: String,
    pub join_key: String,
    pub name_field: String,
}

impl HtmlMapRenderer {
    /// Build the page without writing it.
    pub fn render_page(
        &self,
        regions: &[ShadedRegion],
        scale: &ColorScale,
        popup: &dyn Fn(&ShadedRegion) -> String,
    ) -> Result<String, AppError> {
        let collection = to_feature_collection(regions, &self.join_key, &self.name_field, &|region, props| {
            props.insert("fill".to_string(), Value::String(scale.color(region.appreciation).hex()));
            props.insert("popup".to_string(), Value::String(popup(region)));
        });

        let regions_js = script_json(&collection)?;
        let legend_js = script_json(&Value::String(legend_html(scale)))?;

        let mut page = String::new();
        page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        page.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        page.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css\">\n"
        ));
        page.push_str(&format!(
            "<script src=\"https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js\"></script>\n"
        ));
        page.push_str("<style>\n");
        page.push_str(PAGE_STYLE);
        page.push_str("</style>\n</head>\n<body>\n<div id=\"map\"></div>\n<script>\n");
        page.push_str(&format!("const regions = {regions_js};\n"));
        page.push_str(&format!("const legendHtml = {legend_js};\n"));
        page.push_str(PAGE_SCRIPT);
        page.push_str("</script>\n</body>\n</html>\n");
        Ok(page)
    }
}

impl MapRenderer for HtmlMapRenderer {
    fn render(
        &self,
        regions: &[ShadedRegion],
        scale: &ColorScale,
        popup: &dyn Fn(&ShadedRegion) -> String,
    ) -> Result<(), AppError> {
        let page = self.render_page(regions, scale, popup)?;
        fs::write(&self.path, page)
            .map_err(|e| AppError::new(2, format!("Failed to write map HTML '{}': {e}", self.path.display())))
    }
}

fn legend_html(scale: &ColorScale) -> String {
    let swatch = |color: String, label: String| format!("<i style=\"background:{color}\"></i>{label}<br/>");
    let mut out = String::from("<strong>HPA (%)</strong><br/>");
    if let Some((min, max)) = scale.domain() {
        out.push_str(&swatch(scale.color(Some(max)).hex(), format!("{max:.2}")));
        out.push_str(&swatch(scale.color(Some((min + max) / 2.0)).hex(), format!("{:.2}", (min + max) / 2.0)));
        out.push_str(&swatch(scale.color(Some(min)).hex(), format!("{min:.2}")));
    }
    out.push_str(&swatch(scale.neutral().hex(), "no data".to_string()));
    out
}

/// JSON for embedding inside `<script>`; `</` is escaped so data can't close the tag.
fn script_json(value: &Value) -> Result<String, AppError> {
    let json = serde_json::to_string(value)
        .map_err(|e| AppError::new(2, format!("Failed to serialize map data: {e}")))?;
    Ok(json.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::render::{appreciation_scale, popup_text};

    fn renderer() -> HtmlMapRenderer {
        HtmlMapRenderer {
            path: PathBuf::from("unused.html"),
            title: "HPA 2016-03-31 → 2017-03-31".to_string(),
            join_key: "STUSPS".to_string(),
            name_field: "NAME".to_string(),
        }
    }

    fn regions() -> Vec<ShadedRegion> {
        vec![
            ShadedRegion {
                code: "CA".to_string(),
                name: "California".to_string(),
                geometry: json!({"type": "Polygon", "coordinates": [[[-120.0, 35.0], [-119.0, 35.0], [-119.0, 36.0], [-120.0, 35.0]]]}),
                appreciation: Some(10.0),
            },
            ShadedRegion {
                code: "PR".to_string(),
                name: "Puerto Rico".to_string(),
                geometry: Value::Null,
                appreciation: None,
            },
        ]
    }

    #[test]
    fn page_embeds_fill_and_popup() {
        let regions = regions();
        let scale = appreciation_scale(&regions);
        let page = renderer().render_page(&regions, &scale, &popup_text).unwrap();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("leaflet@1.9.4/dist/leaflet.js"));
        assert!(page.contains("\"fill\":\"#808080\""));
        // Popup markup is escaped inside the script block.
        assert!(page.contains("HPA: 10.00%"));
        assert!(page.contains("<strong>California<\\/strong>"));
        assert!(!page.contains("</strong>"));
    }

    #[test]
    fn legend_lists_domain_and_no_data() {
        let regions = regions();
        let legend = legend_html(&appreciation_scale(&regions));
        assert!(legend.contains("10.00"));
        assert!(legend.contains("no data"));
    }

    #[test]
    fn render_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = renderer();
        r.path = dir.path().join("map.html");
        let regions = regions();
        r.render(&regions, &appreciation_scale(&regions), &popup_text).unwrap();
        let text = std::fs::read_to_string(&r.path).unwrap();
        assert!(text.contains("const regions = "));
    }
}
