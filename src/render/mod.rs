//! Choropleth rendering.
//!
//! Renderers receive the joined regions, a [`ColorScale`] whose domain spans all
//! non-null appreciation values, and a popup formatter. They never compute data.

pub mod html;
pub mod scale;
pub mod svg;

use crate::domain::ShadedRegion;
use crate::error::AppError;

pub use html::HtmlMapRenderer;
pub use scale::{ColorScale, GREENS, NEUTRAL, Rgb};
pub use svg::SvgMapRenderer;

pub trait MapRenderer {
    fn render(
        &self,
        regions: &[ShadedRegion],
        scale: &ColorScale,
        popup: &dyn Fn(&ShadedRegion) -> String,
    ) -> Result<(), AppError>;
}

/// Scale over the appreciation values of `regions`, using the default palette.
pub fn appreciation_scale(regions: &[ShadedRegion]) -> ColorScale {
    ColorScale::numeric(&GREENS, regions.iter().map(|r| r.appreciation))
}

/// Popup HTML for one region.
pub fn popup_text(region: &ShadedRegion) -> String {
    let name = escape_html(&region.name);
    match region.appreciation {
        Some(v) => format!("<strong>{name}</strong><br/>HPA: {v:.2}%"),
        None => format!("<strong>{name}</strong><br/>HPA: n/a"),
    }
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn region(name: &str, appreciation: Option<f64>) -> ShadedRegion {
        ShadedRegion {
            code: "XX".to_string(),
            name: name.to_string(),
            geometry: Value::Null,
            appreciation,
        }
    }

    #[test]
    fn popup_formats_value_and_missing() {
        assert_eq!(
            popup_text(&region("California", Some(7.5))),
            "<strong>California</strong><br/>HPA: 7.50%"
        );
        assert_eq!(
            popup_text(&region("Puerto Rico", None)),
            "<strong>Puerto Rico</strong><br/>HPA: n/a"
        );
    }

    #[test]
    fn popup_escapes_names() {
        assert_eq!(
            popup_text(&region("<b>&", None)),
            "<strong>&lt;b&gt;&amp;</strong><br/>HPA: n/a"
        );
    }

    #[test]
    fn scale_domain_ignores_nulls() {
        let regions = vec![region("A", Some(-1.0)), region("B", None), region("C", Some(9.0))];
        assert_eq!(appreciation_scale(&regions).domain(), Some((-1.0, 9.0)));
    }
}
