//! Numeric color scale for choropleth shading.

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb`
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// ColorBrewer "Greens", 5 classes.
pub const GREENS: [Rgb; 5] = [
    Rgb(0xed, 0xf8, 0xe9),
    Rgb(0xba, 0xe4, 0xb3),
    Rgb(0x74, 0xc4, 0x76),
    Rgb(0x31, 0xa3, 0x54),
    Rgb(0x00, 0x6d, 0x2c),
];

/// Color for regions without a value.
pub const NEUTRAL: Rgb = Rgb(0x80, 0x80, 0x80);

/// Linear scale from `[min, max]` of the observed values onto palette stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    palette: Vec<Rgb>,
    domain: Option<(f64, f64)>,
    neutral: Rgb,
}

impl ColorScale {
    /// Build a scale whose domain spans every non-null, finite value given.
    pub fn numeric(palette: &[Rgb], values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().flatten().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        let domain = if min.is_finite() && max.is_finite() {
            Some((min, max))
        } else {
            None
        };

        Self {
            palette: palette.to_vec(),
            domain,
            neutral: NEUTRAL,
        }
    }

    pub fn domain(&self) -> Option<(f64, f64)> {
        self.domain
    }

    pub fn neutral(&self) -> Rgb {
        self.neutral
    }

    /// Map a value to a color; `None` (or an empty scale) gives the neutral color.
    pub fn color(&self, value: Option<f64>) -> Rgb {
        let (Some(v), Some((min, max))) = (value, self.domain) else {
            return self.neutral;
        };
        if self.palette.is_empty() || !v.is_finite() {
            return self.neutral;
        }

        let t = if max > min {
            ((v - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };

        let last = self.palette.len() - 1;
        let pos = t * last as f64;
        let lo = (pos.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        self.palette[lo].lerp(self.palette[hi], pos - lo as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_map_to_first_and_last_stop() {
        let scale = ColorScale::numeric(&GREENS, [Some(-2.0), None, Some(8.0), Some(3.0)]);
        assert_eq!(scale.domain(), Some((-2.0, 8.0)));
        assert_eq!(scale.color(Some(-2.0)), GREENS[0]);
        assert_eq!(scale.color(Some(8.0)), GREENS[4]);
        assert_eq!(scale.color(Some(3.0)), GREENS[2]);
    }

    #[test]
    fn null_maps_to_neutral() {
        let scale = ColorScale::numeric(&GREENS, [Some(1.0), Some(2.0)]);
        assert_eq!(scale.color(None), NEUTRAL);
    }

    #[test]
    fn interpolates_between_stops() {
        let scale = ColorScale::numeric(&[Rgb(0, 0, 0), Rgb(200, 100, 50)], [Some(0.0), Some(10.0)]);
        assert_eq!(scale.color(Some(5.0)), Rgb(100, 50, 25));
        // Out-of-domain values clamp.
        assert_eq!(scale.color(Some(50.0)), Rgb(200, 100, 50));
    }

    #[test]
    fn degenerate_and_empty_domains() {
        let single = ColorScale::numeric(&GREENS, [Some(4.0), Some(4.0)]);
        assert_eq!(single.color(Some(4.0)), GREENS[2]);

        let empty = ColorScale::numeric(&GREENS, [None, None]);
        assert_eq!(empty.domain(), None);
        assert_eq!(empty.color(Some(1.0)), NEUTRAL);
    }

    #[test]
    fn hex_is_lowercase_six_digits() {
        assert_eq!(Rgb(0, 109, 44).hex(), "#006d2c");
    }
}
