use serde::{Deserialize, Serialize};

/// Hue step between consecutive features (golden angle).
pub const HUE_STEP_DEGREES: f64 = 137.5;
pub const FILL_SATURATION: f64 = 0.6;
pub const FILL_LIGHTNESS: f64 = 0.7;

/// Stroke color shared by every municipality boundary.
pub const BOUNDARY_COLOR: Rgb = Rgb::new(0x33, 0x33, 0x33);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Deterministic fill for the feature at `index` in collection order.
/// Returns (h: 0..360, s: 0..1, l: 0..1).
pub fn feature_fill_hsl(index: usize) -> (f64, f64, f64) {
    let hue = (index as f64 * HUE_STEP_DEGREES).rem_euclid(360.0);
    (hue, FILL_SATURATION, FILL_LIGHTNESS)
}

pub fn feature_fill(index: usize) -> Rgb {
    let (h, s, l) = feature_fill_hsl(index);
    let (r, g, b) = hsl_to_rgb(h, s, l);
    Rgb::new(r, g, b)
}

/// Convert HSL to RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    (
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::{BOUNDARY_COLOR, Rgb, feature_fill, feature_fill_hsl, hsl_to_rgb};

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-9,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    #[test]
    fn hue_rotates_by_golden_angle_and_wraps() {
        assert_close(feature_fill_hsl(0).0, 0.0);
        assert_close(feature_fill_hsl(1).0, 137.5);
        assert_close(feature_fill_hsl(2).0, 275.0);
        assert_close(feature_fill_hsl(3).0, 52.5);
        let (_, s, l) = feature_fill_hsl(217);
        assert_close(s, 0.6);
        assert_close(l, 0.7);
    }

    #[test]
    fn feature_fill_is_stable_across_calls() {
        for index in 0..64 {
            assert_eq!(feature_fill(index), feature_fill(index));
        }
    }

    #[test]
    fn adjacent_indices_get_distinct_fills() {
        for index in 0..200 {
            assert_ne!(feature_fill(index), feature_fill(index + 1), "index {index}");
        }
    }

    #[test]
    fn first_fill_is_pastel_red() {
        // hsl(0, 60%, 70%)
        assert_eq!(feature_fill(0), Rgb::new(224, 133, 133));
    }

    #[test]
    fn hsl_primaries_and_gray() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), (0, 0, 255));
        assert_eq!(hsl_to_rgb(42.0, 0.0, 0.2), (51, 51, 51));
    }

    #[test]
    fn boundary_hex() {
        assert_eq!(BOUNDARY_COLOR.hex(), "#333333");
    }
}
