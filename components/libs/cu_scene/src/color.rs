use crate::math::{approx_equals, uint8_equals};
use cu_viz_payloads::{ColorRGBA, Marker};

/// Linear color with alpha, ready for the GPU.
pub type LinearRgba = [f32; 4];

/// Convert one sRGB channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// RGB converted to linear, alpha kept as is.
pub fn rgba_to_linear(color: &ColorRGBA) -> LinearRgba {
    [
        srgb_to_linear(color.r),
        srgb_to_linear(color.g),
        srgb_to_linear(color.b),
        color.a,
    ]
}

fn channel_to_u8(c: f32) -> u32 {
    (c * 255.0).clamp(0.0, 255.0) as u32
}

pub fn rgb_to_hex_string(color: &ColorRGBA) -> String {
    let rgb = channel_to_u8(color.r) << 16 | channel_to_u8(color.g) << 8 | channel_to_u8(color.b);
    format!("{rgb:06x}")
}

/// `rrggbbaa` lowercase hex string, used to key color dependent resources.
pub fn rgba_to_hex_string(color: &ColorRGBA) -> String {
    let rgba = channel_to_u8(color.r) << 24
        | channel_to_u8(color.g) << 16
        | channel_to_u8(color.b) << 8
        | channel_to_u8(color.a);
    format!("{rgba:08x}")
}

pub fn rgb_equal(a: &ColorRGBA, b: &ColorRGBA) -> bool {
    uint8_equals(a.r, b.r) && uint8_equals(a.g, b.g) && uint8_equals(a.b, b.b)
}

pub fn rgba_equal(a: &ColorRGBA, b: &ColorRGBA) -> bool {
    rgb_equal(a, b) && approx_equals(a.a as f64, b.a as f64)
}

/// Per point linear colors of a marker, falling back to `marker.color` for
/// points without a color of their own.
pub fn marker_colors_to_linear(marker: &Marker) -> impl Iterator<Item = LinearRgba> + '_ {
    (0..marker.points.len()).map(|i| rgba_to_linear(marker.colors.get(i).unwrap_or(&marker.color)))
}
