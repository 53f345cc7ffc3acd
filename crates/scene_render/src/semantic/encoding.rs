//! Index color codecs
//!
//! Two ways to turn a semantic index into a pixel color: a perceptual
//! palette for images meant for human eyes, and a lossless byte
//! packing for images meant to be decoded back into indices.

/// Pack an index into an RGB triple, low byte first
///
/// Injective for indices below 2^24; [`decode_index`] inverts it
/// exactly. Any shading applied on top of these pixels would corrupt
/// the packing, so index-encoded renders run with lighting and
/// ambient occlusion disabled.
pub fn encode_index(index: u32) -> [u8; 3] {
    [
        (index & 0xff) as u8,
        ((index >> 8) & 0xff) as u8,
        ((index >> 16) & 0xff) as u8,
    ]
}

/// Recover the index packed by [`encode_index`]
pub fn decode_index(rgb: [u8; 3]) -> u32 {
    u32::from(rgb[0]) | (u32::from(rgb[1]) << 8) | (u32::from(rgb[2]) << 16)
}

/// Fractional part of the golden ratio; stepping hue by this spreads
/// consecutive indices maximally around the color wheel
const GOLDEN_RATIO_CONJUGATE: f32 = 0.618_034;

/// Pick a visually distinct palette color for an index
///
/// Deterministic: the same index always yields the same color, so a
/// persisted index table reproduces the same palette across runs.
pub fn palette_color(index: u32) -> [u8; 3] {
    let hue = (index as f32 * GOLDEN_RATIO_CONJUGATE).fract();
    hsl_to_rgb(hue, 0.6, 0.5)
}

/// Convert HSL (all components in [0, 1]) to 8-bit RGB
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [u8; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h * 6.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());

    let (r, g, b) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let m = l - c / 2.0;
    [
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    ]
}
