//! Display weights for the tag cloud.

/// Smallest font size in the cloud, in pixels.
pub const MIN_FONT_PX: u32 = 12;

/// Largest font size in the cloud, in pixels.
pub const MAX_FONT_PX: u32 = 32;

/// Font size for a tag used `count` times when the busiest tag has `max`.
///
/// Linear in `count / max`, clamped to `MIN_FONT_PX..=MAX_FONT_PX`.
pub fn font_size(count: i64, max: i64) -> u32 {
    if max <= 0 || count <= 0 {
        return MIN_FONT_PX;
    }
    let ratio = (count.min(max) as f64) / (max as f64);
    let span = f64::from(MAX_FONT_PX - MIN_FONT_PX);
    MIN_FONT_PX + (ratio * span).round() as u32
}
