//! Saturating casts from canvas-space floats to OpenCV pixel coordinates

use opencv::core::Point;

/// Clamp and convert f32 to i32 for pixel coordinates
///
/// Non-finite values map to `min`.
#[allow(clippy::cast_precision_loss)] // Acceptable for clamping bounds
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f32_to_i32_clamp(value: f32, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.clamp(min as f32, max as f32);

    // f32 rounding can push the bound itself out of range
    let result = clamped as i32;
    result.clamp(min, max)
}

/// Round a canvas-space position to the nearest pixel
pub fn to_pixel(x: f32, y: f32) -> Point {
    Point::new(
        f32_to_i32_clamp(x.round(), i32::MIN / 2, i32::MAX / 2),
        f32_to_i32_clamp(y.round(), i32::MIN / 2, i32::MAX / 2),
    )
}
