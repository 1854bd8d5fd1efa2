//! Utility functions for colours and pixel coordinates.

pub mod safe_cast;

use opencv::core::Scalar;

/// Convert a `0xRRGGBB` colour to an OpenCV BGR scalar
pub fn rgb_hex_to_scalar(hex: u32) -> Scalar {
    let [_, r, g, b] = hex.to_be_bytes();
    Scalar::new(f64::from(b), f64::from(g), f64::from(r), 0.0)
}

/// Convert an RGB triple to an OpenCV BGR scalar
pub fn rgb_to_scalar(rgb: [u8; 3]) -> Scalar {
    Scalar::new(f64::from(rgb[2]), f64::from(rgb[1]), f64::from(rgb[0]), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_swapped_to_bgr() {
        let s = rgb_hex_to_scalar(0x00AD_D8E6);
        assert_eq!(s[0], 230.0);
        assert_eq!(s[1], 216.0);
        assert_eq!(s[2], 173.0);
    }

    #[test]
    fn test_rgb_triple_to_bgr() {
        let s = rgb_to_scalar([255, 0, 10]);
        assert_eq!(s[0], 10.0);
        assert_eq!(s[2], 255.0);
    }
}
