//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Whether an image of `source` size gets a thumbnail under `bound`.
///
/// The longest side is compared with the *smaller* component of the bound,
/// so a 700x500 image under an 800x600 bound still gets one.
pub fn needs_thumbnail(source: (u32, u32), bound: (u32, u32)) -> bool {
    source.0.max(source.1) > bound.0.min(bound.1)
}

/// Largest size that fits inside `bound` while keeping the aspect ratio.
///
/// Never upscales, and never returns a zero side.
///
/// # Examples
/// ```
/// # use mysgen::imaging::fit_within;
/// // 1600x1200 landscape into 800x800 → 800x600
/// assert_eq!(fit_within((1600, 1200), (800, 800)), (800, 600));
///
/// // Already small enough: unchanged
/// assert_eq!(fit_within((300, 200), (800, 800)), (300, 200));
/// ```
pub fn fit_within(source: (u32, u32), bound: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bound;
    if src_w == 0 || src_h == 0 {
        return (src_w.max(1), src_h.max(1));
    }

    let scale = (max_w as f64 / src_w as f64)
        .min(max_h as f64 / src_h as f64)
        .min(1.0);

    let w = ((src_w as f64 * scale).round() as u32).clamp(1, src_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, src_h);
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // needs_thumbnail tests
    // =========================================================================

    #[test]
    fn large_image_needs_thumbnail() {
        assert!(needs_thumbnail((1600, 1200), (800, 800)));
    }

    #[test]
    fn image_at_bound_is_left_alone() {
        assert!(!needs_thumbnail((800, 600), (800, 800)));
    }

    #[test]
    fn small_image_is_left_alone() {
        assert!(!needs_thumbnail((320, 240), (800, 800)));
    }

    #[test]
    fn compares_against_smaller_bound_component() {
        // Longest side 700 > min(800, 600)
        assert!(needs_thumbnail((700, 500), (800, 600)));
    }

    #[test]
    fn portrait_uses_height_as_longest_side() {
        assert!(needs_thumbnail((600, 1000), (800, 800)));
    }

    // =========================================================================
    // fit_within tests
    // =========================================================================

    #[test]
    fn fit_landscape() {
        assert_eq!(fit_within((1600, 1200), (800, 800)), (800, 600));
    }

    #[test]
    fn fit_portrait() {
        assert_eq!(fit_within((1200, 1600), (800, 800)), (600, 800));
    }

    #[test]
    fn fit_rectangular_bound_uses_tighter_axis() {
        // 2000x1000 into 800x300: height is the tighter axis → scale 0.3
        assert_eq!(fit_within((2000, 1000), (800, 300)), (600, 300));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within((100, 50), (800, 800)), (100, 50));
    }

    #[test]
    fn fit_extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within((10000, 2), (100, 100)), (100, 1));
    }

    #[test]
    fn fit_result_never_exceeds_bound() {
        for source in [(1001, 999), (3000, 2000), (1234, 4321), (801, 1)] {
            let (w, h) = fit_within(source, (800, 800));
            assert!(w <= 800 && h <= 800, "{source:?} → {w}x{h}");
        }
    }
}
