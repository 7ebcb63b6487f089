//! Aspect-preserving fit of a source rectangle into a fixed viewport.
//!
//! The ratio comparison and the scaled axis are computed in integer
//! arithmetic, so `fit` truncates toward zero and never rounds past the
//! destination edge.

use crate::types::{Resolution, ScaledPlacement, Viewport};

/// Scale `src` to fit inside `dst` without cropping.
///
/// If the destination is relatively wider than the source, height is capped
/// to `dst.height` and width follows the height ratio; otherwise width is
/// capped to `dst.width` and height follows the width ratio. The result
/// touches `dst` on at least one axis. The scaled axis is clamped to 1 pixel
/// so extreme aspect ratios still produce a drawable image.
///
/// # Panics
/// If `src` has a zero dimension. Capture never hands out zero-sized frames.
pub fn fit(src: Resolution, dst: Viewport) -> (u32, u32) {
    assert!(
        src.width > 0 && src.height > 0,
        "fit() needs a source with positive dimensions, got {src}"
    );

    let (sw, sh) = (src.width as u64, src.height as u64);
    let (dw, dh) = (dst.width as u64, dst.height as u64);

    // widthRatio > heightRatio  <=>  dw / sw > dh / sh  <=>  dw * sh > dh * sw
    if dw * sh > dh * sw {
        let out_w = (sw * dh / sh).max(1);
        (out_w as u32, dst.height)
    } else {
        let out_h = (sh * dw / sw).max(1);
        (dst.width, out_h as u32)
    }
}

/// Fit `src` into `dst` and center the result.
pub fn place(src: Resolution, dst: Viewport) -> ScaledPlacement {
    let (width, height) = fit(src, dst);
    ScaledPlacement {
        width,
        height,
        offset_x: (dst.width - width) / 2,
        offset_y: (dst.height - height) / 2,
    }
}
