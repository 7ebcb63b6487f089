// Turns a captured frame into the packed 0x00RRGGBB pixels minifb wants,
// resampled to the size FitScaler picked.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, RgbImage};

use crate::types::{Frame, PixelLayout, ScaledPlacement};

/// Packed pixels ready for `DisplaySurface::present`.
#[derive(Debug, Clone)]
pub struct ScaledImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

/// Copy the frame into an RGB image, swapping channels if the sensor delivered BGR.
/// Returns `None` if the buffer is shorter than the dimensions claim.
pub fn to_rgb_image(frame: &Frame) -> Option<RgbImage> {
    let len = frame.width as usize * frame.height as usize * 3;
    let bytes = frame.data.get(..len)?;

    match frame.layout {
        PixelLayout::Rgb => ImageBuffer::from_raw(frame.width, frame.height, bytes.to_vec()),
        PixelLayout::Bgr => {
            let mut rgb = Vec::with_capacity(len);
            for px in bytes.chunks_exact(3) {
                rgb.extend_from_slice(&[px[2], px[1], px[0]]);
            }
            ImageBuffer::from_raw(frame.width, frame.height, rgb)
        }
    }
}

/// Pack an RGB pixel as 0x00RRGGBB.
#[inline]
pub fn pack_rgb(px: &Rgb<u8>) -> u32 {
    ((px[0] as u32) << 16) | ((px[1] as u32) << 8) | px[2] as u32
}

/// Convert and resample `frame` to `placement.width x placement.height`.
pub fn scale_frame(frame: &Frame, placement: &ScaledPlacement) -> Option<ScaledImage> {
    let rgb = to_rgb_image(frame)?;

    let resized = if rgb.dimensions() == (placement.width, placement.height) {
        rgb
    } else {
        imageops::resize(&rgb, placement.width, placement.height, FilterType::Triangle)
    };

    Some(ScaledImage {
        width: placement.width as usize,
        height: placement.height as usize,
        pixels: resized.pixels().map(pack_rgb).collect(),
    })
}
