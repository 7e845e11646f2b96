//! Fixed-kernel filters behind the `Blur` and `Sharpen` choices.
//!
//! Blur samples outside the image clamp to the nearest edge pixel. Sharpen
//! leaves the one-pixel border as it was.

use image::{imageops, DynamicImage, ImageBuffer, Pixel, Rgba32FImage};

type Buffer<P> = ImageBuffer<P, Vec<u8>>;

/// 5x5 low-pass kernel: a ring of ones around a hollow centre.
const BLUR_KERNEL: [[f32; 5]; 5] = [
    [1.0, 1.0, 1.0, 1.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0, 1.0],
    [1.0, 1.0, 1.0, 1.0, 1.0],
];
const BLUR_DIVISOR: f32 = 16.0;

/// 3x3 smoothing kernel; `filter3x3` divides by its sum (13).
const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

pub const SHARPEN_FACTOR: f32 = 2.0;

pub fn blur(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buffer) => DynamicImage::ImageLuma8(ring_blur(buffer)),
        DynamicImage::ImageLumaA8(buffer) => DynamicImage::ImageLumaA8(ring_blur(buffer)),
        DynamicImage::ImageRgb8(buffer) => DynamicImage::ImageRgb8(ring_blur(buffer)),
        DynamicImage::ImageRgba8(buffer) => DynamicImage::ImageRgba8(ring_blur(buffer)),
        other => DynamicImage::ImageRgba8(ring_blur(&other.to_rgba8())),
    }
}

/// Blend away from the smoothed image: `smooth + factor * (image - smooth)`.
///
/// Alpha is carried over untouched.
pub fn sharpen(image: &DynamicImage, factor: f32) -> DynamicImage {
    // filter3x3 needs an interior to work on.
    if image.width() < 3 || image.height() < 3 {
        return image.clone();
    }

    // Smoothed in f32 so the u8 truncation in filter3x3 cannot bias the blend.
    let smooth = imageops::filter3x3(&image.to_rgba32f(), &SMOOTH_KERNEL);

    match image {
        DynamicImage::ImageLuma8(buffer) => {
            DynamicImage::ImageLuma8(blend(buffer, &smooth, factor))
        }
        DynamicImage::ImageLumaA8(buffer) => {
            DynamicImage::ImageLumaA8(blend(buffer, &smooth, factor))
        }
        DynamicImage::ImageRgb8(buffer) => DynamicImage::ImageRgb8(blend(buffer, &smooth, factor)),
        DynamicImage::ImageRgba8(buffer) => {
            DynamicImage::ImageRgba8(blend(buffer, &smooth, factor))
        }
        other => DynamicImage::ImageRgba8(blend(&other.to_rgba8(), &smooth, factor)),
    }
}

fn ring_blur<P>(source: &Buffer<P>) -> Buffer<P>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = source.dimensions();
    let radius = (BLUR_KERNEL.len() / 2) as i64;
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;

    let mut out = source.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let mut acc = [0f32; 4];

        for (ky, row) in BLUR_KERNEL.iter().enumerate() {
            let sy = (y as i64 + ky as i64 - radius).clamp(0, max_y) as u32;
            for (kx, &weight) in row.iter().enumerate() {
                if weight == 0.0 {
                    continue;
                }
                let sx = (x as i64 + kx as i64 - radius).clamp(0, max_x) as u32;
                for (a, &v) in acc.iter_mut().zip(source.get_pixel(sx, sy).channels()) {
                    *a += v as f32 * weight;
                }
            }
        }

        for (value, a) in pixel.channels_mut().iter_mut().zip(acc) {
            *value = to_u8(a / BLUR_DIVISOR);
        }
    }
    out
}

/// Colour channel `c` of `P` lines up with channel `c` of the RGBA smooth
/// image (luma was widened into R, G and B).
fn blend<P>(source: &Buffer<P>, smooth: &Rgba32FImage, factor: f32) -> Buffer<P>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = source.dimensions();
    let colour_channels = P::CHANNEL_COUNT as usize - usize::from(P::HAS_ALPHA);

    let mut out = source.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
            continue;
        }

        let soft = smooth.get_pixel(x, y).channels();
        for (value, s) in pixel
            .channels_mut()
            .iter_mut()
            .zip(soft)
            .take(colour_channels)
        {
            let s = s * 255.0;
            *value = to_u8(s + factor * (*value as f32 - s));
        }
    }
    out
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn flat_image_is_unchanged_by_blur_and_sharpen() {
        let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([120, 60, 30])));

        assert_eq!(blur(&flat), flat);
        assert_eq!(sharpen(&flat, SHARPEN_FACTOR), flat);
    }

    #[test]
    fn blur_spreads_a_single_bright_pixel() {
        let mut gray = GrayImage::from_pixel(9, 9, Luma([0]));
        gray.put_pixel(4, 4, Luma([160]));
        let blurred = blur(&DynamicImage::ImageLuma8(gray)).to_luma8();

        // The centre weight is zero, the ring picks it up at 160/16.
        assert_eq!(blurred.get_pixel(4, 4)[0], 0);
        assert_eq!(blurred.get_pixel(2, 2)[0], 10);
        assert_eq!(blurred.get_pixel(6, 4)[0], 10);
        assert_eq!(blurred.get_pixel(3, 4)[0], 0);
    }

    #[test]
    fn blur_clamps_at_the_edges() {
        let mut gray = GrayImage::from_pixel(4, 4, Luma([0]));
        gray.put_pixel(0, 0, Luma([160]));
        let blurred = blur(&DynamicImage::ImageLuma8(gray)).to_luma8();

        // The corner is sampled by the clamped ring five times: (5 * 160) / 16.
        assert_eq!(blurred.get_pixel(0, 0)[0], 50);
    }

    #[test]
    fn sharpen_increases_local_contrast() {
        let mut gray = GrayImage::from_pixel(5, 5, Luma([100]));
        gray.put_pixel(2, 2, Luma([150]));
        let sharpened = sharpen(&DynamicImage::ImageLuma8(gray), SHARPEN_FACTOR).to_luma8();

        // smooth = 1550 / 13, so 2 * 150 - 119.23 rounds to 181.
        assert_eq!(sharpened.get_pixel(2, 2)[0], 181);
        assert!(sharpened.get_pixel(1, 2)[0] < 100);
        // Border pixels keep their values.
        assert_eq!(sharpened.get_pixel(0, 2)[0], 100);
    }

    #[test]
    fn sharpen_leaves_alpha_untouched() {
        let source = RgbaImage::from_fn(5, 5, |x, y| {
            let alpha = if (x + y) % 2 == 0 { 255 } else { 40 };
            let value = if (x, y) == (2, 2) { 200 } else { 100 };
            Rgba([value, value, value, alpha])
        });
        let sharpened = sharpen(&DynamicImage::ImageRgba8(source.clone()), SHARPEN_FACTOR);

        let DynamicImage::ImageRgba8(sharpened) = sharpened else {
            panic!("expected an Rgba8 image");
        };
        for (before, after) in source.pixels().zip(sharpened.pixels()) {
            assert_eq!(before[3], after[3]);
        }
        assert!(sharpened.get_pixel(2, 2)[0] > 200);
    }

    #[test]
    fn tiny_images_pass_through_sharpen() {
        let tiny = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 1, Luma([77])));
        assert_eq!(sharpen(&tiny, SHARPEN_FACTOR), tiny);
    }

    #[test]
    fn colour_type_is_preserved() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 4])));
        assert!(matches!(blur(&rgba), DynamicImage::ImageRgba8(_)));

        let rgb16 = DynamicImage::ImageRgb16(ImageBuffer::from_pixel(3, 3, Rgb([1u16, 2, 3])));
        assert!(matches!(sharpen(&rgb16, SHARPEN_FACTOR), DynamicImage::ImageRgba8(_)));
    }
}
