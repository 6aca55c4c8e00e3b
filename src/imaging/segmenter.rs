//! The seam between the app and whatever model does the matting

use image::{DynamicImage, GrayImage, RgbaImage};

use crate::error::Result;

/// A background-removal model consumed as a black box
///
/// `remove` takes a decoded image and returns one with the same pixel
/// dimensions and background pixels made transparent. It is a blocking call
/// and may take seconds; callers run it off the UI thread.
pub trait Segmenter: Send + Sync {
    fn remove(&self, image: &DynamicImage) -> Result<DynamicImage>;
}

/// Composite `image` over transparent black through an 8-bit mask
///
/// Every channel is weighted by the mask, colour included, so soft edges
/// fade towards black as well as towards transparent. Existing alpha is
/// multiplied too and already-transparent pixels stay transparent. The mask
/// must match the image dimensions.
pub fn apply_mask(image: &DynamicImage, mask: &GrayImage) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    for (pixel, mask_pixel) in rgba.pixels_mut().zip(mask.pixels()) {
        let weight = u32::from(mask_pixel[0]);
        for channel in pixel.0.iter_mut() {
            *channel = ((u32::from(*channel) * weight + 127) / 255) as u8;
        }
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage, Rgba};

    #[test]
    fn test_apply_mask_sets_alpha() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, Rgb([10, 20, 30])));
        let mut mask = GrayImage::from_pixel(4, 2, Luma([0]));
        mask.put_pixel(1, 0, Luma([255]));
        mask.put_pixel(2, 1, Luma([128]));

        let result = apply_mask(&image, &mask);

        assert_eq!(result.dimensions(), (4, 2));
        assert_eq!(*result.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*result.get_pixel(1, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(result.get_pixel(2, 1)[3], 128);
    }

    #[test]
    fn test_apply_mask_darkens_soft_edges() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 1, Rgb([200, 100, 51])));
        let mut mask = GrayImage::from_pixel(2, 1, Luma([128]));
        mask.put_pixel(1, 0, Luma([51]));

        let result = apply_mask(&image, &mask);

        assert_eq!(*result.get_pixel(0, 0), Rgba([100, 50, 26, 128]));
        assert_eq!(*result.get_pixel(1, 0), Rgba([40, 20, 10, 51]));
    }

    #[test]
    fn test_apply_mask_keeps_existing_transparency() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 0])));
        let mask = GrayImage::from_pixel(1, 1, Luma([255]));

        let result = apply_mask(&image, &mask);

        assert_eq!(result.get_pixel(0, 0)[3], 0);
    }
}
