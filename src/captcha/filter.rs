//! Module with the final touches applied to CAPTCHA images.

use image::{imageops, Rgb, RgbImage};
use image::imageops::FilterType;


/// Weights of the smoothing kernel, row by row.
const SMOOTH_KERNEL: [u32; 9] = [1, 1, 1,
                                 1, 5, 1,
                                 1, 1, 1];
const SMOOTH_SCALE: u32 = 13;

/// Filter used whenever the canvas needs resizing.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;


/// Blur the image slightly with a fixed 3x3 kernel.
///
/// The one pixel wide border is copied over unfiltered.
pub fn smooth(img: &RgbImage) -> RgbImage {
    let (width, height) = img.dimensions();

    RgbImage::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
            return *img.get_pixel(x, y);
        }
        let mut acc = [0u32; 3];
        for (i, &weight) in SMOOTH_KERNEL.iter().enumerate() {
            let px = img.get_pixel(x + (i % 3) as u32 - 1, y + (i / 3) as u32 - 1);
            for (a, &c) in acc.iter_mut().zip(px.0.iter()) {
                *a += c as u32 * weight;
            }
        }
        Rgb(acc.map(|a| ((a + SMOOTH_SCALE / 2) / SMOOTH_SCALE) as u8))
    })
}

/// Resize the image to exactly given dimensions, disregarding its aspect ratio.
#[inline]
pub fn squeeze(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    imageops::resize(img, width, height, RESIZE_FILTER)
}


#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use spectral::prelude::*;
    use super::{smooth, squeeze};

    #[test]
    fn smoothing_keeps_flat_image() {
        let img = RgbImage::from_pixel(7, 5, Rgb([240, 100, 3]));
        assert_that!(smooth(&img)).is_equal_to(img);
    }

    #[test]
    fn smoothing_spreads_a_dot() {
        let mut img = RgbImage::from_pixel(5, 5, Rgb([0, 0, 0]));
        img.put_pixel(2, 2, Rgb([130, 130, 130]));
        let smoothed = smooth(&img);
        assert_that!(smoothed.get_pixel(2, 2).0[0]).is_equal_to(50);
        assert_that!(smoothed.get_pixel(1, 1).0[0]).is_equal_to(10);
        assert_that!(smoothed.get_pixel(4, 4).0[0]).is_equal_to(0);
    }

    #[test]
    fn border_is_left_alone() {
        let mut img = RgbImage::from_pixel(4, 3, Rgb([0, 0, 0]));
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(0, 2, Rgb([0, 0, 255]));
        img.put_pixel(1, 1, Rgb([130, 130, 130]));
        let smoothed = smooth(&img);
        assert_that!(*smoothed.get_pixel(0, 0)).is_equal_to(Rgb([255, 0, 0]));
        assert_that!(*smoothed.get_pixel(0, 2)).is_equal_to(Rgb([0, 0, 255]));
        // The neighboring dot doesn't bleed into the border.
        assert_that!(*smoothed.get_pixel(0, 1)).is_equal_to(Rgb([0, 0, 0]));
        assert_that!(*smoothed.get_pixel(2, 1)).is_equal_to(Rgb([10, 10, 10]));
    }

    #[test]
    fn squeeze_to_exact_size() {
        let img = RgbImage::from_pixel(240, 60, Rgb([1, 2, 3]));
        let squeezed = squeeze(&img, 160, 60);
        assert_that!(squeezed.dimensions()).is_equal_to((160, 60));
        assert_that!(*squeezed.get_pixel(80, 30)).is_equal_to(Rgb([1, 2, 3]));
    }
}
