use image::{GrayImage, Luma, Rgb, RgbImage};
use crate::{
    algorithms::{extraction, morphology, simplification, StructuringElement},
    error::Result,
    traits::ImageOps,
    types::{BoundingBox, ContourSet, Point},
};

/// Default backend built on `image`, `imageproc` and `geo`.
///
/// `imageproc`'s Canny uses a fixed 3x3 Sobel operator, so the aperture
/// size passed to [`ImageOps::detect_edges`] is not applied here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocOps;

impl ImageOps for ImageprocOps {
    /// BT.601 luma, the weighting OpenCV applies to scanned pages
    fn to_grayscale(&self, image: &RgbImage) -> Result<GrayImage> {
        Ok(imageproc::map::map_colors(image, |Rgb([r, g, b]): Rgb<u8>| {
            let luma = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000;
            Luma([luma as u8])
        }))
    }

    fn threshold(&self, image: &GrayImage, cutoff: u8) -> Result<GrayImage> {
        // imageproc keeps pixels strictly above its threshold
        Ok(match cutoff.checked_sub(1) {
            Some(below) => imageproc::contrast::threshold(image, below, imageproc::contrast::ThresholdType::Binary),
            None => GrayImage::from_pixel(image.width(), image.height(), Luma([255u8])),
        })
    }

    fn invert(&self, image: &GrayImage) -> Result<GrayImage> {
        let mut inverted = image.clone();
        image::imageops::invert(&mut inverted);
        Ok(inverted)
    }

    fn erode(&self, image: &GrayImage, element: &StructuringElement) -> Result<GrayImage> {
        Ok(morphology::erode(image, element))
    }

    fn dilate(&self, image: &GrayImage, element: &StructuringElement) -> Result<GrayImage> {
        Ok(morphology::dilate(image, element))
    }

    fn detect_edges(&self, image: &GrayImage, low: f32, high: f32, aperture_size: u32) -> Result<GrayImage> {
        tracing::trace!(aperture_size, "canny aperture is fixed at 3 in imageproc");
        Ok(imageproc::edges::canny(image, low, high))
    }

    fn find_contours(&self, mask: &GrayImage) -> Result<ContourSet> {
        Ok(extraction::trace_contours(mask))
    }

    fn approx_polygon(&self, contour: &[Point], epsilon: f64, closed: bool) -> Vec<Point> {
        simplification::approx_polygon(contour, epsilon, closed)
    }

    fn contour_area(&self, contour: &[Point]) -> f64 {
        simplification::contour_area(contour)
    }

    fn arc_length(&self, contour: &[Point], closed: bool) -> f64 {
        simplification::arc_length(contour, closed)
    }

    fn bounding_rect(&self, points: &[Point]) -> Option<BoundingBox> {
        simplification::bounding_rect(points)
    }
}
