use image::{GrayImage, RgbImage};
use crate::{
    algorithms::morphology::StructuringElement,
    config::FilterConfiguration,
    error::{FigureError, Result},
    traits::ImageOps,
};

/// Intensity at or above which a pixel counts as paper
pub const LUMINANCE_CUTOFF: u8 = 192;

/// Canny high threshold as a multiple of the configured low threshold
pub const EDGE_THRESHOLD_RATIO: f32 = 3.0;

/// Sobel aperture handed to the edge detector
pub const EDGE_APERTURE_SIZE: u32 = 12;

/// Turn a color page into a binary mask where dark ink and graphics are foreground.
///
/// Steps always run in this order, each one skippable by configuration:
/// grayscale, threshold + invert, erode, dilate, edge detection.
pub fn filter_image<O: ImageOps + ?Sized>(
    ops: &O,
    source: &RgbImage,
    config: &FilterConfiguration,
) -> Result<GrayImage> {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(FigureError::InvalidImage { width, height });
    }

    let gray = ops.to_grayscale(source)?;
    let binary = ops.threshold(&gray, LUMINANCE_CUTOFF)?;
    let mut mask = ops.invert(&binary)?;

    if config.erosion_size() > 0 {
        let element = StructuringElement::new(config.erosion_shape(), config.erosion_size());
        tracing::debug!(shape = %element.shape(), size = element.size(), "eroding mask");
        mask = ops.erode(&mask, &element)?;
    }

    if config.dilation_size() > 0 {
        let element = StructuringElement::new(config.dilation_shape(), config.dilation_size());
        tracing::debug!(shape = %element.shape(), size = element.size(), "dilating mask");
        mask = ops.dilate(&mask, &element)?;
    }

    let low = config.edge_detection_threshold();
    if low > 0.0 {
        tracing::debug!(low, high = low * EDGE_THRESHOLD_RATIO, "detecting edges");
        mask = ops.detect_edges(&mask, low, low * EDGE_THRESHOLD_RATIO, EDGE_APERTURE_SIZE)?;
    }

    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::KernelShape, ops::ImageprocOps};
    use image::Rgb;

    fn page_with_block(width: u32, height: u32, block: (u32, u32, u32, u32), ink: u8) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let (x1, y1, x2, y2) = block;
        for y in y1..y2 {
            for x in x1..x2 {
                img.put_pixel(x, y, Rgb([ink, ink, ink]));
            }
        }
        img
    }

    fn plain_config() -> FilterConfiguration {
        FilterConfiguration::builder(KernelShape::Rectangle, KernelShape::Rectangle)
            .erosion(KernelShape::Rectangle, 0)
            .dilation(KernelShape::Rectangle, 0)
            .build()
            .expect("valid config")
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let img = RgbImage::new(0, 10);
        let err = filter_image(&ImageprocOps, &img, &plain_config()).unwrap_err();
        assert!(matches!(err, FigureError::InvalidImage { width: 0, height: 10 }));
    }

    #[test]
    fn test_dark_pixels_become_foreground() {
        let img = page_with_block(30, 30, (10, 10, 20, 20), 0);
        let mask = filter_image(&ImageprocOps, &img, &plain_config()).expect("filters");

        assert_eq!(mask.dimensions(), (30, 30));
        assert_eq!(mask.get_pixel(15, 15)[0], 255);
        assert_eq!(mask.get_pixel(2, 2)[0], 0);
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_saturated_colors_become_foreground() {
        // Cyan and green stay below the cutoff under BT.601 weights
        for color in [Rgb([0, 255, 255]), Rgb([0, 255, 0])] {
            let mut img = RgbImage::from_pixel(40, 40, Rgb([255, 255, 255]));
            for y in 10..30 {
                for x in 10..30 {
                    img.put_pixel(x, y, color);
                }
            }

            let mask = filter_image(&ImageprocOps, &img, &plain_config()).expect("filters");
            assert_eq!(mask.get_pixel(20, 20)[0], 255, "{:?} block is ink", color);
            assert_eq!(mask.get_pixel(2, 2)[0], 0);
        }
    }

    #[test]
    fn test_cutoff_is_inclusive_for_paper() {
        let at_cutoff = page_with_block(10, 10, (0, 0, 5, 10), LUMINANCE_CUTOFF);
        let mask = filter_image(&ImageprocOps, &at_cutoff, &plain_config()).expect("filters");
        assert_eq!(mask.get_pixel(2, 2)[0], 0, "cutoff intensity counts as paper");

        let below = page_with_block(10, 10, (0, 0, 5, 10), LUMINANCE_CUTOFF - 1);
        let mask = filter_image(&ImageprocOps, &below, &plain_config()).expect("filters");
        assert_eq!(mask.get_pixel(2, 2)[0], 255);
    }

    #[test]
    fn test_plain_filtering_is_repeatable() {
        let img = page_with_block(40, 30, (5, 5, 25, 20), 40);
        let config = plain_config();

        let first = filter_image(&ImageprocOps, &img, &config).expect("filters");
        let second = filter_image(&ImageprocOps, &img, &config).expect("filters");
        assert_eq!(first, second);
    }

    #[test]
    fn test_erosion_removes_specks_dilation_restores_blocks() {
        let mut img = page_with_block(60, 60, (20, 20, 40, 40), 0);
        img.put_pixel(5, 5, Rgb([0, 0, 0]));

        let config = FilterConfiguration::new(KernelShape::Rectangle, KernelShape::Rectangle);
        let mask = filter_image(&ImageprocOps, &img, &config).expect("filters");

        assert_eq!(mask.get_pixel(5, 5)[0], 0, "speck removed by erosion");
        assert_eq!(mask.get_pixel(30, 30)[0], 255, "block survives");
        assert_eq!(mask.get_pixel(20, 20)[0], 0, "top-left corner shifts by one pixel");
        assert_eq!(mask.get_pixel(40, 40)[0], 255, "bottom-right corner grows by one pixel");
    }

    #[test]
    fn test_edge_detection_outlines_blocks() {
        let img = page_with_block(60, 60, (20, 20, 40, 40), 0);
        let config = FilterConfiguration::builder(KernelShape::Rectangle, KernelShape::Rectangle)
            .erosion(KernelShape::Rectangle, 0)
            .dilation(KernelShape::Rectangle, 0)
            .edge_detection_threshold(50.0)
            .build()
            .expect("valid config");

        let mask = filter_image(&ImageprocOps, &img, &config).expect("filters");
        assert_eq!(mask.get_pixel(30, 30)[0], 0, "interior is not an edge");
        assert_eq!(mask.get_pixel(5, 5)[0], 0, "background is not an edge");
        assert!(mask.pixels().any(|p| p[0] == 255), "block boundary is an edge");
    }
}
