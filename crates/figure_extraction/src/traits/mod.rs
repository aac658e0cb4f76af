use image::{GrayImage, RgbImage};
use crate::{
    algorithms::{ExtractionThresholds, StructuringElement},
    diagnostics::Rejection,
    error::Result,
    types::{BoundingBox, ContourSet, Point},
};

/// Vision primitives the extraction pipeline is built on.
///
/// The pipeline only talks to this trait, so a different backend can be
/// swapped in without touching the stages.
pub trait ImageOps: Send + Sync {
    /// Single-channel intensity image
    fn to_grayscale(&self, image: &RgbImage) -> Result<GrayImage>;

    /// Pixels at or above `cutoff` become 255, everything else 0
    fn threshold(&self, image: &GrayImage, cutoff: u8) -> Result<GrayImage>;

    /// Swap foreground and background
    fn invert(&self, image: &GrayImage) -> Result<GrayImage>;

    fn erode(&self, image: &GrayImage, element: &StructuringElement) -> Result<GrayImage>;

    fn dilate(&self, image: &GrayImage, element: &StructuringElement) -> Result<GrayImage>;

    /// Canny edges with hysteresis thresholds `low`/`high`
    fn detect_edges(&self, image: &GrayImage, low: f32, high: f32, aperture_size: u32) -> Result<GrayImage>;

    /// Every border in the mask, outer and hole, with hierarchy and
    /// straight runs compressed to their endpoints
    fn find_contours(&self, mask: &GrayImage) -> Result<ContourSet>;

    /// Douglas-Peucker simplification
    fn approx_polygon(&self, contour: &[Point], epsilon: f64, closed: bool) -> Vec<Point>;

    /// Unsigned area enclosed by the contour
    fn contour_area(&self, contour: &[Point]) -> f64;

    fn arc_length(&self, contour: &[Point], closed: bool) -> f64;

    /// Smallest upright box containing every point, `None` for no points
    fn bounding_rect(&self, points: &[Point]) -> Option<BoundingBox>;
}

/// Receiver for per-image threshold summaries and per-contour rejections
pub trait DiagnosticSink: Send + Sync {
    /// Called once per image before any contour is examined
    fn thresholds(&self, _thresholds: &ExtractionThresholds) {}

    fn rejected(&self, rejection: &Rejection);
}
