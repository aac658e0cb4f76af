use std::iter::FusedIterator;

use serde::Serialize;

use crate::{
    config::FilterConfiguration,
    diagnostics::{Rejection, RejectionReason},
    error::{FigureError, Result},
    traits::{DiagnosticSink, ImageOps},
    types::{Contour, ImageDimensions, ImageRegion},
};

/// Douglas-Peucker epsilon as a fraction of the contour's open arc length
pub const APPROX_EPSILON_FRACTION: f64 = 0.01;

/// Absolute limits for one page, derived from the configuration fractions.
///
/// `min_area` is a fraction of the total pixel count while the box limits
/// are fractions of the page height and width respectively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtractionThresholds {
    pub min_area: f64,
    pub min_height: i32,
    pub max_height: i32,
    pub min_width: i32,
    pub max_width: i32,
}

impl ExtractionThresholds {
    pub fn new(config: &FilterConfiguration, dimensions: ImageDimensions) -> Self {
        // f64::round goes half away from zero
        let pixels = |fraction: f64, extent: u32| (fraction * f64::from(extent)).round() as i32;

        Self {
            min_area: config.min_area_fraction() * dimensions.pixel_count() as f64,
            min_height: pixels(config.min_height_fraction(), dimensions.height),
            max_height: pixels(config.max_height_fraction(), dimensions.height),
            min_width: pixels(config.min_width_fraction(), dimensions.width),
            max_width: pixels(config.max_width_fraction(), dimensions.width),
        }
    }

    /// Areas equal to the minimum pass
    pub fn accepts_area(&self, area: f64) -> bool {
        area >= self.min_area
    }

    /// Both bounds are inclusive on each axis
    pub fn accepts_size(&self, width: i32, height: i32) -> bool {
        !(width > self.max_width
            || width < self.min_width
            || height > self.max_height
            || height < self.min_height)
    }
}

/// Lazy, single-pass sequence of accepted regions.
///
/// Contours are examined in discovery order as the iterator is advanced;
/// rejected ones go to the diagnostic sink and are skipped.
pub struct Regions<'a, O: ?Sized, D: ?Sized> {
    ops: &'a O,
    diagnostics: &'a D,
    thresholds: ExtractionThresholds,
    contours: std::iter::Enumerate<std::vec::IntoIter<Contour>>,
    accepted: usize,
    rejected: usize,
    finished: bool,
}

impl<'a, O, D> Regions<'a, O, D>
where
    O: ImageOps + ?Sized,
    D: DiagnosticSink + ?Sized,
{
    pub fn new(ops: &'a O, diagnostics: &'a D, contours: Vec<Contour>, thresholds: ExtractionThresholds) -> Self {
        diagnostics.thresholds(&thresholds);

        Self {
            ops,
            diagnostics,
            thresholds,
            contours: contours.into_iter().enumerate(),
            accepted: 0,
            rejected: 0,
            finished: false,
        }
    }

    pub fn thresholds(&self) -> &ExtractionThresholds {
        &self.thresholds
    }

    fn reject(&mut self, contour_index: usize, reason: RejectionReason) {
        self.rejected += 1;
        self.diagnostics.rejected(&Rejection { contour_index, reason });
    }

    fn examine(&mut self, index: usize, contour: Contour) -> Option<Result<ImageRegion>> {
        let area = self.ops.contour_area(&contour);
        if !self.thresholds.accepts_area(area) {
            self.reject(index, RejectionReason::Area { area, min_area: self.thresholds.min_area });
            return None;
        }

        let epsilon = APPROX_EPSILON_FRACTION * self.ops.arc_length(&contour, false);
        let polygon = self.ops.approx_polygon(&contour, epsilon, false);

        let Some(bbox) = self.ops.bounding_rect(&polygon) else {
            return Some(Err(FigureError::InvalidRegion { x1: 0, y1: 0, x2: 0, y2: 0 }));
        };

        if !self.thresholds.accepts_size(bbox.width, bbox.height) {
            self.reject(index, RejectionReason::Size { bbox, limits: self.thresholds });
            return None;
        }

        self.accepted += 1;
        Some(ImageRegion::with_provenance(
            bbox.x,
            bbox.y,
            bbox.x + bbox.width,
            bbox.y + bbox.height,
            polygon,
            index,
        ))
    }
}

impl<O, D> Iterator for Regions<'_, O, D>
where
    O: ImageOps + ?Sized,
    D: DiagnosticSink + ?Sized,
{
    type Item = Result<ImageRegion>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, contour)) = self.contours.next() {
            if let Some(region) = self.examine(index, contour) {
                return Some(region);
            }
        }

        if !self.finished {
            self.finished = true;
            tracing::info!(
                accepted = self.accepted,
                rejected = self.rejected,
                min_area = self.thresholds.min_area,
                min_height = self.thresholds.min_height,
                max_height = self.thresholds.max_height,
                min_width = self.thresholds.min_width,
                max_width = self.thresholds.max_width,
                "contour filtering finished"
            );
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.contours.size_hint().1)
    }
}

impl<O, D> FusedIterator for Regions<'_, O, D>
where
    O: ImageOps + ?Sized,
    D: DiagnosticSink + ?Sized,
{
}

/// Turn contours into page regions, rejecting by area and box size
pub fn extract_regions<'a, O, D>(
    ops: &'a O,
    diagnostics: &'a D,
    contours: Vec<Contour>,
    dimensions: ImageDimensions,
    config: &FilterConfiguration,
) -> Regions<'a, O, D>
where
    O: ImageOps + ?Sized,
    D: DiagnosticSink + ?Sized,
{
    Regions::new(ops, diagnostics, contours, ExtractionThresholds::new(config, dimensions))
}
