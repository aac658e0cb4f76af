pub mod builder;

use image::{GrayImage, RgbImage};
use crate::{
    algorithms::{self, ExtractionThresholds, Regions},
    config::{FilterConfiguration, FilterOptions},
    diagnostics::TracingDiagnostics,
    error::Result,
    ops::ImageprocOps,
    traits::{DiagnosticSink, ImageOps},
    types::{Contour, ContourSet, ImageDimensions},
};

/// Figure extraction pipeline: filter, trace contours, filter geometry.
///
/// The extractor is read-only once built and can be shared between threads
/// working on different pages.
#[derive(Debug, Clone)]
pub struct FigureExtractor<O = ImageprocOps, D = TracingDiagnostics> {
    config: FilterConfiguration,
    ops: O,
    diagnostics: D,
}

impl FigureExtractor {
    /// Extractor with the default backend, reporting rejections through `tracing`
    pub fn new(config: FilterConfiguration) -> Self {
        Self::from_parts(config, ImageprocOps, TracingDiagnostics)
    }

    pub fn builder(config: FilterConfiguration) -> builder::FigureExtractorBuilder {
        builder::FigureExtractorBuilder::new(config)
    }

    /// Validate caller-supplied options and build a default extractor from them
    pub fn from_options(options: FilterOptions) -> Result<Self> {
        Ok(Self::new(FilterConfiguration::try_from(options)?))
    }
}

impl<O, D> FigureExtractor<O, D>
where
    O: ImageOps,
    D: DiagnosticSink,
{
    pub fn from_parts(config: FilterConfiguration, ops: O, diagnostics: D) -> Self {
        Self {
            config,
            ops,
            diagnostics,
        }
    }

    pub fn config(&self) -> &FilterConfiguration {
        &self.config
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Stage 1: binary mask of figure candidates
    pub fn filter_image(&self, source: &RgbImage) -> Result<GrayImage> {
        algorithms::filter_image(&self.ops, source, &self.config)
    }

    /// Stage 2: contours of the mask with their hierarchy
    pub fn find_contours(&self, mask: &GrayImage) -> Result<ContourSet> {
        algorithms::find_contours(&self.ops, mask)
    }

    /// Pixel limits this extractor applies to a page of the given size
    pub fn thresholds(&self, dimensions: ImageDimensions) -> ExtractionThresholds {
        ExtractionThresholds::new(&self.config, dimensions)
    }

    /// Stage 3: accepted regions, produced lazily in contour order
    pub fn regions_from_contours(&self, contours: Vec<Contour>, dimensions: ImageDimensions) -> Regions<'_, O, D> {
        algorithms::extract_regions(&self.ops, &self.diagnostics, contours, dimensions, &self.config)
    }

    /// Run all three stages on one page.
    ///
    /// Filtering and contour tracing happen eagerly so their errors surface
    /// here; the geometry stage runs as the returned iterator is consumed.
    pub fn find_figures(&self, source: &RgbImage) -> Result<Regions<'_, O, D>> {
        let dimensions = ImageDimensions::from(source);
        tracing::debug!(width = dimensions.width, height = dimensions.height, "finding figures");

        let mask = self.filter_image(source)?;
        let contours = self.find_contours(&mask)?;
        Ok(self.regions_from_contours(contours.contours, dimensions))
    }

    /// Get information about the extractor configuration
    pub fn info(&self) -> String {
        format!(
            "FigureExtractor: erode {}x{} {}, dilate {}x{} {}, canny {}, min area {}, height {}-{}, width {}-{}",
            self.config.erosion_size(),
            self.config.erosion_size(),
            self.config.erosion_shape(),
            self.config.dilation_size(),
            self.config.dilation_size(),
            self.config.dilation_shape(),
            self.config.edge_detection_threshold(),
            self.config.min_area_fraction(),
            self.config.min_height_fraction(),
            self.config.max_height_fraction(),
            self.config.min_width_fraction(),
            self.config.max_width_fraction(),
        )
    }
}
