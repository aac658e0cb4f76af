//! # Figure Extraction Library
//!
//! Finds rectangular figure regions (illustrations, diagrams, photos) on
//! scanned document pages.
//!
//! ## Pipeline
//!
//! 1. **Filter**: grayscale, threshold at 192 and invert, optional erosion,
//!    optional dilation, optional Canny edges.
//! 2. **Contours**: every border of the mask, holes included, with hierarchy.
//! 3. **Geometry**: area check, Douglas-Peucker simplification, bounding box,
//!    height/width envelope check.
//!
//! Accepted boxes come out lazily in contour discovery order. Rejected
//! contours are reported to a [`DiagnosticSink`] instead.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use figure_extraction::{FigureExtractor, FilterConfiguration, KernelShape};
//!
//! let config = FilterConfiguration::new(KernelShape::Rectangle, KernelShape::Ellipse);
//! let extractor = FigureExtractor::new(config);
//!
//! let page = image::open("page.png")?.to_rgb8();
//! for region in extractor.find_figures(&page)? {
//!     let region = region?;
//!     println!("figure at {}", region);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Options
//!
//! ```rust
//! use figure_extraction::{FigureExtractor, FilterOptions};
//!
//! let options = FilterOptions::from_json(
//!     r#"{"erosion_element": "cross", "dilation_element": "rectangle", "min_area": 0.02}"#,
//! )?;
//! let extractor = FigureExtractor::from_options(options)?;
//! assert_eq!(extractor.config().min_area_fraction(), 0.02);
//! # Ok::<(), figure_extraction::FigureError>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod config;
pub mod traits;
pub mod diagnostics;
pub mod algorithms;
pub mod ops;
pub mod pipeline;

// Re-exports for convenience
pub use error::{FigureError, Result};
pub use types::{BoundingBox, Contour, ContourSet, HierarchyEntry, ImageDimensions, ImageRegion, ImageSlice, Point};
pub use config::{FilterConfiguration, FilterConfigurationBuilder, FilterOptions, KernelShape};
pub use traits::*;
pub use diagnostics::{NoopDiagnostics, RecordingDiagnostics, Rejection, RejectionReason, TracingDiagnostics};
pub use algorithms::{ExtractionThresholds, Regions, StructuringElement};
pub use ops::ImageprocOps;
pub use pipeline::{FigureExtractor, builder::FigureExtractorBuilder};

use image::RgbImage;

/// Run the whole pipeline with the default backend and `tracing` diagnostics
pub fn find_figures(
    source: &RgbImage,
    config: &FilterConfiguration,
) -> Result<Regions<'static, ImageprocOps, TracingDiagnostics>> {
    static OPS: ImageprocOps = ImageprocOps;
    static DIAGNOSTICS: TracingDiagnostics = TracingDiagnostics;

    let mask = algorithms::filter_image(&OPS, source, config)?;
    let contours = algorithms::find_contours(&OPS, &mask)?;
    Ok(algorithms::extract_regions(
        &OPS,
        &DIAGNOSTICS,
        contours.contours,
        ImageDimensions::from(source),
        config,
    ))
}
