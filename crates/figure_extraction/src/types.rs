use std::fmt;
use std::ops::Range;

use image::{RgbImage, SubImage};
use serde::{Deserialize, Serialize};

use crate::error::{FigureError, Result};

/// Integer pixel coordinate `[x, y]`
pub type Point = [i32; 2];

/// An ordered boundary point sequence, as traced from a binary mask
pub type Contour = Vec<Point>;

/// A rectangular figure candidate found on a page.
///
/// Regions are immutable once built. Equality compares the rectangle and the
/// polygon only; `contour_index` is provenance and never takes part in it.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRegion {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    /// Simplified contour boundary that produced this box
    polygon: Option<Vec<Point>>,
    /// Which discovered contour produced this box
    contour_index: Option<usize>,
}

impl ImageRegion {
    /// Create a bare rectangle. Fails with `InvalidRegion` unless `x1 < x2` and `y1 < y2`.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self> {
        if x1 >= x2 || y1 >= y2 {
            return Err(FigureError::InvalidRegion { x1, y1, x2, y2 });
        }

        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            polygon: None,
            contour_index: None,
        })
    }

    /// Create a rectangle carrying the polygon and contour it came from
    pub fn with_provenance(
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        polygon: Vec<Point>,
        contour_index: usize,
    ) -> Result<Self> {
        let mut region = Self::new(x1, y1, x2, y2)?;
        region.polygon = Some(polygon);
        region.contour_index = Some(contour_index);
        Ok(region)
    }

    pub fn x1(&self) -> i32 {
        self.x1
    }

    pub fn y1(&self) -> i32 {
        self.y1
    }

    pub fn x2(&self) -> i32 {
        self.x2
    }

    pub fn y2(&self) -> i32 {
        self.y2
    }

    pub fn width(&self) -> u32 {
        self.x2.abs_diff(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.abs_diff(self.y1)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn polygon(&self) -> Option<&[Point]> {
        self.polygon.as_deref()
    }

    pub fn contour_index(&self) -> Option<usize> {
        self.contour_index
    }

    /// Pixel index ranges covered by this region, rows first
    pub fn image_slice(&self) -> ImageSlice {
        ImageSlice {
            rows: self.y1..self.y2,
            cols: self.x1..self.x2,
        }
    }

    /// Borrowing view of the region within `image`, clipped to the image bounds.
    ///
    /// Returns `None` when the region lies entirely outside the image.
    pub fn crop<'a>(&self, image: &'a RgbImage) -> Option<SubImage<&'a RgbImage>> {
        let slice = self.image_slice();
        let clamp = |v: i32, max: u32| v.clamp(0, max as i32) as u32;

        let x1 = clamp(slice.cols.start, image.width());
        let x2 = clamp(slice.cols.end, image.width());
        let y1 = clamp(slice.rows.start, image.height());
        let y2 = clamp(slice.rows.end, image.height());

        if x1 >= x2 || y1 >= y2 {
            return None;
        }

        Some(image::imageops::crop_imm(image, x1, y1, x2 - x1, y2 - y1))
    }
}

impl PartialEq for ImageRegion {
    fn eq(&self, other: &Self) -> bool {
        self.x1 == other.x1
            && self.y1 == other.y1
            && self.x2 == other.x2
            && self.y2 == other.y2
            && self.polygon == other.polygon
    }
}

impl Eq for ImageRegion {}

impl fmt::Display for ImageRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})-({}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Half-open row and column ranges `[y1, y2) x [x1, x2)` of a region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlice {
    pub rows: Range<i32>,
    pub cols: Range<i32>,
}

/// Axis-aligned box in `(x, y, width, height)` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {})",
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height
        )
    }
}

/// Topology links of one contour. `None` stands for "no such contour".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HierarchyEntry {
    pub next: Option<usize>,
    pub previous: Option<usize>,
    pub first_child: Option<usize>,
    pub parent: Option<usize>,
}

/// Contours in discovery order with their parallel hierarchy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContourSet {
    pub contours: Vec<Contour>,
    pub hierarchy: Vec<HierarchyEntry>,
}

impl ContourSet {
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

/// Page dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl From<&RgbImage> for ImageDimensions {
    fn from(image: &RgbImage) -> Self {
        Self::new(image.width(), image.height())
    }
}
