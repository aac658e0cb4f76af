use image::{GrayImage, Luma};
use serde::Serialize;

use crate::config::KernelShape;

/// Binary probe used by erosion and dilation.
///
/// Geometry follows OpenCV's `getStructuringElement`: a `size x size` box
/// with the anchor at `(size / 2, size / 2)`, so even sizes sit one pixel
/// off-centre towards the bottom right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuringElement {
    shape: KernelShape,
    size: u32,
    /// Row-major membership, `size * size` entries
    cells: Vec<bool>,
}

impl StructuringElement {
    pub fn new(shape: KernelShape, size: u32) -> Self {
        let size = size.max(1);
        // A 1x1 element is a single pixel whatever the shape
        let shape_for_cells = if size == 1 { KernelShape::Rectangle } else { shape };

        let s = size as i32;
        let anchor = s / 2;
        let mut cells = vec![false; (size * size) as usize];

        // Ellipse radii, with r == 0 giving a flat row
        let r = s / 2;
        let c = s / 2;
        let inv_r2 = if r > 0 { 1.0 / f64::from(r * r) } else { 0.0 };

        for i in 0..s {
            let (j1, j2) = match shape_for_cells {
                KernelShape::Rectangle => (0, s),
                KernelShape::Cross if i == anchor => (0, s),
                KernelShape::Cross => (anchor, anchor + 1),
                KernelShape::Ellipse => {
                    let dy = i - r;
                    if dy.abs() <= r {
                        let dx = (f64::from(c) * (f64::from(r * r - dy * dy) * inv_r2).sqrt()).round() as i32;
                        ((c - dx).max(0), (c + dx + 1).min(s))
                    } else {
                        (0, 0)
                    }
                }
            };

            for j in j1..j2 {
                cells[(i * s + j) as usize] = true;
            }
        }

        Self { shape, size, cells }
    }

    pub fn shape(&self) -> KernelShape {
        self.shape
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn anchor(&self) -> (u32, u32) {
        (self.size / 2, self.size / 2)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.size && y < self.size && self.cells[(y * self.size + x) as usize]
    }

    /// Member cells as `(dx, dy)` offsets from the anchor
    pub fn offsets(&self) -> Vec<(i32, i32)> {
        let (ax, ay) = self.anchor();
        (0..self.size)
            .flat_map(|y| (0..self.size).map(move |x| (x, y)))
            .filter(|&(x, y)| self.contains(x, y))
            .map(|(x, y)| (x as i32 - ax as i32, y as i32 - ay as i32))
            .collect()
    }
}

/// Minimum over the element neighbourhood. Pixels outside the image are ignored.
pub fn erode(image: &GrayImage, element: &StructuringElement) -> GrayImage {
    morph(image, element, u8::MAX, u8::min)
}

/// Maximum over the element neighbourhood. Pixels outside the image are ignored.
pub fn dilate(image: &GrayImage, element: &StructuringElement) -> GrayImage {
    morph(image, element, u8::MIN, u8::max)
}

fn morph(image: &GrayImage, element: &StructuringElement, identity: u8, combine: fn(u8, u8) -> u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let offsets = element.offsets();

    GrayImage::from_fn(width, height, |x, y| {
        let value = offsets.iter().fold(identity, |acc, &(dx, dy)| {
            let sx = x as i64 + i64::from(dx);
            let sy = y as i64 + i64::from(dy);
            if sx < 0 || sy < 0 || sx >= i64::from(width) || sy >= i64::from(height) {
                acc
            } else {
                combine(acc, image.get_pixel(sx as u32, sy as u32)[0])
            }
        });
        Luma([value])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(element: &StructuringElement) -> Vec<String> {
        (0..element.size())
            .map(|y| {
                (0..element.size())
                    .map(|x| if element.contains(x, y) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_rectangle_element() {
        let element = StructuringElement::new(KernelShape::Rectangle, 3);
        assert_eq!(rows(&element), vec!["###", "###", "###"]);
        assert_eq!(element.offsets().len(), 9);
    }

    #[test]
    fn test_cross_element_even_size() {
        let element = StructuringElement::new(KernelShape::Cross, 4);
        assert_eq!(rows(&element), vec!["..#.", "..#.", "####", "..#."]);
        assert_eq!(element.anchor(), (2, 2));
    }

    #[test]
    fn test_ellipse_element() {
        let four = StructuringElement::new(KernelShape::Ellipse, 4);
        assert_eq!(rows(&four), vec!["..#.", "####", "####", "####"]);

        let five = StructuringElement::new(KernelShape::Ellipse, 5);
        assert_eq!(rows(&five), vec!["..#..", "#####", "#####", "#####", "..#.."]);
    }

    #[test]
    fn test_single_pixel_element() {
        let element = StructuringElement::new(KernelShape::Cross, 1);
        assert_eq!(element.offsets(), vec![(0, 0)]);
    }

    fn square_image() -> GrayImage {
        let mut img = GrayImage::new(20, 20);
        for y in 5..15 {
            for x in 5..15 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        img
    }

    fn foreground_bounds(img: &GrayImage) -> (u32, u32, u32, u32) {
        let mut bounds = (u32::MAX, u32::MAX, 0, 0);
        for (x, y, p) in img.enumerate_pixels() {
            if p[0] > 0 {
                bounds.0 = bounds.0.min(x);
                bounds.1 = bounds.1.min(y);
                bounds.2 = bounds.2.max(x);
                bounds.3 = bounds.3.max(y);
            }
        }
        bounds
    }

    #[test]
    fn test_erode_shrinks_around_anchor() {
        let element = StructuringElement::new(KernelShape::Rectangle, 4);
        let eroded = erode(&square_image(), &element);
        // Offsets span -2..=1, so two pixels go from the top/left and one from the bottom/right
        assert_eq!(foreground_bounds(&eroded), (7, 7, 13, 13));
    }

    #[test]
    fn test_dilate_grows_around_anchor() {
        let element = StructuringElement::new(KernelShape::Rectangle, 4);
        let dilated = dilate(&square_image(), &element);
        assert_eq!(foreground_bounds(&dilated), (4, 4, 16, 16));
    }

    #[test]
    fn test_erode_ignores_outside_pixels() {
        let img = GrayImage::from_pixel(6, 6, Luma([255u8]));
        let element = StructuringElement::new(KernelShape::Rectangle, 3);
        let eroded = erode(&img, &element);
        assert!(eroded.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_erode_removes_thin_lines() {
        let mut img = GrayImage::new(20, 20);
        for x in 2..18 {
            img.put_pixel(x, 10, Luma([255u8]));
        }
        let element = StructuringElement::new(KernelShape::Ellipse, 4);
        let eroded = erode(&img, &element);
        assert!(eroded.pixels().all(|p| p[0] == 0));
    }
}
