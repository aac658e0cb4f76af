use std::collections::HashMap;

use image::GrayImage;
use crate::{
    error::Result,
    traits::ImageOps,
    types::{ContourSet, HierarchyEntry, Point},
};

/// Discover every contour of the mask, holes included, in discovery order
pub fn find_contours<O: ImageOps + ?Sized>(ops: &O, mask: &GrayImage) -> Result<ContourSet> {
    let contours = ops.find_contours(mask)?;
    tracing::debug!(count = contours.len(), "found contours");
    Ok(contours)
}

/// Trace all borders with imageproc and compress straight runs.
///
/// Nonzero pixels are foreground. Outer borders and hole borders are both
/// returned, each with its parent link.
pub fn trace_contours(mask: &GrayImage) -> ContourSet {
    let traced = imageproc::contours::find_contours::<i32>(mask);

    let parents: Vec<Option<usize>> = traced.iter().map(|contour| contour.parent).collect();
    let contours = traced
        .into_iter()
        .map(|contour| {
            let points: Vec<Point> = contour.points.iter().map(|p| [p.x, p.y]).collect();
            compress_chain(&points)
        })
        .collect();

    ContourSet {
        contours,
        hierarchy: build_hierarchy(&parents),
    }
}

/// Keep only the points where the boundary changes direction.
///
/// The chain is treated as closed, so the first point is kept only if the
/// direction changes there too.
pub fn compress_chain(points: &[Point]) -> Vec<Point> {
    let mut points = points.to_vec();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n < 3 {
        return points;
    }

    let step = |from: Point, to: Point| [(to[0] - from[0]).signum(), (to[1] - from[1]).signum()];

    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() { points[..1].to_vec() } else { kept }
}

/// Sibling and child links from each contour's parent.
///
/// Siblings are chained in discovery order; a parent's first child is the
/// earliest contour naming it.
pub fn build_hierarchy(parents: &[Option<usize>]) -> Vec<HierarchyEntry> {
    let mut entries = vec![HierarchyEntry::default(); parents.len()];
    let mut last_sibling: HashMap<Option<usize>, usize> = HashMap::new();

    for (i, &parent) in parents.iter().enumerate() {
        entries[i].parent = parent;

        match last_sibling.get(&parent) {
            Some(&previous) => {
                entries[previous].next = Some(i);
                entries[i].previous = Some(previous);
            }
            None => {
                if let Some(entry) = parent.and_then(|p| entries.get_mut(p)) {
                    entry.first_child = Some(i);
                }
            }
        }
        last_sibling.insert(parent, i);
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill(img: &mut GrayImage, x1: u32, y1: u32, x2: u32, y2: u32, value: u8) {
        for y in y1..y2 {
            for x in x1..x2 {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }

    #[test]
    fn test_compress_square_outline() {
        let mut outline = Vec::new();
        for x in 0..4 { outline.push([x, 0]); }
        for y in 0..4 { outline.push([4, y]); }
        for x in (1..=4).rev() { outline.push([x, 4]); }
        for y in (1..=4).rev() { outline.push([0, y]); }

        let compressed = compress_chain(&outline);
        assert_eq!(compressed, vec![[0, 0], [4, 0], [4, 4], [0, 4]]);
    }

    #[test]
    fn test_compress_keeps_short_chains() {
        assert_eq!(compress_chain(&[[1, 1]]), vec![[1, 1]]);
        assert_eq!(compress_chain(&[[1, 1], [2, 1]]), vec![[1, 1], [2, 1]]);
    }

    #[test]
    fn test_hierarchy_links() {
        // 0 and 3 are top level, 1 and 2 are children of 0
        let parents = [None, Some(0), Some(0), None];
        let hierarchy = build_hierarchy(&parents);

        assert_eq!(hierarchy[0], HierarchyEntry { next: Some(3), previous: None, first_child: Some(1), parent: None });
        assert_eq!(hierarchy[1], HierarchyEntry { next: Some(2), previous: None, first_child: None, parent: Some(0) });
        assert_eq!(hierarchy[2], HierarchyEntry { next: None, previous: Some(1), first_child: None, parent: Some(0) });
        assert_eq!(hierarchy[3], HierarchyEntry { next: None, previous: Some(0), first_child: None, parent: None });
    }

    #[test]
    fn test_trace_filled_square() {
        let mut img = GrayImage::new(20, 20);
        fill(&mut img, 5, 5, 15, 15, 255);

        let set = trace_contours(&img);
        assert_eq!(set.len(), 1);
        assert_eq!(set.hierarchy[0].parent, None);

        let mut corners = set.contours[0].clone();
        corners.sort();
        assert_eq!(corners, vec![[5, 5], [5, 14], [14, 5], [14, 14]]);
    }

    #[test]
    fn test_trace_reports_holes() {
        let mut img = GrayImage::new(30, 30);
        fill(&mut img, 5, 5, 25, 25, 255);
        fill(&mut img, 10, 10, 20, 20, 0);

        let set = trace_contours(&img);
        assert_eq!(set.len(), 2, "outer border and hole border");
        assert_eq!(set.hierarchy[0].first_child, Some(1));
        assert_eq!(set.hierarchy[1].parent, Some(0));
    }

    #[test]
    fn test_empty_mask_has_no_contours() {
        let set = trace_contours(&GrayImage::new(10, 10));
        assert!(set.is_empty());
        assert!(set.hierarchy.is_empty());
    }
}
