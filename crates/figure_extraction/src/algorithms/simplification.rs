use geo_types::{Coord, LineString, Polygon};
use crate::types::{BoundingBox, Point};

fn to_line_string(points: &[Point]) -> LineString<f64> {
    let coords: Vec<Coord<f64>> = points
        .iter()
        .map(|&[x, y]| Coord { x: f64::from(x), y: f64::from(y) })
        .collect();
    LineString::new(coords)
}

fn closed_line_string(points: &[Point]) -> LineString<f64> {
    let mut line = to_line_string(points);
    if let Some(first) = line.0.first().copied() {
        if line.0.last() != Some(&first) {
            line.0.push(first);
        }
    }
    line
}

/// Douglas-Peucker simplification using geo's implementation.
///
/// Open curves keep both endpoints. Closed curves are simplified as a ring
/// and returned without the repeated closing point.
pub fn approx_polygon(points: &[Point], epsilon: f64, closed: bool) -> Vec<Point> {
    use geo::Simplify;

    if points.len() < 3 || epsilon.is_nan() || epsilon <= 0.0 {
        return points.to_vec();
    }

    let line = if closed { closed_line_string(points) } else { to_line_string(points) };
    let mut simplified: Vec<Point> = line
        .simplify(&epsilon)
        .coords()
        .map(|coord| [coord.x.round() as i32, coord.y.round() as i32])
        .collect();

    if closed && simplified.len() > 1 && simplified.first() == simplified.last() {
        simplified.pop();
    }
    simplified
}

/// Unsigned shoelace area of the ring through `points`
pub fn contour_area(points: &[Point]) -> f64 {
    use geo::Area;

    if points.len() < 3 {
        return 0.0;
    }
    Polygon::new(to_line_string(points), vec![]).unsigned_area()
}

/// Total segment length; `closed` adds the segment back to the first point
pub fn arc_length(points: &[Point], closed: bool) -> f64 {
    use geo::EuclideanLength;

    let line = if closed { closed_line_string(points) } else { to_line_string(points) };
    line.euclidean_length()
}

/// Upright box around `points`, counting pixels inclusively so a single
/// point has width and height 1
pub fn bounding_rect(points: &[Point]) -> Option<BoundingBox> {
    use geo::BoundingRect;

    let coords: Vec<Coord<i32>> = points.iter().map(|&[x, y]| Coord { x, y }).collect();
    let rect = LineString::new(coords).bounding_rect()?;

    Some(BoundingBox {
        x: rect.min().x,
        y: rect.min().y,
        width: rect.width() + 1,
        height: rect.height() + 1,
    })
}
