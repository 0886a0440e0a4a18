use std::sync::Arc;

use image::GrayImage;
use imageproc::geometry::oriented_contour_area;
use imageproc::point::Point;

use crate::models::{CandidateQuad, CardGeometry, Contour};

/// Douglas-Peucker tolerance as a fraction of the contour perimeter.
pub const APPROX_EPSILON_RATIO: f64 = 0.02;

/// Rows of slack when picking the topmost corner of a nearly level edge.
pub const TOP_ROW_TOLERANCE: i32 = 3;

/// Simplify a contour and return its four corners if it is a quadrilateral.
///
/// Corners start at the topmost vertex and run counter-clockwise as seen
/// on screen.
pub fn approximate_quad(contour: &Contour) -> Option<[Point<i32>; 4]> {
    let epsilon = APPROX_EPSILON_RATIO * contour.perimeter();
    let approx = approximate_closed_polygon(&contour.points, epsilon);
    let corners: [Point<i32>; 4] = approx.try_into().ok()?;
    Some(order_corners(corners))
}

/// Keep contours that simplify to four vertices and whose area lies
/// strictly between `min_area` and `max_area`.
pub fn filter_card_quads(
    contours: &[Contour],
    frame: &Arc<GrayImage>,
    min_area: f64,
    max_area: f64,
) -> Vec<CandidateQuad> {
    contours
        .iter()
        .filter(|c| c.area > min_area && c.area < max_area)
        .filter_map(|c| {
            let corners = approximate_quad(c)?;
            Some(CandidateQuad {
                frame: Arc::clone(frame),
                contour: c.clone(),
                corners,
                area: c.area,
                perimeter: c.perimeter(),
            })
        })
        .collect()
}

/// Center from the averaged corners, size from the raw contour's extent.
pub fn card_geometry(quad: &CandidateQuad) -> CardGeometry {
    let (sum_x, sum_y) = quad
        .corners
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let bbox = quad.contour.bounding_box();

    CardGeometry {
        center_x: (sum_x / 4.0) as i32,
        center_y: (sum_y / 4.0) as i32,
        width: bbox.width,
        height: bbox.height,
    }
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The curve is split at its first point and at the point farthest from it,
/// and both halves are simplified independently. The first point is only
/// kept when it is a corner in its own right.
pub fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }

    let origin = points[0];
    let far = (1..n)
        .max_by_key(|&i| squared_distance(points[i], origin))
        .unwrap_or(n / 2);

    // ring[n] closes the curve back onto its first point
    let mut ring = points.to_vec();
    ring.push(origin);

    let mut keep = vec![false; n + 1];
    keep[0] = true;
    keep[far] = true;
    let mut stack = vec![(0, far), (far, n)];

    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let dist = line_distance(ring[i], ring[start], ring[end]);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }

    let mut result: Vec<Point<i32>> = ring
        .into_iter()
        .zip(keep)
        .take(n)
        .filter_map(|(p, k)| k.then_some(p))
        .collect();

    // The split point is forced into the result; drop it when it sits on a straight edge
    if result.len() > 3 {
        let prev = result[result.len() - 1];
        if line_distance(result[0], prev, result[1]) <= epsilon {
            result.remove(0);
        }
    }

    result
}

/// Rotate to start at the topmost vertex and enforce counter-clockwise
/// on-screen winding (negative oriented area with y pointing down).
///
/// Vertices within [`TOP_ROW_TOLERANCE`] rows of the topmost one count as
/// level with it, and the leftmost of those is taken.
fn order_corners(corners: [Point<i32>; 4]) -> [Point<i32>; 4] {
    let top = corners.iter().map(|p| p.y).min().unwrap_or(0);
    let start = (0..4)
        .filter(|&i| corners[i].y <= top + TOP_ROW_TOLERANCE)
        .min_by_key(|&i| (corners[i].x, corners[i].y))
        .unwrap_or(0);
    let rotated: [Point<i32>; 4] = std::array::from_fn(|i| corners[(start + i) % 4]);

    if oriented_contour_area(&rotated) > 0.0 {
        [rotated[0], rotated[3], rotated[2], rotated[1]]
    } else {
        rotated
    }
}

fn squared_distance(a: Point<i32>, b: Point<i32>) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}

/// Distance from `p` to the infinite line through `a` and `b`.
fn line_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return (squared_distance(p, a) as f64).sqrt();
    }
    ((p.x - a.x) as f64 * dy - (p.y - a.y) as f64 * dx).abs() / len
}
