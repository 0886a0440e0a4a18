use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::contour_area;

use crate::models::Contour;

/// Trace every border in a binary edge map and keep the top-level ones,
/// ordered by enclosed area, largest first.
pub fn find_external_contours(edges: &GrayImage) -> Vec<Contour> {
    let mut external: Vec<Contour> = find_contours::<i32>(edges)
        .into_iter()
        // Borders nested inside another border carry a parent index
        .filter(|c| c.parent.is_none())
        .map(|c| {
            let area = contour_area(&c.points);
            Contour {
                points: c.points,
                area,
            }
        })
        .collect();

    external.sort_by(|a, b| b.area.total_cmp(&a.area));
    external
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_hollow_rect_mut;
    use imageproc::rect::Rect;

    #[test]
    fn empty_edge_map_has_no_contours() {
        let edges = GrayImage::new(80, 60);
        assert!(find_external_contours(&edges).is_empty());
    }

    #[test]
    fn nested_outlines_are_dropped_and_sorted_by_area() {
        let mut edges = GrayImage::new(200, 200);
        draw_hollow_rect_mut(&mut edges, Rect::at(10, 10).of_size(100, 100), Luma([255]));
        // Nested inside the large outline
        draw_hollow_rect_mut(&mut edges, Rect::at(40, 40).of_size(20, 20), Luma([255]));
        draw_hollow_rect_mut(&mut edges, Rect::at(130, 130).of_size(50, 50), Luma([255]));

        let contours = find_external_contours(&edges);

        assert_eq!(contours.len(), 2);
        assert!(contours[0].area > contours[1].area);
        assert_eq!(contours[0].bounding_box().x, 10);
        assert_eq!(contours[1].bounding_box().x, 130);
    }

    #[test]
    fn area_is_enclosed_by_outer_border_pixels() {
        let mut edges = GrayImage::new(150, 150);
        draw_hollow_rect_mut(&mut edges, Rect::at(10, 10).of_size(100, 100), Luma([255]));

        let contours = find_external_contours(&edges);

        assert_eq!(contours.len(), 1);
        // Pixel centers run from 10 to 109 on both axes
        assert_eq!(contours[0].area, 99.0 * 99.0);
    }
}
