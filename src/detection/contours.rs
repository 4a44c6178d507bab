use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::point::Point;

use crate::models::{Anomaly, BoundingBox};

/// Extract candidate anomalies from a binary edge map.
///
/// Only top-level outer boundaries are kept: the inner edge of a closed crack
/// outline would otherwise count the same defect twice. Contours enclosing
/// less than `min_area` px² are dropped as noise specks that survived the
/// blur. The traversal is a raster scan, so the returned order is stable for
/// a given input.
pub fn find_anomalies(edges: &GrayImage, min_area: f64) -> Vec<Anomaly> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|contour| contour.parent.is_none())
        .filter_map(|contour| anomaly_from_boundary(&contour.points))
        .filter(|anomaly| anomaly.area >= min_area)
        .collect()
}

fn anomaly_from_boundary(points: &[Point<i32>]) -> Option<Anomaly> {
    let first = points.first()?;
    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Some(Anomaly {
        area: polygon_area(points),
        bounding_box: BoundingBox {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        },
    })
}

/// Shoelace formula over the traced boundary. Boundary points are on the
/// pixel grid, so twice the area is an exact integer.
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area: i64 = 0;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice_area += i64::from(p.x) * i64::from(q.y) - i64::from(q.x) * i64::from(p.y);
    }
    twice_area.abs() as f64 / 2.0
}
