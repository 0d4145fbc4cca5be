//! Planar polygon in the (RAAN, inclination) plane, carried with a constant
//! altitude coordinate. Validity, area and containment ignore the altitude.

use serde::{Deserialize, Serialize};

use crate::errors::TractError;
use crate::utils::vector2d::Vector2D;
use crate::utils::vector3d::Vector3D;

/// Closed ring of (RAAN°, inclination°, altitude km) vertices; the last vertex
/// repeats the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    ring: Vec<Vector3D>,
}

impl Polygon {
    pub fn new(ring: Vec<Vector3D>) -> Result<Self, TractError> {
        if let Some(bad) = ring
            .iter()
            .find(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()))
        {
            return Err(TractError::GeometryConstruction(format!(
                "non-finite vertex {:?}",
                bad
            )));
        }
        Ok(Polygon { ring })
    }

    pub fn empty() -> Self {
        Polygon { ring: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn vertices(&self) -> &[Vector3D] {
        &self.ring
    }

    fn planar(&self) -> Vec<Vector2D> {
        self.ring.iter().map(|v| Vector2D::new(v.x, v.y)).collect()
    }

    /// Shoelace area; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        let points = self.planar();
        points
            .windows(2)
            .map(|pair| pair[0].cross(&pair[1]))
            .sum::<f64>()
            / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Reverse the ring if it winds clockwise.
    pub fn oriented_ccw(mut self) -> Self {
        if self.signed_area() < 0.0 {
            self.ring.reverse();
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.validity().is_ok()
    }

    /// Topological check of the ring. `Err` explains the first defect found.
    /// An empty polygon is valid.
    pub fn validity(&self) -> Result<(), String> {
        if self.ring.is_empty() {
            return Ok(());
        }
        let points = self.planar();
        let n = points.len();
        if n < 4 {
            return Err(format!("too few points in ring: {}", n));
        }
        if points[0] != points[n - 1] {
            return Err("ring is not closed".to_string());
        }

        let edges: Vec<(Vector2D, Vector2D)> =
            points.windows(2).map(|pair| (pair[0], pair[1])).collect();
        let edge_count = edges.len();

        for (i, &(a, b)) in edges.iter().enumerate() {
            if a == b {
                return Err(format!("repeated vertex at {:?}", a));
            }
            let (_, next) = edges[(i + 1) % edge_count];
            // folding straight back along the previous edge
            if Vector2D::orientation(a, b, next) == 0.0 && (next - b).dot(&(a - b)) > 0.0 {
                return Err(format!("ring spike at {:?}", b));
            }
        }

        for i in 0..edge_count {
            for j in (i + 2)..edge_count {
                if i == 0 && j == edge_count - 1 {
                    continue;
                }
                let (a, b) = edges[i];
                let (c, d) = edges[j];
                if segments_intersect(a, b, c, d) {
                    return Err(format!("self-intersection between edges {} and {}", i, j));
                }
            }
        }
        Ok(())
    }

    /// Strict containment: points on the boundary are outside.
    pub fn contains(&self, point: Vector2D) -> bool {
        if self.ring.len() < 4 || !point.is_finite() {
            return false;
        }
        let points = self.planar();
        if points
            .windows(2)
            .any(|pair| point.is_on_segment(pair[0], pair[1]))
        {
            return false;
        }

        let mut inside = false;
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

fn segments_intersect(a: Vector2D, b: Vector2D, c: Vector2D, d: Vector2D) -> bool {
    let d1 = Vector2D::orientation(c, d, a);
    let d2 = Vector2D::orientation(c, d, b);
    let d3 = Vector2D::orientation(a, b, c);
    let d4 = Vector2D::orientation(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    a.is_on_segment(c, d) || b.is_on_segment(c, d) || c.is_on_segment(a, b) || d.is_on_segment(a, b)
}
