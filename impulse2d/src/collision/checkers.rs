// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Built-in narrow-phase collision checkers
//!
//! A checker inspects one unordered body pair and either proves separation
//! (`None`) or yields the minimum-translation overlap. Both built-in
//! checkers report the overlap vector pointing from body A toward body B.

use crate::body::Body;
use crate::collision::CollisionResult;
use crate::math::Vec2;

/// Axis-aligned bounding-box checker
///
/// Tests the four axis-aligned separations over the bodies' bounds and
/// keeps the axis with the smallest overlap, exiting early as soon as any
/// axis separates the boxes. This is SAT specialized to boxes; polygon
/// shape is ignored beyond the bounds.
pub fn aabb(body_a: &Body, body_b: &Body) -> Option<CollisionResult> {
    let bounds_a = body_a.bounds();
    let bounds_b = body_b.bounds();

    let mut delta = bounds_a.right - bounds_b.left;
    if delta < 0.0 {
        return None;
    }
    let mut min_overlap = delta;
    let mut overlap_x = delta;
    let mut overlap_y = 0.0;

    delta = bounds_a.left - bounds_b.right;
    if delta > 0.0 {
        return None;
    }
    if -delta < min_overlap {
        min_overlap = -delta;
        overlap_x = delta;
    }

    delta = bounds_a.bottom - bounds_b.top;
    if delta < 0.0 {
        return None;
    }
    if delta < min_overlap {
        min_overlap = delta;
        overlap_x = 0.0;
        overlap_y = delta;
    }

    delta = bounds_a.top - bounds_b.bottom;
    if delta > 0.0 {
        return None;
    }
    if -delta < min_overlap {
        min_overlap = -delta;
        overlap_x = 0.0;
        overlap_y = delta;
    }

    Some(CollisionResult {
        overlap: min_overlap,
        overlap_vector: Vec2::new(overlap_x, overlap_y),
    })
}

/// Separating-axis-theorem checker
///
/// Projects both polygons onto every deduplicated normal of either body.
/// A gap on any axis proves separation; otherwise the axis with the
/// smallest overlap becomes the minimum-translation result, flipped so the
/// overlap vector points from body A toward body B. Bodies without normals
/// never collide under SAT.
pub fn sat(body_a: &Body, body_b: &Body) -> Option<CollisionResult> {
    let mut min_overlap = f64::INFINITY;
    let mut min_direction: Option<Vec2> = None;

    for &direction in body_a.normals().iter().chain(body_b.normals().iter()) {
        let projection_a = body_a.project(direction);
        let projection_b = body_b.project(direction);

        if projection_a.min > projection_b.max || projection_a.max < projection_b.min {
            return None;
        }

        let overlap_near = projection_a.max - projection_b.min;
        let overlap_far = projection_b.max - projection_a.min;

        if overlap_near < overlap_far {
            if overlap_near < min_overlap {
                min_overlap = overlap_near;
                min_direction = Some(direction);
            }
        } else if overlap_far < min_overlap {
            min_overlap = overlap_far;
            min_direction = Some(-direction);
        }
    }

    min_direction.map(|direction| CollisionResult {
        overlap: min_overlap,
        overlap_vector: direction * min_overlap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyOptions;

    fn square(side: f64, x: f64, y: f64) -> Body {
        Body::new(BodyOptions {
            vertices: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(side, 0.0),
                Vec2::new(side, side),
                Vec2::new(0.0, side),
            ],
            offset: Vec2::new(x, y),
            ..BodyOptions::default()
        })
    }

    #[test]
    fn test_aabb_separated() {
        let a = square(10.0, 0.0, 0.0);
        let b = square(10.0, 20.0, 0.0);
        assert!(aabb(&a, &b).is_none());
        let c = square(10.0, 0.0, 30.0);
        assert!(aabb(&a, &c).is_none());
    }

    #[test]
    fn test_aabb_overlap_axis_and_depth() {
        let a = square(10.0, 0.0, 0.0);
        let b = square(10.0, 7.0, 0.0);
        let result = aabb(&a, &b).unwrap();
        assert!((result.overlap - 3.0).abs() < 1e-12);
        // Minimum axis is x, pointing from a toward b
        assert!((result.overlap_vector.x - 3.0).abs() < 1e-12);
        assert_eq!(result.overlap_vector.y, 0.0);
    }

    #[test]
    fn test_aabb_prefers_smaller_axis() {
        let a = square(10.0, 0.0, 0.0);
        let b = square(10.0, 4.0, 8.0);
        let result = aabb(&a, &b).unwrap();
        // y overlap (2) is smaller than x overlap (6)
        assert!((result.overlap - 2.0).abs() < 1e-12);
        assert_eq!(result.overlap_vector.x, 0.0);
        assert!((result.overlap_vector.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sat_separated_at_any_y_offset() {
        let a = square(10.0, 0.0, 0.0);
        for dy in [-15.0, -5.0, 0.0, 5.0, 15.0] {
            let b = square(10.0, 20.0, dy);
            assert!(sat(&a, &b).is_none());
        }
    }

    #[test]
    fn test_sat_overlap_magnitude() {
        let a = square(10.0, 0.0, 0.0);
        let b = square(10.0, 7.0, 0.0);
        let result = sat(&a, &b).unwrap();
        assert!((result.overlap - 3.0).abs() < 1e-12);
        // Direction points from a toward b along x
        assert!(result.overlap_vector.x > 0.0);
        assert!(result.overlap_vector.y.abs() < 1e-12);
    }

    #[test]
    fn test_sat_direction_flips_with_side() {
        let a = square(10.0, 7.0, 0.0);
        let b = square(10.0, 0.0, 0.0);
        let result = sat(&a, &b).unwrap();
        // a sits to the right of b, so a -> b points along negative x
        assert!(result.overlap_vector.x < 0.0);
    }

    #[test]
    fn test_sat_triangle_square() {
        let triangle = Body::new(BodyOptions {
            vertices: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(5.0, 10.0),
            ],
            offset: Vec2::new(5.0, 5.0),
            ..BodyOptions::default()
        });
        let block = square(10.0, 0.0, 0.0);
        assert!(sat(&triangle, &block).is_some());

        let far = square(10.0, 40.0, 40.0);
        assert!(sat(&triangle, &far).is_none());
    }

    #[test]
    fn test_sat_without_normals_never_collides() {
        let marker = Body::anchor(5.0, 5.0);
        let other = Body::anchor(5.0, 5.0);
        assert!(sat(&marker, &other).is_none());
    }
}
