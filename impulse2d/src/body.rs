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
//! Rigid body state and geometry
//!
//! A [`Body`] is a convex polygon with kinematic state (offset, velocity,
//! acceleration, optional gravity), material coefficients, and collision
//! filtering masks. Area, mass and the outward edge normals are derived from
//! the vertex ring and recomputed whenever the vertices change.
//!
//! Bodies do not rotate; orientation state does not exist. An inactive body
//! never moves and behaves as if it had infinite mass in every response
//! formula.

use crate::math::Vec2;
use std::collections::HashSet;
use std::fmt;

/// Unique identifier for a body within a world
///
/// Ids are handed out in increasing order and never reused, so they stay
/// valid as handles even after other bodies are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u64);

impl BodyId {
    /// Create a BodyId from a raw u64 value
    pub fn new(id: u64) -> Self {
        BodyId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// Scalar range of a body projected onto a direction
///
/// Produced by [`Body::project`] and consumed by the SAT collision checker
/// as the polygon's support function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Smallest vertex projection
    pub min: f64,
    /// Largest vertex projection
    pub max: f64,
}

/// Axis-aligned bounding box in canvas convention
///
/// `top` is the *minimum* y and `bottom` the maximum, matching a y-down
/// coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum x
    pub left: f64,
    /// Maximum x
    pub right: f64,
    /// Minimum y
    pub top: f64,
    /// Maximum y
    pub bottom: f64,
}

impl Bounds {
    /// Horizontal extent
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Vertical extent
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Center point of the box
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }
}

/// Construction options for [`Body`]
///
/// All fields have the engine defaults; override what the scene needs:
///
/// ```
/// use impulse2d::body::{Body, BodyOptions};
/// use impulse2d::math::Vec2;
///
/// let body = Body::new(BodyOptions {
///     vertices: vec![
///         Vec2::new(0.0, 0.0),
///         Vec2::new(20.0, 0.0),
///         Vec2::new(20.0, 10.0),
///         Vec2::new(0.0, 10.0),
///     ],
///     offset: Vec2::new(50.0, 50.0),
///     ..BodyOptions::default()
/// });
/// assert_eq!(body.area(), 200.0);
/// ```
#[derive(Debug, Clone)]
pub struct BodyOptions {
    /// Convex vertex ring in body-local coordinates (closed implicitly)
    pub vertices: Vec<Vec2>,
    /// World position of the body's local origin
    pub offset: Vec2,
    /// Initial velocity
    pub velocity: Vec2,
    /// Constant acceleration applied every sub-step
    pub acceleration: Vec2,
    /// Per-body gravity override, applied every sub-step when set
    pub gravity: Option<Vec2>,
    /// Whether the body is simulated (`false` makes it static/immovable)
    pub active: bool,
    /// Whether the body can be picked up by pointer dragging
    pub draggable: bool,
    /// Single-bit collision category (0 excludes the body from collision)
    pub category: u32,
    /// Mask of categories this body collides with
    pub collision_filter: u32,
    /// Mask of categories this body only senses (notification, no response)
    pub sensor_filter: u32,
    /// Fraction of a positional correction applied per sub-step (0..=1)
    pub stiffness: f64,
    /// Bounciness added on top of approach-speed cancellation
    pub elasticity: f64,
    /// Kinetic friction coefficient
    pub friction: f64,
    /// Static friction coefficient
    pub static_friction: f64,
    /// Mass per unit area
    pub density: f64,
    /// Absolute mass; when set, the density is back-derived from the area
    pub mass: Option<f64>,
    /// Acceptable penetration depth before positional correction kicks in
    pub slop: f64,
    /// Whether the vertex ring winds clockwise (mathematical convention)
    pub clockwise: bool,
    /// Fraction digits used when deduplicating edge normal tangents
    pub normal_precision: usize,
}

impl Default for BodyOptions {
    fn default() -> Self {
        BodyOptions {
            vertices: Vec::new(),
            offset: Vec2::zero(),
            velocity: Vec2::zero(),
            acceleration: Vec2::zero(),
            gravity: None,
            active: true,
            draggable: false,
            category: 0,
            collision_filter: crate::category::CategoryRegistry::FULL_MASK,
            sensor_filter: 0,
            stiffness: 0.95,
            elasticity: 0.3,
            friction: 0.3,
            static_friction: 0.4,
            density: 1.0,
            mass: None,
            slop: 0.1,
            clockwise: true,
            normal_precision: 6,
        }
    }
}

/// A convex rigid body
pub struct Body {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
    area: f64,
    mass: f64,
    density: f64,
    /// World position of the body's local origin
    pub offset: Vec2,
    /// Current velocity
    pub velocity: Vec2,
    /// Constant acceleration applied every sub-step
    pub acceleration: Vec2,
    /// Per-body gravity override
    pub gravity: Option<Vec2>,
    /// Accumulated positional correction, applied once per sub-step and
    /// reset by the stepping loop before the next one
    pub impulse: Vec2,
    /// Whether the body is simulated; inactive bodies never move
    pub active: bool,
    /// Whether the body can be picked up by pointer dragging
    pub draggable: bool,
    /// Single-bit collision category
    pub category: u32,
    /// Mask of categories this body collides with
    pub collision_filter: u32,
    /// Mask of categories this body only senses
    pub sensor_filter: u32,
    /// Fraction of a positional correction applied per sub-step
    pub stiffness: f64,
    /// Bounciness added on top of approach-speed cancellation
    pub elasticity: f64,
    /// Kinetic friction coefficient
    pub friction: f64,
    /// Static friction coefficient
    pub static_friction: f64,
    /// Acceptable penetration depth before positional correction kicks in
    pub slop: f64,
    /// Declared winding of the vertex ring; takes effect on the next
    /// [`Body::set_vertices`]
    pub clockwise: bool,
    /// Tangent rounding digits for normal dedup; takes effect on the next
    /// [`Body::set_vertices`]
    pub normal_precision: usize,
    pub(crate) contacts: HashSet<BodyId>,
}

impl Body {
    /// Tangential speed below which surfaces may lock via static friction
    pub const MAX_STATIC_SPEED: f64 = 0.02;

    /// Create a body from options
    ///
    /// Area, mass and normals are computed from the vertices at
    /// construction. An explicit `mass` option back-derives the density
    /// instead of keeping the configured one.
    pub fn new(options: BodyOptions) -> Self {
        let mut body = Body {
            vertices: Vec::new(),
            normals: Vec::new(),
            area: 0.0,
            mass: 0.0,
            density: options.density,
            offset: options.offset,
            velocity: options.velocity,
            acceleration: options.acceleration,
            gravity: options.gravity,
            impulse: Vec2::zero(),
            active: options.active,
            draggable: options.draggable,
            category: options.category,
            collision_filter: options.collision_filter,
            sensor_filter: options.sensor_filter,
            stiffness: options.stiffness,
            elasticity: options.elasticity,
            friction: options.friction,
            static_friction: options.static_friction,
            slop: options.slop,
            clockwise: options.clockwise,
            normal_precision: options.normal_precision,
            contacts: HashSet::new(),
        };
        body.set_vertices(options.vertices);
        if let Some(mass) = options.mass {
            body.set_mass(mass);
        }
        body
    }

    /// Create an inactive, vertex-less marker body at a position
    ///
    /// Anchors are used as immovable constraint endpoints, most notably as
    /// the pointer-tracking side of the world's drag constraint.
    pub fn anchor(x: f64, y: f64) -> Self {
        Body::new(BodyOptions {
            offset: Vec2::new(x, y),
            active: false,
            ..BodyOptions::default()
        })
    }

    /// The body-local vertex ring
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Deduplicated outward unit normals, one per distinct edge direction
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    /// Polygon area (always non-negative)
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Mass (`area * density` unless explicitly overridden)
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Mass per unit area
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Bodies currently touching this one, rebuilt every sub-step
    pub fn contacts(&self) -> &HashSet<BodyId> {
        &self.contacts
    }

    /// Replace the vertex ring and recompute area, mass and normals
    ///
    /// The density is preserved and the mass re-derived from the new area.
    /// Edges whose rounded tangent (and direction sign) repeats an earlier
    /// edge contribute no additional normal, so fine polygon approximations
    /// with nearly-parallel consecutive edges share a single SAT axis.
    pub fn set_vertices(&mut self, vertices: Vec<Vec2>) {
        self.vertices = vertices;
        self.normals.clear();

        let count = self.vertices.len();
        if count == 0 {
            self.area = 0.0;
            self.mass = 0.0;
            return;
        }

        let mut seen_tangents: HashSet<String> = HashSet::new();
        let mut doubled_area = 0.0;
        let mut prev = self.vertices[count - 1];

        for &vertex in &self.vertices {
            let mut lobe = prev.cross(vertex);
            if self.clockwise {
                lobe = -lobe;
            }
            doubled_area += lobe;

            let edge = vertex - prev;
            let key = format!(
                "{}{:.*}",
                if edge.x.is_sign_positive() { '+' } else { '-' },
                self.normal_precision,
                edge.y / edge.x,
            );
            if seen_tangents.insert(key) {
                let normal = if self.clockwise {
                    Vec2::new(-edge.y, edge.x)
                } else {
                    Vec2::new(edge.y, -edge.x)
                }
                .normalized();
                if !normal.is_zero() {
                    self.normals.push(normal);
                }
            }

            prev = vertex;
        }

        self.area = (doubled_area / 2.0).abs();
        self.mass = self.area * self.density;
    }

    /// Set the density, re-deriving the mass from the area
    pub fn set_density(&mut self, density: f64) {
        self.density = density;
        self.mass = self.area * density;
    }

    /// Set the mass, re-deriving the density from the area
    ///
    /// A zero-area body keeps its configured density.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        if self.area > 0.0 {
            self.density = mass / self.area;
        }
    }

    /// Project the body onto a direction
    ///
    /// Returns the scalar range covered by the offset vertices. This is the
    /// support function used by the SAT checker.
    pub fn project(&self, direction: Vec2) -> Projection {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &vertex in &self.vertices {
            let projection = vertex.project(direction);
            if projection < min {
                min = projection;
            }
            if projection > max {
                max = projection;
            }
        }
        let offset_projection = self.offset.project(direction);
        Projection {
            min: min + offset_projection,
            max: max + offset_projection,
        }
    }

    /// Axis-aligned bounding box in world coordinates
    pub fn bounds(&self) -> Bounds {
        let local = self.local_bounds();
        Bounds {
            left: local.left + self.offset.x,
            right: local.right + self.offset.x,
            top: local.top + self.offset.y,
            bottom: local.bottom + self.offset.y,
        }
    }

    /// Axis-aligned bounding box of the vertex ring in body-local
    /// coordinates
    pub fn local_bounds(&self) -> Bounds {
        let mut bounds = Bounds {
            left: f64::INFINITY,
            right: f64::NEG_INFINITY,
            top: f64::INFINITY,
            bottom: f64::NEG_INFINITY,
        };
        for &vertex in &self.vertices {
            if vertex.x < bounds.left {
                bounds.left = vertex.x;
            }
            if vertex.x > bounds.right {
                bounds.right = vertex.x;
            }
            if vertex.y < bounds.top {
                bounds.top = vertex.y;
            }
            if vertex.y > bounds.bottom {
                bounds.bottom = vertex.y;
            }
        }
        bounds
    }

    /// Whether a world-coordinate point lies inside the convex polygon
    pub fn contains_point(&self, point: Vec2) -> bool {
        let count = self.vertices.len();
        if count < 3 {
            return false;
        }
        let local = point - self.offset;
        let mut side = 0.0f64;
        let mut prev = self.vertices[count - 1];
        for &vertex in &self.vertices {
            let cross = (vertex - prev).cross(local - prev);
            if cross != 0.0 {
                if side == 0.0 {
                    side = cross.signum();
                } else if cross.signum() != side {
                    return false;
                }
            }
            prev = vertex;
        }
        true
    }

    /// Advance the body by one sub-step
    ///
    /// Applies the accumulated impulse and the velocity to the offset, then
    /// the acceleration and gravity to the velocity. Inactive bodies are
    /// left untouched. The impulse accumulator is reset externally before
    /// the next sub-step.
    pub fn integrate(&mut self) {
        if !self.active {
            return;
        }
        self.offset += self.velocity + self.impulse;
        self.velocity += self.acceleration;
        if let Some(gravity) = self.gravity {
            self.velocity += gravity;
        }
    }
}
