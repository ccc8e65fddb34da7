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
//! Two-body distance constraints
//!
//! A constraint links an anchor point on each of two bodies and keeps the
//! anchor distance inside `[min_length, max_length]` using soft corrections:
//! a positional impulse scaled by stiffness, a velocity correction damping
//! motion that violates the bound further, and an optional elastic velocity
//! injection that makes the link springy. A constraint only takes effect
//! while both bodies are present.

use crate::body::{Body, BodyId};
use crate::math::{distribute, Vec2};
use std::fmt;

/// Unique identifier for a constraint within a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(u64);

impl ConstraintId {
    /// Create a ConstraintId from a raw u64 value
    pub fn new(id: u64) -> Self {
        ConstraintId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constraint({})", self.0)
    }
}

/// Construction options for [`Constraint`]
///
/// Unset lengths default to the distance between the two bodies' offsets at
/// construction time (`length` overrides that base value), and unset anchors
/// default to the center of the owning body's local bounds.
#[derive(Debug, Clone, Default)]
pub struct ConstraintOptions {
    /// Whether the constraint is enforced
    pub active: Option<bool>,
    /// One of the two linked bodies
    pub body_a: Option<BodyId>,
    /// The other linked body
    pub body_b: Option<BodyId>,
    /// Minimum permissible anchor distance
    pub min_length: Option<f64>,
    /// Maximum permissible anchor distance
    pub max_length: Option<f64>,
    /// Default for both lengths when they are unset
    pub length: Option<f64>,
    /// Fraction of the distance violation corrected per sub-step
    pub stiffness: Option<f64>,
    /// Springiness of the link
    pub elasticity: Option<f64>,
    /// Anchor position in body A's local space
    pub anchor_a: Option<Vec2>,
    /// Anchor position in body B's local space
    pub anchor_b: Option<Vec2>,
}

/// Distance link between two bodies
pub struct Constraint {
    /// Whether the constraint is enforced
    pub active: bool,
    /// One of the two linked bodies; the constraint is inert while `None`
    pub body_a: Option<BodyId>,
    /// The other linked body; the constraint is inert while `None`
    pub body_b: Option<BodyId>,
    /// Minimum permissible anchor distance
    pub min_length: f64,
    /// Maximum permissible anchor distance (`>= min_length`)
    pub max_length: f64,
    /// Fraction of the distance violation corrected per sub-step
    pub stiffness: f64,
    /// Springiness of the link
    pub elasticity: f64,
    /// Anchor position in body A's local space
    pub anchor_a: Vec2,
    /// Anchor position in body B's local space
    pub anchor_b: Vec2,
}

impl Constraint {
    /// Build a constraint, resolving defaults against the linked bodies
    ///
    /// `body_a` / `body_b` are the bodies the id options refer to (when
    /// resolvable); they seed the default rest length and anchor positions.
    /// `max_length` is clamped up to `min_length`.
    pub fn from_options(
        options: ConstraintOptions,
        body_a: Option<&Body>,
        body_b: Option<&Body>,
    ) -> Self {
        let default_length = match (body_a, body_b) {
            (Some(a), Some(b)) => options
                .length
                .unwrap_or_else(|| Vec2::distance(a.offset, b.offset)),
            _ => options.length.unwrap_or(0.0),
        };
        let min_length = options.min_length.unwrap_or(default_length);
        let max_length = options
            .max_length
            .unwrap_or_else(|| min_length.max(default_length));

        let anchor_a = options
            .anchor_a
            .or_else(|| body_a.map(default_anchor))
            .unwrap_or_else(Vec2::zero);
        let anchor_b = options
            .anchor_b
            .or_else(|| body_b.map(default_anchor))
            .unwrap_or_else(Vec2::zero);

        Constraint {
            active: options.active.unwrap_or(true),
            body_a: options.body_a,
            body_b: options.body_b,
            min_length,
            max_length: max_length.max(min_length),
            stiffness: options.stiffness.unwrap_or(0.95),
            elasticity: options.elasticity.unwrap_or(0.1),
            anchor_a,
            anchor_b,
        }
    }

    /// Enforce the constraint on a resolved body pair for one sub-step
    ///
    /// No-op while inactive, while both bodies are inactive, or when the
    /// anchors coincide exactly (no direction to act along). When exactly
    /// one body is active the pair is canonicalized so the corrections
    /// apply one-sidedly to the active body; the anchors travel with their
    /// bodies through the swap.
    pub fn solve(&self, body_a: &mut Body, body_b: &mut Body) {
        if !self.active {
            return;
        }

        // Canonicalize: body B is the active one when exactly one is
        let (body_a, anchor_a, body_b, anchor_b) = if !body_b.active {
            if !body_a.active {
                return;
            }
            (&mut *body_b, self.anchor_b, &mut *body_a, self.anchor_a)
        } else {
            (&mut *body_a, self.anchor_a, &mut *body_b, self.anchor_b)
        };

        let offset = (body_b.offset + anchor_b) - (body_a.offset + anchor_a);
        let distance = offset.length();
        if distance == 0.0 {
            return;
        }

        let min_length = self.min_length;
        let max_length = self.max_length;
        let stiffness = self.stiffness;
        let elasticity = self.elasticity;

        if body_a.active {
            // both active
            let mass_a = body_a.mass();
            let mass_b = body_b.mass();
            let relative_normal_speed =
                body_b.velocity.project(offset) - body_a.velocity.project(offset);

            if distance > max_length {
                distribute(
                    offset,
                    &mut body_a.impulse,
                    &mut body_b.impulse,
                    -mass_b,
                    mass_a,
                    (distance - max_length) / distance * stiffness,
                );

                if relative_normal_speed > 0.0 {
                    distribute(
                        offset,
                        &mut body_a.velocity,
                        &mut body_b.velocity,
                        -mass_b,
                        mass_a,
                        relative_normal_speed / distance * stiffness,
                    );
                }

                if elasticity > 0.0 {
                    distribute(
                        offset,
                        &mut body_a.velocity,
                        &mut body_b.velocity,
                        -mass_b,
                        mass_a,
                        (distance - max_length) / distance * elasticity,
                    );
                }
            } else if distance < min_length {
                distribute(
                    offset,
                    &mut body_a.impulse,
                    &mut body_b.impulse,
                    mass_b,
                    -mass_a,
                    (min_length - distance) / distance * stiffness,
                );

                if relative_normal_speed < 0.0 {
                    // relative_normal_speed is negative here
                    distribute(
                        offset,
                        &mut body_a.velocity,
                        &mut body_b.velocity,
                        -mass_b,
                        mass_a,
                        relative_normal_speed / distance * stiffness,
                    );
                }

                if elasticity > 0.0 {
                    distribute(
                        offset,
                        &mut body_a.velocity,
                        &mut body_b.velocity,
                        mass_b,
                        -mass_a,
                        (min_length - distance) / distance * elasticity,
                    );
                }
            }
        } else {
            // only body B is active
            let relative_normal_speed = body_b.velocity.project(offset);

            if distance > max_length {
                body_b
                    .impulse
                    .add_scaled(offset, -((distance - max_length) / distance * stiffness));

                if relative_normal_speed > 0.0 {
                    body_b
                        .velocity
                        .add_scaled(offset, -(relative_normal_speed / distance * stiffness));
                }

                if elasticity > 0.0 {
                    body_b
                        .velocity
                        .add_scaled(offset, -((distance - max_length) / distance * elasticity));
                }
            } else if distance < min_length {
                body_b
                    .impulse
                    .add_scaled(offset, (min_length - distance) / distance * stiffness);

                if relative_normal_speed < 0.0 {
                    // relative_normal_speed is negative here
                    body_b
                        .velocity
                        .add_scaled(offset, -(relative_normal_speed / distance * stiffness));
                }

                if elasticity > 0.0 {
                    body_b
                        .velocity
                        .add_scaled(offset, (min_length - distance) / distance * elasticity);
                }
            }
        }
    }
}

fn default_anchor(body: &Body) -> Vec2 {
    if body.vertices().is_empty() {
        Vec2::zero()
    } else {
        body.local_bounds().center()
    }
}
