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
//! Pairwise collision detection and impulse-based response
//!
//! Detection scans every unordered pair of eligible bodies, gates each pair
//! through both bodies' category/filter masks, and delegates the geometric
//! test to a [`CollisionChecker`]. Response runs two sequential passes over
//! the detected collisions: bounce and positional correction first, then
//! friction for the pairs that had an actual penetration. Hook handlers can
//! veto the physical response of any pair, and sensor-filter matches degrade
//! a pair to notification-only.
//!
//! Pair order follows body insertion order; response effects accumulate onto
//! velocities and impulse accumulators in that order, which is part of the
//! observable contract.

use crate::body::{Body, BodyId};
use crate::hooks::{CollisionEventData, HookAction, HookRegistry};
use crate::math::{distribute, Vec2};

pub mod checkers;

/// Geometric outcome of a narrow-phase check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Penetration depth along the minimum-translation axis (>= 0)
    pub overlap: f64,
    /// Minimum-translation direction scaled by the depth, pointing from
    /// body A toward body B
    pub overlap_vector: Vec2,
}

/// Narrow-phase checker: proves separation (`None`) or yields the overlap
pub type CollisionChecker = fn(&Body, &Body) -> Option<CollisionResult>;

/// One detected collision, consumed within the sub-step that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// Index of body A in the body slice handed to [`find`]
    pub body_a: usize,
    /// Index of body B in the body slice handed to [`find`]
    pub body_b: usize,
    /// Penetration depth along the minimum-translation axis
    pub overlap: f64,
    /// Minimum-translation direction scaled by the depth (A toward B)
    pub overlap_vector: Vec2,
    /// Unit tangent of the overlap vector; `None` when the overlap vector
    /// is zero (touching without penetration)
    pub edge_vector: Option<Vec2>,
    /// `velocity_b - velocity_a`
    pub relative_velocity: Vec2,
}

/// Indices of the bodies eligible for collision
///
/// A body takes part in collision detection only with a nonzero category
/// and a nonzero collision filter.
pub fn collidable_indices(bodies: &[Body]) -> Vec<usize> {
    bodies
        .iter()
        .enumerate()
        .filter(|(_, body)| body.category != 0 && body.collision_filter != 0)
        .map(|(index, _)| index)
        .collect()
}

fn check_pair(
    bodies: &[Body],
    index_a: usize,
    index_b: usize,
    checker: CollisionChecker,
) -> Option<CollisionInfo> {
    let body_a = &bodies[index_a];
    let body_b = &bodies[index_b];

    if (body_a.category & body_b.collision_filter) == 0
        || (body_a.collision_filter & body_b.category) == 0
    {
        return None;
    }

    let result = checker(body_a, body_b)?;
    Some(CollisionInfo {
        body_a: index_a,
        body_b: index_b,
        overlap: result.overlap,
        overlap_vector: result.overlap_vector,
        edge_vector: if result.overlap_vector.is_zero() {
            None
        } else {
            Some(result.overlap_vector.tangent().normalized())
        },
        relative_velocity: body_b.velocity - body_a.velocity,
    })
}

/// Find collisions among the eligible bodies
///
/// Scans every unordered pair (in insertion order), applies the
/// bidirectional category gate and runs the checker. `eligible` holds
/// indices into `bodies`, typically from [`collidable_indices`].
pub fn find(bodies: &[Body], eligible: &[usize], checker: CollisionChecker) -> Vec<CollisionInfo> {
    let mut results = Vec::new();
    for (slot, &index_a) in eligible.iter().enumerate() {
        for &index_b in &eligible[slot + 1..] {
            if let Some(info) = check_pair(bodies, index_a, index_b, checker) {
                results.push(info);
            }
        }
    }
    results
}

/// Find collisions with the checker fan-out running on the Rayon pool
///
/// The pair list is built sequentially and the parallel collect preserves
/// pair order, so the result is identical to [`find`].
#[cfg(feature = "parallel")]
pub fn find_parallel(
    bodies: &[Body],
    eligible: &[usize],
    checker: CollisionChecker,
) -> Vec<CollisionInfo> {
    use rayon::prelude::*;

    let mut pairs = Vec::new();
    for (slot, &index_a) in eligible.iter().enumerate() {
        for &index_b in &eligible[slot + 1..] {
            pairs.push((index_a, index_b));
        }
    }

    pairs
        .par_iter()
        .filter_map(|&(index_a, index_b)| check_pair(bodies, index_a, index_b, checker))
        .collect()
}

#[cfg(not(feature = "parallel"))]
/// Find collisions (sequential fallback when the `parallel` feature is off)
pub fn find_parallel(
    bodies: &[Body],
    eligible: &[usize],
    checker: CollisionChecker,
) -> Vec<CollisionInfo> {
    find(bodies, eligible, checker)
}

fn pair_mut(bodies: &mut [Body], index_a: usize, index_b: usize) -> (&mut Body, &mut Body) {
    debug_assert!(index_a < index_b);
    let (left, right) = bodies.split_at_mut(index_b);
    (&mut left[index_a], &mut right[0])
}

/// Handle the given collisions
///
/// Runs the bounce/positional pass and then the friction pass. `ids` maps
/// body indices to their public ids for contact registration and hook
/// payloads; `timestamp` is forwarded into the collision notifications.
pub fn handle(
    bodies: &mut [Body],
    ids: &[BodyId],
    collisions: &[CollisionInfo],
    timestamp: f64,
    hooks: &mut HookRegistry,
) {
    let mut survivors: Vec<&CollisionInfo> = Vec::new();

    for info in collisions {
        let (index_a, index_b) = (info.body_a, info.body_b);

        let notification_a = CollisionEventData {
            target: ids[index_b],
            overlap: info.overlap,
            overlap_vector: info.overlap_vector,
            edge_vector: info.edge_vector,
            relative_velocity: info.relative_velocity,
            timestamp,
        };
        let notification_b = CollisionEventData {
            target: ids[index_a],
            ..notification_a
        };
        let action_a = hooks.collision(ids[index_a], &notification_a);
        let action_b = hooks.collision(ids[index_b], &notification_b);

        let sensor_pair = (bodies[index_a].category & bodies[index_b].sensor_filter) != 0
            || (bodies[index_a].sensor_filter & bodies[index_b].category) != 0;
        if action_a == HookAction::Suppress || action_b == HookAction::Suppress || sensor_pair {
            continue;
        }

        let slop = bodies[index_a].slop.min(bodies[index_b].slop);
        let impulse = info.overlap * bodies[index_a].stiffness.min(bodies[index_b].stiffness);
        let impulse_scale = if impulse > slop {
            (impulse - slop) / impulse
        } else {
            0.0
        };
        let bounce_scale = bodies[index_a].elasticity.max(bodies[index_b].elasticity) + 1.0;
        let relative_normal_speed = info.relative_velocity.project(info.overlap_vector);

        let active_a = bodies[index_a].active;
        let active_b = bodies[index_b].active;

        if active_a && active_b {
            let mass_a = bodies[index_a].mass();
            let mass_b = bodies[index_b].mass();
            let (body_a, body_b) = pair_mut(bodies, index_a, index_b);

            if impulse_scale > 0.0 {
                distribute(
                    info.overlap_vector,
                    &mut body_a.impulse,
                    &mut body_b.impulse,
                    mass_b,
                    -mass_a,
                    impulse_scale,
                );
            }

            if info.edge_vector.is_some() && relative_normal_speed < 0.0 {
                // relative_normal_speed is negative here
                distribute(
                    info.overlap_vector,
                    &mut body_a.velocity,
                    &mut body_b.velocity,
                    -mass_b,
                    mass_a,
                    relative_normal_speed / info.overlap * bounce_scale,
                );
            }
        } else if active_a {
            let body_a = &mut bodies[index_a];

            if impulse_scale > 0.0 {
                body_a.impulse.add_scaled(info.overlap_vector, -impulse_scale);
            }

            if info.edge_vector.is_some() && relative_normal_speed < 0.0 {
                body_a.velocity.add_scaled(
                    info.overlap_vector,
                    relative_normal_speed / info.overlap * bounce_scale,
                );
            }
        } else if active_b {
            let body_b = &mut bodies[index_b];

            if impulse_scale > 0.0 {
                body_b.impulse.add_scaled(info.overlap_vector, impulse_scale);
            }

            if info.edge_vector.is_some() && relative_normal_speed < 0.0 {
                body_b.velocity.add_scaled(
                    info.overlap_vector,
                    -(relative_normal_speed / info.overlap * bounce_scale),
                );
            }
        } else {
            // both inactive
            continue;
        }

        if info.edge_vector.is_some() {
            survivors.push(info);
        }
    }

    for info in survivors {
        let (index_a, index_b) = (info.body_a, info.body_b);

        let id_a = ids[index_a];
        let id_b = ids[index_b];
        bodies[index_a].contacts.insert(id_b);
        bodies[index_b].contacts.insert(id_a);

        let friction = bodies[index_a].friction.min(bodies[index_b].friction);
        let static_friction = bodies[index_a]
            .static_friction
            .min(bodies[index_b].static_friction);
        if static_friction == 0.0 {
            continue;
        }

        let Some(edge_vector) = info.edge_vector else {
            continue;
        };
        let relative_edge_speed = info.relative_velocity.project(edge_vector);
        let abs_edge_speed = relative_edge_speed.abs();

        // Surfaces lock when slow enough for static friction to hold, or
        // whenever kinetic friction fully covers the tangential speed.
        let locks = (abs_edge_speed < Body::MAX_STATIC_SPEED
            && info.overlap * static_friction >= abs_edge_speed)
            || info.overlap * friction >= abs_edge_speed;

        let active_a = bodies[index_a].active;
        let active_b = bodies[index_b].active;

        if active_a && active_b {
            let mass_a = bodies[index_a].mass();
            let mass_b = bodies[index_b].mass();
            let (body_a, body_b) = pair_mut(bodies, index_a, index_b);

            if locks {
                distribute(
                    edge_vector,
                    &mut body_a.velocity,
                    &mut body_b.velocity,
                    -mass_b,
                    mass_a,
                    relative_edge_speed,
                );
            } else if friction > 0.0 {
                distribute(
                    edge_vector,
                    &mut body_a.velocity,
                    &mut body_b.velocity,
                    -mass_b,
                    mass_a,
                    info.overlap * friction * relative_edge_speed.signum(),
                );
            }
        } else if active_a {
            let body_a = &mut bodies[index_a];

            if locks {
                body_a.velocity.add_scaled(edge_vector, relative_edge_speed);
            } else if friction > 0.0 {
                body_a.velocity.add_scaled(
                    edge_vector,
                    info.overlap * friction * relative_edge_speed.signum(),
                );
            }
        } else {
            // both-inactive pairs were dropped in the first pass
            let body_b = &mut bodies[index_b];

            if locks {
                body_b.velocity.add_scaled(edge_vector, -relative_edge_speed);
            } else if friction > 0.0 {
                body_b.velocity.add_scaled(
                    edge_vector,
                    -(info.overlap * friction * relative_edge_speed.signum()),
                );
            }
        }
    }
}

/// Equal to `handle(bodies, ids, &find(bodies, eligible, checker), ..)`
pub fn find_and_handle(
    bodies: &mut [Body],
    ids: &[BodyId],
    eligible: &[usize],
    checker: CollisionChecker,
    timestamp: f64,
    hooks: &mut HookRegistry,
) {
    let collisions = find_parallel(bodies, eligible, checker);
    handle(bodies, ids, &collisions, timestamp, hooks);
}
