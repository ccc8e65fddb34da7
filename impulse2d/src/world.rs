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
//! Physical world: body/constraint storage and the fixed-timestep loop
//!
//! The [`World`] owns the simulation state and exposes a host-agnostic
//! surface: the host adapter owns scheduling and rendering, calls
//! [`World::update`] once per animation tick with a wall-clock timestamp,
//! and forwards pointer input through the `pointer_*` methods. Each tick
//! dispenses zero or more fixed-duration sub-steps depending on the elapsed
//! time, capped by `max_frame_count` so a stalled host cannot trigger an
//! unbounded catch-up burst.
//!
//! Within a sub-step the order is fixed and observable: reset per-step state,
//! solve the pointer-drag constraint, detect and respond to collisions,
//! solve every constraint, integrate every body. Bodies and constraints are
//! iterated in insertion order throughout.

use crate::body::{Body, BodyId, BodyOptions};
use crate::category::CategoryRegistry;
use crate::collision::{self, CollisionChecker};
use crate::constraint::{Constraint, ConstraintId, ConstraintOptions};
use crate::hooks::{DragEventData, HookAction, HookRegistry};
use crate::math::Vec2;

/// Construction options for [`World`]
#[derive(Clone, Copy)]
pub struct WorldOptions {
    /// Duration of one simulation sub-step in milliseconds
    pub frame_duration: f64,
    /// Maximum sub-steps dispensed per tick (catch-up cap)
    pub max_frame_count: u32,
    /// Narrow-phase checker; `None` disables collision entirely
    pub checker: Option<CollisionChecker>,
    /// Whether pointer dragging is enabled
    pub draggable: bool,
}

impl Default for WorldOptions {
    fn default() -> Self {
        WorldOptions {
            frame_duration: 10.0,
            max_frame_count: 3,
            checker: Some(collision::checkers::sat),
            draggable: false,
        }
    }
}

/// Result of one [`World::update`] call
///
/// The host adapter re-renders after every tick and re-arms its scheduling
/// primitive while `active` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Number of sub-steps that ran this tick
    pub frames: u32,
    /// Whether the world is still active (scheduling should re-arm)
    pub active: bool,
}

/// Container and driver for a 2D rigid-body simulation
///
/// # Examples
///
/// ```
/// use impulse2d::body::BodyOptions;
/// use impulse2d::hooks::HookRegistry;
/// use impulse2d::math::Vec2;
/// use impulse2d::world::{World, WorldOptions};
///
/// let mut world = World::new(WorldOptions::default());
/// let ball = world.add_body(BodyOptions {
///     vertices: vec![
///         Vec2::new(0.0, 0.0),
///         Vec2::new(10.0, 0.0),
///         Vec2::new(10.0, 10.0),
///         Vec2::new(0.0, 10.0),
///     ],
///     category: 1,
///     gravity: Some(Vec2::new(0.0, 0.1)),
///     ..BodyOptions::default()
/// });
///
/// let mut hooks = HookRegistry::new();
/// world.activate();
/// for tick in 0..10 {
///     world.update(tick as f64 * 16.0, &mut hooks);
/// }
/// assert!(world.body(ball).unwrap().offset.y > 0.0);
/// ```
pub struct World {
    /// Duration of one simulation sub-step in milliseconds
    pub frame_duration: f64,
    /// Maximum sub-steps dispensed per tick
    pub max_frame_count: u32,
    /// Narrow-phase checker; `None` disables collision
    pub checker: Option<CollisionChecker>,
    /// Whether pointer dragging is enabled
    pub draggable: bool,
    active: bool,
    last_update_time: Option<f64>,
    saved_time: f64,
    registry: CategoryRegistry,
    bodies: Vec<Body>,
    body_ids: Vec<BodyId>,
    next_body_id: u64,
    constraints: Vec<Constraint>,
    constraint_ids: Vec<ConstraintId>,
    next_constraint_id: u64,
    drag_constraint: Constraint,
    drag_anchor: Body,
    drag_target: Option<BodyId>,
}

impl World {
    /// Create a world from options
    pub fn new(options: WorldOptions) -> Self {
        World {
            frame_duration: options.frame_duration,
            max_frame_count: options.max_frame_count,
            checker: options.checker,
            draggable: options.draggable,
            active: false,
            last_update_time: None,
            saved_time: 0.0,
            registry: CategoryRegistry::new(),
            bodies: Vec::new(),
            body_ids: Vec::new(),
            next_body_id: 0,
            constraints: Vec::new(),
            constraint_ids: Vec::new(),
            next_constraint_id: 0,
            drag_constraint: Constraint {
                active: true,
                body_a: None,
                body_b: None,
                min_length: 0.0,
                max_length: 0.0,
                stiffness: 0.5,
                elasticity: 0.2,
                anchor_a: Vec2::zero(),
                anchor_b: Vec2::zero(),
            },
            drag_anchor: Body::anchor(0.0, 0.0),
            drag_target: None,
        }
    }

    /// Create a body from options and add it to the world
    pub fn add_body(&mut self, options: BodyOptions) -> BodyId {
        self.insert_body(Body::new(options))
    }

    /// Add an existing body to the world
    ///
    /// Bodies keep their insertion order for the pairwise collision scan
    /// and integration; ids increase monotonically and are never reused.
    pub fn insert_body(&mut self, body: Body) -> BodyId {
        let id = BodyId::new(self.next_body_id);
        self.next_body_id += 1;
        self.bodies.push(body);
        self.body_ids.push(id);
        id
    }

    /// Get a body by id
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|index| &self.bodies[index])
    }

    /// Get a body by id, mutably
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(|index| &mut self.bodies[index])
    }

    /// Remove a body, returning it
    ///
    /// Clears the drag target when the removed body was being dragged.
    /// Constraints referencing the body become inert until re-pointed.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let index = self.index_of(id)?;
        self.body_ids.remove(index);
        if self.drag_target == Some(id) {
            self.drag_target = None;
        }
        Some(self.bodies.remove(index))
    }

    /// Iterate bodies with their ids, in insertion order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.body_ids.iter().copied().zip(self.bodies.iter())
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Create a constraint from options and add it to the world
    ///
    /// Default rest length and anchors are resolved against the referenced
    /// bodies' current state.
    pub fn add_constraint(&mut self, options: ConstraintOptions) -> ConstraintId {
        let body_a = options.body_a.and_then(|id| self.body(id));
        let body_b = options.body_b.and_then(|id| self.body(id));
        let constraint = Constraint::from_options(options, body_a, body_b);
        let id = ConstraintId::new(self.next_constraint_id);
        self.next_constraint_id += 1;
        self.constraints.push(constraint);
        self.constraint_ids.push(id);
        id
    }

    /// Get a constraint by id
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraint_index_of(id)
            .map(|index| &self.constraints[index])
    }

    /// Get a constraint by id, mutably
    pub fn constraint_mut(&mut self, id: ConstraintId) -> Option<&mut Constraint> {
        self.constraint_index_of(id)
            .map(|index| &mut self.constraints[index])
    }

    /// Remove a constraint, returning it
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Option<Constraint> {
        let index = self.constraint_index_of(id)?;
        self.constraint_ids.remove(index);
        Some(self.constraints.remove(index))
    }

    /// Iterate constraints with their ids, in insertion order
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        self.constraint_ids
            .iter()
            .copied()
            .zip(self.constraints.iter())
    }

    /// Number of constraints in the world
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Get the category bit for a tag, allocating one if the tag is new
    ///
    /// Delegates to the world-owned [`CategoryRegistry`].
    pub fn category_for(&mut self, tag: &str) -> Result<u32, String> {
        self.registry.category_for(tag)
    }

    /// The world-owned category registry
    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// The world-owned category registry, mutably
    pub fn registry_mut(&mut self) -> &mut CategoryRegistry {
        &mut self.registry
    }

    /// Whether the world is currently active
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The body currently being dragged, if any
    pub fn drag_target(&self) -> Option<BodyId> {
        self.drag_target
    }

    /// Activate the world
    ///
    /// Returns `true` when the world transitioned from inactive to active;
    /// the host should arm its tick scheduling in that case.
    pub fn activate(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        true
    }

    /// Deactivate the world
    ///
    /// Cancels any in-progress drag by synthesizing a drag-end notification
    /// (pointer identity `None`, position = current anchor position) and
    /// resets the frame-timing state. Returns `true` when the world
    /// transitioned from active to inactive; the host should cancel its
    /// tick scheduling in that case.
    pub fn deactivate(&mut self, hooks: &mut HookRegistry) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.last_update_time = None;

        if let Some(target) = self.drag_target.take() {
            let data = DragEventData {
                pointer: None,
                x: self.drag_anchor.offset.x,
                y: self.drag_anchor.offset.y,
            };
            hooks.drag_end(target, &data);
        }
        true
    }

    /// Run one scheduled tick at the given wall-clock timestamp (ms)
    ///
    /// The first tick after activation always runs exactly one sub-step and
    /// resets the leftover-time accumulator; later ticks dispense
    /// `floor((elapsed + leftover) / frame_duration)` sub-steps, capped at
    /// `max_frame_count`, carrying the remainder forward. A suppressed
    /// `before_update` hook skips the tick's simulation work while leaving
    /// scheduling armed.
    pub fn update(&mut self, timestamp: f64, hooks: &mut HookRegistry) -> StepOutcome {
        if !self.active {
            self.last_update_time = None;
            return StepOutcome {
                frames: 0,
                active: false,
            };
        }

        let frame_count = match self.last_update_time {
            None => {
                self.saved_time = 0.0;
                1
            }
            Some(last) => {
                let delta = timestamp - last + self.saved_time;
                let frames = (delta / self.frame_duration)
                    .floor()
                    .min(self.max_frame_count as f64)
                    .max(0.0) as u32;
                self.saved_time = delta - frames as f64 * self.frame_duration;
                frames
            }
        };
        self.last_update_time = Some(timestamp);

        if hooks.before_update() == HookAction::Suppress {
            return StepOutcome {
                frames: 0,
                active: true,
            };
        }

        let eligible = collision::collidable_indices(&self.bodies);

        for _ in 0..frame_count {
            for body in &mut self.bodies {
                body.contacts.clear();
                body.impulse = Vec2::zero();
            }

            self.solve_drag_constraint();

            if let Some(checker) = self.checker {
                collision::find_and_handle(
                    &mut self.bodies,
                    &self.body_ids,
                    &eligible,
                    checker,
                    timestamp,
                    hooks,
                );
            }

            for index in 0..self.constraints.len() {
                solve_constraint(
                    &self.constraints[index],
                    &mut self.bodies,
                    &self.body_ids,
                );
            }

            for body in &mut self.bodies {
                body.integrate();
            }
        }

        hooks.after_update();

        StepOutcome {
            frames: frame_count,
            active: true,
        }
    }

    /// Begin a pointer drag
    ///
    /// Requires dragging to be enabled and the world active. Picks the
    /// topmost (last-inserted) draggable body containing the point,
    /// teleports the drag anchor to the pointer, and emits a cancelable
    /// drag-start notification; unless suppressed, any previously dragged
    /// body receives a drag-end and the picked body becomes the target.
    pub fn pointer_start(
        &mut self,
        pointer: Option<u64>,
        x: f64,
        y: f64,
        hooks: &mut HookRegistry,
    ) {
        if !self.draggable || !self.active {
            return;
        }

        let point = Vec2::new(x, y);
        let Some(picked_index) = self
            .bodies
            .iter()
            .rposition(|body| body.draggable && body.contains_point(point))
        else {
            return;
        };
        let picked = self.body_ids[picked_index];

        self.drag_anchor.offset = point;

        let data = DragEventData { pointer, x, y };
        if hooks.drag_start(picked, &data) == HookAction::Suppress {
            return;
        }

        if let Some(previous) = self.drag_target {
            hooks.drag_end(previous, &data);
        }

        self.drag_target = Some(picked);
        self.drag_constraint.anchor_b = point - self.bodies[picked_index].offset;
    }

    /// Move the pointer during a drag
    ///
    /// The anchor follows the pointer unless a hook suppresses the
    /// drag-move notification.
    pub fn pointer_move(
        &mut self,
        pointer: Option<u64>,
        x: f64,
        y: f64,
        hooks: &mut HookRegistry,
    ) {
        if !self.draggable || !self.active {
            return;
        }
        let Some(target) = self.drag_target else {
            return;
        };

        let data = DragEventData { pointer, x, y };
        if hooks.drag_move(target, &data) != HookAction::Suppress {
            self.drag_anchor.offset = Vec2::new(x, y);
        }
    }

    /// End a pointer drag
    ///
    /// Emits a drag-end notification to the dragged body, solves the drag
    /// constraint once synchronously, and clears the target.
    pub fn pointer_end(
        &mut self,
        pointer: Option<u64>,
        x: f64,
        y: f64,
        hooks: &mut HookRegistry,
    ) {
        self.drag_anchor.offset = Vec2::new(x, y);

        if let Some(target) = self.drag_target {
            hooks.drag_end(target, &DragEventData { pointer, x, y });
            self.solve_drag_constraint();
            self.drag_target = None;
        }
    }

    fn solve_drag_constraint(&mut self) {
        let Some(target) = self.drag_target else {
            return;
        };
        let Some(index) = self.index_of(target) else {
            return;
        };
        self.drag_constraint
            .solve(&mut self.drag_anchor, &mut self.bodies[index]);
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.body_ids.iter().position(|&candidate| candidate == id)
    }

    fn constraint_index_of(&self, id: ConstraintId) -> Option<usize> {
        self.constraint_ids
            .iter()
            .position(|&candidate| candidate == id)
    }
}

impl Default for World {
    fn default() -> Self {
        World::new(WorldOptions::default())
    }
}

/// Resolve a constraint's body references and enforce it for one sub-step
///
/// Constraints whose bodies are missing, removed, or identical are skipped.
fn solve_constraint(constraint: &Constraint, bodies: &mut [Body], ids: &[BodyId]) {
    let (Some(id_a), Some(id_b)) = (constraint.body_a, constraint.body_b) else {
        return;
    };
    let Some(index_a) = ids.iter().position(|&id| id == id_a) else {
        return;
    };
    let Some(index_b) = ids.iter().position(|&id| id == id_b) else {
        return;
    };
    if index_a == index_b {
        return;
    }

    let (lo, hi) = if index_a < index_b {
        (index_a, index_b)
    } else {
        (index_b, index_a)
    };
    let (left, right) = bodies.split_at_mut(hi);
    let (body_lo, body_hi) = (&mut left[lo], &mut right[0]);
    let (body_a, body_b) = if index_a < index_b {
        (body_lo, body_hi)
    } else {
        (body_hi, body_lo)
    };
    constraint.solve(body_a, body_b);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::WorldHooks;

    fn square_options(side: f64, x: f64, y: f64) -> BodyOptions {
        BodyOptions {
            vertices: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(side, 0.0),
                Vec2::new(side, side),
                Vec2::new(0.0, side),
            ],
            offset: Vec2::new(x, y),
            category: 1,
            ..BodyOptions::default()
        }
    }

    #[test]
    fn test_activation_lifecycle() {
        let mut world = World::default();
        let mut hooks = HookRegistry::new();
        assert!(!world.is_active());
        assert!(world.activate());
        assert!(!world.activate()); // already active
        assert!(world.is_active());
        assert!(world.deactivate(&mut hooks));
        assert!(!world.deactivate(&mut hooks));
    }

    #[test]
    fn test_update_while_inactive_is_idle() {
        let mut world = World::default();
        let mut hooks = HookRegistry::new();
        let outcome = world.update(100.0, &mut hooks);
        assert_eq!(
            outcome,
            StepOutcome {
                frames: 0,
                active: false
            }
        );
    }

    #[test]
    fn test_first_tick_runs_one_frame() {
        let mut world = World::default();
        let mut hooks = HookRegistry::new();
        world.activate();
        // Large timestamp: the first tick still runs exactly one sub-step
        let outcome = world.update(123456.0, &mut hooks);
        assert_eq!(outcome.frames, 1);
    }

    #[test]
    fn test_fixed_step_accumulation() {
        let mut world = World::default(); // frame_duration 10, max 3
        let mut hooks = HookRegistry::new();
        world.activate();
        assert_eq!(world.update(1000.0, &mut hooks).frames, 1);
        // 45 ms elapsed: 3 frames capped, 15 ms leftover
        assert_eq!(world.update(1045.0, &mut hooks).frames, 3);
        // 5 ms elapsed + 15 ms leftover: 2 frames, nothing left over
        assert_eq!(world.update(1050.0, &mut hooks).frames, 2);
        // 9 ms elapsed: not enough for a frame yet
        assert_eq!(world.update(1059.0, &mut hooks).frames, 0);
        // 1 more ms completes the pending frame
        assert_eq!(world.update(1060.0, &mut hooks).frames, 1);
    }

    #[test]
    fn test_deactivate_resets_first_tick_rule() {
        let mut world = World::default();
        let mut hooks = HookRegistry::new();
        world.activate();
        world.update(1000.0, &mut hooks);
        world.deactivate(&mut hooks);
        world.activate();
        let outcome = world.update(1100.0, &mut hooks);
        assert_eq!(outcome.frames, 1);
    }

    #[test]
    fn test_body_storage_in_insertion_order() {
        let mut world = World::default();
        let a = world.add_body(square_options(10.0, 0.0, 0.0));
        let b = world.add_body(square_options(10.0, 20.0, 0.0));
        let c = world.add_body(square_options(10.0, 40.0, 0.0));
        assert_eq!(world.body_count(), 3);

        let ids: Vec<BodyId> = world.bodies().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b, c]);

        world.remove_body(b).unwrap();
        let ids: Vec<BodyId> = world.bodies().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(world.body(b).is_none());
        // Ids are not reused
        let d = world.add_body(square_options(10.0, 60.0, 0.0));
        assert!(d > c);
    }

    #[test]
    fn test_category_delegation() {
        let mut world = World::default();
        let ball = world.category_for("ball").unwrap();
        assert_eq!(world.category_for("ball").unwrap(), ball);
        assert_eq!(world.registry().tag_for(ball), Some("ball"));
    }

    #[test]
    fn test_gravity_integrates_over_frames() {
        let mut world = World::default();
        let mut hooks = HookRegistry::new();
        let ball = world.add_body(BodyOptions {
            gravity: Some(Vec2::new(0.0, 1.0)),
            ..square_options(10.0, 0.0, 0.0)
        });
        world.activate();
        world.update(0.0, &mut hooks);
        world.update(30.0, &mut hooks); // 3 more frames
        let body = world.body(ball).unwrap();
        assert_eq!(body.velocity, Vec2::new(0.0, 4.0));
        // Offsets accumulated 0 + 1 + 2 + 3 frame displacements
        assert_eq!(body.offset.y, 6.0);
    }

    struct SkipAll;

    impl WorldHooks for SkipAll {
        fn name(&self) -> &str {
            "skip_all"
        }

        fn before_update(&mut self) -> HookAction {
            HookAction::Suppress
        }
    }

    #[test]
    fn test_suppressed_before_update_skips_simulation() {
        let mut world = World::default();
        let mut hooks = HookRegistry::new();
        hooks.register(Box::new(SkipAll)).unwrap();
        let ball = world.add_body(BodyOptions {
            velocity: Vec2::new(1.0, 0.0),
            ..square_options(10.0, 0.0, 0.0)
        });
        world.activate();
        let outcome = world.update(0.0, &mut hooks);
        assert_eq!(outcome.frames, 0);
        assert!(outcome.active);
        assert_eq!(world.body(ball).unwrap().offset, Vec2::zero());
    }

    #[test]
    fn test_constraint_with_removed_body_is_inert() {
        let mut world = World::default();
        let mut hooks = HookRegistry::new();
        let a = world.add_body(square_options(10.0, 0.0, 0.0));
        let b = world.add_body(square_options(10.0, 200.0, 0.0));
        world.add_constraint(ConstraintOptions {
            body_a: Some(a),
            body_b: Some(b),
            max_length: Some(50.0),
            min_length: Some(0.0),
            ..ConstraintOptions::default()
        });
        world.remove_body(b);
        world.activate();
        // Must not panic or move anything
        world.update(0.0, &mut hooks);
        assert_eq!(world.body(a).unwrap().offset, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_drag_requires_enabled_and_active() {
        let mut world = World::default();
        let mut hooks = HookRegistry::new();
        world.add_body(BodyOptions {
            draggable: true,
            ..square_options(10.0, 0.0, 0.0)
        });
        world.activate();
        // draggable is false on the world
        world.pointer_start(Some(1), 5.0, 5.0, &mut hooks);
        assert!(world.drag_target().is_none());

        world.draggable = true;
        world.pointer_start(Some(1), 5.0, 5.0, &mut hooks);
        assert!(world.drag_target().is_some());
    }

    #[test]
    fn test_drag_picks_topmost_body() {
        let mut world = World::new(WorldOptions {
            draggable: true,
            ..WorldOptions::default()
        });
        let mut hooks = HookRegistry::new();
        let _bottom = world.add_body(BodyOptions {
            draggable: true,
            ..square_options(10.0, 0.0, 0.0)
        });
        let top = world.add_body(BodyOptions {
            draggable: true,
            ..square_options(10.0, 2.0, 2.0)
        });
        world.activate();
        world.pointer_start(Some(1), 5.0, 5.0, &mut hooks);
        assert_eq!(world.drag_target(), Some(top));
    }

    #[test]
    fn test_pointer_end_clears_target() {
        let mut world = World::new(WorldOptions {
            draggable: true,
            ..WorldOptions::default()
        });
        let mut hooks = HookRegistry::new();
        world.add_body(BodyOptions {
            draggable: true,
            ..square_options(10.0, 0.0, 0.0)
        });
        world.activate();
        world.pointer_start(Some(1), 5.0, 5.0, &mut hooks);
        assert!(world.drag_target().is_some());
        world.pointer_end(Some(1), 8.0, 8.0, &mut hooks);
        assert!(world.drag_target().is_none());
    }

    #[test]
    fn test_removing_dragged_body_clears_target() {
        let mut world = World::new(WorldOptions {
            draggable: true,
            ..WorldOptions::default()
        });
        let mut hooks = HookRegistry::new();
        let ball = world.add_body(BodyOptions {
            draggable: true,
            ..square_options(10.0, 0.0, 0.0)
        });
        world.activate();
        world.pointer_start(Some(1), 5.0, 5.0, &mut hooks);
        assert_eq!(world.drag_target(), Some(ball));
        world.remove_body(ball);
        assert!(world.drag_target().is_none());
        // A further tick must not panic on the stale target
        world.update(0.0, &mut hooks);
    }
}
