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
//! # impulse2d
//!
//! An impulse-based 2D rigid-body physics engine for convex polygons with a
//! fixed-timestep stepping loop.
//!
//! ## Features
//!
//! - **Geometry-derived dynamics**: area, mass and deduplicated edge
//!   normals computed from each body's vertex ring
//! - **Collision detection**: category/filter gated pair scanning with
//!   built-in AABB and SAT narrow-phase checkers
//! - **Collision response**: positional correction with slop tolerance,
//!   elastic bounce, and static/kinetic friction, all momentum-conserving
//! - **Distance constraints**: soft min/max links between body anchors,
//!   including the built-in pointer-drag constraint
//! - **Fixed-timestep loop**: wall-clock ticks dispense capped fixed-size
//!   sub-steps, decoupling simulation rate from frame rate
//! - **Hooks**: versioned handlers that observe every collision and drag
//!   and can veto individual physical effects
//! - **Parallelization**: optional Rayon-backed collision scanning with
//!   results identical to the sequential path
//!
//! ## Example
//!
//! ```
//! use impulse2d::body::BodyOptions;
//! use impulse2d::hooks::HookRegistry;
//! use impulse2d::math::Vec2;
//! use impulse2d::world::{World, WorldOptions};
//!
//! let mut world = World::new(WorldOptions::default());
//!
//! // A static floor and a falling box
//! world.add_body(BodyOptions {
//!     vertices: vec![
//!         Vec2::new(0.0, 0.0),
//!         Vec2::new(400.0, 0.0),
//!         Vec2::new(400.0, 20.0),
//!         Vec2::new(0.0, 20.0),
//!     ],
//!     offset: Vec2::new(0.0, 300.0),
//!     active: false,
//!     category: 1,
//!     ..BodyOptions::default()
//! });
//! let ball = world.add_body(BodyOptions {
//!     vertices: vec![
//!         Vec2::new(0.0, 0.0),
//!         Vec2::new(20.0, 0.0),
//!         Vec2::new(20.0, 20.0),
//!         Vec2::new(0.0, 20.0),
//!     ],
//!     offset: Vec2::new(100.0, 0.0),
//!     gravity: Some(Vec2::new(0.0, 0.2)),
//!     category: 1,
//!     ..BodyOptions::default()
//! });
//!
//! let mut hooks = HookRegistry::new();
//! world.activate();
//! for tick in 0..60 {
//!     world.update(tick as f64 * 16.0, &mut hooks);
//! }
//! assert!(world.body(ball).unwrap().offset.y > 0.0);
//! ```

#![warn(missing_docs)]

/// Rigid body state and geometry
pub mod body;

/// Collision category registry
pub mod category;

/// Pairwise collision detection and response
pub mod collision;

/// Two-body distance constraints
pub mod constraint;

/// Hook interface for observing and vetoing simulation effects
pub mod hooks;

/// 2D vector math
pub mod math;

/// World container and fixed-timestep stepping loop
pub mod world;

pub use body::{Body, BodyId, BodyOptions};
pub use category::CategoryRegistry;
pub use collision::{CollisionChecker, CollisionInfo, CollisionResult};
pub use constraint::{Constraint, ConstraintId, ConstraintOptions};
pub use hooks::{HookAction, HookRegistry, WorldHooks};
pub use math::Vec2;
pub use world::{StepOutcome, World, WorldOptions};
