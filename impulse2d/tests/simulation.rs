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
//! Integration tests driving whole worlds through the stepping loop

use impulse2d::body::{BodyId, BodyOptions};
use impulse2d::hooks::{
    CollisionEventData, DragEventData, HookAction, HookRegistry, WorldHooks,
};
use impulse2d::math::Vec2;
use impulse2d::world::{World, WorldOptions};
use std::sync::{Arc, Mutex};

fn rect_vertices(w: f64, h: f64) -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(w, 0.0),
        Vec2::new(w, h),
        Vec2::new(0.0, h),
    ]
}

/// Hook handler that records every notification it sees
struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Recorder { log: log.clone() }, log)
    }
}

impl WorldHooks for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn collision(&mut self, body: BodyId, data: &CollisionEventData) -> HookAction {
        self.log
            .lock()
            .unwrap()
            .push(format!("collision {} -> {}", body, data.target));
        HookAction::Proceed
    }

    fn drag_start(&mut self, body: BodyId, _data: &DragEventData) -> HookAction {
        self.log.lock().unwrap().push(format!("dragstart {}", body));
        HookAction::Proceed
    }

    fn drag_end(&mut self, body: BodyId, data: &DragEventData) {
        self.log.lock().unwrap().push(format!(
            "dragend {} pointer={:?}",
            body, data.pointer
        ));
    }
}

#[test]
fn falling_box_settles_on_static_ground() {
    let mut world = World::new(WorldOptions::default());
    let mut hooks = HookRegistry::new();

    world.add_body(BodyOptions {
        vertices: rect_vertices(450.0, 60.0),
        offset: Vec2::new(50.0, 500.0),
        active: false,
        elasticity: 0.0,
        category: 1,
        ..BodyOptions::default()
    });
    let falling = world.add_body(BodyOptions {
        vertices: rect_vertices(60.0, 60.0),
        offset: Vec2::new(200.0, 200.0),
        gravity: Some(Vec2::new(0.0, 0.5)),
        elasticity: 0.0,
        category: 1,
        ..BodyOptions::default()
    });

    world.activate();
    for tick in 0..400 {
        world.update(tick as f64 * 16.0, &mut hooks);
    }

    let body = world.body(falling).unwrap();
    // Resting on the ground: the box bottom sits at the ground top (y=500)
    // give or take the penetration tolerance
    let bottom = body.offset.y + 60.0;
    assert!(
        (bottom - 500.0).abs() < 5.0,
        "box bottom ended at {}",
        bottom
    );
    assert!(body.velocity.y.abs() < 1.0);
    // It is in contact with the ground
    assert!(!body.contacts().is_empty());
}

#[test]
fn spec_frame_accumulation_sequence() {
    let mut world = World::new(WorldOptions {
        frame_duration: 10.0,
        max_frame_count: 3,
        ..WorldOptions::default()
    });
    let mut hooks = HookRegistry::new();
    world.activate();

    // First tick after activation: exactly one sub-step regardless of time
    assert_eq!(world.update(25.0, &mut hooks).frames, 1);
    // 45 ms elapsed: min(3, floor(45 / 10)) = 3 sub-steps, 15 ms leftover
    assert_eq!(world.update(70.0, &mut hooks).frames, 3);
    // 15 ms leftover + 5 ms elapsed = 2 sub-steps
    assert_eq!(world.update(75.0, &mut hooks).frames, 2);
}

#[test]
fn collision_notifications_reach_both_bodies() {
    let mut world = World::new(WorldOptions::default());
    let mut hooks = HookRegistry::new();
    let (recorder, log) = Recorder::new();
    hooks.register(Box::new(recorder)).unwrap();

    let a = world.add_body(BodyOptions {
        vertices: rect_vertices(20.0, 20.0),
        offset: Vec2::new(0.0, 0.0),
        category: 1,
        ..BodyOptions::default()
    });
    let b = world.add_body(BodyOptions {
        vertices: rect_vertices(20.0, 20.0),
        offset: Vec2::new(15.0, 0.0),
        category: 1,
        ..BodyOptions::default()
    });

    world.activate();
    world.update(0.0, &mut hooks);

    let log = log.lock().unwrap();
    assert!(log.contains(&format!("collision {} -> {}", a, b)));
    assert!(log.contains(&format!("collision {} -> {}", b, a)));
}

#[test]
fn sensor_pair_notifies_without_deflecting() {
    let mut world = World::new(WorldOptions::default());
    let mut hooks = HookRegistry::new();
    let (recorder, log) = Recorder::new();
    hooks.register(Box::new(recorder)).unwrap();

    let zone = world.category_for("zone").unwrap();
    let mover_category = world.category_for("mover").unwrap();

    world.add_body(BodyOptions {
        vertices: rect_vertices(40.0, 40.0),
        offset: Vec2::new(30.0, 0.0),
        active: false,
        category: zone,
        sensor_filter: mover_category,
        ..BodyOptions::default()
    });
    let mover = world.add_body(BodyOptions {
        vertices: rect_vertices(20.0, 20.0),
        offset: Vec2::new(0.0, 10.0),
        velocity: Vec2::new(2.0, 0.0),
        category: mover_category,
        ..BodyOptions::default()
    });

    world.activate();
    for tick in 0..40 {
        world.update(tick as f64 * 16.0, &mut hooks);
    }

    // The mover sailed straight through the sensor zone
    let body = world.body(mover).unwrap();
    assert_eq!(body.velocity, Vec2::new(2.0, 0.0));
    assert!(body.offset.x > 60.0);
    // ...but the overlap was reported
    assert!(log.lock().unwrap().iter().any(|line| line.starts_with("collision")));
}

#[test]
fn category_filters_gate_pairs_end_to_end() {
    let mut world = World::new(WorldOptions::default());
    let mut hooks = HookRegistry::new();

    let ghost = world.category_for("ghost").unwrap();
    let bullet = world.category_for("bullet").unwrap();

    // The wall only collides with bullets; the bullet only collides with
    // nothing (its filter excludes the ghost category)
    world.add_body(BodyOptions {
        vertices: rect_vertices(10.0, 100.0),
        offset: Vec2::new(40.0, 0.0),
        active: false,
        category: ghost,
        ..BodyOptions::default()
    });
    let shot = world.add_body(BodyOptions {
        vertices: rect_vertices(10.0, 10.0),
        offset: Vec2::new(0.0, 40.0),
        velocity: Vec2::new(3.0, 0.0),
        category: bullet,
        collision_filter: bullet, // ghost category masked out
        ..BodyOptions::default()
    });

    world.activate();
    for tick in 0..40 {
        world.update(tick as f64 * 16.0, &mut hooks);
    }

    // No gating match: the bullet passed through the wall undisturbed
    let body = world.body(shot).unwrap();
    assert_eq!(body.velocity, Vec2::new(3.0, 0.0));
    assert!(body.offset.x > 60.0);
}

#[test]
fn dragging_pulls_body_toward_pointer() {
    let mut world = World::new(WorldOptions {
        draggable: true,
        ..WorldOptions::default()
    });
    let mut hooks = HookRegistry::new();

    let box_id = world.add_body(BodyOptions {
        vertices: rect_vertices(20.0, 20.0),
        offset: Vec2::new(100.0, 100.0),
        draggable: true,
        category: 1,
        ..BodyOptions::default()
    });

    world.activate();
    world.update(0.0, &mut hooks);

    // Grab the middle of the box and drag to the right
    world.pointer_start(Some(7), 110.0, 110.0, &mut hooks);
    assert_eq!(world.drag_target(), Some(box_id));
    world.pointer_move(Some(7), 200.0, 110.0, &mut hooks);

    for tick in 1..80 {
        world.update(tick as f64 * 16.0, &mut hooks);
    }

    let dragged = world.body(box_id).unwrap();
    assert!(
        dragged.offset.x > 130.0,
        "box only reached x = {}",
        dragged.offset.x
    );

    world.pointer_end(Some(7), 200.0, 110.0, &mut hooks);
    assert!(world.drag_target().is_none());
}

#[test]
fn deactivation_synthesizes_drag_end() {
    let mut world = World::new(WorldOptions {
        draggable: true,
        ..WorldOptions::default()
    });
    let mut hooks = HookRegistry::new();
    let (recorder, log) = Recorder::new();
    hooks.register(Box::new(recorder)).unwrap();

    let box_id = world.add_body(BodyOptions {
        vertices: rect_vertices(20.0, 20.0),
        offset: Vec2::new(0.0, 0.0),
        draggable: true,
        category: 1,
        ..BodyOptions::default()
    });

    world.activate();
    world.pointer_start(Some(3), 10.0, 10.0, &mut hooks);
    assert_eq!(world.drag_target(), Some(box_id));

    world.deactivate(&mut hooks);
    assert!(world.drag_target().is_none());

    let log = log.lock().unwrap();
    // The synthesized drag-end has no pointer identity
    assert!(log.contains(&format!("dragend {} pointer=None", box_id)));
}

#[test]
fn constraint_keeps_pendulum_within_length() {
    let mut world = World::new(WorldOptions::default());
    let mut hooks = HookRegistry::new();

    let pivot = world.insert_body(impulse2d::Body::anchor(200.0, 100.0));
    let bob = world.add_body(BodyOptions {
        vertices: rect_vertices(20.0, 20.0),
        offset: Vec2::new(200.0, 250.0),
        gravity: Some(Vec2::new(0.0, 0.4)),
        category: 1,
        ..BodyOptions::default()
    });
    world.add_constraint(impulse2d::ConstraintOptions {
        body_a: Some(pivot),
        body_b: Some(bob),
        min_length: Some(0.0),
        max_length: Some(160.0),
        anchor_b: Some(Vec2::new(10.0, 10.0)),
        ..impulse2d::ConstraintOptions::default()
    });

    world.activate();
    for tick in 0..300 {
        world.update(tick as f64 * 16.0, &mut hooks);
    }

    // The bob hangs below the pivot without drifting far past the rope
    // length (soft constraint, so allow some stretch)
    let body = world.body(bob).unwrap();
    let anchor_distance =
        Vec2::distance(Vec2::new(200.0, 100.0), body.offset + Vec2::new(10.0, 10.0));
    assert!(
        anchor_distance < 200.0,
        "rope stretched to {}",
        anchor_distance
    );
    // The pivot never moved
    assert_eq!(world.body(pivot).unwrap().offset, Vec2::new(200.0, 100.0));
}

#[test]
fn disabled_collision_checker_lets_bodies_pass() {
    let mut world = World::new(WorldOptions {
        checker: None,
        ..WorldOptions::default()
    });
    let mut hooks = HookRegistry::new();

    world.add_body(BodyOptions {
        vertices: rect_vertices(40.0, 40.0),
        offset: Vec2::new(30.0, 0.0),
        active: false,
        category: 1,
        ..BodyOptions::default()
    });
    let mover = world.add_body(BodyOptions {
        vertices: rect_vertices(20.0, 20.0),
        offset: Vec2::new(0.0, 10.0),
        velocity: Vec2::new(2.0, 0.0),
        category: 1,
        ..BodyOptions::default()
    });

    world.activate();
    for tick in 0..40 {
        world.update(tick as f64 * 16.0, &mut hooks);
    }

    let body = world.body(mover).unwrap();
    assert_eq!(body.velocity, Vec2::new(2.0, 0.0));
    assert!(body.contacts().is_empty());
}
