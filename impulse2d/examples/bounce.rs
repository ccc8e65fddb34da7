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
//! Bouncing boxes with different elasticities
//!
//! Five boxes with elasticity from 0 to 0.98 drop onto a static ground.
//! A hook handler counts the collision notifications while the boxes
//! settle. Run with `cargo run --example bounce`.

use impulse2d::body::{BodyId, BodyOptions};
use impulse2d::hooks::{CollisionEventData, HookAction, HookRegistry, WorldHooks};
use impulse2d::math::Vec2;
use impulse2d::world::{World, WorldOptions};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

fn rectangle(w: f64, h: f64) -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(w, 0.0),
        Vec2::new(w, h),
        Vec2::new(0.0, h),
    ]
}

struct CollisionCounter {
    count: Arc<AtomicU64>,
}

impl WorldHooks for CollisionCounter {
    fn name(&self) -> &str {
        "collision_counter"
    }

    fn collision(&mut self, _body: BodyId, _data: &CollisionEventData) -> HookAction {
        self.count.fetch_add(1, Ordering::Relaxed);
        HookAction::Proceed
    }
}

fn main() {
    println!("impulse2d - Bounce Example");
    println!("==========================\n");

    let mut world = World::new(WorldOptions::default());
    let gravity = Vec2::new(0.0, 0.5);

    let box_category = world.category_for("box").expect("category available");
    let ground_category = world.category_for("ground").expect("category available");

    // Ground: a static slab near the bottom of the scene
    world.add_body(BodyOptions {
        vertices: rectangle(450.0, 60.0),
        offset: Vec2::new(50.0, 500.0),
        active: false,
        elasticity: 0.0,
        category: ground_category,
        ..BodyOptions::default()
    });

    // Boxes with increasing bounciness
    let elasticities = [0.0, 0.3, 0.3, 0.5, 0.98];
    let starts = [
        Vec2::new(100.0, 200.0),
        Vec2::new(175.0, 200.0),
        Vec2::new(250.0, 0.0),
        Vec2::new(325.0, 0.0),
        Vec2::new(400.0, 100.0),
    ];
    let boxes: Vec<BodyId> = elasticities
        .iter()
        .zip(starts.iter())
        .map(|(&elasticity, &offset)| {
            world.add_body(BodyOptions {
                vertices: rectangle(60.0, 60.0),
                offset,
                gravity: Some(gravity),
                elasticity,
                category: box_category,
                ..BodyOptions::default()
            })
        })
        .collect();

    println!(
        "Created {} boxes over a static ground (categories: {:?})",
        boxes.len(),
        ["box", "ground"]
    );

    let count = Arc::new(AtomicU64::new(0));
    let mut hooks = HookRegistry::new();
    hooks
        .register(Box::new(CollisionCounter {
            count: count.clone(),
        }))
        .expect("register hook");

    world.activate();

    // Drive the loop at ~60 fps of wall-clock time
    for tick in 0..600 {
        world.update(tick as f64 * 16.0, &mut hooks);

        if tick % 100 == 99 {
            println!("\nAfter {} ticks:", tick + 1);
            for (index, &id) in boxes.iter().enumerate() {
                let body = world.body(id).expect("box exists");
                println!(
                    "  box{} (elasticity {:.2}): y = {:6.1}, vy = {:+.3}",
                    index, elasticities[index], body.offset.y, body.velocity.y
                );
            }
        }
    }

    println!(
        "\n{} collision notifications were delivered",
        count.load(Ordering::Relaxed)
    );

    // The dead box has settled; the bounciest one may still be moving
    let dead = world.body(boxes[0]).expect("box exists");
    println!(
        "box0 rests at y = {:.1} with {} contact(s)",
        dead.offset.y,
        dead.contacts().len()
    );
}
