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
//! Boxes piling into stacks
//!
//! Nine soft boxes (stiffness 0.6, no bounce) drop in two columns onto a
//! static ground and come to rest stacked on each other. Run with
//! `cargo run --example stack`.

use impulse2d::body::{BodyId, BodyOptions};
use impulse2d::hooks::HookRegistry;
use impulse2d::math::Vec2;
use impulse2d::world::{World, WorldOptions};

fn rectangle(w: f64, h: f64) -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(w, 0.0),
        Vec2::new(w, h),
        Vec2::new(0.0, h),
    ]
}

fn main() {
    println!("impulse2d - Stack Example");
    println!("=========================\n");

    let mut world = World::new(WorldOptions::default());
    let gravity = Vec2::new(0.0, 0.5);

    world.add_body(BodyOptions {
        vertices: rectangle(450.0, 60.0),
        offset: Vec2::new(50.0, 500.0),
        active: false,
        elasticity: 0.0,
        category: 1,
        ..BodyOptions::default()
    });

    let starts = [
        Vec2::new(160.0, 50.0),
        Vec2::new(130.0, 200.0),
        Vec2::new(190.0, 200.0),
        Vec2::new(100.0, 350.0),
        Vec2::new(160.0, 350.0),
        Vec2::new(220.0, 350.0),
        Vec2::new(390.0, 50.0),
        Vec2::new(390.0, 200.0),
        Vec2::new(390.0, 350.0),
    ];
    let boxes: Vec<BodyId> = starts
        .iter()
        .map(|&offset| {
            world.add_body(BodyOptions {
                vertices: rectangle(60.0, 60.0),
                offset,
                gravity: Some(gravity),
                stiffness: 0.6,
                elasticity: 0.0,
                category: 1,
                ..BodyOptions::default()
            })
        })
        .collect();

    println!("Dropping {} boxes onto the ground...\n", boxes.len());

    let mut hooks = HookRegistry::new();
    world.activate();

    for tick in 0..1200 {
        world.update(tick as f64 * 16.0, &mut hooks);
    }

    println!("Resting positions after 1200 ticks:");
    let mut total_speed = 0.0;
    for (index, &id) in boxes.iter().enumerate() {
        let body = world.body(id).expect("box exists");
        total_speed += body.velocity.length();
        println!(
            "  box{}: ({:6.1}, {:6.1}) touching {} bodies",
            index,
            body.offset.x,
            body.offset.y,
            body.contacts().len()
        );
    }
    println!("\nTotal residual speed: {:.4}", total_speed);
}
